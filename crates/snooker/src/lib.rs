//! Single-player snooker on top of `snooker-engine`: table geometry, pot
//! detection, first-contact tracking, foul and scoring rules, respotting and
//! the session state machine that ties them to the physics step.

pub mod balls;
pub mod config;
pub mod cue;
pub mod error;
pub mod game;
pub mod layout;
pub mod pots;
pub mod respot;
pub mod rules;
pub mod session;
pub mod snapshot;
pub mod table;
pub mod turn;
pub mod world;

// Re-export key types at crate root for convenience
pub use balls::{Ball, BallType, BodyHandle};
pub use config::{ChalkResetPolicy, SnookerConfig};
pub use error::{ConfigError, RespotError};
pub use game::SnookerGame;
pub use layout::LayoutMode;
pub use rules::{Disposition, Foul, Ruling, Target, Verdict};
pub use session::{GameSession, Intent, SessionEvent, SessionState};
pub use snapshot::Snapshot;
pub use table::TableGeometry;
pub use world::{BallWorld, EngineWorld};
