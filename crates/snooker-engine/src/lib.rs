pub mod api;
pub mod core;
pub mod components;
pub mod input;
pub mod runner;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{EntityId, SoundEvent, GameEvent};
pub use components::entity::{Entity, EntityKind};
pub use core::scene::Scene;
pub use core::time::{FixedTimestep, Countdown};
pub use input::queue::InputQueue;
pub use runner::GameRunner;

pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyType,
    ColliderDesc, ColliderMaterial, CollisionPair, RayHit,
};
