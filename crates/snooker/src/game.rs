//! Snooker as an engine `Game`: builds the table, feeds intents to the
//! session and turns session events into sounds and UI events.

use snooker_engine::api::game::GameConfig;
use snooker_engine::input::queue::InputQueue;
use snooker_engine::{BodyDesc, ColliderDesc, EngineContext, EntityKind, Game, GameEvent, SoundEvent};

use crate::config::SnookerConfig;
use crate::layout::LayoutMode;
use crate::session::{GameSession, Intent, SessionEvent};
use crate::snapshot::Snapshot;
use crate::table::Rect;
use crate::world::{BallBody, EngineWorld};

/// Sound ids for the audio side.
pub mod sounds {
    pub const BALL_HIT: u32 = 1;
    pub const CUSHION_HIT: u32 = 2;
    pub const POT: u32 = 3;
    pub const CHALK: u32 = 4;
    pub const MISCUE: u32 = 5;
}

/// Game event kinds to the UI
pub mod game_events {
    /// Every frame: a = score, b = target code, c = state code.
    pub const STATUS: f32 = 1.0;
    /// Every frame: a = seconds left on the clock.
    pub const CLOCK: f32 = 2.0;
    /// a = ball value.
    pub const POTTED: f32 = 3.0;
    /// a = penalty.
    pub const FOUL: f32 = 4.0;
    /// a = final score.
    pub const GAME_OVER: f32 = 5.0;
    /// a = 1 once the cue is chalked.
    pub const CHALKED: f32 = 6.0;
}

pub struct SnookerGame {
    session: GameSession,
    ball: BallBody,
    engine: GameConfig,
    snapshot: Option<Snapshot>,
}

impl SnookerGame {
    pub fn new(config: SnookerConfig) -> Self {
        let ball = BallBody::new(config.table.ball_diameter(), &config.physics);
        let engine = config.engine_config();
        Self {
            session: GameSession::new(config),
            ball,
            engine,
            snapshot: None,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// State as of the end of the last update.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Cushion rails and the outer walls behind them.
    fn build_table(&self, ctx: &mut EngineContext) {
        let table = self.session.table();
        let material = self.session.config().physics.cushion;
        let fixed = |rect: &Rect| {
            BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: rect.half.x,
                half_height: rect.half.y,
            })
            .with_position(rect.center)
        };

        let cushions = table.cushions();
        let walls = table.boundaries();
        for rect in &cushions {
            ctx.spawn_with_body(EntityKind::Cushion, fixed(rect), material);
        }
        for rect in &walls {
            ctx.spawn_with_body(EntityKind::Boundary, fixed(rect), material);
        }
        log::info!("Table built: {} cushions, {} boundary walls", cushions.len(), walls.len());
    }

    fn emit(&mut self, ctx: &mut EngineContext) {
        for event in self.session.drain_events() {
            match event {
                SessionEvent::BallHit => ctx.emit_sound(SoundEvent(sounds::BALL_HIT)),
                SessionEvent::CushionHit => ctx.emit_sound(SoundEvent(sounds::CUSHION_HIT)),
                SessionEvent::Potted(ball) => {
                    ctx.emit_sound(SoundEvent(sounds::POT));
                    ctx.emit_event(GameEvent::with_value(game_events::POTTED, ball.value() as f32));
                }
                SessionEvent::ChalkStarted => ctx.emit_sound(SoundEvent(sounds::CHALK)),
                SessionEvent::Chalked => {
                    ctx.emit_event(GameEvent::with_value(game_events::CHALKED, 1.0));
                }
                SessionEvent::ShotPlayed { miscue, .. } => {
                    let sound = if miscue { sounds::MISCUE } else { sounds::BALL_HIT };
                    ctx.emit_sound(SoundEvent(sound));
                }
                SessionEvent::Foul { penalty } => {
                    ctx.emit_event(GameEvent::with_value(game_events::FOUL, penalty as f32));
                }
                SessionEvent::GameOver { score } => {
                    ctx.emit_event(GameEvent::with_value(game_events::GAME_OVER, score as f32));
                }
                // Carried by the per-frame status event
                SessionEvent::ScoreChanged(_)
                | SessionEvent::TargetChanged(_)
                | SessionEvent::StateChanged(_) => {}
            }
        }

        ctx.emit_event(GameEvent {
            kind: game_events::STATUS,
            a: self.session.score() as f32,
            b: self.session.target().code() as f32,
            c: self.session.state().code() as f32,
        });
        ctx.emit_event(GameEvent::with_value(game_events::CLOCK, self.session.time_remaining()));
    }
}

impl Default for SnookerGame {
    fn default() -> Self {
        Self::new(SnookerConfig::default())
    }
}

impl Game for SnookerGame {
    type Intent = Intent;

    fn config(&self) -> GameConfig {
        self.engine.clone()
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.build_table(ctx);
        let mut world = EngineWorld::new(ctx, self.ball);
        self.session.reset(LayoutMode::Racked, &mut world);
        self.snapshot = Some(self.session.snapshot(&world));
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue<Intent>) {
        {
            let mut world = EngineWorld::new(ctx, self.ball);
            self.session
                .frame(self.engine.fixed_dt, input.iter().copied(), &mut world);
            self.snapshot = Some(self.session.snapshot(&world));
        }
        self.emit(ctx);
    }
}
