use crate::api::game::{EngineContext, Game, GameConfig};
use crate::api::types::{GameEvent, SoundEvent};
use crate::core::time::FixedTimestep;
use crate::input::queue::InputQueue;

/// Headless runner that wires up the engine loop.
///
/// The host (a window, a test, a CLI) pushes intents and calls `tick` with the
/// wall-clock frame time; the runner converts that into fixed update steps.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue<G::Intent>,
    timestep: FixedTimestep,
    config: GameConfig,
    initialized: bool,
    frames: u64,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        Self {
            timestep: FixedTimestep::new(config.fixed_dt),
            ctx: EngineContext::with_config(&config),
            input: InputQueue::new(),
            game,
            config,
            initialized: false,
            frames: 0,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.config = self.game.config();
        self.timestep = FixedTimestep::new(self.config.fixed_dt);
        self.ctx.configure(&self.config);
        self.game.init(&mut self.ctx);
        self.initialized = true;
        log::info!(
            "Runner initialized: dt={:.4}s substeps={} world={}x{}",
            self.config.fixed_dt,
            self.config.physics_substeps,
            self.config.world_width,
            self.config.world_height
        );
    }

    /// Queue an intent for the next fixed step.
    pub fn push_input(&mut self, intent: G::Intent) {
        self.input.push(intent);
    }

    /// Run one frame: zero or more fixed steps of update followed by physics.
    /// Returns the number of fixed steps taken.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !self.initialized {
            return 0;
        }

        // Clear per-frame transient data
        self.ctx.clear_frame_data();

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.game.update(&mut self.ctx, &self.input);
            self.ctx.step_physics();
            // Intents are seen by exactly one update
            self.input.drain();
            self.frames += 1;
        }
        steps
    }

    /// Advance exactly one fixed step regardless of wall-clock time.
    pub fn step(&mut self) {
        let dt = self.timestep.dt();
        self.tick(dt);
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn ctx(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fixed steps simulated since init.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn sounds(&self) -> &[SoundEvent] {
        &self.ctx.sounds
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.ctx.events
    }

    /// Game events of the last frame as a flat float buffer for the UI.
    pub fn events_as_floats(&self) -> &[f32] {
        GameEvent::as_floats(&self.ctx.events)
    }
}
