use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{EntityId, GameEvent, SoundEvent};
use crate::components::entity::{Entity, EntityKind};
use crate::core::physics::{
    BodyDesc, ColliderMaterial, CollisionPair, PhysicsWorld, RayHit,
};
use crate::core::scene::Scene;
use crate::input::queue::InputQueue;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// Gravity vector for physics simulation. Default: zero (top-down table).
    pub gravity: Vec2,
    /// Physics sub-steps per fixed tick. Fast balls need several to avoid tunnelling.
    pub physics_substeps: u32,
    /// Typical object size in world units, forwarded to the solver.
    pub length_unit: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 800.0,
            world_height: 600.0,
            max_sounds: 32,
            max_events: 32,
            gravity: Vec2::ZERO,
            physics_substeps: 1,
            length_unit: 1.0,
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// What the UI layer sends in: already-interpreted player intents.
    type Intent;

    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn bodies.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The game loop tick. Consume intents, run rules, spawn/despawn bodies.
    /// Physics is stepped by the runner right after this returns.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue<Self::Intent>);
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    pub physics: PhysicsWorld,
    next_id: u32,
    substeps: u32,
    max_sounds: usize,
    max_events: usize,
    collision_events: Vec<CollisionPair>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    /// Create an EngineContext whose physics follows the given config.
    pub fn with_config(config: &GameConfig) -> Self {
        let mut ctx = Self {
            scene: Scene::new(),
            sounds: Vec::new(),
            events: Vec::new(),
            physics: PhysicsWorld::new(config.gravity),
            next_id: 1,
            substeps: 1,
            max_sounds: config.max_sounds,
            max_events: config.max_events,
            collision_events: Vec::new(),
        };
        ctx.configure(config);
        ctx
    }

    /// Apply timestep, sub-stepping and limits from a config.
    pub fn configure(&mut self, config: &GameConfig) {
        self.substeps = config.physics_substeps.max(1);
        self.max_sounds = config.max_sounds;
        self.max_events = config.max_events;
        self.physics.set_dt(config.fixed_dt / self.substeps as f32);
        self.physics.set_length_unit(config.length_unit);
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Emit a sound event for the audio layer. Extra sounds past the per-frame cap are dropped.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        if self.sounds.len() < self.max_sounds {
            self.sounds.push(event);
        }
    }

    /// Emit a game event for the UI layer. Extra events past the per-frame cap are dropped.
    pub fn emit_event(&mut self, event: GameEvent) {
        if self.events.len() < self.max_events {
            self.events.push(event);
        } else {
            log::warn!("Game event dropped (cap {}): {:?}", self.max_events, event);
        }
    }

    /// Clear per-frame transient data (sounds, events).
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }

    // -- Physics convenience methods --

    /// Spawn an entity with a physics body. The entity's position is taken from the BodyDesc.
    pub fn spawn_with_body(
        &mut self,
        kind: EntityKind,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = self.next_id();
        let body = self.physics.create_body(id, &desc, material);
        let entity = Entity::new(id, kind).with_pos(desc.position).with_body(body);
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity, cleaning up its physics body if present.
    /// Returns `false` when the entity was already gone.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        match self.scene.despawn(id) {
            Some(entity) => {
                if let Some(body) = &entity.body {
                    self.physics.remove_body(body);
                }
                true
            }
            None => false,
        }
    }

    /// Apply an instantaneous impulse at a world point on an entity's body.
    pub fn apply_impulse_at(&mut self, id: EntityId, impulse: Vec2, point: Vec2) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.apply_impulse_at_point(&body, impulse, point);
        }
    }

    /// Set the linear velocity of an entity's physics body.
    pub fn set_velocity(&mut self, id: EntityId, vel: Vec2) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.set_velocity(&body, vel);
        }
    }

    /// Get the linear velocity of an entity's physics body.
    pub fn velocity(&self, id: EntityId) -> Vec2 {
        self.scene
            .get(id)
            .and_then(|e| e.body.as_ref())
            .map(|body| self.physics.velocity(body))
            .unwrap_or(Vec2::ZERO)
    }

    /// Current position straight from the solver (not the last synced copy).
    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        let body = self.scene.get(id)?.body?;
        Some(self.physics.body_position(&body))
    }

    pub fn set_awake(&mut self, id: EntityId, awake: bool) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.set_awake(&body, awake);
        }
    }

    /// Whether the entity's body sleeps. Entities without a body count as asleep.
    pub fn is_sleeping(&self, id: EntityId) -> bool {
        self.scene
            .get(id)
            .and_then(|e| e.body.as_ref())
            .map(|body| self.physics.is_sleeping(body))
            .unwrap_or(true)
    }

    /// Cast a ray against dynamic bodies, skipping `excluding`.
    pub fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        excluding: Option<EntityId>,
    ) -> Option<RayHit> {
        let skip = excluding.and_then(|id| self.scene.get(id)).and_then(|e| e.body);
        self.physics.cast_ray(origin, direction, max_distance, skip.as_ref())
    }

    /// Collision events from the most recent physics tick (all sub-steps).
    pub fn collisions(&self) -> &[CollisionPair] {
        &self.collision_events
    }

    /// Step the physics simulation and sync positions back to entities.
    /// Called by the runner after `Game::update()`.
    pub fn step_physics(&mut self) {
        self.collision_events.clear();
        for _ in 0..self.substeps {
            self.physics.step_into(&mut self.collision_events);
        }

        for entity in self.scene.iter_mut() {
            if let Some(body) = &entity.body {
                entity.pos = self.physics.body_position(body);
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
