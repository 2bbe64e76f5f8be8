//! The physics collaborator as the rules see it.
//!
//! The session never touches the solver directly: it spawns and releases ball
//! bodies, pushes the cue ball, and reads positions, speeds and contacts
//! through `BallWorld`. `EngineWorld` backs it with the Rapier-based engine.

use glam::Vec2;
use snooker_engine::{BodyDesc, ColliderDesc, ColliderMaterial, EngineContext, EntityId, EntityKind};

use crate::balls::{BallType, BodyHandle};
use crate::config::PhysicsConfig;

/// Two bodies that started touching during the last physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
}

pub trait BallWorld {
    fn spawn_ball(&mut self, kind: BallType, pos: Vec2) -> BodyHandle;

    /// Destroy a ball body. Consumes the handle.
    fn despawn(&mut self, body: BodyHandle);

    fn apply_impulse(&mut self, body: &BodyHandle, impulse: Vec2, point: Vec2);

    fn set_awake(&mut self, body: &BodyHandle, awake: bool);

    fn position(&self, body: &BodyHandle) -> Option<Vec2>;

    fn speed(&self, body: &BodyHandle) -> f32;

    fn is_asleep(&self, body: &BodyHandle) -> bool;

    /// First ball body along a ray, with its distance.
    fn ray_first_hit(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        excluding: Option<&BodyHandle>,
    ) -> Option<(EntityId, f32)>;

    /// Contacts that began during the most recent physics step.
    fn contacts(&mut self) -> Vec<Contact>;
}

/// Body settings shared by every ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallBody {
    pub radius: f32,
    pub material: ColliderMaterial,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BallBody {
    pub fn new(diameter: f32, physics: &PhysicsConfig) -> Self {
        Self {
            radius: diameter / 2.0,
            material: physics.ball,
            linear_damping: physics.ball_linear_damping,
            angular_damping: physics.ball_angular_damping,
        }
    }

    fn desc(&self, pos: Vec2) -> BodyDesc {
        BodyDesc::dynamic(ColliderDesc::Ball { radius: self.radius })
            .with_position(pos)
            .with_ccd(true)
            .with_linear_damping(self.linear_damping)
            .with_angular_damping(self.angular_damping)
    }
}

/// `BallWorld` over the engine context for the duration of one update.
pub struct EngineWorld<'a> {
    ctx: &'a mut EngineContext,
    ball: BallBody,
}

impl<'a> EngineWorld<'a> {
    pub fn new(ctx: &'a mut EngineContext, ball: BallBody) -> Self {
        Self { ctx, ball }
    }
}

impl BallWorld for EngineWorld<'_> {
    fn spawn_ball(&mut self, kind: BallType, pos: Vec2) -> BodyHandle {
        let id = self
            .ctx
            .spawn_with_body(EntityKind::Ball, self.ball.desc(pos), self.ball.material);
        log::debug!("Spawned {} ball {:?} at {}", kind, id, pos);
        BodyHandle::new(id)
    }

    fn despawn(&mut self, body: BodyHandle) {
        if !self.ctx.despawn(body.id()) {
            log::warn!("Ball body {:?} was already gone", body.id());
        }
    }

    fn apply_impulse(&mut self, body: &BodyHandle, impulse: Vec2, point: Vec2) {
        self.ctx.apply_impulse_at(body.id(), impulse, point);
    }

    fn set_awake(&mut self, body: &BodyHandle, awake: bool) {
        self.ctx.set_awake(body.id(), awake);
    }

    fn position(&self, body: &BodyHandle) -> Option<Vec2> {
        self.ctx.position(body.id())
    }

    fn speed(&self, body: &BodyHandle) -> f32 {
        self.ctx.velocity(body.id()).length()
    }

    fn is_asleep(&self, body: &BodyHandle) -> bool {
        self.ctx.is_sleeping(body.id())
    }

    fn ray_first_hit(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        excluding: Option<&BodyHandle>,
    ) -> Option<(EntityId, f32)> {
        self.ctx
            .cast_ray(origin, direction, max_distance, excluding.map(BodyHandle::id))
            .map(|hit| (hit.entity, hit.distance))
    }

    fn contacts(&mut self) -> Vec<Contact> {
        self.ctx
            .collisions()
            .iter()
            .filter(|pair| pair.started)
            .map(|pair| Contact {
                a: pair.entity_a,
                b: pair.entity_b,
            })
            .collect()
    }
}
