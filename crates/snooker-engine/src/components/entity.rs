use glam::Vec2;
use crate::api::types::EntityId;
use crate::core::physics::PhysicsBody;

/// What an entity is on the table. Drives collision classification without
/// comparing tag strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A rolling ball (dynamic body).
    Ball,
    /// A cushion rail; contacts with it are audible.
    Cushion,
    /// An invisible outer wall that keeps escaped balls in the world.
    Boundary,
}

/// Fat Entity — a single struct with optional components.
/// Only what the headless simulation needs: identity, kind, position, body.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    pub kind: EntityKind,
    /// Position in world space, synced from the physics body after every step.
    pub pos: Vec2,
    /// Physics body (optional — purely logical entities have none).
    pub body: Option<PhysicsBody>,
}

impl Entity {
    /// Create a new entity with the given ID and kind at the origin.
    pub fn new(id: EntityId, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::ZERO,
            body: None,
        }
    }

    // -- Builder pattern --

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = Some(body);
        self
    }
}
