use std::fmt;

use serde::{Deserialize, Serialize};
use snooker_engine::EntityId;

/// Every ball on a snooker table. Order follows point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallType {
    Cue,
    Red,
    Yellow,
    Green,
    Brown,
    Blue,
    Pink,
    Black,
}

impl BallType {
    /// The six colours, lowest value first.
    pub const COLOURS: [BallType; 6] = [
        BallType::Yellow,
        BallType::Green,
        BallType::Brown,
        BallType::Blue,
        BallType::Pink,
        BallType::Black,
    ];

    pub fn value(self) -> u32 {
        match self {
            BallType::Cue => 0,
            BallType::Red => 1,
            BallType::Yellow => 2,
            BallType::Green => 3,
            BallType::Brown => 4,
            BallType::Blue => 5,
            BallType::Pink => 6,
            BallType::Black => 7,
        }
    }

    /// Display colour as RGB.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            BallType::Cue => [255, 255, 255],
            BallType::Red => [220, 20, 60],
            BallType::Yellow => [255, 255, 0],
            BallType::Green => [0, 128, 0],
            BallType::Brown => [139, 69, 19],
            BallType::Blue => [0, 0, 255],
            BallType::Pink => [255, 105, 180],
            BallType::Black => [20, 20, 20],
        }
    }

    pub fn is_colour(self) -> bool {
        !matches!(self, BallType::Cue | BallType::Red)
    }

    pub fn name(self) -> &'static str {
        match self {
            BallType::Cue => "cue",
            BallType::Red => "red",
            BallType::Yellow => "yellow",
            BallType::Green => "green",
            BallType::Brown => "brown",
            BallType::Blue => "blue",
            BallType::Pink => "pink",
            BallType::Black => "black",
        }
    }
}

impl fmt::Display for BallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owning reference to a ball's body in the physics world.
///
/// Not `Clone`: exactly one `Ball` holds it, and handing it back to the world
/// (`BallWorld::despawn`) consumes it, so a body cannot be released twice.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(EntityId);

impl BodyHandle {
    /// Wrap a freshly created body. Only a `BallWorld` should call this.
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> EntityId {
        self.0
    }
}

/// A ball and its place in the game.
///
/// `active` means the ball is on the table with a body. `potted` is set when
/// it drops and cleared again when it is respotted.
#[derive(Debug)]
pub struct Ball {
    kind: BallType,
    body: Option<BodyHandle>,
    potted: bool,
    active: bool,
}

impl Ball {
    /// A ball that is not on the table yet.
    pub fn new(kind: BallType) -> Self {
        Self {
            kind,
            body: None,
            potted: false,
            active: false,
        }
    }

    /// A ball placed on the table with the given body.
    pub fn on_table(kind: BallType, body: BodyHandle) -> Self {
        let mut ball = Self::new(kind);
        ball.attach(body);
        ball
    }

    pub fn kind(&self) -> BallType {
        self.kind
    }

    pub fn value(&self) -> u32 {
        self.kind.value()
    }

    pub fn is_potted(&self) -> bool {
        self.potted
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn body(&self) -> Option<&BodyHandle> {
        self.body.as_ref()
    }

    pub fn body_id(&self) -> Option<EntityId> {
        self.body.as_ref().map(BodyHandle::id)
    }

    /// Put the ball (back) on the table.
    pub fn attach(&mut self, body: BodyHandle) {
        self.body = Some(body);
        self.potted = false;
        self.active = true;
    }

    /// Mark the ball potted and hand its body back for destruction.
    pub fn pot(&mut self) -> Option<BodyHandle> {
        self.potted = true;
        self.active = false;
        self.body.take()
    }

    /// Take the ball off the table without potting it (reset).
    pub fn lift(&mut self) -> Option<BodyHandle> {
        self.active = false;
        self.body.take()
    }
}
