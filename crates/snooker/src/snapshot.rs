//! Read-only view of a session for the UI, rebuilt every frame.

use glam::Vec2;
use serde::Serialize;

use crate::balls::BallType;
use crate::cue::CueView;
use crate::layout::LayoutMode;
use crate::rules::{Ruling, Target};
use crate::session::{AimHit, GameSession, SessionState};
use crate::world::BallWorld;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallView {
    pub kind: BallType,
    pub pos: Vec2,
    pub rgb: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplashView {
    pub text: String,
    pub remaining: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: SessionState,
    pub score: u32,
    pub target: Target,
    /// Rendered target, e.g. "ANY COLOUR".
    pub target_label: String,
    pub time_remaining: f32,
    pub message: String,
    pub splash: Option<SplashView>,
    pub balls: Vec<BallView>,
    pub cue: CueView,
    pub aim: Option<AimHit>,
    pub last_ruling: Option<Ruling>,
    pub layout: LayoutMode,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl GameSession {
    /// Everything a renderer needs for this frame. Balls without a position
    /// in `world` are left out.
    pub fn snapshot<W: BallWorld + ?Sized>(&self, world: &W) -> Snapshot {
        let balls = self
            .balls()
            .filter_map(|ball| {
                let pos = world.position(ball.body()?)?;
                Some(BallView {
                    kind: ball.kind(),
                    pos,
                    rgb: ball.kind().rgb(),
                })
            })
            .collect();

        Snapshot {
            state: self.state(),
            score: self.score(),
            target: self.target(),
            target_label: self.target().to_string(),
            time_remaining: self.time_remaining(),
            message: self.message().to_string(),
            splash: self.splash().map(|splash| SplashView {
                text: splash.text.clone(),
                remaining: splash.remaining(),
            }),
            balls,
            cue: self.cue().view(&self.config().shot),
            aim: self.aim_hit(),
            last_ruling: self.last_ruling().cloned(),
            layout: self.layout(),
        }
    }
}
