use glam::Vec2;
use serde::Serialize;
use snooker_engine::Countdown;

use crate::config::{ChalkResetPolicy, ShotConfig};

/// A released shot, ready to be turned into an impulse on the cue ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub direction: Vec2,
    pub power: f32,
    /// Full power without chalk: the tip slips.
    pub miscue: bool,
}

/// The player's cue: aim, power and chalk.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    angle: f32,
    power: f32,
    aiming: bool,
    chalk: Countdown,
    chalked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CueView {
    pub angle: f32,
    pub power: f32,
    pub max_power: f32,
    pub aiming: bool,
    pub chalking: bool,
    /// 0..1 while chalking.
    pub chalk_progress: f32,
    pub chalked: bool,
}

impl Default for Cue {
    fn default() -> Self {
        Self::new()
    }
}

impl Cue {
    pub fn new() -> Self {
        Self {
            angle: 0.0,
            power: 0.0,
            aiming: false,
            chalk: Countdown::idle(),
            chalked: false,
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    pub fn is_aiming(&self) -> bool {
        self.aiming
    }

    pub fn is_chalking(&self) -> bool {
        self.chalk.is_running()
    }

    pub fn is_chalked(&self) -> bool {
        self.chalked
    }

    /// Power ceiling, raised while the tip is chalked.
    pub fn max_power(&self, shot: &ShotConfig) -> f32 {
        if self.chalked {
            shot.max_power * shot.chalk_multiplier
        } else {
            shot.max_power
        }
    }

    pub fn start_aim(&mut self) -> bool {
        if self.aiming {
            return false;
        }
        self.aiming = true;
        self.power = 0.0;
        true
    }

    pub fn update_aim(&mut self, power: f32, angle: f32, shot: &ShotConfig) -> bool {
        if !self.aiming || !power.is_finite() || !angle.is_finite() {
            return false;
        }
        self.power = power.clamp(0.0, self.max_power(shot));
        self.angle = angle;
        true
    }

    /// Drop an unreleased aim.
    pub fn cancel_aim(&mut self) -> bool {
        let was_aiming = self.aiming;
        self.aiming = false;
        self.power = 0.0;
        was_aiming
    }

    /// Let go of the cue. A shot is played only above the minimum power;
    /// playing it uses up the chalk. A release that is too soft leaves the
    /// aim as it was.
    pub fn release(&mut self, shot: &ShotConfig) -> Option<Shot> {
        if !self.aiming || self.power <= shot.min_power {
            return None;
        }
        self.aiming = false;
        let power = std::mem::take(&mut self.power);

        let miscue = !self.chalked && power >= shot.max_power * shot.miscue_fraction;
        self.chalked = false;
        Some(Shot {
            direction: Vec2::from_angle(self.angle),
            power,
            miscue,
        })
    }

    /// Begin chalking. Ignored while a chalk is already in progress.
    pub fn start_chalk(&mut self, duration: f32) -> bool {
        if self.chalk.is_running() {
            return false;
        }
        self.chalk.start(duration);
        true
    }

    /// Advance the chalk timer. Returns `true` on the frame chalking completes.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.chalk.tick(dt) {
            self.chalked = true;
            return true;
        }
        false
    }

    /// New game. `Discard` cancels a chalk in progress and wipes applied chalk;
    /// `Keep` lets both carry over. Aim is always dropped.
    pub fn reset(&mut self, policy: ChalkResetPolicy) {
        self.aiming = false;
        self.power = 0.0;
        self.angle = 0.0;
        if policy == ChalkResetPolicy::Discard {
            self.chalk.cancel();
            self.chalked = false;
        }
    }

    pub fn view(&self, shot: &ShotConfig) -> CueView {
        CueView {
            angle: self.angle,
            power: self.power,
            max_power: self.max_power(shot),
            aiming: self.aiming,
            chalking: self.chalk.is_running(),
            chalk_progress: self.chalk.progress(),
            chalked: self.chalked,
        }
    }
}
