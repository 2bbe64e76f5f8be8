//! Tunables for the table, the physics feel, the cue and the clock.
//!
//! Every section has defaults matching a full-size table drawn at 1400x800, so
//! a JSON file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use snooker_engine::{ColliderMaterial, GameConfig};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub table_width: f32,
    pub table_height: f32,
    pub cushion_width: f32,
    /// Thickness of the invisible walls outside the cushions.
    pub boundary_thickness: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            world_width: 1400.0,
            world_height: 800.0,
            table_width: 1200.0,
            table_height: 600.0,
            cushion_width: 30.0,
            boundary_thickness: 40.0,
        }
    }
}

impl TableConfig {
    /// Ball size follows the table: 36 balls fit across its length.
    pub fn ball_diameter(&self) -> f32 {
        self.table_width / 36.0
    }

    pub fn pocket_diameter(&self) -> f32 {
        self.ball_diameter() * 1.6
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub ball: ColliderMaterial,
    pub ball_linear_damping: f32,
    pub ball_angular_damping: f32,
    pub cushion: ColliderMaterial,
    /// Below this speed (units/s) a ball counts as stopped.
    pub rest_speed: f32,
    /// Consecutive frames every ball must be at rest before the turn is judged.
    pub settle_frames: u32,
    pub substeps: u32,
    /// Minimum speed for a ball-ball contact to be audible.
    pub ball_hit_sound_speed: f32,
    /// Minimum speed for a ball-cushion contact to be audible.
    pub cushion_hit_sound_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            ball: ColliderMaterial {
                restitution: 0.8,
                friction: 0.02,
                density: 0.01,
            },
            ball_linear_damping: 0.9,
            ball_angular_damping: 1.0,
            cushion: ColliderMaterial {
                restitution: 0.8,
                friction: 0.1,
                density: 1.0,
            },
            rest_speed: 5.0,
            settle_frames: 3,
            substeps: 4,
            ball_hit_sound_speed: 18.0,
            cushion_hit_sound_speed: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    pub max_power: f32,
    /// Power ceiling multiplier while the cue is chalked.
    pub chalk_multiplier: f32,
    /// A release at or below this power plays no shot.
    pub min_power: f32,
    /// Unchalked shots at or above this fraction of `max_power` miscue.
    pub miscue_fraction: f32,
    pub impulse_per_power: f32,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            max_power: 30.0,
            chalk_multiplier: 1.2,
            min_power: 1.0,
            miscue_fraction: 0.9,
            impulse_per_power: 600.0,
        }
    }
}

/// All durations in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub game_duration: f32,
    pub chalk_duration: f32,
    pub new_game_splash: f32,
    pub foul_splash: f32,
    pub game_over_splash: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            game_duration: 600.0,
            chalk_duration: 4.5,
            new_game_splash: 2.5,
            foul_splash: 3.0,
            game_over_splash: 100.0,
        }
    }
}

/// What happens to chalk already on the cue when the game is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChalkResetPolicy {
    #[default]
    Discard,
    Keep,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnookerConfig {
    pub table: TableConfig,
    pub physics: PhysicsConfig,
    pub shot: ShotConfig,
    pub timing: TimingConfig,
    pub chalk_on_reset: ChalkResetPolicy,
    /// Seed for the random layouts.
    pub seed: u64,
}

impl SnookerConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.table;
        positive("table.table_width", t.table_width)?;
        positive("table.table_height", t.table_height)?;
        positive("table.cushion_width", t.cushion_width)?;
        positive("table.boundary_thickness", t.boundary_thickness)?;
        if t.table_width + 2.0 * t.cushion_width > t.world_width
            || t.table_height + 2.0 * t.cushion_width > t.world_height
        {
            return Err(ConfigError::invalid(
                "table",
                format!(
                    "table {}x{} with cushions does not fit the {}x{} world",
                    t.table_width, t.table_height, t.world_width, t.world_height
                ),
            ));
        }

        let p = &self.physics;
        positive("physics.rest_speed", p.rest_speed)?;
        if p.settle_frames == 0 {
            return Err(ConfigError::invalid("physics.settle_frames", "must be at least 1"));
        }
        if p.substeps == 0 {
            return Err(ConfigError::invalid("physics.substeps", "must be at least 1"));
        }
        positive("physics.ball.density", p.ball.density)?;

        let s = &self.shot;
        positive("shot.max_power", s.max_power)?;
        positive("shot.impulse_per_power", s.impulse_per_power)?;
        if s.min_power < 0.0 || s.min_power >= s.max_power {
            return Err(ConfigError::invalid(
                "shot.min_power",
                format!("must lie in [0, {})", s.max_power),
            ));
        }
        if s.chalk_multiplier < 1.0 {
            return Err(ConfigError::invalid("shot.chalk_multiplier", "must be at least 1"));
        }

        let d = &self.timing;
        positive("timing.game_duration", d.game_duration)?;
        positive("timing.chalk_duration", d.chalk_duration)?;
        Ok(())
    }

    /// Engine settings for a top-down table: no gravity, sub-stepped physics.
    pub fn engine_config(&self) -> GameConfig {
        GameConfig {
            world_width: self.table.world_width,
            world_height: self.table.world_height,
            gravity: glam::Vec2::ZERO,
            physics_substeps: self.physics.substeps,
            length_unit: self.table.ball_diameter() / 2.0,
            ..GameConfig::default()
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}
