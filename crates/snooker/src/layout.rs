use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::balls::BallType;
use crate::table::TableGeometry;

pub const RED_COUNT: usize = 15;

/// Attempts per ball before a random layout accepts an overlapping position.
const PLACEMENT_ATTEMPTS: usize = 200;

/// How a new game sets out the balls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Colours on their spots, reds in the triangle behind the pink.
    #[default]
    Racked,
    /// Colours on their spots, reds anywhere.
    RandomReds,
    /// Everything anywhere.
    RandomAll,
}

impl LayoutMode {
    /// Keyboard shortcut mapping: `1`, `2`, `3`.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(LayoutMode::Racked),
            '2' => Some(LayoutMode::RandomReds),
            '3' => Some(LayoutMode::RandomAll),
            _ => None,
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutMode::Racked => "Racked",
            LayoutMode::RandomReds => "Random Reds",
            LayoutMode::RandomAll => "Random All",
        })
    }
}

/// Starting positions for every object ball, colours first.
pub fn layout<R: Rng>(mode: LayoutMode, table: &TableGeometry, rng: &mut R) -> Vec<(BallType, Vec2)> {
    let mut placed: Vec<(BallType, Vec2)> = Vec::with_capacity(RED_COUNT + 6);

    for (colour, spot) in table.spots() {
        let pos = match mode {
            LayoutMode::RandomAll => random_free_spot(table, &placed, rng),
            _ => spot,
        };
        placed.push((colour, pos));
    }

    match mode {
        LayoutMode::Racked => {
            placed.extend(triangle(table).into_iter().map(|p| (BallType::Red, p)));
        }
        LayoutMode::RandomReds | LayoutMode::RandomAll => {
            for _ in 0..RED_COUNT {
                let pos = random_free_spot(table, &placed, rng);
                placed.push((BallType::Red, pos));
            }
        }
    }
    placed
}

/// Fifteen reds in five rows, apex towards the pink.
fn triangle(table: &TableGeometry) -> Vec<Vec2> {
    let d = table.ball_diameter;
    let apex = table.rack_apex();
    let mut reds = Vec::with_capacity(RED_COUNT);
    for row in 0..5 {
        for col in 0..=row {
            let (row, col) = (row as f32, col as f32);
            reds.push(apex + Vec2::new(row * d * 0.866, col * d - row * d / 2.0));
        }
    }
    reds
}

fn random_free_spot<R: Rng>(table: &TableGeometry, placed: &[(BallType, Vec2)], rng: &mut R) -> Vec2 {
    let min = table.surface.min() + Vec2::splat(table.ball_diameter);
    let max = table.surface.max() - Vec2::splat(table.ball_diameter);
    let mut candidate = table.center();
    for _ in 0..PLACEMENT_ATTEMPTS {
        candidate = Vec2::new(rng.random_range(min.x..max.x), rng.random_range(min.y..max.y));
        if placed.iter().all(|(_, p)| p.distance(candidate) >= table.ball_diameter) {
            return candidate;
        }
    }
    log::warn!("No free random position after {} attempts, overlapping at {}", PLACEMENT_ATTEMPTS, candidate);
    candidate
}
