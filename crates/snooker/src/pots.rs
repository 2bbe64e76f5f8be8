use glam::Vec2;

use crate::balls::Ball;
use crate::table::Rect;
use crate::world::BallWorld;

/// Why a ball left play this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotKind {
    Pocketed,
    /// Jumped the cushions; scored like a pot.
    Escaped,
}

/// True when `pos` lies inside the capture circle of any pocket.
pub fn in_pocket(pos: Vec2, pockets: &[Vec2], capture_radius: f32) -> bool {
    pockets
        .iter()
        .map(|pocket| pos.distance(*pocket))
        .fold(f32::INFINITY, f32::min)
        < capture_radius
}

/// Indices of active balls that have dropped into a pocket or left the table frame.
/// Potted or inactive balls are never reported again.
pub fn detect_pots<W: BallWorld + ?Sized>(
    balls: &[Ball],
    world: &W,
    pockets: &[Vec2],
    capture_radius: f32,
    frame: &Rect,
) -> Vec<(usize, PotKind)> {
    balls
        .iter()
        .enumerate()
        .filter(|(_, ball)| ball.is_active() && !ball.is_potted())
        .filter_map(|(i, ball)| {
            let pos = world.position(ball.body()?)?;
            if in_pocket(pos, pockets, capture_radius) {
                Some((i, PotKind::Pocketed))
            } else if !frame.contains(pos) {
                log::warn!("{} ball escaped the table at {}", ball.kind(), pos);
                Some((i, PotKind::Escaped))
            } else {
                None
            }
        })
        .collect()
}
