use glam::Vec2;

use crate::balls::BallType;
use crate::error::RespotError;
use crate::table::TableGeometry;

/// Where a potted colour goes back on the table.
///
/// Tries its own spot, then the other spots from the highest value down, then
/// walks along the centre line from just beyond the pink towards the top
/// cushion, and finally from the pink towards the baulk cushion. A candidate is
/// free when no ball centre in `occupied` lies within one ball diameter.
pub fn respot(ball: BallType, occupied: &[Vec2], table: &TableGeometry) -> Result<Vec2, RespotError> {
    let free = |p: Vec2| occupied.iter().all(|o| o.distance(p) >= table.ball_diameter);
    let mut tried = 0;

    let own = table.spot(ball);
    let mut others: Vec<(BallType, Vec2)> = table.spots().filter(|(b, _)| *b != ball).collect();
    others.sort_by_key(|(b, _)| std::cmp::Reverse(b.value()));

    for candidate in own.into_iter().chain(others.into_iter().map(|(_, p)| p)) {
        tried += 1;
        if free(candidate) {
            return Ok(candidate);
        }
    }

    let pink = table.pink_spot();
    let step = Vec2::new(table.ball_diameter, 0.0);
    let playable = table.playable();

    let mut candidate = pink + step;
    while playable.contains(candidate) {
        tried += 1;
        if free(candidate) {
            log::debug!("{} respotted on the centre line at {}", ball, candidate);
            return Ok(candidate);
        }
        candidate += step;
    }

    let mut candidate = pink - step;
    while playable.contains(candidate) {
        tried += 1;
        if free(candidate) {
            log::debug!("{} respotted on the centre line at {}", ball, candidate);
            return Ok(candidate);
        }
        candidate -= step;
    }

    Err(RespotError::Exhausted { ball, tried })
}
