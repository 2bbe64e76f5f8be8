//! Headless demo: plays the break from a racked table and prints the final
//! snapshot as JSON.
//!
//! Usage: `snooker-demo [config.json]`

use std::error::Error;

use glam::Vec2;
use snooker::{Intent, SessionState, SnookerConfig, SnookerGame};
use snooker_engine::GameRunner;

/// Ten minutes of play at 60 Hz is more than any single shot needs.
const MAX_FRAMES: u32 = 60 * 60 * 10;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            SnookerConfig::load(&path)?
        }
        None => SnookerConfig::default(),
    };

    let mut runner = GameRunner::new(SnookerGame::new(config));
    runner.init();

    // Cue ball on the brown side of the D, aimed at the front of the pack
    let table = runner.game().session().table().clone();
    let start = table.d_center - Vec2::new(table.d_radius / 2.0, table.d_radius * 0.85);
    let angle = (table.rack_apex() - start).to_angle();

    runner.push_input(Intent::PlaceCueBall(start));
    runner.push_input(Intent::StartAim);
    runner.push_input(Intent::UpdateAim { power: 22.0, angle });
    runner.step();
    runner.push_input(Intent::ReleaseShot);
    runner.step();

    let mut frames = 0;
    while runner.game().session().state() == SessionState::BallsMoving && frames < MAX_FRAMES {
        runner.step();
        frames += 1;
    }
    log::info!("Balls settled after {} frames", frames);

    let snapshot = runner
        .game()
        .snapshot()
        .ok_or("game produced no snapshot")?;
    println!("{}", snapshot.to_json()?);
    Ok(())
}
