//! Skate Smash headless driver
//!
//! Runs a scripted session against the simulation engine: launches the
//! ball, sweeps the paddle under it, and reports progress per level
//! overlay. Useful for smoke-testing the engine and for profiling; a
//! rendering front end would replace the scripted input with real
//! pointer events.

use glam::Vec2;

use skate_smash::sim::{GameSession, Mode, StepInput, Viewport};
use skate_smash::{JsonFileStore, ScoreStore};

const FRAME_MS: f64 = 16.0;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    log::info!("starting headless session with seed {seed}");

    let mut store = JsonFileStore::open("skate-smash-scores.json");
    let viewport = Viewport::new(600.0, 800.0);
    let mut session = GameSession::new(viewport, seed);
    session.load_preferences(&store);
    session.start();

    let mut now_ms = 0.0;
    let mut frames: u64 = 0;
    // Give the scripted player ten minutes of simulated time
    let frame_budget = (10 * 60 * 1000) as u64 / FRAME_MS as u64;

    while frames < frame_budget {
        let input = scripted_input(&session);
        session.advance_frame(&input, now_ms);
        now_ms += FRAME_MS;
        frames += 1;

        match session.mode {
            Mode::LevelComplete => {
                log::info!(
                    "level {} cleared, score {}",
                    session.world.level,
                    session.world.scoreboard.score
                );
                session.acknowledge();
            }
            Mode::LevelRestart => {
                log::info!("missed on level {}, retrying", session.world.level);
                session.acknowledge();
            }
            Mode::GameComplete => {
                log::info!(
                    "game complete! final score {}",
                    session.world.scoreboard.score
                );
                break;
            }
            _ => {}
        }
    }

    let score = session.world.scoreboard.score;
    if let Err(e) = session.flush_scores(&mut store) {
        log::error!("could not persist scores: {e}");
    }

    let best = store.best_score().unwrap_or(0);
    println!(
        "ran {frames} frames: level {}, score {score}, best {best}",
        session.world.level
    );
}

/// A crude but effective player: aim up, launch, then keep the paddle
/// under the ball.
fn scripted_input(session: &GameSession) -> StepInput {
    match session.mode {
        Mode::Aiming => StepInput {
            pointer: Some(Vec2::new(session.viewport.width * 0.5, 100.0)),
            launch: true,
        },
        Mode::Playing => StepInput {
            pointer: Some(Vec2::new(session.world.ball.pos.x, 700.0)),
            launch: false,
        },
        _ => StepInput::default(),
    }
}
