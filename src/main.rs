//! Limbo Runner entry point
//!
//! Headless demo: loads settings, opens the leaderboard, flies one run on
//! autopilot until it crashes, submits the name given on the command line
//! and logs the resulting leaderboard.
//!
//! Usage: `limbo-runner [settings.json] [name]`

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use limbo_runner::consts::TICK_RATE;
use limbo_runner::input::{Autopilot, InputSource, ScriptedInput};
use limbo_runner::sim::GamePhase;
use limbo_runner::{FrameInput, LeaderboardStore, Session, Settings};

/// Give up on a run after ten simulated minutes
const MAX_RUN_TICKS: u64 = TICK_RATE as u64 * 60 * 10;

fn open_store(settings: &Settings) -> Option<Arc<LeaderboardStore>> {
    match LeaderboardStore::open(settings) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            log::warn!(
                "Leaderboard at {} unavailable ({}), scores will not persist",
                settings.db_path,
                e
            );
            let ttl = Duration::from_secs(settings.cache_ttl_seconds);
            match LeaderboardStore::open_in_memory(ttl) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    log::error!("In-memory leaderboard failed too: {}", e);
                    None
                }
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().unwrap_or_else(|| "settings.json".to_string());
    let name = args.next().unwrap_or_default();

    log::info!("Limbo Runner (headless) starting...");
    let settings = Settings::load(&settings_path);

    let Some(store) = open_store(&settings) else {
        return ExitCode::FAILURE;
    };

    let seed: u64 = rand::random();
    let mut session = match Session::new(&settings, Arc::clone(&store), seed) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Invalid settings in {}: {}", settings_path, e);
            return ExitCode::FAILURE;
        }
    };

    session.update(&FrameInput {
        start: true,
        ..Default::default()
    });

    let mut pilot = Autopilot::default();
    while session.phase() == GamePhase::Playing && session.state().time_ticks < MAX_RUN_TICKS {
        let input = pilot.poll(session.state());
        session.update(&input);
    }

    let snapshot = session.snapshot();
    if snapshot.phase != GamePhase::NameEntry {
        log::info!(
            "Autopilot survived {} ticks (score {}); not recording",
            snapshot.time_ticks,
            snapshot.score
        );
    } else {
        log::info!(
            "Crashed after {} ticks with score {}",
            snapshot.time_ticks,
            snapshot.score
        );
        let mut script = ScriptedInput::new([
            FrameInput::typed(name),
            FrameInput {
                submit: true,
                ..Default::default()
            },
        ]);
        while !script.is_empty() {
            let input = script.poll(session.state());
            session.update(&input);
        }
        if !session.settle(Duration::from_millis(settings.store_timeout_ms)) {
            log::warn!("Leaderboard save still running, not waiting for it");
        }

        let snapshot = session.snapshot();
        if let Some(error) = &snapshot.store_error {
            log::warn!("Leaderboard degraded: {}", error);
        }
        if snapshot.leaders.is_empty() {
            log::info!("Leaderboard is empty");
        }
        for (rank, winner) in snapshot.leaders.iter().enumerate() {
            log::info!(
                "{:>2}. {:<16} {:>6}  {}",
                rank + 1,
                winner.name,
                winner.score,
                winner.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    if let Err(e) = store.close() {
        log::warn!("Closing leaderboard: {}", e);
    }
    ExitCode::SUCCESS
}
