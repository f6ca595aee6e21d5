//! Session state machine
//!
//! Title → Playing → NameEntry → Leaderboard → Title, for the life of the
//! process. Drives the simulation while Playing and hands leaderboard
//! reads and writes to a background worker. Store failures and slow stores
//! never block a transition: the session moves on at once, and a job that
//! fails or outlives `store_timeout_ms` is logged, kept in the snapshot,
//! and leaves the leaderboard empty.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ConfigError, StoreError};
use crate::input::FrameInput;
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, Rect, TickOutcome, tick};
use crate::store::{JobReport, LeaderboardStore, StoreAction, StoreJob, StoreWorker, Winner};

/// Read-only view for a presenter
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub player: Rect,
    pub obstacles: Vec<Rect>,
    pub score: u64,
    pub time_ticks: u64,
    pub name_buffer: String,
    pub leaders: Vec<Winner>,
    /// A leaderboard job is still running
    pub loading: bool,
    /// Last storage failure, if the leaderboard is degraded
    pub store_error: Option<String>,
    /// Entry saved by the latest submit
    pub last_winner: Option<Winner>,
}

pub struct Session {
    state: GameState,
    worker: Option<StoreWorker>,
    store_timeout: Duration,
    leaders: Vec<Winner>,
    store_error: Option<String>,
    last_winner: Option<Winner>,
    job: Option<StoreJob>,
}

impl Session {
    /// Validate settings and start in Title. The title-screen leaderboard
    /// loads in the background.
    pub fn new(
        settings: &Settings,
        store: Arc<LeaderboardStore>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut session = Self {
            state: GameState::new(settings, seed),
            worker: None,
            store_timeout: Duration::from_millis(settings.store_timeout_ms),
            leaders: Vec::new(),
            store_error: None,
            last_winner: None,
            job: None,
        };
        match StoreWorker::spawn(store, settings.top_n) {
            Ok(worker) => session.worker = Some(worker),
            Err(e) => session.record_error("start", e),
        }
        session.dispatch(StoreAction::Load);
        log::info!("Session created with seed {}", seed);
        Ok(session)
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn leaders(&self) -> &[Winner] {
        &self.leaders
    }

    pub fn store_error(&self) -> Option<&str> {
        self.store_error.as_deref()
    }

    /// True while a leaderboard job is outstanding
    pub fn is_loading(&self) -> bool {
        self.job.is_some()
    }

    /// Apply one tick of input. Never waits on the store.
    pub fn update(&mut self, input: &FrameInput) -> GamePhase {
        self.poll_store();

        match self.state.phase {
            GamePhase::Title => {
                if input.start {
                    self.state.start_run();
                    log::info!("Run started");
                }
            }
            GamePhase::Playing => {
                if let TickOutcome::Collided { .. } = tick(&mut self.state, &input.movement) {
                    log::info!("Run over with score {}", self.state.score);
                }
            }
            GamePhase::NameEntry => {
                for c in input.text.chars() {
                    self.state.push_name_char(c);
                }
                if input.backspace {
                    self.state.pop_name_char();
                }
                if input.submit {
                    self.submit();
                }
            }
            GamePhase::Leaderboard => {
                if input.reset {
                    self.reset_leaderboard();
                }
                if input.back {
                    self.state.phase = GamePhase::Title;
                    log::info!("Back to title");
                }
            }
        }

        self.state.phase
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.state.phase,
            player: self.state.player,
            obstacles: self.state.field.obstacles().iter().map(|o| o.rect).collect(),
            score: self.state.score,
            time_ticks: self.state.time_ticks,
            name_buffer: self.state.name_buffer.clone(),
            leaders: self.leaders.clone(),
            loading: self.job.is_some(),
            store_error: self.store_error.clone(),
            last_winner: self.last_winner.clone(),
        }
    }

    /// Block for at most `timeout` until the outstanding leaderboard job
    /// lands. For headless drivers between runs, not for the tick loop.
    /// Returns false if the job is still running.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let report = match &self.job {
            Some(job) => job.wait(timeout),
            None => return true,
        };
        match report {
            Some(report) => {
                self.finish_job(report);
                true
            }
            None => false,
        }
    }

    /// Save the run and show the leaderboard. The name goes to the store
    /// as typed; the store decides what a valid name is.
    fn submit(&mut self) {
        self.store_error = None;
        self.last_winner = None;
        self.dispatch(StoreAction::Save {
            name: self.state.name_buffer.clone(),
            score: self.state.score,
        });
        self.state.phase = GamePhase::Leaderboard;
    }

    fn reset_leaderboard(&mut self) {
        self.store_error = None;
        self.last_winner = None;
        self.dispatch(StoreAction::Reset);
    }

    /// Queue a job. A job still pending is superseded: the worker runs
    /// it anyway, in order, but its report is ignored.
    fn dispatch(&mut self, action: StoreAction) {
        match &self.worker {
            Some(worker) => self.job = Some(worker.submit(action)),
            None => {
                self.leaders.clear();
                self.record_error(
                    action.as_str(),
                    StoreError::Unavailable("leaderboard worker is not running".into()),
                );
            }
        }
    }

    fn poll_store(&mut self) {
        let Some(job) = &self.job else {
            return;
        };
        if let Some(report) = job.try_take() {
            self.finish_job(report);
            return;
        }

        let elapsed = job.elapsed();
        if elapsed >= self.store_timeout {
            let label = job.label();
            self.job = None;
            self.leaders.clear();
            self.record_error(
                label,
                StoreError::Unavailable(format!("{label} timed out after {elapsed:?}")),
            );
        }
    }

    fn finish_job(&mut self, report: JobReport) {
        let label = self.job.take().map_or("job", |job| job.label());
        if let Some(winner) = report.saved {
            log::debug!("Run saved as #{}", winner.id);
            self.last_winner = Some(winner);
        }
        self.leaders = report.leaders;
        if let Some(e) = report.error {
            self.record_error(label, e);
        } else {
            log::debug!("Leaderboard {} done, {} leaders", label, self.leaders.len());
        }
    }

    fn record_error(&mut self, action: &str, error: StoreError) {
        log::warn!("Leaderboard {} failed: {}", action, error);
        self.store_error = Some(error.to_string());
    }
}
