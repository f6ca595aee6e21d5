//! Background store worker
//!
//! One thread per session owns every leaderboard read and write, so the
//! tick loop never waits on the durable medium. Jobs run in submission
//! order; the tick loop polls each job's handle without blocking.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use super::{LeaderboardStore, Winner};
use crate::error::StoreError;

/// Work the session hands to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// Read the top-N page
    Load,
    /// Record a run, then read the page
    Save { name: String, score: u64 },
    /// Delete every winner, then read the page
    Reset,
}

impl StoreAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreAction::Load => "load",
            StoreAction::Save { .. } => "save",
            StoreAction::Reset => "reset",
        }
    }
}

/// Outcome of one job
#[derive(Debug, Default)]
pub struct JobReport {
    /// Entry written by a save
    pub saved: Option<Winner>,
    /// Page read after the action; empty when the read failed
    pub leaders: Vec<Winner>,
    /// First failure, if any
    pub error: Option<StoreError>,
}

impl JobReport {
    fn failed(error: StoreError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

struct Request {
    action: StoreAction,
    reply: Sender<JobReport>,
}

/// Handle to the worker thread. Dropping it lets the thread finish the
/// queued jobs and exit.
#[derive(Debug)]
pub struct StoreWorker {
    tx: Sender<Request>,
    limit: usize,
}

impl StoreWorker {
    /// Start a worker that reads pages of `limit` winners
    pub fn spawn(store: Arc<LeaderboardStore>, limit: usize) -> Result<Self, StoreError> {
        let (tx, rx) = mpsc::channel::<Request>();
        thread::Builder::new()
            .name("leaderboard-store".into())
            .spawn(move || {
                for request in rx {
                    let report = run(&store, request.action, limit);
                    // The session may have stopped waiting
                    let _ = request.reply.send(report);
                }
                log::debug!("Leaderboard worker stopped");
            })?;
        Ok(Self { tx, limit })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Queue a job; never blocks
    pub fn submit(&self, action: StoreAction) -> StoreJob {
        let (reply, rx) = mpsc::channel();
        let label = action.as_str();
        log::debug!("Queued leaderboard {}", label);
        if self.tx.send(Request { action, reply }).is_err() {
            // The reply sender went down with the request; polling reports it
            log::warn!("Leaderboard worker is gone, {} dropped", label);
        }
        StoreJob {
            label,
            started: Instant::now(),
            rx,
        }
    }
}

fn run(store: &LeaderboardStore, action: StoreAction, limit: usize) -> JobReport {
    let mut report = JobReport::default();
    let done = match action {
        StoreAction::Load => Ok(()),
        StoreAction::Save { name, score } => match store.save_winner(&name, score) {
            Ok(winner) => {
                report.saved = Some(winner);
                Ok(())
            }
            Err(e) => Err(e),
        },
        StoreAction::Reset => store.reset(),
    };
    report.error = done.err();

    match store.top_winners(limit) {
        Ok(leaders) => report.leaders = leaders,
        Err(e) => {
            report.error.get_or_insert(e);
        }
    }
    report
}

/// An in-flight job
#[derive(Debug)]
pub struct StoreJob {
    label: &'static str,
    started: Instant,
    rx: Receiver<JobReport>,
}

impl StoreJob {
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Time since the job was queued
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The report if the worker is done; never blocks.
    pub fn try_take(&self) -> Option<JobReport> {
        match self.rx.try_recv() {
            Ok(report) => Some(report),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(JobReport::failed(gone())),
        }
    }

    /// Wait at most `timeout` for the report. `None` if still running.
    pub fn wait(&self, timeout: Duration) -> Option<JobReport> {
        match self.rx.recv_timeout(timeout) {
            Ok(report) => Some(report),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(JobReport::failed(gone())),
        }
    }
}

fn gone() -> StoreError {
    StoreError::Unavailable("leaderboard worker exited".into())
}
