//! Game state and core simulation types
//!
//! Owned by the tick loop; not shared across threads.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacles::{FieldConfig, ObstacleField};
use super::rect::Rect;
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the start signal
    Title,
    /// Active run
    Playing,
    /// Run ended, player types a name
    NameEntry,
    /// Scores on display
    Leaderboard,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Title => "title",
            GamePhase::Playing => "playing",
            GamePhase::NameEntry => "name-entry",
            GamePhase::Leaderboard => "leaderboard",
        }
    }
}

/// Scoring cadence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRule {
    pub every_ticks: u32,
    pub increment: u64,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the obstacle generator was built from
    pub seed: u64,
    pub phase: GamePhase,
    pub player: Rect,
    /// Player movement per tick at full input
    pub player_speed: f32,
    pub field: ObstacleField,
    /// Score of the current (or last) run
    pub score: u64,
    /// Ticks elapsed in the current run
    pub time_ticks: u64,
    pub score_rule: ScoreRule,
    /// Name typed during NameEntry
    pub name_buffer: String,
}

impl GameState {
    /// Build the state from validated settings.
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let field = ObstacleField::new(
            FieldConfig::from_settings(settings),
            Pcg32::seed_from_u64(seed),
        );
        Self {
            seed,
            phase: GamePhase::Title,
            player: Self::player_start(settings.player_size, field.config()),
            player_speed: settings.player_speed,
            field,
            score: 0,
            time_ticks: 0,
            score_rule: ScoreRule {
                every_ticks: settings.score_every_ticks.max(1),
                increment: settings.score_increment,
            },
            name_buffer: String::with_capacity(MAX_NAME_CHARS),
        }
    }

    /// Left side, vertically centered
    fn player_start(size: f32, field: &FieldConfig) -> Rect {
        let x = PLAYER_START_X.min(field.width - size).max(0.0);
        Rect::new(x, (field.height - size) / 2.0, size, size)
    }

    /// Begin a new run from baseline
    pub fn start_run(&mut self) {
        let size = self.player.w;
        self.player = Self::player_start(size, self.field.config());
        self.field.reset();
        self.score = 0;
        self.time_ticks = 0;
        self.name_buffer.clear();
        self.phase = GamePhase::Playing;
    }

    /// Freeze the run and open name entry
    pub fn end_run(&mut self) {
        self.name_buffer.clear();
        self.phase = GamePhase::NameEntry;
    }

    /// Append a typed character. Control characters are dropped and the
    /// buffer stops growing at `MAX_NAME_CHARS`. Returns true if appended.
    pub fn push_name_char(&mut self, c: char) -> bool {
        if c.is_control() || self.name_buffer.chars().count() >= MAX_NAME_CHARS {
            return false;
        }
        self.name_buffer.push(c);
        true
    }

    pub fn pop_name_char(&mut self) -> Option<char> {
        self.name_buffer.pop()
    }
}
