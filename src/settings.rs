//! Game settings and tuning
//!
//! Loaded from a JSON file by the binary and passed into the core as plain
//! values. Missing keys fall back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Durable medium behind the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Json,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" | "db" => Some(StoreBackend::Sqlite),
            "json" | "file" => Some(StoreBackend::Json),
            _ => None,
        }
    }
}

/// Difficulty knobs consumed by the obstacle field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub base_speed: f32,
    pub spawn_every_start: u32,
    pub spawn_every_min: u32,
    pub spawn_step: u32,
    pub speed_accel: f32,
    pub accel_interval_ticks: u32,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === Leaderboard/Storage ===
    /// Leaderboard page size
    pub top_n: usize,
    /// Lifetime of cached top-N results (0 disables caching)
    pub cache_ttl_seconds: u64,
    /// Store location (SQLite database or JSON file)
    pub db_path: String,
    pub store_backend: StoreBackend,
    /// How long a leaderboard job may run before the session gives up on it
    /// (also the SQLite busy timeout)
    pub store_timeout_ms: u64,

    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Player ===
    pub player_size: f32,
    /// Units moved per tick at full input
    pub player_speed: f32,

    // === Gameplay/Difficulty ===
    pub base_speed: f32,
    pub spawn_every_start: u32,
    pub spawn_every_min: u32,
    pub spawn_step: u32,
    pub speed_accel: f32,
    pub accel_interval_ticks: u32,
    pub score_every_ticks: u32,
    pub score_increment: u64,

    // === Obstacles ===
    pub obstacle_width: f32,
    pub obstacle_min_height: f32,
    pub obstacle_max_height: f32,

    // === Input ===
    pub gamepad_deadzone: f32,
    pub invert_y: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            cache_ttl_seconds: 30,
            db_path: "limbo_runner.db".to_string(),
            store_backend: StoreBackend::Sqlite,
            store_timeout_ms: 2000,

            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            player_size: PLAYER_SIZE,
            player_speed: 4.0,

            base_speed: 4.0,
            spawn_every_start: 60,
            spawn_every_min: 24,
            spawn_step: 4,
            speed_accel: 0.4,
            accel_interval_ticks: 300,
            score_every_ticks: 10,
            score_increment: 1,

            obstacle_width: 20.0,
            obstacle_min_height: 40.0,
            obstacle_max_height: 180.0,

            gamepad_deadzone: 0.2,
            invert_y: false,
        }
    }
}

impl Settings {
    /// Difficulty knobs for the obstacle field
    pub fn difficulty(&self) -> Difficulty {
        Difficulty {
            base_speed: self.base_speed,
            spawn_every_start: self.spawn_every_start,
            spawn_every_min: self.spawn_every_min,
            spawn_step: self.spawn_step,
            speed_accel: self.speed_accel,
            accel_interval_ticks: self.accel_interval_ticks,
        }
    }

    /// Reject values that would break the simulation's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("fieldWidth", self.field_width),
            ("fieldHeight", self.field_height),
            ("playerSize", self.player_size),
            ("obstacleWidth", self.obstacle_width),
            ("obstacleMinHeight", self.obstacle_min_height),
            ("obstacleMaxHeight", self.obstacle_max_height),
            ("baseSpeed", self.base_speed),
        ];
        for (field, value) in positive {
            // Also rejects NaN
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.player_speed >= 0.0) || !self.player_speed.is_finite() {
            return Err(ConfigError::NotPositive {
                field: "playerSpeed",
                value: self.player_speed,
            });
        }
        if !(self.speed_accel >= 0.0) || !self.speed_accel.is_finite() {
            return Err(ConfigError::NotPositive {
                field: "speedAccel",
                value: self.speed_accel,
            });
        }

        let intervals = [
            ("spawnEveryStart", self.spawn_every_start),
            ("spawnEveryMin", self.spawn_every_min),
            ("accelIntervalTicks", self.accel_interval_ticks),
            ("scoreEveryTicks", self.score_every_ticks),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        if self.store_timeout_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "storeTimeoutMs",
            });
        }
        if self.spawn_every_min > self.spawn_every_start {
            return Err(ConfigError::SpawnFloorAboveStart {
                min: self.spawn_every_min,
                start: self.spawn_every_start,
            });
        }

        if self.obstacle_min_height >= self.obstacle_max_height
            || self.obstacle_max_height > self.field_height
        {
            return Err(ConfigError::ObstacleHeights {
                min: self.obstacle_min_height,
                max: self.obstacle_max_height,
                field: self.field_height,
            });
        }
        if self.player_size > self.field_width || self.player_size > self.field_height {
            return Err(ConfigError::PlayerTooLarge {
                size: self.player_size,
                width: self.field_width,
                height: self.field_height,
            });
        }
        Ok(())
    }

    /// Load settings from a JSON file, falling back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("No settings at {} ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Malformed settings in {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
