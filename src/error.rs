//! Error types for the storage and configuration boundaries

use thiserror::Error;

/// Errors surfaced by the leaderboard store.
///
/// None of these are fatal: the session degrades to an empty leaderboard
/// and keeps running.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A value cannot be represented by the durable medium.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The durable medium could not be read or written.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The store was closed.
    #[error("Store is closed")]
    Closed,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Unavailable(format!("corrupt leaderboard file: {e}"))
    }
}

/// Invalid settings, rejected before a session is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must be at least 1")]
    ZeroInterval { field: &'static str },

    #[error("spawnEveryMin ({min}) exceeds spawnEveryStart ({start})")]
    SpawnFloorAboveStart { min: u32, start: u32 },

    #[error("obstacle heights {min}..{max} do not fit a field of height {field}")]
    ObstacleHeights { min: f32, max: f32, field: f32 },

    #[error("player size {size} does not fit the {width}x{height} field")]
    PlayerTooLarge { size: f32, width: f32, height: f32 },
}
