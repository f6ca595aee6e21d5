//! Limbo Runner - A dodge-the-obstacles arcade loop
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, obstacles, collisions, phases)
//! - `session`: Phase state machine wired to the leaderboard
//! - `store`: Durable leaderboard with a TTL cache of top-N queries
//! - `input`: Boundary types for device adapters
//! - `settings`: Data-driven tuning and storage configuration

pub mod error;
pub mod input;
pub mod session;
pub mod settings;
pub mod sim;
pub mod store;

pub use error::{ConfigError, StoreError};
pub use input::{FrameInput, InputSource, MoveIntent};
pub use session::{Session, Snapshot};
pub use settings::{Settings, StoreBackend};
pub use store::{LeaderboardStore, Winner};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Player spawn position (left side, vertically centered)
    pub const PLAYER_START_X: f32 = 60.0;
    pub const PLAYER_SIZE: f32 = 30.0;

    /// Leaderboard defaults
    pub const DEFAULT_TOP_N: usize = 10;
    pub const MAX_NAME_CHARS: usize = 16;
    pub const DEFAULT_PLAYER_NAME: &str = "PLAYER";
}
