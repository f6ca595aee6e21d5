//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod obstacles;
pub mod rect;
pub mod state;
pub mod tick;

pub use collision::{first_hit, intersects};
pub use obstacles::{FieldConfig, FieldStep, LEFT_BOUNDARY, Obstacle, ObstacleField};
pub use rect::Rect;
pub use state::{GamePhase, GameState, ScoreRule};
pub use tick::{TickOutcome, player_step, tick};
