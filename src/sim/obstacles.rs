//! Obstacle spawning, motion and the difficulty ramp
//!
//! Obstacles enter at the right edge and slide left. The field gets harder
//! on a fixed tick schedule: spawns come more often (down to a floor) and
//! obstacles move faster (no ceiling). Only placement is random, drawn from
//! the injected generator.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::settings::{Difficulty, Settings};

/// Left edge of the play field; anything fully past it is pruned.
pub const LEFT_BOUNDARY: f32 = 0.0;

/// A moving obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub rect: Rect,
    /// Horizontal velocity in units per tick (always negative)
    pub vx: f32,
}

impl Obstacle {
    pub fn new(id: u32, rect: Rect, vx: f32) -> Self {
        debug_assert!(vx < 0.0, "obstacles move left");
        Self { id, rect, vx }
    }

    /// Still (partly) on screen
    #[inline]
    pub fn is_live(&self) -> bool {
        self.rect.right() > LEFT_BOUNDARY
    }
}

/// Static shape of the field and its obstacles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    pub obstacle_width: f32,
    pub obstacle_min_height: f32,
    pub obstacle_max_height: f32,
    pub difficulty: Difficulty,
}

impl FieldConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            width: settings.field_width,
            height: settings.field_height,
            obstacle_width: settings.obstacle_width,
            obstacle_min_height: settings.obstacle_min_height,
            obstacle_max_height: settings.obstacle_max_height,
            difficulty: settings.difficulty(),
        }
    }
}

/// What changed during one field step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStep {
    /// Id of the obstacle spawned this tick
    pub spawned: Option<u32>,
    /// Ids of obstacles pruned off the left edge this tick
    pub expired: Vec<u32>,
}

/// Owns the live obstacles and the difficulty knobs
#[derive(Debug, Clone)]
pub struct ObstacleField {
    config: FieldConfig,
    rng: Pcg32,
    obstacles: Vec<Obstacle>,
    /// Ticks between spawns (shrinks with the ramp)
    spawn_interval: u32,
    /// Leftward distance per tick (grows with the ramp)
    speed: f32,
    /// Ticks until the next spawn
    spawn_countdown: u32,
    next_id: u32,
}

impl ObstacleField {
    pub fn new(config: FieldConfig, rng: Pcg32) -> Self {
        Self {
            spawn_interval: config.difficulty.spawn_every_start,
            speed: config.difficulty.base_speed,
            config,
            rng,
            obstacles: Vec::with_capacity(16),
            spawn_countdown: 0,
            next_id: 1,
        }
    }

    /// Back to baseline difficulty with no obstacles. The generator keeps
    /// its position so consecutive runs differ.
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.spawn_interval = self.config.difficulty.spawn_every_start;
        self.speed = self.config.difficulty.base_speed;
        self.spawn_countdown = 0;
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn spawn_interval(&self) -> u32 {
        self.spawn_interval
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Spawn on cadence, move everything left, prune what has left the field.
    pub fn step(&mut self) -> FieldStep {
        let mut step = FieldStep::default();

        if self.spawn_countdown == 0 {
            step.spawned = Some(self.spawn());
            self.spawn_countdown = self.spawn_interval;
        }
        self.spawn_countdown -= 1;

        let vx = -self.speed;
        for obstacle in &mut self.obstacles {
            obstacle.vx = vx;
            obstacle.rect.x += vx;
        }

        let expired = &mut step.expired;
        self.obstacles.retain(|o| {
            let live = o.is_live();
            if !live {
                expired.push(o.id);
            }
            live
        });

        step
    }

    /// Apply one ramp step when `elapsed_ticks` lands on the ramp interval.
    /// Returns true when the difficulty changed.
    pub fn ramp_for_tick(&mut self, elapsed_ticks: u64) -> bool {
        let interval = u64::from(self.config.difficulty.accel_interval_ticks.max(1));
        if elapsed_ticks == 0 || elapsed_ticks % interval != 0 {
            return false;
        }
        let d = self.config.difficulty;
        self.spawn_interval = self
            .spawn_interval
            .saturating_sub(d.spawn_step)
            .max(d.spawn_every_min);
        self.speed += d.speed_accel;
        log::debug!(
            "Difficulty ramp at tick {}: spawn every {} ticks, speed {:.2}",
            elapsed_ticks,
            self.spawn_interval,
            self.speed
        );
        true
    }

    /// Place an obstacle directly (scripted layouts)
    pub fn insert(&mut self, rect: Rect) -> u32 {
        let id = self.next_obstacle_id();
        self.obstacles.push(Obstacle::new(id, rect, -self.speed));
        id
    }

    /// Remove the obstacle at `index` (e.g. the one the player hit)
    pub fn remove(&mut self, index: usize) -> Option<Obstacle> {
        (index < self.obstacles.len()).then(|| self.obstacles.remove(index))
    }

    fn next_obstacle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn spawn(&mut self) -> u32 {
        let c = self.config;
        let height = self
            .rng
            .random_range(c.obstacle_min_height..c.obstacle_max_height);
        let y = self.rng.random_range(0.0..=(c.height - height));
        let id = self.next_obstacle_id();
        self.obstacles.push(Obstacle::new(
            id,
            Rect::new(c.width, y, c.obstacle_width, height),
            -self.speed,
        ));
        log::debug!("Spawned obstacle {} at y={:.1} h={:.1}", id, y, height);
        id
    }
}
