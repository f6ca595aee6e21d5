//! Axis-aligned rectangle geometry
//!
//! Shared by the player and obstacles. No rotation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Create a rectangle.
    ///
    /// # Panics
    ///
    /// Panics if `w` or `h` is not strictly positive. Sizes come from
    /// validated settings, so a bad size here is a programming error.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        assert!(w > 0.0 && h > 0.0, "rect size must be positive, got {w}x{h}");
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Move by an offset
    #[inline]
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Keep the rectangle inside `[0, width] x [0, height]`
    pub fn clamp_within(&mut self, width: f32, height: f32) {
        self.x = self.x.clamp(0.0, (width - self.w).max(0.0));
        self.y = self.y.clamp(0.0, (height - self.h).max(0.0));
    }
}
