//! The sun: a passive target that flinches and wears down when hit
//!
//! Bananas fly straight through it. Each tick a banana spends inside the hit
//! box costs one integrity point and the box shrinks with the remaining
//! integrity.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Integrity of a fresh sun
pub const SUN_MAX_INTEGRITY: u32 = 4;
/// Ticks the sun stays shocked after a hit
pub const SUN_SHOCK_TICKS: u32 = 10;
/// Hit box half-size at full integrity
pub const SUN_RADIUS: f64 = 20.0;
/// Distance of the sun centre from the right and top edges
pub const SUN_INSET: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sun {
    pub pos: DVec2,
    /// Half-size of the hit box at full integrity
    pub radius: f64,
    pub integrity: u32,
    pub hit_ticks: u32,
}

impl Sun {
    pub fn new(pos: DVec2, radius: f64) -> Self {
        Self {
            pos,
            radius,
            integrity: SUN_MAX_INTEGRITY,
            hit_ticks: 0,
        }
    }

    /// Graphical layout: top-right corner, inset from both edges
    pub fn for_field(width: i32) -> Self {
        Self::new(DVec2::new(width as f64 - SUN_INSET, SUN_INSET), SUN_RADIUS)
    }

    pub fn is_gone(&self) -> bool {
        self.integrity == 0
    }

    pub fn is_shocked(&self) -> bool {
        self.hit_ticks > 0
    }

    /// Current half-size of the hit box
    pub fn hit_radius(&self) -> f64 {
        self.radius * self.integrity as f64 / SUN_MAX_INTEGRITY as f64
    }

    /// Register a banana at `pos`; returns true if it struck the sun
    pub fn check_hit(&mut self, pos: DVec2) -> bool {
        if self.is_gone() {
            return false;
        }
        let r = self.hit_radius();
        let d = (pos - self.pos).abs();
        if d.x <= r && d.y <= r {
            self.hit_ticks = SUN_SHOCK_TICKS;
            self.integrity -= 1;
            true
        } else {
            false
        }
    }

    /// Per-tick decay of the shocked face
    pub fn tick(&mut self) {
        self.hit_ticks = self.hit_ticks.saturating_sub(1);
    }

    pub fn restore(&mut self) {
        self.integrity = SUN_MAX_INTEGRITY;
        self.hit_ticks = 0;
    }
}
