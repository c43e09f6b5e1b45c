//! Explosion and victory-dance animation sequences
//!
//! Both are frame-indexed: the simulation advances them one frame per tick and
//! front ends read the current frame for drawing.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Opaque RGBA color for explosion frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const GRAY: Rgba = Rgba(128, 128, 128, 255);
    pub const RED: Rgba = Rgba(255, 0, 0, 255);
    pub const ORANGE: Rgba = Rgba(255, 165, 0, 255);
    pub const YELLOW: Rgba = Rgba(255, 255, 0, 255);
    pub const WHITE: Rgba = Rgba(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba(0, 0, 0, 255);
}

/// Radius multipliers of the six-frame explosion
pub const FRAME_SCALES: [f64; 6] = [1.175, 1.0, 0.9, 0.6, 0.45, 0.0];

/// Colors paired with [`FRAME_SCALES`]
pub const FRAME_COLORS: [Rgba; 6] = [
    Rgba::GRAY,
    Rgba::RED,
    Rgba::ORANGE,
    Rgba::YELLOW,
    Rgba::WHITE,
    Rgba::BLACK,
];

/// Radius multipliers that get a vector outline (frames 2 to 5)
const VECTOR_SCALES: [f64; 4] = [1.0, 0.9, 0.6, 0.45];

/// Outline height relative to width
const VECTOR_ASPECT: f64 = 0.825;

/// Normalized starburst outline, closed (last point repeats the first)
#[rustfmt::skip]
pub const VECTOR_SHAPE: [(f64, f64); 39] = [
    (0.582, 0.988), (0.608, 0.850), (0.663, 0.788), (0.738, 0.800),
    (0.863, 0.838), (0.813, 0.713), (0.819, 0.650), (0.875, 0.588),
    (1.000, 0.563), (0.850, 0.450), (0.825, 0.400), (0.830, 0.340),
    (0.925, 0.238), (0.775, 0.243), (0.694, 0.225), (0.650, 0.188), (0.630, 0.105),
    (0.625, 0.025), (0.535, 0.150), (0.475, 0.175), (0.425, 0.150),
    (0.325, 0.044), (0.325, 0.150), (0.315, 0.208), (0.288, 0.250), (0.225, 0.275),
    (0.053, 0.288), (0.150, 0.392), (0.175, 0.463), (0.144, 0.525),
    (0.025, 0.638), (0.163, 0.650), (0.225, 0.693), (0.250, 0.775),
    (0.225, 0.905), (0.360, 0.825), (0.450, 0.823), (0.525, 0.863),
    (0.582, 0.988),
];

/// Scale [`VECTOR_SHAPE`] into a `width` × `height` box at `offset`
pub fn scale_vector(width: f64, height: f64, offset: DVec2) -> Vec<DVec2> {
    VECTOR_SHAPE
        .iter()
        .map(|&(x, y)| offset + DVec2::new(x * width, y * height))
        .collect()
}

/// How explosion frames are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionStyle {
    /// Integer radii growing 1..=R then shrinking from 1.5R to 1, no colors
    Classic,
    /// Six colored frames, optionally with vector outlines
    Modern { vectors: bool },
}

/// An animated blast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: DVec2,
    pub radii: Vec<f64>,
    /// One color per radius (modern style only)
    pub colors: Vec<Rgba>,
    /// Outline per vector frame (modern style with vectors only)
    pub vectors: Vec<Vec<DVec2>>,
    pub frame: usize,
    pub active: bool,
}

impl Explosion {
    /// Build an active explosion at `pos` with base radius `base`
    pub fn new(pos: DVec2, base: f64, style: ExplosionStyle) -> Self {
        let mut explosion = Self {
            pos,
            active: true,
            ..Default::default()
        };
        match style {
            ExplosionStyle::Classic => {
                let grow = (1..=base as i64).map(|i| i as f64);
                let shrink = (1..=(base * 1.5) as i64).rev().map(|i| i as f64);
                explosion.radii = grow.chain(shrink).collect();
            }
            ExplosionStyle::Modern { vectors } => {
                explosion.radii = FRAME_SCALES.iter().map(|s| base * s).collect();
                explosion.colors = FRAME_COLORS.to_vec();
                if vectors {
                    explosion.vectors = VECTOR_SCALES
                        .iter()
                        .map(|s| {
                            let r = base * s;
                            let offset = pos - DVec2::new(r, r * VECTOR_ASPECT);
                            scale_vector(2.0 * r, 2.0 * r * VECTOR_ASPECT, offset)
                        })
                        .collect();
                }
            }
        }
        explosion
    }

    /// Largest radius the animation reaches, never below `base`
    pub fn max_radius(&self, base: f64) -> f64 {
        self.radii.iter().copied().fold(base, f64::max)
    }

    /// Advance one frame; returns true on the tick the animation finishes
    pub fn advance(&mut self) -> bool {
        if self.frame + 1 < self.radii.len() {
            self.frame += 1;
            false
        } else {
            self.active = false;
            true
        }
    }
}

/// Y offsets of the winner's bounce
pub const DANCE_FRAMES: [f64; 4] = [-3.0, 0.0, -3.0, 0.0];

/// Victory bounce applied to the winning gorilla while the blast plays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dance {
    idx: usize,
    frames: Vec<f64>,
    frame: usize,
    base_y: f64,
    pub active: bool,
}

impl Dance {
    pub fn new(idx: usize, frames: Vec<f64>, base_y: f64) -> Self {
        Self {
            idx,
            frames,
            frame: 0,
            base_y,
            active: true,
        }
    }

    /// Gorilla index this dance moves
    pub fn gorilla(&self) -> usize {
        self.idx
    }

    pub fn base_y(&self) -> f64 {
        self.base_y
    }

    /// Y for the next tick and whether a frame was played.
    ///
    /// Returns `None` when inactive. Once the frames run out the gorilla is
    /// put back on `base_y` and the dance stops.
    pub fn advance(&mut self) -> Option<(f64, bool)> {
        if !self.active {
            return None;
        }
        match self.frames.get(self.frame) {
            Some(offset) => {
                self.frame += 1;
                Some((self.base_y + offset, true))
            }
            None => {
                self.active = false;
                Some((self.base_y, false))
            }
        }
    }
}
