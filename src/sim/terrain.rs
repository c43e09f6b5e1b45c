//! Skyline buildings and their accumulated blast damage
//!
//! A building is a rectangle standing on the ground line. Explosions never
//! shrink the rectangle itself; they append damage circles, and any point
//! inside one of them is treated as open air from then on.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One explosion's erosion mark on one building
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageCircle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl DamageCircle {
    /// Inclusive radius test
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.r * self.r
    }
}

/// A building footprint, measured from the left edge and the ground line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub x: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub damage: Vec<DamageCircle>,
}

impl Building {
    pub fn new(x: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            w,
            h,
            damage: Vec::new(),
        }
    }

    /// Screen Y of the roof for a playfield of the given height
    #[inline]
    pub fn top(&self, field_height: f64) -> f64 {
        field_height - self.h
    }

    /// Centre of the roof, where a gorilla stands
    pub fn roof_center(&self, field_height: f64) -> (f64, f64) {
        (self.x + self.w / 2.0, self.top(field_height))
    }

    /// True if (x, y) lies inside any recorded damage circle
    pub fn point_in_damage(&self, x: f64, y: f64) -> bool {
        self.damage.iter().any(|d| d.contains(x, y))
    }

    /// Whether a circle touches the building's bounding box (edges excluded)
    pub fn overlaps_circle(&self, x: f64, y: f64, r: f64, field_height: f64) -> bool {
        let (bx1, bx2) = (self.x, self.x + self.w);
        let (by1, by2) = (self.top(field_height), field_height);
        !(x + r <= bx1 || x - r >= bx2 || y + r <= by1 || y - r >= by2)
    }
}

/// Skyline profile, picked uniformly per round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    Rising,
    Falling,
    /// Peak in the middle (two of the six draws land here)
    Peak,
    Valley,
    Flat,
}

impl Slope {
    /// Map a 1..=6 draw onto a profile
    fn from_draw(n: u32) -> Self {
        match n {
            1 => Slope::Rising,
            2 => Slope::Falling,
            3 | 5 => Slope::Peak,
            4 => Slope::Valley,
            _ => Slope::Flat,
        }
    }

    /// Draws 2 and 6 start from a tall first building
    fn starts_high(n: u32) -> bool {
        n == 2 || n == 6
    }
}

/// Generate a sloped skyline of `count` equal-width buildings.
///
/// Heights follow the chosen slope in steps of `height / 35`, get a random
/// jitter of ±`height / 12`, and are clamped to 15%..60% of the field height.
pub fn generate_skyline<R: Rng>(
    rng: &mut R,
    width: i32,
    height: i32,
    count: usize,
) -> Vec<Building> {
    let (w, h) = (width as f64, height as f64);
    let bw = w / count as f64;

    let draw = rng.random_range(1..=6u32);
    let slope = Slope::from_draw(draw);
    let mut new_ht = if Slope::starts_high(draw) { h * 0.6 } else { h * 0.2 };
    let ht_inc = h / 35.0;

    let mut buildings = Vec::with_capacity(count);
    for i in 0..count {
        let x = i as f64 * bw;
        let past_middle = x > w / 2.0;
        match slope {
            Slope::Rising => new_ht += ht_inc,
            Slope::Falling => new_ht -= ht_inc,
            Slope::Peak if past_middle => new_ht -= 2.0 * ht_inc,
            Slope::Peak => new_ht += 2.0 * ht_inc,
            Slope::Valley if past_middle => new_ht += 2.0 * ht_inc,
            Slope::Valley => new_ht -= 2.0 * ht_inc,
            Slope::Flat => {}
        }

        let jitter = rng.random::<f64>() * h / 6.0 - h / 12.0;
        let bh = (new_ht + jitter).clamp(h * 0.15, h * 0.6);
        buildings.push(Building::new(x, bw, bh));
    }
    buildings
}
