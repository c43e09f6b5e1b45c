//! Per-pixel occupancy grid used for collision queries
//!
//! Every pixel of the playfield is tagged as empty, building, or one of the two
//! gorillas. Explosions erase pixels, so lookups stay O(query area) no matter
//! how much damage the skyline has accumulated.
//!
//! All operations are clipped to the grid: coordinates outside it are ignored.

use serde::{Deserialize, Serialize};

use super::state::Gorilla;
use super::terrain::Building;

/// Classification of a single pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty = 0,
    Building = 1,
    Gorilla0 = 2,
    Gorilla1 = 3,
}

impl Cell {
    /// Cell value marking gorilla `idx` (anything but 0 maps to the second gorilla)
    pub fn gorilla(idx: usize) -> Self {
        if idx == 0 { Cell::Gorilla0 } else { Cell::Gorilla1 }
    }

    /// Gorilla index stored in this cell, if any
    pub fn gorilla_index(self) -> Option<usize> {
        match self {
            Cell::Gorilla0 => Some(0),
            Cell::Gorilla1 => Some(1),
            _ => None,
        }
    }
}

/// Dense row-major grid indexed by `y * width + x`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitMap {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl HitMap {
    /// Allocate an empty map. Negative dimensions produce an empty grid.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width as usize * height as usize],
        }
    }

    /// Build the map for a freshly generated round: building footprints first,
    /// then a small disc for each gorilla.
    pub fn from_scene(
        width: i32,
        height: i32,
        buildings: &[Building],
        gorillas: &[Gorilla; 2],
    ) -> Self {
        let mut map = Self::new(width, height);
        for b in buildings {
            let x1 = b.x as i32;
            let x2 = (b.x + b.w) as i32;
            let y1 = height - b.h as i32;
            map.add_building(x1, y1, x2, height);
        }
        for (i, g) in gorillas.iter().enumerate() {
            let (x, y) = (g.pos.x as i32, g.pos.y as i32);
            map.draw_gorilla(x, y, i, crate::consts::GORILLA_HIT_RADIUS);
        }
        map
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Indices of in-bounds pixels whose centre lies within `r` of (cx, cy).
    ///
    /// The bounding square is clipped to the grid first, so huge radii and
    /// centres near the `i32` limits only walk on-grid pixels.
    fn circle_cells(&self, cx: i32, cy: i32, r: i32) -> impl Iterator<Item = usize> + '_ {
        let r2 = i64::from(r) * i64::from(r);
        let x0 = cx.saturating_sub(r).max(0);
        let x1 = cx.saturating_add(r).min(self.width - 1);
        let y0 = cy.saturating_sub(r).max(0);
        let y1 = cy.saturating_add(r).min(self.height - 1);
        (y0..=y1).flat_map(move |y| {
            (x0..=x1).filter_map(move |x| {
                let dx = i64::from(x) - i64::from(cx);
                let dy = i64::from(y) - i64::from(cy);
                if (dx * dx).saturating_add(dy * dy) <= r2 {
                    self.index(x, y)
                } else {
                    None
                }
            })
        })
    }

    /// Value at (x, y); out-of-range reads are empty
    pub fn at(&self, x: i32, y: i32) -> Cell {
        self.index(x, y).map_or(Cell::Empty, |i| self.cells[i])
    }

    pub fn set(&mut self, x: i32, y: i32, val: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = val;
        }
    }

    /// Fill the half-open rectangle [x1, x2) × [y1, y2)
    pub fn draw_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, val: Cell) {
        let (x1, y1) = (x1.max(0), y1.max(0));
        let (x2, y2) = (x2.min(self.width), y2.min(self.height));
        for y in y1..y2 {
            let row = (y * self.width) as usize;
            for x in x1..x2 {
                self.cells[row + x as usize] = val;
            }
        }
    }

    pub fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, val: Cell) {
        let hits: Vec<usize> = self.circle_cells(cx, cy, r).collect();
        for i in hits {
            self.cells[i] = val;
        }
    }

    /// Reset every pixel in the circle to empty, whatever it held
    pub fn clear_circle(&mut self, cx: i32, cy: i32, r: i32) {
        self.draw_circle(cx, cy, r, Cell::Empty);
    }

    pub fn any_value_in_circle(&self, cx: i32, cy: i32, r: i32, val: Cell) -> bool {
        self.circle_cells(cx, cy, r).any(|i| self.cells[i] == val)
    }

    pub fn draw_gorilla(&mut self, x: i32, y: i32, idx: usize, r: i32) {
        self.draw_circle(x, y, r, Cell::gorilla(idx));
    }

    /// Remove gorilla `idx` pixels inside the circle, leaving other values alone
    pub fn clear_gorilla(&mut self, x: i32, y: i32, idx: usize, r: i32) {
        let val = Cell::gorilla(idx);
        let hits: Vec<usize> = self
            .circle_cells(x, y, r)
            .filter(|&i| self.cells[i] == val)
            .collect();
        for i in hits {
            self.cells[i] = Cell::Empty;
        }
    }

    /// Lowest gorilla index with any pixel inside the circle
    pub fn gorilla_hit_in_circle(&self, cx: i32, cy: i32, r: i32) -> Option<usize> {
        (0..2).find(|&idx| self.any_value_in_circle(cx, cy, r, Cell::gorilla(idx)))
    }

    pub fn gorilla_hit_at(&self, x: i32, y: i32) -> Option<usize> {
        self.at(x, y).gorilla_index()
    }

    pub fn add_building(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.draw_rect(x1, y1, x2, y2, Cell::Building);
    }

    pub fn clear_building_area(&mut self, cx: i32, cy: i32, r: i32) {
        self.clear_circle(cx, cy, r);
    }

    /// Number of pixels holding `val`
    pub fn count(&self, val: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == val).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_is_clipped() {
        let mut map = HitMap::new(10, 10);
        map.draw_rect(-5, 8, 20, 30, Cell::Building);
        assert_eq!(map.count(Cell::Building), 20);
        assert_eq!(map.at(0, 8), Cell::Building);
        assert_eq!(map.at(9, 9), Cell::Building);
        assert_eq!(map.at(0, 7), Cell::Empty);
    }

    #[test]
    fn test_circle_boundary_is_inclusive() {
        let mut map = HitMap::new(20, 20);
        map.draw_circle(10, 10, 2, Cell::Building);
        assert_eq!(map.at(12, 10), Cell::Building);
        assert_eq!(map.at(10, 8), Cell::Building);
        assert_eq!(map.at(12, 12), Cell::Empty);
        // r = 2 disc covers 13 pixels
        assert_eq!(map.count(Cell::Building), 13);
    }

    #[test]
    fn test_clear_gorilla_keeps_other_values() {
        let mut map = HitMap::new(20, 20);
        map.draw_rect(0, 10, 20, 20, Cell::Building);
        map.draw_gorilla(10, 8, 0, 4);
        map.draw_gorilla(14, 8, 1, 1);
        map.clear_gorilla(10, 8, 0, 4);
        assert_eq!(map.count(Cell::Gorilla0), 0);
        assert_eq!(map.at(14, 8), Cell::Gorilla1);
        assert_eq!(map.at(10, 15), Cell::Building);
    }

    #[test]
    fn test_gorilla_queries() {
        let mut map = HitMap::new(50, 50);
        map.draw_gorilla(10, 10, 0, 4);
        map.draw_gorilla(30, 10, 1, 4);
        assert_eq!(map.gorilla_hit_at(10, 10), Some(0));
        assert_eq!(map.gorilla_hit_at(30, 13), Some(1));
        assert_eq!(map.gorilla_hit_at(20, 10), None);
        // both in range: lowest index wins
        assert_eq!(map.gorilla_hit_in_circle(20, 10, 20), Some(0));
        assert_eq!(map.gorilla_hit_in_circle(30, 20, 6), Some(1));
        assert_eq!(map.gorilla_hit_in_circle(20, 40, 5), None);
    }

    #[test]
    fn test_clear_building_area_erases_everything() {
        let mut map = HitMap::new(30, 30);
        map.add_building(0, 10, 30, 30);
        map.draw_gorilla(15, 9, 1, 4);
        map.clear_building_area(15, 10, 3);
        assert_eq!(map.at(15, 10), Cell::Empty);
        assert_eq!(map.at(15, 9), Cell::Empty);
        assert_eq!(map.at(15, 5), Cell::Gorilla1);
    }

    proptest! {
        #[test]
        fn prop_out_of_range_ops_are_noops(
            x in prop_oneof![-1000i32..-20, 60i32..1000],
            y in -1000i32..1000,
            r in 0i32..15,
        ) {
            let mut map = HitMap::new(40, 40);
            map.add_building(0, 20, 40, 40);
            let before = map.clone();
            map.draw_circle(x, y, r, Cell::Gorilla0);
            map.clear_circle(x, y, r);
            map.set(x, y, Cell::Gorilla1);
            prop_assert_eq!(&map, &before);
            prop_assert_eq!(map.at(x, y), Cell::Empty);
            prop_assert_eq!(map.gorilla_hit_in_circle(x, y, r), None);
        }

        #[test]
        fn prop_clear_circle_only_shrinks_buildings(
            cx in -10i32..50, cy in -10i32..50, r in 0i32..20,
        ) {
            let mut map = HitMap::new(40, 40);
            map.add_building(0, 20, 40, 40);
            let before = map.count(Cell::Building);
            map.clear_building_area(cx, cy, r);
            prop_assert!(map.count(Cell::Building) <= before);
            prop_assert!(!map.any_value_in_circle(cx, cy, r, Cell::Building));
        }

        #[test]
        fn prop_extreme_circles_never_overflow(
            cx in prop_oneof![
                Just(i32::MIN),
                Just(i32::MIN + 100),
                Just(i32::MAX - 2),
                -50i32..50,
            ],
            cy in prop_oneof![Just(i32::MIN + 100), Just(i32::MAX), -50i32..50],
            r in prop_oneof![Just(i32::MAX), 46_341i32..1_000_000, 0i32..20],
        ) {
            let mut map = HitMap::new(20, 20);
            map.add_building(0, 10, 20, 20);
            map.draw_circle(cx, cy, r, Cell::Gorilla1);
            let _ = map.any_value_in_circle(cx, cy, r, Cell::Gorilla1);
            let _ = map.gorilla_hit_in_circle(cx, cy, r);
            map.clear_building_area(cx, cy, r);
            prop_assert!(!map.any_value_in_circle(cx, cy, r, Cell::Building));
        }
    }

    #[test]
    fn test_huge_radius_fills_the_grid() {
        let mut map = HitMap::new(10, 10);
        map.draw_circle(5, 5, 50_000, Cell::Building);
        assert_eq!(map.count(Cell::Building), 100);
        map.clear_circle(i32::MAX - 2, 5, 5);
        assert_eq!(map.count(Cell::Building), 100);
        map.clear_building_area(5, 5, i32::MAX);
        assert_eq!(map.count(Cell::Empty), 100);
    }
}
