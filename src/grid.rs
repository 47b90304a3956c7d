// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Binary bird's-eye occupancy grid.
//!
//! The grid is row-major with rows along the longitudinal axis and columns
//! along the lateral axis. The sensor sits at the center cell. The lateral
//! coordinate is negated before projection so that columns follow the
//! consumer's drawing convention.
//!
//! ```text
//!   row = round(x / res) + height / 2
//!   col = round(-y / res) + width / 2
//!   idx = row * width + col
//! ```
//!
//! Points must lie strictly inside the configured extents. A point just below
//! a positive extent can round one cell past the last row or column; that
//! overshoot is folded into the edge cell. Any other index outside the array
//! is dropped for that point alone.

use crate::{cloud::Points, config::GridConfig};
use tracing::trace;

/// Cell value for free or unobserved space.
pub const FREE: i8 = 0;
/// Cell value for an occupied cell.
pub const OCCUPIED: i8 = 100;

/// Fixed-extent binary occupancy grid.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    resolution: f64,
    data: Vec<i8>,
}

impl OccupancyGrid {
    /// All-free grid sized by `config`.
    pub fn new(config: &GridConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            resolution: config.resolution,
            data: vec![FREE; config.cells()],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Row-major cell values.
    pub fn data(&self) -> &[i8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<i8> {
        self.data
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.data.iter().filter(|&&c| c == OCCUPIED).count()
    }

    /// Reset every cell to [`FREE`].
    pub fn clear(&mut self) {
        self.data.fill(FREE);
    }

    /// Mark `idx` as occupied. Returns false when `idx` is outside the grid.
    pub fn mark(&mut self, idx: usize) -> bool {
        match self.data.get_mut(idx) {
            Some(cell) => {
                *cell = OCCUPIED;
                true
            }
            None => false,
        }
    }
}

/// Map a coordinate onto one grid axis of `cells` cells centered on zero.
fn axis_cell(value: f64, resolution: f64, cells: u32) -> Option<usize> {
    let cells = cells as i64;
    let cell = (value / resolution).round() as i64 + cells / 2;
    if (0..cells).contains(&cell) {
        Some(cell as usize)
    } else if cell == cells {
        Some((cells - 1) as usize)
    } else {
        None
    }
}

/// True when `(x, y)` in sensor coordinates lies strictly inside the grid
/// extents.
pub fn in_extents(x: f64, y: f64, config: &GridConfig) -> bool {
    let y = -y;
    x > config.back_m && x < config.front_m && y > config.right_m && y < config.left_m
}

/// Cell index of a point at `(x, y)` in sensor coordinates, or `None` when it
/// lies outside the extents or cannot be placed in the array.
pub fn cell_index(x: f64, y: f64, config: &GridConfig) -> Option<usize> {
    if !in_extents(x, y, config) {
        return None;
    }
    array_cell(x, y, config)
}

/// Cell index of `(x, y)` without the extent check.
fn array_cell(x: f64, y: f64, config: &GridConfig) -> Option<usize> {
    let row = axis_cell(x, config.resolution, config.height)?;
    let col = axis_cell(-y, config.resolution, config.width)?;
    Some(row * config.width as usize + col)
}

/// Mark every cell hit by a point of `cloud`. Returns the number of points
/// rasterized.
///
/// Points outside the extents are skipped silently. Points inside the extents
/// that still miss the cell array are logged at trace level.
pub fn rasterize_into(cloud: &Points, config: &GridConfig, grid: &mut OccupancyGrid) -> usize {
    let mut marked = 0;
    for point in cloud.iter() {
        if !in_extents(point.x, point.y, config) {
            continue;
        }
        match array_cell(point.x, point.y, config) {
            Some(idx) if grid.mark(idx) => marked += 1,
            _ => trace!(x = point.x, y = point.y, "grid cell out of range"),
        }
    }
    marked
}

/// Project `cloud` into a fresh grid.
pub fn rasterize(cloud: &Points, config: &GridConfig) -> OccupancyGrid {
    let mut grid = OccupancyGrid::new(config);
    rasterize_into(cloud, config, &mut grid);
    grid
}
