// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Tunables for the segmentation pipeline and the occupancy grid.

use crate::cloud::Error;

/// Default lateral training gate (meters).
pub const DEFAULT_Y_LIMIT_M: f64 = 1.5;
/// Default base tolerance (meters).
pub const DEFAULT_TOLERANCE_M: f64 = 1.0;
/// Default tolerance growth per ring index.
pub const DEFAULT_TOLERANCE_FACTOR: f64 = 0.12;

/// Occupancy grid geometry.
///
/// Rows run along the longitudinal (x) axis and columns along the lateral
/// axis, so `height` covers `back_m..front_m` and `width` covers
/// `right_m..left_m`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Cells along the lateral axis.
    pub width: u32,
    /// Cells along the longitudinal axis.
    pub height: u32,
    /// Cell edge length (meters).
    pub resolution: f64,
    /// Exclusive forward bound (meters).
    pub front_m: f64,
    /// Exclusive rearward bound (meters, negative).
    pub back_m: f64,
    /// Exclusive left bound after the lateral flip (meters).
    pub left_m: f64,
    /// Exclusive right bound after the lateral flip (meters, negative).
    pub right_m: f64,
}

impl GridConfig {
    /// Symmetric grid covering `±longitudinal_m` by `±lateral_m`.
    pub fn symmetric(
        width: u32,
        height: u32,
        resolution: f64,
        longitudinal_m: f64,
        lateral_m: f64,
    ) -> Self {
        Self {
            width,
            height,
            resolution,
            front_m: longitudinal_m,
            back_m: -longitudinal_m,
            left_m: lateral_m,
            right_m: -lateral_m,
        }
    }

    /// Total number of cells.
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::symmetric(120, 400, 0.10, 20.0, 6.0)
    }
}

/// Parameters shared by the classifier, filter and rasterizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Half-width of the lateral corridor used for histogram training.
    pub y_limit_m: f64,
    /// Base distance tolerance for ring 0.
    pub tolerance_m: f64,
    /// Linear growth of the tolerance per ring index.
    pub tolerance_factor: f64,
    pub grid: GridConfig,
}

impl SegmentationConfig {
    /// Tolerance half-width for `ring`: `tolerance_m · (1 + tolerance_factor · ring)`.
    #[inline]
    pub fn tolerance(&self, ring: usize) -> f64 {
        self.tolerance_m * (1.0 + self.tolerance_factor * ring as f64)
    }

    /// Reject parameter combinations the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), Error> {
        if !is_positive(self.y_limit_m) {
            return Err(Error::Config(format!(
                "y_limit_m must be positive, got {}",
                self.y_limit_m
            )));
        }
        if !is_positive(self.tolerance_m) {
            return Err(Error::Config(format!(
                "tolerance_m must be positive, got {}",
                self.tolerance_m
            )));
        }
        if self.tolerance_factor.is_nan() || self.tolerance_factor < 0.0 {
            return Err(Error::Config(format!(
                "tolerance_factor must not be negative, got {}",
                self.tolerance_factor
            )));
        }
        let grid = &self.grid;
        if grid.width == 0 || grid.height == 0 {
            return Err(Error::Config(format!(
                "grid must have cells, got {}x{}",
                grid.width, grid.height
            )));
        }
        if !is_positive(grid.resolution) {
            return Err(Error::Config(format!(
                "grid resolution must be positive, got {}",
                grid.resolution
            )));
        }
        if !(grid.back_m < grid.front_m && grid.right_m < grid.left_m) {
            return Err(Error::Config(format!(
                "grid extents are empty: x ({}, {}) y ({}, {})",
                grid.back_m, grid.front_m, grid.right_m, grid.left_m
            )));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            y_limit_m: DEFAULT_Y_LIMIT_M,
            tolerance_m: DEFAULT_TOLERANCE_M,
            tolerance_factor: DEFAULT_TOLERANCE_FACTOR,
            grid: GridConfig::default(),
        }
    }
}
