// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Per-frame segmentation pipeline.
//!
//! ```text
//! cloud ─► accumulate ─► estimate ─► filter ─► rasterize
//!          (histograms)  (14 ranges) (obstacles) (grid)
//! ```
//!
//! [`Segmenter`] keeps its histogram table between calls only to reuse the
//! allocations. The table is cleared at the start of every frame, so two runs
//! over the same cloud always produce identical results.

use crate::{
    background::BackgroundDistances,
    classify::accumulate,
    cloud::Points,
    config::SegmentationConfig,
    filter::filter_obstacles,
    grid::{OccupancyGrid, rasterize},
    histogram::RingHistograms,
};
use tracing::{debug, info_span, warn};

/// Outputs of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Background distance learned for every ring/side.
    pub background: BackgroundDistances,
    /// Obstacle candidates, a subset of the input in input order.
    pub obstacles: Points,
    /// Occupancy grid of the obstacle candidates.
    pub grid: OccupancyGrid,
}

/// Reusable segmentation state.
pub struct Segmenter {
    config: SegmentationConfig,
    histograms: RingHistograms,
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self {
            config,
            histograms: RingHistograms::new(),
        }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Histograms built by the most recent call to [`Self::process`].
    pub fn histograms(&self) -> &RingHistograms {
        &self.histograms
    }

    /// Run the full pipeline over one frame.
    ///
    /// A cloud containing any non-finite coordinate produces no obstacles and
    /// an all-free grid.
    pub fn process(&mut self, cloud: &Points) -> Segmentation {
        self.histograms.clear();

        if !cloud.is_finite() {
            warn!(
                n_points = cloud.len(),
                "cloud contains non-finite coordinates, skipping frame"
            );
            return Segmentation {
                background: BackgroundDistances::default(),
                obstacles: Points::new(),
                grid: OccupancyGrid::new(&self.config.grid),
            };
        }

        let trained = info_span!("accumulate")
            .in_scope(|| accumulate(cloud, &self.config, &mut self.histograms));
        let background = BackgroundDistances::estimate(&self.histograms);
        let obstacles =
            info_span!("filter").in_scope(|| filter_obstacles(cloud, &background, &self.config));
        let grid = info_span!("rasterize").in_scope(|| rasterize(&obstacles, &self.config.grid));

        debug!(
            n_points = cloud.len(),
            trained,
            obstacles = obstacles.len(),
            occupied = grid.occupied(),
            "segmented frame"
        );

        Segmentation {
            background,
            obstacles,
            grid,
        }
    }
}

/// One-shot segmentation of `cloud` with `config`.
pub fn segment(cloud: &Points, config: &SegmentationConfig) -> Segmentation {
    Segmenter::new(config.clone()).process(cloud)
}
