// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! EdgeFirst LiDAR Obstacle Segmentation Library
//!
//! Turns each raw point cloud into a cloud of obstacle candidates and a binary
//! occupancy grid, using only statistics gathered from that same frame.
//!
//! # Architecture
//!
//! Each frame is processed in two passes over the cloud:
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌─────────────────────┐
//! │  classify    │──►│  histogram     │──►│  background         │
//! │  ring × side │   │  first-fit bins│   │  dominant bin/slot  │
//! └──────────────┘   └────────────────┘   └─────────────────────┘
//!                                                   │ 14 ranges
//!                                                   ▼
//!                    ┌────────────────┐   ┌─────────────────────┐
//!                    │  grid          │◄──│  filter             │
//!                    │  120×400 @0.1m │   │  drop background    │
//!                    └────────────────┘   └─────────────────────┘
//! ```
//!
//! 1. Points in a narrow corridor ahead of and behind the sensor are sorted
//!    into seven elevation rings and fed into per-ring range histograms.
//! 2. The most populated bin of each histogram is taken as the range of the
//!    static surface that ring sees.
//! 3. The full cloud is walked again and points whose range matches their
//!    ring's background are removed.
//! 4. The surviving points are projected onto a bird's-eye grid.
//!
//! No state survives between frames.
//!
//! # Modules
//!
//! - [`cloud`]: Point container, error type, timestamps
//! - [`config`]: Segmentation and grid tunables
//! - [`classify`]: Ring/side classification and histogram training
//! - [`histogram`]: First-fit running-mean range histograms
//! - [`background`]: Dominant-range reduction
//! - [`filter`]: Background suppression
//! - [`grid`]: Occupancy grid rasterization
//! - [`pipeline`]: The per-frame [`Segmenter`]
//! - [`formats`]: PointCloud2 decode/encode
//! - [`schemas`]: ROS messages not covered by `edgefirst_schemas`
//!
//! # Example
//!
//! ```
//! use edgefirst_obstaclepub::{Points, SegmentationConfig, Segmenter};
//!
//! let mut segmenter = Segmenter::new(SegmentationConfig::default());
//! let cloud = Points::new();
//! let result = segmenter.process(&cloud);
//! assert!(result.obstacles.is_empty());
//! assert_eq!(result.grid.data().len(), 120 * 400);
//! ```

pub mod background;
pub mod classify;
pub mod cloud;
pub mod config;
pub mod filter;
pub mod formats;
pub mod grid;
pub mod histogram;
pub mod pipeline;
pub mod schemas;

// Re-exports for convenience
pub use background::BackgroundDistances;
pub use classify::Side;
pub use cloud::{Error, Point, Points};
pub use config::{GridConfig, SegmentationConfig};
pub use formats::PointFieldType;
pub use grid::OccupancyGrid;
pub use histogram::{HistogramBin, RingHistogram, RingHistograms};
pub use pipeline::{Segmentation, Segmenter, segment};
