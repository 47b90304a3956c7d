// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Background suppression over the full cloud.
//!
//! Every point is re-classified with [`classify_wedge`]. A point is dropped
//! only when its range lies strictly inside `background ± tolerance(ring)` for
//! its ring and side. Everything else is kept, including points that could not
//! be classified (zero range, outside every ring window, outside both wedges)
//! and points whose ring/side learned no background.

use crate::{
    background::BackgroundDistances,
    classify::classify_wedge,
    cloud::{Point, Points},
    config::SegmentationConfig,
};

/// True when `range` is strictly inside `background ± tolerance`.
#[inline]
pub fn matches_background(range: f64, background: f64, tolerance: f64) -> bool {
    background - tolerance < range && range < background + tolerance
}

/// Decide whether a single point is an obstacle candidate.
pub fn is_obstacle(
    point: &Point,
    background: &BackgroundDistances,
    config: &SegmentationConfig,
) -> bool {
    let Some(sample) = classify_wedge(point) else {
        return true;
    };
    match background.get(sample.ring, sample.side) {
        Some(expected) => {
            !matches_background(sample.range, expected, config.tolerance(sample.ring))
        }
        None => true,
    }
}

/// Filtering pass: append every obstacle candidate of `cloud` to `out`, in
/// input order.
pub fn filter_obstacles_into(
    cloud: &Points,
    background: &BackgroundDistances,
    config: &SegmentationConfig,
    out: &mut Points,
) {
    out.extend(
        cloud
            .iter()
            .filter(|point| is_obstacle(point, background, config)),
    );
}

/// Filtering pass returning a new cloud.
pub fn filter_obstacles(
    cloud: &Points,
    background: &BackgroundDistances,
    config: &SegmentationConfig,
) -> Points {
    let mut out = Points::with_capacity(cloud.len());
    filter_obstacles_into(cloud, background, config, &mut out);
    out
}
