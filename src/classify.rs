// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Ring and side classification of individual points.
//!
//! Rings are seven narrow elevation windows approximating the lower beams of
//! a multi-beam sensor. Ring `j` accepts elevations strictly inside
//! `(-15.1 + 2j, -14.9 + 2j)` degrees; the windows leave gaps and points in a
//! gap belong to no ring.
//!
//! Two classifications are used per frame:
//!
//! - **Training** ([`classify_training`]) gates on a narrow lateral corridor
//!   (`|y| < y_limit_m`) so only returns directly ahead or behind feed the
//!   range histograms.
//! - **Filtering** ([`classify_wedge`]) has no lateral gate and instead tests
//!   the forward wedge `|y| < x` or the rear wedge `|y| < -x`. Points on a
//!   wedge boundary (`y == ±x`) fall in neither.

use crate::{
    cloud::{Point, Points},
    config::SegmentationConfig,
    histogram::RingHistograms,
};

/// Number of elevation rings.
pub const N_RINGS: usize = 7;
/// Number of ring/side slots (front rings followed by back rings).
pub const N_SLOTS: usize = 2 * N_RINGS;

/// Lower edge of ring 0 (degrees).
const RING_LOW_DEG: f64 = -15.1;
/// Upper edge of ring 0 (degrees).
const RING_HIGH_DEG: f64 = -14.9;
/// Angular spacing between consecutive rings (degrees).
const RING_SPACING_DEG: f64 = 2.0;

/// Longitudinal half of the sensor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// `x > 0`
    Front,
    /// `x < 0`
    Back,
}

impl Side {
    /// Index of `(ring, self)` into a 14-slot table.
    ///
    /// # Panics
    ///
    /// Panics if `ring >= N_RINGS`.
    #[inline]
    pub fn slot(self, ring: usize) -> usize {
        assert!(ring < N_RINGS, "ring {} out of range", ring);
        match self {
            Side::Front => ring,
            Side::Back => N_RINGS + ring,
        }
    }
}

/// A point resolved to a ring and side, with its range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSample {
    pub ring: usize,
    pub side: Side,
    pub range: f64,
}

/// First ring whose elevation window strictly contains `elevation_deg`.
///
/// The search stops at the first match, so overlapping windows would resolve
/// to the lowest ring index.
pub fn ring_for_elevation(elevation_deg: f64) -> Option<usize> {
    (0..N_RINGS).find(|&j| {
        let offset = RING_SPACING_DEG * j as f64;
        RING_LOW_DEG + offset < elevation_deg && elevation_deg < RING_HIGH_DEG + offset
    })
}

/// Range and ring of `point`, or `None` for a zero-range point or one outside
/// every ring window.
#[inline]
fn ring_and_range(point: &Point) -> Option<(usize, f64)> {
    let range = point.range();
    let elevation = point.elevation_deg(range)?;
    ring_for_elevation(elevation).map(|ring| (ring, range))
}

/// Classify a point for histogram training.
///
/// Returns `None` when the point has zero range, matches no ring, lies on
/// `x == 0`, or falls outside the lateral corridor `-y_limit_m < y < y_limit_m`.
pub fn classify_training(point: &Point, config: &SegmentationConfig) -> Option<RingSample> {
    let (ring, range) = ring_and_range(point)?;
    let limit = config.y_limit_m;
    if !(-limit < point.y && point.y < limit) {
        return None;
    }
    let side = if point.x > 0.0 {
        Side::Front
    } else if point.x < 0.0 {
        Side::Back
    } else {
        return None;
    };
    Some(RingSample { ring, side, range })
}

/// Classify a point for the filtering pass.
///
/// The front wedge is `x > 0, y < x, y > -x`; the rear wedge is
/// `x < 0, y < -x, y > x`. Returns `None` for points that cannot be judged
/// against a background distance.
pub fn classify_wedge(point: &Point) -> Option<RingSample> {
    let (ring, range) = ring_and_range(point)?;
    let (x, y) = (point.x, point.y);
    let side = if x > 0.0 && y < x && y > -x {
        Side::Front
    } else if x < 0.0 && y < -x && y > x {
        Side::Back
    } else {
        return None;
    };
    Some(RingSample { ring, side, range })
}

/// Training pass: feed every qualifying point of `cloud` into the histogram
/// for its ring and side. Returns the number of samples inserted.
pub fn accumulate(
    cloud: &Points,
    config: &SegmentationConfig,
    histograms: &mut RingHistograms,
) -> usize {
    let mut inserted = 0;
    for point in cloud.iter() {
        if let Some(sample) = classify_training(&point, config) {
            histograms
                .get_mut(sample.ring, sample.side)
                .insert(sample.range, config.tolerance(sample.ring));
            inserted += 1;
        }
    }
    inserted
}

/// Point at `range` meters with the given elevation and azimuth (degrees).
///
/// Azimuth is measured from +x towards +y.
pub fn point_from_polar(range: f64, elevation_deg: f64, azimuth_deg: f64) -> Point {
    let (el, az) = (elevation_deg.to_radians(), azimuth_deg.to_radians());
    Point::new(
        range * el.cos() * az.cos(),
        range * el.cos() * az.sin(),
        range * el.sin(),
    )
}

/// Center elevation of `ring` (degrees).
pub fn ring_center_deg(ring: usize) -> f64 {
    (RING_LOW_DEG + RING_HIGH_DEG) / 2.0 + RING_SPACING_DEG * ring as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_windows() {
        assert_eq!(ring_for_elevation(-15.0), Some(0));
        assert_eq!(ring_for_elevation(-13.0), Some(1));
        assert_eq!(ring_for_elevation(-9.0), Some(3));
        assert_eq!(ring_for_elevation(-3.0), Some(6));
        assert_eq!(ring_for_elevation(-3.05), Some(6));

        // Gaps between windows and beyond the last ring.
        assert_eq!(ring_for_elevation(-14.0), None);
        assert_eq!(ring_for_elevation(-2.0), None);
        assert_eq!(ring_for_elevation(0.0), None);
        assert_eq!(ring_for_elevation(-20.0), None);
        assert_eq!(ring_for_elevation(f64::NAN), None);
    }

    #[test]
    fn test_ring_window_edges_are_exclusive() {
        assert_eq!(ring_for_elevation(-15.1), None);
        assert_eq!(ring_for_elevation(-14.9), None);
    }

    #[test]
    fn test_ring_centers() {
        for ring in 0..N_RINGS {
            assert_eq!(ring_for_elevation(ring_center_deg(ring)), Some(ring));
        }
    }

    #[test]
    fn test_side_slots() {
        assert_eq!(Side::Front.slot(0), 0);
        assert_eq!(Side::Front.slot(6), 6);
        assert_eq!(Side::Back.slot(0), 7);
        assert_eq!(Side::Back.slot(6), 13);
    }

    #[test]
    fn test_training_front_and_back() {
        let config = SegmentationConfig::default();

        let front = point_from_polar(5.0, -9.0, 2.0);
        let sample = classify_training(&front, &config).unwrap();
        assert_eq!(sample.ring, 3);
        assert_eq!(sample.side, Side::Front);
        assert!((sample.range - 5.0).abs() < 1e-9);

        let back = point_from_polar(5.0, -9.0, 178.0);
        let sample = classify_training(&back, &config).unwrap();
        assert_eq!(sample.ring, 3);
        assert_eq!(sample.side, Side::Back);
    }

    #[test]
    fn test_training_lateral_gate() {
        let config = SegmentationConfig::default();
        // In ring 0, directly ahead but 2m to the side.
        let wide = point_from_polar(10.0, -15.0, 11.5);
        assert!(wide.y > config.y_limit_m);
        assert!(classify_training(&wide, &config).is_none());
        // Still judged during filtering.
        assert!(classify_wedge(&wide).is_some());
    }

    #[test]
    fn test_zero_range_is_unassigned() {
        let config = SegmentationConfig::default();
        let origin = Point::new(0.0, 0.0, 0.0);
        assert!(classify_training(&origin, &config).is_none());
        assert!(classify_wedge(&origin).is_none());
    }

    #[test]
    fn test_wedges() {
        let ahead = point_from_polar(8.0, -11.0, 30.0);
        assert_eq!(classify_wedge(&ahead).unwrap().side, Side::Front);

        let behind = point_from_polar(8.0, -11.0, -150.0);
        assert_eq!(classify_wedge(&behind).unwrap().side, Side::Back);

        // Side-facing points belong to neither wedge.
        let left = point_from_polar(8.0, -11.0, 60.0);
        assert!(classify_wedge(&left).is_none());
        let right = point_from_polar(8.0, -11.0, -120.0);
        assert!(classify_wedge(&right).is_none());
    }

    #[test]
    fn test_wedge_boundary_is_unclassified() {
        // y == x and y == -x exactly, with z placing the point in ring 3.
        let horiz = 5.0f64;
        let z = -(horiz * 2f64.sqrt()) * 9.0f64.to_radians().tan();
        let diag = Point::new(horiz, horiz, z);
        assert_eq!(ring_for_elevation(diag.elevation_deg(diag.range()).unwrap()), Some(3));
        assert!(classify_wedge(&diag).is_none());

        let diag = Point::new(-horiz, horiz, z);
        assert!(classify_wedge(&diag).is_none());
    }

    #[test]
    fn test_accumulate_counts_training_points() {
        let config = SegmentationConfig::default();
        let mut cloud = Points::new();
        for i in 0..10 {
            cloud.push(point_from_polar(6.0, -13.0, i as f64 * 0.5));
        }
        // Outside the corridor, outside any ring, and the origin.
        cloud.push(point_from_polar(6.0, -13.0, 60.0));
        cloud.push(point_from_polar(6.0, -14.0, 0.0));
        cloud.push(Point::new(0.0, 0.0, 0.0));

        let mut histograms = RingHistograms::new();
        let inserted = accumulate(&cloud, &config, &mut histograms);
        assert_eq!(inserted, 10);
        let h = histograms.get(1, Side::Front);
        assert_eq!(h.len(), 1);
        assert_eq!(h.bins()[0].count, 10);
        assert!((h.bins()[0].center - 6.0).abs() < 1e-9);
    }
}
