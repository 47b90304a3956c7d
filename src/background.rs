// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Reduction of each ring/side histogram to one background distance.

use crate::{
    classify::{N_SLOTS, Side},
    histogram::{RingHistogram, RingHistograms},
};

/// Center of the bin with the highest count, or `None` for an empty
/// histogram. Ties keep the earliest-inserted bin.
pub fn dominant_range(histogram: &RingHistogram) -> Option<f64> {
    let mut best: Option<(u32, f64)> = None;
    for bin in histogram.bins() {
        match best {
            Some((count, _)) if bin.count <= count => {}
            _ => best = Some((bin.count, bin.center)),
        }
    }
    best.map(|(_, center)| center)
}

/// Per-frame background distance for every ring/side slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackgroundDistances {
    slots: [Option<f64>; N_SLOTS],
}

impl BackgroundDistances {
    /// Reduce every histogram in `histograms` to its dominant range.
    pub fn estimate(histograms: &RingHistograms) -> Self {
        let mut slots = [None; N_SLOTS];
        for (slot, histogram) in slots.iter_mut().zip(histograms.iter()) {
            *slot = dominant_range(histogram);
        }
        Self { slots }
    }

    /// Learned background for `(ring, side)`, or `None` when the histogram
    /// was empty and nothing should be suppressed.
    #[inline]
    pub fn get(&self, ring: usize, side: Side) -> Option<f64> {
        self.slots[side.slot(ring)]
    }

    /// Background for `(ring, side)` with empty slots reported as 0.0.
    pub fn distance(&self, ring: usize, side: Side) -> f64 {
        self.get(ring, side).unwrap_or(0.0)
    }

    /// All 14 distances, front rings first, empty slots as 0.0.
    pub fn to_array(&self) -> [f64; N_SLOTS] {
        self.slots.map(|d| d.unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(samples: &[f64], tolerance: f64) -> RingHistogram {
        let mut h = RingHistogram::new();
        for &d in samples {
            h.insert(d, tolerance);
        }
        h
    }

    #[test]
    fn test_empty_histogram() {
        assert_eq!(dominant_range(&RingHistogram::new()), None);
    }

    #[test]
    fn test_majority_bin_wins_regardless_of_order() {
        let small_first = histogram(&[4.0, 4.0, 4.0, 8.0, 8.0, 8.0, 8.0, 8.0], 1.0);
        assert_eq!(small_first.len(), 2);
        assert_eq!(dominant_range(&small_first), Some(8.0));

        let large_first = histogram(&[8.0, 8.0, 8.0, 8.0, 8.0, 4.0, 4.0, 4.0], 1.0);
        assert_eq!(dominant_range(&large_first), Some(8.0));
    }

    #[test]
    fn test_tie_keeps_earliest_bin() {
        let h = histogram(&[4.0, 8.0, 4.0, 8.0, 4.0, 8.0], 1.0);
        assert_eq!(h.bins()[0].count, h.bins()[1].count);
        assert_eq!(dominant_range(&h), Some(4.0));

        let h = histogram(&[8.0, 4.0, 8.0, 4.0], 1.0);
        assert_eq!(dominant_range(&h), Some(8.0));
    }

    #[test]
    fn test_estimate_fills_all_slots() {
        let mut table = RingHistograms::new();
        table.get_mut(2, Side::Front).insert(6.0, 1.0);
        table.get_mut(5, Side::Back).insert(11.0, 1.0);

        let background = BackgroundDistances::estimate(&table);
        assert_eq!(background.get(2, Side::Front), Some(6.0));
        assert_eq!(background.get(5, Side::Back), Some(11.0));
        assert_eq!(background.get(2, Side::Back), None);
        assert_eq!(background.distance(2, Side::Back), 0.0);

        let all = background.to_array();
        assert_eq!(all[2], 6.0);
        assert_eq!(all[7 + 5], 11.0);
        assert_eq!(all.iter().filter(|&&d| d == 0.0).count(), 12);
    }

    #[test]
    fn test_estimate_does_not_modify_input() {
        let mut table = RingHistograms::new();
        table.get_mut(0, Side::Front).insert(3.0, 1.0);
        let before = table.clone();
        let _ = BackgroundDistances::estimate(&table);
        assert_eq!(table, before);
    }
}
