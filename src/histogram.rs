// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Self-organizing range histograms, one per ring and side.
//!
//! Each histogram is an incremental running-mean clustering of observed
//! ranges. A sample joins the *first* bin, in insertion order, whose
//! `center ± tolerance` band contains it; otherwise it opens a new bin. Early
//! bins can therefore capture samples that sit closer to a later bin.

use crate::classify::{N_SLOTS, Side};

/// One variable-width bin: running mean of merged ranges and their count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub center: f64,
    pub count: u32,
}

/// Ordered bins for a single ring/side. Grows by appending only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingHistogram {
    bins: Vec<HistogramBin>,
}

impl RingHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `d` into the first bin whose inclusive band
    /// `[center - tolerance, center + tolerance]` contains it, updating that
    /// bin's running mean. Opens a new bin when nothing matches.
    pub fn insert(&mut self, d: f64, tolerance: f64) {
        for bin in self.bins.iter_mut() {
            if bin.center - tolerance <= d && d <= bin.center + tolerance {
                let n = bin.count as f64;
                bin.center = (n * bin.center + d) / (n + 1.0);
                bin.count += 1;
                return;
            }
        }
        self.bins.push(HistogramBin {
            center: d,
            count: 1,
        });
    }

    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Drop all bins while retaining capacity.
    pub fn clear(&mut self) {
        self.bins.clear();
    }
}

/// Fixed table of 14 histograms: rings `0..7` for the front side followed by
/// rings `0..7` for the back side.
#[derive(Debug, Clone, PartialEq)]
pub struct RingHistograms {
    slots: [RingHistogram; N_SLOTS],
}

impl RingHistograms {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| RingHistogram::new()),
        }
    }

    /// Histogram for `ring` on `side`.
    ///
    /// # Panics
    ///
    /// Panics if `ring >= `[`N_RINGS`].
    ///
    /// [`N_RINGS`]: crate::classify::N_RINGS
    #[inline]
    pub fn get(&self, ring: usize, side: Side) -> &RingHistogram {
        &self.slots[side.slot(ring)]
    }

    /// Mutable histogram for `ring` on `side`.
    ///
    /// # Panics
    ///
    /// Panics if `ring >= `[`N_RINGS`].
    ///
    /// [`N_RINGS`]: crate::classify::N_RINGS
    #[inline]
    pub fn get_mut(&mut self, ring: usize, side: Side) -> &mut RingHistogram {
        &mut self.slots[side.slot(ring)]
    }

    /// Histograms in slot order (front rings, then back rings).
    pub fn iter(&self) -> impl Iterator<Item = &RingHistogram> {
        self.slots.iter()
    }

    /// Total number of training samples across all slots.
    pub fn samples(&self) -> u64 {
        self.slots
            .iter()
            .flat_map(|h| h.bins())
            .map(|b| b.count as u64)
            .sum()
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.clear();
        }
    }
}

impl Default for RingHistograms {
    fn default() -> Self {
        Self::new()
    }
}
