// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notch heights and the reachable subset.
//!
//! ## Overview
//!
//! [`Notches`] is the resolved list of heights for one layout pass. Index 0 is the
//! shortest notch and the last index the tallest. Heights are expected in ascending
//! order; this is the caller's contract and is only checked in debug builds.
//!
//! [`Reachable`] is the subset of notches currently enabled. Policies only ever see a
//! `Reachable`, so a disabled notch can never be chosen.

use alloc::vec::Vec;

/// A notch index paired with its resolved height.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Notch {
    /// Position in the notch list, `0..len`.
    pub index: usize,
    /// Height in points.
    pub height: f64,
}

/// Ascending list of notch heights.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Notches {
    heights: Vec<f64>,
}

impl Notches {
    /// Create a notch list from ascending heights.
    ///
    /// Unsorted heights are a programmer error and trip a debug assertion.
    pub fn new(heights: Vec<f64>) -> Self {
        debug_assert!(
            heights.windows(2).all(|w| w[0] <= w[1]),
            "notch heights must be sorted in ascending order: {heights:?}"
        );
        Self { heights }
    }

    /// Build `count` notches by asking `height_for` for each index in order.
    pub fn from_fn(count: usize, height_for: impl FnMut(usize) -> f64) -> Self {
        Self::new((0..count).map(height_for).collect())
    }

    /// Number of notches.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Returns `true` if there are no notches.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Height of the notch at `index`, if it exists.
    pub fn height(&self, index: usize) -> Option<f64> {
        self.heights.get(index).copied()
    }

    /// All heights, ascending.
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Height of notch 0.
    pub fn min_height(&self) -> Option<f64> {
        self.heights.first().copied()
    }

    /// Height of the last notch.
    pub fn max_height(&self) -> Option<f64> {
        self.heights.last().copied()
    }

    /// Collect the notches for which `enabled` returns `true`.
    pub fn reachable_with(&self, mut enabled: impl FnMut(usize) -> bool) -> Reachable {
        let notches = self
            .heights
            .iter()
            .enumerate()
            .filter(|(index, _)| enabled(*index))
            .map(|(index, &height)| Notch { index, height })
            .collect();
        Reachable { notches }
    }

    /// Collect the notches whose indices appear in `indices`.
    ///
    /// Out-of-range indices are ignored.
    pub fn reachable(&self, indices: &[usize]) -> Reachable {
        self.reachable_with(|i| indices.contains(&i))
    }
}

/// The enabled subset of a [`Notches`] list, still ascending by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reachable {
    notches: Vec<Notch>,
}

impl Reachable {
    /// Number of enabled notches.
    pub fn len(&self) -> usize {
        self.notches.len()
    }

    /// Returns `true` if no notch is enabled.
    pub fn is_empty(&self) -> bool {
        self.notches.is_empty()
    }

    /// Iterate the enabled notches in index order.
    pub fn iter(&self) -> impl Iterator<Item = Notch> + '_ {
        self.notches.iter().copied()
    }

    /// Enabled indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        self.notches.iter().map(|n| n.index).collect()
    }

    /// Returns `true` if `index` is enabled.
    pub fn contains(&self, index: usize) -> bool {
        self.notches.iter().any(|n| n.index == index)
    }

    /// Height of `index` if it is enabled.
    pub fn height(&self, index: usize) -> Option<f64> {
        self.notches
            .iter()
            .find(|n| n.index == index)
            .map(|n| n.height)
    }

    /// Lowest enabled height.
    pub fn min_height(&self) -> Option<f64> {
        self.notches.first().map(|n| n.height)
    }

    /// Highest enabled height.
    pub fn max_height(&self) -> Option<f64> {
        self.notches.last().map(|n| n.height)
    }

    /// Enabled notch whose height is closest to `height`.
    ///
    /// Ties go to the lower notch.
    pub fn nearest(&self, height: f64) -> Option<Notch> {
        self.notches.iter().copied().min_by(|a, b| {
            let da = (a.height - height).abs();
            let db = (b.height - height).abs();
            da.total_cmp(&db).then(a.height.total_cmp(&b.height))
        })
    }

    /// Enabled notch whose height equals `height` exactly.
    pub fn at_height(&self, height: f64) -> Option<Notch> {
        self.notches.iter().copied().find(|n| n.height == height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn three() -> Notches {
        Notches::new(vec![100.0, 200.0, 300.0])
    }

    #[test]
    fn bounds_follow_first_and_last() {
        let n = three();
        assert_eq!(n.len(), 3);
        assert_eq!(n.min_height(), Some(100.0));
        assert_eq!(n.max_height(), Some(300.0));
        assert_eq!(n.height(3), None);
        assert!(Notches::default().min_height().is_none());
    }

    #[test]
    fn from_fn_queries_in_order() {
        let n = Notches::from_fn(4, |i| i as f64 * 50.0);
        assert_eq!(n.heights(), &[0.0, 50.0, 100.0, 150.0]);
    }

    #[test]
    #[should_panic(expected = "ascending")]
    #[cfg(debug_assertions)]
    fn unsorted_heights_trip_in_debug() {
        let _ = Notches::new(vec![200.0, 100.0]);
    }

    // Disabling the top notch shrinks the reachable range.
    #[test]
    fn reachable_range_excludes_disabled() {
        let n = three();
        let r = n.reachable_with(|i| i != 2);
        assert_eq!(r.indices(), vec![0, 1]);
        assert_eq!(r.max_height(), Some(200.0));
        assert!(!r.contains(2));
        assert_eq!(r.height(2), None);
    }

    #[test]
    fn reachable_ignores_unknown_indices() {
        let r = three().reachable(&[1, 7]);
        assert_eq!(r.indices(), vec![1]);
    }

    #[test]
    fn nearest_and_exact() {
        let r = three().reachable_with(|_| true);
        assert_eq!(r.nearest(160.0).map(|n| n.index), Some(1));
        assert_eq!(r.nearest(150.0).map(|n| n.index), Some(0));
        assert_eq!(r.at_height(300.0).map(|n| n.index), Some(2));
        assert!(r.at_height(299.0).is_none());
        assert!(Reachable::default().nearest(0.0).is_none());
    }
}
