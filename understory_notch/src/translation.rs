// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translation functions: raw drag translation to overlay height.
//!
//! ## Overview
//!
//! While a drag is in progress the controller computes a raw height (the session baseline
//! minus the finger offset) and hands it to a [`TranslationFunction`] together with the
//! reachable bounds. The function is evaluated fresh on every drag event and keeps no state.
//!
//! [`RubberBand`] is the default. Inside the bounds it is the identity. Past a bound the
//! overshoot decays logarithmically:
//!
//! ```text
//! height = bound * (1 + factor * log10(translation / bound))
//! ```
//!
//! Below the minimum the same curve is mirrored around the minimum. Either edge can be
//! made rigid through [`Bounce`].
//!
//! A degenerate bound (zero or negative) or a non-positive ratio would feed `log10` a
//! non-positive number. The function returns the bound instead.

use crate::log10;

/// Inputs to a [`TranslationFunction`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TranslationParameters {
    /// Lowest reachable notch height.
    pub minimum_height: f64,
    /// Highest reachable notch height.
    pub maximum_height: f64,
    /// Unconstrained height requested by the drag.
    pub translation: f64,
}

impl TranslationParameters {
    /// Hard clamp of the translation into `[minimum_height, maximum_height]`.
    ///
    /// Unlike [`f64::clamp`] this does not panic on an inverted range; the minimum wins.
    pub fn clamped(&self) -> f64 {
        self.translation
            .min(self.maximum_height)
            .max(self.minimum_height)
    }
}

/// Maps a raw translation into an overlay height.
pub trait TranslationFunction {
    /// Height to use for the given drag translation.
    fn overlay_translation_height(&self, params: &TranslationParameters) -> f64;
}

impl<F> TranslationFunction for F
where
    F: Fn(&TranslationParameters) -> f64,
{
    fn overlay_translation_height(&self, params: &TranslationParameters) -> f64 {
        self(params)
    }
}

bitflags::bitflags! {
    /// Edges where a [`RubberBand`] lets the overlay overshoot.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Bounce: u8 {
        /// Overshoot below the minimum reachable height.
        const MINIMUM = 1 << 0;
        /// Overshoot above the maximum reachable height.
        const MAXIMUM = 1 << 1;
    }
}

impl Default for Bounce {
    fn default() -> Self {
        Self::MINIMUM | Self::MAXIMUM
    }
}

/// Logarithmic overshoot past the reachable bounds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RubberBand {
    /// Strength of the overshoot. Larger values stretch further.
    pub factor: f64,
    /// Edges that bounce. Edges not listed clamp hard.
    pub bounces: Bounce,
}

impl Default for RubberBand {
    fn default() -> Self {
        Self {
            factor: 0.5,
            bounces: Bounce::default(),
        }
    }
}

impl RubberBand {
    /// A rubber band that only stretches past the top.
    pub fn maximum_only() -> Self {
        Self {
            bounces: Bounce::MAXIMUM,
            ..Self::default()
        }
    }

    fn stretch(&self, bound: f64, translation: f64) -> f64 {
        if bound <= 0.0 {
            return bound;
        }
        let ratio = translation / bound;
        if ratio <= 0.0 {
            return bound;
        }
        bound * (1.0 + self.factor * log10(ratio))
    }
}

impl TranslationFunction for RubberBand {
    fn overlay_translation_height(&self, params: &TranslationParameters) -> f64 {
        let TranslationParameters {
            minimum_height: min,
            maximum_height: max,
            translation,
        } = *params;
        if translation > max && self.bounces.contains(Bounce::MAXIMUM) {
            self.stretch(max, translation)
        } else if translation < min && self.bounces.contains(Bounce::MINIMUM) {
            // Mirror around the minimum so the curve decays downward.
            let mirrored = min + (min - translation);
            let stretched = self.stretch(min, mirrored);
            min - (stretched - min)
        } else {
            params.clamped()
        }
    }
}

/// Hard clamp into the reachable bounds, no overshoot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Clamp;

impl TranslationFunction for Clamp {
    fn overlay_translation_height(&self, params: &TranslationParameters) -> f64 {
        params.clamped()
    }
}
