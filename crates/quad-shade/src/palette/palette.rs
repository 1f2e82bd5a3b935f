//! Palette struct with nearest-color matching.
//!
//! This module provides the core `Palette` type: an ordered set of exactly
//! four RGB colors that every source pixel is mapped onto.

use std::collections::HashSet;
use std::str::FromStr;

use super::error::PaletteError;
use crate::color::Rgb;

/// Number of entries in every palette.
///
/// Palette indices therefore always fit in two bits.
pub const PALETTE_SIZE: usize = 4;

/// A fixed, ordered four-color palette.
///
/// Order matters: when a pixel is equally far from two entries, the entry
/// that appears first wins. This keeps quantization (and therefore hashing)
/// reproducible.
///
/// A palette is immutable once constructed.
///
/// # Example
///
/// ```
/// use quad_shade::{Palette, Rgb};
///
/// let palette = Palette::GAME_BOY;
/// let (idx, _) = palette.find_nearest(Rgb::new(10, 10, 10));
/// assert_eq!(idx, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
}

impl Palette {
    /// Four-shade Game Boy greyscale, darkest first.
    pub const GAME_BOY: Palette = Palette {
        colors: [
            Rgb::new(0x00, 0x00, 0x00),
            Rgb::new(0x55, 0x55, 0x55),
            Rgb::new(0xAA, 0xAA, 0xAA),
            Rgb::new(0xFF, 0xFF, 0xFF),
        ],
    };

    /// Create a palette from four colors.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::DuplicateColor`] if a color appears twice;
    /// a duplicate entry could never be selected and would silently shrink
    /// the palette.
    pub fn new(colors: [Rgb; PALETTE_SIZE]) -> Result<Self, PaletteError> {
        let mut seen = HashSet::new();
        for (i, color) in colors.iter().enumerate() {
            if !seen.insert(*color) {
                return Err(PaletteError::DuplicateColor { index: i });
            }
        }
        Ok(Self { colors })
    }

    /// Create a palette from a slice, which must hold exactly
    /// [`PALETTE_SIZE`] colors.
    pub fn from_slice(colors: &[Rgb]) -> Result<Self, PaletteError> {
        let colors: [Rgb; PALETTE_SIZE] =
            colors.try_into().map_err(|_| PaletteError::WrongSize {
                expected: PALETTE_SIZE,
                actual: colors.len(),
            })?;
        Self::new(colors)
    }

    /// Create a palette from hex color strings.
    ///
    /// # Example
    ///
    /// ```
    /// use quad_shade::Palette;
    ///
    /// let palette = Palette::from_hex(&["#000", "#555", "#AAA", "#FFF"]).unwrap();
    /// assert_eq!(palette, Palette::GAME_BOY);
    /// ```
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Result<Self, PaletteError> {
        let parsed = colors
            .iter()
            .map(|s| Rgb::from_str(s.as_ref()).map_err(PaletteError::ParseColor))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_slice(&parsed)
    }

    /// Returns the number of colors in the palette (always [`PALETTE_SIZE`]).
    #[inline]
    pub const fn len(&self) -> usize {
        PALETTE_SIZE
    }

    /// Always `false`; palettes are fixed-size.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Get the color at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= PALETTE_SIZE`.
    #[inline]
    pub fn color(&self, idx: usize) -> Rgb {
        self.colors[idx]
    }

    /// All colors, in palette order.
    #[inline]
    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    /// Euclidean RGB distance from `pixel` to the palette entry at `idx`.
    ///
    /// Diagnostic helper; matching itself compares squared distances.
    #[inline]
    pub fn distance(&self, pixel: Rgb, idx: usize) -> f64 {
        pixel.distance(self.colors[idx])
    }

    /// Find the palette entry closest to `pixel`.
    ///
    /// Returns `(index, squared_distance)`. Equidistant entries resolve to
    /// the lowest index: the scan only replaces the current best on a
    /// strictly smaller distance.
    #[inline]
    pub fn find_nearest(&self, pixel: Rgb) -> (usize, u32) {
        let mut best_idx = 0;
        let mut best_dist = u32::MAX;

        for (i, &color) in self.colors.iter().enumerate() {
            let dist = pixel.distance_squared(color);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        (best_idx, best_dist)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::GAME_BOY
    }
}
