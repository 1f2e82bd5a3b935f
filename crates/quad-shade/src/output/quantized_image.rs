//! QuantizedImage struct: palette indices with dimension metadata.

use crate::palette::{Palette, PALETTE_SIZE};

/// A width x height grid of palette indices.
///
/// Stores one `u8` index per pixel in row-major order. Every index is in
/// `0..PALETTE_SIZE`. Created by the quantizer or by RLE decoding and never
/// mutated afterwards.
///
/// The palette itself is not stored: two images are equal when their
/// dimensions and indices are equal.
///
/// # Example
///
/// ```
/// use quad_shade::{Palette, QuantizedImage};
///
/// let image = QuantizedImage::new(vec![0, 3, 3, 0], 2, 2).unwrap();
/// assert_eq!(image.pixel(1, 0), 3);
///
/// let rgb = image.to_rgb(&Palette::GAME_BOY);
/// assert_eq!(&rgb[3..6], &[255, 255, 255]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedImage {
    /// Palette indices, one per pixel, row-major order.
    indices: Vec<u8>,
    /// Image width in pixels.
    width: u32,
    /// Image height in pixels.
    height: u32,
}

impl QuantizedImage {
    /// Create a new `QuantizedImage` from palette indices.
    ///
    /// Returns `None` if `indices.len() != width * height` or if any index is
    /// outside the palette.
    pub fn new(indices: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        let area = (width as u64).checked_mul(height as u64)?;
        if indices.len() as u64 != area {
            return None;
        }
        if indices.iter().any(|&i| i as usize >= PALETTE_SIZE) {
            return None;
        }
        Some(Self {
            indices,
            width,
            height,
        })
    }

    /// Construct without validation. Callers guarantee the invariants.
    pub(crate) fn from_parts(indices: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            indices.len() as u64,
            width as u64 * height as u64,
            "indices length must match width * height ({}x{})",
            width,
            height,
        );
        Self {
            indices,
            width,
            height,
        }
    }

    /// Returns the palette indices as a slice (row-major).
    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Consume the image, returning the index buffer.
    #[inline]
    pub fn into_indices(self) -> Vec<u8> {
        self.indices
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when the image has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Palette index at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.indices[y as usize * self.width as usize + x as usize]
    }

    /// Expand to packed RGB8 bytes using `palette`.
    ///
    /// The returned buffer has length `width * height * 3`.
    pub fn to_rgb(&self, palette: &Palette) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.indices.len() * 3);
        for &idx in &self.indices {
            rgb.extend_from_slice(&palette.color(idx as usize).to_bytes());
        }
        rgb
    }
}
