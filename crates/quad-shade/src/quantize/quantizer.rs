//! Quantizer: packed RGB8 buffer -> [`QuantizedImage`].

use super::error::QuantizeError;
use crate::color::Rgb;
use crate::output::QuantizedImage;
use crate::palette::Palette;

/// Reusable quantizer bound to one palette.
///
/// # Example
///
/// ```
/// use quad_shade::{Palette, Quantizer};
///
/// let quantizer = Quantizer::new(Palette::GAME_BOY);
/// // 2x1 image: near-black, near-white
/// let pixels = [12, 9, 15, 250, 251, 249];
/// let image = quantizer.quantize(&pixels, 2, 1).unwrap();
/// assert_eq!(image.indices(), &[0, 3]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Quantizer {
    palette: Palette,
}

impl Quantizer {
    /// Create a quantizer for `palette`.
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// The palette pixels are mapped onto.
    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Quantize a packed RGB8 buffer (row-major, 3 bytes per pixel).
    ///
    /// Zero-area images are accepted and produce an empty
    /// [`QuantizedImage`]; rejecting them is the codec's job.
    ///
    /// # Errors
    ///
    /// [`QuantizeError::BufferSize`] if `pixels.len() != width * height * 3`.
    pub fn quantize(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<QuantizedImage, QuantizeError> {
        let expected = width as u64 * height as u64 * 3;
        if pixels.len() as u64 != expected {
            return Err(QuantizeError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }

        let mut indices = Vec::with_capacity(pixels.len() / 3);

        // Screenshots are dominated by flat color fields: when a pixel repeats
        // the previous one exactly, its nearest entry is already known.
        let mut previous: Option<([u8; 3], u8)> = None;

        for chunk in pixels.chunks_exact(3) {
            let px = [chunk[0], chunk[1], chunk[2]];
            let idx = match previous {
                Some((prev, idx)) if prev == px => idx,
                _ => {
                    let (idx, _) = self.palette.find_nearest(Rgb::from_bytes(px));
                    let idx = idx as u8;
                    previous = Some((px, idx));
                    idx
                }
            };
            indices.push(idx);
        }

        Ok(QuantizedImage::from_parts(indices, width, height))
    }
}

/// Quantize a packed RGB8 buffer onto `palette`.
///
/// Convenience wrapper around [`Quantizer::quantize`].
pub fn quantize(
    pixels: &[u8],
    width: u32,
    height: u32,
    palette: &Palette,
) -> Result<QuantizedImage, QuantizeError> {
    Quantizer::new(*palette).quantize(pixels, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        rgb.repeat((width * height) as usize)
    }

    #[test]
    fn test_single_dark_pixel_maps_to_index_zero() {
        let image = quantize(&[10, 10, 10], 1, 1, &Palette::GAME_BOY).unwrap();
        assert_eq!(image.indices(), &[0]);
        assert_eq!((image.width(), image.height()), (1, 1));
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let err = quantize(&[0; 11], 2, 2, &Palette::GAME_BOY).unwrap_err();
        assert_eq!(
            err,
            QuantizeError::BufferSize {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_zero_area_accepted() {
        let image = quantize(&[], 0, 5, &Palette::GAME_BOY).unwrap();
        assert!(image.is_empty());
        assert_eq!(image.height(), 5);
    }

    #[test]
    fn test_each_pixel_evaluated_independently() {
        // Alternating colors defeat the repeat shortcut on every pixel.
        let pixels = [
            0, 0, 0, //
            90, 80, 85, //
            0, 0, 0, //
            160, 175, 170, //
            240, 255, 250, //
            240, 255, 250,
        ];
        let image = quantize(&pixels, 3, 2, &Palette::GAME_BOY).unwrap();
        assert_eq!(image.indices(), &[0, 1, 0, 2, 3, 3]);
    }

    #[test]
    fn test_row_major_layout() {
        // 2x2: top row white, bottom row black
        let mut pixels = solid(2, 1, [255, 255, 255]);
        pixels.extend(solid(2, 1, [0, 0, 0]));
        let image = quantize(&pixels, 2, 2, &Palette::GAME_BOY).unwrap();
        assert_eq!(image.pixel(0, 0), 3);
        assert_eq!(image.pixel(1, 1), 0);
    }

    #[test]
    fn test_deterministic() {
        let pixels: Vec<u8> = (0..300u32).map(|i| (i * 37 % 256) as u8).collect();
        let a = quantize(&pixels, 10, 10, &Palette::GAME_BOY).unwrap();
        let b = quantize(&pixels, 10, 10, &Palette::GAME_BOY).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_matches_find_nearest_everywhere() {
        let pixels: Vec<u8> = (0..3 * 64u32).map(|i| (i * 53 % 256) as u8).collect();
        let palette = Palette::GAME_BOY;
        let image = quantize(&pixels, 8, 8, &palette).unwrap();
        for (i, chunk) in pixels.chunks_exact(3).enumerate() {
            let (expected, _) = palette.find_nearest(Rgb::new(chunk[0], chunk[1], chunk[2]));
            assert_eq!(image.indices()[i] as usize, expected, "pixel {i}");
        }
    }
}
