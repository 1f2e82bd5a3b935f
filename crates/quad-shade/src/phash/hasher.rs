use super::dct::{DctTable, BLOCK_SIZE, SAMPLE_SIZE};
use super::fingerprint::Fingerprint;
use crate::output::QuantizedImage;
use crate::palette::{Palette, PALETTE_SIZE};

/// DCT-based perceptual hasher for quantized images.
///
/// A quantized image stores palette indices only, so the hasher is bound to
/// the palette those indices refer to. Hashing then runs:
///
/// 1. Map each index to the luma of its palette color
/// 2. Area-average the luma plane down to 32x32
/// 3. Take the top-left 8x8 block of the 2D DCT-II
/// 4. Set a bit for every coefficient strictly above the block's median
///
/// Images of any size, including 1x1, hash to a defined value; an image with
/// no pixels hashes to [`Fingerprint::ZERO`].
///
/// # Example
///
/// ```
/// use quad_shade::{Palette, PerceptualHasher, QuantizedImage};
///
/// let hasher = PerceptualHasher::new(&Palette::GAME_BOY);
/// let a = QuantizedImage::new(vec![0, 3, 3, 0], 2, 2).unwrap();
/// let b = a.clone();
/// assert_eq!(hasher.hash(&a), hasher.hash(&b));
/// ```
#[derive(Debug, Clone)]
pub struct PerceptualHasher {
    luma: [f64; PALETTE_SIZE],
    table: DctTable,
}

impl PerceptualHasher {
    /// Create a hasher for images quantized against `palette`.
    ///
    /// The palette's lumas and the DCT cosine table are computed once here.
    pub fn new(palette: &Palette) -> Self {
        let mut luma = [0.0; PALETTE_SIZE];
        for (slot, color) in luma.iter_mut().zip(palette.colors()) {
            *slot = color.luma() as f64;
        }
        Self {
            luma,
            table: DctTable::new(),
        }
    }

    /// Fingerprint `image`.
    ///
    /// A flat image sets only the DC bit:
    ///
    /// ```
    /// use quad_shade::{Fingerprint, Palette, PerceptualHasher, QuantizedImage};
    ///
    /// let hasher = PerceptualHasher::new(&Palette::GAME_BOY);
    /// let flat = QuantizedImage::new(vec![2; 40 * 30], 40, 30).unwrap();
    /// assert_eq!(hasher.hash(&flat), Fingerprint::from_bits(1 << 63));
    /// ```
    pub fn hash(&self, image: &QuantizedImage) -> Fingerprint {
        if image.is_empty() {
            return Fingerprint::ZERO;
        }

        let grid = self.resample(image);
        let block = self.table.low_frequencies(&grid);

        let mut coefficients = [0.0f64; BLOCK_SIZE * BLOCK_SIZE];
        for (dst, src) in coefficients.iter_mut().zip(block.iter().flatten()) {
            *dst = *src;
        }

        let median = median(&coefficients);
        let mut bits = 0u64;
        for (i, &c) in coefficients.iter().enumerate() {
            if c > median {
                bits |= 1 << (Fingerprint::BITS as usize - 1 - i);
            }
        }
        Fingerprint::from_bits(bits)
    }

    /// Area-average the luma plane onto a `SAMPLE_SIZE` square grid.
    ///
    /// Each output cell averages the source rectangle it covers; when the
    /// source is smaller than the grid, cells repeat the nearest pixel.
    fn resample(&self, image: &QuantizedImage) -> [[f64; SAMPLE_SIZE]; SAMPLE_SIZE] {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let indices = image.indices();

        let mut grid = [[0.0; SAMPLE_SIZE]; SAMPLE_SIZE];
        for (gy, row) in grid.iter_mut().enumerate() {
            let (y0, y1) = span(gy, height);
            for (gx, cell) in row.iter_mut().enumerate() {
                let (x0, x1) = span(gx, width);

                let mut sum = 0.0;
                for y in y0..y1 {
                    let line = &indices[y * width..(y + 1) * width];
                    sum += line[x0..x1]
                        .iter()
                        .map(|&idx| self.luma[idx as usize])
                        .sum::<f64>();
                }
                *cell = sum / ((y1 - y0) * (x1 - x0)) as f64;
            }
        }
        grid
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(&Palette::GAME_BOY)
    }
}

/// Source range covered by grid cell `cell` along an axis of `len` pixels.
///
/// Never empty: a cell that falls between two source pixels takes the one
/// at its start.
fn span(cell: usize, len: usize) -> (usize, usize) {
    let start = cell * len / SAMPLE_SIZE;
    let end = ((cell + 1) * len / SAMPLE_SIZE).max(start + 1);
    (start, end.min(len))
}

/// Median of an even-length slice: mean of the two middle values.
fn median(values: &[f64; BLOCK_SIZE * BLOCK_SIZE]) -> f64 {
    let mut sorted = *values;
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    (sorted[mid - 1] + sorted[mid]) / 2.0
}

/// Hash `image` with a one-off hasher for `palette`.
///
/// Prefer keeping a [`PerceptualHasher`] around when hashing many images.
pub fn hash(image: &QuantizedImage, palette: &Palette) -> Fingerprint {
    PerceptualHasher::new(palette).hash(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(idx: u8, w: u32, h: u32) -> QuantizedImage {
        QuantizedImage::new(vec![idx; (w * h) as usize], w, h).unwrap()
    }

    #[test]
    fn test_span_partitions_large_axis() {
        let mut covered = 0;
        for cell in 0..SAMPLE_SIZE {
            let (start, end) = span(cell, 100);
            assert_eq!(start, covered);
            covered = end;
        }
        assert_eq!(covered, 100);
    }

    #[test]
    fn test_span_small_axis_never_empty() {
        for cell in 0..SAMPLE_SIZE {
            let (start, end) = span(cell, 3);
            assert!(end > start);
            assert!(end <= 3);
        }
    }

    #[test]
    fn test_median_even_length() {
        let mut values = [0.0; 64];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f64;
        }
        assert_eq!(median(&values), 31.5);
    }

    #[test]
    fn test_empty_image_hashes_to_zero() {
        let hasher = PerceptualHasher::default();
        let empty = QuantizedImage::new(Vec::new(), 0, 5).unwrap();
        assert_eq!(hasher.hash(&empty), Fingerprint::ZERO);
    }

    #[test]
    fn test_black_image_hashes_to_zero() {
        // All coefficients are zero, none exceed the median.
        let hasher = PerceptualHasher::default();
        assert_eq!(hasher.hash(&uniform(0, 40, 30)), Fingerprint::ZERO);
    }

    #[test]
    fn test_flat_image_sets_only_dc_bit() {
        let hasher = PerceptualHasher::default();
        let expected = Fingerprint::from_bits(1 << 63);
        assert_eq!(hasher.hash(&uniform(3, 64, 64)), expected);
        assert_eq!(hasher.hash(&uniform(2, 7, 5)), expected);
        assert_eq!(hasher.hash(&uniform(1, 1, 1)), expected);
    }

    #[test]
    fn test_scaled_copy_hashes_identically() {
        // A 2x nearest-neighbour upscale averages back to the same grid.
        let small: Vec<u8> = (0..64 * 64).map(|i| ((i % 64) / 16) as u8).collect();
        let mut large = Vec::with_capacity(128 * 128);
        for y in 0..128 {
            for x in 0..128 {
                large.push(small[(y / 2) * 64 + x / 2]);
            }
        }

        let hasher = PerceptualHasher::default();
        let a = hasher.hash(&QuantizedImage::new(small, 64, 64).unwrap());
        let b = hasher.hash(&QuantizedImage::new(large, 128, 128).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_inverted_step_flips_every_ac_bit() {
        // A vertical edge has exactly four non-zero low frequencies (odd u on
        // the first row). Inverting negates them and leaves DC unchanged.
        let left_dark: Vec<u8> = (0..32 * 32).map(|i| if i % 32 < 16 { 0 } else { 3 }).collect();
        let right_dark: Vec<u8> = left_dark.iter().map(|&i| 3 - i).collect();

        let hasher = PerceptualHasher::default();
        let a = hasher.hash(&QuantizedImage::new(left_dark, 32, 32).unwrap());
        let b = hasher.hash(&QuantizedImage::new(right_dark, 32, 32).unwrap());
        assert_eq!(a.bits() >> 63, 1);
        assert_eq!(b.bits() >> 63, 1);
        assert_eq!(a.distance(&b), 4);
    }

    #[test]
    fn test_free_function_matches_hasher() {
        let img = QuantizedImage::new(vec![0, 1, 2, 3, 3, 2, 1, 0, 0], 3, 3).unwrap();
        assert_eq!(
            hash(&img, &Palette::GAME_BOY),
            PerceptualHasher::new(&Palette::GAME_BOY).hash(&img)
        );
    }
}
