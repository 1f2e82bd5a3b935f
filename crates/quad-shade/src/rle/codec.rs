//! In-memory run-length codec.

use super::error::RleError;
use crate::output::QuantizedImage;
use crate::palette::PALETTE_SIZE;

/// One run: `length` consecutive pixels of palette index `color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// Palette index
    pub color: u8,
    /// Number of pixels; unbounded, a uniform frame is a single run
    pub length: u64,
}

impl Run {
    /// Create a run.
    #[inline]
    pub const fn new(color: u8, length: u64) -> Self {
        Self { color, length }
    }
}

impl From<(u8, u64)> for Run {
    fn from((color, length): (u8, u64)) -> Self {
        Self::new(color, length)
    }
}

/// A run-length compressed [`QuantizedImage`].
///
/// Runs cover the image in row-major order and are not split at row
/// boundaries. The dimensions are kept so the grid can be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RleRecord {
    width: u32,
    height: u32,
    runs: Vec<Run>,
}

impl RleRecord {
    /// Build a record from raw parts.
    ///
    /// Nothing is validated here; [`decode`] checks the runs against the
    /// dimensions.
    pub fn new(width: u32, height: u32, runs: Vec<Run>) -> Self {
        Self {
            width,
            height,
            runs,
        }
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The runs, in row-major order.
    #[inline]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Sum of all run lengths, saturating at `u64::MAX`.
    pub fn pixel_count(&self) -> u64 {
        self.runs
            .iter()
            .fold(0u64, |acc, run| acc.saturating_add(run.length))
    }

    /// Decode back into a [`QuantizedImage`]. See [`decode`].
    pub fn decode(&self) -> Result<QuantizedImage, RleError> {
        decode(self)
    }
}

/// Run-length encode a quantized image.
///
/// Scans the indices in row-major order and emits a run every time the
/// color changes.
///
/// # Errors
///
/// [`RleError::EmptyImage`] if the image has no pixels.
///
/// # Example
///
/// ```
/// use quad_shade::{rle, QuantizedImage, Run};
///
/// let image = QuantizedImage::new(vec![0, 0, 0, 2, 2, 1], 3, 2).unwrap();
/// let record = rle::encode(&image).unwrap();
/// assert_eq!(record.runs(), &[Run::new(0, 3), Run::new(2, 2), Run::new(1, 1)]);
/// assert_eq!(rle::decode(&record).unwrap(), image);
/// ```
pub fn encode(image: &QuantizedImage) -> Result<RleRecord, RleError> {
    let (&first, rest) = image
        .indices()
        .split_first()
        .ok_or(RleError::EmptyImage)?;

    let mut runs = Vec::new();
    let mut current = Run::new(first, 1);

    for &idx in rest {
        if idx == current.color {
            current.length += 1;
        } else {
            runs.push(current);
            current = Run::new(idx, 1);
        }
    }
    runs.push(current);

    Ok(RleRecord::new(image.width(), image.height(), runs))
}

/// Largest image [`decode`] will expand (2^28 pixels, 16384x16384).
pub const MAX_DECODED_PIXELS: u64 = 1 << 28;

/// Expand a record back into a [`QuantizedImage`].
///
/// The header area is capped at [`MAX_DECODED_PIXELS`] and every run is
/// validated before the pixel buffer is reserved.
///
/// # Errors
///
/// - [`RleError::EmptyImage`] if the header has zero area
/// - [`RleError::TooLarge`] if the header area exceeds [`MAX_DECODED_PIXELS`]
///   or the buffer cannot be reserved
/// - [`RleError::InvalidColor`] / [`RleError::ZeroLengthRun`] for malformed runs
/// - [`RleError::CorruptRecord`] if the runs do not cover exactly
///   `width * height` pixels; nothing is truncated or padded
pub fn decode(record: &RleRecord) -> Result<QuantizedImage, RleError> {
    let expected = record.width as u64 * record.height as u64;
    if expected == 0 {
        return Err(RleError::EmptyImage);
    }
    if expected > MAX_DECODED_PIXELS {
        return Err(RleError::TooLarge { pixels: expected });
    }

    for (i, run) in record.runs.iter().enumerate() {
        if run.color as usize >= PALETTE_SIZE {
            return Err(RleError::InvalidColor {
                run: i,
                color: run.color,
            });
        }
        if run.length == 0 {
            return Err(RleError::ZeroLengthRun { run: i });
        }
    }

    let actual = record.pixel_count();
    if actual != expected {
        return Err(RleError::CorruptRecord { expected, actual });
    }

    let too_large = || RleError::TooLarge { pixels: expected };
    let capacity = usize::try_from(expected).map_err(|_| too_large())?;
    let mut indices = Vec::new();
    indices
        .try_reserve_exact(capacity)
        .map_err(|_| too_large())?;
    for run in &record.runs {
        indices.resize(indices.len() + run.length as usize, run.color);
    }

    Ok(QuantizedImage::from_parts(
        indices,
        record.width,
        record.height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(indices: Vec<u8>, w: u32, h: u32) -> QuantizedImage {
        QuantizedImage::new(indices, w, h).unwrap()
    }

    #[test]
    fn test_single_pixel() {
        let img = image(vec![0], 1, 1);
        let record = encode(&img).unwrap();
        assert_eq!(record.runs(), &[Run::new(0, 1)]);
        assert_eq!(decode(&record).unwrap(), img);
    }

    #[test]
    fn test_empty_image_rejected() {
        let img = image(Vec::new(), 0, 0);
        assert!(matches!(encode(&img), Err(RleError::EmptyImage)));

        let img = image(Vec::new(), 10, 0);
        assert!(matches!(encode(&img), Err(RleError::EmptyImage)));
    }

    #[test]
    fn test_runs_cross_row_boundaries() {
        // 2x2, all one color: one run, not one per row
        let record = encode(&image(vec![1; 4], 2, 2)).unwrap();
        assert_eq!(record.runs(), &[Run::new(1, 4)]);
    }

    #[test]
    fn test_adjacent_runs_differ() {
        let img = image(vec![0, 1, 1, 2, 2, 2, 3, 0, 0], 3, 3);
        let record = encode(&img).unwrap();
        for pair in record.runs().windows(2) {
            assert_ne!(pair[0].color, pair[1].color);
        }
        assert_eq!(record.pixel_count(), 9);
        assert_eq!(decode(&record).unwrap(), img);
    }

    #[test]
    fn test_uniform_million_pixels() {
        let img = image(vec![3; 1000 * 1000], 1000, 1000);
        let record = encode(&img).unwrap();
        assert_eq!(record.runs(), &[Run::new(3, 1_000_000)]);
        assert_eq!(decode(&record).unwrap(), img);
    }

    #[test]
    fn test_alternating_worst_case() {
        let indices: Vec<u8> = (0..64).map(|i| (i % 4) as u8).collect();
        let img = image(indices, 8, 8);
        let record = encode(&img).unwrap();
        assert_eq!(record.runs().len(), 64);
        assert_eq!(decode(&record).unwrap(), img);
    }

    #[test]
    fn test_oversized_header_is_rejected_before_allocating() {
        let side = u32::MAX;
        let area = side as u64 * side as u64;
        let bytes = RleRecord::new(side, side, vec![Run::new(0, area)]).to_bytes();
        let record = RleRecord::from_bytes(&bytes).unwrap();

        assert!(matches!(
            decode(&record),
            Err(RleError::TooLarge { pixels }) if pixels == area
        ));

        let record = RleRecord::new(100_000, 100_000, vec![Run::new(1, 10_000_000_000)]);
        assert!(matches!(decode(&record), Err(RleError::TooLarge { .. })));
    }

    #[test]
    fn test_largest_allowed_area_passes_the_cap() {
        // One pixel short of the cover: rejected by the run check, not the cap.
        let record = RleRecord::new(1 << 14, 1 << 14, vec![Run::new(0, MAX_DECODED_PIXELS - 1)]);
        assert!(matches!(decode(&record), Err(RleError::CorruptRecord { .. })));
    }

    #[test]
    fn test_decode_short_record_is_corrupt() {
        let record = RleRecord::new(3, 2, vec![Run::new(0, 5)]);
        assert!(matches!(
            decode(&record),
            Err(RleError::CorruptRecord {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_decode_long_record_is_corrupt() {
        let record = RleRecord::new(2, 2, vec![Run::new(0, 3), Run::new(1, 2)]);
        assert!(matches!(
            decode(&record),
            Err(RleError::CorruptRecord {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_decode_overflowing_lengths_is_corrupt() {
        let record = RleRecord::new(
            2,
            2,
            vec![Run::new(0, u64::MAX), Run::new(1, u64::MAX)],
        );
        assert!(matches!(
            decode(&record),
            Err(RleError::CorruptRecord {
                expected: 4,
                actual: u64::MAX
            })
        ));
    }

    #[test]
    fn test_decode_invalid_color() {
        let record = RleRecord::new(1, 2, vec![Run::new(0, 1), Run::new(7, 1)]);
        assert!(matches!(
            decode(&record),
            Err(RleError::InvalidColor { run: 1, color: 7 })
        ));
    }

    #[test]
    fn test_decode_zero_length_run() {
        let record = RleRecord::new(1, 1, vec![Run::new(0, 0), Run::new(0, 1)]);
        assert!(matches!(
            decode(&record),
            Err(RleError::ZeroLengthRun { run: 0 })
        ));
    }

    #[test]
    fn test_decode_zero_area_header() {
        let record = RleRecord::new(0, 4, Vec::new());
        assert!(matches!(decode(&record), Err(RleError::EmptyImage)));
    }
}
