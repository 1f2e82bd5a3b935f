//! Pixel comparison directly on run-length records.

use super::codec::RleRecord;

/// Count the pixel positions at which two records hold different colors.
///
/// Walks both run lists in lockstep, consuming the shorter of the two
/// current runs at each step, so the cost is proportional to the number of
/// runs rather than the number of pixels.
///
/// Returns `None` when the records have different dimensions. If one
/// record's runs end early (a corrupt record), the remaining pixels are not
/// counted.
///
/// # Example
///
/// ```
/// use quad_shade::rle::{count_differing_pixels, RleRecord, Run};
///
/// let a = RleRecord::new(4, 1, vec![Run::new(0, 4)]);
/// let b = RleRecord::new(4, 1, vec![Run::new(0, 1), Run::new(3, 2), Run::new(0, 1)]);
/// assert_eq!(count_differing_pixels(&a, &b), Some(2));
/// ```
pub fn count_differing_pixels(a: &RleRecord, b: &RleRecord) -> Option<u64> {
    if a.width() != b.width() || a.height() != b.height() {
        return None;
    }

    let mut runs_a = a.runs().iter().copied();
    let mut runs_b = b.runs().iter().copied();
    let mut current_a = runs_a.next();
    let mut current_b = runs_b.next();
    let mut differing = 0u64;

    while let (Some(mut ra), Some(mut rb)) = (current_a, current_b) {
        let step = ra.length.min(rb.length);
        if ra.color != rb.color {
            differing = differing.saturating_add(step);
        }
        ra.length -= step;
        rb.length -= step;

        current_a = if ra.length == 0 { runs_a.next() } else { Some(ra) };
        current_b = if rb.length == 0 { runs_b.next() } else { Some(rb) };
    }

    Some(differing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::QuantizedImage;
    use crate::rle::{encode, Run};

    #[test]
    fn test_identical_records() {
        let img = QuantizedImage::new(vec![0, 1, 1, 2, 3, 3], 3, 2).unwrap();
        let record = encode(&img).unwrap();
        assert_eq!(count_differing_pixels(&record, &record), Some(0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = RleRecord::new(2, 3, vec![Run::new(0, 6)]);
        let b = RleRecord::new(3, 2, vec![Run::new(0, 6)]);
        assert_eq!(count_differing_pixels(&a, &b), None);
    }

    #[test]
    fn test_matches_pixelwise_count() {
        let left: Vec<u8> = (0..48).map(|i| ((i / 5) % 4) as u8).collect();
        let right: Vec<u8> = (0..48).map(|i| ((i / 7) % 4) as u8).collect();
        let expected = left.iter().zip(&right).filter(|(a, b)| a != b).count() as u64;

        let a = encode(&QuantizedImage::new(left, 8, 6).unwrap()).unwrap();
        let b = encode(&QuantizedImage::new(right, 8, 6).unwrap()).unwrap();
        assert_eq!(count_differing_pixels(&a, &b), Some(expected));
        assert_eq!(count_differing_pixels(&b, &a), Some(expected));
    }

    #[test]
    fn test_misaligned_runs() {
        // Same colors shifted by one pixel: only the boundary pixels differ.
        let a = RleRecord::new(6, 1, vec![Run::new(0, 3), Run::new(1, 3)]);
        let b = RleRecord::new(6, 1, vec![Run::new(0, 4), Run::new(1, 2)]);
        assert_eq!(count_differing_pixels(&a, &b), Some(1));
    }
}
