//! Truncated two-dimensional DCT-II.
//!
//! Only the `BLOCK_SIZE x BLOCK_SIZE` lowest frequencies of a
//! `SAMPLE_SIZE x SAMPLE_SIZE` grid are ever needed, so the separable
//! transform computes just those rows and columns. Output is unnormalised
//! (the hash only compares coefficients against their median).

/// Side of the resampled luma grid.
pub(crate) const SAMPLE_SIZE: usize = 32;

/// Side of the low-frequency block that becomes the hash.
pub(crate) const BLOCK_SIZE: usize = 8;

/// Magnitudes below this are rounding noise from the cosine sums and are
/// flushed to zero, so flat images hash identically everywhere.
const ZERO_EPSILON: f64 = 1e-6;

/// Precomputed `cos(pi * (2x + 1) * u / (2N))` for `u < BLOCK_SIZE`.
#[derive(Debug, Clone)]
pub(crate) struct DctTable {
    cos: [[f64; SAMPLE_SIZE]; BLOCK_SIZE],
}

impl DctTable {
    pub(crate) fn new() -> Self {
        use std::f64::consts::PI;

        let mut cos = [[0.0; SAMPLE_SIZE]; BLOCK_SIZE];
        for (u, row) in cos.iter_mut().enumerate() {
            for (x, c) in row.iter_mut().enumerate() {
                *c = (PI * (2 * x + 1) as f64 * u as f64 / (2 * SAMPLE_SIZE) as f64).cos();
            }
        }
        Self { cos }
    }

    /// Low-frequency block of the 2D DCT-II of `grid` (indexed `[y][x]`).
    ///
    /// Result is indexed `[vertical frequency][horizontal frequency]`.
    pub(crate) fn low_frequencies(
        &self,
        grid: &[[f64; SAMPLE_SIZE]; SAMPLE_SIZE],
    ) -> [[f64; BLOCK_SIZE]; BLOCK_SIZE] {
        // Rows first: rows[y][u] = sum_x grid[y][x] * cos[u][x]
        let mut rows = [[0.0; BLOCK_SIZE]; SAMPLE_SIZE];
        for (y, line) in grid.iter().enumerate() {
            for u in 0..BLOCK_SIZE {
                rows[y][u] = line
                    .iter()
                    .zip(&self.cos[u])
                    .map(|(value, c)| value * c)
                    .sum();
            }
        }

        // Then columns: out[v][u] = sum_y rows[y][u] * cos[v][y]
        let mut out = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        for v in 0..BLOCK_SIZE {
            for u in 0..BLOCK_SIZE {
                let sum: f64 = (0..SAMPLE_SIZE).map(|y| rows[y][u] * self.cos[v][y]).sum();
                out[v][u] = if sum.abs() < ZERO_EPSILON { 0.0 } else { sum };
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_grid_has_only_dc() {
        let table = DctTable::new();
        let grid = [[100.0; SAMPLE_SIZE]; SAMPLE_SIZE];
        let out = table.low_frequencies(&grid);

        assert!((out[0][0] - 100.0 * (SAMPLE_SIZE * SAMPLE_SIZE) as f64).abs() < 1e-6);
        for (v, row) in out.iter().enumerate() {
            for (u, &c) in row.iter().enumerate() {
                if (v, u) != (0, 0) {
                    assert_eq!(c, 0.0, "coefficient ({v}, {u}) should vanish");
                }
            }
        }
    }

    #[test]
    fn test_horizontal_ramp_has_no_vertical_frequencies() {
        let table = DctTable::new();
        let mut grid = [[0.0; SAMPLE_SIZE]; SAMPLE_SIZE];
        for row in grid.iter_mut() {
            for (x, value) in row.iter_mut().enumerate() {
                *value = x as f64;
            }
        }
        let out = table.low_frequencies(&grid);

        assert!(out[0][1].abs() > 1.0, "ramp must show up at u=1");
        for row in out.iter().skip(1) {
            for &c in row {
                assert_eq!(c, 0.0);
            }
        }
    }
}
