//! Error type for quantization input validation.

use std::fmt;

/// Error returned when a source pixel buffer does not match its dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantizeError {
    /// Buffer length differs from `width * height * 3`
    BufferSize {
        /// Expected length in bytes
        expected: u64,
        /// Actual length in bytes
        actual: usize,
    },
}

impl fmt::Display for QuantizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantizeError::BufferSize { expected, actual } => write!(
                f,
                "RGB buffer has {} bytes, expected {} (width * height * 3)",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for QuantizeError {}
