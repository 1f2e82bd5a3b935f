//! Color parsing and palette validation errors.

use std::fmt;

/// Why a hex color string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    /// Digits after the optional `#` number neither 3 nor 6
    WrongDigitCount(usize),
    /// A character that is not a hex digit
    NotHex(char),
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::WrongDigitCount(n) => {
                write!(f, "expected 3 or 6 hex digits, got {}", n)
            }
            ParseColorError::NotHex(ch) => write!(f, "{:?} is not a hex digit", ch),
        }
    }
}

impl std::error::Error for ParseColorError {}

/// Error type for palette validation.
///
/// Returned when a palette does not have exactly
/// [`PALETTE_SIZE`](super::PALETTE_SIZE) distinct colors.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteError {
    /// Wrong number of colors supplied
    WrongSize {
        /// Number of colors a palette must have
        expected: usize,
        /// Number of colors supplied
        actual: usize,
    },
    /// Duplicate color found at the specified index
    DuplicateColor {
        /// Index where the duplicate was found
        index: usize,
    },
    /// Invalid hex color string
    ParseColor(ParseColorError),
}

impl From<ParseColorError> for PaletteError {
    fn from(err: ParseColorError) -> Self {
        PaletteError::ParseColor(err)
    }
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::WrongSize { expected, actual } => {
                write!(
                    f,
                    "palette must have exactly {} colors, got {}",
                    expected, actual
                )
            }
            PaletteError::DuplicateColor { index } => {
                write!(f, "duplicate color found at index {}", index)
            }
            PaletteError::ParseColor(err) => {
                write!(f, "invalid color: {}", err)
            }
        }
    }
}

impl std::error::Error for PaletteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaletteError::ParseColor(err) => Some(err),
            _ => None,
        }
    }
}
