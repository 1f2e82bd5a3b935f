//! Error type for run-length encoding, decoding and record I/O.

use std::fmt;
use std::io;

/// Errors produced by the RLE codec and the record wire format.
#[derive(Debug)]
pub enum RleError {
    /// The image (or record header) has zero pixels
    EmptyImage,
    /// Run lengths do not add up to `width * height`
    CorruptRecord {
        /// `width * height` from the record header
        expected: u64,
        /// Sum of all run lengths (saturating)
        actual: u64,
    },
    /// Header area is beyond what decoding will allocate
    TooLarge {
        /// `width * height` from the record header
        pixels: u64,
    },
    /// A run references a color outside the palette
    InvalidColor {
        /// Position of the offending run
        run: usize,
        /// The color index found
        color: u8,
    },
    /// A run has length zero
    ZeroLengthRun {
        /// Position of the offending run
        run: usize,
    },
    /// The stream does not start with the record magic
    BadMagic,
    /// The record was written by an unknown format version
    UnsupportedVersion(u8),
    /// The stream ended inside the header or inside a run
    Truncated,
    /// A run length does not fit in 64 bits
    VarintOverflow,
    /// Underlying reader or writer failed
    Io(io::Error),
}

impl RleError {
    /// True for errors that mean the record content itself is wrong, as
    /// opposed to the bytes failing to arrive.
    pub fn is_corrupt(&self) -> bool {
        !matches!(self, RleError::Io(_) | RleError::EmptyImage)
    }
}

impl From<io::Error> for RleError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            RleError::Truncated
        } else {
            RleError::Io(err)
        }
    }
}

impl fmt::Display for RleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RleError::EmptyImage => write!(f, "image has zero pixels"),
            RleError::CorruptRecord { expected, actual } => write!(
                f,
                "corrupt record: runs cover {} pixels, header says {}",
                actual, expected
            ),
            RleError::TooLarge { pixels } => {
                write!(f, "record of {} pixels is too large to decode", pixels)
            }
            RleError::InvalidColor { run, color } => {
                write!(f, "corrupt record: run {} has invalid color {}", run, color)
            }
            RleError::ZeroLengthRun { run } => {
                write!(f, "corrupt record: run {} has zero length", run)
            }
            RleError::BadMagic => write!(f, "not an RLE record (bad magic)"),
            RleError::UnsupportedVersion(v) => {
                write!(f, "unsupported RLE record version {}", v)
            }
            RleError::Truncated => write!(f, "RLE record is truncated"),
            RleError::VarintOverflow => write!(f, "run length overflows 64 bits"),
            RleError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for RleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RleError::Io(err) => Some(err),
            _ => None,
        }
    }
}
