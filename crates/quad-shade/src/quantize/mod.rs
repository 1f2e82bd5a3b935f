//! Nearest-color quantization onto a four-color palette.
//!
//! Every pixel is mapped to the palette entry with the smallest Euclidean
//! distance in RGB space; ties go to the earlier palette entry. There is no
//! error diffusion: the output is a pure function of the input pixels and
//! the palette, which is what makes downstream hashes reproducible.

mod error;
mod quantizer;

pub use error::QuantizeError;
pub use quantizer::{quantize, Quantizer};
