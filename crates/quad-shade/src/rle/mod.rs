//! Run-length encoding of quantized images.
//!
//! Four-color frames are mostly long stretches of a single index, so a plain
//! `(color, length)` scheme compresses them well. Lengths are unbounded in
//! memory (`u64`) and variable-length on disk, so a uniform multi-megapixel
//! frame is a single run.
//!
//! - [`encode`] / [`decode`]: exact round trip between [`QuantizedImage`]
//!   and [`RleRecord`]
//! - [`RleRecord::write_to`] / [`RleRecord::read_from`]: the file format
//!   (see [`format`])
//! - [`count_differing_pixels`]: compare two records without expanding them
//!
//! [`QuantizedImage`]: crate::QuantizedImage

mod codec;
mod compare;
mod error;
pub mod format;

pub use codec::{decode, encode, RleRecord, Run, MAX_DECODED_PIXELS};
pub use compare::count_differing_pixels;
pub use error::RleError;
