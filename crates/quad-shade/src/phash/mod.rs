//! Perceptual hashing of quantized images.
//!
//! Visually similar images produce fingerprints with a small Hamming
//! distance. The hash is the classic DCT pHash: 32x32 luma, 8x8
//! low-frequency block, one bit per coefficient above the median.

mod dct;
mod fingerprint;
mod hasher;

pub use fingerprint::{Fingerprint, ParseFingerprintError};
pub use hasher::{hash, PerceptualHasher};
