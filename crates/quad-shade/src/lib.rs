#![allow(clippy::module_inception)]

//! quad-shade: four-shade quantization, run-length records and perceptual
//! hashing
//!
//! The building blocks of a screenshot de-duplicator. A source frame is
//! reduced to four palette shades, stored as a compact run-length record,
//! and fingerprinted so that near-identical frames can be recognised.
//!
//! ```text
//!   RGB8 pixels
//!       |
//!       v
//!   Quantizer ----> QuantizedImage ----+----> rle::encode ----> RleRecord
//!   (Palette)                          |                        (.rle file)
//!                                      |
//!                                      +----> PerceptualHasher -> Fingerprint
//! ```
//!
//! # Quick Start
//!
//! ```
//! use quad_shade::{rle, Palette, PerceptualHasher, Quantizer};
//!
//! let palette = Palette::GAME_BOY;
//! let quantizer = Quantizer::new(palette);
//! let hasher = PerceptualHasher::new(&palette);
//!
//! // A single dark pixel lands on the darkest shade.
//! let image = quantizer.quantize(&[10, 10, 10], 1, 1).unwrap();
//! assert_eq!(image.indices(), &[0]);
//!
//! let record = rle::encode(&image).unwrap();
//! assert_eq!(record.runs(), &[rle::Run::new(0, 1)]);
//! assert_eq!(rle::decode(&record).unwrap(), image);
//!
//! let fingerprint = hasher.hash(&image);
//! assert_eq!(fingerprint.distance(&hasher.hash(&image)), 0);
//! ```
//!
//! # Determinism
//!
//! Every stage is a pure function of its inputs. Nearest-color ties resolve
//! to the earliest palette entry, and DCT coefficients that are zero up to
//! rounding are treated as exactly zero, so a given frame produces the same
//! record and the same fingerprint on every run.
//!
//! # Palette
//!
//! A [`Palette`] always holds exactly [`PALETTE_SIZE`] distinct colors. The
//! quantized image stores indices only; the same palette must be handed to
//! the hasher, since the hash is computed on the luma of the palette colors.

pub mod color;
pub mod output;
pub mod palette;
pub mod phash;
pub mod quantize;
pub mod rle;


pub use color::Rgb;
pub use output::QuantizedImage;
pub use palette::{Palette, PaletteError, ParseColorError, PALETTE_SIZE};
pub use phash::{Fingerprint, ParseFingerprintError, PerceptualHasher};
pub use quantize::{quantize, QuantizeError, Quantizer};
pub use rle::{RleError, RleRecord, Run};
