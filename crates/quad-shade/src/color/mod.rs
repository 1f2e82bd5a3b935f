//! Color types
//!
//! Source images arrive as packed 8-bit RGB. [`Rgb`] is the one color type
//! used throughout the crate: palette entries, source pixels and preview
//! output all share it.
//!
//! # Example
//!
//! ```
//! use quad_shade::Rgb;
//!
//! let grey: Rgb = "#555".parse().unwrap();
//! assert_eq!(grey, Rgb::new(0x55, 0x55, 0x55));
//! ```

mod rgb;

pub use rgb::Rgb;
