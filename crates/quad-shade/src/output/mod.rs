//! Output types for the quantization pipeline.
//!
//! [`QuantizedImage`] is the canonical intermediate form: palette indices
//! plus dimensions. It feeds both the RLE codec and the perceptual hasher,
//! and can be expanded back to RGB with
//! [`QuantizedImage::to_rgb`] for previews.

mod quantized_image;

pub use quantized_image::QuantizedImage;
