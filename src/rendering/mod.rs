pub mod png_out;

pub use png_out::{difference_image, encode_quantized_png, encode_rgb_png};
