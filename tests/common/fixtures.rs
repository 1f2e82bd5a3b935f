//! Test frames.
//!
//! All frames are 64x64 so they resample to the 32x32 hash grid without
//! mixed cells. Black and white snap to the first and last Game Boy shades.

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SIZE: u32 = 64;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Left half white, right half black.
pub fn bright_left() -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |x, _| if x < SIZE / 2 { WHITE } else { BLACK })
}

/// Mirror image of [`bright_left`].
pub fn bright_right() -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |x, _| if x < SIZE / 2 { BLACK } else { WHITE })
}

/// Top half white, bottom half black.
pub fn bright_top() -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |_, y| if y < SIZE / 2 { WHITE } else { BLACK })
}

pub fn flat(value: u8) -> RgbImage {
    RgbImage::from_pixel(SIZE, SIZE, Rgb([value, value, value]))
}

/// `image` with every channel nudged by up to `amplitude`.
pub fn with_noise(image: &RgbImage, amplitude: i16, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut noisy = image.clone();
    for pixel in noisy.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            let delta = rng.gen_range(-amplitude..=amplitude);
            *channel = (*channel as i16 + delta).clamp(0, 255) as u8;
        }
    }
    noisy
}

/// Bytes that carry a supported extension but decode to nothing.
pub const NOT_AN_IMAGE: &[u8] = b"this is not a png file";
