use std::io::Cursor;

use quad_shade::{Palette, QuantizedImage};

use crate::error::RenderError;

/// Encode a quantized image as a 2-bit indexed PNG.
///
/// The PLTE chunk carries the four palette colors in palette order, so the
/// stored pixel values are exactly the quantized indices.
pub fn encode_quantized_png(
    image: &QuantizedImage,
    palette: &Palette,
) -> Result<Vec<u8>, RenderError> {
    check_dimensions(image.width(), image.height())?;

    let plte: Vec<u8> = palette.colors().iter().flat_map(|c| c.to_bytes()).collect();
    let packed = pack_2bit_rows(image.indices(), image.width());
    encode_png(
        image.width(),
        image.height(),
        png::ColorType::Indexed,
        png::BitDepth::Two,
        Some(&plte),
        &packed,
    )
}

/// Encode packed RGB8 pixels as a truecolor PNG.
pub fn encode_rgb_png(width: u32, height: u32, rgb: &[u8]) -> Result<Vec<u8>, RenderError> {
    check_dimensions(width, height)?;
    if rgb.len() as u64 != width as u64 * height as u64 * 3 {
        return Err(RenderError::PngEncode(format!(
            "expected {} RGB bytes for {width}x{height}, got {}",
            width as u64 * height as u64 * 3,
            rgb.len()
        )));
    }
    encode_png(
        width,
        height,
        png::ColorType::Rgb,
        png::BitDepth::Eight,
        None,
        rgb,
    )
}

/// Per-channel absolute difference of two equally sized RGB8 buffers.
///
/// Identical pixels come out black; `None` if the lengths differ.
pub fn difference_image(a: &[u8], b: &[u8]) -> Option<Vec<u8>> {
    if a.len() != b.len() {
        return None;
    }
    Some(a.iter().zip(b).map(|(&x, &y)| x.abs_diff(y)).collect())
}

fn check_dimensions(width: u32, height: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::UnsupportedDimensions { width, height });
    }
    Ok(())
}

fn encode_png(
    width: u32,
    height: u32,
    color_type: png::ColorType,
    bit_depth: png::BitDepth,
    plte: Option<&[u8]>,
    data: &[u8],
) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        if let Some(plte) = plte {
            encoder.set_palette(plte);
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Pack palette indices four to a byte, leftmost pixel in the high bits.
///
/// Every row starts on a fresh byte, as PNG scanlines require.
fn pack_2bit_rows(indices: &[u8], width: u32) -> Vec<u8> {
    let width = width as usize;
    let mut packed = Vec::with_capacity(width.div_ceil(4) * (indices.len() / width));
    for row in indices.chunks(width) {
        packed.extend(row.chunks(4).map(|quad| {
            quad.iter()
                .enumerate()
                .fold(0u8, |byte, (i, &idx)| byte | ((idx & 0b11) << (6 - 2 * i)))
        }));
    }
    packed
}
