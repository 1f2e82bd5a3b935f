use std::path::{Path, PathBuf};

use image::ImageError;

use crate::error::DecodeError;

/// Source formats accepted in input directories (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// A decoded source image as packed RGB8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl SourceImage {
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Supported images directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into.
pub fn list_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Decodes source images with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLoader;

impl ImageLoader {
    pub fn load(&self, path: &Path) -> Result<SourceImage, DecodeError> {
        if !is_supported(path) {
            return Err(DecodeError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        let decoded = image::ImageReader::open(path)
            .map_err(|source| DecodeError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .with_guessed_format()
            .map_err(|source| DecodeError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .decode()
            .map_err(|e| match e {
                ImageError::IoError(source) => DecodeError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                ImageError::Unsupported(_) => DecodeError::UnsupportedFormat {
                    path: path.to_path_buf(),
                },
                other => DecodeError::Image {
                    path: path.to_path_buf(),
                    reason: other.to_string(),
                },
            })?;

        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        tracing::debug!(path = %path.display(), width, height, "Decoded source image");

        Ok(SourceImage {
            pixels: rgb.into_raw(),
            width,
            height,
        })
    }
}
