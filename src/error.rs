use std::path::PathBuf;

use quad_shade::{PaletteError, QuantizeError, RleError};
use thiserror::Error;

/// A source image could not be read or decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported image format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to decode {}: {reason}", path.display())]
    Image { path: PathBuf, reason: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Index IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Record {identifier} is unreadable: {source}")]
    Record {
        identifier: String,
        #[source]
        source: RleError,
    },

    #[error("Identifier already archived: {0}")]
    IdentifierTaken(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error while processing a single image or a batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Quantize error: {0}")]
    Quantize(#[from] QuantizeError),

    #[error("Encode error: {0}")]
    Encode(#[from] RleError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Whether a batch may skip the offending image and carry on.
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            PipelineError::Decode(_) | PipelineError::Quantize(_) | PipelineError::Encode(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid palette: {0}")]
    Palette(#[from] PaletteError),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported dimensions: {width}x{height}")]
    UnsupportedDimensions { width: u32, height: u32 },

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
