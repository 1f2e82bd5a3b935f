use quad_shade::{Palette, Rgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "gbdedup.yaml";

/// Application configuration loaded from gbdedup.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// The four palette shades as hex strings, darkest first by convention
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// Directory holding `.rle` records and `hashes.json`
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Hamming distance below which `check` reports a duplicate
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Hamming distance below which `archive` skips an image
    #[serde(default = "default_archive_threshold")]
    pub archive_threshold: u32,

    /// Worker threads for image preparation
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_palette() -> Vec<String> {
    Palette::GAME_BOY
        .colors()
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("hashed_images")
}

fn default_threshold() -> u32 {
    10
}

fn default_archive_threshold() -> u32 {
    1 // exact fingerprint match only
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// A path was given or looked up but does not exist
    Missing(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Missing(path) => write!(f, "defaults ({} not found)", path.display()),
            ConfigSource::Defaults => write!(f, "defaults"),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults. A file that cannot be parsed, or
    /// that names an invalid palette, is an error.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok((Self::default(), ConfigSource::Missing(path.to_path_buf())));
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            archive_dir = %config.archive_dir.display(),
            threshold = config.threshold,
            jobs = config.jobs,
            "Loaded configuration"
        );
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.palette()?;
        if self.jobs == 0 {
            return Err(ConfigError::Invalid {
                field: "jobs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The configured palette.
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        Ok(Palette::from_hex(&self.palette)?)
    }

    /// Palette colors as upper-case `#RRGGBB`, for display.
    pub fn palette_hex(&self) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .palette()?
            .colors()
            .iter()
            .map(|c: &Rgb| format!("#{}", hex::encode_upper(c.to_bytes())))
            .collect())
    }

    /// Path of the duplicate index inside the archive directory.
    pub fn index_path(&self) -> PathBuf {
        self.archive_dir.join(crate::services::duplicate_index::INDEX_FILE_NAME)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            archive_dir: default_archive_dir(),
            threshold: default_threshold(),
            archive_threshold: default_archive_threshold(),
            jobs: default_jobs(),
        }
    }
}
