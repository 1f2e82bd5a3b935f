pub mod config;

pub use config::{AppConfig, ConfigSource, DEFAULT_CONFIG_FILE};
