//! gbdedup - four-shade screenshot archiver
//!
//! Reduces screenshots and video frames to a four-color palette, stores them
//! as run-length records and keeps a perceptual-hash index so near-identical
//! frames are archived only once.
//! This library exposes modules for the CLI and for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
