//! Temporary input and archive directories for pipeline tests.

use std::path::{Path, PathBuf};

use gbdedup::services::{Archive, BatchReport, Pipeline};
use image::RgbImage;
use tempfile::TempDir;

/// An input directory and an archive directory under one temp dir.
pub struct TestWorkspace {
    root: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::create_dir(root.path().join("input")).expect("Failed to create input dir");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.path().join("input")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root.path().join("hashed_images")
    }

    /// Save `image` into the input directory.
    pub fn add_image(&self, name: &str, image: &RgbImage) -> PathBuf {
        let path = self.input_dir().join(name);
        image.save(&path).expect("Failed to write test image");
        path
    }

    pub fn add_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.input_dir().join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Remove everything from the input directory.
    pub fn clear_input(&self) {
        std::fs::remove_dir_all(self.input_dir()).expect("Failed to clear input dir");
        std::fs::create_dir(self.input_dir()).expect("Failed to recreate input dir");
    }

    pub fn open_archive(&self) -> Archive {
        Archive::open(self.archive_dir()).expect("Failed to open archive")
    }

    /// Archive the input directory with the default palette.
    pub fn archive(&self, threshold: u32, jobs: usize) -> BatchReport {
        let mut archive = self.open_archive();
        Pipeline::default()
            .with_jobs(jobs)
            .archive_directory(&self.input_dir(), &mut archive, threshold)
            .expect("Archive run failed")
    }

    /// Sorted `.rle` file names in the archive directory.
    pub fn record_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.archive_dir())
            .expect("Failed to read archive dir")
            .filter_map(|entry| {
                let name = entry.ok()?.file_name().to_string_lossy().into_owned();
                name.ends_with(".rle").then_some(name)
            })
            .collect();
        names.sort();
        names
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
