use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quad_shade::{
    rle, Fingerprint, Palette, PerceptualHasher, QuantizedImage, Quantizer, RleRecord,
};
use rayon::prelude::*;

use super::archive::{Archive, StoreOutcome};
use super::duplicate_index::{DuplicateIndex, DuplicateMatch, INDEX_FILE_NAME};
use super::image_loader::{list_images, ImageLoader, SourceImage};
use crate::error::{ArchiveError, ConfigError, PipelineError};
use crate::models::AppConfig;
use crate::rendering::png_out;

/// Hamming distance below which `check` reports a duplicate.
pub const DEFAULT_THRESHOLD: u32 = 10;

/// Images each worker prepares before the batch commits them.
const IMAGES_PER_WORKER: usize = 4;

/// A source image reduced to everything the index decision needs.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub source: PathBuf,
    pub image: QuantizedImage,
    pub record: RleRecord,
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Archived { identifier: String },
    Duplicate { of: String, distance: u32 },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub source: PathBuf,
    pub outcome: ImageOutcome,
}

/// Summary of one `archive` run, in listing order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub images: Vec<ImageReport>,
}

impl BatchReport {
    pub fn archived(&self) -> usize {
        self.count(|o| matches!(o, ImageOutcome::Archived { .. }))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, ImageOutcome::Duplicate { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ImageOutcome::Failed { .. }))
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    fn count(&self, pred: impl Fn(&ImageOutcome) -> bool) -> usize {
        self.images.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Answer to "has this image been archived already?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub fingerprint: Fingerprint,
    pub matched: Option<DuplicateMatch>,
}

impl CheckResult {
    pub fn is_duplicate(&self) -> bool {
        self.matched.is_some()
    }

    pub fn matched_identifier(&self) -> Option<&str> {
        self.matched.as_ref().map(|m| m.identifier.as_str())
    }
}

/// Similarity of two source images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub fingerprints: (Fingerprint, Fingerprint),
    /// Hamming distance between the fingerprints
    pub distance: u32,
    /// Quantized pixels that differ, `None` when the dimensions differ
    pub differing_pixels: Option<u64>,
    pub total_pixels: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantizeReport {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

/// Orchestrates load -> quantize -> encode + hash -> index
///
/// Preparation of distinct images is independent and runs on a rayon pool
/// when `jobs > 1`. Everything touching the archive happens on the calling
/// thread, strictly in listing order, so image N always sees the index
/// entries added for images 1..N-1.
#[derive(Debug, Clone)]
pub struct Pipeline {
    loader: ImageLoader,
    quantizer: Quantizer,
    hasher: PerceptualHasher,
    jobs: usize,
}

impl Pipeline {
    pub fn new(palette: Palette) -> Self {
        Self {
            loader: ImageLoader,
            quantizer: Quantizer::new(palette),
            hasher: PerceptualHasher::new(&palette),
            jobs: 1,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.palette()?).with_jobs(config.jobs))
    }

    /// Worker threads for preparation; 1 runs everything inline.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn palette(&self) -> &Palette {
        self.quantizer.palette()
    }

    pub fn hasher(&self) -> &PerceptualHasher {
        &self.hasher
    }

    pub fn load(&self, path: &Path) -> Result<SourceImage, PipelineError> {
        Ok(self.loader.load(path)?)
    }

    pub fn quantize_source(&self, source: &SourceImage) -> Result<QuantizedImage, PipelineError> {
        Ok(self
            .quantizer
            .quantize(&source.pixels, source.width, source.height)?)
    }

    /// Decode, quantize, encode and hash one image.
    pub fn prepare(&self, path: &Path) -> Result<PreparedImage, PipelineError> {
        let source = self.load(path)?;
        self.prepare_source(path, &source)
    }

    fn prepare_source(
        &self,
        path: &Path,
        source: &SourceImage,
    ) -> Result<PreparedImage, PipelineError> {
        let image = self.quantize_source(source)?;
        let record = rle::encode(&image)?;
        let fingerprint = self.hasher.hash(&image);

        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            runs = record.runs().len(),
            fingerprint = %fingerprint,
            "Prepared image"
        );

        Ok(PreparedImage {
            source: path.to_path_buf(),
            image,
            record,
            fingerprint,
        })
    }

    /// Archive every supported image in `input`.
    ///
    /// Images that cannot be decoded or are empty are logged and counted as
    /// failed. Archive and index errors abort the batch; the index is still
    /// saved for the images committed before the error.
    pub fn archive_directory(
        &self,
        input: &Path,
        archive: &mut Archive,
        threshold: u32,
    ) -> Result<BatchReport, PipelineError> {
        let started_at = Utc::now();
        let paths = list_images(input).map_err(io_error(input))?;

        tracing::info!(
            input = %input.display(),
            images = paths.len(),
            jobs = self.jobs,
            threshold,
            "Archiving directory"
        );

        let mut seq = archive.next_sequence();
        let mut images = Vec::with_capacity(paths.len());

        let result = self.run_in_order(
            &paths,
            |path| self.prepare(path),
            |path, prepared| {
                let outcome = match prepared {
                    Ok(prepared) => {
                        match archive.store(seq, &prepared.record, prepared.fingerprint, threshold)? {
                            StoreOutcome::Archived { identifier } => {
                                seq = seq.next();
                                tracing::info!(
                                    path = %path.display(),
                                    identifier = %identifier,
                                    "Archived"
                                );
                                ImageOutcome::Archived { identifier }
                            }
                            StoreOutcome::Duplicate { of, distance } => {
                                tracing::info!(
                                    path = %path.display(),
                                    duplicate_of = %of,
                                    distance,
                                    "Skipped duplicate"
                                );
                                ImageOutcome::Duplicate { of, distance }
                            }
                        }
                    }
                    Err(e) if e.is_per_image() => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping image");
                        ImageOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                    Err(e) => return Err(e),
                };
                images.push(ImageReport {
                    source: path.to_path_buf(),
                    outcome,
                });
                Ok(())
            },
        );

        if let Err(e) = &result {
            tracing::error!(error = %e, committed = images.len(), "Batch aborted");
        }
        archive.save()?;
        result?;

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            images,
        };
        tracing::info!(
            archived = report.archived(),
            duplicates = report.duplicates(),
            failed = report.failed(),
            elapsed_ms = report.elapsed().num_milliseconds(),
            "Batch complete"
        );
        Ok(report)
    }

    /// Look `path` up in `index` without modifying it.
    pub fn check(
        &self,
        path: &Path,
        index: &DuplicateIndex,
        threshold: u32,
    ) -> Result<CheckResult, PipelineError> {
        let prepared = self.prepare(path)?;
        let matched = index.find_match(&prepared.fingerprint, threshold);
        Ok(CheckResult {
            fingerprint: prepared.fingerprint,
            matched,
        })
    }

    /// Look `path` up in the index saved in `index_dir`.
    ///
    /// A directory without an index has no duplicates; a corrupt index is an
    /// error.
    pub fn check_in_dir(
        &self,
        path: &Path,
        index_dir: &Path,
        threshold: u32,
    ) -> Result<CheckResult, PipelineError> {
        let index =
            DuplicateIndex::load(&index_dir.join(INDEX_FILE_NAME)).map_err(ArchiveError::from)?;
        let result = self.check(path, &index, threshold)?;
        match &result.matched {
            Some(m) => tracing::info!(
                path = %path.display(),
                duplicate_of = %m.identifier,
                distance = m.distance,
                "Duplicate"
            ),
            None => tracing::info!(path = %path.display(), "Not a duplicate"),
        }
        Ok(result)
    }

    /// Write every supported image in `input` to `output` as a palette PNG,
    /// numbered `001.png`, `002.png`, ... in listing order.
    pub fn quantize_directory(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<QuantizeReport, PipelineError> {
        let paths = list_images(input).map_err(io_error(input))?;
        std::fs::create_dir_all(output).map_err(io_error(output))?;

        let mut report = QuantizeReport::default();
        let palette = *self.palette();

        self.run_in_order(
            &paths,
            |path| {
                let source = self.load(path)?;
                let image = self.quantize_source(&source)?;
                Ok::<_, PipelineError>(png_out::encode_quantized_png(&image, &palette))
            },
            |path, encoded| match encoded {
                Ok(Ok(png)) => {
                    let name = format!("{:03}.png", report.written.len() + 1);
                    let target = output.join(&name);
                    std::fs::write(&target, png).map_err(io_error(&target))?;
                    tracing::info!(path = %path.display(), output = %name, "Quantized");
                    report.written.push(target);
                    Ok(())
                }
                Ok(Err(e)) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping image");
                    report.failed += 1;
                    Ok(())
                }
                Err(e) if e.is_per_image() => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping image");
                    report.failed += 1;
                    Ok(())
                }
                Err(e) => Err(e),
            },
        )?;

        Ok(report)
    }

    /// Compare two source images by fingerprint and by quantized pixels.
    pub fn compare(&self, a: &Path, b: &Path) -> Result<Comparison, PipelineError> {
        let a = self.prepare(a)?;
        let b = self.prepare(b)?;
        Ok(Comparison {
            fingerprints: (a.fingerprint, b.fingerprint),
            distance: a.fingerprint.distance(&b.fingerprint),
            differing_pixels: rle::count_differing_pixels(&a.record, &b.record),
            total_pixels: a.image.area(),
        })
    }

    /// Per-channel absolute difference of two source images as a PNG.
    ///
    /// `None` when the images differ in size.
    pub fn difference_png(&self, a: &Path, b: &Path) -> Result<Option<Vec<u8>>, PipelineError> {
        let a = self.load(a)?;
        let b = self.load(b)?;
        if (a.width, a.height) != (b.width, b.height) {
            return Ok(None);
        }
        match png_out::difference_image(&a.pixels, &b.pixels) {
            Some(diff) => Ok(Some(png_out::encode_rgb_png(a.width, a.height, &diff)?)),
            None => Ok(None),
        }
    }

    /// Prepare `paths` (in parallel when configured) and hand each result to
    /// `commit` in the original order.
    fn run_in_order<T, P, C>(
        &self,
        paths: &[PathBuf],
        prepare: P,
        mut commit: C,
    ) -> Result<(), PipelineError>
    where
        T: Send,
        P: Fn(&Path) -> T + Sync,
        C: FnMut(&Path, T) -> Result<(), PipelineError>,
    {
        if self.jobs <= 1 {
            for path in paths {
                commit(path.as_path(), prepare(path.as_path()))?;
            }
            return Ok(());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

        for chunk in paths.chunks(self.jobs * IMAGES_PER_WORKER) {
            let prepared: Vec<T> =
                pool.install(|| chunk.par_iter().map(|path| prepare(path.as_path())).collect());
            for (path, item) in chunk.iter().zip(prepared) {
                commit(path.as_path(), item)?;
            }
        }
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PipelineError {
    let path = path.to_path_buf();
    move |source| PipelineError::Io { path, source }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Palette::GAME_BOY)
    }
}

/// Is the image at `image_path` a near-duplicate of anything indexed in
/// `index_dir`?
///
/// Hashes with the Game Boy palette. Fingerprints depend on the palette the
/// image is quantized against, so an archive built with a configured
/// palette must be checked through [`Pipeline::check_in_dir`] on a pipeline
/// for that palette.
pub fn check_image(
    image_path: &Path,
    index_dir: &Path,
    threshold: u32,
) -> Result<CheckResult, PipelineError> {
    Pipeline::default().check_in_dir(image_path, index_dir, threshold)
}
