use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use quad_shade::{rle, Fingerprint, PerceptualHasher, RleRecord};

use super::duplicate_index::{DuplicateIndex, INDEX_FILE_NAME};
use crate::error::ArchiveError;

/// File extension of archived records.
pub const RECORD_EXTENSION: &str = "rle";

/// Numeric part of a record identifier.
///
/// Threaded explicitly through a batch: the caller holds the next value and
/// advances it only after a record has actually been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordSequence(u32);

impl RecordSequence {
    pub const FIRST: RecordSequence = RecordSequence(1);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Identifier for this sequence number, e.g. `007.rle`
    pub fn identifier(self) -> String {
        format!("{:03}.{RECORD_EXTENSION}", self.0)
    }

    /// Parse an identifier produced by [`Self::identifier`].
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let stem = identifier.strip_suffix(RECORD_EXTENSION)?.strip_suffix('.')?;
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        stem.parse().ok().map(Self)
    }
}

/// Result of offering a record to the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Archived { identifier: String },
    Duplicate { of: String, distance: u32 },
}

/// Outcome of [`Archive::verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Index entries examined
    pub checked: usize,
    /// Index entries without a record file
    pub missing: Vec<String>,
    /// Records that fail to parse or decode, with the reason
    pub corrupt: Vec<(String, String)>,
    /// Records whose fingerprint no longer matches the index
    pub mismatched: Vec<String>,
    /// Record files the index does not know about
    pub orphans: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.corrupt.is_empty()
            && self.mismatched.is_empty()
            && self.orphans.is_empty()
    }
}

/// A directory of `NNN.rle` records plus their duplicate index.
///
/// Every index entry corresponds to exactly one record file with the same
/// identifier. [`Archive::store`] keeps that invariant by deciding on
/// duplicates before touching the disk and by writing the record before
/// inserting the index entry.
pub struct Archive {
    dir: PathBuf,
    index: DuplicateIndex,
    highest: Option<RecordSequence>,
}

impl Archive {
    /// Open (creating if needed) the archive in `dir` and load its index.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| ArchiveError::Io {
            path: dir.clone(),
            source,
        })?;

        let index = DuplicateIndex::load(&dir.join(INDEX_FILE_NAME))?;

        let on_disk = list_records(&dir)?;
        let highest = on_disk
            .iter()
            .map(String::as_str)
            .chain(index.iter().map(|(id, _)| id))
            .filter_map(RecordSequence::from_identifier)
            .max();

        tracing::info!(
            dir = %dir.display(),
            entries = index.len(),
            records = on_disk.len(),
            "Opened archive"
        );

        Ok(Self {
            dir,
            index,
            highest,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index(&self) -> &DuplicateIndex {
        &self.index
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE_NAME)
    }

    pub fn record_path(&self, identifier: &str) -> PathBuf {
        self.dir.join(identifier)
    }

    /// One past the highest numbered record in the index or on disk.
    ///
    /// Stable until a record is stored, so numbers never collide with
    /// records from earlier runs.
    pub fn next_sequence(&self) -> RecordSequence {
        self.highest.map_or(RecordSequence::FIRST, RecordSequence::next)
    }

    /// Archive `record` under `seq` unless its fingerprint duplicates an
    /// indexed one.
    ///
    /// Nothing is written for a duplicate.
    pub fn store(
        &mut self,
        seq: RecordSequence,
        record: &RleRecord,
        fingerprint: Fingerprint,
        threshold: u32,
    ) -> Result<StoreOutcome, ArchiveError> {
        if let Some(found) = self.index.find_match(&fingerprint, threshold) {
            return Ok(StoreOutcome::Duplicate {
                of: found.identifier,
                distance: found.distance,
            });
        }

        let identifier = seq.identifier();
        if self.index.contains(&identifier) {
            return Err(ArchiveError::IdentifierTaken(identifier));
        }

        let path = self.record_path(&identifier);
        let io_err = |source| ArchiveError::Io {
            path: path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => ArchiveError::IdentifierTaken(identifier.clone()),
                _ => io_err(e),
            })?;
        record.write_to(BufWriter::new(file)).map_err(io_err)?;

        self.index.push_checked(identifier.clone(), fingerprint);
        self.highest = self.highest.max(Some(seq));

        tracing::debug!(
            identifier = %identifier,
            fingerprint = %fingerprint,
            runs = record.runs().len(),
            "Archived record"
        );
        Ok(StoreOutcome::Archived { identifier })
    }

    /// Read a record back from disk.
    pub fn load_record(&self, identifier: &str) -> Result<RleRecord, ArchiveError> {
        let path = self.record_path(identifier);
        let file = File::open(&path).map_err(|source| ArchiveError::Io {
            path: path.clone(),
            source,
        })?;
        RleRecord::read_from(BufReader::new(file)).map_err(|source| ArchiveError::Record {
            identifier: identifier.to_string(),
            source,
        })
    }

    /// Flush the index to `hashes.json`.
    pub fn save(&self) -> Result<(), ArchiveError> {
        self.index.save(&self.index_path())?;
        Ok(())
    }

    /// Check every index entry against its record file.
    ///
    /// Each record is read, decoded and re-hashed with `hasher`; the result
    /// must equal the stored fingerprint exactly.
    pub fn verify(&self, hasher: &PerceptualHasher) -> Result<VerifyReport, ArchiveError> {
        let mut report = VerifyReport::default();

        for (identifier, stored) in self.index.iter() {
            report.checked += 1;

            let record = match self.load_record(identifier) {
                Ok(record) => record,
                Err(ArchiveError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                    report.missing.push(identifier.to_string());
                    continue;
                }
                Err(ArchiveError::Record { source, .. }) => {
                    report
                        .corrupt
                        .push((identifier.to_string(), source.to_string()));
                    continue;
                }
                Err(e) => return Err(e),
            };

            match rle::decode(&record) {
                Ok(image) => {
                    if hasher.hash(&image) != stored {
                        report.mismatched.push(identifier.to_string());
                    }
                }
                Err(e) => report.corrupt.push((identifier.to_string(), e.to_string())),
            }
        }

        report.orphans = list_records(&self.dir)?
            .into_iter()
            .filter(|name| !self.index.contains(name))
            .collect();

        Ok(report)
    }
}

/// File names of all `.rle` files in `dir`, sorted.
fn list_records(dir: &Path) -> Result<Vec<String>, ArchiveError> {
    let io_err = |source| ArchiveError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_record = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(RECORD_EXTENSION));
        if !is_record {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
