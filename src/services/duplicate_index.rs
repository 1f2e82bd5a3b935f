use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use quad_shade::Fingerprint;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IndexError;

/// File name of the index inside an archive directory.
pub const INDEX_FILE_NAME: &str = "hashes.json";

/// A stored fingerprint close enough to a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMatch {
    pub identifier: String,
    pub distance: u32,
}

/// Persisted mapping from archive identifier to fingerprint.
///
/// Entries keep their insertion order, on disk as well as in memory. Lookups
/// scan in that order and stop at the first fingerprint strictly closer than
/// the threshold, so the earliest archived match wins even when a later
/// entry would be closer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateIndex {
    entries: Vec<(String, Fingerprint)>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Fingerprint)> {
        self.entries.iter().map(|(id, fp)| (id.as_str(), *fp))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    pub fn get(&self, identifier: &str) -> Option<Fingerprint> {
        self.entries
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, fp)| *fp)
    }

    /// First entry, in insertion order, whose distance to `candidate` is
    /// strictly below `threshold`.
    pub fn find_match(&self, candidate: &Fingerprint, threshold: u32) -> Option<DuplicateMatch> {
        self.first_match(candidate, threshold)
            .map(|(pos, distance)| DuplicateMatch {
                identifier: self.entries[pos].0.clone(),
                distance,
            })
    }

    /// Identifier of the first stored near-duplicate of `candidate`, if any.
    pub fn is_duplicate(&self, candidate: &Fingerprint, threshold: u32) -> Option<&str> {
        self.first_match(candidate, threshold)
            .map(|(pos, _)| self.entries[pos].0.as_str())
    }

    /// Position and distance of the first entry below `threshold`.
    fn first_match(&self, candidate: &Fingerprint, threshold: u32) -> Option<(usize, u32)> {
        for (pos, (identifier, fingerprint)) in self.entries.iter().enumerate() {
            let distance = candidate.distance(fingerprint);
            tracing::debug!(identifier = %identifier, distance, threshold, "Compared fingerprint");
            if distance < threshold {
                return Some((pos, distance));
            }
        }
        None
    }

    /// Insert `fingerprint` under `identifier` unless it duplicates an
    /// existing entry. Returns whether it was inserted.
    ///
    /// An identifier that is already present is never overwritten.
    pub fn insert_if_novel(
        &mut self,
        identifier: impl Into<String>,
        fingerprint: Fingerprint,
        threshold: u32,
    ) -> bool {
        let identifier = identifier.into();
        if self.contains(&identifier) {
            tracing::debug!(identifier = %identifier, "Identifier already indexed");
            return false;
        }
        if let Some(found) = self.find_match(&fingerprint, threshold) {
            tracing::debug!(
                identifier = %identifier,
                duplicate_of = %found.identifier,
                distance = found.distance,
                "Not inserted, duplicate"
            );
            return false;
        }
        self.entries.push((identifier, fingerprint));
        true
    }

    /// Append an entry the caller has already checked for novelty.
    pub(crate) fn push_checked(&mut self, identifier: String, fingerprint: Fingerprint) {
        debug_assert!(!self.contains(&identifier));
        self.entries.push((identifier, fingerprint));
    }

    /// Load an index from `path`.
    ///
    /// A missing file is an empty index. Anything that exists but does not
    /// parse is [`IndexError::Corrupt`]: carrying on with a partial index
    /// would let duplicates back in.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No index yet, starting empty");
                return Ok(Self::new());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(IndexError::Corrupt {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
            Err(source) => {
                return Err(IndexError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let index: Self = serde_json::from_str(&content).map_err(|e| IndexError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), entries = index.len(), "Loaded index");
        Ok(index)
    }

    /// Write the whole index to `path`.
    ///
    /// The JSON goes to a sibling temporary file first and is renamed over
    /// `path`, so an interrupted save leaves the previous index intact.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        let io_err = |source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| IndexError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        let tmp = temp_path(path);
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;

        tracing::debug!(path = %path.display(), entries = self.len(), "Saved index");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

impl Serialize for DuplicateIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (identifier, fingerprint) in &self.entries {
            map.serialize_entry(identifier, &fingerprint.to_hex())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DuplicateIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(IndexVisitor)
    }
}

struct IndexVisitor;

impl<'de> Visitor<'de> for IndexVisitor {
    type Value = DuplicateIndex;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of identifier to 16-digit hex fingerprint")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut index = DuplicateIndex::new();
        while let Some((identifier, hex)) = access.next_entry::<String, String>()? {
            if index.contains(&identifier) {
                return Err(de::Error::custom(format!(
                    "duplicate identifier {identifier:?}"
                )));
            }
            let fingerprint: Fingerprint = hex.parse().map_err(|e| {
                de::Error::custom(format!("identifier {identifier:?}: {e}"))
            })?;
            index.entries.push((identifier, fingerprint));
        }
        Ok(index)
    }
}
