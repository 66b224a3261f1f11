//! Durable progress state for resumable runs.
//!
//! One JSON file holds the last processed index plus the three result
//! buckets. It is rewritten in full at every checkpoint and deleted when
//! a run completes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::Classification;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed checkpoint file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Inconsistent checkpoint: last_index is {last_index} but the buckets hold {bucket_total} words")]
    Inconsistent { last_index: usize, bucket_total: usize },
}

/// Snapshot of a run in progress.
///
/// `last_index` always equals the number of words already folded into the
/// buckets; words at `last_index..` are still unprocessed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub last_index: usize,
    pub excluded: Vec<String>,
    pub valid: Vec<String>,
    pub unknown: Vec<String>,
}

impl Checkpoint {
    pub fn bucket_total(&self) -> usize {
        self.excluded.len() + self.valid.len() + self.unknown.len()
    }

    pub fn is_consistent(&self) -> bool {
        self.last_index == self.bucket_total()
    }

    /// Append a word to the bucket its classification selects.
    ///
    /// Does not advance `last_index`; the caller advances it once per
    /// batch, after every word of the batch has been recorded.
    pub fn record(&mut self, word: String, classification: Classification) {
        match classification {
            Classification::Excluded => self.excluded.push(word),
            Classification::Valid => self.valid.push(word),
            Classification::Unknown => self.unknown.push(word),
        }
    }
}

/// Reads, writes, and clears the checkpoint file for one run.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state, if any.
    ///
    /// A missing file is a fresh start, not an error. A file that exists
    /// but does not parse, or whose buckets disagree with `last_index`,
    /// is fatal: resuming from it would skip or double-count words.
    pub fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CheckpointError::Io(e)),
        };

        let checkpoint: Checkpoint =
            serde_json::from_str(&text).map_err(|e| CheckpointError::Malformed {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        if !checkpoint.is_consistent() {
            return Err(CheckpointError::Inconsistent {
                last_index: checkpoint.last_index,
                bucket_total: checkpoint.bucket_total(),
            });
        }

        Ok(Some(checkpoint))
    }

    /// Persist the state atomically.
    ///
    /// Writes a temp file in the same directory, fsyncs it, then renames
    /// it over the previous file. A crash mid-save leaves the old
    /// checkpoint intact.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let bytes = serde_json::to_vec_pretty(checkpoint).map_err(io::Error::from)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| CheckpointError::Io(e.error))?;

        Ok(())
    }

    /// Remove the checkpoint file after a completed run.
    pub fn clear(&self) -> Result<(), CheckpointError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CheckpointError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Checkpoint {
        Checkpoint {
            last_index: 3,
            excluded: vec!["correre".to_string(), "Mario".to_string()],
            valid: vec!["gatto".to_string()],
            unknown: vec![],
        }
    }

    #[test]
    fn load_missing_file_is_fresh_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        let checkpoint = sample();
        store.save(&checkpoint).unwrap();

        assert_eq!(store.load().unwrap(), Some(checkpoint));
    }

    #[test]
    fn save_overwrites_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        store.save(&sample()).unwrap();
        let mut next = sample();
        next.record("vetusto".to_string(), Classification::Excluded);
        next.last_index = 4;
        store.save(&next).unwrap();

        assert_eq!(store.load().unwrap(), Some(next));
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        store.save(&sample()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn saved_file_is_pretty_printed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        let store = CheckpointStore::new(&path);

        store.save(&sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n"));
        assert!(text.contains("\"last_index\": 3"));
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        let store = CheckpointStore::new(&path);

        store.save(&sample()).unwrap();
        store.clear().unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn clear_with_no_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        assert!(store.clear().is_ok());
    }

    #[test]
    fn load_rejects_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        fs::write(&path, "not json at all").unwrap();

        let err = CheckpointStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CheckpointError::Malformed { .. }));
    }

    #[test]
    fn load_rejects_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        fs::write(&path, r#"{"last_index": 0}"#).unwrap();

        let err = CheckpointStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CheckpointError::Malformed { .. }));
    }

    #[test]
    fn load_rejects_inconsistent_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        fs::write(
            &path,
            r#"{"last_index": 5, "excluded": ["correre"], "valid": [], "unknown": []}"#,
        )
        .unwrap();

        let err = CheckpointStore::new(&path).load().unwrap_err();
        assert!(matches!(
            err,
            CheckpointError::Inconsistent { last_index: 5, bucket_total: 1 }
        ));
    }

    #[test]
    fn record_appends_to_matching_bucket() {
        let mut checkpoint = Checkpoint::default();
        checkpoint.record("correre".to_string(), Classification::Excluded);
        checkpoint.record("gatto".to_string(), Classification::Valid);
        checkpoint.record("xyzzy".to_string(), Classification::Unknown);
        checkpoint.last_index = 3;

        assert_eq!(checkpoint.excluded, vec!["correre"]);
        assert_eq!(checkpoint.valid, vec!["gatto"]);
        assert_eq!(checkpoint.unknown, vec!["xyzzy"]);
        assert!(checkpoint.is_consistent());
    }

    #[test]
    fn fresh_checkpoint_is_consistent() {
        assert!(Checkpoint::default().is_consistent());
        assert_eq!(Checkpoint::default().bucket_total(), 0);
    }
}
