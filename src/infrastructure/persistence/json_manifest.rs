//! JSON manifest store
//!
//! A manifest is a JSON array of objects with exactly the fields
//! `id`, `extension`, `offset`, `size` and `entropy`:
//!
//! ```json
//! [
//!   { "id": 1, "extension": "jpg", "offset": 4096, "size": 52011, "entropy": 7.91 }
//! ]
//! ```

use crate::core::error::{CarveError, Result};
use crate::domain::entities::ManifestRecord;
use crate::domain::repositories::ManifestStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordDto {
    id: u64,
    extension: String,
    offset: u64,
    size: u64,
    entropy: f64,
}

impl From<&ManifestRecord> for RecordDto {
    fn from(record: &ManifestRecord) -> Self {
        Self {
            id: record.id(),
            extension: record.extension().to_string(),
            offset: record.offset(),
            size: record.size(),
            entropy: record.entropy(),
        }
    }
}

impl From<RecordDto> for ManifestRecord {
    fn from(dto: RecordDto) -> Self {
        ManifestRecord::new(dto.id, dto.extension, dto.offset, dto.size, dto.entropy)
    }
}

/// Manifest stored as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonManifestStore {
    path: PathBuf,
}

impl JsonManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn invalid(&self, reason: impl Into<String>) -> CarveError {
        CarveError::Manifest {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    /// Parses and validates a manifest from a JSON string
    pub fn parse(&self, json: &str) -> Result<Vec<ManifestRecord>> {
        let dtos: Vec<RecordDto> =
            serde_json::from_str(json).map_err(|e| self.invalid(e.to_string()))?;
        self.validate(dtos.into_iter().map(ManifestRecord::from).collect())
    }

    fn validate(&self, records: Vec<ManifestRecord>) -> Result<Vec<ManifestRecord>> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate().map_err(|reason| self.invalid(reason))?;
            if !seen.insert(record.id()) {
                return Err(self.invalid(format!("duplicate record id {}", record.id())));
            }
        }
        Ok(records)
    }
}

impl ManifestStore for JsonManifestStore {
    fn save(&self, records: &[ManifestRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CarveError::destination(parent, e))?;
        }

        let dtos: Vec<RecordDto> = records.iter().map(RecordDto::from).collect();
        let file = File::create(&self.path).map_err(|e| CarveError::destination(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &dtos).map_err(|e| self.invalid(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| CarveError::destination(&self.path, e))?;

        info!(path = %self.path.display(), records = records.len(), "manifest saved");
        Ok(())
    }

    fn load(&self) -> Result<Vec<ManifestRecord>> {
        let file = File::open(&self.path).map_err(|e| self.invalid(e.to_string()))?;
        let dtos: Vec<RecordDto> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| self.invalid(e.to_string()))?;
        let records = self.validate(dtos.into_iter().map(ManifestRecord::from).collect())?;

        info!(path = %self.path.display(), records = records.len(), "manifest loaded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_preserves_records() {
        let dir = TempDir::new().unwrap();
        let store = JsonManifestStore::new(dir.path().join("db.json"));
        let records = vec![
            ManifestRecord::new(1, "jpg", 0, 2048, 7.5),
            ManifestRecord::new(2, "pdf", 4096, 1500, 5.25),
        ];
        store.save(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let store = JsonManifestStore::new("m.json");
        let json = r#"[{"id":1,"extension":"jpg","offset":0,"size":10,"entropy":1.0,"x":0}]"#;
        assert!(store.parse(json).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let store = JsonManifestStore::new("m.json");
        let json = r#"[
            {"id":1,"extension":"jpg","offset":0,"size":10,"entropy":1.0},
            {"id":1,"extension":"png","offset":10,"size":10,"entropy":1.0}
        ]"#;
        let err = store.parse(json).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn out_of_range_entropy_is_rejected() {
        let store = JsonManifestStore::new("m.json");
        let json = r#"[{"id":1,"extension":"jpg","offset":0,"size":10,"entropy":9.5}]"#;
        assert!(matches!(store.parse(json), Err(CarveError::Manifest { .. })));
    }

    #[test]
    fn missing_file_is_manifest_error() {
        let store = JsonManifestStore::new("/nonexistent/manifest.json");
        assert!(matches!(store.load(), Err(CarveError::Manifest { .. })));
    }
}
