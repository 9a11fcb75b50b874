//! Scan result and progress DTOs

use crate::domain::entities::ManifestRecord;
use crate::utils::format_bytes;
use std::collections::BTreeMap;
use std::time::Duration;

/// Progress reported after each signature pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    /// Signature passes finished
    pub signatures_done: usize,
    /// Signature passes in this scan
    pub signatures_total: usize,
    /// Records accepted so far
    pub records_found: usize,
    /// Extension of the pass just finished
    pub current_extension: String,
}

impl ScanProgress {
    pub fn new(signatures_total: usize) -> Self {
        Self {
            signatures_done: 0,
            signatures_total,
            records_found: 0,
            current_extension: String::new(),
        }
    }

    /// Returns the progress percentage (0.0 - 100.0)
    pub fn percentage(&self) -> f64 {
        if self.signatures_total == 0 {
            return 100.0;
        }
        (self.signatures_done as f64 / self.signatures_total as f64) * 100.0
    }
}

/// Result of a complete image scan
#[derive(Debug, Clone)]
pub struct ScanResult {
    source: String,
    image_len: u64,
    duration: Duration,
    records: Vec<ManifestRecord>,
    type_counts: BTreeMap<String, usize>,
    extents_rejected: usize,
    /// Skipped catalog entries
    errors: Vec<String>,
}

impl ScanResult {
    pub fn new(source: impl Into<String>, image_len: u64) -> Self {
        Self {
            source: source.into(),
            image_len,
            duration: Duration::ZERO,
            records: Vec::new(),
            type_counts: BTreeMap::new(),
            extents_rejected: 0,
            errors: Vec::new(),
        }
    }

    pub fn add_record(&mut self, record: ManifestRecord) {
        *self
            .type_counts
            .entry(record.extension().to_string())
            .or_insert(0) += 1;
        self.records.push(record);
    }

    pub fn add_rejected_extent(&mut self) {
        self.extents_rejected += 1;
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub(crate) fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn image_len(&self) -> u64 {
        self.image_len
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Accepted records in id order
    pub fn records(&self) -> &[ManifestRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ManifestRecord> {
        self.records
    }

    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    pub fn count_for(&self, extension: &str) -> usize {
        self.type_counts.get(extension).copied().unwrap_or(0)
    }

    pub fn type_counts(&self) -> &BTreeMap<String, usize> {
        &self.type_counts
    }

    /// Candidate extents that failed the integrity check
    pub fn extents_rejected(&self) -> usize {
        self.extents_rejected
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Scanned {} ({}) in {:.2}s\n",
            self.source,
            format_bytes(self.image_len),
            self.duration.as_secs_f64()
        );
        summary.push_str(&format!(
            "Found {} files ({} candidates rejected):\n",
            self.total_records(),
            self.extents_rejected
        ));

        for (extension, count) in &self.type_counts {
            summary.push_str(&format!("  - {}: {}\n", extension, count));
        }

        if !self.errors.is_empty() {
            summary.push_str(&format!(
                "\nSkipped {} catalog entries\n",
                self.errors.len()
            ));
        }

        summary
    }
}
