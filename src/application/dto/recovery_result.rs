//! Recovery result DTO

use crate::utils::format_bytes;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Result of a recovery operation
#[derive(Debug, Clone)]
pub struct RecoveryResult {
    /// Source image path
    pub source: String,
    /// Output directory
    pub output_dir: PathBuf,
    /// Total files recovered
    pub files_recovered: usize,
    /// Files by extension
    pub files_by_type: BTreeMap<String, usize>,
    /// Total bytes recovered
    pub bytes_recovered: u64,
    /// Written paths, in record order
    pub written: Vec<PathBuf>,
    /// Duration of the operation
    pub duration: Duration,
    /// Errors encountered
    pub errors: Vec<String>,
    /// Records that failed to recover
    pub failed_files: usize,
    /// Records not attempted because the run was cancelled
    pub skipped: usize,
}

impl RecoveryResult {
    pub fn new(source: impl Into<String>, output_dir: PathBuf) -> Self {
        Self {
            source: source.into(),
            output_dir,
            files_recovered: 0,
            files_by_type: BTreeMap::new(),
            bytes_recovered: 0,
            written: Vec::new(),
            duration: Duration::ZERO,
            errors: Vec::new(),
            failed_files: 0,
            skipped: 0,
        }
    }

    /// Adds a recovered file to the result
    pub fn add_recovered(&mut self, extension: &str, size: u64, path: PathBuf) {
        self.files_recovered += 1;
        *self.files_by_type.entry(extension.to_string()).or_insert(0) += 1;
        self.bytes_recovered += size;
        self.written.push(path);
    }

    /// Adds an error
    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
        self.failed_files += 1;
    }

    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn was_cancelled(&self) -> bool {
        self.skipped > 0
    }

    /// Returns success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        let total = self.files_recovered + self.failed_files;
        if total == 0 {
            return 1.0;
        }
        self.files_recovered as f64 / total as f64
    }

    /// Returns a summary string
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!(
            "Recovery complete: {} files recovered ({}) in {:.2}s\n",
            self.files_recovered,
            format_bytes(self.bytes_recovered),
            self.duration.as_secs_f64()
        ));
        summary.push_str(&format!("Output: {}\n", self.output_dir.display()));

        for (extension, count) in &self.files_by_type {
            summary.push_str(&format!("  - {}: {}\n", extension, count));
        }

        if self.was_cancelled() {
            summary.push_str(&format!("\nCancelled: {} records skipped\n", self.skipped));
        }

        if !self.errors.is_empty() {
            summary.push_str(&format!("\n{} errors occurred\n", self.errors.len()));
        }

        summary
    }
}
