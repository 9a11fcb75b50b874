//! File writer trait
//!
//! Defines the interface for writing recovered files to storage.

use crate::core::error::Result;
use crate::domain::entities::ManifestRecord;
use std::path::{Path, PathBuf};

/// Trait for writing recovered files to storage
///
/// Each record is written under its own name
/// ([`ManifestRecord::file_name`]), so writes for distinct records never
/// collide and may run in parallel.
///
/// # Example
///
/// ```ignore
/// let writer = LocalFileWriter::new("/output/recovered")?;
/// let path = writer.write(&record, &bytes)?;
/// println!("Saved to: {}", path.display());
/// ```
pub trait RecoveredFileWriter: Send + Sync {
    /// Writes the bytes of one record and returns the path written
    fn write(&self, record: &ManifestRecord, data: &[u8]) -> Result<PathBuf>;

    /// Returns the output directory
    fn output_dir(&self) -> &Path;

    /// Returns the number of files written so far
    fn files_written(&self) -> usize;

    /// Returns the total bytes written so far
    fn bytes_written(&self) -> u64;
}
