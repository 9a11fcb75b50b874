//! Local file writer implementation
//!
//! Writes recovered files to a directory on the local filesystem.

use crate::core::error::{CarveError, Result};
use crate::domain::entities::ManifestRecord;
use crate::domain::repositories::RecoveredFileWriter;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::debug;

/// Local file system writer
///
/// Files are named `recovered_{id}.{extension}` directly under the output
/// directory. An existing file of the same name is replaced.
pub struct LocalFileWriter {
    output_dir: PathBuf,
    files_written: AtomicUsize,
    bytes_written: AtomicU64,
}

impl LocalFileWriter {
    /// Creates a writer, creating the output directory if needed
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir).map_err(|e| CarveError::destination(output_dir, e))?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            files_written: AtomicUsize::new(0),
            bytes_written: AtomicU64::new(0),
        })
    }

    fn output_path(&self, record: &ManifestRecord) -> PathBuf {
        self.output_dir.join(record.file_name())
    }
}

impl RecoveredFileWriter for LocalFileWriter {
    fn write(&self, record: &ManifestRecord, data: &[u8]) -> Result<PathBuf> {
        let output_path = self.output_path(record);

        let mut output_file =
            File::create(&output_path).map_err(|e| CarveError::destination(&output_path, e))?;
        output_file
            .write_all(data)
            .and_then(|_| output_file.sync_all())
            .map_err(|e| CarveError::destination(&output_path, e))?;

        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(data.len() as u64, Ordering::Relaxed);

        debug!(id = record.id(), path = %output_path.display(), bytes = data.len(), "wrote recovered file");
        Ok(output_path)
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn files_written(&self) -> usize {
        self.files_written.load(Ordering::Relaxed)
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}
