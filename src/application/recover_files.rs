//! Recover files use case
//!
//! Materializes manifest records: copies `size` bytes at `offset` from the
//! image into the writer. Only a record's offset, size, extension and id
//! are needed, so a manifest saved by an earlier run works as well as one
//! just produced.

use crate::application::dto::RecoveryResult;
use crate::application::CancelToken;
use crate::core::error::{CarveError, Result};
use crate::domain::entities::ManifestRecord;
use crate::domain::repositories::{ImageSource, RecoveredFileWriter};
use crate::infrastructure::{LocalFileWriter, MmapImage};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Recover files use case
///
/// Batch operations keep going past individual failures and report them
/// in the [`RecoveryResult`]. Once the cancel token fires, records not yet
/// started are skipped and counted as such.
pub struct RecoverFilesUseCase<W: RecoveredFileWriter> {
    writer: W,
    cancel: Option<CancelToken>,
}

impl<W: RecoveredFileWriter> RecoverFilesUseCase<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            cancel: None,
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Writes one record's bytes and returns the path written
    pub fn materialize<S: ImageSource + ?Sized>(
        &self,
        image: &S,
        record: &ManifestRecord,
    ) -> Result<PathBuf> {
        let out_of_bounds = || CarveError::RecordOutOfBounds {
            id: record.id(),
            offset: record.offset(),
            size: record.size(),
            image_len: image.len(),
        };

        if !record.fits_within(image.len()) {
            return Err(out_of_bounds());
        }
        let start = usize::try_from(record.offset()).map_err(|_| out_of_bounds())?;
        let len = usize::try_from(record.size()).map_err(|_| out_of_bounds())?;
        let data = image
            .as_bytes()
            .get(start..start.saturating_add(len))
            .ok_or_else(out_of_bounds)?;

        self.writer.write(record, data)
    }

    /// Writes every record, in parallel
    pub fn recover_all<S: ImageSource + ?Sized>(
        &self,
        image: &S,
        records: &[ManifestRecord],
    ) -> RecoveryResult {
        let start_time = Instant::now();

        info!("Starting recovery of {} files", records.len());

        // `None` marks a record skipped after cancellation
        let outcomes: Vec<(&ManifestRecord, Option<Result<PathBuf>>)> = records
            .par_iter()
            .map(|record| {
                if self.is_cancelled() {
                    (record, None)
                } else {
                    (record, Some(self.materialize(image, record)))
                }
            })
            .collect();

        let mut result =
            RecoveryResult::new(image.label(), self.writer.output_dir().to_path_buf());
        for (record, outcome) in outcomes {
            match outcome {
                Some(Ok(path)) => result.add_recovered(record.extension(), record.size(), path),
                Some(Err(e)) => {
                    warn!("Failed to recover record {}: {}", record.id(), e);
                    result.add_error(format!("record {}: {}", record.id(), e));
                }
                None => result.add_skipped(),
            }
        }
        if result.skipped > 0 {
            info!("Recovery cancelled, {} records skipped", result.skipped);
        }

        result.duration = start_time.elapsed();

        info!(
            "Recovery complete: {} files recovered in {:.2}s",
            result.files_recovered,
            result.duration.as_secs_f64()
        );

        result
    }

    /// Writes only the records whose id is listed.
    ///
    /// Ids missing from `records` are reported as errors.
    pub fn recover_selected<S: ImageSource + ?Sized>(
        &self,
        image: &S,
        records: &[ManifestRecord],
        ids: &[u64],
    ) -> RecoveryResult {
        let wanted: HashSet<u64> = ids.iter().copied().collect();
        let selected: Vec<ManifestRecord> = records
            .iter()
            .filter(|r| wanted.contains(&r.id()))
            .cloned()
            .collect();

        let mut result = self.recover_all(image, &selected);

        let known: HashSet<u64> = records.iter().map(ManifestRecord::id).collect();
        let mut missing: Vec<u64> = wanted.difference(&known).copied().collect();
        missing.sort_unstable();
        for id in missing {
            warn!("No record with id {} in manifest", id);
            result.add_error(format!("record {}: not in manifest", id));
        }

        result
    }

    /// Maps the image at `path` and writes all records, or only `ids`.
    pub fn recover_path(
        &self,
        path: impl AsRef<Path>,
        records: &[ManifestRecord],
        ids: Option<&[u64]>,
    ) -> Result<RecoveryResult> {
        let image = MmapImage::open(path)?;
        Ok(match ids {
            Some(ids) => self.recover_selected(&image, records, ids),
            None => self.recover_all(&image, records),
        })
    }
}

/// Copies one record from the image at `image_path` into `dest_dir`,
/// creating the directory if needed.
pub fn materialize(
    image_path: impl AsRef<Path>,
    record: &ManifestRecord,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let image = MmapImage::open(image_path)?;
    let writer = LocalFileWriter::new(dest_dir)?;
    RecoverFilesUseCase::new(writer).materialize(&image, record)
}
