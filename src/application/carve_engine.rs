//! Carve engine
//!
//! Runs one pass per catalog entry over the whole image: find header
//! offsets, assemble extents, score each extent, keep the accepted ones
//! as manifest records. Ids are assigned from 1 in catalog order, then
//! in assembler output order within an entry, so a given image and
//! catalog always produce the same manifest.

use crate::application::dto::{RecoveryResult, ScanOptions, ScanProgress, ScanResult};
use crate::application::{CancelToken, RecoverFilesUseCase};
use crate::core::error::{CarveError, Result};
use crate::domain::entities::ManifestRecord;
use crate::domain::repositories::{ImageSource, RecoveredFileWriter};
use crate::domain::services::{
    FragmentAssembler, HeaderCount, IntegrityScorer, PatternScanner, SignatureCatalog,
};
use crate::infrastructure::MmapImage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(&ScanProgress) + Send + Sync>;

pub struct CarveEngine {
    catalog: SignatureCatalog,
    options: ScanOptions,
    cancel: Option<CancelToken>,
    progress: Option<ProgressCallback>,
}

impl CarveEngine {
    pub fn new(catalog: SignatureCatalog, options: ScanOptions) -> Self {
        Self {
            catalog,
            options,
            cancel: None,
            progress: None,
        }
    }

    /// Built-in catalog, default options
    pub fn with_default_catalog() -> Self {
        Self::new(SignatureCatalog::builtin(), ScanOptions::default())
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn catalog(&self) -> &SignatureCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// The catalog restricted to the extensions in the options
    fn effective_catalog(&self) -> SignatureCatalog {
        let mut catalog = self.catalog.clone();
        catalog.retain_extensions(&self.options.extensions);
        catalog
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Scans an image and returns the accepted records.
    ///
    /// Malformed catalog entries are skipped and listed in
    /// [`ScanResult::errors`]. Fails only with [`CarveError::Cancelled`].
    pub fn scan<S: ImageSource + ?Sized>(&self, image: &S) -> Result<ScanResult> {
        let start_time = Instant::now();
        let haystack = image.as_bytes();

        let (descriptors, rejected) = self.effective_catalog().descriptors();
        let total = descriptors.len();

        info!(
            "Starting scan of {} ({} bytes, {} signatures)",
            image.label(),
            haystack.len(),
            total
        );

        let scanner = PatternScanner::new(self.options.search_backend);
        let assembler = FragmentAssembler::new(&scanner, self.options.gap_threshold);
        let scorer = IntegrityScorer::new(self.options.policy.clone());

        let mut result = ScanResult::new(image.label(), image.len());
        for err in rejected {
            result.add_error(err.to_string());
        }

        let mut progress = ScanProgress::new(total);
        let mut next_id = 1u64;

        for (done, (_, desc)) in descriptors.iter().enumerate() {
            if self.is_cancelled() {
                info!("Scan cancelled after {} of {} signatures", done, total);
                return Err(CarveError::Cancelled {
                    completed: done,
                    total,
                });
            }

            let offsets = scanner.find_iter(haystack, desc.header());
            let mut extents = assembler.extents(haystack, desc.header(), desc.footer(), offsets);
            let before = result.total_records();

            for extent in extents.by_ref() {
                let data = &haystack[extent.range()];
                let verdict = scorer.evaluate(data, desc);
                if verdict.accepted {
                    result.add_record(ManifestRecord::new(
                        next_id,
                        desc.extension(),
                        extent.start as u64,
                        extent.len() as u64,
                        verdict.entropy,
                    ));
                    next_id += 1;
                } else {
                    result.add_rejected_extent();
                    debug!(
                        "Fragment at offsets {}-{} for {} failed integrity check (entropy: {:.2}, score: {:.2})",
                        extent.start,
                        extent.end,
                        desc.extension(),
                        verdict.entropy,
                        verdict.score
                    );
                }
            }

            debug!(
                signature = %desc,
                headers = extents.headers_seen(),
                accepted = result.total_records() - before,
                "signature pass done"
            );

            progress.signatures_done = done + 1;
            progress.records_found = result.total_records();
            progress.current_extension = desc.extension().to_string();
            if let Some(ref callback) = self.progress {
                callback(&progress);
            }
        }

        result.set_duration(start_time.elapsed());

        info!(
            "Scan complete: found {} files in {:.2}s",
            result.total_records(),
            result.duration().as_secs_f64()
        );

        Ok(result)
    }

    /// Maps the image at `path`, scans it and releases the mapping.
    pub fn scan_path(&self, path: impl AsRef<Path>) -> Result<ScanResult> {
        let image = MmapImage::open(path)?;
        self.scan(&image)
    }

    /// Scans the image at `path` and writes every accepted record.
    ///
    /// `make_writer` runs only once the scan has succeeded, so a missing
    /// image or a cancelled scan leaves no output directory behind. The
    /// cancel token also covers the recovery phase.
    pub fn carve<W, F>(
        &self,
        path: impl AsRef<Path>,
        make_writer: F,
    ) -> Result<(ScanResult, RecoveryResult)>
    where
        W: RecoveredFileWriter,
        F: FnOnce() -> Result<W>,
    {
        let image = MmapImage::open(path)?;
        let scan = self.scan(&image)?;

        let mut recovery = RecoverFilesUseCase::new(make_writer()?);
        if let Some(token) = &self.cancel {
            recovery = recovery.with_cancel_token(token.clone());
        }
        let recovered = recovery.recover_all(&image, scan.records());
        Ok((scan, recovered))
    }

    /// Counts header hits per catalog entry without carving
    pub fn census(&self, path: impl AsRef<Path>) -> Result<Vec<HeaderCount>> {
        let image = MmapImage::open(path)?;
        self.effective_catalog().header_census(image.as_bytes())
    }
}

/// Scans `image_path` with `catalog` and default scoring.
pub fn scan(
    image_path: impl AsRef<Path>,
    catalog: &SignatureCatalog,
    gap_threshold: u64,
) -> Result<Vec<ManifestRecord>> {
    let options = ScanOptions::default().with_gap_threshold(gap_threshold);
    CarveEngine::new(catalog.clone(), options)
        .scan_path(image_path)
        .map(ScanResult::into_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CatalogEntry;
    use crate::infrastructure::MemoryImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn dense(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn jpeg_image() -> Vec<u8> {
        let mut image = vec![0u8; 512];
        image.extend([0xFF, 0xD8]);
        image.extend(dense(4000));
        image.extend([0xFF, 0xD9]);
        image.extend(vec![0u8; 512]);
        image
    }

    fn jpg_catalog() -> SignatureCatalog {
        SignatureCatalog::new(vec![
            CatalogEntry::new("jpg", [0xFFu8, 0xD8]).with_footer([0xFFu8, 0xD9]),
        ])
    }

    #[test]
    fn finds_embedded_jpeg() {
        let engine = CarveEngine::new(jpg_catalog(), ScanOptions::default());
        let result = engine.scan(&MemoryImage::new(jpeg_image())).unwrap();
        assert_eq!(result.total_records(), 1);
        let record = &result.records()[0];
        assert_eq!(record.id(), 1);
        assert_eq!(record.offset(), 512);
        assert_eq!(record.size(), 4004);
        assert!(record.entropy() > 7.0);
    }

    #[test]
    fn empty_image_yields_empty_manifest() {
        let engine = CarveEngine::with_default_catalog();
        let result = engine.scan(&MemoryImage::new(Vec::new())).unwrap();
        assert_eq!(result.total_records(), 0);
    }

    #[test]
    fn shared_headers_are_carved_per_entry() {
        let catalog = SignatureCatalog::new(vec![
            CatalogEntry::new("7z", *b"7z\xBC\xAF\x27\x1C"),
            CatalogEntry::new("7zb", *b"7z\xBC\xAF\x27\x1C"),
        ]);
        let mut image = b"7z\xBC\xAF\x27\x1C".to_vec();
        image.extend(dense(2048));

        let result = CarveEngine::new(catalog, ScanOptions::default())
            .scan(&MemoryImage::new(image))
            .unwrap();
        let ids: Vec<_> = result.records().iter().map(|r| r.id()).collect();
        let exts: Vec<_> = result.records().iter().map(|r| r.extension()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(exts, vec!["7z", "7zb"]);
    }

    #[test]
    fn cancelled_token_stops_before_first_pass() {
        let token = CancelToken::new();
        token.cancel();
        let engine = CarveEngine::with_default_catalog().with_cancel_token(token);
        let err = engine.scan(&MemoryImage::new(jpeg_image())).unwrap_err();
        assert!(matches!(err, CarveError::Cancelled { completed: 0, .. }));
    }

    #[test]
    fn progress_reported_per_signature() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let catalog = SignatureCatalog::new(vec![
            CatalogEntry::new("jpg", [0xFFu8, 0xD8]).with_footer([0xFFu8, 0xD9]),
            CatalogEntry::new("bmp", *b"BM"),
        ]);
        let engine = CarveEngine::new(catalog, ScanOptions::default()).with_progress(Box::new(
            move |progress: &ScanProgress| {
                seen.fetch_add(1, Ordering::SeqCst);
                assert!(progress.signatures_done <= progress.signatures_total);
            },
        ));
        engine.scan(&MemoryImage::new(jpeg_image())).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn extension_filter_limits_passes() {
        let options = ScanOptions::default().with_extensions(["png"]);
        let engine = CarveEngine::new(SignatureCatalog::builtin(), options);
        let result = engine.scan(&MemoryImage::new(jpeg_image())).unwrap();
        assert_eq!(result.total_records(), 0);
    }

    #[test]
    fn malformed_entry_is_skipped() {
        let mut catalog = jpg_catalog();
        catalog.push(CatalogEntry::new("bad", Vec::<u8>::new()));
        let result = CarveEngine::new(catalog, ScanOptions::default())
            .scan(&MemoryImage::new(jpeg_image()))
            .unwrap();
        assert_eq!(result.total_records(), 1);
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn cancel_between_passes_reports_completed_count() {
        let token = CancelToken::new();
        let trigger = token.clone();
        let catalog = SignatureCatalog::new(vec![
            CatalogEntry::new("jpg", [0xFFu8, 0xD8]).with_footer([0xFFu8, 0xD9]),
            CatalogEntry::new("bmp", *b"BM"),
            CatalogEntry::new("gif", *b"GIF89a").with_footer(*b";"),
        ]);
        let engine = CarveEngine::new(catalog, ScanOptions::default())
            .with_cancel_token(token)
            .with_progress(Box::new(move |progress: &ScanProgress| {
                if progress.signatures_done == 1 {
                    trigger.cancel();
                }
            }));

        let err = engine.scan(&MemoryImage::new(jpeg_image())).unwrap_err();
        assert!(matches!(
            err,
            CarveError::Cancelled {
                completed: 1,
                total: 3
            }
        ));
    }

    #[test]
    fn dense_single_byte_header_streams_every_offset() {
        let catalog = SignatureCatalog::new(vec![CatalogEntry::new("pcx", [0x0Au8])]);
        let image: Vec<u8> = (0..4096).map(|i| if i % 2 == 0 { 0x0A } else { 0x00 }).collect();

        let result = CarveEngine::new(catalog, ScanOptions::default())
            .scan(&MemoryImage::new(image))
            .unwrap();
        // Every orphan touches the next, so they merge into one low-entropy
        // extent that the scorer rejects.
        assert_eq!(result.total_records(), 0);
        assert_eq!(result.extents_rejected(), 1);
    }
}
