//! Signature-based file carving from raw disk and partition images.
//!
//! The image is memory-mapped read-only and searched once per catalog
//! entry for the entry's header. Each header occurrence becomes a
//! candidate extent, closed by the first following footer or, for
//! formats without one (or headers whose footer never shows up), by the
//! next header or the end of the image. Candidates are scored on header
//! and footer match, Shannon entropy and size, and the accepted ones are
//! listed in a manifest that can be saved and materialized later.
//!
//! ```ignore
//! use sigcarve::{CarveEngine, LocalFileWriter, RecoverFilesUseCase};
//!
//! let engine = CarveEngine::with_default_catalog();
//! let scan = engine.scan_path("disk.img")?;
//! let writer = LocalFileWriter::new("recovered")?;
//! let recovery = RecoverFilesUseCase::new(writer).recover_path("disk.img", scan.records(), None)?;
//! println!("{}", recovery.summary());
//! ```

pub mod application;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod utils;

pub use application::dto::{RecoveryResult, ScanOptions, ScanProgress, ScanResult};
pub use application::{materialize, scan, CancelToken, CarveEngine, RecoverFilesUseCase};
pub use core::error::{CarveError, Result};
pub use domain::entities::{CatalogEntry, Extent, ExtentKind, ManifestRecord, Offset, SignatureDescriptor};
pub use domain::repositories::{ImageSource, ManifestStore, RecoveredFileWriter};
pub use domain::services::{
    entropy, FragmentAssembler, IntegrityScorer, PatternScanner, ScoringPolicy, SearchBackend,
    SignatureCatalog, Verdict, DEFAULT_GAP_THRESHOLD,
};
pub use infrastructure::{
    load_catalog, save_catalog, JsonManifestStore, LocalFileWriter, MemoryImage, MmapImage,
};
