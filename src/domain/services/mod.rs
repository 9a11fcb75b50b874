//! Domain services
//!
//! The carving pipeline: pattern search, fragment assembly and integrity
//! scoring, plus the signature catalog they run over.

mod fragment_assembler;
mod integrity_scorer;
mod pattern_scanner;
mod signature_catalog;

pub use fragment_assembler::{merge_orphans, Extents, FragmentAssembler, DEFAULT_GAP_THRESHOLD};
pub use integrity_scorer::{entropy, IntegrityScorer, ScoringPolicy, Thresholds, Verdict, Weights};
pub use pattern_scanner::{FindAll, PatternScanner, SearchBackend};
pub use signature_catalog::{HeaderCount, SignatureCatalog};
