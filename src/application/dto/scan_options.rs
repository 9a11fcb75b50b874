//! Scan options DTO

use crate::domain::services::{ScoringPolicy, SearchBackend, DEFAULT_GAP_THRESHOLD};

/// Options for scanning an image
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Orphans closer than this many bytes are merged
    pub gap_threshold: u64,
    /// Extensions to carve (empty = all catalog entries)
    pub extensions: Vec<String>,
    /// Substring search implementation
    pub search_backend: SearchBackend,
    /// Entropy ranges, size floors, weights and acceptance threshold
    pub policy: ScoringPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            extensions: Vec::new(),
            search_backend: SearchBackend::default(),
            policy: ScoringPolicy::default(),
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gap_threshold(mut self, gap_threshold: u64) -> Self {
        self.gap_threshold = gap_threshold;
        self
    }

    /// Restricts the scan to the given extensions
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_backend(mut self, backend: SearchBackend) -> Self {
        self.search_backend = backend;
        self
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Uses the portable scanner even when the accelerated one is available
    pub fn portable(self) -> Self {
        self.with_search_backend(SearchBackend::Portable)
    }
}
