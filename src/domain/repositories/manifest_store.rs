//! Manifest store trait

use crate::core::error::Result;
use crate::domain::entities::ManifestRecord;

/// Persists and restores a scan manifest
///
/// A manifest saved and loaded back through the same store yields equal
/// records in the same order.
pub trait ManifestStore {
    fn save(&self, records: &[ManifestRecord]) -> Result<()>;

    /// Loads and validates every record; any invalid record fails the load
    fn load(&self) -> Result<Vec<ManifestRecord>>;
}
