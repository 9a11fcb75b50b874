//! Domain entities
//!
//! Signatures, candidate extents and the persistable manifest record.

mod extent;
mod manifest_record;
mod signature;

pub use extent::{Extent, ExtentKind, Offset};
pub use manifest_record::{ManifestRecord, MAX_ENTROPY};
pub use signature::{CatalogEntry, SignatureDescriptor};
