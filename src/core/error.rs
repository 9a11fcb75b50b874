use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by scanning, recovery and catalog/manifest handling.
///
/// "No match" is never an error: a signature with no header occurrences
/// simply contributes nothing to the manifest.
#[derive(Error, Debug)]
pub enum CarveError {
    /// The image could not be opened, mapped or read. Fatal for the call.
    #[error("Cannot access image {}: {source}", path.display())]
    ImageAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The destination directory or output file could not be written.
    #[error("Cannot write to destination {}: {source}", path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single catalog descriptor was rejected; the rest still run.
    #[error("Malformed catalog entry #{index} ({extension:?}): {reason}")]
    MalformedCatalogEntry {
        index: usize,
        extension: String,
        reason: String,
    },

    #[error("Record {id} ({offset}+{size}) lies outside the image of {image_len} bytes")]
    RecordOutOfBounds {
        id: u64,
        offset: u64,
        size: u64,
        image_len: u64,
    },

    #[error("Invalid manifest {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("Invalid signature catalog {}: {reason}", path.display())]
    Catalog { path: PathBuf, reason: String },

    #[error("Cannot build header automaton: {0}")]
    Automaton(#[from] aho_corasick::BuildError),

    #[error("Scan cancelled after {completed} of {total} signatures")]
    Cancelled { completed: usize, total: usize },
}

impl CarveError {
    pub(crate) fn image(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CarveError::ImageAccess {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn destination(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CarveError::Destination {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors that abort the whole call rather than one item.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CarveError::MalformedCatalogEntry { .. })
    }
}

pub type Result<T> = std::result::Result<T, CarveError>;
