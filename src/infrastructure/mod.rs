//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories: memory-mapped
//! images, JSON manifest and catalog files, and the local file writer.

pub mod image;
pub mod persistence;

pub use image::{MemoryImage, MmapImage};
pub use persistence::{
    load_catalog, parse_catalog, save_catalog, JsonManifestStore, LocalFileWriter,
};
