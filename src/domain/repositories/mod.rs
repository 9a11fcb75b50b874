//! Repository traits (interfaces)
//!
//! Contracts for the image being carved, the manifest store and the
//! destination of recovered files. Infrastructure provides the
//! implementations.

mod file_writer;
mod image_source;
mod manifest_store;

pub use file_writer::RecoveredFileWriter;
pub use image_source::ImageSource;
pub use manifest_store::ManifestStore;
