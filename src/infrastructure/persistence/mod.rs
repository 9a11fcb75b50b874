//! Persistence: manifest files, catalog files and recovered output.

mod catalog_file;
mod json_manifest;
mod local_file_writer;

pub use catalog_file::{load_catalog, parse_catalog, save_catalog};
pub use json_manifest::JsonManifestStore;
pub use local_file_writer::LocalFileWriter;
