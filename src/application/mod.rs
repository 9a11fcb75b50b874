//! Application layer
//!
//! Use cases that orchestrate the domain services over an image.

pub mod dto;
mod cancel;
mod carve_engine;
mod recover_files;

pub use cancel::CancelToken;
pub use carve_engine::{scan, CarveEngine, ProgressCallback};
pub use recover_files::{materialize, RecoverFilesUseCase};
