//! Cross-cutting definitions shared by every layer.

pub mod error;

pub use error::{CarveError, Result};
