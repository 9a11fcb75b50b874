//! Domain layer - carving model and algorithms
//!
//! Entities, the pattern/assembly/scoring services, and the traits the
//! outer layers implement. Nothing here touches the filesystem.

pub mod entities;
pub mod repositories;
pub mod services;
