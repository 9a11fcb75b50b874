//! Data Transfer Objects

mod recovery_result;
mod scan_options;
mod scan_result;

pub use recovery_result::RecoveryResult;
pub use scan_options::ScanOptions;
pub use scan_result::{ScanProgress, ScanResult};
