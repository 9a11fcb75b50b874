//! Progress reporting for CLI

use crate::application::dto::ScanProgress;
use crate::application::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Progress reporter using indicatif
pub struct ProgressReporter {
    bar: Arc<ProgressBar>,
}

impl ProgressReporter {
    /// One tick per signature pass
    pub fn for_scan(total_signatures: u64) -> Self {
        let bar = ProgressBar::new(total_signatures);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} signatures ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        bar.set_message("Scanning image for file signatures...");

        Self { bar: Arc::new(bar) }
    }

    /// Indeterminate spinner for batch recovery
    pub fn spinner(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar: Arc::new(bar) }
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }

    /// Gets a callback for scan progress
    pub fn scan_callback(&self) -> ProgressCallback {
        let bar = Arc::clone(&self.bar);
        Box::new(move |progress: &ScanProgress| {
            bar.set_length(progress.signatures_total as u64);
            bar.set_position(progress.signatures_done as u64);
            bar.set_message(format!(
                "Found {} files | last signature: {}",
                progress.records_found, progress.current_extension
            ));
        })
    }
}
