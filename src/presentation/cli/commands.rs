//! CLI commands using clap

use crate::application::dto::ScanOptions;
use crate::domain::services::{SearchBackend, DEFAULT_GAP_THRESHOLD};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// sigcarve - signature-based file carving
///
/// Finds files in raw disk and partition images by their magic headers
/// and footers, scores each candidate, and recovers the ones that look
/// intact. Scan results can be saved and recovered from later.
#[derive(Parser)]
#[command(name = "sigcarve")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Carve files out of raw disk images by signature", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by `scan` and `carve`
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Orphan fragments closer than this many bytes are merged
    #[arg(short, long, default_value_t = DEFAULT_GAP_THRESHOLD)]
    pub gap_threshold: u64,

    /// Extensions to carve, e.g. jpg,png,pdf (default: all)
    #[arg(short = 't', long, value_delimiter = ',')]
    pub types: Option<Vec<String>>,

    /// JSON signature catalog to use instead of the built-in one
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Use the portable substring search
    #[arg(long)]
    pub portable_search: bool,
}

impl ScanArgs {
    pub fn scan_options(&self) -> ScanOptions {
        let backend = if self.portable_search {
            SearchBackend::Portable
        } else {
            SearchBackend::Accelerated
        };
        ScanOptions::default()
            .with_gap_threshold(self.gap_threshold)
            .with_extensions(self.types.clone().unwrap_or_default())
            .with_search_backend(backend)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan an image and list the files found
    Scan {
        /// Path to device or image file (e.g., /dev/sdb, disk.img)
        #[arg(short, long)]
        image: PathBuf,

        /// Save the manifest to this JSON file
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Recover files listed in a saved manifest
    Recover {
        /// Path to the image the manifest was made from
        #[arg(short, long)]
        image: PathBuf,

        /// Manifest written by `scan --manifest`
        #[arg(short, long)]
        manifest: PathBuf,

        /// Output directory for recovered files
        #[arg(short, long, default_value = "./recovered")]
        output: PathBuf,

        /// Only recover these record ids, e.g. 1,2,5
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<u64>>,
    },

    /// Scan an image and recover everything found
    Carve {
        /// Path to device or image file
        #[arg(short, long)]
        image: PathBuf,

        /// Output directory for recovered files
        #[arg(short, long, default_value = "./recovered")]
        output: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Count header occurrences per signature without carving
    Probe {
        /// Path to device or image file
        #[arg(short, long)]
        image: PathBuf,

        /// JSON signature catalog to use instead of the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },

    /// List the signatures in the catalog
    ListSignatures {
        /// JSON signature catalog to use instead of the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scan_flags() {
        let cli = Cli::parse_from([
            "sigcarve", "scan", "-i", "disk.img", "-t", "jpg,pdf", "--gap-threshold", "4096",
            "--portable-search",
        ]);
        let Commands::Scan { image, manifest, scan } = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(image, PathBuf::from("disk.img"));
        assert!(manifest.is_none());
        let options = scan.scan_options();
        assert_eq!(options.gap_threshold, 4096);
        assert_eq!(options.extensions, vec!["jpg", "pdf"]);
        assert_eq!(options.search_backend, SearchBackend::Portable);
    }

    #[test]
    fn parses_recover_ids() {
        let cli = Cli::parse_from([
            "sigcarve", "-v", "recover", "-i", "disk.img", "-m", "db.json", "--ids", "1,2,5",
        ]);
        assert!(cli.verbose);
        let Commands::Recover { ids, output, .. } = cli.command else {
            panic!("expected recover");
        };
        assert_eq!(ids, Some(vec![1, 2, 5]));
        assert_eq!(output, PathBuf::from("./recovered"));
    }
}
