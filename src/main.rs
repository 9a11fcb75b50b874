use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use sigcarve::presentation::cli::{Cli, Commands, ProgressReporter, ScanArgs};
use sigcarve::{
    load_catalog, CancelToken, CarveEngine, JsonManifestStore, LocalFileWriter, ManifestRecord,
    ManifestStore, RecoverFilesUseCase, RecoveryResult, ScanOptions, SignatureCatalog,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    match cli.command {
        Commands::Scan {
            image,
            manifest,
            scan,
        } => run_scan(&image, manifest.as_deref(), &scan, cancel_on_ctrlc()?),
        Commands::Recover {
            image,
            manifest,
            output,
            ids,
        } => run_recover(&image, &manifest, &output, ids.as_deref(), cancel_on_ctrlc()?),
        Commands::Carve {
            image,
            output,
            scan,
        } => run_carve(&image, &output, &scan, cancel_on_ctrlc()?),
        Commands::Probe { image, catalog } => run_probe(&image, catalog.as_deref()),
        Commands::ListSignatures { catalog } => run_list_signatures(catalog.as_deref()),
    }
}

fn init_tracing(verbose: bool, debug: bool) {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Routes Ctrl-C to a cancel token.
///
/// Only commands that check the token install it; the others keep the
/// default SIGINT behaviour.
fn cancel_on_ctrlc() -> Result<CancelToken> {
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to install Ctrl-C handler")?;
    Ok(cancel)
}

fn catalog_from(path: Option<&Path>) -> Result<SignatureCatalog> {
    match path {
        Some(path) => load_catalog(path)
            .with_context(|| format!("Failed to load signature catalog {}", path.display())),
        None => Ok(SignatureCatalog::builtin()),
    }
}

fn engine_for(scan: &ScanArgs, cancel: CancelToken) -> Result<(CarveEngine, ProgressReporter)> {
    let catalog = catalog_from(scan.catalog.as_deref())?;
    let reporter = ProgressReporter::for_scan(catalog.len() as u64);
    let engine = CarveEngine::new(catalog, scan.scan_options())
        .with_cancel_token(cancel)
        .with_progress(reporter.scan_callback());
    Ok((engine, reporter))
}

fn run_scan(image: &Path, manifest: Option<&Path>, scan: &ScanArgs, cancel: CancelToken) -> Result<()> {
    let (engine, reporter) = engine_for(scan, cancel)?;
    let result = engine
        .scan_path(image)
        .with_context(|| format!("Failed to scan {}", image.display()))?;
    reporter.finish_and_clear();

    print_records(result.records());
    println!("\n{}", result.summary());
    for error in result.errors() {
        println!("  skipped: {}", error);
    }

    if let Some(path) = manifest {
        JsonManifestStore::new(path)
            .save(result.records())
            .with_context(|| format!("Failed to save manifest {}", path.display()))?;
        println!("Manifest saved to {}", path.display());
    }
    Ok(())
}

fn run_recover(
    image: &Path,
    manifest: &Path,
    output: &Path,
    ids: Option<&[u64]>,
    cancel: CancelToken,
) -> Result<()> {
    let records = JsonManifestStore::new(manifest)
        .load()
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
    let writer = LocalFileWriter::new(output)
        .with_context(|| format!("Failed to prepare output directory {}", output.display()))?;

    let reporter = ProgressReporter::spinner("Recovering files...");
    let result = RecoverFilesUseCase::new(writer)
        .with_cancel_token(cancel)
        .recover_path(image, &records, ids)
        .with_context(|| format!("Failed to recover from {}", image.display()))?;
    reporter.finish_and_clear();

    print_recovery(&result);
    Ok(())
}

fn run_carve(image: &Path, output: &Path, scan: &ScanArgs, cancel: CancelToken) -> Result<()> {
    let (engine, reporter) = engine_for(scan, cancel)?;
    let (scan_result, recovery) = engine
        .carve(image, || LocalFileWriter::new(output))
        .with_context(|| format!("Failed to carve {} into {}", image.display(), output.display()))?;
    reporter.finish_and_clear();

    println!("{}", scan_result.summary());
    print_recovery(&recovery);
    Ok(())
}

fn run_probe(image: &Path, catalog: Option<&Path>) -> Result<()> {
    let engine = CarveEngine::new(catalog_from(catalog)?, ScanOptions::default());
    let census = engine
        .census(image)
        .with_context(|| format!("Failed to probe {}", image.display()))?;

    println!("{:<8} {:<34} {:>10}", "TYPE", "HEADER", "HITS");
    println!("{}", "-".repeat(54));
    let mut total = 0;
    for count in census.iter().filter(|c| c.hits > 0) {
        println!(
            "{:<8} {:<34} {:>10}",
            count.extension,
            hex::encode(&count.header),
            count.hits
        );
        total += count.hits;
    }
    println!("\n{} header occurrences across {} signatures", total, census.len());
    Ok(())
}

fn run_list_signatures(catalog: Option<&Path>) -> Result<()> {
    let catalog = catalog_from(catalog)?;
    let (descriptors, rejected) = catalog.descriptors();

    println!("{} signatures:", descriptors.len());
    for (index, desc) in &descriptors {
        println!("  {:>3}. {}", index + 1, desc);
    }
    for err in &rejected {
        println!("  skipped: {}", err);
    }
    Ok(())
}

fn print_records(records: &[ManifestRecord]) {
    println!(
        "{:>6}  {:<8} {:>14} {:>12}  {:>7}",
        "ID", "TYPE", "OFFSET", "SIZE", "ENTROPY"
    );
    println!("{}", "-".repeat(53));
    for record in records {
        println!(
            "{:>6}  {:<8} {:>14} {:>12}  {:>7.2}",
            record.id(),
            record.extension(),
            record.offset(),
            record.size(),
            record.entropy()
        );
    }
}

fn print_recovery(result: &RecoveryResult) {
    println!("{}", result.summary());
    for error in &result.errors {
        println!("  failed: {}", error);
    }
}
