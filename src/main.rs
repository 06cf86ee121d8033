//! Main entry point for the memzip CLI application.
//!
//! This binary packs local files and remote HTTP resources into a single
//! ZIP archive, built entirely in memory and written out once finished.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use memzip::zip::DEFAULT_UNIX_MODE;
use memzip::{
    ArchiveBuilder, Cli, CompressionMethod, EntryOptions, EntryRecord, HttpSource,
    LocalFileSource, Source,
};

/// Application entry point.
///
/// Parses command-line arguments, adds every input to one archive and
/// writes the result to the requested path.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let archive_path = Path::new(&cli.archive);
    if archive_path.exists() && !cli.overwrite {
        bail!("{} exists (use -o to overwrite)", archive_path.display());
    }

    let mut builder = ArchiveBuilder::new();
    let mut records = Vec::with_capacity(cli.files.len());
    let mut seen = HashSet::new();
    let mut transferred = 0u64;

    for file in &cli.files {
        let record = if Cli::is_http_url(file) {
            let source = HttpSource::new(file)?;
            let record = add_source(&mut builder, &source, &cli).await?;
            transferred += source.transferred_bytes();
            record
        } else {
            let source = LocalFileSource::new(Path::new(file))?;
            add_source(&mut builder, &source, &cli).await?
        };

        if !seen.insert(record.file_name.clone()) {
            warn!(entry = %record.file_name, "duplicate entry name in archive");
        }
        if !cli.is_quiet() {
            println!("  adding: {} ({})", record.file_name, describe(&record));
        }
        records.push(record);
    }

    builder.finalize()?;
    let archive = builder.into_bytes();
    tokio::fs::write(archive_path, &archive)
        .await
        .with_context(|| format!("cannot write {}", archive_path.display()))?;

    if cli.verbose {
        print_summary(&records);
    }
    if !cli.is_very_quiet() && transferred > 0 {
        eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
    }

    Ok(())
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise `-v` shows info, `-qq` only errors.
fn init_tracing(cli: &Cli) {
    let default = if cli.is_very_quiet() {
        "error"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

/// Read one source and append it to the archive.
async fn add_source<S: Source>(
    builder: &mut ArchiveBuilder,
    source: &S,
    cli: &Cli,
) -> Result<EntryRecord> {
    let data = source.read_all().await?;

    let name = if cli.junk_paths {
        source
            .entry_name()
            .rsplit('/')
            .next()
            .unwrap_or(source.entry_name())
    } else {
        source.entry_name()
    };

    let mode = cli
        .entry_mode(source.unix_mode())
        .unwrap_or(DEFAULT_UNIX_MODE);
    let method = CompressionMethod::from(cli.compression_method);
    let options = EntryOptions::new(method).unix_mode(mode);

    builder
        .add_entry(name, &data, &options)
        .with_context(|| format!("cannot add {name}"))
}

/// `zip(1)`-style note, e.g. "deflated 62%".
fn describe(record: &EntryRecord) -> String {
    match record.compression_method {
        CompressionMethod::Stored => "stored 0%".to_string(),
        method => format!("{} {}%", method.verb(), saved_percent(record)),
    }
}

fn saved_percent(record: &EntryRecord) -> i64 {
    if record.uncompressed_size == 0 {
        return 0;
    }
    100 - (i64::from(record.compressed_size) * 100 / i64::from(record.uncompressed_size))
}

/// Print a table of the packed entries with totals.
fn print_summary(records: &[EntryRecord]) {
    println!(
        "{:>10}  {:>10}  {:>5}  {:>8}  {:>10}  Name",
        "Length", "Size", "Cmpr", "CRC-32", "Offset"
    );
    println!("{}", "-".repeat(70));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;

    for record in records {
        println!(
            "{:>10}  {:>10}  {:>4}%  {:08x}  {:>10}  {}",
            record.uncompressed_size,
            record.compressed_size,
            saved_percent(record),
            record.crc32,
            record.lfh_offset,
            record.file_name
        );
        total_uncompressed += u64::from(record.uncompressed_size);
        total_compressed += u64::from(record.compressed_size);
    }

    println!("{}", "-".repeat(70));
    let total_ratio = if total_uncompressed > 0 {
        100 - (total_compressed as i64 * 100 / total_uncompressed as i64)
    } else {
        0
    };
    println!(
        "{:>10}  {:>10}  {:>4}%  {:>20}  {} files",
        total_uncompressed,
        total_compressed,
        total_ratio,
        "",
        records.len()
    );
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
