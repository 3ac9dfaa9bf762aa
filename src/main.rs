//! Velious CLI - Command-line tool for PFS (.s3d) archive extraction.
//!
//! This is the main entry point for the Velious command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{warn, Level};
use tracing_subscriber::EnvFilter;

use velious::prelude::*;

/// Velious - legacy 3D game archive extraction tool
#[derive(Parser)]
#[command(name = "velious")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the logging level (RUST_LOG takes precedence)
    #[arg(short, long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show header and directory information for an archive
    Info {
        /// Path to the PFS archive
        #[arg(short, long, env = "PFS_ARCHIVE")]
        archive: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List contents of an archive
    List {
        /// Path to the PFS archive
        #[arg(short, long, env = "PFS_ARCHIVE")]
        archive: PathBuf,

        /// Filter pattern (glob-style, case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show offsets, sizes, and checksums
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract entries from an archive
    Extract {
        /// Path to the PFS archive
        #[arg(short, long, env = "PFS_ARCHIVE")]
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Filter pattern (glob-style, case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Inflate each payload as a run of compressed blocks
        #[arg(short, long)]
        inflate: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::from(cli.log_level).into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { archive, json } => {
            cmd_info(&archive, json)?;
        }
        Commands::List {
            archive,
            filter,
            detailed,
        } => {
            cmd_list(&archive, filter.as_deref(), detailed)?;
        }
        Commands::Extract {
            archive,
            output,
            filter,
            inflate,
        } => {
            cmd_extract(&archive, &output, filter.as_deref(), inflate)?;
        }
    }

    Ok(())
}

fn open_archive(path: &Path) -> Result<PfsArchive> {
    PfsArchive::open(path)
        .with_context(|| format!("Failed to open PFS archive {}", path.display()))
}

fn cmd_info(path: &Path, json: bool) -> Result<()> {
    let archive = open_archive(path)?;
    let header = archive.header();
    let table = archive.filename_table_entry();

    if json {
        let info = serde_json::json!({
            "name": archive.name(),
            "size": archive.archive_size(),
            "header": header,
            "filename_table": table,
            "entries": archive.len(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Archive:          {} ({} bytes)", archive.name(), archive.archive_size());
    println!("Directory offset: {:#010x}", header.directory_offset);
    println!("Format version:   {:#010x}", header.format_version);
    println!("Entries:          {}", archive.len());
    println!(
        "Filename table:   {} bytes at {:#010x}",
        table.payload_size, table.payload_offset
    );

    Ok(())
}

fn cmd_list(path: &Path, filter: Option<&str>, detailed: bool) -> Result<()> {
    let archive = open_archive(path)?;
    let pattern = compile_filter(filter)?;

    let mut count = 0;
    for entry in archive.iter().filter(|e| matches_filter(pattern.as_ref(), e)) {
        if detailed {
            println!(
                "{:>10} {:#010x} {:08x} {}",
                entry.size(),
                entry.offset(),
                entry.checksum(),
                entry.name_lossy()
            );
        } else {
            println!("{}", entry.name_lossy());
        }
        count += 1;
    }

    println!("\nTotal: {} entries", count);

    Ok(())
}

fn cmd_extract(path: &Path, output: &Path, filter: Option<&str>, inflate: bool) -> Result<()> {
    println!("Opening PFS archive: {}", path.display());

    let start = Instant::now();
    let archive = open_archive(path)?;
    println!("Loaded {} entries in {:?}", archive.len(), start.elapsed());

    let pattern = compile_filter(filter)?;
    let indices: Vec<usize> = archive
        .iter()
        .enumerate()
        .filter(|(_, e)| matches_filter(pattern.as_ref(), e))
        .map(|(i, _)| i)
        .collect();

    println!("Extracting {} entries...", indices.len());

    let pb = ProgressBar::new(indices.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let start = Instant::now();
    let failures = AtomicUsize::new(0);

    let load: fn(&PfsArchive, &PfsEntry) -> velious::pfs::Result<Vec<u8>> = if inflate {
        PfsArchive::inflate
    } else {
        PfsArchive::read
    };

    archive.extract_parallel_with(&indices, load, |_, entry, data| {
        let written = data
            .map_err(anyhow::Error::from)
            .and_then(|data| write_entry(output, entry, &data));

        if let Err(e) = written {
            warn!(name = %entry.name_lossy(), error = %e, "failed to extract entry");
            failures.fetch_add(1, Ordering::Relaxed);
        }
        pb.inc(1);
    })?;

    pb.finish_with_message("Done");
    println!(
        "Extraction completed in {:?} ({} errors)",
        start.elapsed(),
        failures.load(Ordering::Relaxed)
    );

    Ok(())
}

fn write_entry(output: &Path, entry: &PfsEntry, data: &[u8]) -> Result<()> {
    let relative = entry.output_path();
    if relative.as_os_str().is_empty() {
        anyhow::bail!("entry {:?} has no usable file name", entry.name_lossy());
    }

    let output_path = output.join(relative);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&output_path, data)
        .with_context(|| format!("Failed to write {}", output_path.display()))
}

fn compile_filter(filter: Option<&str>) -> Result<Option<Pattern>> {
    filter
        .map(|f| Pattern::new(f).with_context(|| format!("Invalid filter pattern {:?}", f)))
        .transpose()
}

fn matches_filter(pattern: Option<&Pattern>, entry: &PfsEntry) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    pattern.map_or(true, |p| p.matches_with(&entry.name_lossy(), options))
}
