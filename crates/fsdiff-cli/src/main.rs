//! fsdiff: snapshot a filesystem tree and report what changed between snapshots.

mod commands;
mod error;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fsdiff_core::config::{CliOverrides, FsdiffConfig};
use fsdiff_core::errors::FsdiffErrorCode;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "fsdiff")]
#[command(version)]
#[command(about = "Snapshot filesystem trees and report security-relevant changes")]
#[command(long_about = "fsdiff records every file's metadata and content digest into a \
    compressed snapshot, then compares two snapshots.\n\n\
    Examples:\n  \
    fsdiff scan /etc baseline.fsd              # Snapshot /etc\n  \
    fsdiff scan / full.fsd --stream            # Low-memory scan of a large tree\n  \
    fsdiff compare baseline.fsd current.fsd    # Show what changed\n  \
    fsdiff compare a.fsd b.fsd --csv out.csv   # Export changes as CSV\n  \
    fsdiff live baseline.fsd /etc              # Compare a baseline with the tree as it is now\n  \
    fsdiff inspect baseline.fsd                # Print snapshot metadata\n  \
    fsdiff config                              # Show the resolved configuration")]
struct Cli {
    /// Log progress and per-change details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Additional ignore pattern (repeatable)
    #[arg(short, long = "ignore", global = true, value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Directory searched for fsdiff.toml (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    config_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree into a snapshot file
    Scan {
        /// Directory to scan
        root: PathBuf,

        /// Snapshot file to write
        output: PathBuf,

        /// Write records in batches instead of holding the whole tree in memory
        #[arg(long)]
        stream: bool,

        /// Hashing worker threads
        #[arg(short, long)]
        workers: Option<usize>,

        /// Read buffer per worker, in bytes
        #[arg(long)]
        buffer_size: Option<usize>,

        /// zstd compression level (1-22)
        #[arg(long)]
        level: Option<i32>,
    },

    /// Compare two snapshots
    Compare {
        /// Earlier snapshot
        baseline: PathBuf,

        /// Later snapshot
        current: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Also write changes to a CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Compare every record even when root digests match
        #[arg(long)]
        force_full: bool,

        /// Show content digests
        #[arg(long)]
        show_hashes: bool,

        /// Print only categories that have changes
        #[arg(long)]
        only_changes: bool,
    },

    /// Compare a baseline snapshot against a fresh scan of a directory
    Live {
        /// Earlier snapshot
        baseline: PathBuf,

        /// Directory to scan now
        root: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Also write changes to a CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Hashing worker threads
        #[arg(short, long)]
        workers: Option<usize>,

        /// Compare every record even when root digests match
        #[arg(long)]
        force_full: bool,

        /// Print only categories that have changes
        #[arg(long)]
        only_changes: bool,
    },

    /// Print a snapshot's metadata without loading its records
    Inspect {
        snapshot: PathBuf,

        /// Print the header as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a snapshot's structure, root digest, and digest tree
    Verify { snapshot: PathBuf },

    /// Print the resolved configuration as TOML
    Config,
}

fn main() -> ExitCode {
    fsdiff_core::tracing::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{}", err.coded_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut overrides = CliOverrides {
        scan_verbose: cli.verbose.then_some(true),
        extra_ignore: cli.ignore,
        ..CliOverrides::default()
    };
    match &cli.command {
        Commands::Scan {
            workers,
            buffer_size,
            level,
            ..
        } => {
            overrides.scan_workers = *workers;
            overrides.scan_buffer_size = *buffer_size;
            overrides.compression_level = *level;
        }
        Commands::Compare {
            force_full,
            show_hashes,
            only_changes,
            ..
        } => {
            overrides.diff_force_full_compare = force_full.then_some(true);
            overrides.diff_show_hashes = show_hashes.then_some(true);
            overrides.diff_only_changes = only_changes.then_some(true);
        }
        Commands::Live {
            workers,
            force_full,
            only_changes,
            ..
        } => {
            overrides.scan_workers = *workers;
            overrides.diff_force_full_compare = force_full.then_some(true);
            overrides.diff_only_changes = only_changes.then_some(true);
        }
        Commands::Inspect { .. } | Commands::Verify { .. } | Commands::Config => {}
    }

    let config_root = cli
        .config_root
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let config = FsdiffConfig::load(&config_root, Some(&overrides))?;

    match cli.command {
        Commands::Scan {
            root,
            output,
            stream,
            ..
        } => commands::scan::run(&root, &output, stream, &config),
        Commands::Compare {
            baseline,
            current,
            json,
            csv,
            ..
        } => commands::compare::run(&baseline, &current, json, csv.as_deref(), &config),
        Commands::Live {
            baseline,
            root,
            json,
            csv,
            ..
        } => commands::live::run(&baseline, &root, json, csv.as_deref(), &config),
        Commands::Inspect { snapshot, json } => commands::inspect::run(&snapshot, json),
        Commands::Verify { snapshot } => commands::verify::run(&snapshot, &config),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
