//! snapdiff - directory snapshots, snapshot diffs and a polling watch mode.
//!
//! Usage:
//!   snapdiff snapshot <DIR> <OUTPUT>   Record a directory snapshot
//!   snapdiff diff <OLD> <NEW>          Compare two snapshot files
//!   snapdiff compare <DIR1> <DIR2>     Snapshot and compare two directories
//!   snapdiff watch <DIR>               Report changes as they happen
//!   snapdiff config [list|set|reset]   Manage defaults
//!   snapdiff --help                    Show help

mod logging;
mod output;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use snapdiff_core::{AppConfig, FilterOptions, OutputFormat, ScanConfig, Snapshot};
use snapdiff_diff::compute_diff;
use snapdiff_report::{renderer_for, write_report};
use snapdiff_scan::{ScanReport, Scanner};
use snapdiff_watch::{WatchEvent, start_watch};

use crate::logging::{LogLevel, init_logging};

#[derive(Parser)]
#[command(
    name = "snapdiff",
    version,
    about = "Directory snapshots and diffs",
    long_about = "snapdiff records what a directory contains (paths, sizes, \
                  modification times and SHA-256 hashes) and reports what \
                  changed between two snapshots, two directories, or over time."
)]
struct Cli {
    /// Log verbosity (overrides SNAPDIFF_LOG)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that scans a directory.
#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Only track paths matching this glob (repeatable)
    #[arg(long = "include", value_name = "PATTERN")]
    include: Vec<String>,

    /// Skip paths matching this glob (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Do not hash file contents; compare by size only
    #[arg(long)]
    no_hash: bool,
}

impl FilterArgs {
    fn into_options(self, config: &AppConfig) -> FilterOptions {
        let mut options = FilterOptions {
            include_patterns: self.include,
            exclude_patterns: self.exclude,
            no_hash: self.no_hash,
            format: OutputFormat::default(),
        };
        config.apply_defaults(&mut options);
        options
    }
}

#[derive(Subcommand)]
enum Command {
    /// Record a snapshot of a directory
    Snapshot {
        /// Directory to snapshot
        dir: PathBuf,

        /// File to write the snapshot to
        output: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output format (json or csv)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Print each file as it is processed
        #[arg(long)]
        progress: bool,
    },

    /// Compare two snapshot files
    Diff {
        /// Older snapshot
        old: PathBuf,

        /// Newer snapshot
        new: PathBuf,

        /// Also write the diff to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format for --output (json, csv or html)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// List unchanged files too
        #[arg(long)]
        show_unchanged: bool,

        /// Show sizes and modification times
        #[arg(long)]
        detailed: bool,
    },

    /// Snapshot two directories and compare them
    Compare {
        dir1: PathBuf,
        dir2: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Show sizes and modification times
        #[arg(long)]
        detailed: bool,

        /// Print each file as it is processed
        #[arg(long)]
        progress: bool,
    },

    /// Re-snapshot a directory on an interval and report changes
    Watch {
        dir: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Seconds between checks
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show or change saved defaults
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print current settings
    List,
    /// Change one setting (defaultFormat, defaultWatchInterval, defaultExcludes)
    Set { key: String, value: String },
    /// Restore default settings
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config_path = cli.config.clone().or_else(AppConfig::default_path);
    let config = load_config(config_path.as_deref());

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match cli.command {
        Command::Snapshot {
            dir,
            output,
            filter,
            format,
            progress,
        } => {
            let mut options = filter.into_options(&config);
            if let Some(format) = format {
                options.format = format;
            }
            run_snapshot(&dir, &output, options, progress, &cancel).await?;
        }
        Command::Diff {
            old,
            new,
            output,
            format,
            show_unchanged,
            detailed,
        } => {
            let format = format.unwrap_or(config.default_format);
            run_diff(&old, &new, output.as_deref(), format, show_unchanged, detailed)?;
        }
        Command::Compare {
            dir1,
            dir2,
            filter,
            detailed,
            progress,
        } => {
            let options = filter.into_options(&config);
            run_compare(&dir1, &dir2, options, detailed, progress, &cancel).await?;
        }
        Command::Watch {
            dir,
            filter,
            interval,
        } => {
            let interval = match interval {
                Some(0) => bail!("Watch interval must be a positive number of seconds"),
                Some(secs) => Duration::from_secs(secs),
                None => config.watch_interval(),
            };
            let options = filter.into_options(&config);
            run_watch(&dir, options, interval, cancel).await?;
        }
        Command::Config { action } => {
            run_config(config, config_path.as_deref(), action)?;
        }
    }

    Ok(())
}

/// Load settings, falling back to defaults when the file is unusable.
fn load_config(path: Option<&Path>) -> AppConfig {
    let Some(path) = path else {
        return AppConfig::default();
    };

    match AppConfig::load(path) {
        Ok(config) => {
            debug!(path = %path.display(), "Loaded settings");
            config
        }
        Err(e) => {
            warn!("{e}; using default settings");
            AppConfig::default()
        }
    }
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ctrl+C received, cancelling");
            cancel.cancel();
        }
    });
}

/// Scan `dir`, optionally echoing progress to stderr.
async fn scan_directory(
    dir: &Path,
    options: FilterOptions,
    progress: bool,
    cancel: &CancellationToken,
) -> Result<ScanReport> {
    let scanner = Scanner::new();

    let printer = progress.then(|| {
        tokio::spawn(output::drain_progress(scanner.subscribe(), |update| {
            eprintln!("  [{}] {}", update.files_seen(), update.current_path);
        }))
    });

    let config = ScanConfig::new(dir).with_options(options);
    let result = scanner.scan_async(config, cancel.clone()).await;

    // The printer finishes once the last sender is gone.
    drop(scanner);
    if let Some(printer) = printer {
        if let Err(e) = printer.await {
            debug!(error = %e, "Progress printer did not finish");
        }
    }

    result
        .map_err(|e| {
            if e.is_cancelled() {
                eyre!("Operation cancelled")
            } else {
                eyre!(e)
            }
        })
        .wrap_err_with(|| format!("Failed to snapshot {}", dir.display()))
}

async fn run_snapshot(
    dir: &Path,
    output: &Path,
    options: FilterOptions,
    progress: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let renderer = renderer_for(options.format);
    if !renderer.supports_snapshots() {
        bail!("{} output is not supported for snapshots", options.format);
    }

    eprintln!("Scanning {}...", dir.display());
    let report = scan_directory(dir, options, progress, cancel).await?;

    let bytes = renderer
        .render_snapshot(&report.snapshot)
        .wrap_err("Cannot render snapshot")?;
    write_report(output, &bytes)
        .wrap_err_with(|| format!("Cannot write {}", output.display()))?;

    output::print_snapshot_summary(&report, output);
    Ok(())
}

fn run_diff(
    old_path: &Path,
    new_path: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    show_unchanged: bool,
    detailed: bool,
) -> Result<()> {
    let old = Snapshot::load(old_path)?;
    let new = Snapshot::load(new_path)?;

    let diff = compute_diff(&old, &new, show_unchanged);
    output::print_diff(
        &diff,
        &old_path.display().to_string(),
        &new_path.display().to_string(),
        detailed,
    );

    if let Some(output) = output {
        let bytes = renderer_for(format)
            .render_diff(&diff)
            .wrap_err("Cannot render diff")?;
        write_report(output, &bytes)
            .wrap_err_with(|| format!("Cannot write {}", output.display()))?;
        println!();
        println!("Diff exported to: {}", output.display());
    }

    Ok(())
}

async fn run_compare(
    dir1: &Path,
    dir2: &Path,
    options: FilterOptions,
    detailed: bool,
    progress: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    eprintln!("Comparing {} and {}...", dir1.display(), dir2.display());

    let first = scan_directory(dir1, options.clone(), progress, cancel).await?;
    let second = scan_directory(dir2, options, progress, cancel).await?;

    let diff = compute_diff(&first.snapshot, &second.snapshot, false);
    output::print_diff(
        &diff,
        &dir1.display().to_string(),
        &dir2.display().to_string(),
        detailed,
    );
    Ok(())
}

async fn run_watch(
    dir: &Path,
    options: FilterOptions,
    interval: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    let config = ScanConfig::new(dir).with_options(options);
    let mut events = start_watch(config, interval, cancel);

    while let Some(event) = events.recv().await {
        match event {
            WatchEvent::Started { files } => {
                println!("Watching directory: {}", dir.display());
                println!("   Files tracked : {files}");
                println!("   Check interval: {} seconds", interval.as_secs());
                println!("   Press Ctrl+C to stop");
            }
            WatchEvent::Changes(change) => output::print_change(&change),
            WatchEvent::Failed(e) => {
                return Err(eyre!(e)).wrap_err_with(|| format!("Watch of {} failed", dir.display()));
            }
        }
    }

    println!();
    println!("Watch mode stopped.");
    Ok(())
}

fn run_config(
    mut config: AppConfig,
    path: Option<&Path>,
    action: Option<ConfigAction>,
) -> Result<()> {
    match action.unwrap_or(ConfigAction::List) {
        ConfigAction::List => {
            println!("Current configuration:");
            println!("   Default format        : {}", config.default_format);
            println!("   Default watch interval: {}s", config.default_watch_interval);
            println!(
                "   Default excludes      : {}",
                config.default_excludes.join(", ")
            );
            if let Some(path) = path {
                println!("   File                  : {}", path.display());
            }
        }
        ConfigAction::Set { key, value } => {
            let path = path.ok_or_else(|| eyre!("No configuration directory; pass --config"))?;
            config.set(&key, &value)?;
            config.save(path)?;
            println!("Configuration updated: {key} = {value}");
        }
        ConfigAction::Reset => {
            let path = path.ok_or_else(|| eyre!("No configuration directory; pass --config"))?;
            AppConfig::default().save(path)?;
            println!("Configuration reset to defaults.");
        }
    }
    Ok(())
}
