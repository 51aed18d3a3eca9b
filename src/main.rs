//! vaultsweep - Find and clear attachments no note references.
//!
//! Usage:
//!   vsweep [VAULT]               Clear unused images
//!   vsweep images [VAULT]        Clear unused images
//!   vsweep attachments [VAULT]   Clear every unused attachment
//!   vsweep list [VAULT]          Show unused files without removing them
//!   vsweep refs [VAULT]          Show every referenced path
//!   vsweep config                Show the effective settings
//!   vsweep --help                Show help

mod settings;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::EnvFilter;

use vaultsweep_analyze::{ReferenceCollector, UnusedFinder};
use vaultsweep_core::{DeleteOption, ScanMode, ScanWarning, Vault, VaultConfig, VaultFile};
use vaultsweep_ops::{DisposalEvent, DisposalReport, PendingSweep, SweepOutcome, start_disposal};
use vaultsweep_scan::FsVault;

use settings::UserSettings;

#[derive(Parser)]
#[command(
    name = "vaultsweep",
    version,
    about = "Find and clear attachments that no note references",
    long_about = "vaultsweep scans a markdown vault, resolves every wiki link, markdown \
                  link, front-matter field and canvas node, and removes the attachments \
                  nothing points at.\n\n\
                  Running `vsweep [VAULT]` clears unused images; use subcommands for \
                  other modes or a dry run."
)]
struct Cli {
    /// Vault to sweep (defaults to current directory)
    #[arg(default_value = ".")]
    vault: PathBuf,

    /// How to remove files: ".trash", "system-trash" or "permanent"
    #[arg(long, global = true)]
    delete_option: Option<DeleteOption>,

    /// Comma-separated folders whose files are never removed
    #[arg(long, global = true)]
    exclude: Option<String>,

    /// Also protect subfolders of the excluded folders
    #[arg(long, global = true)]
    exclude_subfolders: bool,

    /// Do not print the cleanup log
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Skip the confirmation before permanent deletion
    #[arg(short, long, global = true)]
    yes: bool,

    /// Include hidden folders in the scan
    #[arg(long, global = true)]
    hidden: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Clear unused images
    Images {
        /// Vault to sweep
        #[arg(default_value = ".")]
        vault: PathBuf,
    },

    /// Clear every unused attachment, not only images
    Attachments {
        /// Vault to sweep
        #[arg(default_value = ".")]
        vault: PathBuf,
    },

    /// List unused files without removing anything
    List {
        /// Vault to scan
        #[arg(default_value = ".")]
        vault: PathBuf,

        /// Consider every attachment, not only images
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print every path referenced by some note or canvas
    Refs {
        /// Vault to scan
        #[arg(default_value = ".")]
        vault: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or save the effective settings
    Config {
        /// Print the settings file path
        #[arg(long, conflicts_with_all = ["show", "save"])]
        path: bool,

        /// Print the effective settings (default)
        #[arg(long)]
        show: bool,

        /// Write the effective settings, including command-line overrides
        #[arg(long)]
        save: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = effective_settings(&cli);

    match &cli.command {
        Some(Command::Images { vault }) => run_sweep(vault, ScanMode::Image, &settings, &cli),
        Some(Command::Attachments { vault }) => run_sweep(vault, ScanMode::All, &settings, &cli),
        Some(Command::List { vault, all, format }) => {
            let mode = if *all { ScanMode::All } else { ScanMode::Image };
            run_list(vault, mode, *format, cli.hidden)
        }
        Some(Command::Refs { vault, format }) => run_refs(vault, *format, cli.hidden),
        Some(Command::Config { path, show, save }) => {
            run_config(&settings, *path, *show || !*save, *save)
        }
        None => run_sweep(&cli.vault, ScanMode::Image, &settings, &cli),
    }
}

/// Install the stderr subscriber; `RUST_LOG` overrides `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Stored settings with command-line overrides applied.
fn effective_settings(cli: &Cli) -> UserSettings {
    let mut settings = UserSettings::load();
    if let Some(option) = cli.delete_option {
        settings.delete_option = option;
    }
    if let Some(exclude) = &cli.exclude {
        settings.excluded_folders = exclude.clone();
    }
    if cli.exclude_subfolders {
        settings.exclude_subfolders = true;
    }
    if cli.quiet {
        settings.show_log = false;
    }
    settings
}

/// Open the vault at `path`.
fn open_vault(path: &Path, include_hidden: bool) -> Result<FsVault> {
    let config = VaultConfig::builder()
        .root(path)
        .include_hidden(include_hidden)
        .build()
        .map_err(|e| eyre!("Invalid vault config: {e}"))?;

    eprintln!("Scanning {}...", path.display());

    let vault = FsVault::open(&config)
        .wrap_err_with(|| format!("Cannot open vault at {}", path.display()))?;
    print_warnings(vault.warnings());
    Ok(vault)
}

/// Scan for unused files and dispose of them.
fn run_sweep(path: &Path, mode: ScanMode, settings: &UserSettings, cli: &Cli) -> Result<()> {
    let vault: Arc<dyn Vault> = Arc::new(open_vault(path, cli.hidden)?);

    let pending = PendingSweep::scan(vault.as_ref(), mode);
    print_warnings(&pending.unused().warnings);

    let disposal = if pending.is_empty() {
        DisposalReport::new(settings.delete_option)
    } else {
        let unused = pending.unused();
        if settings.delete_option == DeleteOption::Permanent
            && !cli.yes
            && !confirm(&format!(
                "Permanently delete {} unused {} ({})?",
                unused.unused.len(),
                mode.noun(),
                format_size(unused.total_size())
            ))?
        {
            println!("Aborted. Nothing was deleted.");
            return Ok(());
        }
        run_disposal(Arc::clone(&vault), pending.files().to_vec(), settings)?
    };

    print_outcome(&pending.finish(disposal), settings.show_log);
    Ok(())
}

fn print_outcome(outcome: &SweepOutcome, show_log: bool) {
    let report = match outcome {
        SweepOutcome::NothingToDo { .. } => {
            println!("{}", outcome.summary());
            return;
        }
        SweepOutcome::Completed(report) => report,
    };

    if show_log {
        for line in report.log() {
            println!("{line}");
        }
        println!();
    }

    let disposal = &report.disposal;
    println!(
        " {} of {} unused {} removed, freed {}",
        disposal.removed,
        report.candidates,
        report.mode.noun(),
        format_size(disposal.bytes_freed)
    );
    if disposal.skipped > 0 {
        println!(" {} skipped in excluded folders", disposal.skipped);
    }
    if disposal.failed > 0 {
        println!(" {} could not be removed", disposal.failed);
    }
}

/// Drive the async disposal to completion on a fresh runtime.
fn run_disposal(
    vault: Arc<dyn Vault>,
    files: Vec<VaultFile>,
    settings: &UserSettings,
) -> Result<DisposalReport> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let config = settings.disposal_config();

    runtime.block_on(async move {
        let mut rx = start_disposal(vault, files, config);
        while let Some(event) = rx.recv().await {
            match event {
                DisposalEvent::Progress(progress) => {
                    tracing::debug!(
                        processed = progress.processed(),
                        total = progress.total,
                        current = ?progress.current,
                        "disposal progress"
                    );
                }
                DisposalEvent::Complete(report) => return Ok(report),
            }
        }
        Err(eyre!("Disposal stopped before completing"))
    })
}

/// Dry run: print the unused files.
fn run_list(path: &Path, mode: ScanMode, format: OutputFormat, hidden: bool) -> Result<()> {
    let vault = open_vault(path, hidden)?;
    let report = UnusedFinder::new().find_unused(&vault, mode);

    match format {
        OutputFormat::Text => {
            print_warnings(&report.warnings);
            println!();
            println!("{}", "─".repeat(60));
            println!(" Unused {} in {}", mode.noun(), path.display());
            println!("{}", "─".repeat(60));
            println!();

            if report.is_empty() {
                println!(" All {} are in use.", mode.noun());
            } else {
                for file in &report.unused {
                    println!("   {:<48} {:>10}", file.path, format_size(file.size));
                }
                println!();
                println!(
                    " {} of {} {} unused ({})",
                    report.unused.len(),
                    report.attachments_scanned,
                    mode.noun(),
                    format_size(report.total_size())
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Print the referenced-path set.
fn run_refs(path: &Path, format: OutputFormat, hidden: bool) -> Result<()> {
    let vault = open_vault(path, hidden)?;
    let report = ReferenceCollector::new().collect(&vault);

    match format {
        OutputFormat::Text => {
            print_warnings(&report.warnings);
            for referenced in report.paths.sorted() {
                println!("{referenced}");
            }
            eprintln!(
                "{} referenced paths in {} documents",
                report.paths.len(),
                report.documents_scanned
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Show, locate or save settings.
fn run_config(settings: &UserSettings, path: bool, show: bool, save: bool) -> Result<()> {
    if path {
        match UserSettings::config_path() {
            Some(path) => println!("{}", path.display()),
            None => return Err(eyre!("No config directory on this platform")),
        }
        return Ok(());
    }

    if save {
        let saved = settings.save().context("Failed to save settings")?;
        eprintln!("Saved settings to {}", saved.display());
    }

    if show {
        print!(
            "{}",
            toml::to_string_pretty(settings).context("Failed to render settings")?
        );
    }
    Ok(())
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` is no.
fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn print_warnings(warnings: &[ScanWarning]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!("{} warning(s):", warnings.len());
    for warning in warnings {
        eprintln!("  {warning}");
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
