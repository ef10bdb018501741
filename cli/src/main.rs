//! folio CLI
//!
//! Scans project directories for planning documents and writes the portfolio
//! index plus one page per project.
//!
//! ```text
//! folio --scan-dirs ~/dev ~/src --output ~/site
//! folio --dry-run --json
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use folio_core::config::expand_home;
use folio_core::{DryRunStore, FolioConfig, FsStore, SyncReport};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

/// Keep a portfolio site in sync with project planning documents
#[derive(Debug, Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Directories whose immediate children are scanned for projects
    /// (default: `scan_dirs` from the config file)
    #[arg(long = "scan-dirs", value_name = "DIR", num_args = 1..)]
    scan_dirs: Vec<String>,

    /// Output root for the index and the pages directory (default: current directory)
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Config file (default: $FOLIO_CONFIG or ~/.config/folio/folio.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print what would be written instead of writing
    #[arg(long)]
    dry_run: bool,

    /// Output the run report as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match FolioConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(category = err.category().as_str(), "Unusable configuration");
            return Err(anyhow::Error::new(err).context("failed to load folio configuration"));
        }
    };

    let roots: Vec<PathBuf> = if cli.scan_dirs.is_empty() {
        config.resolved_scan_dirs()
    } else {
        cli.scan_dirs.iter().map(String::as_str).map(expand_home).collect()
    };
    for root in roots.iter().filter(|root| !root.is_dir()) {
        tracing::warn!(root = %root.display(), "Scan directory does not exist");
    }

    let output_root = match cli.output {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };

    if cli.dry_run {
        let store = DryRunStore::new(FsStore);
        let report = folio_core::run(&config, &store, &roots, &output_root)?;
        let writes = store.writes();
        if cli.json {
            let would_write: Vec<&PathBuf> = writes.iter().map(|(path, _)| path).collect();
            let output = serde_json::json!({
                "dry_run": true,
                "would_write": would_write,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for (path, text) in &writes {
                println!("==> {} <==", path.display());
                println!("{text}");
            }
            print_human_report(&report, true);
        }
        return Ok(());
    }

    let report = folio_core::run(&config, &FsStore, &roots, &output_root)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human_report(&report, false);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_human_report(report: &SyncReport, dry_run: bool) {
    let color = std::io::stdout().is_terminal();

    if report.projects.is_empty() {
        println!("No projects found with planning documents");
    } else {
        let names: Vec<&str> = report.projects.iter().map(|p| p.name.as_str()).collect();
        println!(
            "Found {} projects ({} legacy): {}",
            report.project_count(),
            report.legacy_count(),
            names.join(", ")
        );
    }

    let verb = if dry_run { "Would write" } else { "Generated" };
    for path in &report.written {
        let line = format!("{verb} {}", path.display());
        println!("  {}", paint(&line, color, |s| s.green().to_string()));
    }
    for path in &report.rewritten {
        let line = format!("Refreshed fields in {}", path.display());
        println!("  {}", paint(&line, color, |s| s.cyan().to_string()));
    }
    for path in &report.preserved {
        let line = format!("Preserving detailed content: {}", path.display());
        println!("  {}", paint(&line, color, |s| s.yellow().to_string()));
    }
    if !report.unchanged.is_empty() {
        println!("  {} pages unchanged", report.unchanged.len());
    }
    for diagnostic in &report.diagnostics {
        let line = format!("warning: {diagnostic}");
        println!("  {}", paint(&line, color, |s| s.yellow().to_string()));
    }
    for failure in &report.failures {
        let line = format!("failed to write {}: {}", failure.path.display(), failure.error);
        println!("  {}", paint(&line, color, |s| s.red().to_string()));
    }
    if let Some(index) = &report.index {
        let verb = if dry_run { "Would update" } else { "Updated" };
        println!("{verb} {}", index.display());
    }
}

fn paint(text: &str, color: bool, style: fn(&str) -> String) -> String {
    if color { style(text) } else { text.to_string() }
}
