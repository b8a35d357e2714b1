mod assertions;
mod checks;
mod registry;
mod reports;
mod util;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use checks::{SuiteKind, list_suites, register_suites, resolve_suites};
use enjoy_state::Dataset;
use registry::Registry;
use reports::{RunReport, generate_console_report, generate_markdown_report, save_json_report};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored per-suite listing with a summary
    Console,
    /// Markdown summary, suitable for CI job summaries
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "enjoy-validator", version)]
#[command(about = "Validate the ENJOY state file against its level definitions")]
struct Args {
    /// Data root holding state.json and the levels directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// State document (defaults to <root>/state.json)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Level definition directory (defaults to <root>/levels)
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Report file (defaults to <root>/test-report.json)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Do not write the report file
    #[arg(long)]
    no_save: bool,

    /// Suites to run (comma-separated keys, or "all")
    #[arg(long, default_value = "all")]
    suites: String,

    /// List all available suites and exit
    #[arg(long)]
    list_suites: bool,

    /// Rendering printed to stdout
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    format: ReportFormat,

    /// Print each check as it runs
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn state_path(&self) -> PathBuf {
        self.state
            .clone()
            .unwrap_or_else(|| self.root.join("state.json"))
    }

    fn levels_dir(&self) -> PathBuf {
        self.levels
            .clone()
            .unwrap_or_else(|| self.root.join("levels"))
    }

    fn report_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.root.join("test-report.json"))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_suites(&args, &mut stdout().lock())? {
        return Ok(());
    }

    if args.format == ReportFormat::Console {
        announce_banner(&mut stdout().lock())?;
    }

    let report = run(&args)?;
    if !report.all_passed() {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_suites(args: &Args, out: &mut dyn Write) -> Result<bool> {
    if !args.list_suites {
        return Ok(false);
    }
    writeln!(out, "Available suites:")?;
    for (key, name) in list_suites() {
        writeln!(out, "  {key:15} - {name}")?;
    }
    out.flush()?;
    Ok(true)
}

fn announce_banner(out: &mut dyn Write) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🧪 ENJOY TEST SUITE".bright_cyan().bold())?;
    writeln!(out)?;
    writeln!(out, "{}", "Running comprehensive tests...".yellow())?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn select_suites(args: &Args) -> Vec<SuiteKind> {
    let (selected, unknown) = resolve_suites(&split_csv(&args.suites));
    for key in unknown {
        log::warn!("unknown suite '{key}' skipped");
        eprintln!("⚠️  Unknown suite: {}", key.yellow());
    }
    selected
}

fn load_dataset(args: &Args) -> Result<Dataset> {
    let state_path = args.state_path();
    let levels_dir = args.levels_dir();
    Dataset::load(&state_path, &levels_dir).with_context(|| {
        format!(
            "failed to load inputs (state {}, levels {})",
            state_path.display(),
            levels_dir.display()
        )
    })
}

fn run(args: &Args) -> Result<RunReport> {
    let suites = select_suites(args);
    let dataset = load_dataset(args)?;

    let mut registry = Registry::new();
    register_suites(&mut registry, &dataset, &suites);
    log::info!(
        "running {} checks across {} suites",
        registry.check_count(),
        registry.suites().len()
    );
    if registry.is_empty() {
        log::warn!("no suites selected");
    }
    let results = registry.run(args.verbose);
    for suite in results.iter().filter(|s| !s.all_passed()) {
        log::warn!("{}: failed {}", suite.name, suite.failures().join(", "));
    }
    let report = RunReport::from_results(&results, Utc::now());

    write_report(args, &report, &mut stdout().lock())?;
    Ok(report)
}

fn write_report(args: &Args, report: &RunReport, out: &mut dyn Write) -> Result<()> {
    let mut writer = BufWriter::new(out);
    match args.format {
        ReportFormat::Console => generate_console_report(&mut writer, report)?,
        ReportFormat::Markdown => generate_markdown_report(&mut writer, report)?,
    }

    if !args.no_save {
        let path = args.report_path();
        save_json_report(&path, report)?;
        writeln!(writer, "📄 Test report saved to {}", path.display())?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
