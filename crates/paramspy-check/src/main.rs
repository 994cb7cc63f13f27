//! paramspy-check CLI
//!
//! Replays search parameter assertions from an expectations file against a
//! recorded session.
//!
//! Usage:
//!   paramspy-check --recording <recording.json> --expectations <file.yaml> [OPTIONS]

use anyhow::Context;
use clap::{Parser, ValueEnum};
use paramspy::RecordingSession;
use paramspy_check::{load_expectations, run_checks, CheckReport, Status};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Search parameter assertion checker
#[derive(Parser, Debug)]
#[command(name = "paramspy-check")]
#[command(
    author,
    version,
    about = "Check recorded searches against expected search parameters"
)]
struct Args {
    /// Recorded session saved as JSON
    #[arg(short, long, env = "PARAMSPY_RECORDING")]
    recording: PathBuf,

    /// Expectations file (YAML, or JSON with a .json extension)
    #[arg(short, long, env = "PARAMSPY_EXPECTATIONS")]
    expectations: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let session = RecordingSession::load_from_file(&args.recording)
        .with_context(|| format!("failed to load recording {:?}", args.recording))?;
    let expectations = load_expectations(&args.expectations)
        .with_context(|| format!("failed to load expectations {:?}", args.expectations))?;

    let report = run_checks(&session, &expectations);

    match args.output {
        OutputFormat::Json => {
            let output = serde_json::to_string_pretty(&report)?;
            println!("{output}");
        }
        OutputFormat::Text => print_report(&report, &args),
    }

    std::process::exit(if report.is_success() { 0 } else { 1 });
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &CheckReport, args: &Args) {
    println!("{BOLD}{CYAN}Search Parameter Checks{RESET}");
    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
    println!("{DIM}Recording:{RESET}    {CYAN}{}{RESET}", args.recording.display());
    println!(
        "{DIM}Expectations:{RESET} {CYAN}{}{RESET}\n",
        args.expectations.display()
    );

    if report.outcomes.is_empty() {
        println!("{YELLOW}Warning:{RESET} No expectations found");
    }

    for outcome in &report.outcomes {
        let color = status_color(outcome.status);
        println!(
            "{color}{BOLD}{}{RESET} {} {DIM}({}){RESET}",
            outcome.status.label(),
            outcome.name,
            outcome.kind.label()
        );
        if let Some(message) = &outcome.message {
            if outcome.status != Status::Passed || args.verbose {
                println!("  {color}|{RESET} {message}");
            }
        }
    }

    // Summary
    println!();
    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
    println!("{BOLD}{CYAN}Summary{RESET}");
    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
    println!("  {DIM}Checked:{RESET} {BOLD}{}{RESET}", report.checked);
    println!("  {GREEN}Passed:{RESET}  {BOLD}{GREEN}{}{RESET}", report.passed);
    if report.failed > 0 {
        println!("  {RED}Failed:{RESET}  {BOLD}{RED}{}{RESET}", report.failed);
    } else {
        println!("  {DIM}Failed:{RESET}  {BOLD}0{RESET}");
    }
    if report.errors > 0 {
        println!("  {YELLOW}Errors:{RESET}  {BOLD}{YELLOW}{}{RESET}", report.errors);
    } else {
        println!("  {DIM}Errors:{RESET}  {BOLD}0{RESET}");
    }
    println!();

    if report.is_success() {
        println!("{GREEN}{BOLD}All expectations met!{RESET}");
    } else {
        println!("{RED}{BOLD}Search parameter checks failed{RESET}");
    }
}

fn status_color(status: Status) -> &'static str {
    match status {
        Status::Passed => GREEN,
        Status::Failed => RED,
        Status::Error => YELLOW,
    }
}
