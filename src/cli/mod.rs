//! CLI definition and the top-level run loop

mod files;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config;
use crate::deps::gather_project_deps;
use crate::models::{FileReport, RunReport};
use crate::pipeline::Pipeline;
use crate::reporters;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// pytidy - Python source hygiene toolkit
#[derive(Parser, Debug)]
#[command(name = "pytidy")]
#[command(
    version,
    about = "Tidy Python source trees: whitespace lint, typo renames, unused imports, and a dependency report",
    after_help = "\
Examples:
  pytidy .                        Analyze the current directory
  pytidy src tests --fix          Fix files under src/ and tests/ in place
  pytidy app.py --report json     JSON output for scripting
  pytidy . --strict --secure      CI mode: audit deps, exit 2 on warnings"
)]
pub struct Cli {
    /// Files or directories to process (default: current directory)
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Apply fixes in place: format, rename typos, drop unused imports
    #[arg(long, overrides_with = "no_fix")]
    pub fix: bool,

    /// Analyze only, never modify files (default)
    #[arg(long = "no-fix", overrides_with = "fix")]
    pub no_fix: bool,

    /// Exit with code 2 when any warning is reported
    #[arg(long)]
    pub strict: bool,

    /// Audit dependencies for known vulnerabilities with pip-audit
    #[arg(long)]
    pub secure: bool,

    /// Output format: text, json
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub report: String,

    /// Number of parallel workers (1-64)
    #[arg(long, default_value = "8", value_parser = parse_workers)]
    pub workers: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

/// Run the CLI with parsed arguments, returning the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let fix = cli.fix && !cli.no_fix;
    let config = config::load_config(Path::new("."));

    let files = files::collect_python_files(&cli.paths);
    if files.is_empty() {
        eprintln!("No python files found.");
        return Ok(1);
    }

    let pipeline = Pipeline::detect(fix, cli.secure, &config);

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(progress_style());
    bar.set_message(if fix {
        "Fixing files..."
    } else {
        "Analyzing files..."
    });

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.workers)
        .build()?;
    let reports: Vec<FileReport> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let report = pipeline.process_file(path);
                bar.inc(1);
                report
            })
            .collect()
    });
    bar.finish_with_message(format!(
        "{}Processed {} file(s)",
        style("✓ ").green(),
        style(files.len()).cyan()
    ));

    let deps_found = gather_project_deps(&cli.paths);
    let security_findings = if cli.secure {
        pipeline.scan_dependencies()
    } else {
        Vec::new()
    };

    let run_report = RunReport::new(reports, deps_found, security_findings);
    let rendered = reporters::report(&run_report, &cli.report)?;
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }

    if cli.strict && run_report.warning_count() > 0 {
        return Ok(2);
    }
    Ok(0)
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("█▓▒░  ")
}
