//! logistic-load entry point: CLI wiring, logging, and batch dispatch.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use tracing::error;
use tracing_subscriber::EnvFilter;

use logistic_load::cli::{self, CliOptions};
use logistic_load::config::LogisticsConfig;
use logistic_load::reporting::BatchReport;
use logistic_load::runner::run_scenario;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Reads one trimmed line from stdin after printing `question`.
fn prompt(question: &str) -> anyhow::Result<String> {
    eprint!("{question}");
    io::stderr().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        bail!("no answer on stdin for: {}", question.trim_end());
    }
    Ok(line.trim().to_string())
}

fn load_config(cli: &CliOptions) -> anyhow::Result<LogisticsConfig> {
    let mut config = if let Some(path) = &cli.config {
        LogisticsConfig::from_toml_file(path)?
    } else if let Some(name) = &cli.preset {
        LogisticsConfig::from_preset(name)?
    } else {
        LogisticsConfig::standard()
    };

    if cli.serial {
        config.dispatch.parallel = false;
    }
    if let Some(workers) = cli.workers {
        config.dispatch.parallel = true;
        config.dispatch.workers = Some(workers);
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("configuration has {} error(s)", errors.len());
    }
    Ok(config)
}

fn run(cli: CliOptions) -> anyhow::Result<bool> {
    let mut config = load_config(&cli)?;

    let scenario = match cli.scenario {
        Some(path) => path,
        None => {
            let path = prompt("Scenario path: ")?;
            if path.is_empty() {
                bail!("no scenario path given");
            }
            if !cli.serial && cli.workers.is_none() {
                let answer = prompt("Run buildings in parallel? [y/n]: ")?;
                config.dispatch.parallel = match answer.as_str() {
                    "y" | "Y" => true,
                    "n" | "N" => false,
                    _ => bail!("expected y or n, got \"{answer}\""),
                };
            }
            PathBuf::from(path)
        }
    };
    if !scenario.is_dir() {
        bail!("scenario \"{}\" is not a directory", scenario.display());
    }

    let report = run_scenario(&scenario, &config)
        .with_context(|| format!("cannot run scenario \"{}\"", scenario.display()))?;
    println!("{report}");

    if let Some(path) = &cli.report_out {
        write_report(&report, path)?;
    }
    Ok(!report.has_failures())
}

fn write_report(report: &BatchReport, path: &Path) -> anyhow::Result<()> {
    report
        .export_json(path)
        .with_context(|| format!("failed to write report to \"{}\"", path.display()))?;
    eprintln!("Report written to {}", path.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            return ExitCode::FAILURE;
        }
    };
    if cli.help {
        cli::print_usage();
        return ExitCode::SUCCESS;
    }

    init_logging();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
