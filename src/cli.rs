use std::env;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub serial: bool,
    pub workers: Option<usize>,
    pub report_out: Option<PathBuf>,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --scenario (expected a scenario directory)")?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--serial" => opts.serial = true,
            "--workers" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --workers (expected a positive integer)")?;
                match value.parse::<usize>() {
                    Ok(n) if n > 0 => opts.workers = Some(n),
                    _ => return Err(format!("--workers value \"{value}\" is not a positive integer")),
                }
            }
            "--report-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --report-out (expected a file path)")?;
                if opts.report_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--report-out provided more than once".to_string());
                }
            }
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source".to_string(),
        );
    }
    if opts.serial && opts.workers.is_some() {
        return Err("arguments `--serial` and `--workers` are mutually exclusive".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("logistic-load: forklift and truck energy for logistics buildings");
    eprintln!();
    eprintln!("Usage: logistic-load [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <dir>       Scenario root (prompted for if omitted)");
    eprintln!("  --config <path>        Load settings from a TOML file");
    eprintln!("  --preset <name>        Use a built-in preset (standard, serial)");
    eprintln!("  --serial               Run buildings one after another");
    eprintln!("  --workers <n>          Worker pool size for parallel runs");
    eprintln!("  --report-out <path>    Write the batch report as JSON");
    eprintln!("  --help                 Show this help message");
    eprintln!();
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=debug) to change log verbosity.");
}
