use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use template_var_renderer::settings::{Settings, DEFAULT_TIME_FORMAT};

/// Render templates against a typed variable context built from
/// `--name=value` flags, YAML config files, and the process environment.
#[derive(Parser, Debug)]
#[command(name = "tvr", version, about)]
struct Cli {
    /// Load defaults from the provided YAML files (default: ".tvr.yaml")
    #[arg(short = 'S', long = "settings", env = "TVR_SETTINGS", value_name = "FILE")]
    settings: Vec<PathBuf>,

    /// The 'missingkey' option passed to the template engine (default|zero|error)
    #[arg(short = 'M', long = "missing", env = "TVR_MISSINGKEY", default_value = "error")]
    missing: String,

    /// Load the environment into the variables under this name; empty disables
    #[arg(
        short = 'E',
        long = "environment",
        env = "TVR_ENVIRONMENT",
        default_value = "env",
        value_name = "NAME"
    )]
    environment: String,

    /// Timestamp format tried when typing values
    #[arg(long = "time-format", default_value = DEFAULT_TIME_FORMAT, value_name = "FORMAT")]
    time_format: String,

    /// Read the template from stdin
    #[arg(long)]
    stdin: bool,

    /// Write rendered output to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Start with variable-name capitalization disabled
    #[arg(long = "no-capitalize")]
    no_capitalize: bool,

    /// Enable verbose output
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short = 'D', long)]
    debug: bool,

    /// Variable flags (--Name=value), capitalize toggles (-c), template files
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "TOKEN")]
    tokens: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = Settings {
        capitalize: !cli.no_capitalize,
        missing_key: cli.missing,
        time_format: cli.time_format,
        environment: cli.environment,
        config_files: cli.settings,
        output: cli.output,
        stdin: cli.stdin,
        verbose: cli.verbose,
        debugging: cli.debug,
    };
    settings.validate_missing_key();

    match template_var_renderer::run(&settings, &cli.tokens) {
        Ok(status) => ExitCode::from(status as u8),
        Err(err) => {
            error!(%err, "cannot build context");
            ExitCode::from(1)
        }
    }
}
