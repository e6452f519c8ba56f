use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use table_fusion::config::{FusionConfig, MatchMode};
use table_fusion::{FusionError, Result, pipeline};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;

    let config = cli.resolve_config()?;
    let report = pipeline::run(&config)?;

    if cli.summary_json {
        println!("{}", report.summary.to_json()?);
    } else {
        println!("{}", report.summary);
    }
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| FusionError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge spreadsheet exports with shifting header rows into one table."
)]
struct Cli {
    /// Directory searched recursively for .xlsx files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory receiving the timestamped result workbook.
    #[arg(long)]
    result_dir: Option<PathBuf>,

    /// JSON configuration file; command line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of leading rows searched for the header row.
    #[arg(long)]
    scan_window: Option<usize>,

    /// Minimum number of filled cells in a header row.
    #[arg(long)]
    min_filled: Option<usize>,

    /// Header term recognised in a header row. Repeat to list several;
    /// replaces the built-in vocabulary.
    #[arg(long = "header-term", value_name = "TERM")]
    header_terms: Vec<String>,

    /// How cells are compared with header terms.
    #[arg(long, value_enum)]
    match_mode: Option<MatchModeArg>,

    /// Print the run summary as JSON.
    #[arg(long)]
    summary_json: bool,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum MatchModeArg {
    Exact,
    Contains,
}

impl From<MatchModeArg> for MatchMode {
    fn from(arg: MatchModeArg) -> Self {
        match arg {
            MatchModeArg::Exact => MatchMode::Exact,
            MatchModeArg::Contains => MatchMode::Contains,
        }
    }
}

impl Cli {
    fn resolve_config(&self) -> Result<FusionConfig> {
        let mut config = match &self.config {
            Some(path) => {
                if !path.exists() {
                    return Err(FusionError::MissingInput(path.clone()));
                }
                FusionConfig::from_json_file(path)?
            }
            None => FusionConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.result_dir {
            config.result_dir = dir.clone();
        }
        if let Some(window) = self.scan_window {
            config.detection.scan_window = window;
        }
        if let Some(min_filled) = self.min_filled {
            config.detection.min_filled_cells = min_filled;
        }
        if !self.header_terms.is_empty() {
            config.detection.header_terms = self.header_terms.clone();
        }
        if let Some(mode) = self.match_mode {
            config.detection.match_mode = mode.into();
        }

        config.validate()?;
        Ok(config)
    }
}
