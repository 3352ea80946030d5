// payrecon CLI - reconcile a collection ledger against a transaction file

mod check;
mod exit_codes;
mod run;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use payrecon_config::Settings;
use payrecon_recon::{select_keys, ReconError, ReconMode};

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "payrecon")]
#[command(about = "Reconcile two payment ledgers and publish a workbook and summary chart")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/payrecon/settings.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile LEFT (collection records) against RIGHT (transaction records)
    #[command(after_help = "\
Examples:
  payrecon run cis.xlsx tp.csv --mode ATP
  payrecon run cis.csv tp.txt --mode NEFT --out-dir results/neft
  payrecon run cis.xlsx tp.xlsx --mode CASH --json
  payrecon run cis.xlsx tp.xlsx --mode ATP --output summary.json

Key columns by mode:
  ATP, NEFT    left 'utr no', right 'utr'
  anything else   'receipt no' on both sides")]
    Run {
        /// Left input (xlsx, xls, csv, txt)
        left: PathBuf,

        /// Right input (xlsx, xls, csv, txt)
        right: PathBuf,

        /// Reconciliation mode (case-sensitive; ATP and NEFT join on UTR)
        #[arg(long, short = 'm')]
        mode: String,

        /// Result directory (overrides result_dir from settings)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Print JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON report to file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Run identifier used in artifact names (default: random UUID)
        #[arg(long)]
        run_id: Option<String>,
    },

    /// Show the key columns a mode joins on
    #[command(after_help = "\
Examples:
  payrecon keys ATP
  payrecon keys CASH --json")]
    Keys {
        mode: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load input files without reconciling and report what was found
    #[command(after_help = "\
Examples:
  payrecon check cis.xlsx tp.csv
  payrecon check ledger.txt --json")]
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            left,
            right,
            mode,
            out_dir,
            json,
            output,
            run_id,
        } => load_settings(cli.config.as_deref()).and_then(|settings| {
            run::cmd_run(&settings, run::RunArgs {
                left,
                right,
                mode,
                out_dir,
                json,
                output,
                run_id,
            })
        }),
        Commands::Keys { mode, json } => cmd_keys(&mode, json),
        Commands::Check { files, json } => {
            load_settings(cli.config.as_deref()).and_then(|settings| check::cmd_check(&settings, &files, json))
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let settings = match path {
        Some(p) => Settings::load_from(p),
        None => Settings::load(),
    };
    settings.map_err(|e| {
        CliError::usage(e.to_string()).with_hint(format!(
            "default settings location is {}",
            Settings::config_path().display()
        ))
    })
}

// ============================================================================
// keys
// ============================================================================

fn cmd_keys(mode: &str, json: bool) -> Result<(), CliError> {
    let mode = ReconMode::parse(mode);
    let keys = select_keys(&mode);

    if json {
        let out = serde_json::json!({
            "mode": mode.as_str(),
            "left": keys.left,
            "right": keys.right,
        });
        println!("{out}");
    } else {
        println!("left:  {}", keys.left);
        println!("right: {}", keys.right);
    }
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with its registry exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::MissingColumn { .. } => Some(
                "column names are matched after trimming and lowercasing; see `payrecon keys <MODE>`"
                    .to_string(),
            ),
            ReconError::Schema { .. } => {
                Some("rename the column so names stay unique ignoring case and surrounding spaces".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        Self::recon(err)
    }
}
