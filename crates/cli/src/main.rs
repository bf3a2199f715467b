// BillGrid CLI - headless bill reconciliation

mod bill;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use billgrid_recon::ReconError;
use exit_codes::{recon_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "bgrid")]
#[command(about = "Reconcile a contractor bill against its work order")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a workbook (or a directory of CSV sheets) against a bill config
    #[command(after_help = "\
Examples:
  bgrid run bill.xlsx --config bill.toml
  bgrid run bill.xlsx --config bill.toml --json
  bgrid run sheets/ --config bill.toml --output package.json
  bgrid run bill.xlsx --config bill.toml --out-dir render/ --strict

A directory input reads one CSV per sheet, named after the sheet:
  work_order.csv, bill_quantity.csv, extra_items.csv")]
    Run {
        /// Workbook (xlsx, xls, xlsb, ods) or directory of CSV sheets
        input: PathBuf,

        /// Bill config (TOML): context, layout, notes
        #[arg(long, short = 'c', env = "BGRID_CONFIG")]
        config: PathBuf,

        /// Print the JSON package to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON package to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write one <sheet>.json payload per rendered sheet into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Only emit these sheets (by name or slug, e.g. "Note Sheet" or note_sheet)
        #[arg(long = "sheet")]
        sheets: Vec<String>,

        /// Exit 6 if any row was skipped as malformed
        #[arg(long)]
        strict: bool,
    },

    /// Parse and validate a bill config without running
    #[command(after_help = "\
Examples:
  bgrid validate bill.toml")]
    Validate {
        /// Path to the bill config
        config: PathBuf,
    },

    /// List the sheets in a workbook and check the ones the layout expects
    #[command(after_help = "\
Examples:
  bgrid inspect bill.xlsx
  bgrid inspect bill.xlsx --config bill.toml --json")]
    Inspect {
        /// Workbook to inspect
        workbook: PathBuf,

        /// Bill config whose layout names the expected sheets
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { input, config, json, output, out_dir, sheets, strict } => {
            bill::cmd_run(bill::RunArgs { input, config, json, output, out_dir, sheets, strict })
        }
        Commands::Validate { config } => bill::cmd_validate(config),
        Commands::Inspect { workbook, config, json } => bill::cmd_inspect(workbook, config, json),
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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingSheet { .. } => {
                Some("check [layout.*].sheet names against `bgrid inspect <workbook>`".to_string())
            }
            ReconError::SheetShape { .. } => {
                Some("check [layout.*].header_rows and columns for this sheet".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }
}
