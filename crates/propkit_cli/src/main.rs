//! propkit CLI - property package report generator
//!
//! Reads the `Report` sheet of a workbook, adds the `Package` column, writes
//! a styled copy and optionally emails it.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use propkit_cli::{
    C_ENV_SMTP_PASSWORD, C_OUTPUT_FILE_DEFAULT, EXIT_ABORT, EXIT_SUCCESS, N_PREVIEW_ROWS_DEFAULT,
    SpecBuildArgs, SpecPropkitConfig, prepare_smtp_mailer, run_build, run_inspect,
};
use propkit_mail::Mailer;
use tracing::{error, warn};

#[derive(Parser)]
#[command(name = "propkit")]
#[command(version, about = "Property package report generator", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "PROPKIT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the Package column and write the styled report
    Build {
        /// Input workbook with a `Report` sheet
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output workbook path
        #[arg(short, long, value_name = "FILE", default_value = C_OUTPUT_FILE_DEFAULT)]
        output: PathBuf,

        /// Email the report to this recipient (e.g. firstname.lastname)
        #[arg(long, value_name = "RECIPIENT")]
        send_to: Option<String>,

        /// Rows to preview on stdout (0 disables)
        #[arg(long, value_name = "N", default_value_t = N_PREVIEW_ROWS_DEFAULT)]
        preview: usize,
    },

    /// Show sheets, columns and resolved fields without writing anything
    Inspect {
        /// Input workbook
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = propkit_log::init_tracing(cli.verbose) {
        eprintln!("failed to initialize logging: {err}");
    }

    match dispatch(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(EXIT_ABORT)
        }
    }
}

fn dispatch(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Build {
            input,
            output,
            send_to,
            preview,
        } => {
            let config = SpecPropkitConfig::load(cli.config.as_deref())?
                .with_password_override(std::env::var(C_ENV_SMTP_PASSWORD).ok());
            let mailer = send_to
                .as_deref()
                .map(|c_identifier| prepare_smtp_mailer(&config, c_identifier))
                .transpose()?;

            let args = SpecBuildArgs {
                input,
                output,
                send_to,
                n_preview: preview,
            };
            let outcome = run_build(&args, &config, mailer.as_ref().map(|m| m as &dyn Mailer))?;

            println!("Report written to {}", outcome.output.display());
            if let Some(Ok(delivery)) = &outcome.delivery {
                println!("Report emailed to {}", delivery.recipient);
            }
            if let Some(c_preview) = &outcome.preview {
                println!("{c_preview}");
            }
            Ok(outcome.exit_code())
        }
        Commands::Inspect { input } => {
            let outcome = run_inspect(&input)?;
            println!("{}", outcome.render());
            if !outcome.if_ready() {
                warn!("required columns are missing; build would abort");
            }
            Ok(EXIT_SUCCESS)
        }
    }
}
