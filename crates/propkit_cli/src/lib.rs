//! `propkit_cli` v1:
//! command-line front end for property package reports.
//!
//! Modules:
//! - `config`     : TOML configuration and env overrides
//! - `exit_codes` : process exit codes
//! - `run`        : `build` and `inspect` pipelines
pub mod config;
pub mod exit_codes;
pub mod run;

pub use config::{C_CONFIG_FILE_DEFAULT, C_ENV_SMTP_PASSWORD, SpecPropkitConfig};
pub use exit_codes::{EXIT_ABORT, EXIT_DELIVERY_FAILED, EXIT_SUCCESS};
pub use run::{
    C_OUTPUT_FILE_DEFAULT, N_PREVIEW_ROWS_DEFAULT, SpecBuildArgs, SpecBuildOutcome,
    SpecInspectOutcome, prepare_smtp_mailer, render_preview, run_build, run_inspect,
};
