//! `build` and `inspect` pipelines.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use propkit_io_xlsx::{
    C_SHEET_NAME_REPORT, SpecReportSheetOptions, SpecXlsxReport, read_report_sheet_from_path,
    write_report_xlsx_bytes,
};
use propkit_mail::{
    DeliveryError, Mailer, SmtpMailer, SpecDeliveryReport, deliver_report,
    derive_recipient_address,
};
use propkit_package::{
    C_COLNAME_PACKAGE, EnumReportField, SpecPackageSummary, TUP_FIELD_RULES,
    apply_package_column, resolve_column,
};
use tracing::{error, info, warn};

use crate::config::SpecPropkitConfig;
use crate::exit_codes::{EXIT_DELIVERY_FAILED, EXIT_SUCCESS};

/// Default output path of `build`.
pub const C_OUTPUT_FILE_DEFAULT: &str = "Updated_Package_Report.xlsx";
/// Rows printed by `build` unless overridden.
pub const N_PREVIEW_ROWS_DEFAULT: usize = 10;

////////////////////////////////////////////////////////////////////////////////
// #region Build

/// Inputs of one `build` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecBuildArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Recipient identifier, e.g. `firstname.lastname`.
    pub send_to: Option<String>,
    /// Preview rows; `0` disables the preview.
    pub n_preview: usize,
}

/// Result of a `build` run whose output file was written.
#[derive(Debug)]
pub struct SpecBuildOutcome {
    pub output: PathBuf,
    pub summary: SpecPackageSummary,
    pub report: SpecXlsxReport,
    /// `None` when no recipient was requested.
    pub delivery: Option<Result<SpecDeliveryReport, DeliveryError>>,
    pub preview: Option<String>,
}

impl SpecBuildOutcome {
    /// Exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self.delivery {
            Some(Err(_)) => EXIT_DELIVERY_FAILED,
            _ => EXIT_SUCCESS,
        }
    }
}

/// Check a delivery request before any work is done, and build its transport.
///
/// Bad recipients and incomplete SMTP settings abort the run up front.
pub fn prepare_smtp_mailer(config: &SpecPropkitConfig, identifier: &str) -> Result<SmtpMailer> {
    derive_recipient_address(identifier, &config.mail.domain)?;
    if config.smtp.sender_address().is_none() {
        return Err(DeliveryError::MissingSetting("smtp.sender_email").into());
    }
    let mailer = SmtpMailer::from_config(&config.smtp).context("invalid SMTP configuration")?;
    Ok(mailer)
}

/// Read, calculate, style, write, then optionally email.
///
/// Errors abort the run without output. A delivery failure is returned
/// inside the outcome since the output file already exists.
pub fn run_build(
    args: &SpecBuildArgs,
    config: &SpecPropkitConfig,
    mailer: Option<&dyn Mailer>,
) -> Result<SpecBuildOutcome> {
    let mut sheet = read_report_sheet_from_path(&args.input, C_SHEET_NAME_REPORT)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    for c_warning in &sheet.warnings {
        warn!("{c_warning}");
    }

    let summary = apply_package_column(&mut sheet).context("package calculation failed")?;
    for c_warning in summary.warnings() {
        warn!("{c_warning}");
    }

    let options = SpecReportSheetOptions {
        cols_integer: vec![C_COLNAME_PACKAGE.to_string()],
        ..Default::default()
    };
    let (v_xlsx, report) =
        write_report_xlsx_bytes(&sheet, &options).context("failed to render report")?;
    for c_warning in &report.warnings {
        warn!("{c_warning}");
    }
    fs::write(&args.output, &v_xlsx)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        summary = %report.format("[XLSX]"),
        "report written"
    );

    let delivery = match (&args.send_to, mailer) {
        (Some(c_identifier), Some(mailer)) => {
            let result = deliver_report(mailer, &config.smtp, &config.mail, c_identifier, &v_xlsx);
            if let Err(err) = &result {
                error!("email delivery failed: {err}");
            }
            Some(result)
        }
        (Some(c_identifier), None) => {
            warn!(recipient = %c_identifier, "no mailer configured; email skipped");
            None
        }
        _ => None,
    };

    let preview = (args.n_preview > 0).then(|| render_preview(&sheet.df, args.n_preview));

    Ok(SpecBuildOutcome {
        output: args.output.clone(),
        summary,
        report,
        delivery,
        preview,
    })
}

/// First `n_rows` of `df` as a plain-text table.
pub fn render_preview(df: &DataFrame, n_rows: usize) -> String {
    format!("{}", df.head(Some(n_rows)))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Inspect

/// What `inspect` found in a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecInspectOutcome {
    pub sheet_names: Vec<String>,
    pub sheet_name: String,
    pub n_rows: usize,
    pub columns: Vec<String>,
    /// Matched header per semantic field.
    pub field_matches: Vec<(EnumReportField, Option<String>)>,
}

impl SpecInspectOutcome {
    /// Human-readable multi-line listing.
    pub fn render(&self) -> String {
        let mut l_lines = vec![
            format!("sheets: {}", self.sheet_names.join(", ")),
            format!("report sheet: {} ({} data rows)", self.sheet_name, self.n_rows),
            format!("columns: {}", self.columns.join(", ")),
        ];
        for (field, matched) in &self.field_matches {
            let c_matched = matched.as_deref().unwrap_or("<not found>");
            l_lines.push(format!("  {field} -> {c_matched}"));
        }
        l_lines.join("\n")
    }

    /// Whether every required field resolved.
    pub fn if_ready(&self) -> bool {
        TUP_FIELD_RULES.iter().all(|rule| {
            !rule.if_required
                || self
                    .field_matches
                    .iter()
                    .any(|(field, matched)| *field == rule.field && matched.is_some())
        })
    }
}

/// List sheets, the report sheet's columns and the field each resolves to.
pub fn run_inspect(input: &Path) -> Result<SpecInspectOutcome> {
    let sheet = read_report_sheet_from_path(input, C_SHEET_NAME_REPORT)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let columns: Vec<String> = sheet
        .df
        .get_column_names_str()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let field_matches = TUP_FIELD_RULES
        .iter()
        .map(|rule| {
            (
                rule.field,
                resolve_column(&columns, rule.fragment).map(str::to_string),
            )
        })
        .collect();

    Ok(SpecInspectOutcome {
        sheet_names: sheet.sheet_names,
        sheet_name: sheet.sheet_name,
        n_rows: sheet.df.height(),
        columns,
        field_matches,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
