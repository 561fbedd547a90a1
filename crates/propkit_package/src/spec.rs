//! Field table, calculation summary and error types.

use std::fmt;

use propkit_io_xlsx::XlsxReportError;
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region FieldTable

/// Semantic input columns the package calculation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumReportField {
    /// Carpet area range, e.g. `650 - 700`.
    CarpetArea,
    /// Average APR multiplier.
    AverageApr,
    /// Count of property; only used to position the `Package` column.
    CountOfProperty,
}

impl EnumReportField {
    /// Header label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CarpetArea => "Carpet Area(SQ.FT)",
            Self::AverageApr => "Average of APR",
            Self::CountOfProperty => "Count of Property",
        }
    }
}

impl fmt::Display for EnumReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One `{fragment -> field}` lookup rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecFieldRule {
    /// Field resolved by this rule.
    pub field: EnumReportField,
    /// Lowercase substring searched in lowercased header names.
    pub fragment: &'static str,
    /// Whether a missing match aborts the calculation.
    pub if_required: bool,
}

/// Header fragments, matched case-insensitively anywhere in the header name.
pub const TUP_FIELD_RULES: [SpecFieldRule; 3] = [
    SpecFieldRule {
        field: EnumReportField::CarpetArea,
        fragment: "carpet area(sq.ft)",
        if_required: true,
    },
    SpecFieldRule {
        field: EnumReportField::AverageApr,
        fragment: "average of apr",
        if_required: true,
    },
    SpecFieldRule {
        field: EnumReportField::CountOfProperty,
        fragment: "count of property",
        if_required: false,
    },
];

/// Actual header names (original casing) matched by the field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecResolvedColumns {
    /// Carpet area column.
    pub col_carpet: String,
    /// Average APR column.
    pub col_apr: String,
    /// Count of property column, when present.
    pub col_count: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Summary

/// Outcome of one package calculation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPackageSummary {
    /// Columns the calculation used.
    pub columns: SpecResolvedColumns,
    /// Rows processed.
    pub n_rows: usize,
    /// Rows whose APR was missing or not numeric (Package left blank).
    pub n_rows_apr_missing: usize,
    /// Rows whose carpet cell held no number (treated as 0).
    pub n_rows_carpet_defaulted: usize,
    /// Zero-based position of the `Package` column after placement.
    pub col_idx_package: usize,
    /// Whether an existing `Package` column was replaced.
    pub if_replaced_existing: bool,
}

impl SpecPackageSummary {
    /// Non-fatal data-quality warnings for this pass.
    pub fn warnings(&self) -> Vec<String> {
        let mut l_warnings = Vec::new();
        if self.n_rows_apr_missing > 0 {
            l_warnings.push(format!(
                "{} row(s) have no numeric '{}' value; their Package is blank.",
                self.n_rows_apr_missing, self.columns.col_apr
            ));
        }
        if self.n_rows_carpet_defaulted > 0 {
            l_warnings.push(format!(
                "{} row(s) have no number in '{}'; carpet area treated as 0.",
                self.n_rows_carpet_defaulted, self.columns.col_carpet
            ));
        }
        if self.if_replaced_existing {
            l_warnings.push("Existing 'Package' column was replaced.".to_string());
        }
        l_warnings
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures of the package calculation step.
#[derive(Debug, Error)]
pub enum PackageError {
    /// One or more required columns have no matching header.
    #[error("required column(s) not found: {}", format_fields(.missing))]
    MissingColumns {
        /// Required fields without a match.
        missing: Vec<EnumReportField>,
    },
    /// Replacing or inserting the `Package` column failed.
    #[error(transparent)]
    Table(#[from] XlsxReportError),
}

fn format_fields(fields: &[EnumReportField]) -> String {
    fields
        .iter()
        .map(|field| format!("'{field}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
