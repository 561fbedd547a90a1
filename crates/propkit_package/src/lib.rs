//! `propkit_package` v1:
//! Package column derivation for property listing reports.
//!
//! Modules:
//! - `spec`    : field table, summaries and errors
//! - `columns` : fragment-based column resolution
//! - `extract` : lossy numeric extraction from mixed cells
//! - `calc`    : package formula and column placement
pub mod calc;
pub mod columns;
pub mod extract;
pub mod spec;

pub use calc::{
    C_COLNAME_PACKAGE, N_PACKAGE_MULTIPLIER, apply_package_column, calculate_package,
    derive_apr_value, round_package,
};
pub use columns::{resolve_column, resolve_report_columns};
pub use extract::{extract_first_number, extract_lower_carpet};
pub use spec::{
    EnumReportField, PackageError, SpecPackageSummary, SpecResolvedColumns, TUP_FIELD_RULES,
};
