//! Package formula and `Package` column placement.

use propkit_io_xlsx::{EnumCellValue, SpecReportSheet};
use tracing::{debug, info};

use crate::columns::resolve_report_columns;
use crate::extract::{extract_first_number, extract_lower_carpet};
use crate::spec::{PackageError, SpecPackageSummary};

/// Name of the derived column.
pub const C_COLNAME_PACKAGE: &str = "Package";
/// Combined multiplier, `1.4 * 1.12`.
pub const N_PACKAGE_MULTIPLIER: f64 = 1.568;

/// `round(lower_carpet * 1.568 * apr)`, rounding halves to even.
pub fn calculate_package(lower_carpet: f64, apr: f64) -> f64 {
    round_package(lower_carpet * N_PACKAGE_MULTIPLIER * apr)
}

/// Round half to even (`2.5 -> 2`, `3.5 -> 4`).
pub fn round_package(value: f64) -> f64 {
    value.round_ties_even()
}

/// APR multiplier of one cell; `None` when missing or not numeric.
pub fn derive_apr_value(value: &EnumCellValue) -> Option<f64> {
    match value {
        EnumCellValue::Number(n) if n.is_finite() => Some(*n),
        EnumCellValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Add the `Package` column to `sheet`.
///
/// The column lands immediately before the resolved count-of-property column,
/// or at the end when there is none; every other column keeps its relative
/// order. An existing `Package` column is replaced. Rows without a numeric
/// APR get a blank Package.
pub fn apply_package_column(
    sheet: &mut SpecReportSheet,
) -> Result<SpecPackageSummary, PackageError> {
    let columns = resolve_report_columns(&sheet.colnames())?;

    let mut n_rows_apr_missing = 0usize;
    let mut n_rows_carpet_defaulted = 0usize;
    let mut l_packages: Vec<EnumCellValue> = Vec::new();
    if let (Some(l_carpet), Some(l_apr)) = (
        sheet.column_cells(&columns.col_carpet),
        sheet.column_cells(&columns.col_apr),
    ) {
        l_packages.reserve(l_carpet.len());
        for (value_carpet, value_apr) in l_carpet.iter().zip(l_apr.iter()) {
            if let EnumCellValue::String(s) = value_carpet
                && extract_first_number(s).is_none()
            {
                n_rows_carpet_defaulted += 1;
            }
            let n_lower_carpet = extract_lower_carpet(value_carpet);

            match derive_apr_value(value_apr) {
                Some(n_apr) => l_packages.push(EnumCellValue::Number(calculate_package(
                    n_lower_carpet,
                    n_apr,
                ))),
                None => {
                    n_rows_apr_missing += 1;
                    l_packages.push(EnumCellValue::None);
                }
            }
        }
    }

    let if_replaced_existing = sheet.drop_column(C_COLNAME_PACKAGE)?;

    let col_idx_package = columns
        .col_count
        .as_deref()
        .and_then(|c_name| sheet.df.get_column_index(c_name))
        .unwrap_or(sheet.df.width());
    let n_rows = l_packages.len();
    sheet.insert_column(col_idx_package, C_COLNAME_PACKAGE, l_packages)?;
    debug!(col_idx_package, "package column placed");

    let summary = SpecPackageSummary {
        columns,
        n_rows,
        n_rows_apr_missing,
        n_rows_carpet_defaulted,
        col_idx_package,
        if_replaced_existing,
    };
    info!(
        n_rows = summary.n_rows,
        n_rows_apr_missing, n_rows_carpet_defaulted, "package calculation complete"
    );
    Ok(summary)
}
