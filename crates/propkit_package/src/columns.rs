//! Fragment-based, case-insensitive column resolution.

use tracing::debug;

use crate::spec::{EnumReportField, PackageError, SpecResolvedColumns, TUP_FIELD_RULES};

/// Return the first column whose lowercased name contains `fragment`.
///
/// `fragment` must already be lowercase. Original casing is preserved in the
/// returned name.
pub fn resolve_column<'a>(columns: &'a [String], fragment: &str) -> Option<&'a str> {
    columns
        .iter()
        .find(|c_name| c_name.to_lowercase().contains(fragment))
        .map(String::as_str)
}

/// Resolve every entry of [`TUP_FIELD_RULES`] against `columns`.
///
/// Fails only when a required field has no match; the error lists all of
/// them at once.
pub fn resolve_report_columns(columns: &[String]) -> Result<SpecResolvedColumns, PackageError> {
    let mut col_carpet = None;
    let mut col_apr = None;
    let mut col_count = None;
    let mut l_missing = Vec::new();

    for rule in TUP_FIELD_RULES {
        let matched = resolve_column(columns, rule.fragment).map(str::to_string);
        debug!(field = %rule.field, fragment = rule.fragment, matched = ?matched, "resolve column");
        if matched.is_none() && rule.if_required {
            l_missing.push(rule.field);
        }
        match rule.field {
            EnumReportField::CarpetArea => col_carpet = matched,
            EnumReportField::AverageApr => col_apr = matched,
            EnumReportField::CountOfProperty => col_count = matched,
        }
    }

    let (Some(col_carpet), Some(col_apr)) = (col_carpet, col_apr) else {
        return Err(PackageError::MissingColumns { missing: l_missing });
    };
    Ok(SpecResolvedColumns {
        col_carpet,
        col_apr,
        col_count,
    })
}
