//! Stateless helper utilities used by the XLSX reader and writer kernels.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{AnyValue, Column, IntoColumn, NamedFrom, Series};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{
    EnumCellValue, SpecBandStylePlan, SpecSheetVerticalMerge, SpecValueBand, XlsxReportError,
};

////////////////////////////////////////////////////////////////////////////////
// #region DataFrameLikeUtils

/// Make header names unique: later duplicates get `.1`, `.2`, ... and blank
/// headers become `Unnamed: <index>`.
pub fn derive_unique_column_names(headers: &[String]) -> Vec<String> {
    let mut set_names_seen: BTreeSet<String> = BTreeSet::new();
    let mut dict_dup_counter: BTreeMap<String, usize> = BTreeMap::new();
    let mut l_names = Vec::with_capacity(headers.len());

    for (n_idx, c_header) in headers.iter().enumerate() {
        let c_base = if c_header.trim().is_empty() {
            format!("Unnamed: {n_idx}")
        } else {
            c_header.clone()
        };

        let mut c_name = c_base.clone();
        while set_names_seen.contains(&c_name) {
            let n_dup = dict_dup_counter.entry(c_base.clone()).or_insert(0);
            *n_dup += 1;
            c_name = format!("{c_base}.{n_dup}");
        }
        set_names_seen.insert(c_name.clone());
        l_names.push(c_name);
    }

    l_names
}

/// Resolve mixed refs (`name` or numeric string index) to sorted unique indices.
pub fn select_sorted_indices_from_refs(
    columns: &[String],
    refs: &[String],
) -> Result<Vec<usize>, String> {
    let mut set_idx = BTreeSet::new();
    for ref_col in refs {
        if let Ok(n_idx) = ref_col.parse::<usize>() {
            set_idx.insert(n_idx);
            continue;
        }

        let Some(n_idx) = columns.iter().position(|c_name| c_name == ref_col) else {
            return Err(format!("Column not found: {ref_col:?}"));
        };
        set_idx.insert(n_idx);
    }

    Ok(set_idx.into_iter().collect())
}

/// Read every value of `col` as normalized cell values.
pub fn derive_cell_values_from_column(col: &Column) -> Result<Vec<EnumCellValue>, XlsxReportError> {
    let mut l_values = Vec::with_capacity(col.len());
    for n_idx_row in 0..col.len() {
        let value = col.get(n_idx_row)?;
        l_values.push(derive_cell_value_from_any_value(value));
    }
    Ok(l_values)
}

/// Largest magnitude at which every whole `f64` is still an exact `i64`.
const N_F64_EXACT_INT_MAX: f64 = 9_007_199_254_740_992.0;

/// Build the typed polars view of one column.
///
/// Whole numbers without gaps give `Int64`, numbers with gaps `Float64`, and
/// any text makes the whole view `String`. The cells themselves are not
/// altered; this only affects the table view.
pub fn derive_column_from_cells(name: &str, cells: &[EnumCellValue]) -> Column {
    let if_has_text = cells
        .iter()
        .any(|cell| matches!(cell, EnumCellValue::String(_)));
    let if_has_missing = cells.iter().any(|cell| matches!(cell, EnumCellValue::None));

    if !if_has_text && !if_has_missing {
        let if_all_whole = cells.iter().all(|cell| match cell {
            EnumCellValue::Number(n) => n.fract() == 0.0 && n.abs() < N_F64_EXACT_INT_MAX,
            _ => false,
        });
        if if_all_whole {
            let l_values: Vec<i64> = cells
                .iter()
                .map(|cell| match cell {
                    EnumCellValue::Number(n) => *n as i64,
                    _ => 0,
                })
                .collect();
            return Series::new(name.into(), l_values).into_column();
        }
    }

    if !if_has_text {
        let l_values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| match cell {
                EnumCellValue::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), l_values).into_column();
    }

    let l_values: Vec<Option<String>> = cells
        .iter()
        .map(|cell| match cell {
            EnumCellValue::None => None,
            other => Some(other.to_display_text()),
        })
        .collect();
    Series::new(name.into(), l_values).into_column()
}

/// Map one polars value to a normalized cell value.
pub fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::String(if val { "True" } else { "False" }.to_string())
        }
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Find the first sheet whose name equals `target` ignoring case.
pub fn select_sheet_name_ci<'a>(sheet_names: &'a [String], target: &str) -> Option<&'a str> {
    let c_target = target.to_lowercase();
    sheet_names
        .iter()
        .find(|c_name| c_name.to_lowercase() == c_target)
        .map(String::as_str)
}

/// Reject tables that cannot fit one worksheet.
pub fn validate_sheet_dimensions(
    height_df: usize,
    width_df: usize,
    height_header: usize,
) -> Result<(), XlsxReportError> {
    let n_rows_data_max = N_NROWS_EXCEL_MAX.saturating_sub(height_header);
    if height_df > n_rows_data_max || width_df > N_NCOLS_EXCEL_MAX {
        return Err(XlsxReportError::DimensionOverflow {
            n_rows: height_df,
            n_cols: width_df,
        });
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region BandGrouping

/// Partition `values` into maximal runs of equal adjacent values.
///
/// `row_first` is the row number assigned to `values[0]`; band bounds are
/// inclusive. Bands are contiguous, non-overlapping and cover
/// `row_first..row_first + values.len()` exactly.
pub fn derive_value_bands(values: &[EnumCellValue], row_first: usize) -> Vec<SpecValueBand> {
    let mut l_bands = Vec::new();

    // `None` is the sentinel: it never equals a real value.
    let mut value_current: Option<&EnumCellValue> = None;
    let mut n_row_start = row_first;

    // One extra virtual step past the last value flushes the final band.
    for n_idx in 0..=values.len() {
        let n_row = row_first + n_idx;
        let value_next = values.get(n_idx);

        let if_boundary = match (value_current, value_next) {
            (Some(cur), Some(next)) => !cur.is_same_band_value(next),
            (None, Some(_)) => true,
            (_, None) => true,
        };
        if !if_boundary {
            continue;
        }

        if let Some(cur) = value_current {
            l_bands.push(SpecValueBand {
                value: cur.clone(),
                row_start: n_row_start,
                row_end: n_row - 1,
            });
        }
        value_current = value_next;
        n_row_start = n_row;
    }

    l_bands
}

/// Build merge and fill instructions for the location/property columns.
///
/// `values_by_col` holds every column's data values in sheet order;
/// `row_idx_first` is the zero-based worksheet row of the first data row.
/// The merge-only column gets merges; the colored column gets merges plus
/// a palette index per band (advancing once per band) spread over its rows.
pub fn plan_band_styles(
    values_by_col: &[Vec<EnumCellValue>],
    row_idx_first: usize,
    col_idx_merge_only: Option<usize>,
    col_idx_merge_colored: Option<usize>,
) -> SpecBandStylePlan {
    let n_rows = values_by_col.first().map_or(0, Vec::len);
    let mut plan = SpecBandStylePlan {
        merges: vec![],
        fill_idx_by_row: vec![None; n_rows],
        n_bands_colored: 0,
    };

    let mut l_cols_planned: Vec<(usize, bool)> = Vec::new();
    if let Some(n_col) = col_idx_merge_only
        && col_idx_merge_colored != Some(n_col)
    {
        l_cols_planned.push((n_col, false));
    }
    if let Some(n_col) = col_idx_merge_colored {
        l_cols_planned.push((n_col, true));
    }

    for (n_col, if_colored) in l_cols_planned {
        let Some(values) = values_by_col.get(n_col) else {
            continue;
        };

        for (n_idx_band, band) in derive_value_bands(values, row_idx_first)
            .into_iter()
            .enumerate()
        {
            if if_colored {
                for n_row_idx in band.row_start..=band.row_end {
                    plan.fill_idx_by_row[n_row_idx - row_idx_first] = Some(n_idx_band);
                }
                plan.n_bands_colored += 1;
            }
            if band.if_merge() {
                plan.merges.push(SpecSheetVerticalMerge {
                    col_idx: n_col,
                    row_idx_start: band.row_start,
                    row_idx_end: band.row_end,
                    value: band.value,
                });
            }
        }
    }

    plan
}

/// Build lookup map for cells covered by a vertical merge (excluding anchor).
pub fn derive_vertical_merge_tracker(
    merges: &[SpecSheetVerticalMerge],
) -> BTreeSet<(usize, usize)> {
    let mut set_merged_cells = BTreeSet::new();
    for merge in merges {
        for n_row_idx in (merge.row_idx_start + 1)..=merge.row_idx_end {
            set_merged_cells.insert((n_row_idx, merge.col_idx));
        }
    }
    set_merged_cells
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use polars::prelude::DataType;

    use super::*;

    fn cells(values: &[&str]) -> Vec<EnumCellValue> {
        values
            .iter()
            .map(|v| EnumCellValue::String(v.to_string()))
            .collect()
    }

    fn band(value: &str, row_start: usize, row_end: usize) -> SpecValueBand {
        SpecValueBand {
            value: EnumCellValue::String(value.to_string()),
            row_start,
            row_end,
        }
    }

    #[test]
    fn test_derive_value_bands_on_sheet_rows() {
        let l_bands = derive_value_bands(&cells(&["A", "A", "B", "B", "B", "C"]), 2);
        assert_eq!(
            l_bands,
            vec![band("A", 2, 3), band("B", 4, 6), band("C", 7, 7)]
        );
    }

    #[test]
    fn test_derive_value_bands_edge_cases() {
        assert!(derive_value_bands(&[], 2).is_empty());

        assert_eq!(
            derive_value_bands(&cells(&["X", "X", "X"]), 2),
            vec![band("X", 2, 4)]
        );

        let l_bands = derive_value_bands(&cells(&["a", "b", "c", "d"]), 2);
        assert_eq!(l_bands.len(), 4);
        assert!(l_bands.iter().all(|b| b.n_rows() == 1 && !b.if_merge()));
    }

    #[test]
    fn test_derive_value_bands_reopens_repeated_values() {
        let l_bands = derive_value_bands(&cells(&["A", "B", "A", "A"]), 0);
        assert_eq!(
            l_bands,
            vec![band("A", 0, 0), band("B", 1, 1), band("A", 2, 3)]
        );
    }

    #[test]
    fn test_derive_value_bands_partitions_every_row() {
        let values = vec![
            EnumCellValue::Number(1.0),
            EnumCellValue::Number(1.0),
            EnumCellValue::String("1".to_string()),
            EnumCellValue::None,
            EnumCellValue::None,
            EnumCellValue::Number(2.0),
            EnumCellValue::String("x".to_string()),
            EnumCellValue::String("x".to_string()),
        ];
        let l_bands = derive_value_bands(&values, 2);

        assert_eq!(
            l_bands.iter().map(SpecValueBand::n_rows).sum::<usize>(),
            values.len()
        );
        assert_eq!(l_bands.first().map(|b| b.row_start), Some(2));
        assert_eq!(l_bands.last().map(|b| b.row_end), Some(9));
        for pair in l_bands.windows(2) {
            assert_eq!(pair[0].row_end + 1, pair[1].row_start);
        }
        // numeric 1 and text "1" stay in separate bands
        assert_eq!(l_bands[0].n_rows(), 2);
        assert_eq!(l_bands[1].value, EnumCellValue::String("1".to_string()));
    }

    #[test]
    fn test_plan_band_styles_cycles_palette_per_band() {
        let col_location = cells(&["L"; 9]);
        let col_property = cells(&["p0", "p1", "p1", "p2", "p3", "p4", "p5", "p6", "p7"]);
        let plan = plan_band_styles(&[col_location, col_property], 1, Some(0), Some(1));

        assert_eq!(plan.n_bands_colored, 8);
        assert_eq!(
            plan.fill_idx_by_row,
            vec![
                Some(0),
                Some(1),
                Some(1),
                Some(2),
                Some(3),
                Some(4),
                Some(5),
                Some(6),
                Some(7)
            ]
        );
        assert_eq!(
            plan.merges,
            vec![
                SpecSheetVerticalMerge {
                    col_idx: 0,
                    row_idx_start: 1,
                    row_idx_end: 9,
                    value: EnumCellValue::String("L".to_string()),
                },
                SpecSheetVerticalMerge {
                    col_idx: 1,
                    row_idx_start: 2,
                    row_idx_end: 3,
                    value: EnumCellValue::String("p1".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_plan_band_styles_single_column_sheet() {
        let plan = plan_band_styles(&[cells(&["A", "A"])], 1, Some(0), Some(1));
        assert_eq!(plan.merges.len(), 1);
        assert_eq!(plan.n_bands_colored, 0);
        assert_eq!(plan.fill_idx_by_row, vec![None, None]);
    }

    #[test]
    fn test_plan_band_styles_same_column_configured_twice() {
        let plan = plan_band_styles(&[cells(&["A", "A", "B"])], 1, Some(0), Some(0));
        assert_eq!(plan.merges.len(), 1);
        assert_eq!(plan.fill_idx_by_row, vec![Some(0), Some(0), Some(1)]);
    }

    #[test]
    fn test_derive_vertical_merge_tracker_skips_anchor() {
        let merges = vec![SpecSheetVerticalMerge {
            col_idx: 1,
            row_idx_start: 2,
            row_idx_end: 4,
            value: EnumCellValue::None,
        }];
        let set_cells = derive_vertical_merge_tracker(&merges);
        assert!(!set_cells.contains(&(2, 1)));
        assert!(set_cells.contains(&(3, 1)));
        assert!(set_cells.contains(&(4, 1)));
        assert_eq!(set_cells.len(), 2);
    }

    #[test]
    fn test_derive_unique_column_names() {
        let headers = vec![
            "Location".to_string(),
            "".to_string(),
            "Location".to_string(),
            "Location".to_string(),
        ];
        assert_eq!(
            derive_unique_column_names(&headers),
            vec!["Location", "Unnamed: 1", "Location.1", "Location.2"]
        );
    }

    #[test]
    fn test_select_sheet_name_ci_and_sanitize() {
        let names = vec!["Summary".to_string(), "REPORT".to_string()];
        assert_eq!(select_sheet_name_ci(&names, "report"), Some("REPORT"));
        assert_eq!(select_sheet_name_ci(&names, "reports"), None);
        assert_eq!(sanitize_sheet_name(" a/b:c ", "_"), "a_b_c");
    }

    #[test]
    fn test_validate_sheet_dimensions() {
        assert!(validate_sheet_dimensions(10, 5, 1).is_ok());
        assert!(validate_sheet_dimensions(N_NROWS_EXCEL_MAX, 5, 1).is_err());
        assert!(validate_sheet_dimensions(1, N_NCOLS_EXCEL_MAX + 1, 1).is_err());
    }

    #[test]
    fn column_typing_follows_cell_mix() {
        let col = derive_column_from_cells(
            "Count of Property",
            &[EnumCellValue::Number(2.0), EnumCellValue::Number(3.0)],
        );
        assert_eq!(col.dtype(), &DataType::Int64);

        let col = derive_column_from_cells(
            "Average of APR",
            &[EnumCellValue::Number(9500.5), EnumCellValue::None],
        );
        assert_eq!(col.dtype(), &DataType::Float64);
        assert_eq!(col.null_count(), 1);

        let col = derive_column_from_cells(
            "Carpet Area(SQ.FT)",
            &[
                EnumCellValue::String("650-700".to_string()),
                EnumCellValue::Number(800.0),
            ],
        );
        assert_eq!(col.dtype(), &DataType::String);
    }
}
