//! XLSX reader kernel that loads one report sheet as typed cells plus a DataFrame view.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use tracing::{debug, warn};

use crate::spec::{EnumCellValue, SpecReportSheet, XlsxReportError};
use crate::util::{derive_unique_column_names, select_sheet_name_ci};

/// Read the sheet named `sheet_name` (case-insensitive) from an `.xlsx` file.
pub fn read_report_sheet_from_path(
    path_file_in: &Path,
    sheet_name: &str,
) -> Result<SpecReportSheet, XlsxReportError> {
    let v_bytes = std::fs::read(path_file_in)
        .map_err(|err| XlsxReportError::Open(format!("{}: {err}", path_file_in.display())))?;
    read_report_sheet_from_bytes(&v_bytes, sheet_name)
}

/// Read the sheet named `sheet_name` (case-insensitive) from in-memory `.xlsx` bytes.
///
/// The first used row is the header. Columns keep their sheet position: blank
/// leading columns load as `Unnamed: <index>`. Every cell keeps its own type
/// in `cells_by_col`; see [`crate::util::derive_column_from_cells`] for the
/// table view.
pub fn read_report_sheet_from_bytes(
    v_xlsx: &[u8],
    sheet_name: &str,
) -> Result<SpecReportSheet, XlsxReportError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(v_xlsx)).map_err(|err| XlsxReportError::Open(err.to_string()))?;

    let l_sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let Some(c_sheet_name) = select_sheet_name_ci(&l_sheet_names, sheet_name).map(str::to_string)
    else {
        return Err(XlsxReportError::SheetNotFound {
            requested: sheet_name.to_string(),
            available: l_sheet_names,
        });
    };

    let range = workbook
        .worksheet_range(&c_sheet_name)
        .map_err(|err| XlsxReportError::SheetRead {
            sheet: c_sheet_name.clone(),
            message: err.to_string(),
        })?;

    // Columns are anchored at column A; rows start at the first used row.
    let n_cols_leading_blank = range.start().map_or(0, |(_, n_col)| n_col as usize);

    let mut warnings = Vec::new();
    let mut iter_rows = range.rows();
    let mut l_headers: Vec<String> = vec![String::new(); n_cols_leading_blank];
    if let Some(row) = iter_rows.next() {
        l_headers.extend(row.iter().map(derive_header_text_from_data));
    }
    let l_colnames = derive_unique_column_names(&l_headers);
    if l_colnames != l_headers {
        warnings.push("Blank or duplicate header names were renamed.".to_string());
    }

    let mut l_cells_by_col: Vec<Vec<EnumCellValue>> = vec![Vec::new(); l_colnames.len()];
    let mut n_cells_error = 0usize;
    for row in iter_rows {
        for cells in l_cells_by_col.iter_mut().take(n_cols_leading_blank) {
            cells.push(EnumCellValue::None);
        }
        for (n_idx_col, cell) in row.iter().enumerate() {
            if matches!(cell, Data::Error(_)) {
                n_cells_error += 1;
            }
            if let Some(cells) = l_cells_by_col.get_mut(n_cols_leading_blank + n_idx_col) {
                cells.push(derive_cell_value_from_data(cell));
            }
        }
    }
    if n_cells_error > 0 {
        warn!(sheet = %c_sheet_name, n_cells_error, "error cells read as missing");
        warnings.push(format!(
            "{n_cells_error} error cell(s) (e.g. #N/A) were read as missing values."
        ));
    }

    let mut sheet = SpecReportSheet::from_cells(&l_colnames, l_cells_by_col)?;
    sheet.sheet_names = l_sheet_names;
    sheet.sheet_name = c_sheet_name;
    sheet.warnings = warnings;

    debug!(
        sheet = %sheet.sheet_name,
        n_rows = sheet.df.height(),
        n_cols = sheet.df.width(),
        n_cols_leading_blank,
        "report sheet loaded"
    );
    Ok(sheet)
}

fn derive_header_text_from_data(cell: &Data) -> String {
    match derive_cell_value_from_data(cell) {
        EnumCellValue::None => String::new(),
        other => other.to_display_text().trim().to_string(),
    }
}

fn derive_cell_value_from_data(cell: &Data) -> EnumCellValue {
    match cell {
        Data::Empty | Data::Error(_) => EnumCellValue::None,
        Data::String(val) if val.is_empty() => EnumCellValue::None,
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Bool(val) => EnumCellValue::String(if *val { "True" } else { "False" }.to_string()),
        Data::DateTime(val) => match val.as_datetime() {
            Some(dt) => EnumCellValue::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => EnumCellValue::Number(val.as_f64()),
        },
        Data::DateTimeIso(val) | Data::DurationIso(val) => EnumCellValue::String(val.clone()),
    }
}
