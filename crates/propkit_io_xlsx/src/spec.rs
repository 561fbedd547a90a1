//! Shared XLSX specification models.

use polars::prelude::{Column, DataFrame, PolarsError};
use thiserror::Error;

use crate::conf::{
    C_SHEET_NAME_REPORT, N_IDX_COL_LOCATION, N_IDX_COL_PROPERTY, N_WIDTH_REPORT_COLUMN,
};
use crate::util::{derive_cell_values_from_column, derive_column_from_cells};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification, converted to `rust_xlsxwriter::Format` at write time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
        }
    }
}

/// Normalized cell value during read/group/write pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Band equality: numbers compare numerically (NaN equals NaN), text by
    /// exact content, missing equals missing. A number never equals text.
    pub fn is_same_band_value(&self, other: &EnumCellValue) -> bool {
        match (self, other) {
            (EnumCellValue::None, EnumCellValue::None) => true,
            (EnumCellValue::String(a), EnumCellValue::String(b)) => a == b,
            (EnumCellValue::Number(a), EnumCellValue::Number(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            _ => false,
        }
    }

    /// Text shown for this value inside a merged range.
    pub fn to_display_text(&self) -> String {
        match self {
            EnumCellValue::None => String::new(),
            EnumCellValue::String(s) => s.clone(),
            EnumCellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region BandSpecification

/// Maximal contiguous run of rows sharing one value in a grouping column.
///
/// `row_start`/`row_end` are inclusive and expressed in whatever row numbering
/// the caller passed as `row_first` to [`crate::util::derive_value_bands`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpecValueBand {
    /// Shared cell value.
    pub value: EnumCellValue,
    /// First row of the band (inclusive).
    pub row_start: usize,
    /// Last row of the band (inclusive).
    pub row_end: usize,
}

impl SpecValueBand {
    /// Number of rows covered.
    pub fn n_rows(&self) -> usize {
        self.row_end - self.row_start + 1
    }

    /// Only multi-row bands produce a merge instruction.
    pub fn if_merge(&self) -> bool {
        self.n_rows() > 1
    }
}

/// Vertical merge plan item for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetVerticalMerge {
    /// Zero-based column index.
    pub col_idx: usize,
    /// Zero-based worksheet row where the merge starts.
    pub row_idx_start: usize,
    /// Zero-based worksheet row where the merge ends (inclusive).
    pub row_idx_end: usize,
    /// Merged cell value.
    pub value: EnumCellValue,
}

/// Styling plan derived from band grouping, consumed by the writer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecBandStylePlan {
    /// Merge instructions (multi-row bands only).
    pub merges: Vec<SpecSheetVerticalMerge>,
    /// Colored-band index per data row (palette color is `idx % 7`);
    /// `None` when no colored column exists.
    pub fill_idx_by_row: Vec<Option<usize>>,
    /// Number of colored bands.
    pub n_bands_colored: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Per-sheet options for the styled report write.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecReportSheetOptions {
    /// Target sheet name (sanitized before use).
    pub sheet_name: String,
    /// Width applied to every column.
    pub width_column: f64,
    /// Column merged by value bands without fill.
    pub col_idx_merge_only: Option<usize>,
    /// Column merged by value bands and color-banded across the row.
    pub col_idx_merge_colored: Option<usize>,
    /// Columns forced to the integer number format.
    pub cols_integer: Vec<String>,
}

impl Default for SpecReportSheetOptions {
    fn default() -> Self {
        Self {
            sheet_name: C_SHEET_NAME_REPORT.to_string(),
            width_column: N_WIDTH_REPORT_COLUMN,
            col_idx_merge_only: Some(N_IDX_COL_LOCATION),
            col_idx_merge_colored: Some(N_IDX_COL_PROPERTY),
            cols_integer: vec![],
        }
    }
}

/// Resolved styling of one report sheet, computed before anything is written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecReportSheetLayout {
    /// Format of every header cell.
    pub fmt_header: SpecCellFormat,
    /// Format of every body cell, indexed `[data row][column]`. A merged
    /// range takes the format of its first row.
    pub fmt_by_row: Vec<Vec<SpecCellFormat>>,
    /// Merges and fills the formats were derived from.
    pub plan: SpecBandStylePlan,
    /// Non-fatal warnings raised while resolving formats.
    pub warnings: Vec<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReadSpecification

/// Report sheet: per-cell values plus their typed polars view.
///
/// `cells_by_col` keeps every cell's own type, so one column may mix numbers
/// and text. `df` is derived from it (a mixed column becomes `String`) and is
/// kept in step by the methods below; mutate columns through them.
#[derive(Debug, Clone)]
pub struct SpecReportSheet {
    /// All sheet names in workbook order.
    pub sheet_names: Vec<String>,
    /// Actual (original casing) name of the sheet that was loaded.
    pub sheet_name: String,
    /// Typed table view, one column per header cell.
    pub df: DataFrame,
    /// Cell values in column order, each with its own type.
    pub cells_by_col: Vec<Vec<EnumCellValue>>,
    /// Non-fatal warnings raised while loading.
    pub warnings: Vec<String>,
}

impl SpecReportSheet {
    /// Build from header names and per-column cells.
    pub fn from_cells(
        colnames: &[String],
        cells_by_col: Vec<Vec<EnumCellValue>>,
    ) -> Result<Self, XlsxReportError> {
        let l_columns: Vec<Column> = colnames
            .iter()
            .zip(cells_by_col.iter())
            .map(|(c_name, cells)| derive_column_from_cells(c_name, cells))
            .collect();
        Ok(Self {
            sheet_names: vec![],
            sheet_name: C_SHEET_NAME_REPORT.to_string(),
            df: DataFrame::new(l_columns)?,
            cells_by_col,
            warnings: vec![],
        })
    }

    /// Build from an existing table; cell types follow each column's dtype.
    pub fn from_dataframe(df: DataFrame) -> Result<Self, XlsxReportError> {
        let cells_by_col = df
            .get_columns()
            .iter()
            .map(derive_cell_values_from_column)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            sheet_names: vec![],
            sheet_name: C_SHEET_NAME_REPORT.to_string(),
            df,
            cells_by_col,
            warnings: vec![],
        })
    }

    /// Header names in column order.
    pub fn colnames(&self) -> Vec<String> {
        self.df
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Cells of the column named `name`.
    pub fn column_cells(&self, name: &str) -> Option<&[EnumCellValue]> {
        self.df
            .get_column_index(name)
            .and_then(|n_idx| self.cells_by_col.get(n_idx))
            .map(Vec::as_slice)
    }

    /// Remove the column named `name`. Returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> Result<bool, XlsxReportError> {
        let Some(n_idx) = self.df.get_column_index(name) else {
            return Ok(false);
        };
        self.df.drop_in_place(name)?;
        self.cells_by_col.remove(n_idx);
        Ok(true)
    }

    /// Insert a column built from `cells` at position `idx`.
    pub fn insert_column(
        &mut self,
        idx: usize,
        name: &str,
        cells: Vec<EnumCellValue>,
    ) -> Result<(), XlsxReportError> {
        self.df
            .insert_column(idx, derive_column_from_cells(name, &cells))?;
        self.cells_by_col.insert(idx, cells);
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheet name actually written.
    pub sheet_name: String,
    /// Data rows written (header excluded).
    pub n_rows: usize,
    /// Columns written.
    pub n_cols: usize,
    /// Merge ranges emitted.
    pub n_merges: usize,
    /// Property bands that received a fill.
    pub n_bands_colored: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} sheet={} rows={} cols={} merges={} bands_colored={} warnings={}",
            self.sheet_name,
            self.n_rows,
            self.n_cols,
            self.n_merges,
            self.n_bands_colored,
            self.warnings.len()
        )
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures of the XLSX read/write kernel.
#[derive(Debug, Error)]
pub enum XlsxReportError {
    /// Input bytes or file are not a readable workbook.
    #[error("failed to open workbook: {0}")]
    Open(String),
    /// No sheet matched the requested name (case-insensitive).
    #[error("could not find a sheet named '{requested}' (available: {available:?})")]
    SheetNotFound {
        /// Requested sheet name.
        requested: String,
        /// Sheet names present in the workbook.
        available: Vec<String>,
    },
    /// Sheet exists but could not be decoded.
    #[error("failed to read sheet '{sheet}': {message}")]
    SheetRead {
        /// Sheet name.
        sheet: String,
        /// Underlying reader error text.
        message: String,
    },
    /// Building the in-memory table failed.
    #[error("table error: {0}")]
    Table(#[from] PolarsError),
    /// Table shape exceeds worksheet limits.
    #[error("table too large for one worksheet: {n_rows} rows x {n_cols} columns")]
    DimensionOverflow {
        /// Data rows requested.
        n_rows: usize,
        /// Columns requested.
        n_cols: usize,
    },
    /// Writer failed to emit a cell, merge, or the workbook itself.
    #[error("xlsx write error: {0}")]
    Write(String),
    /// Writer used after its workbook was finalized.
    #[error("cannot write after close()")]
    Closed,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
