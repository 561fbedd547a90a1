//! XLSX writer kernel that renders a report sheet as a styled, band-merged worksheet.

use std::collections::{BTreeSet, HashMap};

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::conf::{EnumFmtKey, derive_band_fill_patch, derive_default_report_formats};
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecReportSheet, SpecReportSheetLayout, SpecReportSheetOptions,
    SpecXlsxReport, XlsxReportError,
};
use crate::util::{
    derive_vertical_merge_tracker, plan_band_styles, sanitize_sheet_name,
    select_sorted_indices_from_refs, validate_sheet_dimensions,
};

/// Header occupies exactly one worksheet row.
const N_ROWS_HEADER: usize = 1;

/// Stateful single-report workbook writer.
///
/// The workbook is buffered in memory until [`Self::save_to_buffer`] is called.
pub struct XlsxWriter {
    workbook: Workbook,
    fmt_text: SpecCellFormat,
    fmt_integer: SpecCellFormat,
    fmt_number: SpecCellFormat,
    fmt_header: SpecCellFormat,
    if_closed: bool,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        let dict_fmt = derive_default_report_formats();
        let fmt_of = |key: EnumFmtKey| dict_fmt.get(&key).cloned().unwrap_or_default();
        Self {
            workbook: Workbook::new(),
            fmt_text: fmt_of(EnumFmtKey::Text),
            fmt_integer: fmt_of(EnumFmtKey::Integer),
            fmt_number: fmt_of(EnumFmtKey::Number),
            fmt_header: fmt_of(EnumFmtKey::Header),
            if_closed: false,
        }
    }
}

impl XlsxWriter {
    /// Serialize the workbook. Further writes are rejected afterwards.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, XlsxReportError> {
        let v_xlsx = self
            .workbook
            .save_to_buffer()
            .map_err(derive_xlsx_error)?;
        self.if_closed = true;
        Ok(v_xlsx)
    }

    /// Resolve the format of every header and body cell of `sheet`.
    ///
    /// Column base formats follow the typed view: integer columns (or ones
    /// named in `cols_integer`) get `0`, other numeric columns stay general,
    /// everything else is text. Rows of a colored band get the band fill
    /// across all columns.
    pub fn plan_report_sheet(
        &self,
        sheet: &SpecReportSheet,
        options: &SpecReportSheetOptions,
    ) -> Result<SpecReportSheetLayout, XlsxReportError> {
        let l_colnames = sheet.colnames();
        let n_width = l_colnames.len();
        let n_height = sheet.df.height();
        validate_sheet_dimensions(n_height, n_width, N_ROWS_HEADER)?;

        let mut warnings = Vec::new();
        let set_cols_idx_integer_forced: BTreeSet<usize> =
            select_sorted_indices_from_refs(&l_colnames, &options.cols_integer)
                .unwrap_or_else(|msg| {
                    warnings.push(format!("Integer format skipped: {msg}"));
                    vec![]
                })
                .into_iter()
                .collect();

        let l_fmt_by_col: Vec<&SpecCellFormat> = sheet
            .df
            .get_columns()
            .iter()
            .enumerate()
            .map(|(n_idx_col, col)| {
                if set_cols_idx_integer_forced.contains(&n_idx_col) || col.dtype().is_integer() {
                    &self.fmt_integer
                } else if col.dtype().is_numeric() {
                    &self.fmt_number
                } else {
                    &self.fmt_text
                }
            })
            .collect();

        let plan = plan_band_styles(
            &sheet.cells_by_col,
            N_ROWS_HEADER,
            options.col_idx_merge_only,
            options.col_idx_merge_colored,
        );

        let fmt_by_row: Vec<Vec<SpecCellFormat>> = plan
            .fill_idx_by_row
            .iter()
            .map(|idx_fill| {
                let patch_fill = idx_fill.map(derive_band_fill_patch);
                l_fmt_by_col
                    .iter()
                    .map(|fmt_col| match &patch_fill {
                        Some(patch) => fmt_col.merge(patch),
                        None => (*fmt_col).clone(),
                    })
                    .collect()
            })
            .collect();

        Ok(SpecReportSheetLayout {
            fmt_header: self.fmt_header.clone(),
            fmt_by_row,
            plan,
            warnings,
        })
    }

    /// Write `sheet` as the workbook's report sheet.
    ///
    /// Every header and body cell is centered with a thin border. Value bands
    /// of the merge-only column are merged; value bands of the colored column
    /// are merged and each band's rows are filled across all columns with the
    /// next palette color. Cells are written with their own type, so a text
    /// `"650"` and a number `650` in one column stay distinct.
    pub fn write_report_sheet(
        &mut self,
        sheet: &SpecReportSheet,
        options: &SpecReportSheetOptions,
    ) -> Result<SpecXlsxReport, XlsxReportError> {
        if self.if_closed {
            return Err(XlsxReportError::Closed);
        }

        let layout = self.plan_report_sheet(sheet, options)?;
        let l_colnames = sheet.colnames();
        let n_width = l_colnames.len();
        let set_cells_merged = derive_vertical_merge_tracker(&layout.plan.merges);

        let report = SpecXlsxReport {
            sheet_name: sanitize_sheet_name(&options.sheet_name, "_"),
            n_rows: sheet.df.height(),
            n_cols: n_width,
            n_merges: layout.plan.merges.len(),
            n_bands_colored: layout.plan.n_bands_colored,
            warnings: layout.warnings,
        };

        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&report.sheet_name)
            .map_err(derive_xlsx_error)?;

        let mut cache_fmt = FormatCache::default();

        let fmt_header = cache_fmt.resolve(&layout.fmt_header);
        for (n_idx_col, c_name) in l_colnames.iter().enumerate() {
            worksheet
                .write_string_with_format(0, cast_col_num(n_idx_col)?, c_name, &fmt_header)
                .map_err(derive_xlsx_error)?;
        }

        for (n_row_local, l_fmt_row) in layout.fmt_by_row.iter().enumerate() {
            let n_row_idx = N_ROWS_HEADER + n_row_local;
            for (n_idx_col, fmt_spec) in l_fmt_row.iter().enumerate() {
                if set_cells_merged.contains(&(n_row_idx, n_idx_col)) {
                    continue;
                }
                write_cell_with_format(
                    worksheet,
                    n_row_idx,
                    n_idx_col,
                    &sheet.cells_by_col[n_idx_col][n_row_local],
                    &cache_fmt.resolve(fmt_spec),
                )?;
            }
        }

        for merge in &layout.plan.merges {
            let fmt_merge = cache_fmt
                .resolve(&layout.fmt_by_row[merge.row_idx_start - N_ROWS_HEADER][merge.col_idx]);

            worksheet
                .merge_range(
                    cast_row_num(merge.row_idx_start)?,
                    cast_col_num(merge.col_idx)?,
                    cast_row_num(merge.row_idx_end)?,
                    cast_col_num(merge.col_idx)?,
                    &merge.value.to_display_text(),
                    &fmt_merge,
                )
                .map_err(derive_xlsx_error)?;

            // merge_range only stores text; numbers are re-written over the anchor.
            if let EnumCellValue::Number(_) = merge.value {
                write_cell_with_format(
                    worksheet,
                    merge.row_idx_start,
                    merge.col_idx,
                    &merge.value,
                    &fmt_merge,
                )?;
            }
        }

        for n_idx_col in 0..n_width {
            worksheet
                .set_column_width(cast_col_num(n_idx_col)?, options.width_column)
                .map_err(derive_xlsx_error)?;
        }

        debug!(summary = %report.format("[XLSX]"), "report sheet written");
        Ok(report)
    }
}

/// Render `sheet` as a single-sheet styled report workbook.
pub fn write_report_xlsx_bytes(
    sheet: &SpecReportSheet,
    options: &SpecReportSheetOptions,
) -> Result<(Vec<u8>, SpecXlsxReport), XlsxReportError> {
    let mut writer = XlsxWriter::default();
    let report = writer.write_report_sheet(sheet, options)?;
    let v_xlsx = writer.save_to_buffer()?;
    Ok((v_xlsx, report))
}

/// Converted `Format` objects keyed by their spec; each distinct
/// base/fill combination is built once per sheet.
#[derive(Default)]
struct FormatCache {
    dict_fmt: HashMap<SpecCellFormat, Format>,
}

impl FormatCache {
    fn resolve(&mut self, spec: &SpecCellFormat) -> Format {
        self.dict_fmt
            .entry(spec.clone())
            .or_insert_with(|| derive_rust_xlsx_format(spec))
            .clone()
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxReportError> {
    match value {
        EnumCellValue::Number(val) if val.is_finite() => {
            worksheet
                .write_number_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    *val,
                    format,
                )
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    val,
                    format,
                )
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::None | EnumCellValue::Number(_) => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxReportError> {
    u32::try_from(value).map_err(|_| XlsxReportError::Write(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, XlsxReportError> {
    u16::try_from(value)
        .map_err(|_| XlsxReportError::Write(format!("column index overflow: {value}")))
}

fn derive_xlsx_error(err: XlsxError) -> XlsxReportError {
    XlsxReportError::Write(err.to_string())
}
