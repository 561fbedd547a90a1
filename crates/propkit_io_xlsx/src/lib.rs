//! `propkit_io_xlsx` v1:
//! XLSX read/write kernel for property package reports.
//!
//! Modules:
//! - `conf`   : constants, palette and default format presets
//! - `spec`   : specs/models/options/errors
//! - `util`   : pure helper functions, including band grouping
//! - `reader` : calamine-backed report sheet loader
//! - `writer` : rust_xlsxwriter-backed styled report writer
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_REPORT, N_IDX_COL_LOCATION, N_IDX_COL_PROPERTY, N_WIDTH_REPORT_COLUMN,
    TUP_BAND_FILL_PALETTE,
};
pub use reader::{read_report_sheet_from_bytes, read_report_sheet_from_path};
pub use spec::{
    EnumCellValue, SpecBandStylePlan, SpecCellFormat, SpecReportSheet, SpecReportSheetLayout,
    SpecReportSheetOptions, SpecSheetVerticalMerge, SpecValueBand, SpecXlsxReport,
    XlsxReportError,
};
pub use util::{
    derive_cell_value_from_any_value, derive_cell_values_from_column, derive_column_from_cells,
    derive_value_bands, plan_band_styles,
};
pub use writer::{XlsxWriter, write_report_xlsx_bytes};
