//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Sheet name looked up (case-insensitively) in the input and written to the output.
pub const C_SHEET_NAME_REPORT: &str = "Report";
/// Fixed width applied to every report column.
pub const N_WIDTH_REPORT_COLUMN: f64 = 20.0;
/// Zero-based index of the location column (merged, never filled).
pub const N_IDX_COL_LOCATION: usize = 0;
/// Zero-based index of the property column (merged and color-banded).
pub const N_IDX_COL_PROPERTY: usize = 1;

/// Cyclic fill palette for property bands. Band `k` uses entry `k % 7`.
pub const TUP_BAND_FILL_PALETTE: [&str; 7] = [
    "#FFF2CC", "#DDEBF7", "#E2EFDA", "#FCE4D6", "#EDE7F6", "#D9F2F2", "#F2F2F2",
];

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumFmtKey {
    /// Generic text cell format.
    Text,
    /// Integer number format.
    Integer,
    /// Non-integer number format (Excel "General").
    Number,
    /// Header cell format.
    Header,
}

/// Build default named format presets used by [`crate::writer::XlsxWriter`].
///
/// Every preset is centered both ways with a thin border on all sides.
pub fn derive_default_report_formats() -> BTreeMap<EnumFmtKey, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_size: Some(11),
        border: Some(1),
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumFmtKey::Text, cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        EnumFmtKey::Header,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            text_wrap: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Integer,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("0".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(EnumFmtKey::Number, cfg_base_fmt_spec);

    dict_fmt
}

/// Format patch that paints a cell with palette color `idx_band % 7`.
pub fn derive_band_fill_patch(idx_band: usize) -> SpecCellFormat {
    SpecCellFormat {
        bg_color: Some(TUP_BAND_FILL_PALETTE[idx_band % TUP_BAND_FILL_PALETTE.len()].to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_formats_are_centered_and_bordered() {
        let dict_fmt = derive_default_report_formats();
        assert_eq!(dict_fmt.len(), 4);
        for fmt in dict_fmt.values() {
            assert_eq!(fmt.align.as_deref(), Some("center"));
            assert_eq!(fmt.valign.as_deref(), Some("vcenter"));
            assert_eq!(fmt.border, Some(1));
        }
        assert_eq!(dict_fmt[&EnumFmtKey::Header].bold, Some(true));
        assert_eq!(
            dict_fmt[&EnumFmtKey::Integer].num_format.as_deref(),
            Some("0")
        );
    }

    #[test]
    fn band_fill_patch_wraps_after_seven() {
        assert_eq!(
            derive_band_fill_patch(0).bg_color,
            derive_band_fill_patch(7).bg_color
        );
        assert_eq!(
            derive_band_fill_patch(3).bg_color.as_deref(),
            Some(TUP_BAND_FILL_PALETTE[3])
        );
        assert_ne!(
            derive_band_fill_patch(1).bg_color,
            derive_band_fill_patch(2).bg_color
        );
    }
}
