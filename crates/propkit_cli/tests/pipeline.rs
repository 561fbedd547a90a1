use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, Xlsx};
use propkit_cli::{
    EXIT_DELIVERY_FAILED, EXIT_SUCCESS, SpecBuildArgs, SpecPropkitConfig, prepare_smtp_mailer,
    run_build, run_inspect,
};
use propkit_mail::{DeliveryError, Mailer, Message};
use propkit_package::EnumReportField;
use rust_xlsxwriter::Workbook;

struct RecordingMailer {
    l_recipients: RefCell<Vec<String>>,
    if_fail: bool,
}

impl RecordingMailer {
    fn new(if_fail: bool) -> Self {
        Self {
            l_recipients: RefCell::new(Vec::new()),
            if_fail,
        }
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &Message) -> Result<(), DeliveryError> {
        if self.if_fail {
            return Err(DeliveryError::Transport("timed out".to_string()));
        }
        let c_raw = String::from_utf8_lossy(&message.formatted()).to_string();
        self.l_recipients.borrow_mut().push(c_raw);
        Ok(())
    }
}

fn write_listing_workbook(dir: &Path, sheet_name: &str) -> PathBuf {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).unwrap();
    let l_headers = [
        "Location",
        "Property",
        "Carpet Area(SQ.FT)",
        "Count of Property",
        "Average of APR",
    ];
    for (n_col, c_header) in l_headers.iter().enumerate() {
        worksheet.write_string(0, n_col as u16, *c_header).unwrap();
    }
    let l_rows = [
        ("Baner", "Sky Villa", "650-700", 2.0, 10000.0),
        ("Baner", "Sky Villa", "700-750", 2.0, 10000.0),
        ("Wakad", "Green Park", "1000", 1.0, 8000.0),
    ];
    for (n_idx, (c_loc, c_prop, c_carpet, n_count, n_apr)) in l_rows.iter().enumerate() {
        let n_row = n_idx as u32 + 1;
        worksheet.write_string(n_row, 0, *c_loc).unwrap();
        worksheet.write_string(n_row, 1, *c_prop).unwrap();
        worksheet.write_string(n_row, 2, *c_carpet).unwrap();
        worksheet.write_number(n_row, 3, *n_count).unwrap();
        worksheet.write_number(n_row, 4, *n_apr).unwrap();
    }
    let path = dir.join("input.xlsx");
    workbook.save(&path).unwrap();
    path
}

fn derive_config_with_sender() -> SpecPropkitConfig {
    SpecPropkitConfig::from_toml_str(
        "[smtp]\nusername = \"reports@example.com\"\npassword = \"secret\"\n",
    )
    .unwrap()
}

fn derive_build_args(dir: &Path, send_to: Option<&str>) -> SpecBuildArgs {
    SpecBuildArgs {
        input: write_listing_workbook(dir, "Report"),
        output: dir.join("out.xlsx"),
        send_to: send_to.map(str::to_string),
        n_preview: 10,
    }
}

#[test]
fn build_writes_styled_report_and_preview() {
    let dir = tempfile::tempdir().unwrap();
    let args = derive_build_args(dir.path(), None);
    let outcome = run_build(&args, &SpecPropkitConfig::default(), None).unwrap();

    assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
    assert!(outcome.delivery.is_none());
    assert_eq!(outcome.summary.col_idx_package, 3);
    assert_eq!(outcome.report.n_merges, 2);
    assert!(outcome.preview.as_deref().unwrap().contains("Package"));

    let v_out = std::fs::read(&args.output).unwrap();
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(v_out)).unwrap();
    let range = workbook.worksheet_range("Report").unwrap();
    assert_eq!(
        range.get_value((0, 3)),
        Some(&Data::String("Package".to_string()))
    );
    assert_eq!(range.get_value((1, 3)), Some(&Data::Float(10_192_000.0)));
    assert_eq!(range.get_value((3, 3)), Some(&Data::Float(12_544_000.0)));
}

#[test]
fn build_without_preview() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = derive_build_args(dir.path(), None);
    args.n_preview = 0;
    let outcome = run_build(&args, &SpecPropkitConfig::default(), None).unwrap();
    assert!(outcome.preview.is_none());
}

#[test]
fn build_emails_the_written_report() {
    let dir = tempfile::tempdir().unwrap();
    let args = derive_build_args(dir.path(), Some("Firstname.Lastname"));
    let mailer = RecordingMailer::new(false);
    let outcome = run_build(&args, &derive_config_with_sender(), Some(&mailer)).unwrap();

    assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
    let delivery = outcome.delivery.unwrap().unwrap();
    assert_eq!(delivery.recipient, "firstname.lastname@beyondwalls.com");
    assert_eq!(
        delivery.n_bytes_attachment,
        std::fs::metadata(&args.output).unwrap().len() as usize
    );

    let l_sent = mailer.l_recipients.borrow();
    assert_eq!(l_sent.len(), 1);
    assert!(l_sent[0].contains("Dear Firstname Lastname,"));
}

#[test]
fn delivery_failure_keeps_output() {
    let dir = tempfile::tempdir().unwrap();
    let args = derive_build_args(dir.path(), Some("ops"));
    let mailer = RecordingMailer::new(true);
    let outcome = run_build(&args, &derive_config_with_sender(), Some(&mailer)).unwrap();

    assert_eq!(outcome.exit_code(), EXIT_DELIVERY_FAILED);
    assert!(args.output.is_file());
}

#[test]
fn missing_report_sheet_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let args = SpecBuildArgs {
        input: write_listing_workbook(dir.path(), "Listings"),
        output: dir.path().join("out.xlsx"),
        send_to: None,
        n_preview: 10,
    };
    let err = run_build(&args, &SpecPropkitConfig::default(), None).unwrap_err();
    assert!(format!("{err:#}").contains("could not find a sheet named 'Report'"));
    assert!(!args.output.exists());
}

#[test]
fn delivery_request_is_validated_up_front() {
    let err = prepare_smtp_mailer(&derive_config_with_sender(), "someone@else.com").err();
    assert!(err.unwrap().to_string().contains("invalid recipient"));

    let err = prepare_smtp_mailer(&SpecPropkitConfig::default(), "ops").err();
    assert!(err.unwrap().to_string().contains("smtp.sender_email"));

    assert!(prepare_smtp_mailer(&derive_config_with_sender(), "ops").is_ok());
}

#[test]
fn inspect_reports_field_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run_inspect(&write_listing_workbook(dir.path(), "report")).unwrap();

    assert_eq!(outcome.sheet_name, "report");
    assert_eq!(outcome.n_rows, 3);
    assert!(outcome.if_ready());
    assert_eq!(
        outcome.field_matches[0],
        (
            EnumReportField::CarpetArea,
            Some("Carpet Area(SQ.FT)".to_string())
        )
    );
    let c_render = outcome.render();
    assert!(c_render.contains("report sheet: report (3 data rows)"));
    assert!(c_render.contains("Count of Property -> Count of Property"));
}
