use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::error::Result;
use crate::record::{NormalizedRecord, COLUMNS};
use crate::report::Report;

pub const RESULTS_SHEET: &str = "results";
pub const VALID_SHEET: &str = "valid";
pub const EXCLUDED_SHEET: &str = "excluded";
pub const EXCLUSION_LIST_SHEET: &str = "exclusion list";

/// Appends `.xlsx` unless the path already ends with it.
pub fn output_path(requested: &Path) -> PathBuf {
    if requested.extension().and_then(|ext| ext.to_str()) == Some("xlsx") {
        requested.to_path_buf()
    } else {
        let mut path = requested.as_os_str().to_owned();
        path.push(".xlsx");
        PathBuf::from(path)
    }
}

/// Writes the results sheet and, with exclusions enabled, the valid,
/// excluded and exclusion-list sheets. Parent directories are created.
pub fn write_report(report: &Report<'_>, path: &Path) -> Result<()> {
    let start_time = Instant::now();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    write_records(workbook.add_worksheet(), RESULTS_SHEET, report.all(), &header)?;

    if report.exclusions_enabled() {
        write_records(workbook.add_worksheet(), VALID_SHEET, report.valid(), &header)?;
        write_records(workbook.add_worksheet(), EXCLUDED_SHEET, report.excluded(), &header)?;

        let sheet = workbook.add_worksheet();
        sheet.set_name(EXCLUSION_LIST_SHEET)?;
        sheet.write_string_with_format(0, 0, "host", &header)?;
        sheet.write_string_with_format(0, 1, "remark", &header)?;
        for (row, (host, remark)) in (1u32..).zip(report.exclusion_list()) {
            sheet.write_string(row, 0, host)?;
            sheet.write_string(row, 1, remark)?;
        }
    }

    workbook.save(path)?;

    info!(
        action = "complete",
        component = "workbook",
        file_path = ?path,
        record_count = report.all().len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Workbook written"
    );
    Ok(())
}

fn write_records(
    sheet: &mut Worksheet,
    name: &str,
    records: &[NormalizedRecord],
    header: &Format,
) -> Result<()> {
    sheet.set_name(name)?;
    for (col, title) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, title, header)?;
    }
    for (row, record) in (1u32..).zip(records) {
        for (col, value) in (0u16..).zip(record.columns()) {
            sheet.write_string(row, col, value)?;
        }
    }
    Ok(())
}
