//! Text rendering for the artifact table and the per-record viewer

use crate::aggregator::CollectionReport;
use crate::shared::error::DetectorError;
use crate::shared::models::ArtifactRecord;
use crate::shared::utils::format_timestamp;
use serde_json::Value;

const HEADERS: [&str; 6] = ["#", "Type", "File Name", "Path", "Created Date", "Modified Date"];
const MAX_PATH_WIDTH: usize = 80;

/// Content as shown in the viewer: JSON is pretty-printed, anything else is
/// returned unchanged.
pub fn format_content(content: &str) -> String {
    match serde_json::from_str::<Value>(content) {
        Ok(value) if value.is_object() || value.is_array() => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| content.to_string())
        }
        _ => content.to_string(),
    }
}

/// Viewer text for one table row.
pub fn view_record(records: &[ArtifactRecord], row: usize) -> Result<String, DetectorError> {
    records
        .get(row)
        .map(|record| format_content(&record.content))
        .ok_or(DetectorError::RowOutOfRange {
            row,
            rows: records.len(),
        })
}

fn shorten(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - (width - 3)).collect();
    format!("...{}", tail)
}

fn row(index: usize, record: &ArtifactRecord) -> [String; 6] {
    [
        index.to_string(),
        record.file_type.to_string(),
        record.file_name.clone(),
        shorten(&record.file_path, MAX_PATH_WIDTH),
        format_timestamp(record.created_time.as_ref()),
        format_timestamp(record.modified_time.as_ref()),
    ]
}

pub fn render_table(records: &[ArtifactRecord]) -> String {
    let rows: Vec<[String; 6]> = records.iter().enumerate().map(|(i, r)| row(i, r)).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(format_line(&HEADERS.map(String::from)[..]));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for cells in &rows {
        out.push(format_line(&cells[..]));
    }
    out.join("\n")
}

pub fn render_report(report: &CollectionReport) -> String {
    let mut out = format!(
        "Service: {} (host {}, user {}, {})\n\n",
        report.service_name,
        report.hostname,
        report.username,
        format_timestamp(Some(&report.collected_at))
    );
    out.push_str(&render_table(&report.records));
    out.push('\n');

    if !report.failures.is_empty() {
        out.push_str("\nNot collected:\n");
        for failure in &report.failures {
            out.push_str(&format!("  {}: {}\n", failure.kind, failure.error));
        }
    }
    out
}
