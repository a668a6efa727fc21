// Excel import (xlsx, xls, xlsb, ods) and export (xlsx only)
//
// Import: first row is the header row, every following row becomes a record.
// Export: plain tables, plus the annotated variant with the row highlighting
// the review workflow keys off the Action column.

use std::path::Path;

use bomsync_engine::model::ACTION_FIELD;
use bomsync_engine::{Record, Scalar};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Color, Format, Workbook};

/// Row fill for master updates (light yellow).
const FILL_UPDATED: u32 = 0xFFFFCC;
/// Row fill for duplicate/new flags needing review (light red).
const FILL_REVIEW: u32 = 0xFFCCCC;
/// Row fill for ignored rows (light gray).
const FILL_IGNORED: u32 = 0xE6E6E6;
/// Header fill (blue, white bold text).
const FILL_HEADER: u32 = 0x4472C4;

pub fn import(path: &Path, sheet: Option<&str>) -> Result<Vec<Record>, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| format!("{}: workbook has no sheets", path.display()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("sheet '{sheet_name}': {e}"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for row in rows {
        let fields = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(i, name)| {
                let cell = row.get(i).unwrap_or(&Data::Empty);
                (name.clone(), cell_scalar(cell))
            })
            .collect();
        records.push(Record::from_pairs(fields));
    }

    Ok(records)
}

fn cell_scalar(cell: &Data) -> Scalar {
    match cell {
        Data::Empty => Scalar::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Scalar::Empty
            } else {
                Scalar::Text(s.clone())
            }
        }
        Data::Float(f) => Scalar::Number(*f),
        Data::Int(i) => Scalar::Number(*i as f64),
        Data::Bool(b) => Scalar::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => Scalar::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Scalar::Text(s.clone()),
        Data::Error(_) => Scalar::Empty,
    }
}

/// Write records as a plain table.
pub fn write_records(path: &Path, records: &[Record], sheet_name: &str) -> Result<(), String> {
    write_table(path, records, sheet_name, false)
}

/// Write annotated records with per-row highlighting driven by the Action
/// column: Updated rows yellow, Duplicate/New rows red, Ignored rows gray.
pub fn write_annotated(path: &Path, records: &[Record], sheet_name: &str) -> Result<(), String> {
    write_table(path, records, sheet_name, true)
}

fn write_table(
    path: &Path,
    records: &[Record],
    sheet_name: &str,
    highlight: bool,
) -> Result<(), String> {
    let columns = crate::column_order(records);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(|e| e.to_string())?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(FILL_HEADER))
        .set_font_color(Color::White);

    for (col, name) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name.as_str(), &header_format)
            .map_err(|e| e.to_string())?;
    }

    for (row_idx, record) in records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let fill = if highlight { row_fill(record) } else { None };
        let format = fill.map(|rgb| Format::new().set_background_color(Color::RGB(rgb)));

        for (col_idx, name) in columns.iter().enumerate() {
            let col = col_idx as u16;
            let value = record.get(name).unwrap_or(&Scalar::Empty);
            match (value, &format) {
                (Scalar::Number(n), Some(f)) => {
                    worksheet
                        .write_number_with_format(row, col, *n, f)
                        .map_err(|e| e.to_string())?;
                }
                (Scalar::Number(n), None) => {
                    worksheet.write_number(row, col, *n).map_err(|e| e.to_string())?;
                }
                (Scalar::Text(s), Some(f)) => {
                    worksheet
                        .write_string_with_format(row, col, s.as_str(), f)
                        .map_err(|e| e.to_string())?;
                }
                (Scalar::Text(s), None) => {
                    worksheet
                        .write_string(row, col, s.as_str())
                        .map_err(|e| e.to_string())?;
                }
                (Scalar::Empty, Some(f)) => {
                    worksheet
                        .write_string_with_format(row, col, "", f)
                        .map_err(|e| e.to_string())?;
                }
                (Scalar::Empty, None) => {}
            }
        }
    }

    workbook.save(path).map_err(|e| e.to_string())
}

fn row_fill(record: &Record) -> Option<u32> {
    let action = record.get(ACTION_FIELD)?.to_string();
    match action.as_str() {
        "Updated" => Some(FILL_UPDATED),
        "Duplicate" | "New" => Some(FILL_REVIEW),
        "Ignored" => Some(FILL_IGNORED),
        _ => None,
    }
}
