//! `bomsync-io` — file I/O for the reconciliation pipeline.
//!
//! CSV/TSV and Excel import into engine records, artifact export with the
//! row highlighting the review workflow expects, and the summary report.

use std::path::Path;

use bomsync_engine::Record;

pub mod csv;
pub mod report;
pub mod xlsx;

/// Load a spreadsheet file into records, dispatching on extension.
/// `sheet` applies to Excel inputs only.
pub fn load_records(path: &Path, sheet: Option<&str>) -> Result<Vec<Record>, String> {
    match extension(path).as_str() {
        "csv" => csv::import(path),
        "tsv" => csv::import_tsv(path),
        "xlsx" | "xls" | "xlsb" | "ods" => xlsx::import(path, sheet),
        other => Err(format!(
            "unsupported input format '.{other}' (expected .csv/.tsv/.xlsx/.xls/.xlsb/.ods)"
        )),
    }
}

/// Write records to a spreadsheet file, dispatching on extension.
pub fn write_records(path: &Path, records: &[Record]) -> Result<(), String> {
    match extension(path).as_str() {
        "csv" => csv::export(path, records),
        "xlsx" => xlsx::write_records(path, records, "Sheet1"),
        other => Err(format!(
            "unsupported output format '.{other}' (expected .csv/.xlsx)"
        )),
    }
}

/// Column order across a record set: field names in first-seen order.
pub fn column_order(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for name in record.field_names() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomsync_engine::Scalar;

    #[test]
    fn column_order_is_first_seen() {
        let records = vec![
            Record::from_pairs(vec![
                ("A".into(), Scalar::text("1")),
                ("B".into(), Scalar::text("2")),
            ]),
            Record::from_pairs(vec![
                ("B".into(), Scalar::text("3")),
                ("C".into(), Scalar::text("4")),
            ]),
        ];
        assert_eq!(column_order(&records), vec!["A", "B", "C"]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_records(Path::new("data.parquet"), None).unwrap_err();
        assert!(err.contains("parquet"));
    }
}
