// Processing summary artifact — the Metric,Count CSV the review workflow
// files alongside the updated workbooks.

use std::path::Path;

use bomsync_engine::RunSummary;

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| e.to_string())?;

    let rows: [(&str, usize); 8] = [
        ("total_rows", summary.total_rows),
        ("accepted_rows", summary.accepted_rows),
        ("excluded_rows", summary.excluded_rows),
        ("updated_master", summary.updated_master),
        ("flagged_duplicate", summary.flagged_duplicate),
        ("flagged_new", summary.flagged_new),
        ("skipped", summary.skipped),
        ("duplicate_master_keys", summary.duplicate_master_keys),
    ];

    writer
        .write_record(["Metric", "Count"])
        .map_err(|e| e.to_string())?;
    for (metric, count) in rows {
        let count = count.to_string();
        writer
            .write_record([metric, count.as_str()])
            .map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}
