//! `bomsync run` / `bomsync validate` — config-driven batch reconciliation.

use std::fs;
use std::path::{Path, PathBuf};

use bomsync_engine::{EngineError, MasterEntry, ReconcileConfig, Record, RunResult, Scalar};

use crate::exit_codes::{
    EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_PARSE, EXIT_REVIEW, EXIT_STRUCTURAL,
};
use crate::CliError;

fn cli_err(code: u8, message: impl Into<String>) -> CliError {
    CliError::new(code, message)
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    fail_on_flags: bool,
) -> Result<(), CliError> {
    let config_str = fs::read_to_string(&config_path)
        .map_err(|e| cli_err(EXIT_ERROR, format!("cannot read config: {e}")))?;
    let config = ReconcileConfig::from_toml(&config_str)
        .map_err(|e| cli_err(EXIT_INVALID_CONFIG, e.to_string()))?;

    // File paths resolve relative to the config file's directory.
    let base_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let input_config = config.input.as_ref().ok_or_else(|| {
        cli_err(EXIT_INVALID_CONFIG, "config has no [input] section")
            .with_hint("add [input] with file = \"incoming.xlsx\"")
    })?;
    let master_config = config.master.as_ref().ok_or_else(|| {
        cli_err(EXIT_INVALID_CONFIG, "config has no [master] section")
            .with_hint("add [master] with file = \"Master_BOM.xlsx\"")
    })?;

    let input_path = base_dir.join(&input_config.file);
    let records = bomsync_io::load_records(&input_path, input_config.sheet.as_deref())
        .map_err(|e| cli_err(EXIT_PARSE, format!("cannot read {}: {e}", input_path.display())))?;

    let master_path = base_dir.join(&master_config.file);
    let master_rows = bomsync_io::load_records(&master_path, master_config.sheet.as_deref())
        .map_err(|e| cli_err(EXIT_PARSE, format!("cannot read {}: {e}", master_path.display())))?;
    let master: Vec<MasterEntry> = master_rows.into_iter().map(MasterEntry::new).collect();

    let result = bomsync_engine::run(&config, records, &master).map_err(|e| match e {
        EngineError::EmptyMaster | EngineError::MissingColumn { .. } => {
            cli_err(EXIT_STRUCTURAL, e.to_string())
        }
        other => cli_err(EXIT_ERROR, other.to_string()),
    })?;

    if master_config.backup {
        let backup_path = backup_path_for(&master_path);
        fs::copy(&master_path, &backup_path).map_err(|e| {
            cli_err(EXIT_ERROR, format!("cannot back up master: {e}"))
        })?;
        eprintln!("wrote {}", backup_path.display());
    }

    write_artifacts(&config, &base_dir, &result)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| cli_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        fs::write(path, &json_str)
            .map_err(|e| cli_err(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if let Some(ref json_name) = config.output.json {
        let path = base_dir.join(json_name);
        fs::write(&path, &json_str)
            .map_err(|e| cli_err(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "reconciled {} rows: {} accepted, {} excluded — {} master updates, {} duplicate flags, {} new flags, {} ignored",
        s.total_rows,
        s.accepted_rows,
        s.excluded_rows,
        s.updated_master,
        s.flagged_duplicate,
        s.flagged_new,
        s.skipped,
    );
    if s.duplicate_master_keys > 0 {
        eprintln!(
            "warning: {} duplicate master key(s) in the reference data — first match wins",
            s.duplicate_master_keys,
        );
    }

    if fail_on_flags && s.flagged_duplicate + s.flagged_new > 0 {
        return Err(cli_err(
            EXIT_REVIEW,
            format!(
                "{} row(s) flagged for review",
                s.flagged_duplicate + s.flagged_new
            ),
        ));
    }

    Ok(())
}

/// Write the four run artifacts into the output directory, dated the way the
/// review workflow expects them filed.
fn write_artifacts(
    config: &ReconcileConfig,
    base_dir: &Path,
    result: &RunResult,
) -> Result<(), CliError> {
    let out_dir = base_dir.join(config.output.dir.as_deref().unwrap_or("output"));
    fs::create_dir_all(&out_dir)
        .map_err(|e| cli_err(EXIT_ERROR, format!("cannot create {}: {e}", out_dir.display())))?;

    let stamp = chrono::Local::now().format("%Y-%m-%d").to_string();
    let write_err = |path: &Path, e: String| {
        cli_err(EXIT_ERROR, format!("cannot write {}: {e}", path.display()))
    };

    let annotated_path = out_dir.join(format!("Update_{stamp}.xlsx"));
    bomsync_io::xlsx::write_annotated(&annotated_path, &result.accepted, "Updated_Data")
        .map_err(|e| write_err(&annotated_path, e))?;
    eprintln!("wrote {}", annotated_path.display());

    let master_records: Vec<Record> = result
        .updated_master
        .iter()
        .map(|entry| entry.record.clone())
        .collect();
    let master_out = out_dir.join(format!("Master_BOM_Updated_{stamp}.xlsx"));
    bomsync_io::xlsx::write_records(&master_out, &master_records, "Master_BOM")
        .map_err(|e| write_err(&master_out, e))?;
    eprintln!("wrote {}", master_out.display());

    if !result.excluded.is_empty() {
        let excluded_records: Vec<Record> = result
            .excluded
            .iter()
            .map(|exclusion| {
                let mut record = exclusion.record.clone();
                record.set("Reason", Scalar::text(exclusion.reason.clone()));
                record
            })
            .collect();
        let excluded_path = out_dir.join(format!("Clean_Excluded_{stamp}.xlsx"));
        bomsync_io::xlsx::write_records(&excluded_path, &excluded_records, "Excluded")
            .map_err(|e| write_err(&excluded_path, e))?;
        eprintln!("wrote {}", excluded_path.display());
    }

    let summary_path = out_dir.join(format!("Processing_Summary_{stamp}.csv"));
    bomsync_io::report::write_summary(&summary_path, &result.summary)
        .map_err(|e| write_err(&summary_path, e))?;
    eprintln!("wrote {}", summary_path.display());

    Ok(())
}

fn backup_path_for(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("master");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("bak");
    path.with_file_name(format!("{stem}_backup.{ext}"))
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = fs::read_to_string(&config_path)
        .map_err(|e| cli_err(EXIT_ERROR, format!("cannot read config: {e}")))?;

    match ReconcileConfig::from_toml(&config_str) {
        Ok(config) => {
            eprintln!(
                "valid: '{}' — key ({}, {}), status column '{}', {} valid status(es)",
                config.name,
                config.key.part_number,
                config.key.project,
                config.key.status,
                config.valid_statuses.len(),
            );
            Ok(())
        }
        Err(e) => Err(cli_err(EXIT_INVALID_CONFIG, e.to_string())),
    }
}
