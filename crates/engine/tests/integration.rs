// End-to-end engine runs over in-memory batches: the full
// normalize → index → classify → assemble pipeline.

use bomsync_engine::model::{ACTION_FIELD, NOTES_FIELD};
use bomsync_engine::{EngineError, MasterEntry, Outcome, ReconcileConfig, Record, Scalar};

const CONFIG: &str = r#"
name = "Integration test"

[cleaning]
uppercase_fields = ["PartNumber", "Project"]
remove_non_ascii = true
normalize_spaces = true
"#;

fn config() -> ReconcileConfig {
    ReconcileConfig::from_toml(CONFIG).unwrap()
}

fn rec(pairs: &[(&str, &str)]) -> Record {
    Record::from_pairs(
        pairs
            .iter()
            .map(|(name, value)| {
                let scalar = if value.is_empty() {
                    Scalar::Empty
                } else {
                    Scalar::text(*value)
                };
                (name.to_string(), scalar)
            })
            .collect(),
    )
}

fn entry(pairs: &[(&str, &str)]) -> MasterEntry {
    MasterEntry::new(rec(pairs))
}

fn master() -> Vec<MasterEntry> {
    vec![
        entry(&[
            ("PartNumber", "A1"),
            ("Project", "P1"),
            ("Status", "D"),
            ("Description", "Relay 12V"),
            ("Supplier", "Acme"),
        ]),
        entry(&[
            ("PartNumber", "A2"),
            ("Project", "P1"),
            ("Status", "0"),
            ("Description", "Fuse 5A"),
            ("Supplier", "Delphi"),
        ]),
        entry(&[
            ("PartNumber", "A3"),
            ("Project", "P1"),
            ("Status", "X"),
            ("Description", "Connector"),
            ("Supplier", "Acme"),
        ]),
        entry(&[
            ("PartNumber", "A4"),
            ("Project", "P1"),
            ("Status", "Q"),
            ("Description", "Bracket"),
            ("Supplier", "Tier2"),
        ]),
    ]
}

fn action(record: &Record) -> String {
    record.get(ACTION_FIELD).unwrap().to_string()
}

#[test]
fn full_batch_classification() {
    let records = vec![
        rec(&[("PartNumber", "a1 "), ("Project", " P1"), ("Qty", "4")]),
        rec(&[("PartNumber", "A2"), ("Project", "P1")]),
        rec(&[("PartNumber", "A3"), ("Project", "P1")]),
        rec(&[("PartNumber", "A4"), ("Project", "P1")]),
        rec(&[("PartNumber", "B9"), ("Project", "P1")]),
        rec(&[("PartNumber", ""), ("Project", "P1")]),
    ];

    let result = bomsync_engine::run(&config(), records, &master()).unwrap();
    let s = &result.summary;

    assert_eq!(s.total_rows, 6);
    assert_eq!(s.accepted_rows, 5);
    assert_eq!(s.excluded_rows, 1);
    assert_eq!(s.accepted_rows + s.excluded_rows, s.total_rows);
    assert_eq!(s.updated_master, 1);
    assert_eq!(s.flagged_duplicate, 1);
    assert_eq!(s.flagged_new, 1);
    assert_eq!(s.skipped, 2);
    assert_eq!(s.outcome_counts["skipped"], 2);

    // Order preserved, annotations per the decision table.
    assert_eq!(action(&result.accepted[0]), "Updated");
    assert_eq!(action(&result.accepted[1]), "Duplicate");
    assert_eq!(action(&result.accepted[2]), "Ignored");
    assert_eq!(action(&result.accepted[3]), "Ignored");
    assert_eq!(action(&result.accepted[4]), "New");

    // The whitespace/case-drifted key matched and was enriched.
    assert_eq!(
        result.accepted[0].get("Description"),
        Some(&Scalar::text("Relay 12V"))
    );
    assert_eq!(result.accepted[0].get("Qty"), Some(&Scalar::text("4")));

    // Unrecognized status carries the value in the notes.
    assert_eq!(
        result.accepted[3].get(NOTES_FIELD),
        Some(&Scalar::text("Unrecognized status: Q"))
    );

    // D flipped to X in the working master; other entries untouched.
    assert_eq!(
        result.updated_master[0].field("Status"),
        Some(&Scalar::text("X"))
    );
    assert_eq!(
        result.updated_master[1].field("Status"),
        Some(&Scalar::text("0"))
    );
    assert_eq!(
        result.updated_master[2].field("Status"),
        Some(&Scalar::text("X"))
    );
    assert_eq!(
        result.updated_master[3].field("Status"),
        Some(&Scalar::text("Q"))
    );

    // Excluded row names the missing field.
    assert!(result.excluded[0].reason.contains("PartNumber"));
}

#[test]
fn mutation_exclusivity() {
    // Only D-status entries matched by an accepted record change, and only
    // their status field changes.
    let original = master();
    let records = vec![
        rec(&[("PartNumber", "A1"), ("Project", "P1")]),
        rec(&[("PartNumber", "A2"), ("Project", "P1")]),
    ];
    let result = bomsync_engine::run(&config(), records, &original).unwrap();

    for (before, after) in original.iter().zip(&result.updated_master) {
        if before.field("PartNumber") == Some(&Scalar::text("A1")) {
            assert_eq!(after.field("Status"), Some(&Scalar::text("X")));
            // Everything but the status is untouched.
            for (name, value) in before.record.fields() {
                if name != "Status" {
                    assert_eq!(after.record.get(name), Some(value));
                }
            }
        } else {
            assert_eq!(&before.record, &after.record);
        }
    }
}

#[test]
fn idempotent_given_fixed_inputs() {
    let records = vec![
        rec(&[("PartNumber", "A1"), ("Project", "P1")]),
        rec(&[("PartNumber", "B9"), ("Project", "P1")]),
        rec(&[("PartNumber", ""), ("Project", "")]),
    ];
    let first = bomsync_engine::run(&config(), records.clone(), &master()).unwrap();
    let second = bomsync_engine::run(&config(), records, &master()).unwrap();

    assert_eq!(first.accepted, second.accepted);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.excluded, second.excluded);
    assert_eq!(first.updated_master, second.updated_master);
}

#[test]
fn duplicate_master_keys_first_wins_both_persist() {
    let master = vec![
        entry(&[("PartNumber", "A1"), ("Project", "P1"), ("Status", "D")]),
        entry(&[("PartNumber", "A1"), ("Project", "P1"), ("Status", "0")]),
    ];
    let records = vec![rec(&[("PartNumber", "A1"), ("Project", "P1")])];
    let result = bomsync_engine::run(&config(), records, &master).unwrap();

    // First entry matched and mutated; the shadowed duplicate persisted as-is.
    assert_eq!(result.summary.updated_master, 1);
    assert_eq!(result.summary.duplicate_master_keys, 1);
    assert_eq!(result.updated_master.len(), 2);
    assert_eq!(
        result.updated_master[0].field("Status"),
        Some(&Scalar::text("X"))
    );
    assert_eq!(
        result.updated_master[1].field("Status"),
        Some(&Scalar::text("0"))
    );
}

#[test]
fn repeated_deprecated_key_last_word_wins() {
    // Two input rows hit the same D entry: the first flips it to X, the
    // second observes the flipped status and is skipped.
    let records = vec![
        rec(&[("PartNumber", "A1"), ("Project", "P1")]),
        rec(&[("PartNumber", "A1"), ("Project", "P1")]),
    ];
    let result = bomsync_engine::run(&config(), records, &master()).unwrap();

    assert_eq!(action(&result.accepted[0]), "Updated");
    assert_eq!(action(&result.accepted[1]), "Ignored");
    assert_eq!(
        result.accepted[1].get(NOTES_FIELD),
        Some(&Scalar::text("Already marked obsolete"))
    );
    assert_eq!(result.summary.updated_master, 1);
    assert_eq!(result.summary.skipped, 1);
}

#[test]
fn new_part_leaves_master_alone() {
    let records = vec![rec(&[("PartNumber", "ZZ-99"), ("Project", "P7")])];
    let original = master();
    let result = bomsync_engine::run(&config(), records, &original).unwrap();

    assert_eq!(result.summary.flagged_new, 1);
    for (before, after) in original.iter().zip(&result.updated_master) {
        assert_eq!(&before.record, &after.record);
    }
}

#[test]
fn structural_error_not_partial_result() {
    let master = vec![entry(&[("PartNumber", "A1"), ("Project", "P1")])];
    let err = bomsync_engine::run(
        &config(),
        vec![rec(&[("PartNumber", "A1"), ("Project", "P1")])],
        &master,
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::MissingColumn { .. }));
}

#[test]
fn outcomes_serialize_snake_case() {
    let records = vec![rec(&[("PartNumber", "B9"), ("Project", "P1")])];
    let result = bomsync_engine::run(&config(), records, &master()).unwrap();
    let json = serde_json::to_value(&result.summary).unwrap();
    assert_eq!(json["outcome_counts"][Outcome::FlagNew.to_string()], 1);
    assert_eq!(json["flagged_new"], 1);
}
