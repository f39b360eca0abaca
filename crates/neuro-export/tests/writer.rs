use neuro_core::models::usage::{AggregateUsageStats, Tier};
use neuro_core::models::validation::ValidationReason;
use neuro_export::error::ExportError;
use neuro_export::writer::{MANIFEST_FILE, SUMMARY_FILE};
use neuro_export::{DomainEntry, NarrativeStatus, NarrativeWriter, RunManifest};

fn manifest() -> RunManifest {
    let now = jiff::Timestamp::now();
    RunManifest {
        run_id: uuid::Uuid::new_v4(),
        started_at: now,
        finished_at: now,
        patient: "Jordan".to_string(),
        rows_total: 12,
        rows_skipped: 1,
        domains: vec![
            DomainEntry {
                key: "memory".to_string(),
                title: "Memory".to_string(),
                file: Some("_02-05_memory_text.qmd".to_string()),
                scoreable_rows: 4,
                status: NarrativeStatus::Generated {
                    model_id: "qwen3:8b".to_string(),
                    tier: Tier::Primary,
                    attempts: 1,
                },
            },
            DomainEntry {
                key: "motor".to_string(),
                title: "Motor".to_string(),
                file: Some("_02-07_motor_text.qmd".to_string()),
                scoreable_rows: 2,
                status: NarrativeStatus::NeedsManualNarrative {
                    failures: vec!["qwen3:8b (primary #1): timed out after 120.0s".to_string()],
                },
            },
            DomainEntry {
                key: "adaptive".to_string(),
                title: "Adaptive Functioning".to_string(),
                file: None,
                scoreable_rows: 0,
                status: NarrativeStatus::Excluded {
                    reason: ValidationReason::NoDataSource,
                },
            },
        ],
        integrated_summary: None,
        usage: AggregateUsageStats::default(),
    }
}

#[test]
fn narrative_lands_in_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let writer = NarrativeWriter::new(dir.path().join("report")).unwrap();

    let path = writer
        .write_narrative("_02-05_memory_text.qmd", "Memory was broadly average.")
        .unwrap();

    assert_eq!(path, dir.path().join("report/_02-05_memory_text.qmd"));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("<summary>"));
    assert!(contents.contains("Memory was broadly average."));
    assert!(!dir.path().join("report/_02-05_memory_text.qmd.tmp").exists());
}

#[test]
fn custom_narrative_template_replaces_builtin_layout() {
    let dir = tempfile::tempdir().unwrap();
    let writer = NarrativeWriter::new(dir.path())
        .unwrap()
        .with_narrative_template("::: {.narrative}\n{{ text | trim }}\n:::\n")
        .unwrap();

    let path = writer.write_narrative("a.qmd", "  Memory was intact. ").unwrap();
    let contents = std::fs::read_to_string(path).unwrap();
    assert_eq!(contents, "::: {.narrative}\nMemory was intact.\n:::\n");

    // Placeholders keep the built-in layout.
    let path = writer.write_placeholder("b.qmd", "Motor", &[]).unwrap();
    assert!(std::fs::read_to_string(path).unwrap().contains("Needs manual narrative"));
}

#[test]
fn malformed_narrative_template_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = NarrativeWriter::new(dir.path())
        .unwrap()
        .with_narrative_template("{% if %}");
    assert!(matches!(result, Err(ExportError::TemplateParse(_))));
}

#[test]
fn placeholder_names_the_section() {
    let dir = tempfile::tempdir().unwrap();
    let writer = NarrativeWriter::new(dir.path()).unwrap();

    let failures = vec!["qwen3:8b (primary #1): model unavailable".to_string()];
    let path = writer.write_placeholder(SUMMARY_FILE, "Summary", &failures).unwrap();

    let contents = std::fs::read_to_string(path).unwrap();
    assert!(contents.contains("Needs manual narrative"));
    assert!(contents.contains("Automated drafting for Summary"));
    assert!(contents.contains("- qwen3:8b (primary #1): model unavailable"));
}

#[test]
fn rewriting_replaces_previous_text() {
    let dir = tempfile::tempdir().unwrap();
    let writer = NarrativeWriter::new(dir.path()).unwrap();

    writer.write_narrative("a.qmd", "first").unwrap();
    let path = writer.write_narrative("a.qmd", "second").unwrap();

    let contents = std::fs::read_to_string(path).unwrap();
    assert!(contents.contains("second"));
    assert!(!contents.contains("first"));
}

#[test]
fn manifest_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let writer = NarrativeWriter::new(dir.path()).unwrap();
    let manifest = manifest();

    let path = writer.write_manifest(&manifest).unwrap();
    assert_eq!(path, dir.path().join(MANIFEST_FILE));

    let json = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["domains"][0]["status"], "generated");
    assert_eq!(value["domains"][1]["status"], "needs_manual_narrative");
    assert_eq!(value["domains"][2]["reason"], "no_data_source");
    assert!(value["domains"][2].get("file").is_none());

    let back: RunManifest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, manifest);
}

#[test]
fn manifest_reports_pending_sections() {
    let manifest = manifest();
    assert_eq!(manifest.included().count(), 2);
    assert_eq!(manifest.pending_keys(), vec!["motor"]);
}
