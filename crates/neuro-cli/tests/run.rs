use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use neuro_cli::config::{PatientConfig, ReportConfig};
use neuro_cli::run::{self, RunContext, SUMMARY_KEY};
use neuro_core::models::generation::SectionKind;
use neuro_core::models::token_count::TokenCount;
use neuro_core::models::validation::ValidationReason;
use neuro_domains::{PatientType, RuleSet};
use neuro_export::NarrativeStatus;
use neuro_export::writer::{MANIFEST_FILE, SUMMARY_FILE};
use neuro_llm::{
    BackendError, ClientConfig, Completion, CompletionRequest, GenerationClient, InferenceBackend,
    ModelCatalogue, ModelTiers, UsageLedger,
};
use neuro_normalize::RawRow;
use serde_json::json;

const GOOD: &str = "Overall cognitive ability fell within the average range. Verbal \
    reasoning was a relative strength, while processing speed was an area of weakness \
    that may affect classroom performance.";

/// Answers `GOOD` for models mapped to `true`, fails for `false`.
struct FixedBackend {
    models: HashMap<&'static str, bool>,
}

#[async_trait]
impl InferenceBackend for FixedBackend {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn is_available(&self, model_id: &str) -> bool {
        self.models.contains_key(model_id)
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
        match self.models.get(request.model_id.as_str()) {
            Some(true) => Ok(Completion {
                text: GOOD.to_string(),
                tokens: TokenCount {
                    input: 300,
                    output: 80,
                },
                latency_seconds: 0.02,
            }),
            _ => Err(BackendError::Invocation("model crashed".to_string())),
        }
    }
}

fn rows() -> Vec<RawRow> {
    [
        json!({"test_id": "wisc5", "domain": "General Cognitive Ability", "scale": "FSIQ", "percentile": 50}),
        json!({"test_id": "nab", "domain": "Memory", "scale": "List Learning", "percentile": 16}),
        json!({"test_id": "nab", "domain": "Memory", "scale": "Story Recall", "percentile": 37}),
        json!({"scale": "orphan row"}),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, v)| RawRow::from_json(i + 1, "scores.json", v))
    .collect()
}

fn config(output_dir: &std::path::Path, domain_model: &str) -> ReportConfig {
    let mut config = ReportConfig::new(PatientConfig {
        name: "Jordan".to_string(),
        patient_type: PatientType::Child,
    });
    config.output_dir = output_dir.to_path_buf();
    config.models = ModelCatalogue::new()
        .with_section(SectionKind::DomainSummary, ModelTiers::new([domain_model], ["good"]))
        .with_section(SectionKind::IntegratedSummary, ModelTiers::new(["good"], Vec::<String>::new()));
    config.max_retries = 1;
    config
}

fn client(models: &[(&'static str, bool)]) -> GenerationClient {
    let backend = FixedBackend {
        models: models.iter().copied().collect(),
    };
    GenerationClient::new(
        Arc::new(backend),
        ClientConfig {
            max_retries: 1,
            attempt_timeout: Duration::from_secs(5),
            validate_all: false,
        },
    )
}

#[tokio::test]
async fn full_run_writes_narratives_summary_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), "good");
    let ctx = RunContext::new(config.patient.clone(), dir.path(), UsageLedger::new());

    let manifest = run::run_report(ctx, &rows(), &config, &client(&[("good", true)]))
        .await
        .unwrap();

    assert_eq!(manifest.rows_total, 4);
    assert_eq!(manifest.rows_skipped, 1);
    assert_eq!(manifest.patient, "Jordan");

    let included: Vec<&str> = manifest.included().map(|d| d.key.as_str()).collect();
    assert_eq!(included, vec!["iq", "memory"]);

    let memory = manifest.domains.iter().find(|d| d.key == "memory").unwrap();
    assert_eq!(memory.file.as_deref(), Some("_02-05_memory_text.qmd"));
    assert_eq!(memory.scoreable_rows, 2);
    let text = std::fs::read_to_string(dir.path().join("_02-05_memory_text.qmd")).unwrap();
    assert!(text.contains("relative strength"));

    let adaptive = manifest.domains.iter().find(|d| d.key == "adaptive").unwrap();
    assert_eq!(
        adaptive.status,
        NarrativeStatus::Excluded {
            reason: ValidationReason::NoDataSource
        }
    );
    assert!(adaptive.file.is_none());

    let summary = manifest.integrated_summary.as_ref().unwrap();
    assert_eq!(summary.key, SUMMARY_KEY);
    assert!(summary.is_generated());
    assert!(dir.path().join(SUMMARY_FILE).exists());

    // Two domains plus the integrated summary, one attempt each.
    assert_eq!(manifest.usage.total_calls, 3);
    assert!(manifest.pending_keys().is_empty());
    assert!(dir.path().join(MANIFEST_FILE).exists());
}

#[tokio::test]
async fn exhausted_domains_get_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path(), "broken");
    config.models = ModelCatalogue::new()
        .with_section(SectionKind::DomainSummary, ModelTiers::new(["broken"], ["missing"]))
        .with_section(SectionKind::IntegratedSummary, ModelTiers::new(["good"], Vec::<String>::new()));
    let ctx = RunContext::new(config.patient.clone(), dir.path(), UsageLedger::new());

    let manifest = run::run_report(ctx, &rows(), &config, &client(&[("good", true), ("broken", false)]))
        .await
        .unwrap();

    let mut pending = manifest.pending_keys();
    pending.sort();
    assert_eq!(pending, vec!["iq", "memory"]);

    let iq = manifest.domains.iter().find(|d| d.key == "iq").unwrap();
    let NarrativeStatus::NeedsManualNarrative { failures } = &iq.status else {
        panic!("expected a placeholder, got {:?}", iq.status);
    };
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().any(|f| f.contains("missing") && f.contains("model unavailable")));

    let text = std::fs::read_to_string(dir.path().join("_02-01_iq_text.qmd")).unwrap();
    assert!(text.contains("Needs manual narrative"));

    // No domain narrative to summarise.
    assert!(manifest.integrated_summary.is_none());
    assert!(!dir.path().join(SUMMARY_FILE).exists());
}

#[tokio::test]
async fn summary_can_be_switched_off() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path(), "good");
    config.integrated_summary = false;
    let ctx = RunContext::new(config.patient.clone(), dir.path(), UsageLedger::new());

    let manifest = run::run_report(ctx, &rows(), &config, &client(&[("good", true)]))
        .await
        .unwrap();

    assert!(manifest.integrated_summary.is_none());
    assert_eq!(manifest.usage.total_calls, 2);
}

#[tokio::test]
async fn journal_matches_manifest_usage() {
    let dir = tempfile::tempdir().unwrap();
    let journal = dir.path().join("usage/usage.jsonl");
    let config = config(&dir.path().join("out"), "good");
    let ctx = RunContext::new(
        config.patient.clone(),
        config.output_dir.clone(),
        UsageLedger::with_journal(&journal).unwrap(),
    );

    let manifest = run::run_report(ctx, &rows(), &config, &client(&[("good", true)]))
        .await
        .unwrap();

    let reloaded = UsageLedger::load(&journal).unwrap().summary(None);
    assert_eq!(reloaded.total_calls, manifest.usage.total_calls);
    assert_eq!(reloaded.total_tokens, manifest.usage.total_tokens);
    assert_eq!(reloaded.models_used, manifest.usage.models_used);
    assert_eq!(reloaded.domains_processed, manifest.usage.domains_processed);
    assert!(dir.path().join("out").join(MANIFEST_FILE).exists());
}

#[tokio::test]
async fn narrative_template_from_config_shapes_output() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("narrative.qmd");
    std::fs::write(&template, "<!-- drafted -->\n{{ text | trim }}\n").unwrap();
    let mut config = config(&dir.path().join("out"), "good");
    config.narrative_template = Some(template);
    let ctx = RunContext::new(config.patient.clone(), config.output_dir.clone(), UsageLedger::new());

    run::run_report(ctx, &rows(), &config, &client(&[("good", true)]))
        .await
        .unwrap();

    let text = std::fs::read_to_string(dir.path().join("out/_02-05_memory_text.qmd")).unwrap();
    assert_eq!(text, format!("<!-- drafted -->\n{GOOD}\n"));
}

#[tokio::test]
async fn missing_narrative_template_fails_before_generation() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path(), "good");
    config.narrative_template = Some(dir.path().join("absent.qmd"));
    let ledger = UsageLedger::new();
    let ctx = RunContext::new(config.patient.clone(), dir.path(), ledger);

    let err = run::run_report(ctx, &rows(), &config, &client(&[("good", true)]))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("absent.qmd"), "{err}");
    assert!(!dir.path().join(MANIFEST_FILE).exists());
}

#[test]
fn selection_without_generation() {
    let selection = run::select(&rows(), PatientType::Adult, &RuleSet::default());

    assert_eq!(selection.normalized.records.len(), 3);
    assert!(selection.domains.iter().any(|d| d.key == "adhd_adult"));
    assert!(!selection.domains.iter().any(|d| d.key == "adhd_child"));
    let included: Vec<&str> = selection
        .domains
        .iter()
        .filter(|d| d.included)
        .map(|d| d.key)
        .collect();
    assert_eq!(included, vec!["iq", "memory"]);
}

#[test]
fn referenced_tests_come_from_the_instrument_catalogue() {
    let records = neuro_normalize::normalize(
        &[
            json!({"test_id": "nab", "domain": "Memory", "scale": "List Learning", "percentile": 16}),
            json!({"test_id": "wisc5", "scale": "FSIQ", "percentile": 50}),
            json!({"domain": "Memory", "scale": "Story Recall", "percentile": 37}),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, v)| RawRow::from_json(i + 1, "scores.json", v))
        .collect::<Vec<_>>(),
    )
    .records;

    // The domain-only row is named after its file; "scores" is no test.
    assert_eq!(records[2].test_id, "scores");
    let names: Vec<String> = run::referenced_tests_of(&records).into_iter().collect();
    assert_eq!(names, vec!["NAB", "WISC-V", "nab", "wisc5"]);
}
