//! One report run: normalize, select domains, generate narratives, export.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use neuro_core::models::generation::SectionKind;
use neuro_core::models::score::ScoreRecord;
use neuro_domains::{DomainSelection, PatientType, RuleSet, catalogue, select_domains};
use neuro_export::writer::SUMMARY_FILE;
use neuro_export::{DomainEntry, NarrativeStatus, NarrativeWriter, RunManifest};
use neuro_instruments::get_instrument;
use neuro_llm::{
    DomainNarrative, GenerationClient, GenerationError, GenerationResult, NarrativeRequestBuilder,
    UsageLedger,
};
use neuro_normalize::{NormalizeOutput, RawRow, normalize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{PatientConfig, ReportConfig};

pub const SUMMARY_KEY: &str = "sirf";
pub const SUMMARY_TITLE: &str = "Summary/Impression";

/// Everything scoped to a single invocation. Consumed by [`run_report`].
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: jiff::Timestamp,
    pub patient: PatientConfig,
    pub output_dir: PathBuf,
    pub ledger: UsageLedger,
}

impl RunContext {
    pub fn new(patient: PatientConfig, output_dir: impl Into<PathBuf>, ledger: UsageLedger) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: jiff::Timestamp::now(),
            patient,
            output_dir: output_dir.into(),
            ledger,
        }
    }
}

/// Normalized scores and the eligibility of every domain for the patient.
pub struct Selection {
    pub normalized: NormalizeOutput,
    pub domains: Vec<DomainSelection>,
}

pub fn select(rows: &[RawRow], patient_type: PatientType, rules: &RuleSet) -> Selection {
    let normalized = normalize(rows);
    let domains = select_domains(&normalized.records, &catalogue(patient_type), rules);
    Selection {
        normalized,
        domains,
    }
}

/// Names the integrated summary must not mention: the id and display name
/// of every catalogued instrument behind `records`, plus the name the
/// export gave it. Rows with no catalogued instrument contribute nothing.
pub fn referenced_tests_of(records: &[ScoreRecord]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for record in records {
        let Some(instrument) = get_instrument(&record.test_id) else {
            continue;
        };
        names.insert(instrument.id().to_string());
        names.insert(instrument.name().to_string());
        names.insert(record.test_name.clone());
    }
    names.retain(|name| !name.trim().is_empty());
    names
}

/// Run the whole pipeline and write the narratives and manifest to the
/// context's output dir.
pub async fn run_report(
    ctx: RunContext,
    rows: &[RawRow],
    config: &ReportConfig,
    client: &GenerationClient,
) -> eyre::Result<RunManifest> {
    info!(run_id = %ctx.run_id, rows = rows.len(), "starting report run");

    let rules = config.rule_set()?;
    let Selection {
        normalized,
        domains,
    } = select(rows, ctx.patient.patient_type, &rules);

    let writer = narrative_writer(&ctx.output_dir, config)?;
    let builder = NarrativeRequestBuilder::new().with_patient_name(ctx.patient.name.clone());
    let requests = domains
        .iter()
        .filter(|d| d.included)
        .map(|d| builder.build_keyed(d.key, d.title, &d.records, SectionKind::DomainSummary))
        .collect();

    let mut outcomes: HashMap<String, Result<GenerationResult, GenerationError>> = client
        .generate_batch(requests, &config.models, &ctx.ledger, config.concurrency)
        .await
        .into_iter()
        .collect();

    let mut entries = Vec::with_capacity(domains.len());
    let mut narratives = Vec::new();
    let mut referenced_tests = BTreeSet::new();

    for domain in &domains {
        let scoreable_rows = domain.scoreable_row_count();
        if !domain.included {
            info!(domain_key = domain.key, reason = %domain.reason, "domain excluded");
            entries.push(DomainEntry {
                key: domain.key.to_string(),
                title: domain.title.to_string(),
                file: None,
                scoreable_rows,
                status: NarrativeStatus::Excluded {
                    reason: domain.reason,
                },
            });
            continue;
        }

        let Some(outcome) = outcomes.remove(domain.key) else {
            eyre::bail!("no generation outcome for domain {}", domain.key);
        };
        if let Ok(result) = &outcome {
            narratives.push(DomainNarrative {
                title: domain.title.to_string(),
                text: result.text.clone(),
            });
            referenced_tests.extend(referenced_tests_of(&domain.records));
        }
        let file_name = domain.config().text_file_name();
        let status = export(&writer, &file_name, domain.title, outcome)?;
        entries.push(DomainEntry {
            key: domain.key.to_string(),
            title: domain.title.to_string(),
            file: Some(file_name),
            scoreable_rows,
            status,
        });
    }

    let integrated_summary = if config.integrated_summary && !narratives.is_empty() {
        let request = builder.build_integrated(
            &narratives,
            &normalized.group_stats,
            referenced_tests.into_iter().collect(),
        );
        let outcome = client.generate(&request, &config.models, &ctx.ledger).await;
        let status = export(&writer, SUMMARY_FILE, SUMMARY_TITLE, outcome)?;
        Some(DomainEntry {
            key: SUMMARY_KEY.to_string(),
            title: SUMMARY_TITLE.to_string(),
            file: Some(SUMMARY_FILE.to_string()),
            scoreable_rows: entries
                .iter()
                .filter(|e| e.is_generated())
                .map(|e| e.scoreable_rows)
                .sum(),
            status,
        })
    } else {
        None
    };

    let manifest = RunManifest {
        run_id: ctx.run_id,
        started_at: ctx.started_at,
        finished_at: jiff::Timestamp::now(),
        patient: ctx.patient.name,
        rows_total: normalized.report.total_rows,
        rows_skipped: normalized.report.skipped.len(),
        domains: entries,
        integrated_summary,
        usage: ctx.ledger.summary(None),
    };
    let path = writer.write_manifest(&manifest)?;

    let pending = manifest.pending_keys();
    if !pending.is_empty() {
        warn!(domains = ?pending, "some sections need a manual narrative");
    }
    info!(
        run_id = %manifest.run_id,
        manifest = %path.display(),
        included = manifest.included().count(),
        calls = manifest.usage.total_calls,
        "report run finished"
    );
    Ok(manifest)
}

/// A writer for `output_dir`, using the config's narrative template if set.
pub fn narrative_writer(output_dir: &Path, config: &ReportConfig) -> eyre::Result<NarrativeWriter> {
    let writer = NarrativeWriter::new(output_dir)?;
    let Some(path) = &config.narrative_template else {
        return Ok(writer);
    };
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read narrative template {}", path.display()))?;
    info!(template = %path.display(), "using custom narrative template");
    Ok(writer.with_narrative_template(&content)?)
}

/// Write the narrative, or a placeholder when every model was exhausted.
fn export(
    writer: &NarrativeWriter,
    file_name: &str,
    title: &str,
    outcome: Result<GenerationResult, GenerationError>,
) -> eyre::Result<NarrativeStatus> {
    match outcome {
        Ok(result) => {
            writer.write_narrative(file_name, &result.text)?;
            Ok(NarrativeStatus::Generated {
                model_id: result.model_id,
                tier: result.tier,
                attempts: result.total_attempts,
            })
        }
        Err(GenerationError::AllModelsExhausted { failures, .. }) => {
            let failures: Vec<String> = failures.iter().map(ToString::to_string).collect();
            writer.write_placeholder(file_name, title, &failures)?;
            Ok(NarrativeStatus::NeedsManualNarrative { failures })
        }
    }
}
