//! Prompt assembly for domain and summary narratives.
//!
//! The user payload wraps the score data in an XML-style block so the
//! model can tell data from instructions. The builder never generates text
//! itself.

use std::collections::BTreeMap;

use neuro_core::models::generation::{GenerationRequest, SectionKind};
use neuro_core::models::score::{ScoreRecord, ScoreType};
use neuro_core::models::stats::{DomainGroupStats, GroupLevel};

pub const DEFAULT_TEMPERATURE: f32 = 0.3;

const DOMAIN_SYSTEM_PROMPT: &str = "\
You are a clinical neuropsychologist writing one results section of a \
neuropsychological evaluation report. Write one or two paragraphs of plain \
prose describing the patient's performance in this domain. Describe \
performance with the qualitative range labels provided (for example \
\"Low Average\" or \"Above Average\") rather than repeating every score; \
cite at most one or two key percentiles. Note relative strengths and \
weaknesses within the domain. Do not speculate beyond the data, do not \
diagnose, and do not use headings or bullet points.";

const INTEGRATED_SYSTEM_PROMPT: &str = "\
You are a clinical neuropsychologist writing the summary of impressions for \
a neuropsychological evaluation report. Integrate the domain findings \
provided into two or three paragraphs that describe the overall pattern of \
cognitive strengths and weaknesses and how they relate to one another. \
Refer to abilities and domains, never to the names of individual tests. \
Use qualitative range labels rather than numbers, and do not use headings \
or bullet points.";

const COMPREHENSIVE_SYSTEM_PROMPT: &str = "\
You are a clinical neuropsychologist writing the closing summary of a \
neuropsychological evaluation report for referral sources and family. \
Summarize the most important findings across all domains in accessible \
language, emphasizing functional implications. Refer to abilities rather \
than test names, avoid numeric scores, and do not use headings or bullet \
points.";

/// A narrative already generated for one domain, fed into a summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainNarrative {
    pub title: String,
    pub text: String,
}

/// Builds [`GenerationRequest`]s from validated records.
#[derive(Debug, Clone)]
pub struct NarrativeRequestBuilder {
    patient_name: Option<String>,
    temperature: f32,
}

impl Default for NarrativeRequestBuilder {
    fn default() -> Self {
        Self {
            patient_name: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl NarrativeRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patient_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.patient_name = (!name.trim().is_empty()).then_some(name);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    /// Request for one domain, keyed by a slug of `domain_name`.
    pub fn build(
        &self,
        domain_name: &str,
        records: &[ScoreRecord],
        section_kind: SectionKind,
    ) -> GenerationRequest {
        self.build_keyed(&slug(domain_name), domain_name, records, section_kind)
    }

    pub fn build_keyed(
        &self,
        domain_key: &str,
        domain_name: &str,
        records: &[ScoreRecord],
        section_kind: SectionKind,
    ) -> GenerationRequest {
        let mut user = String::new();
        user.push_str(&format!("Domain: {domain_name}\n"));
        if let Some(name) = &self.patient_name {
            user.push_str(&format!("Patient: {name}\n"));
        }
        user.push('\n');
        user.push_str(&score_block(records));
        user.push_str(
            "\n\nWrite the narrative for this domain. Prefer the qualitative range \
             labels over numbers and do not list every percentile.",
        );

        GenerationRequest {
            section_kind,
            prompt_system: system_prompt(section_kind).to_string(),
            prompt_user: user,
            domain_key: domain_key.to_string(),
            temperature: self.temperature,
            requires_strict_validation: section_kind.forbids_test_names(),
            referenced_tests: test_names(records),
        }
    }

    /// Request for the integrated summary across domains.
    ///
    /// `referenced_tests` are the tests behind the narratives; the summary
    /// must not name them.
    pub fn build_integrated(
        &self,
        narratives: &[DomainNarrative],
        group_stats: &[DomainGroupStats],
        referenced_tests: Vec<String>,
    ) -> GenerationRequest {
        let section_kind = SectionKind::IntegratedSummary;
        let mut user = String::new();
        if let Some(name) = &self.patient_name {
            user.push_str(&format!("Patient: {name}\n\n"));
        }

        let domain_stats: Vec<&DomainGroupStats> = group_stats
            .iter()
            .filter(|g| g.key.level == GroupLevel::Domain && g.mean_z.is_some())
            .collect();
        if !domain_stats.is_empty() {
            user.push_str("<domain_means>\n");
            for g in domain_stats {
                if let Some(mean) = g.mean_z {
                    user.push_str(&format!(
                        "- {}: mean z {:.2} across {} scores\n",
                        g.key.domain, mean, g.n
                    ));
                }
            }
            user.push_str("</domain_means>\n\n");
        }

        user.push_str("<domain_findings>\n");
        for n in narratives {
            user.push_str(&format!("<domain name=\"{}\">\n", n.title));
            user.push_str(n.text.trim());
            user.push_str("\n</domain>\n");
        }
        user.push_str("</domain_findings>\n\n");
        user.push_str("Write the integrated summary of these findings.");

        GenerationRequest {
            section_kind,
            prompt_system: system_prompt(section_kind).to_string(),
            prompt_user: user,
            domain_key: "sirf".to_string(),
            temperature: self.temperature,
            requires_strict_validation: true,
            referenced_tests,
        }
    }
}

pub fn system_prompt(section_kind: SectionKind) -> &'static str {
    match section_kind {
        SectionKind::DomainSummary => DOMAIN_SYSTEM_PROMPT,
        SectionKind::IntegratedSummary => INTEGRATED_SYSTEM_PROMPT,
        SectionKind::ComprehensiveSummary => COMPREHENSIVE_SYSTEM_PROMPT,
    }
}

/// Scoreable records grouped by test, in first-seen order.
fn score_block(records: &[ScoreRecord]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut by_test: BTreeMap<&str, Vec<&ScoreRecord>> = BTreeMap::new();
    for r in records.iter().filter(|r| r.is_scoreable()) {
        let name = r.test_name.as_str();
        if !by_test.contains_key(name) {
            order.push(name);
        }
        by_test.entry(name).or_default().push(r);
    }

    if order.is_empty() {
        return "<scores>\n</scores>".to_string();
    }

    let mut block = String::from("<scores>\n");
    for name in order {
        block.push_str(&format!("<test name=\"{name}\">\n"));
        for r in by_test.get(name).into_iter().flatten() {
            block.push_str(&format!("- {}\n", describe(r)));
        }
        block.push_str("</test>\n");
    }
    block.push_str("</scores>");
    block
}

fn describe(r: &ScoreRecord) -> String {
    let mut parts = Vec::new();
    if let (Some(score), Some(score_type)) = (r.standard_score, r.score_type) {
        parts.push(format!("{} {}", score_type_label(score_type), format_number(score)));
    }
    if let Some(p) = r.percentile {
        parts.push(format!("percentile {}", format_number(p)));
    }
    if let Some(range) = r.qualitative_range {
        parts.push(range.label().to_string());
    }
    if let Some(rater) = r.rater {
        parts.push(format!("{rater} report"));
    }

    let mut line = r.scale_name.clone();
    if let Some(sub) = &r.subdomain {
        line.push_str(&format!(" ({sub})"));
    }
    if !parts.is_empty() {
        line.push_str(&format!(": {}", parts.join("; ")));
    }
    line
}

fn score_type_label(score_type: ScoreType) -> &'static str {
    match score_type {
        ScoreType::TScore => "T score",
        ScoreType::ScaledScore => "scaled score",
        ScoreType::StandardScore => "standard score",
        ScoreType::ZScore => "z score",
        ScoreType::Percentile => "percentile rank",
        ScoreType::RawScore => "raw score",
        ScoreType::BaseRate => "base rate",
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn test_names(records: &[ScoreRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for r in records {
        if !r.test_name.is_empty() && !names.contains(&r.test_name) {
            names.push(r.test_name.clone());
        }
    }
    names
}

/// `"Attention/Executive"` → `"attention_executive"`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}
