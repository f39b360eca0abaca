//! Heuristic quality check for generated narratives.
//!
//! Scoring starts at 100 and loses 25 per issue and 10 per warning. Output
//! is accepted only with no issues and a score of at least 60.

use std::sync::LazyLock;

use neuro_core::models::generation::GenerationRequest;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_LENGTH: usize = 100;
pub const PASSING_SCORE: u8 = 60;
const ISSUE_PENALTY: u32 = 25;
const WARNING_PENALTY: u32 = 10;
const MAX_PERCENTILE_MENTIONS: usize = 5;
const MAX_SCORE_MENTIONS: usize = 2;
const MIN_CLINICAL_TERMS: usize = 2;

/// Vocabulary a clinical narrative is expected to use.
const CLINICAL_TERMS: &[&str] = &[
    "average",
    "impair",
    "deficit",
    "strength",
    "weakness",
    "intact",
    "difficult",
    "cognitive",
    "functioning",
    "performance",
    "ability",
    "abilities",
    "skills",
    "relative",
    "elevated",
    "clinically significant",
    "at-risk",
    "within normal limits",
];

/// A two- or three-digit number, with an optional ordinal or percent suffix
/// and an optional trailing "percentile".
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{2,3}(?:\.\d+)?(st|nd|rd|th|%|\b)(\s+percentile)?")
        .expect("number pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub quality_score: u8,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub is_valid: bool,
}

impl QualityReport {
    fn from_findings(issues: Vec<String>, warnings: Vec<String>) -> Self {
        let penalty =
            issues.len() as u32 * ISSUE_PENALTY + warnings.len() as u32 * WARNING_PENALTY;
        let quality_score = 100u32.saturating_sub(penalty) as u8;
        let is_valid = issues.is_empty() && quality_score >= PASSING_SCORE;
        Self {
            quality_score,
            issues,
            warnings,
            is_valid,
        }
    }
}

/// Score `text` as a response to `request`.
///
/// Naming a test in a section that forbids it is an issue under strict
/// validation and a warning otherwise.
pub fn assess(text: &str, request: &GenerationRequest) -> QualityReport {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();
    let lower = text.to_lowercase();

    let length = text.trim().chars().count();
    if length < MIN_LENGTH {
        issues.push(format!(
            "output is {length} characters; at least {MIN_LENGTH} expected"
        ));
    }

    if request.section_kind.forbids_test_names() {
        let named: Vec<&str> = request
            .referenced_tests
            .iter()
            .map(String::as_str)
            .filter(|name| mentions(text, name))
            .collect();
        if !named.is_empty() {
            let finding = format!("mentions test names: {}", named.join(", "));
            if request.requires_strict_validation {
                issues.push(finding);
            } else {
                warnings.push(finding);
            }
        }
    }

    let (percentiles, scores) = count_numbers(text);
    if percentiles > MAX_PERCENTILE_MENTIONS {
        warnings.push(format!(
            "{percentiles} percentile values mentioned; prefer qualitative descriptions"
        ));
    }
    if scores > MAX_SCORE_MENTIONS {
        warnings.push(format!("{scores} raw numeric scores mentioned"));
    }

    let terms = CLINICAL_TERMS
        .iter()
        .filter(|term| lower.contains(**term))
        .count();
    if terms < MIN_CLINICAL_TERMS {
        warnings.push(format!("only {terms} clinical terms used"));
    }

    QualityReport::from_findings(issues, warnings)
}

/// Whether `text` names `name` as a whole word, ignoring case. Names may
/// end in punctuation ("WISC-V", "D-KEFS"), so the boundary is any non-word
/// character rather than `\b`.
fn mentions(text: &str, name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }
    Regex::new(&format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(name)))
        .is_ok_and(|pattern| pattern.is_match(text))
}

/// Count (percentile mentions, other numeric score mentions).
fn count_numbers(text: &str) -> (usize, usize) {
    let mut percentiles = 0;
    let mut scores = 0;
    for caps in NUMBER.captures_iter(text) {
        let suffixed = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        if suffixed || caps.get(2).is_some() {
            percentiles += 1;
        } else {
            scores += 1;
        }
    }
    (percentiles, scores)
}

#[cfg(test)]
mod tests {
    use neuro_core::models::generation::SectionKind;

    use super::*;

    const GOOD: &str = "Overall cognitive ability fell within the average range. Verbal \
        reasoning was a relative strength, while processing speed was an area of weakness \
        that may affect classroom performance.";

    fn request(kind: SectionKind, strict: bool) -> GenerationRequest {
        GenerationRequest {
            section_kind: kind,
            prompt_system: String::new(),
            prompt_user: String::new(),
            domain_key: "iq".to_string(),
            temperature: 0.3,
            requires_strict_validation: strict,
            referenced_tests: vec!["WISC-V".to_string()],
        }
    }

    #[test]
    fn clean_narrative_scores_full_marks() {
        let report = assess(GOOD, &request(SectionKind::IntegratedSummary, true));
        assert_eq!(report.quality_score, 100);
        assert!(report.is_valid);
    }

    #[test]
    fn short_output_is_an_issue() {
        let report = assess("Average.", &request(SectionKind::DomainSummary, true));
        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_names_depend_on_strictness() {
        let text = format!("{GOOD} The WISC-V was administered.");
        let strict = assess(&text, &request(SectionKind::IntegratedSummary, true));
        assert_eq!(strict.issues.len(), 1);
        assert_eq!(strict.quality_score, 75);
        assert!(!strict.is_valid);

        let lenient = assess(&text, &request(SectionKind::IntegratedSummary, false));
        assert!(lenient.issues.is_empty());
        assert_eq!(lenient.quality_score, 90);
        assert!(lenient.is_valid);

        let domain = assess(&text, &request(SectionKind::DomainSummary, true));
        assert_eq!(domain.quality_score, 100);
    }

    #[test]
    fn test_names_match_whole_words_only() {
        let mut req = request(SectionKind::IntegratedSummary, true);
        req.referenced_tests = vec!["NAB".to_string()];
        let text = format!("{GOOD} She was unable to sustain attention across tasks.");
        let report = assess(&text, &req);
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert!(report.is_valid);

        let named = assess(&format!("{GOOD} On the nab, memory was intact."), &req);
        assert_eq!(named.issues, vec!["mentions test names: NAB".to_string()]);
    }

    #[test]
    fn punctuated_test_names_are_still_found() {
        let req = request(SectionKind::IntegratedSummary, true);
        for text in [
            "WISC-V results were reviewed.",
            "Results (wisc-v) were reviewed.",
            "Results were reviewed with the WISC-V.",
        ] {
            let report = assess(&format!("{GOOD} {text}"), &req);
            assert_eq!(report.issues.len(), 1, "{text}");
        }
        let report = assess(&format!("{GOOD} The WISC-VI norms differ."), &req);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn score_dumps_are_penalized() {
        let text = format!(
            "{GOOD} Scores were 85, 92, 101 and 77, at the 16th, 30th, 53rd, 6th, 45th, 12th and 91st percentile."
        );
        let report = assess(&text, &request(SectionKind::DomainSummary, false));
        assert_eq!(report.warnings.len(), 2, "{:?}", report.warnings);
        assert_eq!(report.quality_score, 80);
    }

    #[test]
    fn number_classification() {
        assert_eq!(count_numbers("the 84th percentile"), (1, 0));
        assert_eq!(count_numbers("a score of 85"), (0, 1));
        assert_eq!(count_numbers("37% and 50 percentile"), (2, 0));
        assert_eq!(count_numbers("in 2024 at age 9"), (0, 0));
    }

    #[test]
    fn score_floor_is_zero() {
        let report = QualityReport::from_findings(vec![String::new(); 5], vec![String::new(); 3]);
        assert_eq!(report.quality_score, 0);
    }
}
