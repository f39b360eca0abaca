use neuro_core::models::generation::SectionKind;
use neuro_core::models::score::{QualitativeRange, ScoreRecord, ScoreType};
use neuro_core::models::stats::{DomainGroupStats, GroupKey};
use neuro_llm::prompt::slug;
use neuro_llm::{DomainNarrative, NarrativeRequestBuilder};

fn record(test_name: &str, scale: &str, score: Option<f64>, percentile: Option<f64>) -> ScoreRecord {
    ScoreRecord {
        test_id: test_name.to_lowercase(),
        test_name: test_name.to_string(),
        scale_name: scale.to_string(),
        raw_score: None,
        standard_score: score,
        score_type: score.map(|_| ScoreType::ScaledScore),
        percentile,
        z: None,
        domain: "Memory".to_string(),
        subdomain: None,
        narrow_category: None,
        qualitative_range: percentile.and_then(QualitativeRange::from_percentile),
        rater: None,
        source_file: "scores.json".to_string(),
    }
}

#[test]
fn domain_request_lists_scores_by_test() {
    let records = vec![
        record("NAB", "List Learning", Some(7.0), Some(16.0)),
        record("WISC-V", "Digit Span", Some(10.0), Some(50.0)),
        record("NAB", "Story Recall", None, Some(63.0)),
    ];

    let req = NarrativeRequestBuilder::new()
        .with_patient_name("Jordan")
        .build("Memory", &records, SectionKind::DomainSummary);

    assert_eq!(req.domain_key, "memory");
    assert_eq!(req.section_kind, SectionKind::DomainSummary);
    assert!(!req.requires_strict_validation);
    assert_eq!(req.referenced_tests, vec!["NAB", "WISC-V"]);
    assert!(req.prompt_user.contains("Patient: Jordan"));
    assert!(req.prompt_user.contains("<test name=\"NAB\">"));
    assert!(req.prompt_user.contains("- List Learning: scaled score 7; percentile 16; Low Average"));
    assert!(req.prompt_user.contains("- Story Recall: percentile 63; Average"));

    assert!(req.prompt_user.starts_with(
        "Domain: Memory\nPatient: Jordan\n\n<scores>\n<test name=\"NAB\">\n\
         - List Learning: scaled score 7; percentile 16; Low Average\n\
         - Story Recall: percentile 63; Average\n</test>\n<test name=\"WISC-V\">\n"
    ));

    let nab = req.prompt_user.find("<test name=\"NAB\">").unwrap();
    let wisc = req.prompt_user.find("<test name=\"WISC-V\">").unwrap();
    assert!(nab < wisc);
}

#[test]
fn payload_discourages_score_dumps() {
    let req = NarrativeRequestBuilder::new().build("Memory", &[], SectionKind::DomainSummary);
    assert!(req.prompt_system.contains("rather than repeating every score"));
    assert!(req.prompt_user.contains("do not list every percentile"));
}

#[test]
fn unscoreable_records_are_left_out() {
    let records = vec![record("NAB", "Naming", None, None)];
    let req = NarrativeRequestBuilder::new().build("Memory", &records, SectionKind::DomainSummary);
    assert!(!req.prompt_user.contains("Naming"));
}

#[test]
fn building_is_pure() {
    let records = vec![record("NAB", "List Learning", Some(7.0), Some(16.0))];
    let builder = NarrativeRequestBuilder::new().with_temperature(0.2);
    let a = builder.build("Memory", &records, SectionKind::DomainSummary);
    let b = builder.build("Memory", &records, SectionKind::DomainSummary);
    assert_eq!(a, b);
    assert_eq!(a.temperature, 0.2);
}

#[test]
fn summary_sections_are_strict() {
    let req = NarrativeRequestBuilder::new().build("Memory", &[], SectionKind::ComprehensiveSummary);
    assert!(req.requires_strict_validation);
}

#[test]
fn integrated_request_carries_narratives_and_means() {
    let narratives = vec![
        DomainNarrative {
            title: "Memory".to_string(),
            text: "Memory was broadly average.".to_string(),
        },
        DomainNarrative {
            title: "Attention/Executive".to_string(),
            text: "Attention was a weakness.\n".to_string(),
        },
    ];
    let stats = vec![DomainGroupStats {
        key: GroupKey::domain("Memory"),
        n: 3,
        z_count: 3,
        mean_z: Some(-0.25),
        sd_z: Some(0.5),
    }];

    let req = NarrativeRequestBuilder::new().build_integrated(
        &narratives,
        &stats,
        vec!["NAB".to_string()],
    );

    assert_eq!(req.section_kind, SectionKind::IntegratedSummary);
    assert_eq!(req.domain_key, "sirf");
    assert!(req.requires_strict_validation);
    assert_eq!(req.referenced_tests, vec!["NAB"]);
    assert!(req.prompt_user.contains("- Memory: mean z -0.25 across 3 scores"));
    assert!(req.prompt_user.contains("<domain name=\"Attention/Executive\">\nAttention was a weakness.\n</domain>"));
}

#[test]
fn slugs() {
    assert_eq!(slug("Attention/Executive"), "attention_executive");
    assert_eq!(slug("General Cognitive Ability"), "general_cognitive_ability");
    assert_eq!(slug("  ADHD "), "adhd");
}
