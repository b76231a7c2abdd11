use expert_match::catalog::{find_expert, load_catalog, parse_catalog};
use expert_match::config::AppConfig;
use expert_match::generation::{generate_summary, InterviewParams, NarrativeSource};
use expert_match::session::{ArtifactKind, CaseContext, Stage, SummaryArtifact};
use expert_match::store::{CaseStore, InterviewLog, NewInterview};
use expert_match::{criteria_signature, rank_experts, Criteria, Error, Expert, InterviewTags};

fn criteria(industry: &str) -> Criteria {
    Criteria {
        industries: vec![industry.to_string()],
        functions: vec!["Strategy".to_string()],
        ..Criteria::default()
    }
}

fn summary_artifact() -> SummaryArtifact {
    let expert = Expert {
        id: "exp-001".to_string(),
        ..Expert::default()
    };
    let summary = generate_summary(&criteria("SaaS"), &expert, "script", "transcript 10%", "");
    SummaryArtifact {
        markdown: summary.to_markdown(),
        summary,
    }
}

fn scripted_case() -> CaseContext {
    CaseContext::new("CASE-1", criteria("SaaS"))
        .select_expert("exp-001")
        .record_script(
            "script".to_string(),
            InterviewParams::default(),
            "",
            NarrativeSource::Deterministic,
        )
}

#[test]
fn stages_advance_in_order() {
    let case = CaseContext::new("CASE-1", criteria("SaaS"));
    assert_eq!(case.stage(), Stage::NoScript);
    assert_eq!(case.version, 0);

    let case = scripted_case();
    assert_eq!(case.stage(), Stage::Scripted);

    let case = case
        .record_transcript(
            "transcript".to_string(),
            InterviewParams::default(),
            "",
            NarrativeSource::Deterministic,
        )
        .unwrap();
    assert_eq!(case.stage(), Stage::Transcribed);

    let case = case
        .record_summary(
            summary_artifact(),
            InterviewParams::default(),
            "",
            NarrativeSource::Llm,
        )
        .unwrap();
    assert_eq!(case.stage(), Stage::Summarized);
    assert_eq!(case.version, 4);
}

#[test]
fn transcript_requires_a_script() {
    let result = CaseContext::new("CASE-1", criteria("SaaS")).record_transcript(
        "transcript".to_string(),
        InterviewParams::default(),
        "",
        NarrativeSource::Deterministic,
    );
    assert!(matches!(result, Err(Error::Stage(_))));
}

#[test]
fn summary_requires_a_transcript() {
    let result = scripted_case().record_summary(
        summary_artifact(),
        InterviewParams::default(),
        "",
        NarrativeSource::Deterministic,
    );
    assert!(matches!(result, Err(Error::Stage(_))));
}

#[test]
fn regenerating_the_script_clears_later_artifacts() {
    let case = scripted_case()
        .record_transcript(
            "transcript".to_string(),
            InterviewParams::default(),
            "",
            NarrativeSource::Deterministic,
        )
        .unwrap()
        .record_script(
            "script v2".to_string(),
            InterviewParams::default(),
            "  more on pricing ",
            NarrativeSource::Deterministic,
        );

    assert_eq!(case.stage(), Stage::Scripted);
    assert!(case.transcript.is_none());
    let script = case.script.as_ref().unwrap();
    assert_eq!(script.content, "script v2");
    assert_eq!(script.refine_text, "more on pricing");
}

#[test]
fn switching_experts_drops_interview_artifacts() {
    let case = scripted_case().select_expert("exp-001");
    assert_eq!(case.stage(), Stage::Scripted);

    let case = case.select_expert("exp-002");
    assert_eq!(case.stage(), Stage::NoScript);
    assert_eq!(case.selected_expert_id.as_deref(), Some("exp-002"));
}

#[test]
fn changed_criteria_mark_artifacts_stale() {
    let experts = vec![Expert {
        id: "exp-001".to_string(),
        industry_tags: vec!["SaaS".to_string()],
        ..Expert::default()
    }];
    let ranked = rank_experts(&criteria("SaaS"), &experts);
    let case = scripted_case().record_ranking(&ranked);
    assert!(case.stale_artifacts().is_empty());

    let case = case.with_criteria(criteria("Healthcare"));
    assert_eq!(
        case.stale_artifacts(),
        vec![ArtifactKind::Ranking, ArtifactKind::Script]
    );
    assert_eq!(case.criteria_signature, criteria_signature(&criteria("Healthcare")));

    let case = case.with_criteria(criteria("SaaS"));
    assert!(case.stale_artifacts().is_empty());
}

#[tokio::test]
async fn case_store_round_trips_contexts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("cases.json");

    let store = CaseStore::load(path.clone()).await.unwrap();
    assert!(store.load_case("CASE-1").await.is_none());
    store.save(scripted_case()).await.unwrap();

    let reopened = CaseStore::load(path).await.unwrap();
    let case = reopened.load_case("CASE-1").await.unwrap();
    assert_eq!(case, scripted_case());
    assert_eq!(reopened.codes().await, vec!["CASE-1".to_string()]);
}

#[tokio::test]
async fn interview_log_appends_and_lists_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interviews.json");
    let log = InterviewLog::load(path.clone()).await.unwrap();

    for (expert_id, topic) in [("exp-001", "pricing"), ("exp-002", "churn"), ("exp-003", "ops")] {
        log.append(NewInterview {
            expert_id: expert_id.to_string(),
            tags: InterviewTags {
                topics: vec![topic.to_string()],
                ..InterviewTags::default()
            },
            interview_rating: Some(9),
            ..NewInterview::default()
        })
        .await
        .unwrap();
    }

    let reopened = InterviewLog::load(path).await.unwrap();
    let recent = reopened.recent(2).await;
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, 3);
    assert_eq!(recent[1].expert_id, "exp-002");
    assert_eq!(recent[0].interview_rating, Some(5));

    let tags = reopened.history_tags(20).await;
    assert_eq!(tags.len(), 3);
    assert_eq!(tags[2].topics, vec!["pricing".to_string()]);

    assert_eq!(reopened.get(1).await.map(|record| record.expert_id), Some("exp-001".to_string()));
    assert!(reopened.get(42).await.is_none());
}

#[tokio::test]
async fn failed_writes_leave_stores_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("interviews.json");
    let case_path = dir.path().join("cases.json");
    std::fs::create_dir(dir.path().join("interviews.json.tmp")).unwrap();
    std::fs::create_dir(dir.path().join("cases.json.tmp")).unwrap();

    let log = InterviewLog::load(log_path.clone()).await.unwrap();
    let entry = NewInterview {
        expert_id: "exp-001".to_string(),
        ..NewInterview::default()
    };
    assert!(log.append(entry.clone()).await.is_err());
    assert!(log.recent(10).await.is_empty());
    assert!(log.history_tags(10).await.is_empty());
    assert!(!log_path.exists());

    std::fs::remove_dir(dir.path().join("interviews.json.tmp")).unwrap();
    let record = log.append(entry).await.unwrap();
    assert_eq!(record.id, 1);
    assert_eq!(log.recent(10).await.len(), 1);

    let cases = CaseStore::load(case_path).await.unwrap();
    assert!(cases.save(scripted_case()).await.is_err());
    assert!(cases.load_case("CASE-1").await.is_none());
    assert!(cases.codes().await.is_empty());
}

#[test]
fn catalog_defaults_missing_fields() {
    let experts = parse_catalog(
        r#"[{"id": "exp-1", "name": "A", "ratePerHour": 300,
             "credentials": {"education": "MBA", "formerCompanies": ["X", "Y"]}},
            {"id": "exp-2"}]"#,
    )
    .unwrap();

    assert_eq!(experts.len(), 2);
    assert!((experts[0].rate_per_hour - 300.0).abs() < 1e-6);
    assert_eq!(experts[0].credentials.flatten(), "mba x y");
    assert!(experts[1].industry_tags.is_empty());
    assert!(find_expert(&experts, "exp-2").is_ok());
    assert!(matches!(find_expert(&experts, "exp-9"), Err(Error::UnknownExpert(_))));
}

#[test]
fn catalog_rejects_missing_and_duplicate_ids() {
    let missing = parse_catalog(r#"[{"id": "exp-1"}, {"name": "No id"}]"#);
    assert!(matches!(missing, Err(Error::MissingExpertId { index: 1 })));

    let blank = parse_catalog(r#"[{"id": "  "}]"#);
    assert!(matches!(blank, Err(Error::MissingExpertId { index: 0 })));

    let duplicate = parse_catalog(r#"[{"id": "exp-1"}, {"id": "exp-1"}]"#);
    assert!(matches!(duplicate, Err(Error::DuplicateExpertId(id)) if id == "exp-1"));
}

#[test]
fn catalog_file_errors_name_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = load_catalog(&path).unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn config_round_trips_through_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("expert-match.toml");

    let mut config = AppConfig::default();
    config.matching.keyword = 20.0;
    config.synthesis.history_limit = 5;
    config.write(&path).unwrap();

    let (loaded, loaded_path) = AppConfig::load(Some(path.clone())).unwrap();
    assert_eq!(loaded_path, path);
    assert!((loaded.matching.keyword - 20.0).abs() < 1e-6);
    assert!((loaded.matching.industry - 25.0).abs() < 1e-6);
    assert_eq!(loaded.synthesis.history_limit, 5);
    assert!((loaded.synthesis.agency.cap - 15.0).abs() < 1e-6);
}

#[test]
fn partial_config_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    std::fs::write(&path, "[matching]\nlevel = 15.0\n").unwrap();

    let (config, _) = AppConfig::load(Some(path)).unwrap();
    assert!((config.matching.level - 15.0).abs() < 1e-6);
    assert!((config.matching.rate_penalty - 10.0).abs() < 1e-6);
    assert_eq!(config.generation.params, InterviewParams::default());
    assert_eq!(config.generation.networks.len(), 3);
}
