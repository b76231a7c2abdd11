use expert_match::agency::{draft_outreach_email, simulate_agency_responses, DEFAULT_NETWORKS};
use expert_match::scoring::{AgencyBonusConfig, AgencyBonusScorer, HistoryBonusScorer, RankingPipeline, Synthesizer};
use expert_match::{
    rank_experts, restore_ranking, serialize_ranking, synthesize, AgencyResponse, Criteria,
    Expert, InterviewTags, Recommendation,
};

fn expert(id: &str, industries: &[&str], functions: &[&str], topics: &[&str]) -> Expert {
    Expert {
        id: id.to_string(),
        name: format!("Expert {}", id),
        headline: "Operator".to_string(),
        industry_tags: industries.iter().map(|tag| tag.to_string()).collect(),
        function_tags: functions.iter().map(|tag| tag.to_string()).collect(),
        topic_keywords: topics.iter().map(|tag| tag.to_string()).collect(),
        rate_per_hour: 200.0,
        availability: "Available Monday".to_string(),
        ..Expert::default()
    }
}

fn pool() -> Vec<Expert> {
    vec![
        expert("a", &["SaaS"], &["Strategy"], &["pricing"]),
        expert("b", &["Healthcare"], &["Operations"], &["telehealth"]),
        expert("c", &["Retail"], &["Procurement"], &["logistics"]),
    ]
}

fn request() -> Criteria {
    Criteria {
        industries: vec!["SaaS".to_string()],
        functions: vec!["Strategy".to_string()],
        ..Criteria::default()
    }
}

fn recommendation(agency: &str, expert_id: Option<&str>) -> AgencyResponse {
    AgencyResponse {
        agency_name: agency.to_string(),
        email_subject: "Re: Expert recommendations".to_string(),
        email_body: String::new(),
        recommended_experts: vec![Recommendation {
            id: expert_id.map(str::to_string),
            name: "Someone".to_string(),
            fit_reason: "Deep category knowledge.".to_string(),
            availability: String::new(),
            rate: None,
        }],
    }
}

fn score_of(ranked: &[expert_match::RankedExpert], id: &str) -> f64 {
    ranked
        .iter()
        .find(|item| item.expert.id == id)
        .map(|item| item.score)
        .unwrap_or(f64::NAN)
}

#[test]
fn synthesis_keeps_every_expert_once_in_order() {
    let experts = pool();
    let responses = vec![recommendation("NEXUS", Some("c"))];
    let ranked = synthesize(&request(), &experts, None, &responses, &[]);

    assert_eq!(ranked.len(), experts.len());
    let mut ids: Vec<&str> = ranked.iter().map(|item| item.expert.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));
    assert!(ranked.iter().all(|item| !item.match_reasons.is_empty()));
}

#[test]
fn agency_bonus_is_capped_at_fifteen() {
    let experts = pool();
    let base = rank_experts(&request(), &experts);
    let responses: Vec<AgencyResponse> = ["NEXUS", "PRIME", "ALIGN", "ORBIT"]
        .iter()
        .map(|agency| recommendation(agency, Some("b")))
        .collect();

    let ranked = synthesize(&request(), &experts, Some(&base), &responses, &[]);

    let base_b = score_of(&base, "b");
    assert!((score_of(&ranked, "b") - (base_b + 15.0)).abs() < 1e-6);

    let b = ranked.iter().find(|item| item.expert.id == "b").map(|item| &item.match_reasons);
    let reasons = b.cloned().unwrap_or_default();
    assert_eq!(reasons[0], "Agency recommendations: 4");
    assert_eq!(reasons[1], "NEXUS: Deep category knowledge.");
    assert_eq!(reasons.len(), 5);
}

#[test]
fn recommendations_without_id_are_ignored() {
    let experts = pool();
    let base = rank_experts(&request(), &experts);
    let responses = vec![recommendation("NEXUS", None), recommendation("PRIME", Some(""))];

    let ranked = synthesize(&request(), &experts, Some(&base), &responses, &[]);
    for item in &ranked {
        assert!((item.score - score_of(&base, &item.expert.id)).abs() < 1e-6);
        assert_eq!(item.match_reasons, vec!["Matches core criteria.".to_string()]);
    }
}

#[test]
fn history_bonus_is_capped_at_ten() {
    let experts = pool();
    let base = rank_experts(&request(), &experts);
    let history: Vec<InterviewTags> = (0..5)
        .map(|_| InterviewTags {
            industries: vec!["Retail".to_string()],
            functions: vec!["Procurement".to_string()],
            levels: Vec::new(),
            topics: vec!["LOGISTICS".to_string()],
        })
        .collect();

    let scorer = HistoryBonusScorer::default();
    let c = &experts[2];
    assert!((scorer.bonus(c, &history[..1]) - 5.0).abs() < 1e-6);
    assert!((scorer.bonus(c, &history) - 10.0).abs() < 1e-6);

    let ranked = synthesize(&request(), &experts, Some(&base), &[], &history);
    assert!((score_of(&ranked, "c") - (score_of(&base, "c") + 10.0)).abs() < 1e-6);
    let reasons = ranked
        .iter()
        .find(|item| item.expert.id == "c")
        .map(|item| item.match_reasons.clone())
        .unwrap_or_default();
    assert_eq!(reasons, vec!["Aligned with past interview history tags.".to_string()]);
}

#[test]
fn experts_missing_from_base_ranking_start_at_zero() {
    let experts = pool();
    let base = rank_experts(&request(), &experts[..1]);
    let responses = vec![recommendation("NEXUS", Some("c"))];

    let ranked = synthesize(&request(), &experts, Some(&base), &responses, &[]);

    assert_eq!(ranked.len(), 3);
    assert!((score_of(&ranked, "c") - 5.0).abs() < 1e-6);
    assert!((score_of(&ranked, "b") - 0.0).abs() < 1e-6);
}

#[test]
fn final_scores_are_clamped() {
    let experts = vec![expert("a", &["SaaS"], &["Strategy"], &[])];
    let mut request = request();
    request.free_text = "pricing".to_string();
    let base = vec![expert_match::RankedExpert {
        expert: experts[0].clone(),
        score: 95.0,
        match_reasons: Vec::new(),
    }];
    let responses = vec![recommendation("NEXUS", Some("a")), recommendation("PRIME", Some("a"))];

    let ranked = synthesize(&request, &experts, Some(&base), &responses, &[]);
    assert!((ranked[0].score - 100.0).abs() < 1e-6);
}

#[test]
fn configured_bonus_weights_are_used() {
    let synthesizer = Synthesizer::new(
        RankingPipeline::default(),
        AgencyBonusScorer::new(AgencyBonusConfig {
            per_mention: 2.0,
            cap: 3.0,
        }),
        HistoryBonusScorer::default(),
    );
    let experts = pool();
    let responses = vec![recommendation("NEXUS", Some("b")), recommendation("PRIME", Some("b"))];
    let base = rank_experts(&request(), &experts);

    let ranked = synthesizer.synthesize(&request(), &experts, Some(&base), &responses, &[]);
    assert!((score_of(&ranked, "b") - (score_of(&base, "b") + 3.0)).abs() < 1e-6);
}

#[test]
fn simulated_agencies_recommend_consecutive_pairs() {
    let experts: Vec<Expert> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| expert(id, &["SaaS"], &["Strategy"], &[]))
        .collect();
    let ranked = rank_experts(&request(), &experts);

    let responses = simulate_agency_responses(&ranked, &[]);

    // five ranked experts cover two full pairs
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].agency_name, DEFAULT_NETWORKS[0]);
    assert_eq!(responses[1].agency_name, DEFAULT_NETWORKS[1]);
    assert_eq!(responses[0].recommended_experts[0].id.as_deref(), Some("a"));
    assert_eq!(responses[0].recommended_experts[1].id.as_deref(), Some("b"));
    assert_eq!(responses[1].recommended_experts[0].id.as_deref(), Some("c"));
    assert_eq!(
        responses[1].recommended_experts[1].fit_reason,
        "Recent leadership experience with similar scope."
    );
    assert!(responses[0].email_body.starts_with("BRAND - EXPERTS"));
    assert!(responses[1].email_body.starts_with("Hello Team,"));
    assert!(responses[1].email_body.contains("available for a call this week"));
}

#[test]
fn simulated_agencies_need_at_least_two_experts() {
    let ranked = rank_experts(&request(), &pool()[..1]);
    assert!(simulate_agency_responses(&ranked, &["ONLY".to_string()]).is_empty());
}

#[test]
fn outreach_email_lists_request_and_shortlist() {
    let mut request = request();
    request.profile_text = "pricing pricing churn".to_string();
    request.linkedin_url = "https://www.linkedin.com/in/someone".to_string();
    let ranked = rank_experts(&request, &pool());

    let email = draft_outreach_email(&request, &["NEXUS".to_string()], &ranked);

    assert!(email.starts_with("Background / request\nNo additional context provided."));
    assert!(email.contains("- Industries: SaaS"));
    assert!(email.contains("- Levels: Any level"));
    assert!(email.contains("- Networks: NEXUS"));
    assert!(email.contains("- Profile keywords: pricing, churn"));
    assert!(email.contains("- LinkedIn URL: https://www.linkedin.com/in/someone"));
    assert!(email.contains("Proposed Expert Shortlist\n- Expert a (Operator)"));
}

#[test]
fn stored_rankings_restore_against_the_current_pool() {
    let experts = pool();
    let ranked = rank_experts(&request(), &experts);
    let records = serialize_ranking(&ranked);

    let restored = restore_ranking(&records, &experts[1..]);

    assert_eq!(restored.len(), 2);
    assert!(restored.iter().all(|item| item.expert.id != "a"));
    assert!(restored.windows(2).all(|pair| pair[0].score >= pair[1].score));
}
