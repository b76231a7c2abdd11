use serde_json::{json, Value};

use expert_match::agency::{collect_agency_responses, synthesis_note, SYNTHESIS_FALLBACK};
use expert_match::generation::{
    extract_metrics, generate_script, generate_summary, generate_transcript, Depth,
    InterviewParams, NarrativeSource, Narrator, Tone,
};
use expert_match::llm::{Offline, TextGenerator};
use expert_match::{rank_experts, Criteria, Expert, TextList};

struct Canned {
    text: Option<String>,
    json: Option<Value>,
}

impl TextGenerator for Canned {
    fn is_available(&self) -> bool {
        true
    }

    async fn generate_text(&self, _system: &str, _user: &str, _max_tokens: u32) -> Option<String> {
        self.text.clone()
    }

    async fn generate_json(&self, _system: &str, _user: &str, _max_tokens: u32) -> Option<Value> {
        self.json.clone()
    }
}

fn sample_expert() -> Expert {
    let mut expert = Expert {
        id: "exp-001".to_string(),
        name: "Dana Whitfield".to_string(),
        headline: "VP Pricing".to_string(),
        industry_tags: vec!["SaaS".to_string()],
        function_tags: vec!["Strategy".to_string()],
        role_level: "VP".to_string(),
        years_experience: 16,
        topic_keywords: vec!["packaging".to_string(), "retention".to_string()],
        compliance_flags: vec!["No current employer discussion".to_string()],
        ..Expert::default()
    };
    expert.credentials.former_companies = TextList::Many(vec![
        "Salesforce".to_string(),
        "Zendesk".to_string(),
        "Atlassian".to_string(),
        "Oracle".to_string(),
    ]);
    expert
}

fn sample_criteria() -> Criteria {
    Criteria {
        industries: vec!["SaaS".to_string()],
        functions: vec!["Strategy".to_string()],
        levels: vec!["VP".to_string()],
        free_text: "usage based pricing".to_string(),
        ..Criteria::default()
    }
}

fn first_theme(script: &str) -> Option<&str> {
    script.lines().find(|line| line.starts_with("### Theme: "))
}

#[test]
fn script_is_reproducible() {
    let params = InterviewParams::default();
    let first = generate_script(&sample_criteria(), &sample_expert(), &params, "");
    let second = generate_script(&sample_criteria(), &sample_expert(), &params, "");
    assert_eq!(first, second);
    assert!(first.starts_with("# Expert Interview Script: Dana Whitfield"));
}

#[test]
fn script_varies_with_parameters() {
    let base = generate_script(&sample_criteria(), &sample_expert(), &InterviewParams::default(), "");
    let shorter = InterviewParams {
        length_minutes: 30,
        ..InterviewParams::default()
    };
    assert_ne!(base, generate_script(&sample_criteria(), &sample_expert(), &shorter, ""));
}

#[test]
fn refinement_leads_the_theme_list() {
    let params = InterviewParams::default();
    let base = generate_script(&sample_criteria(), &sample_expert(), &params, "");
    let refined = generate_script(&sample_criteria(), &sample_expert(), &params, "focus on CHURN drivers");

    assert_eq!(first_theme(&refined), Some("### Theme: Focus on churn drivers"));
    assert_ne!(first_theme(&base), first_theme(&refined));
    assert!(refined.matches("### Theme: ").count() <= 4);
}

#[test]
fn script_themes_come_from_request_and_expert() {
    let script = generate_script(&sample_criteria(), &sample_expert(), &InterviewParams::default(), "");
    let allowed = ["Strategy", "SaaS", "usage", "based", "pricing", "packaging", "retention"];
    let themes: Vec<&str> = script
        .lines()
        .filter_map(|line| line.strip_prefix("### Theme: "))
        .collect();

    assert_eq!(themes.len(), 4);
    assert!(themes.iter().all(|theme| allowed.contains(theme)));
}

#[test]
fn transcript_opens_with_tone_line() {
    let criteria = sample_criteria();
    let expert = sample_expert();
    let script = generate_script(&criteria, &expert, &InterviewParams::default(), "");

    let friendly = InterviewParams {
        tone: Tone::Friendly,
        ..InterviewParams::default()
    };
    let transcript = generate_transcript(&criteria, &expert, &script, &friendly, "");
    assert!(transcript.starts_with("Consultant: Appreciate you taking the time to share your experience."));

    let assertive = InterviewParams {
        tone: Tone::Assertive,
        ..InterviewParams::default()
    };
    let transcript = generate_transcript(&criteria, &expert, &script, &assertive, "");
    assert!(transcript.starts_with("Consultant: We will keep this focused and time-boxed."));

    let neutral = InterviewParams {
        tone: Tone::parse("Curious"),
        ..InterviewParams::default()
    };
    let transcript = generate_transcript(&criteria, &expert, &script, &neutral, "");
    assert!(transcript.starts_with("Consultant: Thanks for joining today."));
    assert!(transcript.contains("compliance boundaries: No current employer discussion."));
}

#[test]
fn transcript_is_reproducible_and_tracks_the_script() {
    let criteria = sample_criteria();
    let expert = sample_expert();
    let params = InterviewParams {
        depth: Depth::HighLevel,
        ..InterviewParams::default()
    };
    let script = generate_script(&criteria, &expert, &params, "");

    let first = generate_transcript(&criteria, &expert, &script, &params, "");
    assert_eq!(first, generate_transcript(&criteria, &expert, &script, &params, ""));

    let other_script = format!("{}\n- Q: One more question", script);
    assert_ne!(first, generate_transcript(&criteria, &expert, &other_script, &params, ""));
    assert!(first.ends_with("I can provide generalized patterns and illustrative figures only."));
}

fn section<'a>(lines: &[&'a str], header: &str) -> Vec<&'a str> {
    lines
        .iter()
        .skip_while(|line| !line.starts_with(header))
        .skip(1)
        .take_while(|line| !line.is_empty())
        .copied()
        .collect()
}

fn count_prefixed(lines: &[&str], prefix: &str) -> usize {
    lines.iter().filter(|line| line.starts_with(prefix)).count()
}

#[test]
fn script_sections_stay_within_their_sizes() {
    for depth in [Depth::HighLevel, Depth::DeepDive] {
        for length_minutes in 1..=150 {
            let params = InterviewParams {
                length_minutes,
                depth,
                ..InterviewParams::default()
            };
            let script = generate_script(&sample_criteria(), &sample_expert(), &params, "");
            let lines: Vec<&str> = script.lines().collect();

            let objectives = section(&lines, "## Interview Objective");
            assert!((3..=5).contains(&objectives.len()), "objectives: {}", objectives.len());

            let qualification = count_prefixed(&section(&lines, "## 1) Filtering"), "- Q: ");
            assert!((6..=9).contains(&qualification), "qualification: {}", qualification);

            let wrap_up = count_prefixed(&section(&lines, "## 3) Wrap-up"), "- Q: ");
            assert!((3..=5).contains(&wrap_up), "wrap-up: {}", wrap_up);

            let themes: Vec<usize> = lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.starts_with("### Theme: "))
                .map(|(idx, _)| idx)
                .collect();
            assert!(!themes.is_empty());
            for idx in themes {
                let block = section(&lines[idx..], "### Theme: ");
                assert_eq!(count_prefixed(&block, "- Q: "), depth.questions_per_theme());
                assert_eq!(count_prefixed(&block, "- Follow-up: "), 2);
            }
        }
    }
}

#[test]
fn transcript_turns_and_figures_stay_within_their_ranges() {
    let single = regex::Regex::new(r"gains of (\d+)%").unwrap();
    let range = regex::Regex::new(r"range is (\d+)-(\d+)%").unwrap();
    let clarification = "Consultant: Can you clarify the constraint behind that?";
    let mut clarified = 0;
    let mut turns = 0;

    for depth in [Depth::HighLevel, Depth::DeepDive] {
        for run in 0..150 {
            let params = InterviewParams {
                depth,
                ..InterviewParams::default()
            };
            let script = format!("script revision {}", run);
            let transcript =
                generate_transcript(&sample_criteria(), &sample_expert(), &script, &params, "");
            let blocks: Vec<&str> = transcript.split("\n\n").collect();
            assert!(blocks.len() >= 3);

            for block in &blocks[1..blocks.len() - 1] {
                let lines: Vec<&str> = block.lines().collect();
                let questions = count_prefixed(&lines, "Consultant: ") - count_prefixed(&lines, clarification);
                assert_eq!(questions, depth.turns_per_theme());
                turns += questions;
                clarified += count_prefixed(&lines, clarification);
            }

            for caps in single.captures_iter(&transcript) {
                let low: u32 = caps[1].parse().unwrap();
                assert!((5..=25).contains(&low));
            }
            for caps in range.captures_iter(&transcript) {
                let low: u32 = caps[1].parse().unwrap();
                let high: u32 = caps[2].parse().unwrap();
                assert!((5..=25).contains(&low));
                assert!((5..=20).contains(&(high - low)), "{}-{}", low, high);
            }
        }
    }

    // roughly two in five turns ask for a clarification
    assert!(clarified > 0 && clarified < turns);
}

#[test]
fn depth_parsing_accepts_labels() {
    assert_eq!(Depth::from_str("High-level"), Some(Depth::HighLevel));
    assert_eq!(Depth::from_str("deep-dive"), Some(Depth::DeepDive));
    assert_eq!(Depth::from_str("shallow"), None);
}

#[test]
fn summary_sections_respect_their_sizes() {
    let criteria = sample_criteria();
    let expert = sample_expert();
    let params = InterviewParams::default();
    let script = generate_script(&criteria, &expert, &params, "");
    let transcript = generate_transcript(&criteria, &expert, &script, &params, "");

    let summary = generate_summary(&criteria, &expert, &script, &transcript, "");

    assert!((5..=7).contains(&summary.executive_summary.len()));
    assert_eq!(summary.credibility_bullets.len(), 3);
    assert_eq!(
        summary.credibility_bullets[2],
        "Key credentials: Salesforce, Zendesk, Atlassian."
    );
    assert!(summary.insights_by_theme.len() <= 5);
    assert!(summary
        .insights_by_theme
        .iter()
        .all(|insight| (2..=3).contains(&insight.bullets.len())));
    assert!((3..=4).contains(&summary.open_questions.len()));
    assert!((3..=4).contains(&summary.next_steps.len()));

    let themes: Vec<String> = summary
        .insights_by_theme
        .iter()
        .map(|insight| insight.theme.clone())
        .collect();
    assert_eq!(summary.tags.topics, themes);
    assert_eq!(summary.tags.industries, criteria.industries);
    assert_eq!(summary.tags.levels, criteria.levels);
    assert_eq!(summary.metrics, extract_metrics(&transcript));

    assert_eq!(summary, generate_summary(&criteria, &expert, &script, &transcript, ""));
}

#[test]
fn metrics_are_extracted_in_order_with_context() {
    let text = "Expert: Churn fell 12% while\nNRR rose to 1.5x over 3 years.";
    let metrics = extract_metrics(text);

    let values: Vec<&str> = metrics.iter().map(|metric| metric.value.as_str()).collect();
    assert_eq!(values, vec!["12%", "1.5x", "3"]);
    assert_eq!(
        metrics[0].context,
        "Expert: Churn fell 12% while NRR rose to 1.5x over 3 years."
    );
    assert_eq!(metrics, extract_metrics(text));
    assert!(extract_metrics("No numbers here.").is_empty());
}

#[test]
fn metrics_context_is_bounded_by_characters() {
    let prefix = "é".repeat(60);
    let text = format!("{} 40% {}", prefix, "ü".repeat(60));
    let metrics = extract_metrics(&text);

    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].context.chars().count(), 83);
}

#[test]
fn empty_metrics_render_placeholder_row() {
    let criteria = sample_criteria();
    let expert = sample_expert();
    let summary = generate_summary(&criteria, &expert, "", "no numbers", "");
    assert!(summary
        .metrics_table()
        .contains("| None | No metrics detected. |"));
}

#[tokio::test]
async fn narrator_falls_back_when_offline() {
    let narrator = Narrator::new(Offline);
    let criteria = sample_criteria();
    let expert = sample_expert();
    let params = InterviewParams::default();

    let script = narrator.script(&criteria, &expert, &params, "").await;
    assert_eq!(script.source, NarrativeSource::Deterministic);
    assert_eq!(script.text, generate_script(&criteria, &expert, &params, ""));

    let summary = narrator
        .summary(&criteria, &expert, &script.text, "Expert: margins grew 15%", "")
        .await;
    assert_eq!(summary.source, NarrativeSource::Deterministic);
    assert!(summary.markdown.starts_with("## Executive Summary"));
    assert!(summary.markdown.contains("| 15% |"));
}

#[tokio::test]
async fn narrator_prefers_generated_text() {
    let narrator = Narrator::new(Canned {
        text: Some("  Generated guide  ".to_string()),
        json: None,
    });
    let script = narrator
        .script(&sample_criteria(), &sample_expert(), &InterviewParams::default(), "")
        .await;
    assert_eq!(script.source, NarrativeSource::Llm);
    assert_eq!(script.text, "Generated guide");

    let summary = narrator
        .summary(&sample_criteria(), &sample_expert(), "", "Expert: up 20%", "")
        .await;
    assert!(summary.markdown.starts_with("Generated guide\n\n## Metrics / Numbers Mentioned"));
    assert_eq!(summary.summary.metrics.len(), 1);
}

#[tokio::test]
async fn narrator_ignores_blank_generated_text() {
    let narrator = Narrator::new(Canned {
        text: Some("   ".to_string()),
        json: None,
    });
    let params = InterviewParams::default();
    let transcript = narrator
        .transcript(&sample_criteria(), &sample_expert(), "script", &params, "")
        .await;
    assert_eq!(transcript.source, NarrativeSource::Deterministic);
    assert_eq!(
        transcript.text,
        generate_transcript(&sample_criteria(), &sample_expert(), "script", &params, "")
    );
}

#[tokio::test]
async fn agency_replies_use_generated_json_when_well_formed() {
    let experts = vec![sample_expert()];
    let ranked = rank_experts(&sample_criteria(), &experts);
    let generator = Canned {
        text: None,
        json: Some(json!({
            "agencies": [{
                "agency_name": "NEXUS",
                "email_subject": "Shortlist",
                "email_body": "Hi",
                "recommended_experts": [{"id": "exp-001", "name": "Dana Whitfield", "fit_reason": "Pricing lead"}]
            }]
        })),
    };

    let responses =
        collect_agency_responses(&generator, &sample_criteria(), &experts, &ranked, &[]).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].recommended_experts[0].id.as_deref(), Some("exp-001"));
    assert_eq!(responses[0].recommended_experts[0].rate, None);
}

#[tokio::test]
async fn malformed_agency_json_falls_back_to_simulation() {
    let mut second = sample_expert();
    second.id = "exp-002".to_string();
    let experts = vec![sample_expert(), second];
    let ranked = rank_experts(&sample_criteria(), &experts);
    let generator = Canned {
        text: None,
        json: Some(json!({"unexpected": true})),
    };

    let responses =
        collect_agency_responses(&generator, &sample_criteria(), &experts, &ranked, &[]).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].agency_name, "NEXUS");
    assert_eq!(responses[0].recommended_experts.len(), 2);
}

#[tokio::test]
async fn synthesis_note_has_a_fixed_fallback() {
    let note = synthesis_note(&Offline, &sample_criteria(), &[], &[]).await;
    assert_eq!(note, SYNTHESIS_FALLBACK);

    let generated = synthesis_note(
        &Some(Canned {
            text: Some("Top experts stand out.".to_string()),
            json: None,
        }),
        &sample_criteria(),
        &[],
        &[],
    )
    .await;
    assert_eq!(generated, "Top experts stand out.");
}
