use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::generation::{owned_pool, shuffled_subset};
use crate::generation::themes::{apply_refinement, pick_themes, SUMMARY_THEMES};
use crate::seed::{derive_seed, part, seeded_rng};
use crate::{Criteria, Expert, InterviewTags};

const METRIC_CONTEXT_CHARS: usize = 40;

const EXECUTIVE_POOL: [&str; 7] = [
    "Expert has direct ownership experience aligned with the request.",
    "Insights reflect operational realities and trade-offs in execution.",
    "Illustrative metrics suggest material impact if levers are applied.",
    "Clear constraints and compliance boundaries were reinforced.",
    "Follow-on expert suggestions can deepen validation.",
    "Prioritize data quality and change management early.",
    "Stakeholder alignment is the most common blocker.",
];

const OPEN_QUESTION_POOL: [&str; 4] = [
    "What baseline metrics should be prioritized for benchmarking?",
    "Which constraints are unique to the target client context?",
    "What is the feasible timeline for impact realization?",
    "Which stakeholders will resist change and why?",
];

const NEXT_STEP_POOL: [&str; 4] = [
    "Validate themes with a peer expert in an adjacent industry.",
    "Collect anonymized metrics or public benchmarks for triangulation.",
    "Draft a hypothesis tree for the top two levers.",
    "Plan a follow-up with the expert to test open questions.",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeInsight {
    pub theme: String,
    pub bullets: Vec<String>,
}

/// A number mentioned in a transcript with the text around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricMention {
    pub value: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub executive_summary: Vec<String>,
    pub credibility_bullets: Vec<String>,
    pub credibility_paragraph: String,
    pub insights_by_theme: Vec<ThemeInsight>,
    pub open_questions: Vec<String>,
    pub next_steps: Vec<String>,
    pub metrics: Vec<MetricMention>,
    pub tags: InterviewTags,
}

impl InterviewSummary {
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::new();
        lines.push("## Executive Summary".to_string());
        lines.extend(self.executive_summary.iter().map(|bullet| format!("- {}", bullet)));
        lines.push(String::new());
        lines.push("## Expert Credibility & Relevance".to_string());
        lines.extend(self.credibility_bullets.iter().map(|bullet| format!("- {}", bullet)));
        lines.push(self.credibility_paragraph.clone());
        lines.push(String::new());
        lines.push("## Key Insights by Theme".to_string());
        for insight in &self.insights_by_theme {
            lines.push(format!("**{}**", insight.theme));
            lines.extend(insight.bullets.iter().map(|bullet| format!("- {}", bullet)));
        }
        lines.push(String::new());
        lines.push("## Open Questions / Uncertainties".to_string());
        lines.extend(self.open_questions.iter().map(|bullet| format!("- {}", bullet)));
        lines.push(String::new());
        lines.push("## Suggested Next Steps".to_string());
        lines.extend(self.next_steps.iter().map(|bullet| format!("- {}", bullet)));
        lines.join("\n")
    }

    pub fn metrics_table(&self) -> String {
        let mut table = String::from("## Metrics / Numbers Mentioned\n| Value | Context |\n| --- | --- |\n");
        if self.metrics.is_empty() {
            table.push_str("| None | No metrics detected. |\n");
        }
        for metric in &self.metrics {
            table.push_str(&format!(
                "| {} | {} |\n",
                metric.value.replace('|', " "),
                metric.context.replace('|', " ")
            ));
        }
        table
    }
}

/// Deterministic structured summary. Metrics are scanned from `transcript_text` alone.
pub fn generate_summary(
    criteria: &Criteria,
    expert: &Expert,
    script_text: &str,
    transcript_text: &str,
    refine_text: &str,
) -> InterviewSummary {
    let seed = derive_seed(&[
        part(&expert.id),
        part(criteria),
        part(&script_text),
        part(&transcript_text),
        part(&refine_text),
    ]);
    let mut rng = seeded_rng(seed);

    let themes = pick_themes(criteria, expert, &mut rng, SUMMARY_THEMES);
    let themes = apply_refinement(themes, refine_text, SUMMARY_THEMES);

    let executive_summary = shuffled_subset(owned_pool(&EXECUTIVE_POOL), &mut rng, 5, 7);

    let former_companies: Vec<&str> = expert
        .credentials
        .former_companies
        .items()
        .into_iter()
        .take(3)
        .collect();
    let credibility_bullets = vec![
        format!(
            "Role level: {} with {} years.",
            expert.role_level, expert.years_experience
        ),
        format!("Industries covered: {}.", expert.industry_tags.join(", ")),
        format!("Key credentials: {}.", former_companies.join(", ")),
    ];
    let credibility_paragraph = format!(
        "{} appears highly relevant based on direct scope ownership and recent leadership experience. Responses were consistent and bounded by compliance.",
        expert.name
    );

    let insights_by_theme = themes
        .iter()
        .map(|theme| {
            let pool = vec![
                format!("Primary value driver in {} is process clarity and ownership.", theme),
                format!("Sequencing changes in {} reduces risk and rework.", theme),
                format!("Metrics discipline is critical to sustain {} improvements.", theme),
            ];
            ThemeInsight {
                theme: theme.clone(),
                bullets: shuffled_subset(pool, &mut rng, 2, 3),
            }
        })
        .collect();

    let open_questions = shuffled_subset(owned_pool(&OPEN_QUESTION_POOL), &mut rng, 3, 4);
    let next_steps = shuffled_subset(owned_pool(&NEXT_STEP_POOL), &mut rng, 3, 4);

    InterviewSummary {
        executive_summary,
        credibility_bullets,
        credibility_paragraph,
        insights_by_theme,
        open_questions,
        next_steps,
        metrics: extract_metrics(transcript_text),
        tags: InterviewTags {
            industries: criteria.industries.clone(),
            functions: criteria.functions.clone(),
            levels: criteria.levels.clone(),
            topics: themes,
        },
    }
}

fn metric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{1,3}(?:\.\d+)?)(%|x|k|m)?").expect("metric regex"))
}

/// Every number (optionally suffixed by `%`, `x`, `k` or `m`) with up to 40 characters of
/// context on each side, in order of appearance.
pub fn extract_metrics(transcript_text: &str) -> Vec<MetricMention> {
    metric_pattern()
        .find_iter(transcript_text)
        .map(|found| {
            let start = chars_before(transcript_text, found.start(), METRIC_CONTEXT_CHARS);
            let end = chars_after(transcript_text, found.end(), METRIC_CONTEXT_CHARS);
            MetricMention {
                value: found.as_str().to_string(),
                context: transcript_text[start..end].replace('\n', " ").trim().to_string(),
            }
        })
        .collect()
}

fn chars_before(text: &str, from: usize, count: usize) -> usize {
    text[..from]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(from)
}

fn chars_after(text: &str, from: usize, count: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(count)
        .map(|(idx, _)| from + idx)
        .unwrap_or(text.len())
}
