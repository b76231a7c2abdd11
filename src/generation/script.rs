use rand::seq::SliceRandom;
use rand::Rng;

use crate::generation::themes::{apply_refinement, pick_themes, SCRIPT_THEMES};
use crate::generation::{join_or, owned_pool, shuffled_subset, InterviewParams};
use crate::seed::{derive_seed, part, seeded_rng};
use crate::{Criteria, Expert};

const QUALIFICATION_POOL: [&str; 10] = [
    "Describe your direct responsibility for the relevant scope.",
    "What is the most recent project you led in this domain?",
    "Which geographies and segments were in scope?",
    "What were the top constraints or risks you faced?",
    "How did you avoid conflicts of interest or sensitive topics?",
    "What metrics did you personally own or review?",
    "Which stakeholders were decisive in the outcome?",
    "What was out of scope that we should avoid here?",
    "What would be a red-flag sign that this approach fails?",
    "Which trade-offs were most material to decision making?",
];

const FOLLOWUP_POOL: [&str; 4] = [
    "Can you share an illustrative example and the key outcomes?",
    "What would you measure in the first 30 days?",
    "How did you align incentives across teams?",
    "What was the fastest lever to change?",
];

const WRAP_UP_POOL: [&str; 5] = [
    "What metrics or artifacts should we request to validate assumptions?",
    "Who else should we speak with to triangulate this topic?",
    "What signals would change your recommendation?",
    "What is the most important watch-out for this engagement?",
    "Any final compliance reminders or boundaries we should respect?",
];

struct ThemeSection {
    theme: String,
    questions: Vec<String>,
    followups: Vec<String>,
}

/// Deterministic interview guide for one expert.
pub fn generate_script(
    criteria: &Criteria,
    expert: &Expert,
    params: &InterviewParams,
    refine_text: &str,
) -> String {
    let seed = derive_seed(&[
        part(&expert.id),
        part(criteria),
        part(&params.length_minutes),
        part(&params.tone.label()),
        part(&params.depth.label()),
        part(&refine_text),
    ]);
    let mut rng = seeded_rng(seed);

    let objectives = shuffled_subset(objective_pool(criteria), &mut rng, 3, 5);

    let themes = pick_themes(criteria, expert, &mut rng, SCRIPT_THEMES);
    let themes = apply_refinement(themes, refine_text, SCRIPT_THEMES);

    let qualification = shuffled_subset(owned_pool(&QUALIFICATION_POOL), &mut rng, 6, 9);

    let sections: Vec<ThemeSection> = themes
        .into_iter()
        .map(|theme| theme_section(theme, params, &mut rng))
        .collect();

    let wrap_up = shuffled_subset(owned_pool(&WRAP_UP_POOL), &mut rng, 3, 5);

    let mut lines = Vec::new();
    lines.push(format!("# Expert Interview Script: {}", expert.name));
    lines.push(String::new());
    lines.push("## Interview Objective".to_string());
    lines.extend(objectives.iter().map(|objective| format!("- {}", objective)));
    lines.push(String::new());
    lines.push("## 1) Filtering / Qualification (first 8-10 min)".to_string());
    lines.extend(qualification.iter().map(|question| format!("- Q: {}", question)));
    lines.push(
        "- Red flags to watch: lack of direct ownership, outdated experience, or compliance gaps."
            .to_string(),
    );
    lines.push("- Follow-ups: clarify scope, recency, and avoided topics.".to_string());
    lines.push(String::new());
    lines.push("## 2) Main Business Topics".to_string());
    for section in &sections {
        lines.push(format!("### Theme: {}", section.theme));
        lines.push(format!(
            "- Rationale: Prioritized due to relevance to {} and the stated request.",
            section.theme
        ));
        lines.extend(section.questions.iter().map(|question| format!("- Q: {}", question)));
        lines.extend(section.followups.iter().map(|followup| format!("- Follow-up: {}", followup)));
        lines.push(String::new());
    }
    lines.push("## 3) Wrap-up".to_string());
    lines.extend(wrap_up.iter().map(|question| format!("- Q: {}", question)));
    lines.push("- Request metrics or artifacts (clean, non-confidential).".to_string());
    lines.push(
        "- Suggested next experts: peer function lead, adjacent industry operator.".to_string(),
    );
    lines.push("- Compliance reminder: avoid confidential or MNPI details.".to_string());

    lines.join("\n")
}

fn objective_pool(criteria: &Criteria) -> Vec<String> {
    let industries = join_or(&criteria.industries, "General");
    let functions = join_or(&criteria.functions, "General");
    let levels = join_or(&criteria.levels, "Any level");
    vec![
        format!("Validate practical experience across {}.", industries),
        format!("Understand key {} levers and trade-offs.", functions),
        format!("Capture constraints and risks for {} roles.", levels),
        "Collect actionable benchmarks and illustrative metrics.".to_string(),
        "Identify follow-on experts and sources.".to_string(),
    ]
}

fn theme_section<R: Rng>(theme: String, params: &InterviewParams, rng: &mut R) -> ThemeSection {
    let mut questions = vec![
        format!("What are the top value drivers in {} today?", theme),
        format!("How do you structure decision criteria for {} initiatives?", theme),
        format!("What data or metrics are essential to manage {} performance?", theme),
        format!("Where do teams typically underestimate effort in {}?", theme),
        format!("How should leaders sequence improvements in {}?", theme),
        format!("What are the most common failure modes in {}?", theme),
    ];
    questions.shuffle(rng);
    questions.truncate(params.depth.questions_per_theme());

    let mut followups = owned_pool(&FOLLOWUP_POOL);
    followups.shuffle(rng);
    followups.truncate(2);

    ThemeSection {
        theme,
        questions,
        followups,
    }
}
