use rand::Rng;

use crate::generation::themes::{apply_refinement, pick_themes, TRANSCRIPT_THEMES};
use crate::generation::InterviewParams;
use crate::seed::{derive_seed, part, seeded_rng};
use crate::{Criteria, Expert};

const QUESTION_TEMPLATES: [&str; 4] = [
    "Consultant: How would you describe the current state of {theme}?",
    "Consultant: What are the top two levers you see in {theme}?",
    "Consultant: Where do teams lose time or money in {theme}?",
    "Consultant: What metrics do you track for {theme}?",
];

const ANSWER_TEMPLATES: [&str; 4] = [
    "Expert: In my experience, the biggest driver is alignment between teams and clear ownership. We saw illustrative gains of {num}% when governance was tightened.",
    "Expert: The baseline varies, but a reasonable illustrative range is {num}-{num2}%. The key is sequencing the work.",
    "Expert: The first 30 days should focus on data quality and quick wins. We typically measured cycle time and cost-to-serve.",
    "Expert: I would avoid any competitor-sensitive details, but broadly the pattern is consistent across operators.",
];

const CLARIFICATION_PROBABILITY: f64 = 0.4;

/// Deterministic mock transcript that follows `script_text`.
pub fn generate_transcript(
    criteria: &Criteria,
    expert: &Expert,
    script_text: &str,
    params: &InterviewParams,
    refine_text: &str,
) -> String {
    let seed = derive_seed(&[
        part(&expert.id),
        part(criteria),
        part(&script_text),
        part(&params.tone.label()),
        part(&params.depth.label()),
        part(&refine_text),
    ]);
    let mut rng = seeded_rng(seed);

    let themes = pick_themes(criteria, expert, &mut rng, TRANSCRIPT_THEMES);
    let themes = apply_refinement(themes, refine_text, TRANSCRIPT_THEMES);

    let mut lines = Vec::new();
    if let Some(opening) = params.tone.opening_line() {
        lines.push(opening.to_string());
    }
    lines.push(
        "Consultant: Thanks for joining today. We will keep this high level and avoid confidential specifics."
            .to_string(),
    );
    lines.push(format!(
        "Expert: Happy to help. I'll stay within compliance boundaries: {}.",
        expert.compliance_flags.join(", ")
    ));
    lines.push(String::new());

    for theme in &themes {
        for _ in 0..params.depth.turns_per_theme() {
            let question = QUESTION_TEMPLATES[rng.gen_range(0..QUESTION_TEMPLATES.len())];
            let low: u32 = rng.gen_range(5..=25);
            let high = low + rng.gen_range(5..=20u32);
            let answer = ANSWER_TEMPLATES[rng.gen_range(0..ANSWER_TEMPLATES.len())];

            lines.push(question.replace("{theme}", theme));
            lines.push(
                answer
                    .replace("{num2}", &high.to_string())
                    .replace("{num}", &low.to_string()),
            );
            if rng.gen::<f64>() < CLARIFICATION_PROBABILITY {
                lines.push("Consultant: Can you clarify the constraint behind that?".to_string());
                lines.push(
                    "Expert: Constraints were usually resource bandwidth and change management; we kept efforts scoped to non-confidential data."
                        .to_string(),
                );
            }
        }
        lines.push(String::new());
    }

    lines.push("Consultant: Any final caveats or compliance reminders?".to_string());
    lines.push(
        "Expert: Yes, please avoid confidential client info and MNPI; I can provide generalized patterns and illustrative figures only."
            .to_string(),
    );

    lines.join("\n")
}
