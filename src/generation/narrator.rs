use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::generation::{
    generate_script, generate_summary, generate_transcript, InterviewParams, InterviewSummary,
};
use crate::llm::{usable_text, TextGenerator};
use crate::{Criteria, Expert};

const SCRIPT_MAX_TOKENS: u32 = 900;
const TRANSCRIPT_MAX_TOKENS: u32 = 1100;
const SUMMARY_MAX_TOKENS: u32 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Llm,
    Deterministic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub text: String,
    pub source: NarrativeSource,
}

/// Summary markdown plus the structured summary it was built from. The structured part is
/// always the deterministic one so metrics and tags can be re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryNarrative {
    pub markdown: String,
    pub summary: InterviewSummary,
    pub source: NarrativeSource,
}

/// Tries the text generator first and falls back to the deterministic generators.
#[derive(Debug, Clone, Default)]
pub struct Narrator<G> {
    generator: G,
}

impl<G: TextGenerator> Narrator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn script(
        &self,
        criteria: &Criteria,
        expert: &Expert,
        params: &InterviewParams,
        refine_text: &str,
    ) -> Narrative {
        let refine = refine_text.trim();
        let (system, intro) = if refine.is_empty() {
            (
                "You are a consulting interviewer who drafts structured expert interview guides.",
                "Create an interview script with the exact structure specified below. \
                 Use a professional tone and keep it concise.\n\n"
                    .to_string(),
            )
        } else {
            (
                "You are a consulting interviewer refining an expert interview guide.",
                format!(
                    "Regenerate the script with the same structure, but apply the refinement request. \
                     Keep the sections and make adjustments in emphasis.\n\nRefinement: {}\n\n",
                    refine
                ),
            )
        };
        let user = format!(
            "{intro}STRICT SCOPE: Only reference the industries/functions/levels provided. \
             Do not introduce other industries. If lists are empty, use 'General'.\n\n\
             Structure:\n\
             1) Title + Interview objective (3-5 bullets)\n\
             2) Filtering / Qualification (first 8-10 min) with 6-10 questions, red flags, follow-ups\n\
             3) Main Business Topics: 3-5 themes; each with rationale + 3-5 questions + probing follow-ups\n\
             4) Wrap-up: 3-5 questions + request for metrics/artifacts + recommended next experts + compliance reminder\n\n\
             Criteria: {criteria}\n\
             Expert: {name} | {headline} | {summary}\n\
             Compliance: {compliance}\n\
             Length: {length} minutes\nTone: {tone}\nDepth: {depth}\n",
            intro = intro,
            criteria = criteria_json(criteria),
            name = expert.name,
            headline = expert.headline,
            summary = expert.expertise_summary,
            compliance = expert.compliance_flags.join(", "),
            length = params.length_minutes,
            tone = params.tone.label(),
            depth = params.depth.label(),
        );

        self.narrate("script", system, &user, SCRIPT_MAX_TOKENS, || {
            generate_script(criteria, expert, params, refine_text)
        })
        .await
    }

    pub async fn transcript(
        &self,
        criteria: &Criteria,
        expert: &Expert,
        script_text: &str,
        params: &InterviewParams,
        refine_text: &str,
    ) -> Narrative {
        let refine = refine_text.trim();
        let (system, intro) = if refine.is_empty() {
            (
                "You are generating a mock expert interview transcript for consulting research.",
                "Generate a realistic transcript that follows the script. Include consultant questions, \
                 expert answers, occasional clarifications, and a few illustrative numbers. \
                 Avoid confidential client info or MNPI.\n\n"
                    .to_string(),
            )
        } else {
            (
                "You are refining a mock expert interview transcript.",
                format!(
                    "Regenerate the transcript based on the refinement request. \
                     Keep compliance boundaries and include illustrative numbers.\n\nRefinement: {}\n\n",
                    refine
                ),
            )
        };
        let user = format!(
            "{intro}STRICT SCOPE: Keep references aligned to the criteria industries/functions. \
             Do not introduce unrelated industries.\n\n\
             Script:\n{script}\n\n\
             Expert: {name} | {headline}\n\
             Compliance: {compliance}\n\
             Tone: {tone}\nDepth: {depth}\n",
            intro = intro,
            script = script_text,
            name = expert.name,
            headline = expert.headline,
            compliance = expert.compliance_flags.join(", "),
            tone = params.tone.label(),
            depth = params.depth.label(),
        );

        self.narrate("transcript", system, &user, TRANSCRIPT_MAX_TOKENS, || {
            generate_transcript(criteria, expert, script_text, params, refine_text)
        })
        .await
    }

    pub async fn summary(
        &self,
        criteria: &Criteria,
        expert: &Expert,
        script_text: &str,
        transcript_text: &str,
        refine_text: &str,
    ) -> SummaryNarrative {
        let summary = generate_summary(criteria, expert, script_text, transcript_text, refine_text);
        let user = format!(
            "Summarize the interview with the following sections:\n\
             1) Executive summary (5-8 bullets)\n\
             2) Expert credibility & relevance (bullets + short paragraph)\n\
             3) Key insights by theme (3-6 themes, each with bullets)\n\
             4) Open questions / uncertainties (bullets)\n\
             5) Suggested next steps (bullets)\n\n\
             Keep it concise and professional.\n\n\
             Criteria: {criteria}\n\
             Expert: {name} | {headline}\n\
             Script:\n{script}\n\n\
             Transcript:\n{transcript}\n",
            criteria = criteria_json(criteria),
            name = expert.name,
            headline = expert.headline,
            script = script_text,
            transcript = transcript_text,
        );

        let Narrative { text, source } = self
            .narrate(
                "summary",
                "You are a consulting analyst summarizing expert interviews.",
                &user,
                SUMMARY_MAX_TOKENS,
                || summary.to_markdown(),
            )
            .await;

        SummaryNarrative {
            markdown: format!("{}\n\n{}", text, summary.metrics_table()),
            summary,
            source,
        }
    }

    async fn narrate<F>(
        &self,
        stage: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
        fallback: F,
    ) -> Narrative
    where
        F: FnOnce() -> String,
    {
        if self.generator.is_available() {
            let generated = self.generator.generate_text(system, user, max_tokens).await;
            if let Some(text) = usable_text(generated) {
                debug!(stage, "narrative generated by text generator");
                return Narrative {
                    text,
                    source: NarrativeSource::Llm,
                };
            }
            warn!(stage, "text generator returned nothing usable; using deterministic fallback");
        }

        Narrative {
            text: fallback(),
            source: NarrativeSource::Deterministic,
        }
    }
}

fn criteria_json(criteria: &Criteria) -> String {
    serde_json::to_string(criteria).unwrap_or_default()
}
