//! Reproducible interview artifacts.
//!
//! Every generator seeds one RNG from its inputs via [`crate::seed::derive_seed`] and draws
//! from it in a fixed order, so identical inputs always produce identical text.

pub mod narrator;
pub mod script;
pub mod summary;
pub mod themes;
pub mod transcript;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use narrator::{Narrative, NarrativeSource, Narrator, SummaryNarrative};
pub use script::generate_script;
pub use summary::{extract_metrics, generate_summary, InterviewSummary, MetricMention, ThemeInsight};
pub use themes::pick_themes;
pub use transcript::generate_transcript;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Depth {
    #[serde(rename = "High-level")]
    HighLevel,
    #[default]
    #[serde(rename = "Deep-dive")]
    DeepDive,
}

impl Depth {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "high-level" | "high" | "highlevel" => Some(Depth::HighLevel),
            "deep-dive" | "deep" | "deepdive" => Some(Depth::DeepDive),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Depth::HighLevel => "High-level",
            Depth::DeepDive => "Deep-dive",
        }
    }

    pub fn questions_per_theme(self) -> usize {
        match self {
            Depth::HighLevel => 3,
            Depth::DeepDive => 5,
        }
    }

    pub fn turns_per_theme(self) -> usize {
        match self {
            Depth::HighLevel => 2,
            Depth::DeepDive => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Neutral,
    Friendly,
    Assertive,
}

impl Tone {
    /// Unknown tones are neutral.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "friendly" => Tone::Friendly,
            "assertive" => Tone::Assertive,
            _ => Tone::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tone::Neutral => "Neutral",
            Tone::Friendly => "Friendly",
            Tone::Assertive => "Assertive",
        }
    }

    pub fn opening_line(self) -> Option<&'static str> {
        match self {
            Tone::Friendly => Some("Consultant: Appreciate you taking the time to share your experience."),
            Tone::Assertive => Some("Consultant: We will keep this focused and time-boxed."),
            Tone::Neutral => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewParams {
    pub length_minutes: u32,
    pub tone: Tone,
    pub depth: Depth,
}

impl Default for InterviewParams {
    fn default() -> Self {
        Self {
            length_minutes: 45,
            tone: Tone::Neutral,
            depth: Depth::DeepDive,
        }
    }
}

/// Shuffles the pool and keeps a random number of items in `min..=max`.
pub(crate) fn shuffled_subset<R: Rng>(
    mut items: Vec<String>,
    rng: &mut R,
    min: usize,
    max: usize,
) -> Vec<String> {
    items.shuffle(rng);
    let keep = rng.gen_range(min..=max);
    items.truncate(keep);
    items
}

pub(crate) fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

pub(crate) fn owned_pool(pool: &[&str]) -> Vec<String> {
    pool.iter().map(|item| item.to_string()).collect()
}
