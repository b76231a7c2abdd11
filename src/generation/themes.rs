use rand::seq::SliceRandom;
use rand::Rng;

use crate::text::{capitalize, tokenize};
use crate::{Criteria, Expert};

pub const SCRIPT_THEMES: usize = 4;
pub const TRANSCRIPT_THEMES: usize = 4;
pub const SUMMARY_THEMES: usize = 5;

/// Functions, then industries, then free-text tokens, then the expert's topic keywords,
/// de-duplicated, shuffled and cut to `max_themes`.
pub fn pick_themes<R: Rng>(
    criteria: &Criteria,
    expert: &Expert,
    rng: &mut R,
    max_themes: usize,
) -> Vec<String> {
    let mut themes: Vec<String> = Vec::new();
    let candidates = criteria
        .functions
        .iter()
        .cloned()
        .chain(criteria.industries.iter().cloned())
        .chain(tokenize(&criteria.free_text))
        .chain(expert.topic_keywords.iter().cloned());

    for theme in candidates {
        if !themes.contains(&theme) {
            themes.push(theme);
        }
    }

    themes.shuffle(rng);
    themes.truncate(max_themes);
    themes
}

/// Puts a non-empty refinement first. Draws nothing from the RNG.
pub fn apply_refinement(mut themes: Vec<String>, refine_text: &str, max_themes: usize) -> Vec<String> {
    let refine = refine_text.trim();
    if !refine.is_empty() {
        themes.insert(0, capitalize(refine));
        themes.truncate(max_themes);
    }
    themes
}
