use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::text::tokenize;
use crate::{round1, Criteria, Expert};

const KEYWORD_REASON_TERMS: usize = 6;
const CREDENTIAL_REASON_TERMS: usize = 5;
const PROFILE_REASON_TERMS: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub industry: f64,
    pub industry_mismatch_penalty: f64,
    pub function: f64,
    pub level: f64,
    pub keyword: f64,
    pub credential: f64,
    pub profile: f64,
    pub rate_penalty: f64,
    pub default_budget: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            industry: 25.0,
            industry_mismatch_penalty: 12.0,
            function: 25.0,
            level: 10.0,
            keyword: 30.0,
            credential: 10.0,
            profile: 10.0,
            rate_penalty: 10.0,
            default_budget: 500.0,
        }
    }
}

/// Per-signal contributions before summing. Penalties are stored as negative values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSignals {
    pub industry: f64,
    pub function: f64,
    pub level: f64,
    pub keyword: f64,
    pub credential: f64,
    pub profile: f64,
    pub rate: f64,
}

impl MatchSignals {
    pub fn total(&self) -> f64 {
        self.industry + self.function + self.level + self.keyword + self.credential + self.profile
            + self.rate
    }

    /// Total clamped to 0..=100 and rounded to one decimal.
    pub fn score(&self) -> f64 {
        round1(self.total()).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchScorer {
    weights: MatchWeights,
}

impl MatchScorer {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &MatchWeights {
        &self.weights
    }

    pub fn score(&self, criteria: &Criteria, expert: &Expert) -> (f64, Vec<String>) {
        let (signals, reasons) = self.evaluate(criteria, expert);
        (signals.score(), reasons)
    }

    /// Computes every signal and the reasons for the ones that fired, in signal order.
    pub fn evaluate(&self, criteria: &Criteria, expert: &Expert) -> (MatchSignals, Vec<String>) {
        let weights = &self.weights;
        let mut signals = MatchSignals::default();
        let mut reasons = Vec::new();

        let industries: BTreeSet<&str> = criteria.industries.iter().map(String::as_str).collect();
        if !industries.is_empty() {
            let overlap = overlap_with(&industries, &expert.industry_tags);
            if overlap.is_empty() {
                signals.industry = -weights.industry_mismatch_penalty;
                reasons.push("Industry mismatch: no overlap with requested industries.".to_string());
            } else {
                signals.industry = partial_credit(weights.industry, overlap.len(), industries.len());
                reasons.push(format!("Industry match: {}.", join_terms(&overlap, usize::MAX)));
            }
        }

        let functions: BTreeSet<&str> = criteria.functions.iter().map(String::as_str).collect();
        if !functions.is_empty() {
            let overlap = overlap_with(&functions, &expert.function_tags);
            signals.function = partial_credit(weights.function, overlap.len(), functions.len());
            if !overlap.is_empty() {
                reasons.push(format!("Function match: {}.", join_terms(&overlap, usize::MAX)));
            }
        }

        if !criteria.levels.is_empty() && criteria.levels.contains(&expert.role_level) {
            signals.level = weights.level;
            reasons.push(format!("Role level match: {}.", expert.role_level));
        }

        let free_tokens: BTreeSet<String> = tokenize(&criteria.free_text).into_iter().collect();
        let expert_tokens = expert_tokens(expert);

        if !free_tokens.is_empty() {
            let overlap: BTreeSet<&str> = free_tokens
                .iter()
                .filter(|token| expert_tokens.contains(*token))
                .map(String::as_str)
                .collect();
            signals.keyword = partial_credit(weights.keyword, overlap.len(), free_tokens.len());
            if !overlap.is_empty() {
                reasons.push(format!(
                    "Keyword overlap: {}.",
                    join_terms(&overlap, KEYWORD_REASON_TERMS)
                ));
            }
        }

        let credential_tokens: BTreeSet<String> =
            tokenize(&expert.credentials.flatten()).into_iter().collect();
        let credential_hits: BTreeSet<&str> = free_tokens
            .iter()
            .filter(|token| credential_tokens.contains(*token))
            .map(String::as_str)
            .collect();
        if !credential_hits.is_empty() {
            signals.credential = weights.credential;
            reasons.push(format!(
                "Credential signal: {}.",
                join_terms(&credential_hits, CREDENTIAL_REASON_TERMS)
            ));
        }

        let profile_tokens: BTreeSet<String> =
            tokenize(&criteria.profile_text).into_iter().collect();
        if !profile_tokens.is_empty() {
            let overlap: BTreeSet<&str> = profile_tokens
                .iter()
                .filter(|token| expert_tokens.contains(*token))
                .map(String::as_str)
                .collect();
            signals.profile = partial_credit(weights.profile, overlap.len(), profile_tokens.len());
            if !overlap.is_empty() {
                reasons.push(format!(
                    "Profile match: {}.",
                    join_terms(&overlap, PROFILE_REASON_TERMS)
                ));
            }
        }

        let budget = self.effective_budget(criteria);
        if expert.rate_per_hour > budget {
            let over = ((expert.rate_per_hour - budget) / budget.max(1.0)).min(1.0);
            signals.rate = -weights.rate_penalty * over;
            reasons.push("Rate above budget; slight penalty applied.".to_string());
        }

        (signals, reasons)
    }

    fn effective_budget(&self, criteria: &Criteria) -> f64 {
        if criteria.budget > 0.0 {
            criteria.budget
        } else {
            self.weights.default_budget
        }
    }
}

/// Summary tokens unioned with lower-cased topic keywords.
pub fn expert_tokens(expert: &Expert) -> BTreeSet<String> {
    let mut tokens: BTreeSet<String> = tokenize(&expert.expertise_summary).into_iter().collect();
    tokens.extend(expert.topic_keywords.iter().map(|keyword| keyword.to_lowercase()));
    tokens
}

fn overlap_with<'a>(requested: &BTreeSet<&'a str>, tags: &[String]) -> BTreeSet<&'a str> {
    requested
        .iter()
        .copied()
        .filter(|item| tags.iter().any(|tag| tag == item))
        .collect()
}

fn partial_credit(cap: f64, hits: usize, requested: usize) -> f64 {
    if requested == 0 {
        return 0.0;
    }
    (cap * hits as f64 / requested as f64).min(cap)
}

fn join_terms(terms: &BTreeSet<&str>, limit: usize) -> String {
    terms.iter().take(limit).copied().collect::<Vec<_>>().join(", ")
}
