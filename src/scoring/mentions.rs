use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::AgencyResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgencyBonusConfig {
    pub per_mention: f64,
    pub cap: f64,
}

impl Default for AgencyBonusConfig {
    fn default() -> Self {
        Self {
            per_mention: 5.0,
            cap: 15.0,
        }
    }
}

/// Mention counts and "<agency>: <fit reason>" lines per expert id.
#[derive(Debug, Clone, Default)]
pub struct AgencyMentions {
    counts: HashMap<String, usize>,
    reasons: HashMap<String, Vec<String>>,
}

impl AgencyMentions {
    pub fn collect(responses: &[AgencyResponse]) -> Self {
        let mut mentions = AgencyMentions::default();
        for response in responses {
            for recommendation in &response.recommended_experts {
                let Some(expert_id) = recommendation
                    .id
                    .as_deref()
                    .filter(|id| !id.trim().is_empty())
                else {
                    continue;
                };
                *mentions.counts.entry(expert_id.to_string()).or_insert(0) += 1;
                mentions
                    .reasons
                    .entry(expert_id.to_string())
                    .or_default()
                    .push(format!(
                        "{}: {}",
                        response.agency_name, recommendation.fit_reason
                    ));
            }
        }
        mentions
    }

    pub fn count(&self, expert_id: &str) -> usize {
        self.counts.get(expert_id).copied().unwrap_or(0)
    }

    pub fn reasons(&self, expert_id: &str) -> &[String] {
        self.reasons
            .get(expert_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgencyBonusScorer {
    config: AgencyBonusConfig,
}

impl AgencyBonusScorer {
    pub fn new(config: AgencyBonusConfig) -> Self {
        Self { config }
    }

    pub fn bonus(&self, mentions: usize) -> f64 {
        (self.config.per_mention * mentions as f64).min(self.config.cap)
    }
}
