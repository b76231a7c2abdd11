use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Expert, InterviewTags};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryBonusConfig {
    pub industry_weight: f64,
    pub function_weight: f64,
    pub topic_weight: f64,
    pub cap: f64,
}

impl Default for HistoryBonusConfig {
    fn default() -> Self {
        Self {
            industry_weight: 2.0,
            function_weight: 2.0,
            topic_weight: 1.0,
            cap: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryBonusScorer {
    config: HistoryBonusConfig,
}

impl HistoryBonusScorer {
    pub fn new(config: HistoryBonusConfig) -> Self {
        Self { config }
    }

    /// Tag overlap with past interviews, summed over records and capped.
    pub fn bonus(&self, expert: &Expert, history: &[InterviewTags]) -> f64 {
        if history.is_empty() {
            return 0.0;
        }

        let industries: HashSet<&str> = expert.industry_tags.iter().map(String::as_str).collect();
        let functions: HashSet<&str> = expert.function_tags.iter().map(String::as_str).collect();
        let topics: HashSet<String> = expert
            .topic_keywords
            .iter()
            .map(|topic| topic.to_lowercase())
            .collect();

        let mut bonus = 0.0;
        for record in history {
            let record_industries: HashSet<&str> =
                record.industries.iter().map(String::as_str).collect();
            let record_functions: HashSet<&str> =
                record.functions.iter().map(String::as_str).collect();
            let record_topics: HashSet<String> =
                record.topics.iter().map(|topic| topic.to_lowercase()).collect();

            bonus += self.config.industry_weight
                * industries.intersection(&record_industries).count() as f64;
            bonus += self.config.function_weight
                * functions.intersection(&record_functions).count() as f64;
            bonus += self.config.topic_weight * topics.intersection(&record_topics).count() as f64;
        }

        bonus.min(self.config.cap)
    }
}
