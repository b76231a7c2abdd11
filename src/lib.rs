pub mod agency;
pub mod catalog;
pub mod config;
pub mod error;
pub mod generation;
pub mod llm;
pub mod scoring;
pub mod seed;
pub mod session;
pub mod store;
pub mod text;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

pub use error::{Error, Result};
pub use scoring::{rank_experts, score_expert, synthesize};
pub use seed::{criteria_signature, derive_seed};
pub use text::tokenize;

/// A credential field that catalogs store either as a single string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextList {
    One(String),
    Many(Vec<String>),
}

impl Default for TextList {
    fn default() -> Self {
        TextList::Many(Vec::new())
    }
}

impl TextList {
    pub fn items(&self) -> Vec<&str> {
        match self {
            TextList::One(value) => vec![value.as_str()],
            TextList::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub education: TextList,
    pub former_companies: TextList,
    pub notable_projects: TextList,
    pub publications: TextList,
}

impl Credentials {
    /// All credential fields joined into one lower-cased blob.
    pub fn flatten(&self) -> String {
        let mut parts = Vec::new();
        parts.extend(self.education.items());
        parts.extend(self.former_companies.items());
        parts.extend(self.notable_projects.items());
        parts.extend(self.publications.items());
        parts.join(" ").to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub industry_tags: Vec<String>,
    #[serde(default)]
    pub function_tags: Vec<String>,
    #[serde(default)]
    pub role_level: String,
    #[serde(default)]
    pub rate_per_hour: f64,
    #[serde(default)]
    pub years_experience: u32,
    #[serde(default)]
    pub geography: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub expertise_summary: String,
    #[serde(default)]
    pub topic_keywords: Vec<String>,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub compliance_flags: Vec<String>,
    #[serde(default)]
    pub cid_cleared: bool,
}

/// What the requester is looking for. Empty category lists mean "any".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub industries: Vec<String>,
    pub functions: Vec<String>,
    pub levels: Vec<String>,
    pub free_text: String,
    pub budget: f64,
    pub geography: String,
    pub profile_text: String,
    pub linkedin_url: String,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            industries: Vec::new(),
            functions: Vec::new(),
            levels: Vec::new(),
            free_text: String::new(),
            budget: 500.0,
            geography: "Any".to_string(),
            profile_text: String::new(),
            linkedin_url: String::new(),
        }
    }
}

/// One scored expert. Used for both the base ranking and the synthesized ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedExpert {
    pub expert: Expert,
    pub score: f64,
    pub match_reasons: Vec<String>,
}

/// Compact, storable form of a ranking entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub match_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    pub id: Option<String>,
    pub name: String,
    pub fit_reason: String,
    pub availability: String,
    pub rate: Option<f64>,
}

/// One agency's reply to an outreach request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgencyResponse {
    pub agency_name: String,
    pub email_subject: String,
    pub email_body: String,
    pub recommended_experts: Vec<Recommendation>,
}

/// Tag set stored with each interview; past tags feed the history bonus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewTags {
    pub industries: Vec<String>,
    pub functions: Vec<String>,
    pub levels: Vec<String>,
    pub topics: Vec<String>,
}

pub fn serialize_ranking(ranked: &[RankedExpert]) -> Vec<RankingRecord> {
    ranked
        .iter()
        .map(|item| RankingRecord {
            id: item.expert.id.clone(),
            score: item.score,
            match_reasons: item.match_reasons.clone(),
        })
        .collect()
}

/// Rebuilds a ranking against the current pool. Records whose expert is gone are dropped.
pub fn restore_ranking(records: &[RankingRecord], experts: &[Expert]) -> Vec<RankedExpert> {
    let by_id: HashMap<&str, &Expert> = experts
        .iter()
        .map(|expert| (expert.id.as_str(), expert))
        .collect();

    let mut ranked: Vec<RankedExpert> = records
        .iter()
        .filter_map(|record| {
            by_id.get(record.id.as_str()).map(|expert| RankedExpert {
                expert: (*expert).clone(),
                score: record.score,
                match_reasons: record.match_reasons.clone(),
            })
        })
        .collect();
    ranked.sort_by(rank_order);
    ranked
}

/// Descending score, ties broken by expert id ascending.
pub fn rank_order(a: &RankedExpert, b: &RankedExpert) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.expert.id.cmp(&b.expert.id))
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

pub fn format_rate(value: f64) -> String {
    format!("${}/hr", format_float(value, 0))
}
