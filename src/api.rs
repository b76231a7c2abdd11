use serde::{Deserialize, Serialize};

use expert_match::generation::{
    Depth, InterviewParams, InterviewSummary, NarrativeSource, Tone,
};
use expert_match::session::{ArtifactKind, CaseContext, Stage};
use expert_match::{AgencyResponse, Criteria, RankedExpert};

#[derive(Debug, Deserialize)]
pub struct ApiRankRequest {
    #[serde(default)]
    pub criteria: Criteria,
    pub case_code: Option<String>,
    pub limit: Option<usize>,
    pub networks: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ApiRankedExpert {
    pub id: String,
    pub name: String,
    pub headline: String,
    pub rate_per_hour: f64,
    pub availability: String,
    pub score: f64,
    pub match_reasons: Vec<String>,
}

impl ApiRankedExpert {
    pub fn from_ranked(item: &RankedExpert) -> Self {
        Self {
            id: item.expert.id.clone(),
            name: item.expert.name.clone(),
            headline: item.expert.headline.clone(),
            rate_per_hour: item.expert.rate_per_hour,
            availability: item.expert.availability.clone(),
            score: item.score,
            match_reasons: item.match_reasons.clone(),
        }
    }

    pub fn list(ranked: &[RankedExpert], limit: Option<usize>) -> Vec<Self> {
        ranked
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(Self::from_ranked)
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiRankResponse {
    pub criteria_signature: String,
    pub results: Vec<ApiRankedExpert>,
    pub outreach_email: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiSynthesizeRequest {
    #[serde(default)]
    pub criteria: Criteria,
    pub case_code: Option<String>,
    pub networks: Option<Vec<String>>,
    /// Replies supplied by the caller; when absent they are collected or simulated.
    pub agency_responses: Option<Vec<AgencyResponse>>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ApiSynthesizeResponse {
    pub criteria_signature: String,
    pub agency_responses: Vec<AgencyResponse>,
    pub results: Vec<ApiRankedExpert>,
    pub note: String,
    pub history_records: usize,
}

#[derive(Debug, Deserialize)]
pub struct ApiInterviewRequest {
    #[serde(default)]
    pub criteria: Criteria,
    pub case_code: Option<String>,
    pub expert_id: String,
    pub length_minutes: Option<u32>,
    pub tone: Option<String>,
    pub depth: Option<String>,
    pub refine_text: Option<String>,
    pub script_text: Option<String>,
    pub transcript_text: Option<String>,
}

impl ApiInterviewRequest {
    pub fn params(&self, defaults: InterviewParams) -> Result<InterviewParams, String> {
        let mut params = defaults;
        if let Some(value) = self.length_minutes {
            params.length_minutes = value;
        }
        if let Some(tone) = self.tone.as_deref() {
            params.tone = Tone::parse(tone);
        }
        if let Some(depth) = self.depth.as_deref() {
            params.depth =
                Depth::from_str(depth).ok_or_else(|| format!("invalid depth: {}", depth))?;
        }
        Ok(params)
    }

    pub fn refine(&self) -> &str {
        self.refine_text.as_deref().map(str::trim).unwrap_or("")
    }
}

#[derive(Debug, Serialize)]
pub struct ApiNarrativeResponse {
    pub text: String,
    pub source: NarrativeSource,
    pub criteria_signature: String,
    pub stage: Option<Stage>,
    pub stale: Vec<ArtifactKind>,
}

#[derive(Debug, Serialize)]
pub struct ApiSummaryResponse {
    pub markdown: String,
    pub summary: InterviewSummary,
    pub source: NarrativeSource,
    pub criteria_signature: String,
    pub stage: Option<Stage>,
    pub stale: Vec<ArtifactKind>,
}

#[derive(Debug, Serialize)]
pub struct ApiCaseResponse {
    pub stage: Stage,
    pub stale: Vec<ArtifactKind>,
    pub case: CaseContext,
}

impl ApiCaseResponse {
    pub fn from_case(case: CaseContext) -> Self {
        Self {
            stage: case.stage(),
            stale: case.stale_artifacts(),
            case,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiCaseUpdate {
    pub criteria: Criteria,
    pub selected_expert_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiInterviewQuery {
    pub limit: Option<usize>,
}
