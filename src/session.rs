//! Per-case working state.
//!
//! A [`CaseContext`] is an immutable value: every transition consumes it and returns the
//! next version. Artifacts remember the criteria signature they were produced under so a
//! caller can tell when the request has moved on since.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generation::{InterviewParams, InterviewSummary, NarrativeSource};
use crate::seed::criteria_signature;
use crate::{AgencyResponse, Criteria, Error, RankedExpert, RankingRecord, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    NoScript,
    Scripted,
    Transcribed,
    Summarized,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::NoScript => "no script",
            Stage::Scripted => "scripted",
            Stage::Transcribed => "transcribed",
            Stage::Summarized => "summarized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact<T> {
    pub content: T,
    pub params: InterviewParams,
    #[serde(default)]
    pub refine_text: String,
    pub criteria_signature: String,
    pub source: NarrativeSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryArtifact {
    pub markdown: String,
    pub summary: InterviewSummary,
}

/// Which stored artifact a staleness check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Ranking,
    AgencyRanking,
    Script,
    Transcript,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseContext {
    pub case_code: String,
    pub version: u64,
    pub criteria: Criteria,
    pub criteria_signature: String,
    #[serde(default)]
    pub search_results: Vec<RankingRecord>,
    #[serde(default)]
    pub search_signature: Option<String>,
    #[serde(default)]
    pub agency_responses: Vec<AgencyResponse>,
    #[serde(default)]
    pub agency_ranked: Vec<RankingRecord>,
    #[serde(default)]
    pub agency_signature: Option<String>,
    #[serde(default)]
    pub selected_expert_id: Option<String>,
    #[serde(default)]
    pub script: Option<Artifact<String>>,
    #[serde(default)]
    pub transcript: Option<Artifact<String>>,
    #[serde(default)]
    pub summary: Option<Artifact<SummaryArtifact>>,
}

impl CaseContext {
    pub fn new(case_code: impl Into<String>, criteria: Criteria) -> Self {
        let criteria_signature = criteria_signature(&criteria);
        Self {
            case_code: case_code.into(),
            version: 0,
            criteria,
            criteria_signature,
            search_results: Vec::new(),
            search_signature: None,
            agency_responses: Vec::new(),
            agency_ranked: Vec::new(),
            agency_signature: None,
            selected_expert_id: None,
            script: None,
            transcript: None,
            summary: None,
        }
    }

    pub fn stage(&self) -> Stage {
        if self.summary.is_some() {
            Stage::Summarized
        } else if self.transcript.is_some() {
            Stage::Transcribed
        } else if self.script.is_some() {
            Stage::Scripted
        } else {
            Stage::NoScript
        }
    }

    /// Replaces the criteria. Earlier artifacts are kept and show up as stale.
    pub fn with_criteria(mut self, criteria: Criteria) -> Self {
        self.criteria_signature = criteria_signature(&criteria);
        self.criteria = criteria;
        self.bump()
    }

    pub fn record_ranking(mut self, ranked: &[RankedExpert]) -> Self {
        self.search_results = crate::serialize_ranking(ranked);
        self.search_signature = Some(self.criteria_signature.clone());
        self.bump()
    }

    pub fn record_agency(mut self, responses: Vec<AgencyResponse>, ranked: &[RankedExpert]) -> Self {
        self.agency_responses = responses;
        self.agency_ranked = crate::serialize_ranking(ranked);
        self.agency_signature = Some(self.criteria_signature.clone());
        self.bump()
    }

    /// Selecting a different expert drops every interview artifact.
    pub fn select_expert(mut self, expert_id: impl Into<String>) -> Self {
        let expert_id = expert_id.into();
        if self.selected_expert_id.as_deref() != Some(expert_id.as_str()) {
            self.script = None;
            self.transcript = None;
            self.summary = None;
        }
        self.selected_expert_id = Some(expert_id);
        self.bump()
    }

    /// A new script invalidates the transcript and summary built on the old one.
    pub fn record_script(
        mut self,
        text: String,
        params: InterviewParams,
        refine_text: &str,
        source: NarrativeSource,
    ) -> Self {
        self.script = Some(self.artifact(text, params, refine_text, source));
        self.transcript = None;
        self.summary = None;
        self.bump()
    }

    pub fn record_transcript(
        mut self,
        text: String,
        params: InterviewParams,
        refine_text: &str,
        source: NarrativeSource,
    ) -> Result<Self> {
        if self.script.is_none() {
            return Err(Error::Stage(
                "cannot record a transcript before a script".to_string(),
            ));
        }
        self.transcript = Some(self.artifact(text, params, refine_text, source));
        self.summary = None;
        Ok(self.bump())
    }

    pub fn record_summary(
        mut self,
        summary: SummaryArtifact,
        params: InterviewParams,
        refine_text: &str,
        source: NarrativeSource,
    ) -> Result<Self> {
        if self.transcript.is_none() {
            return Err(Error::Stage(
                "cannot record a summary before a transcript".to_string(),
            ));
        }
        self.summary = Some(self.artifact(summary, params, refine_text, source));
        Ok(self.bump())
    }

    /// Artifacts produced under criteria other than the current ones.
    pub fn stale_artifacts(&self) -> Vec<ArtifactKind> {
        let current = self.criteria_signature.as_str();
        let mut stale = Vec::new();
        if self
            .search_signature
            .as_deref()
            .is_some_and(|signature| signature != current)
        {
            stale.push(ArtifactKind::Ranking);
        }
        if self
            .agency_signature
            .as_deref()
            .is_some_and(|signature| signature != current)
        {
            stale.push(ArtifactKind::AgencyRanking);
        }
        if is_stale(&self.script, current) {
            stale.push(ArtifactKind::Script);
        }
        if is_stale(&self.transcript, current) {
            stale.push(ArtifactKind::Transcript);
        }
        if is_stale(&self.summary, current) {
            stale.push(ArtifactKind::Summary);
        }
        stale
    }

    fn artifact<T>(
        &self,
        content: T,
        params: InterviewParams,
        refine_text: &str,
        source: NarrativeSource,
    ) -> Artifact<T> {
        Artifact {
            content,
            params,
            refine_text: refine_text.trim().to_string(),
            criteria_signature: self.criteria_signature.clone(),
            source,
        }
    }

    fn bump(mut self) -> Self {
        self.version += 1;
        debug!(
            case = %self.case_code,
            version = self.version,
            stage = self.stage().label(),
            "case context updated"
        );
        self
    }
}

fn is_stale<T>(artifact: &Option<Artifact<T>>, current: &str) -> bool {
    artifact
        .as_ref()
        .is_some_and(|artifact| artifact.criteria_signature != current)
}
