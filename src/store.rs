use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::session::CaseContext;
use crate::{Error, InterviewTags, Result};

/// One completed interview as kept in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub id: u64,
    pub created_at_ms: u64,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub levels: Vec<String>,
    #[serde(default)]
    pub free_text: String,
    pub expert_id: String,
    #[serde(default)]
    pub expert_name: String,
    #[serde(default)]
    pub script_text: String,
    #[serde(default)]
    pub transcript_text: String,
    #[serde(default)]
    pub summary_text: String,
    #[serde(default)]
    pub tags: InterviewTags,
    #[serde(default)]
    pub interview_rating: Option<u8>,
}

/// Fields supplied by the caller; the log assigns id and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewInterview {
    pub industries: Vec<String>,
    pub functions: Vec<String>,
    pub levels: Vec<String>,
    pub free_text: String,
    pub expert_id: String,
    pub expert_name: String,
    pub script_text: String,
    pub transcript_text: String,
    pub summary_text: String,
    pub tags: InterviewTags,
    pub interview_rating: Option<u8>,
}

pub struct InterviewLog {
    path: PathBuf,
    records: Mutex<Vec<InterviewRecord>>,
}

impl InterviewLog {
    pub async fn load(path: PathBuf) -> Result<Self> {
        let records: Vec<InterviewRecord> = read_json_or_default(&path).await?;
        info!(path = %path.display(), records = records.len(), "interview log loaded");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Appends an interview. Ratings are clamped to 1..=5. Memory only changes once the
    /// file write succeeds.
    pub async fn append(&self, entry: NewInterview) -> Result<InterviewRecord> {
        let mut guard = self.records.lock().await;
        let id = guard.iter().map(|record| record.id).max().unwrap_or(0) + 1;
        let record = InterviewRecord {
            id,
            created_at_ms: now_ms(),
            industries: entry.industries,
            functions: entry.functions,
            levels: entry.levels,
            free_text: entry.free_text,
            expert_id: entry.expert_id,
            expert_name: entry.expert_name,
            script_text: entry.script_text,
            transcript_text: entry.transcript_text,
            summary_text: entry.summary_text,
            tags: entry.tags,
            interview_rating: entry.interview_rating.map(|rating| rating.clamp(1, 5)),
        };
        let mut next = guard.clone();
        next.push(record.clone());
        write_json_atomic(&self.path, &next).await?;
        *guard = next;
        debug!(id, expert = %record.expert_id, "interview recorded");
        Ok(record)
    }

    /// Newest first.
    pub async fn recent(&self, limit: usize) -> Vec<InterviewRecord> {
        let guard = self.records.lock().await;
        guard.iter().rev().take(limit).cloned().collect()
    }

    pub async fn get(&self, id: u64) -> Option<InterviewRecord> {
        let guard = self.records.lock().await;
        guard.iter().find(|record| record.id == id).cloned()
    }

    pub async fn history_tags(&self, limit: usize) -> Vec<InterviewTags> {
        self.recent(limit)
            .await
            .into_iter()
            .map(|record| record.tags)
            .collect()
    }
}

/// Case contexts keyed by case code.
pub struct CaseStore {
    path: PathBuf,
    cases: Mutex<BTreeMap<String, CaseContext>>,
}

impl CaseStore {
    pub async fn load(path: PathBuf) -> Result<Self> {
        let cases: BTreeMap<String, CaseContext> = read_json_or_default(&path).await?;
        info!(path = %path.display(), cases = cases.len(), "case store loaded");
        Ok(Self {
            path,
            cases: Mutex::new(cases),
        })
    }

    pub async fn save(&self, context: CaseContext) -> Result<CaseContext> {
        let mut guard = self.cases.lock().await;
        let mut next = guard.clone();
        next.insert(context.case_code.clone(), context.clone());
        write_json_atomic(&self.path, &next).await?;
        *guard = next;
        Ok(context)
    }

    pub async fn load_case(&self, case_code: &str) -> Option<CaseContext> {
        let guard = self.cases.lock().await;
        guard.get(case_code).cloned()
    }

    pub async fn codes(&self) -> Vec<String> {
        let guard = self.cases.lock().await;
        guard.keys().cloned().collect()
    }
}

async fn read_json_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if data.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&data)?)
}

async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }
    let payload = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, payload).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}
