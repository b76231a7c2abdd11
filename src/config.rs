use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::agency::DEFAULT_NETWORKS;
use crate::generation::InterviewParams;
use crate::scoring::{
    AgencyBonusConfig, AgencyBonusScorer, HistoryBonusConfig, HistoryBonusScorer, MatchScorer,
    MatchWeights, RankingPipeline, Synthesizer,
};
use crate::{Error, Result};

const DEFAULT_CONFIG_PATH: &str = "config/expert-match.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// How many recent interviews feed the history bonus.
    pub history_limit: usize,
    pub agency: AgencyBonusConfig,
    pub history: HistoryBonusConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            agency: AgencyBonusConfig::default(),
            history: HistoryBonusConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub networks: Vec<String>,
    pub params: InterviewParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            networks: DEFAULT_NETWORKS.iter().map(|name| name.to_string()).collect(),
            params: InterviewParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub catalog_path: PathBuf,
    pub interview_log_path: PathBuf,
    pub case_store_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/experts.json"),
            interview_log_path: PathBuf::from("data/interviews.json"),
            case_store_path: PathBuf::from("data/cases.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_base: String,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matching: MatchWeights,
    pub synthesis: SynthesisConfig,
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Reads `path`, else `EXPERT_MATCH_CONFIG`, else the default location. A missing file
    /// means defaults. Environment overrides are applied last.
    pub fn load(path: Option<PathBuf>) -> Result<(Self, PathBuf)> {
        let config_path = path.unwrap_or_else(default_config_path);
        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|source| Error::Read {
                path: config_path.clone(),
                source,
            })?;
            toml::from_str(&contents)?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let write_err = |source| Error::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let payload = toml::to_string_pretty(self)?;
        std::fs::write(path, payload).map_err(write_err)?;
        Ok(())
    }

    pub fn pipeline(&self) -> RankingPipeline {
        RankingPipeline::new(MatchScorer::new(self.matching.clone()))
    }

    pub fn synthesizer(&self) -> Synthesizer {
        Synthesizer::new(
            self.pipeline(),
            AgencyBonusScorer::new(self.synthesis.agency.clone()),
            HistoryBonusScorer::new(self.synthesis.history.clone()),
        )
    }

    fn apply_env_overrides(&mut self) {
        if let Some(path) = env_value("EXPERT_CATALOG_PATH") {
            self.storage.catalog_path = PathBuf::from(path);
        }
        if let Some(path) = env_value("INTERVIEW_LOG_PATH") {
            self.storage.interview_log_path = PathBuf::from(path);
        }
        if let Some(path) = env_value("CASE_STORE_PATH") {
            self.storage.case_store_path = PathBuf::from(path);
        }
        if let Some(budget) = env_value("DEFAULT_BUDGET") {
            if let Ok(value) = budget.parse::<f64>() {
                self.matching.default_budget = value;
            }
        }
        if let Some(model) = env_value("OPENAI_MODEL") {
            self.llm.model = model;
        }
        if let Some(api_base) = env_value("OPENAI_API_BASE") {
            self.llm.api_base = api_base;
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn default_config_path() -> PathBuf {
    env_value("EXPERT_MATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
