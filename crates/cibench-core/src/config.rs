//! Run configuration (`cibench.yaml`).
//!
//! Everything here has a sensible default, so a missing file means a
//! default run layout. API keys never live in the file; the config only
//! names the environment variables they are read from.

use crate::errors::BenchError;
use crate::model::Tier;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub judge: JudgeConfig,
    #[serde(default)]
    pub nomi: BackendConfig,
    #[serde(default)]
    pub kindroid: BackendConfig,
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self, BenchError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BenchError::config(path.display(), e.to_string()))?;
        serde_yaml::from_str(&text).map_err(|e| BenchError::config(path.display(), e.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding `tier-{n}.txt` and `tier-{n}-eval.txt`.
    #[serde(default = "default_benchmark_dir")]
    pub benchmark_dir: PathBuf,
    #[serde(default = "default_user_context")]
    pub user_context: PathBuf,
    #[serde(default = "default_conversations_dir")]
    pub conversations_dir: PathBuf,
}

impl PathsConfig {
    pub fn scenario_file(&self, tier: Tier) -> PathBuf {
        self.benchmark_dir.join(format!("tier-{}.txt", tier.number()))
    }

    pub fn eval_file(&self, tier: Tier) -> PathBuf {
        self.benchmark_dir
            .join(format!("tier-{}-eval.txt", tier.number()))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            benchmark_dir: default_benchmark_dir(),
            user_context: default_user_context(),
            conversations_dir: default_conversations_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    /// Settle time between consecutive prompts, in seconds.
    #[serde(default = "default_inter_prompt_seconds")]
    pub inter_prompt_seconds: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            inter_prompt_seconds: default_inter_prompt_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JudgeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_judge_model")]
    pub model: String,
    #[serde(default = "default_judge_endpoint")]
    pub endpoint: String,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_judge_model(),
            endpoint: default_judge_endpoint(),
        }
    }
}

/// Per-platform settings: which environment variable carries the API key,
/// and the persona-slug → platform-character-id map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub characters: BTreeMap<String, String>,
}

impl BackendConfig {
    pub fn character_id(&self, slug: &str) -> Option<&str> {
        self.characters.get(slug).map(String::as_str)
    }
}

fn default_benchmark_dir() -> PathBuf {
    PathBuf::from("benchmark")
}

fn default_user_context() -> PathBuf {
    PathBuf::from("profiling/user-context.txt")
}

fn default_conversations_dir() -> PathBuf {
    PathBuf::from("conversations")
}

fn default_inter_prompt_seconds() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_judge_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_judge_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}
