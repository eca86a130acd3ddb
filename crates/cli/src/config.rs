//! Runcheck configuration loading.
//!
//! The configuration stands in for the services a hosted forge would consult:
//! the registered agents, workflows shared from other projects, and which
//! workflows have manual dispatch turned off.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};
use runcheck_engine::{MessageCatalog, RequiredWorkflow};
use runcheck_types::RunnerAgent;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "RUNCHECK_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuncheckConfig {
    /// Name of the current project; defaults to the repository directory name.
    pub repository: Option<String>,
    /// Default branch; defaults to the branch checked out in the repository.
    pub default_branch: Option<String>,
    pub agents: Vec<RunnerAgent>,
    pub global_workflows: Vec<GlobalWorkflow>,
    pub disabled_workflows: Vec<String>,
    /// Candidate workflow directories, relative to a repository root; the first one present wins.
    pub workflow_dirs: Vec<String>,
    /// Overrides for the diagnostic message templates.
    pub locale: MessageCatalog,
}

impl Default for RuncheckConfig {
    fn default() -> Self {
        Self {
            repository: None,
            default_branch: None,
            agents: Vec::new(),
            global_workflows: Vec::new(),
            disabled_workflows: Vec::new(),
            workflow_dirs: vec![".gitea/workflows".to_string(), ".github/workflows".to_string()],
            locale: MessageCatalog::default(),
        }
    }
}

/// A workflow shared from another project checked out locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalWorkflow {
    #[serde(flatten)]
    pub required: RequiredWorkflow,
    /// Root of the owning project's checkout.
    pub path: PathBuf,
}

/// Returns the default configuration path.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("runcheck").join("config.json")
}

/// Loads the configuration from `path`, or from the default path when `None`.
///
/// A missing file yields the default configuration.
pub fn load_config(path: Option<&Path>) -> Result<RuncheckConfig, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        debug!(path = %path.display(), "no configuration file; using defaults");
        return Ok(RuncheckConfig::default());
    }

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}

fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}
