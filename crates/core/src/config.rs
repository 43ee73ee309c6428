//! Run configuration: endpoint, credentials, model, and output folder.
//!
//! Loaded from an optional JSON/YAML file and then overridden from the
//! environment. The orchestrator receives the resulting struct at
//! construction; nothing reads configuration globally.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ENDPOINT_URL: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL_ID: &str = "deepseek-coder";
const DEFAULT_FOLDER_NAME: &str = "GhidraDeepSeek";

pub const ENV_API_KEY: &str = "DECOMPROVE_API_KEY";
pub const ENV_ENDPOINT_URL: &str = "DECOMPROVE_ENDPOINT_URL";
pub const ENV_MODEL: &str = "DECOMPROVE_MODEL";
pub const ENV_OUTPUT_DIR: &str = "DECOMPROVE_OUTPUT_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Unsupported config format for {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),
}

/// Explicit configuration handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImproveConfig {
    /// Chat-completion endpoint receiving the POST.
    pub endpoint_url: String,
    /// Bearer token sent in the `Authorization` header.
    pub api_key: String,
    /// Folder used when the caller leaves the folder prompt empty.
    pub default_output_folder: PathBuf,
    /// Model identifier placed in the request body.
    pub model_id: String,
    /// Optional whole-request timeout; the transport default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ImproveConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            api_key: String::new(),
            default_output_folder: default_output_folder(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ImproveConfig {
    /// Load from `path` when given (defaults otherwise), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a config file; the format follows the extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext {
            "json" => serde_json::from_str(&body).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(&body).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = v;
        }
        if let Some(v) = get(ENV_ENDPOINT_URL) {
            self.endpoint_url = v;
        }
        if let Some(v) = get(ENV_MODEL) {
            self.model_id = v;
        }
        if let Some(v) = get(ENV_OUTPUT_DIR) {
            self.default_output_folder = PathBuf::from(v);
        }
    }

    /// Copy suitable for printing: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let chars: Vec<char> = copy.api_key.chars().collect();
        copy.api_key = match chars.len() {
            0 => String::new(),
            // Short keys are masked entirely.
            1..=8 => "****".to_string(),
            n => format!("****{}", chars[n - 4..].iter().collect::<String>()),
        };
        copy
    }
}

/// Platform default output folder.
pub fn default_output_folder() -> PathBuf {
    if cfg!(windows) {
        return PathBuf::from(format!("C:\\{DEFAULT_FOLDER_NAME}"));
    }
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(DEFAULT_FOLDER_NAME),
        None => PathBuf::from(".").join(DEFAULT_FOLDER_NAME),
    }
}
