//! Sub-configuration structs with their defaults.

use crate::catalog::{DEFAULT_MODEL, DEFAULT_SIZE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory downloaded images are written to
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("~/Pictures/prism"),
        }
    }
}

/// Generation defaults and job limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model selected for new prompts
    pub default_model: String,

    /// Size preset selected for new prompts
    pub default_size: String,

    /// Inference steps for models without their own step count
    pub inference_steps: u32,

    /// Safety tolerance passed through to the service ("1" strictest .. "6")
    pub safety_tolerance: String,

    /// Maximum jobs in flight at once
    pub parallel: usize,

    /// Per-job timeout in milliseconds
    pub timeout_ms: u64,

    /// Delay between status polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            default_size: DEFAULT_SIZE.to_string(),
            inference_steps: 28,
            safety_tolerance: "4".to_string(),
            parallel: 16,
            timeout_ms: 300_000,
            poll_interval_ms: 500,
        }
    }
}

/// Generation service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Queue API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://queue.fal.run".to_string(),
            api_key: "${FAL_KEY}".to_string(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
