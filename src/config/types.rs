use crate::importer::ImportAction;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub import: ImportDefaults,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Defaults applied to `import` requests that do not say otherwise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportDefaults {
    pub action: ImportAction,
    /// Namespace for Kubernetes manifests without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Terraform executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Directory holding one sub-directory per deployment
    pub workspace_root: PathBuf,
    /// Upper bound for every terraform invocation
    pub command_timeout_secs: u64,
    /// Age after which `cleanup` removes a deployment directory
    pub retention_hours: u64,
    /// Name or path of the terraform binary
    pub terraform_binary: String,
}

impl ExecutorConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_hours * 60 * 60)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workspace_root: std::env::temp_dir().join("cloudport-terraform"),
            command_timeout_secs: 5 * 60,
            retention_hours: 24,
            terraform_binary: "terraform".to_string(),
        }
    }
}

/// Infrastructure assistant (chat completion) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// API key for the completion endpoint (GROQ_API_KEY overrides it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// OpenAI-compatible chat completions URL
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.2,
            max_tokens: 2048,
            request_timeout_secs: 60,
        }
    }
}
