use thiserror::Error;

/// Top-level error type for cloudport.
#[derive(Debug, Error)]
pub enum CloudportError {
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Terraform error: {0}")]
    Executor(#[from] ExecutorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the import pipeline. The `Display` text of these errors is
/// what ends up in `ImportResult::errors`.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported import type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported import action: {0}")]
    UnsupportedAction(String),

    #[error("Terraform import failed: {0}")]
    Terraform(String),

    #[error("CloudFormation import failed: {0}")]
    CloudFormation(String),

    #[error("ARM template import failed: {0}")]
    Arm(String),

    #[error("Kubernetes import failed: {0}")]
    Kubernetes(String),

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Invalid import source: {0}")]
    InvalidSource(String),
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Code validation failed: {}", .0.join("; "))]
    InvalidCode(Vec<String>),

    #[error("Invalid deployment id: {0}")]
    InvalidDeploymentId(String),

    #[error("Deployment not found: {0}")]
    DeploymentNotFound(String),

    #[error("No plan found for deployment {0}")]
    PlanMissing(String),

    #[error("Failed to spawn `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("`{command}` exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Workspace error: {0}")]
    Workspace(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParsingFailed(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::Request(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CloudportError>;
