//! Natural-language to Terraform generation.
//!
//! [`InfrastructureAssistant::generate`] asks a chat-completion endpoint for
//! a configuration and falls back to a built-in template whenever that is
//! not possible, so callers always get code that passes
//! [`check_code`](crate::terraform::check_code).

pub mod client;
pub mod templates;

pub use client::{ChatClient, ChatMessage};
pub use templates::{detect_provider, extract_code, fallback_template};

use crate::config::types::AssistantConfig;
use crate::error::AssistantError;
use crate::terraform::{CloudProvider, check_code};
use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str = "You are an infrastructure engineer. Answer with a single, complete \
Terraform configuration in one ```hcl fenced block, followed by a short explanation. The \
configuration must contain a terraform block, a provider block and at least one resource. \
Never hardcode passwords, secrets or keys; use variables instead.";

/// Terraform produced for a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInfrastructure {
    pub provider: CloudProvider,
    pub code: String,
    pub explanation: String,
    /// True when the built-in template was returned instead of model output
    pub used_fallback: bool,
}

pub struct InfrastructureAssistant {
    client: Option<ChatClient>,
}

impl InfrastructureAssistant {
    pub fn new(config: &AssistantConfig) -> Self {
        let client = match ChatClient::from_config(config) {
            Ok(client) => Some(client),
            Err(AssistantError::MissingApiKey) => {
                log::debug!("No assistant API key configured, using templates only");
                None
            }
            Err(e) => {
                log::warn!("Assistant client unavailable: {}", e);
                None
            }
        };
        Self { client }
    }

    /// Assistant that never calls out and always uses the templates
    pub fn offline() -> Self {
        Self { client: None }
    }

    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    /// Generate Terraform for `prompt`. Never fails.
    pub async fn generate(&self, prompt: &str) -> GeneratedInfrastructure {
        let provider = detect_provider(prompt);

        let Some(client) = &self.client else {
            return fallback(provider, prompt, "no API key configured".to_string());
        };

        match self.ask(client, prompt).await {
            Ok((code, explanation)) => {
                let provider = CloudProvider::from_code(&code).unwrap_or(provider);
                GeneratedInfrastructure {
                    provider,
                    code,
                    explanation,
                    used_fallback: false,
                }
            }
            Err(reason) => {
                log::warn!("Falling back to template: {}", reason);
                fallback(provider, prompt, reason)
            }
        }
    }

    async fn ask(&self, client: &ChatClient, prompt: &str) -> Result<(String, String), String> {
        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        let response = client.complete(&messages).await.map_err(|e| e.to_string())?;

        let code = extract_code(&response)
            .ok_or_else(|| "response contained no Terraform code block".to_string())?;

        let issues = check_code(&code);
        if !issues.is_empty() {
            return Err(format!("generated code rejected: {}", issues.join("; ")));
        }

        Ok((code, explanation_text(&response)))
    }
}

fn fallback(provider: CloudProvider, prompt: &str, reason: String) -> GeneratedInfrastructure {
    GeneratedInfrastructure {
        provider,
        code: fallback_template(provider, prompt),
        explanation: format!(
            "Starter {} configuration generated from a built-in template ({}).",
            provider.as_str().to_uppercase(),
            reason
        ),
        used_fallback: true,
    }
}

/// Completion text with fenced blocks removed.
fn explanation_text(response: &str) -> String {
    let mut in_fence = false;
    let mut lines = Vec::new();
    for line in response.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            lines.push(line);
        }
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_generate_uses_fallback() {
        let assistant = InfrastructureAssistant::new(&AssistantConfig::default());
        assert!(!assistant.is_online());

        let generated = assistant
            .generate("Azure storage account in a resource group")
            .await;

        assert!(generated.used_fallback);
        assert_eq!(generated.provider, CloudProvider::Azure);
        assert!(generated.code.contains("provider \"azurerm\""));
        assert!(check_code(&generated.code).is_empty());
        assert!(generated.explanation.contains("no API key configured"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        let config = AssistantConfig {
            api_key: Some("test-key".to_string()),
            endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let assistant = InfrastructureAssistant::new(&config);
        assert!(assistant.is_online());

        let generated = assistant.generate("an s3 bucket").await;
        assert!(generated.used_fallback);
        assert_eq!(generated.provider, CloudProvider::Aws);
    }

    #[test]
    fn test_explanation_text() {
        let response = "Here is the config:\n```hcl\nterraform {}\n```\nIt creates a bucket.";
        assert_eq!(
            explanation_text(response),
            "Here is the config:\nIt creates a bucket."
        );
    }

    #[test]
    fn test_serialization_is_camel_case() {
        let generated = fallback(CloudProvider::Gcp, "bucket", "offline".to_string());
        let json = serde_json::to_value(&generated).unwrap();
        assert_eq!(json["provider"], "gcp");
        assert_eq!(json["usedFallback"], true);
    }
}
