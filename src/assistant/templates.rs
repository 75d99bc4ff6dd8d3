//! Offline pieces of the assistant: provider detection, code extraction from
//! completions, and per-provider fallback configurations.

use crate::terraform::CloudProvider;
use regex::Regex;
use std::sync::LazyLock;

/// Fenced block: ```[lang]\n ... ```
static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[ \t]*([A-Za-z0-9_+-]*)[ \t]*\r?\n(.*?)```").unwrap());

const AZURE_KEYWORDS: &[&str] = &[
    "azure",
    "azurerm",
    "resource group",
    "blob storage",
    "aks",
    "cosmos",
    "app service",
];

const GCP_KEYWORDS: &[&str] = &[
    "gcp",
    "google cloud",
    "gcs",
    "gke",
    "bigquery",
    "cloud run",
    "compute engine",
];

const AWS_KEYWORDS: &[&str] = &["aws", "amazon", "s3", "ec2", "lambda", "dynamodb", "eks"];

/// Guess the target cloud from free text. Defaults to AWS.
pub fn detect_provider(text: &str) -> CloudProvider {
    let text = text.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let score = |keywords: &[&str]| {
        keywords
            .iter()
            .filter(|k| {
                let k: &str = k;
                if k.contains(' ') {
                    text.contains(k)
                } else {
                    words.contains(&k)
                }
            })
            .count()
    };

    let azure = score(AZURE_KEYWORDS);
    let gcp = score(GCP_KEYWORDS);
    let aws = score(AWS_KEYWORDS);

    if azure > aws && azure >= gcp {
        CloudProvider::Azure
    } else if gcp > aws && gcp > azure {
        CloudProvider::Gcp
    } else {
        CloudProvider::Aws
    }
}

/// First fenced code block tagged `hcl`, `terraform`, `tf`, or untagged.
pub fn extract_code(response: &str) -> Option<String> {
    FENCED_BLOCK
        .captures_iter(response)
        .filter(|caps| {
            matches!(
                caps[1].to_ascii_lowercase().as_str(),
                "" | "hcl" | "terraform" | "tf"
            )
        })
        .map(|caps| caps[2].trim().to_string())
        .find(|code| !code.is_empty())
}

/// Minimal configuration for `provider` that passes the executor's code
/// check. `prompt` only feeds the header comment and resource names.
pub fn fallback_template(provider: CloudProvider, prompt: &str) -> String {
    let summary = prompt_summary(prompt);
    let slug = resource_slug(prompt);

    let body = match provider {
        CloudProvider::Aws => format!(
            r#"provider "aws" {{
  region = var.region
}}

variable "region" {{
  type    = string
  default = "us-east-1"
}}

resource "aws_s3_bucket" "{slug}" {{
  bucket_prefix = "{prefix}-"

  tags = {{
    ManagedBy = "cloudport"
  }}
}}
"#,
            slug = slug,
            prefix = slug.replace('_', "-"),
        ),
        CloudProvider::Azure => format!(
            r#"provider "azurerm" {{
  features {{}}
}}

variable "location" {{
  type    = string
  default = "eastus"
}}

resource "azurerm_resource_group" "{slug}" {{
  name     = "{prefix}-rg"
  location = var.location

  tags = {{
    ManagedBy = "cloudport"
  }}
}}
"#,
            slug = slug,
            prefix = slug.replace('_', "-"),
        ),
        CloudProvider::Gcp => format!(
            r#"provider "google" {{
  project = var.project
  region  = var.region
}}

variable "project" {{
  type = string
}}

variable "region" {{
  type    = string
  default = "us-central1"
}}

resource "google_storage_bucket" "{slug}" {{
  name          = "${{var.project}}-{prefix}"
  location      = "US"
  force_destroy = false

  labels = {{
    managed_by = "cloudport"
  }}
}}
"#,
            slug = slug,
            prefix = slug.replace('_', "-"),
        ),
    };

    format!(
        "# {}\n\nterraform {{\n  required_version = \">= 1.0\"\n}}\n\n{}",
        summary, body
    )
}

fn prompt_summary(prompt: &str) -> String {
    let line = prompt.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return "Generated by cloudport".to_string();
    }
    let mut summary: String = line.chars().take(80).collect();
    if line.chars().count() > 80 {
        summary.push_str("...");
    }
    summary
}

/// Terraform-safe resource name derived from the prompt.
fn resource_slug(prompt: &str) -> String {
    let words: Vec<String> = prompt
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .take(3)
        .map(|w| w.to_ascii_lowercase())
        .collect();

    match words.first() {
        Some(first) if first.starts_with(|c: char| c.is_ascii_alphabetic()) => words.join("_"),
        _ => "main".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terraform::check_code;

    #[test]
    fn test_detect_provider() {
        assert_eq!(
            detect_provider("An S3 bucket with versioning"),
            CloudProvider::Aws
        );
        assert_eq!(
            detect_provider("Create an AKS cluster in a new resource group"),
            CloudProvider::Azure
        );
        assert_eq!(
            detect_provider("GKE cluster plus a GCS bucket on Google Cloud"),
            CloudProvider::Gcp
        );
        assert_eq!(detect_provider("a web server"), CloudProvider::Aws);
        // "tasks" must not match the "aks" keyword
        assert_eq!(detect_provider("run scheduled tasks"), CloudProvider::Aws);
    }

    #[test]
    fn test_extract_code_prefers_terraform_blocks() {
        let response = "Here you go:\n```bash\nterraform init\n```\n\n```hcl\nresource \"a\" \"b\" {}\n```\n";
        assert_eq!(
            extract_code(response).as_deref(),
            Some("resource \"a\" \"b\" {}")
        );
    }

    #[test]
    fn test_extract_code_untagged_and_missing() {
        assert_eq!(
            extract_code("```\nprovider \"aws\" {}\n```").as_deref(),
            Some("provider \"aws\" {}")
        );
        assert!(extract_code("no code here").is_none());
        assert!(extract_code("```json\n{}\n```").is_none());
    }

    #[test]
    fn test_fallback_templates_pass_code_check() {
        for provider in CloudProvider::ALL {
            let code = fallback_template(provider, "static website for marketing");
            assert!(
                check_code(&code).is_empty(),
                "{provider} template failed: {:?}",
                check_code(&code)
            );
            let body: hcl::Body = hcl::from_str(&code).unwrap();
            assert!(body.blocks().any(|b| b.identifier() == "resource"));
        }
    }

    #[test]
    fn test_resource_slug() {
        assert_eq!(resource_slug("Static website, for marketing"), "static_website_for");
        assert_eq!(resource_slug("42 buckets"), "main");
        assert_eq!(resource_slug(""), "main");
    }
}
