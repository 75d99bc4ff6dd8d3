//! # Cloudport
//!
//! Imports Infrastructure as Code written for different clouds and tools,
//! validates it, and normalizes it into one provider-neutral document. A
//! companion executor plans Terraform configurations in isolated
//! workspaces.
//!
//! ## Features
//!
//! - **Import**: Terraform (HCL), CloudFormation (JSON/YAML), ARM templates and Kubernetes manifests
//! - **Validation**: per-dialect warnings for unsupported types and deprecated attributes
//! - **Conversion**: a universal JSON document with stable resource ids
//! - **Planning**: `terraform init`/`validate`/`plan` in per-deployment workspaces, never applied
//! - **Generation**: Terraform from a natural-language prompt, with offline templates
//!
//! ## Example
//!
//! ```rust
//! use cloudport_cli::{ImportRequest, ImportService};
//!
//! let request: ImportRequest = serde_json::from_str(
//!     r#"{"type":"terraform","source":"resource \"aws_s3_bucket\" \"assets\" {}","action":"convert"}"#,
//! )
//! .unwrap();
//!
//! let result = ImportService::new().import_request(request);
//! assert!(result.success);
//! assert_eq!(result.resource_count, 1);
//! ```

pub mod assistant;
pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod handlers;
pub mod importer;
pub mod terraform;

// Re-export commonly used types and functions
pub use assistant::{GeneratedInfrastructure, InfrastructureAssistant};
pub use error::{CloudportError, Result};
pub use importer::{
    Dialect, ImportAction, ImportConfiguration, ImportOptions, ImportRequest, ImportResult,
    ImportService,
};
pub use terraform::{TerraformConfig, TerraformExecutionResult, TerraformExecutor};

use cli::Commands;
use config::types::Config;
use handlers::*;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn run_command(command: Commands, config: &Config, json: bool, quiet: bool) -> Result<()> {
    match command {
        Commands::Import {
            source,
            import_type,
            action,
            region,
            namespace,
            resource_group,
            subscription,
            workspace,
            output,
        } => {
            let command = ImportCommand {
                source,
                import_type,
                action,
                options: ImportOptions {
                    workspace,
                    region,
                    subscription,
                    namespace,
                    resource_group,
                },
                output,
            };
            handle_import(command, &config.import, quiet)
        }
        Commands::Plan {
            file,
            provider,
            variables,
        } => handle_plan(file, provider, variables, &config.executor, json).await,
        Commands::Status { deployment_id } => {
            handle_status(deployment_id, &config.executor, json).await
        }
        Commands::Destroy { deployment_id } => {
            handle_destroy(deployment_id, &config.executor, json).await
        }
        Commands::Cleanup => handle_cleanup(&config.executor, json),
        Commands::Generate {
            prompt,
            plan,
            output,
        } => handle_generate(prompt, plan, output, config, json).await,
    }
}
