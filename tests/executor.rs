//! Terraform executor tests with an in-process command runner.

use cloudport_cli::common::{CommandOutput, CommandRunner};
use cloudport_cli::config::types::ExecutorConfig;
use cloudport_cli::error::ExecutorError;
use cloudport_cli::terraform::{ChangeAction, CloudProvider, TerraformConfig, TerraformExecutor};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const CODE: &str = r#"terraform {
  required_version = ">= 1.0"
}

provider "aws" {
  region = var.region
}

variable "region" {
  type = string
}

resource "aws_s3_bucket" "assets" {
  bucket = "cloudport-assets"
}
"#;

const PLAN_OUTPUT: &str = "\
Terraform will perform the following actions:

  # aws_s3_bucket.assets will be created
  + resource \"aws_s3_bucket\" \"assets\" {
      + bucket = \"cloudport-assets\"
    }

Plan: 1 to add, 0 to change, 0 to destroy.
";

const DESTROY_OUTPUT: &str = "\
  # aws_s3_bucket.assets will be destroyed
  - resource \"aws_s3_bucket\" \"assets\" {}

Plan: 0 to add, 0 to change, 1 to destroy.
";

/// Stands in for the terraform binary. `plan` writes the plan file so later
/// `show` calls find it.
#[derive(Clone, Default)]
struct FakeTerraform {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    fail_on: Option<&'static str>,
    timeout_on: Option<&'static str>,
    plan_output: Option<&'static str>,
}

impl FakeTerraform {
    fn failing_on(subcommand: &'static str) -> Self {
        Self {
            fail_on: Some(subcommand),
            ..Default::default()
        }
    }

    fn timing_out_on(subcommand: &'static str) -> Self {
        Self {
            timeout_on: Some(subcommand),
            ..Default::default()
        }
    }

    fn printing_plan(output: &'static str) -> Self {
        Self {
            plan_output: Some(output),
            ..Default::default()
        }
    }

    fn subcommands(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call[1..].join(" "))
            .collect()
    }
}

impl CommandRunner for FakeTerraform {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        dir: &Path,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutorError> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(|a| a.to_string()));
        self.calls.lock().unwrap().push(call);

        let subcommand = args.first().copied().unwrap_or_default();
        if self.timeout_on == Some(subcommand) {
            return Err(ExecutorError::Timeout {
                command: format!("{} {}", program, args.join(" ")),
                seconds: timeout.as_secs(),
            });
        }
        if self.fail_on == Some(subcommand) {
            return Ok(CommandOutput {
                status: 1,
                stdout: String::new(),
                stderr: format!("Error: {} exploded", subcommand),
            });
        }

        let stdout = match subcommand {
            "version" => "Terraform v1.9.5\non linux_amd64\n".to_string(),
            "init" => "Terraform has been successfully initialized!\n".to_string(),
            "validate" => "Success! The configuration is valid.\n".to_string(),
            "plan" if args.contains(&"-destroy") => {
                std::fs::write(dir.join("destroy.tfplan"), "fake").unwrap();
                DESTROY_OUTPUT.to_string()
            }
            "plan" => {
                std::fs::write(dir.join("tfplan"), "fake").unwrap();
                self.plan_output.unwrap_or(PLAN_OUTPUT).to_string()
            }
            "show" => PLAN_OUTPUT.to_string(),
            other => panic!("unexpected terraform subcommand {other}"),
        };

        Ok(CommandOutput {
            status: 0,
            stdout,
            stderr: String::new(),
        })
    }
}

fn executor(temp: &TempDir, runner: FakeTerraform) -> TerraformExecutor<FakeTerraform> {
    let config = ExecutorConfig {
        workspace_root: temp.path().join("deployments"),
        command_timeout_secs: 30,
        ..Default::default()
    };
    TerraformExecutor::new(config, runner)
}

#[tokio::test]
async fn test_execute_runs_init_validate_plan() {
    let temp = TempDir::new().unwrap();
    let runner = FakeTerraform::default();
    let executor = executor(&temp, runner.clone());

    let config = TerraformConfig::new(CODE).with_variable("region", "eu-west-1");
    let result = executor.execute_terraform(&config).await;

    assert!(result.success, "{:?}", result.error);
    assert!(result.error.is_none());
    assert_eq!(
        runner.subcommands(),
        vec![
            "init -input=false -no-color",
            "validate -no-color",
            "plan -input=false -no-color -out=tfplan",
        ]
    );

    let plan = result.plan.unwrap();
    assert_eq!(plan.to_add, 1);
    assert_eq!(plan.changes[0].address, "aws_s3_bucket.assets");
    assert_eq!(plan.changes[0].action, ChangeAction::Create);

    let dir = temp.path().join("deployments").join(&result.deployment_id);
    assert_eq!(std::fs::read_to_string(dir.join("main.tf")).unwrap(), CODE);
    assert_eq!(
        std::fs::read_to_string(dir.join("terraform.tfvars")).unwrap(),
        "region = \"eu-west-1\"\n"
    );
    assert!(
        std::fs::read_to_string(dir.join("versions.tf"))
            .unwrap()
            .contains("hashicorp/aws")
    );
    assert!(result.logs.iter().any(|l| l == "$ terraform init -input=false -no-color"));
    assert!(result.logs.iter().any(|l| l.contains("successfully initialized")));
}

#[tokio::test]
async fn test_no_tfvars_without_variables() {
    let temp = TempDir::new().unwrap();
    let executor = executor(&temp, FakeTerraform::default());

    let result = executor
        .execute_terraform(&TerraformConfig::new(CODE).with_provider(CloudProvider::Aws))
        .await;

    assert!(result.success);
    let dir = temp.path().join("deployments").join(&result.deployment_id);
    assert!(!dir.join("terraform.tfvars").exists());
    assert!(dir.join("versions.tf").exists());
}

#[tokio::test]
async fn test_invalid_code_never_reaches_terraform() {
    let temp = TempDir::new().unwrap();
    let runner = FakeTerraform::default();
    let executor = executor(&temp, runner.clone());

    let code = format!("{}\nresource \"aws_db_instance\" \"db\" {{\n  password = \"hunter2\"\n}}\n", CODE);
    let result = executor.execute_terraform(&TerraformConfig::new(code)).await;

    assert!(!result.success);
    let error = result.error.unwrap();
    assert!(error.contains("Code validation failed"));
    assert!(error.contains("password"));
    assert!(runner.subcommands().is_empty());
    assert!(!temp.path().join("deployments").join(&result.deployment_id).exists());
}

#[tokio::test]
async fn test_command_failure_is_reported() {
    let temp = TempDir::new().unwrap();
    let runner = FakeTerraform::failing_on("validate");
    let executor = executor(&temp, runner.clone());

    let result = executor.execute_terraform(&TerraformConfig::new(CODE)).await;

    assert!(!result.success);
    assert!(result.plan.is_none());
    let error = result.error.unwrap();
    assert!(error.contains("terraform validate -no-color"));
    assert!(error.contains("validate exploded"));
    assert_eq!(runner.subcommands().len(), 2);
    assert!(result.logs.last().unwrap().starts_with("ERROR:"));
}

#[tokio::test]
async fn test_unrecognised_plan_output_has_no_summary() {
    let temp = TempDir::new().unwrap();
    let executor = executor(&temp, FakeTerraform::printing_plan("Something unexpected\n"));

    let result = executor.execute_terraform(&TerraformConfig::new(CODE)).await;

    assert!(result.success, "{:?}", result.error);
    assert!(result.plan.is_none());
    assert!(result.logs.iter().any(|l| l == "Something unexpected"));
}

#[tokio::test]
async fn test_no_changes_plan_is_summarized() {
    let temp = TempDir::new().unwrap();
    let executor = executor(
        &temp,
        FakeTerraform::printing_plan("No changes. Your infrastructure matches the configuration.\n"),
    );

    let result = executor.execute_terraform(&TerraformConfig::new(CODE)).await;

    let plan = result.plan.unwrap();
    assert!(!plan.has_changes());
    assert_eq!((plan.to_add, plan.to_change, plan.to_destroy), (0, 0, 0));
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let temp = TempDir::new().unwrap();
    let executor = executor(&temp, FakeTerraform::timing_out_on("init"));

    let result = executor.execute_terraform(&TerraformConfig::new(CODE)).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("timed out after 30s"));
}

#[tokio::test]
async fn test_status_and_destroy_of_planned_deployment() {
    let temp = TempDir::new().unwrap();
    let runner = FakeTerraform::default();
    let executor = executor(&temp, runner.clone());

    let planned = executor.execute_terraform(&TerraformConfig::new(CODE)).await;
    assert!(planned.success);

    let status = executor.get_deployment_status(&planned.deployment_id).await;
    assert!(status.success, "{:?}", status.error);
    assert_eq!(status.deployment_id, planned.deployment_id);
    assert_eq!(status.plan.unwrap().to_add, 1);

    let destroy = executor.destroy_deployment(&planned.deployment_id).await;
    assert!(destroy.success, "{:?}", destroy.error);
    let plan = destroy.plan.unwrap();
    assert_eq!(plan.to_destroy, 1);
    assert_eq!(plan.changes[0].action, ChangeAction::Delete);

    let calls = runner.subcommands();
    assert_eq!(calls[3], "show -no-color tfplan");
    assert_eq!(calls[4], "plan -destroy -input=false -no-color -out=destroy.tfplan");
    assert!(!calls.iter().any(|c| c.starts_with("apply")));
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let temp = TempDir::new().unwrap();
    let runner = FakeTerraform::default();
    let executor = executor(&temp, runner.clone());

    let missing = executor.get_deployment_status("does-not-exist").await;
    assert!(!missing.success);
    assert!(missing.error.unwrap().contains("Deployment not found"));

    let traversal = executor.destroy_deployment("../../etc").await;
    assert!(!traversal.success);
    assert!(traversal.error.unwrap().contains("Invalid deployment id"));

    assert!(runner.subcommands().is_empty());
}

#[tokio::test]
async fn test_status_without_plan_file() {
    let temp = TempDir::new().unwrap();
    let executor = executor(&temp, FakeTerraform::failing_on("plan"));

    let failed = executor.execute_terraform(&TerraformConfig::new(CODE)).await;
    assert!(!failed.success);

    let status = executor.get_deployment_status(&failed.deployment_id).await;
    assert!(!status.success);
    assert!(status.error.unwrap().contains("No plan found"));
}

#[tokio::test]
async fn test_cleanup_workspace() {
    let temp = TempDir::new().unwrap();
    let config = ExecutorConfig {
        workspace_root: temp.path().to_path_buf(),
        retention_hours: 0,
        ..Default::default()
    };
    let executor = TerraformExecutor::new(config, FakeTerraform::default());

    let first = executor.execute_terraform(&TerraformConfig::new(CODE)).await;
    let second = executor.execute_terraform(&TerraformConfig::new(CODE)).await;
    assert_ne!(first.deployment_id, second.deployment_id);

    assert_eq!(executor.cleanup_workspace(), 2);
    assert_eq!(executor.cleanup_workspace(), 0);
}

#[tokio::test]
async fn test_terraform_version() {
    let temp = TempDir::new().unwrap();
    let executor = executor(&temp, FakeTerraform::default());
    assert_eq!(
        executor.terraform_version().await.as_deref(),
        Some("Terraform v1.9.5")
    );

    let broken = TerraformExecutor::new(
        ExecutorConfig::default(),
        FakeTerraform::failing_on("version"),
    );
    assert!(broken.terraform_version().await.is_none());
}
