use super::code_check::check_code;
use super::plan::{PlanSummary, parse_plan_output};
use super::provider::{CloudProvider, render_versions_tf};
use super::workspace::Workspace;
use crate::common::command_utils::{CommandOutput, CommandRunner, ProcessRunner, display_command};
use crate::config::types::ExecutorConfig;
use crate::error::ExecutorError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use uuid::Uuid;

pub const MAIN_FILE: &str = "main.tf";
pub const VARIABLES_FILE: &str = "terraform.tfvars";
pub const VERSIONS_FILE: &str = "versions.tf";
pub const PLAN_FILE: &str = "tfplan";
pub const DESTROY_PLAN_FILE: &str = "destroy.tfplan";

static VARIABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

/// A Terraform configuration to plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerraformConfig {
    pub code: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Inferred from the first `provider` block when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<CloudProvider>,
}

impl TerraformConfig {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_provider(mut self, provider: CloudProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    fn resolved_provider(&self) -> CloudProvider {
        self.provider
            .or_else(|| CloudProvider::from_code(&self.code))
            .unwrap_or_default()
    }
}

/// Outcome of an executor operation. Failures are reported here, never
/// raised.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerraformExecutionResult {
    pub success: bool,
    pub deployment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub logs: Vec<String>,
}

/// Per-operation log buffer returned to the caller alongside the result.
#[derive(Debug, Default)]
struct ExecutionLog(Vec<String>);

impl ExecutionLog {
    fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    fn record_output(&mut self, output: &CommandOutput) {
        for line in output.stdout.lines().chain(output.stderr.lines()) {
            let line = line.trim_end();
            if !line.is_empty() {
                self.0.push(line.to_string());
            }
        }
    }
}

/// Plans Terraform configurations in isolated per-deployment workspaces.
///
/// Nothing is ever applied: `execute_terraform` and `destroy_deployment`
/// stop after `terraform plan`.
pub struct TerraformExecutor<R: CommandRunner = ProcessRunner> {
    config: ExecutorConfig,
    workspace: Workspace,
    runner: R,
}

impl TerraformExecutor<ProcessRunner> {
    /// Executor that shells out to the configured terraform binary
    pub fn from_config(config: ExecutorConfig) -> Self {
        Self::new(config, ProcessRunner)
    }
}

impl<R: CommandRunner> TerraformExecutor<R> {
    pub fn new(config: ExecutorConfig, runner: R) -> Self {
        let workspace = Workspace::new(config.workspace_root.clone());
        Self {
            config,
            workspace,
            runner,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        self.workspace.root()
    }

    /// First line of `terraform version`, or `None` if terraform cannot run.
    pub async fn terraform_version(&self) -> Option<String> {
        let dir = std::env::temp_dir();
        let output = self
            .runner
            .run(
                &self.config.terraform_binary,
                &["version"],
                &dir,
                self.config.command_timeout(),
            )
            .await
            .ok()?;

        if output.success() {
            output.stdout.lines().next().map(|s| s.trim().to_string())
        } else {
            None
        }
    }

    /// Check, write and plan a configuration in a fresh workspace.
    pub async fn execute_terraform(&self, config: &TerraformConfig) -> TerraformExecutionResult {
        let deployment_id = Uuid::new_v4().to_string();
        let mut log = ExecutionLog::default();

        let outcome = self.plan_new_deployment(&deployment_id, config, &mut log).await;
        finish(deployment_id, outcome, log)
    }

    /// Re-read the saved plan of an existing deployment.
    pub async fn get_deployment_status(&self, deployment_id: &str) -> TerraformExecutionResult {
        let mut log = ExecutionLog::default();
        let outcome = self.show_saved_plan(deployment_id, &mut log).await;
        finish(deployment_id.to_string(), outcome, log)
    }

    /// Compute (but do not apply) a destroy plan for an existing deployment.
    pub async fn destroy_deployment(&self, deployment_id: &str) -> TerraformExecutionResult {
        let mut log = ExecutionLog::default();
        let outcome = self.plan_destroy(deployment_id, &mut log).await;
        finish(deployment_id.to_string(), outcome, log)
    }

    /// Remove deployment workspaces older than the retention window.
    pub fn cleanup_workspace(&self) -> usize {
        let removed = self.workspace.cleanup(self.config.retention());
        log::info!(
            "Cleaned up {} deployment workspace(s) in {}",
            removed,
            self.workspace.root().display()
        );
        removed
    }

    async fn plan_new_deployment(
        &self,
        deployment_id: &str,
        config: &TerraformConfig,
        log: &mut ExecutionLog,
    ) -> Result<Option<PlanSummary>, ExecutorError> {
        let mut issues = check_code(&config.code);
        issues.extend(
            config
                .variables
                .keys()
                .filter(|name| !VARIABLE_NAME.is_match(name))
                .map(|name| format!("Invalid variable name '{}'", name)),
        );
        if !issues.is_empty() {
            return Err(ExecutorError::InvalidCode(issues));
        }
        log.push("Code validation passed");

        let dir = self.workspace.create(deployment_id)?;
        log.push(format!("Created workspace {}", dir.display()));

        self.workspace.write_file(&dir, MAIN_FILE, &config.code)?;
        if !config.variables.is_empty() {
            self.workspace
                .write_file(&dir, VARIABLES_FILE, &render_tfvars(&config.variables))?;
        }
        // A module may declare required_providers only once
        if !config.code.contains("required_providers") {
            let provider = config.resolved_provider();
            self.workspace
                .write_file(&dir, VERSIONS_FILE, &render_versions_tf(provider))?;
            log.push(format!("Pinned provider {}", provider.registry_source()));
        }

        self.terraform(&dir, &["init", "-input=false", "-no-color"], log)
            .await?;
        self.terraform(&dir, &["validate", "-no-color"], log).await?;
        let out = format!("-out={}", PLAN_FILE);
        let output = self
            .terraform(&dir, &["plan", "-input=false", "-no-color", out.as_str()], log)
            .await?;

        Ok(summarize(&output))
    }

    async fn show_saved_plan(
        &self,
        deployment_id: &str,
        log: &mut ExecutionLog,
    ) -> Result<Option<PlanSummary>, ExecutorError> {
        let dir = self.workspace.existing(deployment_id)?;
        if !dir.join(PLAN_FILE).is_file() {
            return Err(ExecutorError::PlanMissing(deployment_id.to_string()));
        }

        let output = self
            .terraform(&dir, &["show", "-no-color", PLAN_FILE], log)
            .await?;
        Ok(summarize(&output))
    }

    async fn plan_destroy(
        &self,
        deployment_id: &str,
        log: &mut ExecutionLog,
    ) -> Result<Option<PlanSummary>, ExecutorError> {
        let dir = self.workspace.existing(deployment_id)?;

        let out = format!("-out={}", DESTROY_PLAN_FILE);
        let output = self
            .terraform(
                &dir,
                &["plan", "-destroy", "-input=false", "-no-color", out.as_str()],
                log,
            )
            .await?;
        Ok(summarize(&output))
    }

    /// Run one terraform subcommand, logging it and its output. A non-zero
    /// exit becomes [`ExecutorError::CommandFailed`].
    async fn terraform(
        &self,
        dir: &Path,
        args: &[&str],
        log: &mut ExecutionLog,
    ) -> Result<CommandOutput, ExecutorError> {
        let binary = self.config.terraform_binary.as_str();
        let command = display_command(binary, args);
        log.push(format!("$ {}", command));
        log::info!("Running {}", command);

        let output = self
            .runner
            .run(binary, args, dir, self.config.command_timeout())
            .await?;
        log.record_output(&output);

        if !output.success() {
            let stderr = output.stderr.trim();
            return Err(ExecutorError::CommandFailed {
                command,
                status: output.status,
                stderr: if stderr.is_empty() {
                    output.stdout.trim().to_string()
                } else {
                    stderr.to_string()
                },
            });
        }

        Ok(output)
    }
}

/// Summary of a plan or show run. `None` when terraform succeeded but printed
/// nothing recognisable, so it is never mistaken for "No changes.".
fn summarize(output: &CommandOutput) -> Option<PlanSummary> {
    let summary = parse_plan_output(&output.stdout);
    if summary.is_none() {
        log::warn!("Could not find a plan summary in terraform output");
    }
    summary
}

fn finish(
    deployment_id: String,
    outcome: Result<Option<PlanSummary>, ExecutorError>,
    mut log: ExecutionLog,
) -> TerraformExecutionResult {
    match outcome {
        Ok(plan) => {
            match &plan {
                Some(plan) => log::info!(
                    "Deployment {}: {} to add, {} to change, {} to destroy",
                    deployment_id,
                    plan.to_add,
                    plan.to_change,
                    plan.to_destroy
                ),
                None => log::info!("Deployment {}: plan summary unavailable", deployment_id),
            }
            TerraformExecutionResult {
                success: true,
                deployment_id,
                plan,
                error: None,
                logs: log.0,
            }
        }
        Err(e) => {
            log::warn!("Deployment {} failed: {}", deployment_id, e);
            log.push(format!("ERROR: {}", e));
            TerraformExecutionResult {
                success: false,
                deployment_id,
                plan: None,
                error: Some(e.to_string()),
                logs: log.0,
            }
        }
    }
}

/// Render `terraform.tfvars`, one quoted string per variable.
pub fn render_tfvars(variables: &BTreeMap<String, String>) -> String {
    variables
        .iter()
        .map(|(name, value)| format!("{} = \"{}\"\n", name, escape_hcl_string(value)))
        .collect()
}

fn escape_hcl_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            // Template sequences would otherwise be interpolated
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(c);
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
