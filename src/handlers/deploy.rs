use crate::config::types::ExecutorConfig;
use crate::error::ConfigError;
use crate::terraform::{
    ChangeAction, CloudProvider, TerraformConfig, TerraformExecutionResult, TerraformExecutor,
};
use colored::Colorize;
use std::path::PathBuf;

pub async fn handle_plan(
    file: PathBuf,
    provider: Option<String>,
    variables: Vec<(String, String)>,
    config: &ExecutorConfig,
    json: bool,
) -> crate::Result<()> {
    let code = std::fs::read_to_string(&file)?;

    let mut terraform = TerraformConfig::new(code);
    if let Some(provider) = provider {
        terraform = terraform.with_provider(parse_provider(&provider)?);
    }
    terraform.variables.extend(variables);

    if !json {
        println!("🏗️  Planning {}", file.display());
    }

    let executor = TerraformExecutor::from_config(config.clone());
    if let Some(version) = executor.terraform_version().await {
        log::info!("Using {}", version);
    }

    let result = executor.execute_terraform(&terraform).await;
    report(&result, json)
}

pub async fn handle_status(
    deployment_id: String,
    config: &ExecutorConfig,
    json: bool,
) -> crate::Result<()> {
    let executor = TerraformExecutor::from_config(config.clone());
    let result = executor.get_deployment_status(&deployment_id).await;
    report(&result, json)
}

pub async fn handle_destroy(
    deployment_id: String,
    config: &ExecutorConfig,
    json: bool,
) -> crate::Result<()> {
    if !json {
        println!("🧨 Planning destruction of {}", deployment_id);
    }
    let executor = TerraformExecutor::from_config(config.clone());
    let result = executor.destroy_deployment(&deployment_id).await;
    report(&result, json)
}

pub fn handle_cleanup(config: &ExecutorConfig, json: bool) -> crate::Result<()> {
    let executor = TerraformExecutor::from_config(config.clone());
    let removed = executor.cleanup_workspace();

    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        println!(
            "🧹 Removed {} deployment workspace(s) older than {}h from {}",
            removed,
            config.retention_hours,
            executor.workspace_root().display()
        );
    }
    Ok(())
}

pub(crate) fn parse_provider(raw: &str) -> crate::Result<CloudProvider> {
    raw.parse::<CloudProvider>().map_err(|message| {
        ConfigError::InvalidValue {
            key: "provider".to_string(),
            message,
        }
        .into()
    })
}

/// Print an executor result and exit with status 1 when it failed.
pub(crate) fn report(result: &TerraformExecutionResult, json: bool) -> crate::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_execution_result(result);
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_execution_result(result: &TerraformExecutionResult) {
    println!("\n{}", "═".repeat(60).bright_blue());
    println!("Deployment {}", result.deployment_id.cyan().bold());
    println!("{}", "═".repeat(60).bright_blue());

    if let Some(error) = &result.error {
        println!("{} {}", "❌".red(), error.red());
        if !result.logs.is_empty() {
            println!("\n{}", "Logs:".dimmed());
            for line in &result.logs {
                println!("  {}", line.dimmed());
            }
        }
        return;
    }

    let Some(plan) = &result.plan else {
        println!("{} Done", "✅".green());
        return;
    };

    if !plan.has_changes() {
        println!("{} No changes.", "✅".green());
        return;
    }

    for change in &plan.changes {
        let marker = match change.action {
            ChangeAction::Create => "+".green(),
            ChangeAction::Update => "~".yellow(),
            ChangeAction::Replace => "-/+".magenta(),
            ChangeAction::Delete => "-".red(),
            ChangeAction::Read => "<=".cyan(),
        };
        println!("  {} {}", marker, change.address);
    }

    println!(
        "\nPlan: {} to add, {} to change, {} to destroy.",
        plan.to_add.to_string().green().bold(),
        plan.to_change.to_string().yellow().bold(),
        plan.to_destroy.to_string().red().bold()
    );
    println!("{}", "Plan saved; nothing was applied.".dimmed());
}
