use super::deploy::report;
use crate::assistant::InfrastructureAssistant;
use crate::config::types::Config;
use crate::terraform::{TerraformConfig, TerraformExecutor};
use colored::Colorize;
use std::path::PathBuf;

pub async fn handle_generate(
    prompt: String,
    plan: bool,
    output: Option<PathBuf>,
    config: &Config,
    json: bool,
) -> crate::Result<()> {
    if !json {
        println!("🤖 Generating Terraform for: {}", prompt.bold());
    }

    let assistant = InfrastructureAssistant::new(&config.assistant);
    let generated = assistant.generate(&prompt).await;

    if let Some(path) = &output {
        std::fs::write(path, &generated.code)?;
        log::info!("Wrote generated code to {}", path.display());
    }

    if json && !plan {
        println!("{}", serde_json::to_string_pretty(&generated)?);
        return Ok(());
    }

    if !json {
        if generated.used_fallback {
            println!("{} Using the built-in {} template", "⚠".yellow(), generated.provider);
        }
        println!("\n{}", generated.code);
        if !generated.explanation.is_empty() {
            println!("{}", generated.explanation.dimmed());
        }
        if let Some(path) = &output {
            println!("✅ Saved to {}", path.display());
        }
    }

    if plan {
        let executor = TerraformExecutor::from_config(config.executor.clone());
        let terraform = TerraformConfig::new(generated.code).with_provider(generated.provider);
        let result = executor.execute_terraform(&terraform).await;
        report(&result, json)?;
    }

    Ok(())
}
