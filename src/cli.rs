use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cloudport")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Import, normalize and plan multi-cloud Infrastructure as Code")]
#[command(long_about = "Imports Terraform, CloudFormation, ARM templates and Kubernetes manifests, \
validates them, converts them into a provider-neutral resource document, and plans Terraform \
configurations in isolated workspaces. Plans are never applied.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format where applicable
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import an infrastructure definition and print the import result as JSON
    Import {
        /// Source file, directory (terraform, kubernetes) or `-` for stdin
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Source dialect: terraform, cloudformation, arm or kubernetes
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        import_type: String,

        /// What to do with the parsed resources: import, convert or deploy
        #[arg(short, long)]
        action: Option<String>,

        /// Region recorded in the converted document
        #[arg(long)]
        region: Option<String>,

        /// Namespace for Kubernetes manifests that do not set one
        #[arg(long)]
        namespace: Option<String>,

        /// Azure resource group recorded in the converted document
        #[arg(long)]
        resource_group: Option<String>,

        /// Azure subscription recorded in the converted document
        #[arg(long)]
        subscription: Option<String>,

        /// Terraform workspace recorded in the converted document
        #[arg(long)]
        workspace: Option<String>,

        /// Write the converted document to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Plan a Terraform configuration in a new workspace (never applies)
    Plan {
        /// Terraform file to plan
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Target cloud (aws, azure, gcp); inferred from the provider block when omitted
        #[arg(short, long)]
        provider: Option<String>,

        /// Terraform variable as NAME=VALUE (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
        variables: Vec<(String, String)>,
    },

    /// Show the saved plan of a deployment
    Status {
        /// Deployment id printed by `plan`
        #[arg(value_name = "DEPLOYMENT_ID")]
        deployment_id: String,
    },

    /// Compute a destroy plan for a deployment (never applies)
    Destroy {
        /// Deployment id printed by `plan`
        #[arg(value_name = "DEPLOYMENT_ID")]
        deployment_id: String,
    },

    /// Remove deployment workspaces older than the retention window
    Cleanup,

    /// Generate Terraform from a natural-language description
    Generate {
        /// What to build, e.g. "static website on S3"
        #[arg(value_name = "PROMPT")]
        prompt: String,

        /// Plan the generated configuration right away
        #[arg(long)]
        plan: bool,

        /// Write the generated code to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Parse a `NAME=VALUE` pair.
pub fn parse_variable(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(
            parse_variable("region=us-east-1"),
            Ok(("region".to_string(), "us-east-1".to_string()))
        );
        assert_eq!(
            parse_variable("tag=a=b"),
            Ok(("tag".to_string(), "a=b".to_string()))
        );
        assert!(parse_variable("=x").is_err());
        assert!(parse_variable("novalue").is_err());
    }

    #[test]
    fn test_import_arguments() {
        let cli = Cli::try_parse_from([
            "cloudport",
            "import",
            "stack.yaml",
            "--type",
            "cloudformation",
            "--action",
            "convert",
            "--region",
            "eu-west-1",
        ])
        .unwrap();

        match cli.command {
            Commands::Import {
                import_type,
                action,
                region,
                ..
            } => {
                assert_eq!(import_type, "cloudformation");
                assert_eq!(action.as_deref(), Some("convert"));
                assert_eq!(region.as_deref(), Some("eu-west-1"));
            }
            _ => panic!("expected import command"),
        }
    }

    #[test]
    fn test_plan_variables() {
        let cli = Cli::try_parse_from([
            "cloudport", "plan", "main.tf", "--var", "a=1", "--var", "b=2", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Plan { variables, .. } => assert_eq!(variables.len(), 2),
            _ => panic!("expected plan command"),
        }
    }
}
