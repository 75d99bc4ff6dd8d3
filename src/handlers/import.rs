use crate::config::types::ImportDefaults;
use crate::importer::{Dialect, ImportOptions, ImportRequest, ImportResult, ImportService, load_source};
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Arguments of `cloudport import`
#[derive(Debug, Clone, Default)]
pub struct ImportCommand {
    pub source: PathBuf,
    pub import_type: String,
    pub action: Option<String>,
    pub options: ImportOptions,
    pub output: Option<PathBuf>,
}

pub fn handle_import(
    command: ImportCommand,
    defaults: &ImportDefaults,
    quiet: bool,
) -> crate::Result<()> {
    // An unknown type is reported in the JSON result, so the raw file is
    // still read when the dialect does not parse
    let source = read_source(&command.source, command.import_type.parse::<Dialect>().ok())?;

    let mut options = command.options;
    if options.namespace.is_none() {
        options.namespace = defaults.namespace.clone();
    }

    let request = ImportRequest {
        import_type: command.import_type,
        source,
        action: Some(
            command
                .action
                .unwrap_or_else(|| defaults.action.as_str().to_string()),
        ),
        options,
    };

    let result = ImportService::new().import_request(request);

    if let (Some(path), Some(converted)) = (&command.output, &result.converted_config) {
        std::fs::write(path, converted)?;
        log::info!("Wrote converted document to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !quiet {
        print_import_summary(&result, command.output.as_deref());
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

/// Read the import source from stdin (`-`), a directory, or a file.
fn read_source(path: &Path, dialect: Option<Dialect>) -> crate::Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }

    match dialect {
        Some(dialect) => load_source(path, dialect),
        None => Ok(std::fs::read_to_string(path)?),
    }
}

/// Human-readable summary on stderr, so stdout stays valid JSON.
fn print_import_summary(result: &ImportResult, output: Option<&Path>) {
    if result.success {
        eprintln!(
            "{} Imported {} resource(s)",
            "✅".green(),
            result.resource_count.to_string().bold()
        );
    } else {
        eprintln!("{} Import failed", "❌".red());
    }

    for warning in &result.warnings {
        eprintln!("   {} {}", "⚠".yellow(), warning);
    }
    for error in &result.errors {
        eprintln!("   {} {}", "✗".red().bold(), error);
    }

    if let Some(id) = &result.deployment_id {
        eprintln!("   Deployment: {}", id.cyan());
    }
    if let (Some(path), Some(_)) = (output, &result.converted_config) {
        eprintln!("   Converted document written to {}", path.display());
    }
}
