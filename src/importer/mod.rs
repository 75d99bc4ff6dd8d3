//! Infrastructure configuration import.
//!
//! Imports Terraform, CloudFormation, ARM and Kubernetes sources:
//!
//! 1. the dialect parser turns the source into [`RawResource`] records
//! 2. the dialect's validation rules collect warnings
//! 3. for `convert`, the resources are rendered as a universal JSON document
//!
//! # Example
//!
//! ```rust
//! use cloudport_cli::importer::{Dialect, ImportAction, ImportConfiguration, ImportService};
//!
//! let service = ImportService::new();
//! let config = ImportConfiguration::new(
//!     Dialect::CloudFormation,
//!     r#"{"Resources":{"MyBucket":{"Type":"AWS::S3::Bucket","Properties":{}}}}"#,
//! )
//! .with_action(ImportAction::Convert);
//!
//! let result = service.import_configuration(&config);
//! assert!(result.success);
//! assert_eq!(result.resource_count, 1);
//! assert!(result.converted_config.unwrap().contains("storage.bucket"));
//! ```

pub mod convert;
pub mod parser;
pub mod types;
pub mod validate;

pub use convert::{UNNAMED_RESOURCE, build_document, convert, universal_type};
pub use parser::parse_source;
pub use types::{
    ArmResource, CloudFormationResource, Dialect, ImportAction, ImportConfiguration,
    ImportOptions, ImportRequest, ImportResult, KubernetesManifest, RawResource,
    TerraformResource, UniversalDocument, UniversalResource,
};
pub use validate::{Validation, validate};

use crate::error::{ImportError, Result};
use std::path::Path;
use uuid::Uuid;
use walkdir::WalkDir;

/// Runs import requests. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportService;

impl ImportService {
    pub fn new() -> Self {
        Self
    }

    /// Import an untyped request. An unknown type or action is rejected
    /// before anything is parsed.
    pub fn import_request(&self, request: ImportRequest) -> ImportResult {
        match ImportConfiguration::try_from(request) {
            Ok(config) => self.import_configuration(&config),
            Err(e) => {
                log::warn!("{}", e);
                ImportResult::failure(e.to_string())
            }
        }
    }

    /// Import a configuration. Never fails: every error is reported in
    /// [`ImportResult::errors`].
    pub fn import_configuration(&self, config: &ImportConfiguration) -> ImportResult {
        log::info!(
            "Importing {} source ({} bytes, action: {})",
            config.dialect,
            config.source.len(),
            config.action
        );

        match self.run(config) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{}", e);
                ImportResult::failure(e.to_string())
            }
        }
    }

    fn run(&self, config: &ImportConfiguration) -> std::result::Result<ImportResult, ImportError> {
        let resources = parse_source(config.dialect, &config.source, &config.options)?;
        let validation = validate(config.dialect, &resources);

        let converted_config = match config.action {
            ImportAction::Convert => Some(convert(&resources, config.dialect, &config.options)?),
            _ => None,
        };

        let success = !validation.has_errors();
        let deployment_id = (config.action == ImportAction::Deploy && success)
            .then(|| format!("deploy-{}", Uuid::new_v4()));

        log::info!(
            "Imported {} {} resource(s) with {} warning(s)",
            resources.len(),
            config.dialect,
            validation.warnings.len()
        );

        Ok(ImportResult {
            success,
            resource_count: resources.len(),
            warnings: validation.warnings,
            errors: validation.errors,
            converted_config,
            deployment_id,
        })
    }
}

/// File extensions considered when importing a directory.
fn source_extensions(dialect: Dialect) -> &'static [&'static str] {
    match dialect {
        Dialect::Terraform => &["tf"],
        Dialect::CloudFormation => &["json", "yaml", "yml", "template"],
        Dialect::Arm => &["json"],
        Dialect::Kubernetes => &["yaml", "yml"],
    }
}

/// Read an import source from a file, or from a directory.
///
/// Terraform and Kubernetes directories are read recursively and merged
/// into one source (Terraform files are concatenated, Kubernetes files are
/// joined as separate YAML documents). Template dialects describe a single
/// document, so a directory must contain exactly one matching file.
pub fn load_source(path: &Path, dialect: Dialect) -> Result<String> {
    if !path.is_dir() {
        return Ok(std::fs::read_to_string(path)?);
    }

    let extensions = source_extensions(dialect);
    let mut files: Vec<_> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext))
        })
        .collect();
    files.sort();

    log::debug!("Found {} {} file(s) in {}", files.len(), dialect, path.display());

    match dialect {
        Dialect::Terraform | Dialect::Kubernetes => {
            let separator = if dialect == Dialect::Kubernetes { "\n---\n" } else { "\n" };
            let mut parts = Vec::with_capacity(files.len());
            for file in &files {
                parts.push(std::fs::read_to_string(file)?);
            }
            Ok(parts.join(separator))
        }
        Dialect::CloudFormation | Dialect::Arm => match files.as_slice() {
            [single] => Ok(std::fs::read_to_string(single)?),
            _ => Err(ImportError::InvalidSource(format!(
                "{} import expects exactly one template file in {}, found {}",
                dialect,
                path.display(),
                files.len()
            ))
            .into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_populates_converted_config_only() {
        let service = ImportService::new();
        let source = "resource \"aws_instance\" \"web\" {\n}\n";

        let imported = service.import_configuration(&ImportConfiguration::new(Dialect::Terraform, source));
        assert!(imported.converted_config.is_none());
        assert!(imported.deployment_id.is_none());

        let converted = service.import_configuration(
            &ImportConfiguration::new(Dialect::Terraform, source).with_action(ImportAction::Convert),
        );
        assert!(converted.converted_config.is_some());
        assert!(converted.deployment_id.is_none());
    }

    #[test]
    fn test_deploy_assigns_deployment_id() {
        let result = ImportService::new().import_configuration(
            &ImportConfiguration::new(Dialect::Kubernetes, "kind: Namespace\nmetadata:\n  name: apps\n")
                .with_action(ImportAction::Deploy),
        );

        assert!(result.success);
        let id = result.deployment_id.unwrap();
        assert!(id.starts_with("deploy-"));
        assert!(Uuid::parse_str(id.trim_start_matches("deploy-")).is_ok());
    }

    #[test]
    fn test_unsupported_type_request() {
        let result = ImportService::new().import_request(ImportRequest {
            import_type: "pulumi".to_string(),
            source: "resource \"aws_instance\" \"web\" {}".to_string(),
            ..Default::default()
        });

        assert!(!result.success);
        assert_eq!(result.resource_count, 0);
        assert_eq!(result.errors, vec!["Unsupported import type: pulumi"]);
    }

    #[test]
    fn test_parse_failure_drops_partial_results() {
        let result = ImportService::new().import_configuration(
            &ImportConfiguration::new(Dialect::Arm, "{not json").with_action(ImportAction::Convert),
        );

        assert!(!result.success);
        assert_eq!(result.resource_count, 0);
        assert!(result.warnings.is_empty());
        assert!(result.converted_config.is_none());
        assert_eq!(result.errors.len(), 1);
    }
}
