//! Per-dialect validation rules.
//!
//! Rules produce warnings for resources that are recognized but cannot be
//! carried over faithfully. Warnings never fail an import; errors do.

use crate::importer::types::{Dialect, RawResource};

/// Terraform resource types that are imported but not managed.
const UNSUPPORTED_TERRAFORM_TYPES: &[&str] = &["aws_lambda_permission", "aws_iam_policy_attachment"];

/// Terraform attribute that marks a resource as using removed schema.
const DEPRECATED_TERRAFORM_ATTRIBUTE: &str = "deprecated_attribute";

const UNSUPPORTED_CLOUDFORMATION_TYPES: &[&str] = &[
    "AWS::Lambda::Permission",
    "AWS::CloudFormation::CustomResource",
];

const UNSUPPORTED_ARM_TYPES: &[&str] = &["Microsoft.Resources/deployments"];

const UNSUPPORTED_KUBERNETES_KINDS: &[&str] = &["CustomResourceDefinition"];

/// Findings of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Validation {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn warn(&mut self, message: String) {
        log::debug!("Validation warning: {}", message);
        self.warnings.push(message);
    }
}

/// Run the rules for `dialect` over all resources.
pub fn validate(dialect: Dialect, resources: &[RawResource]) -> Validation {
    let mut validation = Validation::default();

    for resource in resources {
        let resource_type = resource.resource_type().unwrap_or_default();
        let name = resource.name().unwrap_or("unnamed-resource");

        let unsupported = match dialect {
            Dialect::Terraform => UNSUPPORTED_TERRAFORM_TYPES,
            Dialect::CloudFormation => UNSUPPORTED_CLOUDFORMATION_TYPES,
            Dialect::Arm => UNSUPPORTED_ARM_TYPES,
            Dialect::Kubernetes => UNSUPPORTED_KUBERNETES_KINDS,
        };

        if unsupported.contains(&resource_type) {
            validation.warn(match dialect {
                Dialect::Kubernetes => {
                    format!("Unsupported Kubernetes kind: {} ({})", resource_type, name)
                }
                _ => format!(
                    "Unsupported {} resource type: {} ({})",
                    dialect_label(dialect),
                    resource_type,
                    name
                ),
            });
        }

        if let RawResource::Terraform(tf) = resource {
            if tf.config.contains_key(DEPRECATED_TERRAFORM_ATTRIBUTE) {
                validation.warn(format!(
                    "Deprecated attribute '{}' used in {}.{}",
                    DEPRECATED_TERRAFORM_ATTRIBUTE, tf.resource_type, tf.name
                ));
            }
        }
    }

    validation
}

fn dialect_label(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Terraform => "Terraform",
        Dialect::CloudFormation => "CloudFormation",
        Dialect::Arm => "ARM",
        Dialect::Kubernetes => "Kubernetes",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::types::{KubernetesManifest, TerraformResource};
    use serde_json::{Map, Value};

    fn tf(resource_type: &str, config: Map<String, Value>) -> RawResource {
        RawResource::Terraform(TerraformResource {
            resource_type: resource_type.to_string(),
            name: "r".to_string(),
            config,
            depends_on: Vec::new(),
        })
    }

    #[test]
    fn test_unsupported_terraform_type() {
        let validation = validate(
            Dialect::Terraform,
            &[tf("aws_lambda_permission", Map::new()), tf("aws_instance", Map::new())],
        );

        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].contains("aws_lambda_permission"));
        assert!(!validation.has_errors());
    }

    #[test]
    fn test_deprecated_attribute() {
        let mut config = Map::new();
        config.insert("deprecated_attribute".to_string(), Value::Bool(true));

        let validation = validate(Dialect::Terraform, &[tf("aws_instance", config)]);

        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].contains("aws_instance.r"));
    }

    #[test]
    fn test_both_terraform_rules_fire() {
        let mut config = Map::new();
        config.insert("deprecated_attribute".to_string(), Value::Null);

        let validation = validate(Dialect::Terraform, &[tf("aws_iam_policy_attachment", config)]);
        assert_eq!(validation.warnings.len(), 2);
    }

    #[test]
    fn test_custom_resource_definition() {
        let crd = RawResource::Kubernetes(KubernetesManifest {
            api_version: Some("apiextensions.k8s.io/v1".to_string()),
            kind: "CustomResourceDefinition".to_string(),
            name: Some("widgets.example.com".to_string()),
            namespace: None,
            spec: Map::new(),
        });

        let validation = validate(Dialect::Kubernetes, &[crd]);
        assert_eq!(
            validation.warnings,
            vec!["Unsupported Kubernetes kind: CustomResourceDefinition (widgets.example.com)"]
        );
    }
}
