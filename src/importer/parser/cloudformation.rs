//! CloudFormation template parser (JSON or YAML).

use super::{object_field, string_list_field, yaml_to_json};
use crate::error::ImportError;
use crate::importer::types::CloudFormationResource;
use serde_json::Value;

/// Parse a CloudFormation template and return the entries of its
/// `Resources` section in document order.
///
/// The source is tried as JSON first and as YAML second. A template without
/// a `Resources` section (including an empty document) has no resources.
pub fn parse_cloudformation(source: &str) -> Result<Vec<CloudFormationResource>, ImportError> {
    let template = load_template(source)?;

    let root = match &template {
        Value::Null => return Ok(Vec::new()),
        Value::Object(root) => root,
        _ => {
            return Err(ImportError::CloudFormation(
                "template root must be a mapping".to_string(),
            ));
        }
    };

    let resources = match root.get("Resources") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(resources)) => resources,
        Some(_) => {
            return Err(ImportError::CloudFormation(
                "Resources must be a mapping of logical IDs".to_string(),
            ));
        }
    };

    let mut parsed = Vec::with_capacity(resources.len());
    for (logical_id, definition) in resources {
        if !definition.is_object() {
            return Err(ImportError::CloudFormation(format!(
                "resource {} must be a mapping",
                logical_id
            )));
        }

        parsed.push(CloudFormationResource {
            logical_id: logical_id.clone(),
            resource_type: definition
                .get("Type")
                .and_then(Value::as_str)
                .map(String::from),
            properties: object_field(definition, "Properties"),
            depends_on: string_list_field(definition, "DependsOn"),
        });
    }

    log::debug!("Parsed {} CloudFormation resource(s)", parsed.len());
    Ok(parsed)
}

fn load_template(source: &str) -> Result<Value, ImportError> {
    match serde_json::from_str::<Value>(source) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            log::debug!("Template is not JSON ({}), trying YAML", json_err);
            let yaml: serde_yaml::Value = serde_yaml::from_str(source)
                .map_err(|e| ImportError::CloudFormation(e.to_string()))?;
            yaml_to_json(&yaml).map_err(ImportError::CloudFormation)
        }
    }
}
