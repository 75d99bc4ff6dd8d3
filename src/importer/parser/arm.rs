//! Azure Resource Manager template parser.

use super::{object_field, string_list_field};
use crate::error::ImportError;
use crate::importer::types::ArmResource;
use serde_json::Value;

/// Parse an ARM template. Only JSON is accepted.
pub fn parse_arm(source: &str) -> Result<Vec<ArmResource>, ImportError> {
    let template: Value =
        serde_json::from_str(source).map_err(|e| ImportError::Arm(e.to_string()))?;

    let Value::Object(template) = template else {
        return Err(ImportError::Arm("template root must be an object".to_string()));
    };

    let resources = match template.get("resources") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(resources)) => resources,
        Some(_) => {
            return Err(ImportError::Arm("resources must be an array".to_string()));
        }
    };

    let parsed: Vec<ArmResource> = resources
        .iter()
        .map(|resource| ArmResource {
            resource_type: string_field(resource, "type"),
            name: string_field(resource, "name"),
            api_version: string_field(resource, "apiVersion"),
            location: string_field(resource, "location"),
            properties: object_field(resource, "properties"),
            depends_on: string_list_field(resource, "dependsOn"),
        })
        .collect();

    log::debug!("Parsed {} ARM resource(s)", parsed.len());
    Ok(parsed)
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(String::from)
}
