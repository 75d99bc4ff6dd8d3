//! Dialect parsers.
//!
//! Each parser turns raw source text into [`RawResource`] records and fails
//! with the dialect's [`ImportError`] variant on malformed input.

pub mod arm;
pub mod cloudformation;
pub mod kubernetes;
pub mod terraform;

use crate::error::ImportError;
use crate::importer::types::{Dialect, ImportOptions, RawResource};
use serde_json::{Map, Number, Value};

pub use arm::parse_arm;
pub use cloudformation::parse_cloudformation;
pub use kubernetes::parse_kubernetes;
pub use terraform::parse_terraform;

/// Parse `source` according to `dialect`.
pub fn parse_source(
    dialect: Dialect,
    source: &str,
    options: &ImportOptions,
) -> Result<Vec<RawResource>, ImportError> {
    let resources = match dialect {
        Dialect::Terraform => parse_terraform(source)?
            .into_iter()
            .map(RawResource::Terraform)
            .collect(),
        Dialect::CloudFormation => parse_cloudformation(source)?
            .into_iter()
            .map(RawResource::CloudFormation)
            .collect(),
        Dialect::Arm => parse_arm(source)?
            .into_iter()
            .map(RawResource::Arm)
            .collect(),
        Dialect::Kubernetes => parse_kubernetes(source, options.namespace.as_deref())?
            .into_iter()
            .map(RawResource::Kubernetes)
            .collect(),
    };

    Ok(resources)
}

/// Convert a YAML value to JSON.
///
/// CloudFormation short-form tags are expanded to their long form
/// (`!Ref X` -> `{"Ref": "X"}`, `!GetAtt A.B` -> `{"Fn::GetAtt": ["A", "B"]}`,
/// `!Sub s` -> `{"Fn::Sub": "s"}`). Any other tag becomes a single-key
/// object named after the tag.
pub(crate) fn yaml_to_json(value: &serde_yaml::Value) -> Result<Value, String> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => yaml_number_to_json(n),
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, val) in mapping {
                map.insert(yaml_key_to_string(key)?, yaml_to_json(val)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let tag = tag.trim_start_matches('!');
            let inner = yaml_to_json(&tagged.value)?;
            let (key, inner) = match tag {
                "Ref" | "Condition" => (tag.to_string(), inner),
                "GetAtt" => (
                    "Fn::GetAtt".to_string(),
                    match inner {
                        Value::String(s) => match s.split_once('.') {
                            Some((resource, attribute)) => Value::Array(vec![
                                Value::String(resource.to_string()),
                                Value::String(attribute.to_string()),
                            ]),
                            None => Value::String(s),
                        },
                        other => other,
                    },
                ),
                _ if tag.starts_with("Fn::") => (tag.to_string(), inner),
                _ => (format!("Fn::{}", tag), inner),
            };
            let mut map = Map::new();
            map.insert(key, inner);
            Value::Object(map)
        }
    })
}

fn yaml_number_to_json(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn yaml_key_to_string(key: &serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        _ => Err("mapping keys must be scalars".to_string()),
    }
}

/// Take the object stored under `key`, or an empty map.
pub(crate) fn object_field(value: &Value, key: &str) -> Map<String, Value> {
    value
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Read a dependency field that may be a single string or a list of strings.
pub(crate) fn string_list_field(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}
