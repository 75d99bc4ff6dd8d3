//! Terraform HCL parser.
//!
//! Extracts top-level `resource "<type>" "<name>" { ... }` blocks from a
//! configuration. Block bodies are captured in the same shape Terraform's
//! JSON syntax uses: attributes become values, nested blocks become
//! objects (arrays when repeated), and anything that is not a literal
//! (references, function calls, conditionals) becomes a `"${...}"` string.

use crate::error::ImportError;
use crate::importer::types::TerraformResource;
use hcl::{Block, Body, Expression, ObjectKey, Structure};
use serde_json::{Map, Value};

/// Meta-argument holding explicit dependencies.
const DEPENDS_ON: &str = "depends_on";

/// Parse a Terraform configuration and return its resource blocks in
/// source order. Empty input yields no resources.
pub fn parse_terraform(source: &str) -> Result<Vec<TerraformResource>, ImportError> {
    let body: Body = hcl::from_str(source).map_err(|e| ImportError::Terraform(e.to_string()))?;

    let mut resources = Vec::new();
    for structure in body.iter() {
        if let Structure::Block(block) = structure {
            if block.identifier() == "resource" {
                resources.push(parse_resource_block(block)?);
            }
        }
    }

    log::debug!("Parsed {} Terraform resource block(s)", resources.len());
    Ok(resources)
}

fn parse_resource_block(block: &Block) -> Result<TerraformResource, ImportError> {
    let labels: Vec<&str> = block.labels().iter().map(|l| l.as_str()).collect();

    let [resource_type, name] = labels.as_slice() else {
        return Err(ImportError::Terraform(format!(
            "resource block must have exactly two labels (type and name), found {}",
            labels.len()
        )));
    };

    let mut config = Map::new();
    let mut depends_on = Vec::new();

    for structure in block.body().iter() {
        match structure {
            Structure::Attribute(attr) if attr.key() == DEPENDS_ON => {
                depends_on = dependency_addresses(attr.expr());
            }
            Structure::Attribute(attr) => {
                config.insert(attr.key().to_string(), expr_to_json(attr.expr()));
            }
            Structure::Block(inner) => insert_block(&mut config, inner),
        }
    }

    Ok(TerraformResource {
        resource_type: resource_type.to_string(),
        name: name.to_string(),
        config,
        depends_on,
    })
}

/// `depends_on = [aws_vpc.main, module.db]` -> `["aws_vpc.main", "module.db"]`
fn dependency_addresses(expr: &Expression) -> Vec<String> {
    match expr {
        Expression::Array(items) => items.iter().map(expr_source).collect(),
        other => vec![expr_source(other)],
    }
}

fn body_to_map(body: &Body) -> Map<String, Value> {
    let mut map = Map::new();

    for structure in body.iter() {
        match structure {
            Structure::Attribute(attr) => {
                map.insert(attr.key().to_string(), expr_to_json(attr.expr()));
            }
            Structure::Block(block) => insert_block(&mut map, block),
        }
    }

    map
}

/// Insert a nested block under its identifier, wrapping it in one object
/// level per label. A repeated identifier turns the entry into an array.
fn insert_block(map: &mut Map<String, Value>, block: &Block) {
    let mut value = Value::Object(body_to_map(block.body()));
    for label in block.labels().iter().rev() {
        let mut wrapper = Map::new();
        wrapper.insert(label.as_str().to_string(), value);
        value = Value::Object(wrapper);
    }

    match map.get_mut(block.identifier()) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(block.identifier().to_string(), value);
        }
    }
}

/// Convert an HCL expression to a JSON value.
fn expr_to_json(expr: &Expression) -> Value {
    match expr {
        Expression::Null => Value::Null,
        Expression::Bool(b) => Value::Bool(*b),
        Expression::Number(n) => serde_json::to_value(n).unwrap_or(Value::Null),
        Expression::String(s) => Value::String(s.clone()),
        Expression::Array(items) => Value::Array(items.iter().map(expr_to_json).collect()),
        Expression::Object(object) => {
            let mut map = Map::new();
            for (key, value) in object.iter() {
                map.insert(object_key_to_string(key), expr_to_json(value));
            }
            Value::Object(map)
        }
        // Quoted templates and heredocs keep their raw text, which already
        // carries any `${...}` interpolations.
        Expression::TemplateExpr(template) => Value::String(template.to_string()),
        other => Value::String(format!("${{{}}}", expr_source(other))),
    }
}

/// HCL source text of an expression, e.g. `aws_vpc.main.id`.
fn expr_source(expr: &Expression) -> String {
    match expr {
        Expression::String(s) => s.clone(),
        other => hcl::format::to_string(other).unwrap_or_else(|e| {
            log::debug!("Failed to format HCL expression: {}", e);
            String::new()
        }),
    }
}

fn object_key_to_string(key: &ObjectKey) -> String {
    if let ObjectKey::Identifier(ident) = key {
        return ident.to_string();
    }
    if let ObjectKey::Expression(expr) = key {
        return expr_source(expr);
    }
    String::new()
}
