//! Argument validation against a tool's input schema.
//!
//! Checked before the handler runs, in this order: required arguments are
//! present, every argument is declared, and each value has the declared JSON
//! type. Any failure is an invalid-params protocol error.

use crate::tool::{Arguments, ToolDefinition};
use rmcp::model::ErrorData;
use serde_json::{Map, Value};

/// Validate `args` for `tool`.
pub fn validate_arguments(tool: &ToolDefinition, args: &Arguments) -> Result<(), ErrorData> {
    let schema = tool.input_schema();
    let name = tool.name();
    let empty = Map::new();
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for param in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(param) {
                return Err(ErrorData::invalid_params(
                    format!("Missing required argument '{param}' for tool '{name}'"),
                    None,
                ));
            }
        }
    }

    let open = matches!(schema.get("additionalProperties"), Some(Value::Bool(true)));
    for (param, value) in args {
        let Some(property) = properties.get(param) else {
            if open {
                continue;
            }
            return Err(ErrorData::invalid_params(
                format!("Unknown argument '{param}' for tool '{name}'"),
                None,
            ));
        };

        let accepted = declared_types(property);
        if !accepted.is_empty() && !accepted.iter().any(|ty| matches_type(value, ty)) {
            return Err(ErrorData::invalid_params(
                format!(
                    "Argument '{param}' for tool '{name}' must be of type {}",
                    accepted.join(" or ")
                ),
                None,
            ));
        }
    }

    Ok(())
}

fn declared_types(property: &Value) -> Vec<&str> {
    match property.get("type") {
        Some(Value::String(ty)) => vec![ty.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn matches_type(value: &Value, ty: &str) -> bool {
    match ty {
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => true,
    }
}
