use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ToolError, ToolResult};

/// A tool that can be used by a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool, unique within the catalog
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// JSON schema for the parameters the tool accepts
    pub input_schema: Value,
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Check arguments against the declared schema before dispatch.
    ///
    /// This covers the subset of JSON schema the catalog actually uses:
    /// the arguments must be an object, every `required` field must be
    /// present, and any declared primitive `type` must match.
    pub fn validate_arguments(&self, arguments: &Value) -> ToolResult<()> {
        let args = arguments.as_object().ok_or_else(|| {
            ToolError::InvalidParameters(format!(
                "arguments for '{}' must be an object",
                self.name
            ))
        })?;

        if let Some(required) = self.input_schema.get("required").and_then(|r| r.as_array()) {
            for field in required.iter().filter_map(|f| f.as_str()) {
                if !args.contains_key(field) {
                    return Err(ToolError::InvalidParameters(format!(
                        "missing required field '{}' for '{}'",
                        field, self.name
                    )));
                }
            }
        }

        if let Some(properties) = self
            .input_schema
            .get("properties")
            .and_then(|p| p.as_object())
        {
            for (field, value) in args {
                let declared = match properties.get(field).and_then(|p| p.get("type")) {
                    Some(t) => t,
                    None => continue,
                };
                let Some(expected) = declared.as_str() else {
                    continue;
                };
                if value.is_null() {
                    continue;
                }
                let ok = match expected {
                    "string" => value.is_string(),
                    "number" => value.is_number(),
                    "integer" => value.is_i64() || value.is_u64(),
                    "boolean" => value.is_boolean(),
                    "array" => value.is_array(),
                    "object" => value.is_object(),
                    _ => true,
                };
                if !ok {
                    return Err(ToolError::InvalidParameters(format!(
                        "field '{}' of '{}' must be of type {}",
                        field, self.name, expected
                    )));
                }
            }
        }

        Ok(())
    }
}

/// A tool call request that a system can execute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// The parameters for the execution
    pub arguments: Value,
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
