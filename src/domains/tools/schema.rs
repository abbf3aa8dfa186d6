//! Declarative parameter schemas for tools.
//!
//! Each tool declares its parameters once as a [`ToolSchema`]. The same
//! declaration produces the JSON Schema advertised to clients and validates
//! incoming arguments before they are decoded into the tool's typed params.

use rmcp::model::{JsonObject, Tool};
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Boolean,
    Number,
    StringArray,
}

impl ParamKind {
    fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::StringArray => "array",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Boolean => "a boolean",
            Self::Number => "a number",
            Self::StringArray => "an array of strings",
        }
    }
}

/// A single declared parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    pub allowed: &'static [&'static str],
}

impl ParamSpec {
    fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: None,
            allowed: &[],
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Boolean, description)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Number, description)
    }

    pub fn string_array(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::StringArray, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value filled in when the caller omits the parameter.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restrict a string parameter to a fixed set of values.
    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.kind.json_type()));
        schema.insert("description".into(), json!(self.description));
        if self.kind == ParamKind::StringArray {
            schema.insert("items".into(), json!({ "type": "string" }));
        }
        if !self.allowed.is_empty() {
            schema.insert("enum".into(), json!(self.allowed));
        }
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.clone());
        }
        Value::Object(schema)
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        if !self.kind.accepts(value) {
            return Err(format!(
                "parameter '{}' must be {}",
                self.name,
                self.kind.expected()
            ));
        }
        let rejected = value
            .as_str()
            .filter(|s| !self.allowed.is_empty() && !self.allowed.contains(s));
        if let Some(s) = rejected {
            return Err(format!(
                "parameter '{}' must be one of [{}], got '{}'",
                self.name,
                self.allowed.join(", "),
                s
            ));
        }
        Ok(())
    }
}

/// Name, description and parameters of one tool.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolSchema {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// JSON Schema object describing the tool's arguments.
    pub fn input_schema(&self) -> JsonObject {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.to_json_schema()))
            .collect();

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema
    }

    /// rmcp tool model advertised in `tools/list`.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.into(),
            title: None,
            description: Some(self.description.into()),
            input_schema: Arc::new(self.input_schema()),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        }
    }

    /// Check `arguments` against the declared parameters.
    ///
    /// `null` values count as absent. Declared defaults are filled in for
    /// absent optional parameters. Fields that are not declared are passed
    /// through untouched and ignored by the typed decode.
    pub fn validate(&self, arguments: Option<JsonObject>) -> Result<JsonObject, String> {
        let mut args: JsonObject = arguments
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .collect();

        for param in &self.params {
            match args.get(param.name) {
                Some(value) => param.check(value)?,
                None if param.required => {
                    return Err(format!("missing required parameter '{}'", param.name));
                }
                None => {
                    if let Some(default) = &param.default {
                        args.insert(param.name.to_string(), default.clone());
                    }
                }
            }
        }

        Ok(args)
    }

    /// First parameter name declared more than once, if any.
    pub fn duplicate_param(&self) -> Option<&'static str> {
        self.params.iter().enumerate().find_map(|(i, p)| {
            self.params[..i]
                .iter()
                .any(|earlier| earlier.name == p.name)
                .then_some(p.name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_get() -> ToolSchema {
        ToolSchema::new("device_get", "Get a device")
            .param(ParamSpec::string("device_id", "The device ID").required())
            .param(
                ParamSpec::string("fields", "Field set")
                    .one_of(&["all", "default"])
                    .with_default("default"),
            )
    }

    fn args(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[test]
    fn test_input_schema_shape() {
        let schema = device_get().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["device_id"]));
        assert_eq!(schema["properties"]["fields"]["enum"], json!(["all", "default"]));
        assert_eq!(schema["properties"]["fields"]["default"], "default");
        assert_eq!(schema["properties"]["device_id"]["type"], "string");
    }

    #[test]
    fn test_array_params_declare_items() {
        let schema = ToolSchema::new("t", "d")
            .param(ParamSpec::string_array("tags", "Tags"))
            .input_schema();
        assert_eq!(schema["properties"]["tags"]["type"], "array");
        assert_eq!(schema["properties"]["tags"]["items"]["type"], "string");
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn test_validate_fills_defaults() {
        let validated = device_get()
            .validate(args(json!({ "device_id": "d-1" })))
            .unwrap();
        assert_eq!(validated["fields"], "default");
    }

    #[test]
    fn test_validate_missing_required() {
        let err = device_get().validate(None).unwrap_err();
        assert!(err.contains("device_id"));
    }

    #[test]
    fn test_validate_null_is_absent() {
        let err = device_get()
            .validate(args(json!({ "device_id": null })))
            .unwrap_err();
        assert!(err.contains("missing required parameter"));
    }

    #[test]
    fn test_validate_rejects_wrong_type_and_enum() {
        let err = device_get()
            .validate(args(json!({ "device_id": 7 })))
            .unwrap_err();
        assert!(err.contains("must be a string"));

        let err = device_get()
            .validate(args(json!({ "device_id": "d-1", "fields": "some" })))
            .unwrap_err();
        assert!(err.contains("one of [all, default]"));
    }

    #[test]
    fn test_validate_keeps_unknown_fields() {
        let validated = device_get()
            .validate(args(json!({ "device_id": "d-1", "extra": true })))
            .unwrap();
        assert_eq!(validated["extra"], true);
    }

    #[test]
    fn test_string_array_items_checked() {
        let schema = ToolSchema::new("t", "d").param(ParamSpec::string_array("tags", "Tags"));
        assert!(schema.validate(args(json!({ "tags": ["a", "b"] }))).is_ok());
        assert!(schema.validate(args(json!({ "tags": ["a", 1] }))).is_err());
    }

    #[test]
    fn test_duplicate_param_detected() {
        let schema = ToolSchema::new("t", "d")
            .param(ParamSpec::string("id", "first"))
            .param(ParamSpec::string("other", "x"))
            .param(ParamSpec::string("id", "second"));
        assert_eq!(schema.duplicate_param(), Some("id"));
        assert_eq!(device_get().duplicate_param(), None);
    }
}
