//! Argument coercion for tool handlers.
//!
//! Handlers receive the raw JSON argument object. These helpers pull typed
//! values out of it. `null` counts as absent, unknown keys are ignored and
//! an empty string is a value like any other.

use crate::protocol::{InputSchema, PropertySpec};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Raw tool arguments.
pub type Arguments = Map<String, Value>;

/// A failed coercion of one argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("missing required parameter: {key}")]
    MissingParameter { key: String },

    #[error("invalid type for parameter {key}: expected {expected}")]
    InvalidParameterType { key: String, expected: &'static str },

    #[error("invalid value for parameter {key}: {reason}")]
    InvalidParameterValue { key: String, reason: String },
}

impl ArgumentError {
    fn missing(key: &str) -> Self {
        Self::MissingParameter {
            key: key.to_string(),
        }
    }

    fn wrong_type(key: &str, expected: &'static str) -> Self {
        Self::InvalidParameterType {
            key: key.to_string(),
            expected,
        }
    }

    fn bad_value(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameterValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// The parameter the error is about.
    pub fn key(&self) -> &str {
        match self {
            Self::MissingParameter { key }
            | Self::InvalidParameterType { key, .. }
            | Self::InvalidParameterValue { key, .. } => key,
        }
    }
}

/// Every error found by [`parse_struct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentErrors(pub Vec<ArgumentError>);

impl std::error::Error for ArgumentErrors {}

impl fmt::Display for ArgumentErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

fn present<'a>(args: &'a Arguments, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|v| !v.is_null())
}

/// Coerce a JSON value to a non-negative integer identifier.
///
/// Accepts integers, floats without a fractional part and strings holding
/// an integer.
fn coerce_id(key: &str, value: &Value) -> Result<i64, ArgumentError> {
    let id = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if n.is_u64() {
                return Err(ArgumentError::bad_value(key, "out of range"));
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if !f.is_finite() || f.fract() != 0.0 {
                    return Err(ArgumentError::bad_value(key, "must be a whole number"));
                }
                if f.abs() >= i64::MAX as f64 {
                    return Err(ArgumentError::bad_value(key, "out of range"));
                }
                f as i64
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ArgumentError::wrong_type(key, "number"))?,
        _ => return Err(ArgumentError::wrong_type(key, "number")),
    };

    if id < 0 {
        return Err(ArgumentError::bad_value(key, "must not be negative"));
    }
    Ok(id)
}

fn coerce_string(key: &str, value: &Value) -> Result<String, ArgumentError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(ArgumentError::wrong_type(key, "string")),
    }
}

fn coerce_bool(key: &str, value: &Value) -> Result<bool, ArgumentError> {
    match value {
        Value::Bool(b) => Ok(*b),
        _ => Err(ArgumentError::wrong_type(key, "boolean")),
    }
}

fn coerce_string_array(key: &str, value: &Value) -> Result<Vec<String>, ArgumentError> {
    let Value::Array(items) = value else {
        return Err(ArgumentError::wrong_type(key, "array"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err(ArgumentError::wrong_type(&format!("{key}[{i}]"), "string")),
        })
        .collect()
}

/// A required numeric identifier.
pub fn require_id(args: &Arguments, key: &str) -> Result<i64, ArgumentError> {
    let value = present(args, key).ok_or_else(|| ArgumentError::missing(key))?;
    coerce_id(key, value)
}

/// An optional numeric identifier.
pub fn optional_id(args: &Arguments, key: &str) -> Result<Option<i64>, ArgumentError> {
    present(args, key).map(|v| coerce_id(key, v)).transpose()
}

/// A required string.
pub fn require_string(args: &Arguments, key: &str) -> Result<String, ArgumentError> {
    let value = present(args, key).ok_or_else(|| ArgumentError::missing(key))?;
    coerce_string(key, value)
}

/// A required string identifier that ends up in a request path, such as an
/// image ID (`private/42`) or an IP address.
pub fn require_identifier(args: &Arguments, key: &str) -> Result<String, ArgumentError> {
    let value = require_string(args, key)?;
    check_identifier(key, &value)?;
    Ok(value)
}

/// Reject identifiers that would escape their place in a request path.
pub fn check_identifier(key: &str, value: &str) -> Result<(), ArgumentError> {
    cloudmcp_linode::check_path_identifier(value)
        .map_err(|reason| ArgumentError::bad_value(key, reason))
}

/// An optional string.
pub fn optional_string(args: &Arguments, key: &str) -> Result<Option<String>, ArgumentError> {
    present(args, key).map(|v| coerce_string(key, v)).transpose()
}

/// An optional boolean filter.
pub fn optional_bool(args: &Arguments, key: &str) -> Result<Option<bool>, ArgumentError> {
    present(args, key).map(|v| coerce_bool(key, v)).transpose()
}

/// An optional array of strings; absent yields an empty vector.
pub fn optional_string_array(args: &Arguments, key: &str) -> Result<Vec<String>, ArgumentError> {
    match present(args, key) {
        Some(value) => coerce_string_array(key, value),
        None => Ok(Vec::new()),
    }
}

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    String(String),
    Number(i64),
    Boolean(bool),
    Strings(Vec<String>),
}

/// Arguments coerced against an [`InputSchema`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(FieldValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(FieldValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// String array, empty when absent.
    pub fn strings(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(FieldValue::Strings(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    /// String array, `None` when the caller did not send it.
    pub fn strings_if_present(&self, key: &str) -> Option<Vec<String>> {
        match self.0.get(key) {
            Some(FieldValue::Strings(v)) => Some(v.clone()),
            _ => None,
        }
    }

    /// A required string that `parse_struct` already checked.
    pub fn required_string(&self, key: &str) -> String {
        self.string(key).unwrap_or_default().to_string()
    }

    /// A required number that `parse_struct` already checked.
    pub fn required_number(&self, key: &str) -> i64 {
        self.number(key).unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Coerce every property declared by `schema`, collecting all failures.
///
/// Either every declared property coerces or the whole call fails with the
/// complete list of errors in property order.
pub fn parse_struct(args: &Arguments, schema: &InputSchema) -> Result<Fields, ArgumentErrors> {
    let mut fields = BTreeMap::new();
    let mut errors = Vec::new();

    for (key, spec) in &schema.properties {
        let Some(value) = present(args, key) else {
            if schema.is_required(key) {
                errors.push(ArgumentError::missing(key));
            }
            continue;
        };

        let coerced = match spec {
            PropertySpec::String { .. } => coerce_string(key, value).map(FieldValue::String),
            PropertySpec::Number { .. } => coerce_id(key, value).map(FieldValue::Number),
            PropertySpec::Boolean { .. } => coerce_bool(key, value).map(FieldValue::Boolean),
            PropertySpec::Array { .. } => {
                coerce_string_array(key, value).map(FieldValue::Strings)
            }
        };

        match coerced {
            Ok(v) => {
                fields.insert(key.clone(), v);
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(Fields(fields))
    } else {
        Err(ArgumentErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[test]
    fn test_require_id_whole_numbers() {
        assert_eq!(require_id(&args(json!({"id": 123456})), "id"), Ok(123456));
        assert_eq!(require_id(&args(json!({"id": 0})), "id"), Ok(0));
        assert_eq!(require_id(&args(json!({"id": 42.0})), "id"), Ok(42));
        assert_eq!(require_id(&args(json!({"id": "77"})), "id"), Ok(77));
    }

    #[test]
    fn test_require_id_missing() {
        assert_eq!(
            require_id(&args(json!({})), "instance_id"),
            Err(ArgumentError::MissingParameter {
                key: "instance_id".to_string()
            })
        );
        assert_eq!(
            require_id(&args(json!({"instance_id": null})), "instance_id"),
            Err(ArgumentError::MissingParameter {
                key: "instance_id".to_string()
            })
        );
    }

    #[test]
    fn test_require_id_wrong_type() {
        for value in [json!("abc"), json!(true), json!([1]), json!({"a": 1})] {
            let err = require_id(&args(json!({"id": value})), "id").unwrap_err();
            assert_eq!(
                err,
                ArgumentError::InvalidParameterType {
                    key: "id".to_string(),
                    expected: "number"
                }
            );
        }
    }

    #[test]
    fn test_require_id_bad_values() {
        for value in [json!(-1), json!(1.5), json!(u64::MAX), json!("-3")] {
            let err = require_id(&args(json!({"id": value})), "id").unwrap_err();
            assert!(
                matches!(err, ArgumentError::InvalidParameterValue { .. }),
                "unexpected {err:?}"
            );
        }
    }

    #[test]
    fn test_strings() {
        let a = args(json!({"label": "", "region": 5}));
        assert_eq!(require_string(&a, "label"), Ok(String::new()));
        assert!(matches!(
            require_string(&a, "region"),
            Err(ArgumentError::InvalidParameterType { .. })
        ));
        assert_eq!(optional_string(&a, "missing"), Ok(None));
    }

    #[test]
    fn test_require_identifier() {
        let a = args(json!({
            "image_id": "private/42",
            "address": "192.0.2.10",
            "escape": "../linode/instances/123",
            "query": "private/42?x=1",
            "empty": ""
        }));
        assert_eq!(require_identifier(&a, "image_id"), Ok("private/42".to_string()));
        assert_eq!(require_identifier(&a, "address"), Ok("192.0.2.10".to_string()));

        for key in ["escape", "query", "empty"] {
            let err = require_identifier(&a, key).unwrap_err();
            assert!(
                matches!(&err, ArgumentError::InvalidParameterValue { key: k, .. } if k == key),
                "{key} gave {err:?}"
            );
        }
        assert!(matches!(
            require_identifier(&a, "absent"),
            Err(ArgumentError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_optional_bool() {
        let a = args(json!({"public": true, "nothing": null, "bad": "yes"}));
        assert_eq!(optional_bool(&a, "public"), Ok(Some(true)));
        assert_eq!(optional_bool(&a, "nothing"), Ok(None));
        assert_eq!(optional_bool(&a, "absent"), Ok(None));
        assert!(optional_bool(&a, "bad").is_err());
    }

    #[test]
    fn test_optional_string_array() {
        let a = args(json!({"tags": ["a", "b"], "mixed": ["a", 1], "scalar": "a"}));
        assert_eq!(
            optional_string_array(&a, "tags"),
            Ok(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(optional_string_array(&a, "absent"), Ok(vec![]));
        assert_eq!(
            optional_string_array(&a, "mixed"),
            Err(ArgumentError::InvalidParameterType {
                key: "mixed[1]".to_string(),
                expected: "string"
            })
        );
        assert!(optional_string_array(&a, "scalar").is_err());
    }

    #[test]
    fn test_parse_struct_collects_all_errors() {
        let schema = InputSchema::object()
            .required("region", PropertySpec::string("Region"))
            .required("type", PropertySpec::string("Type"))
            .optional("size", PropertySpec::number("Size"))
            .optional("tags", PropertySpec::string_array("Tags"));

        let err = parse_struct(&args(json!({"size": "big", "extra": 1})), &schema).unwrap_err();
        let keys: Vec<&str> = err.0.iter().map(ArgumentError::key).collect();
        assert_eq!(keys, vec!["region", "size", "type"]);
        assert!(err.to_string().contains("missing required parameter: region"));
    }

    #[test]
    fn test_parse_struct_success() {
        let schema = InputSchema::object()
            .required("region", PropertySpec::string("Region"))
            .optional("size", PropertySpec::number("Size"))
            .optional("booted", PropertySpec::boolean("Booted"))
            .optional("tags", PropertySpec::string_array("Tags"));

        let fields = parse_struct(
            &args(json!({"region": "us-east", "size": 20, "booted": false, "unknown": "x"})),
            &schema,
        )
        .unwrap();

        assert_eq!(fields.string("region"), Some("us-east"));
        assert_eq!(fields.number("size"), Some(20));
        assert_eq!(fields.boolean("booted"), Some(false));
        assert!(fields.strings("tags").is_empty());
        assert!(fields.strings_if_present("tags").is_none());
        assert!(!fields.contains("unknown"));
        assert_eq!(fields.len(), 3);
    }
}
