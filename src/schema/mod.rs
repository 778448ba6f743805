//! Response schemas
//!
//! Every payload is checked against a JSON Schema before it is decoded into
//! its typed model. The schemas are partial and loose: no property is
//! `required` and none of them forbids additional properties, so a field
//! may be missing and fields nobody declared pass through untouched.
//! Literal tags, closed enumerations, unions and timestamps are only
//! checked on values that are actually present.

mod registry;

pub use registry::*;

use std::sync::LazyLock;

use jsonschema::Validator;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result, ShapeMismatch};

/// Name of the custom `format` used for ISO-8601 date-times
///
/// The built-in `date-time` format is RFC 3339 only; upstream also sends a
/// space separator and `-0500` style offsets.
pub const ISO_TIMESTAMP_FORMAT: &str = "iso-timestamp";

static ISO_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}-(?:0[1-9]|1[0-2])-(?:[12]\d|0[1-9]|3[01])[T ](?:0\d|1\d|2[0-3])(?::[0-5]\d){2}(?:[.,]\d+)?(?:[Zz]|[+-](?:0\d|1\d|2[0-3])(?::?[0-5]\d)?)$",
    )
    .expect("ISO-8601 pattern compiles")
});

pub fn is_iso_timestamp(value: &str) -> bool {
    ISO_TIMESTAMP.is_match(value)
}

/// A named JSON Schema compiled once
pub struct ResponseSchema {
    name: &'static str,
    document: Value,
    validator: std::result::Result<Validator, String>,
}

impl std::fmt::Debug for ResponseSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSchema")
            .field("name", &self.name)
            .field("compiled", &self.validator.is_ok())
            .finish()
    }
}

impl ResponseSchema {
    /// Compile `document`; a compile failure is reported on every check
    pub fn compile(name: &'static str, document: Value) -> Self {
        let validator = jsonschema::options()
            .with_format(ISO_TIMESTAMP_FORMAT, is_iso_timestamp)
            .should_validate_formats(true)
            .build(&document)
            .map_err(|err| err.to_string());

        if let Err(err) = &validator {
            tracing::error!("Schema {} failed to compile: {}", name, err);
        }

        Self {
            name,
            document,
            validator,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The schema as JSON
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Check `value`, reporting the first violation
    pub fn check(&self, value: &Value) -> Result<()> {
        let validator = self
            .validator
            .as_ref()
            .map_err(|err| Error::Schema(format!("{}: {}", self.name, err)))?;

        let mut errors = validator.iter_errors(value);
        if let Some(first) = errors.next() {
            let pointer = first.instance_path().to_string();
            let (path, found) = locate(value, &pointer);
            return Err(ShapeMismatch {
                path,
                constraint: first.to_string(),
                actual: found.map_or_else(|| "nothing".to_string(), describe_value),
            }
            .into());
        }

        Ok(())
    }

    /// Check `value` and hand it back unchanged
    pub fn validate(&self, value: Value) -> Result<Value> {
        self.check(&value)?;
        Ok(value)
    }
}

/// Turn a JSON pointer into a `$.a[0]["b-c"]` path and find what it points at
fn locate<'a>(root: &'a Value, pointer: &str) -> (String, Option<&'a Value>) {
    let mut path = String::from("$");
    let mut current = Some(root);

    for token in pointer.split('/').skip(1) {
        let key = token.replace("~1", "/").replace("~0", "~");
        current = match current {
            Some(Value::Array(items)) => {
                path.push_str(&format!("[{key}]"));
                key.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            Some(Value::Object(map)) => {
                path = child_path(&path, &key);
                map.get(&key)
            }
            _ => {
                path = child_path(&path, &key);
                None
            }
        };
    }

    (path, current)
}

fn child_path(parent: &str, key: &str) -> String {
    let is_identifier = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if is_identifier {
        format!("{parent}.{key}")
    } else {
        format!("{parent}[{key:?}]")
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) if s.chars().count() > 64 => {
            let head: String = s.chars().take(64).collect();
            format!("string {head:?}...")
        }
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

/// A typed payload backed by a registered schema
pub trait Validated: DeserializeOwned {
    fn schema() -> &'static ResponseSchema;
}

/// Check a decoded document against `T`'s schema, then build `T` from it
pub fn validate<T: Validated>(value: Value) -> Result<T> {
    let schema = T::schema();
    if let Err(err) = schema.check(&value) {
        tracing::warn!("{} response rejected: {}", schema.name(), err);
        return Err(err);
    }

    serde_json::from_value(value).map_err(|e| {
        ShapeMismatch {
            path: "$".to_string(),
            constraint: format!("decodes as {}", std::any::type_name::<T>()),
            actual: e.to_string(),
        }
        .into()
    })
}
