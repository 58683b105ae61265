//! Context threaded through the steps of a workflow run.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::{FlowError, Result};

/// Field mapping handed from one step to the next.
///
/// A step never edits the context it was given in place: it consumes it and
/// returns a new one. Values are stored as JSON so any serializable type can
/// cross a step boundary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    fields: Map<String, Value>,
}

impl Context {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(FlowError::context(format!(
                "context must be a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Serialize any value into a context.
    pub fn from_serializable(value: impl Serialize) -> Result<Self> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Return a copy of this context with one more field.
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Result<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Set a field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        self.fields.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a field and deserialize it.
    pub fn get_json<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.fields
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(FlowError::from)
    }

    /// Get a field that `step` cannot run without.
    pub fn require<T>(&self, step: &str, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_json(key)?
            .ok_or_else(|| FlowError::missing_field(step, key))
    }

    /// Get the raw JSON value of a field.
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Check whether a field exists.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate over field names.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the context has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Deserialize the whole context into a typed value.
    pub fn decode<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.to_json()).map_err(FlowError::from)
    }

    /// JSON object view of the context.
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Consume the context into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builder for creating contexts with initial data.
#[derive(Default)]
pub struct ContextBuilder {
    context: Context,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Serialize) -> Result<Self> {
        self.context.set(key, value)?;
        Ok(self)
    }

    /// Build the context.
    pub fn build(self) -> Context {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        value: i32,
        name: String,
    }

    #[test]
    fn test_fields_round_trip_through_json() {
        let mut context = Context::new();
        context
            .set(
                "payload",
                Payload {
                    value: 123,
                    name: "test".to_string(),
                },
            )
            .unwrap();
        context.set("number", 456).unwrap();

        let payload: Payload = context.get_json("payload").unwrap().unwrap();
        assert_eq!(payload.value, 123);
        assert_eq!(context.get_json::<i32>("number").unwrap(), Some(456));
        assert!(context.contains("number"));
        assert!(!context.contains("missing"));
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Context::from_value(json!({"input": "x"})).is_ok());

        let err = Context::from_value(json!(["x"])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_require_reports_step_and_field() {
        let context = Context::new().with("data", "x").unwrap();

        let data: String = context.require("process", "data").unwrap();
        assert_eq!(data, "x");

        let err = context.require::<String>("finalize", "result").unwrap_err();
        match err {
            FlowError::MissingField { step, field } => {
                assert_eq!(step, "finalize");
                assert_eq!(field, "result");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let original = Context::new().with("input", "some data").unwrap();
        let extended = original.clone().with("extra", true).unwrap();

        assert_eq!(original.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_ne!(original, extended);
    }

    #[test]
    fn test_context_builder_and_decode() {
        let context = ContextBuilder::new()
            .field("value", 7)
            .unwrap()
            .field("name", "seven")
            .unwrap()
            .build();

        let payload: Payload = context.decode().unwrap();
        assert_eq!(
            payload,
            Payload {
                value: 7,
                name: "seven".to_string()
            }
        );
        assert_eq!(context.into_value(), json!({"value": 7, "name": "seven"}));
    }
}
