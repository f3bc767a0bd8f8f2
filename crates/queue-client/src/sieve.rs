//! Query filters
//!
//! A sieve is passed to the queue's query engine as-is. Keys are field
//! names; values are either equality values or operator maps such as
//! `{"$gt": 1, "$lt": 5}`. The client does not interpret the structure
//! beyond the `active` default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

const ACTIVE_KEY: &str = "active";

/// Opaque filter document for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sieve(Map<String, Value>);

impl Sieve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON value. Anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(Error::Validation(format!(
                "sieve must be a JSON object, got {other}"
            ))),
        }
    }

    /// Add or replace a field condition.
    pub fn with(mut self, field: impl Into<String>, condition: impl Into<Value>) -> Self {
        self.0.insert(field.into(), condition.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, condition: impl Into<Value>) {
        self.0.insert(field.into(), condition.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set `active` to `active_default` unless the caller already chose.
    pub fn with_active_default(mut self, active_default: bool) -> Self {
        self.0
            .entry(ACTIVE_KEY)
            .or_insert(Value::Bool(active_default));
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// JSON text for the `q` query parameter.
    pub fn to_query_string(&self) -> Result<String> {
        serde_json::to_string(&self.0).map_err(|e| Error::Decode(format!("encoding sieve: {e}")))
    }
}

impl From<Map<String, Value>> for Sieve {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn active_default_injected_when_absent() {
        for sieve in [
            Sieve::new(),
            Sieve::new().with("author", "x"),
            Sieve::new().with("priority", json!({"$gt": 2})),
        ] {
            let before = sieve.as_map().len();
            let sieve = sieve.with_active_default(true);
            assert_eq!(sieve.get("active"), Some(&json!(true)));
            assert_eq!(sieve.as_map().len(), before + 1);
        }

        let sieve = Sieve::new().with_active_default(false);
        assert_eq!(sieve.get("active"), Some(&json!(false)));
    }

    #[test]
    fn explicit_active_is_left_untouched() {
        for value in [json!(false), json!(true), json!({"$in": [true, false]})] {
            let sieve = Sieve::new()
                .with("active", value.clone())
                .with_active_default(true);
            assert_eq!(sieve.get("active"), Some(&value));
        }
    }

    #[test]
    fn from_value_accepts_objects_only() {
        let sieve = Sieve::from_value(json!({"namespace": "split"})).unwrap();
        assert_eq!(sieve.get("namespace"), Some(&json!("split")));
        assert!(Sieve::from_value(Value::Null).unwrap().is_empty());

        let err = Sieve::from_value(json!(["not", "a", "map"])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got: {err:?}");
    }

    #[test]
    fn operator_maps_pass_through_verbatim() {
        let sieve = Sieve::new().with("created", json!({"$gt": 1, "$lt": 5}));
        let encoded: Value = serde_json::from_str(&sieve.to_query_string().unwrap()).unwrap();
        assert_eq!(encoded, json!({"created": {"$gt": 1, "$lt": 5}}));
    }
}
