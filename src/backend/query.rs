//! Document query builder.
//!
//! Queries are sent as repeated `queries[]` parameters, each one a JSON
//! object naming the method, the attribute and the values.

use chrono::{DateTime, SecondsFormat, Utc};
use log::*;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Query {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    values: Vec<Value>,
}

impl Query {
    fn new(method: &'static str, attribute: Option<&str>, values: Vec<Value>) -> Self {
        Query {
            method,
            attribute: attribute.map(str::to_owned),
            values,
        }
    }

    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Query::new("equal", Some(attribute), vec![value.into()])
    }

    pub fn is_null(attribute: &str) -> Self {
        Query::new("isNull", Some(attribute), vec![])
    }

    pub fn greater_than_equal(attribute: &str, value: impl Into<Value>) -> Self {
        Query::new("greaterThanEqual", Some(attribute), vec![value.into()])
    }

    pub fn less_than(attribute: &str, value: impl Into<Value>) -> Self {
        Query::new("lessThan", Some(attribute), vec![value.into()])
    }

    pub fn order_asc(attribute: &str) -> Self {
        Query::new("orderAsc", Some(attribute), vec![])
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::new("orderDesc", Some(attribute), vec![])
    }

    pub fn limit(limit: usize) -> Self {
        Query::new("limit", None, vec![Value::from(limit)])
    }

    pub fn offset(offset: usize) -> Self {
        Query::new("offset", None, vec![Value::from(offset)])
    }

    /// Convenience for date comparisons; the backend stores ISO 8601 strings.
    ///
    pub fn timestamp(at: DateTime<Utc>) -> Value {
        Value::from(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Encode as the string sent on the wire.
    ///
    pub fn encode(&self) -> String {
        match serde_json::to_string(self) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode query '{}': {}", self.method, e);
                String::new()
            }
        }
    }

    pub fn method(&self) -> &str {
        self.method
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }
}
