//! DynamoDB attribute conversion functions.
//!
//! Pure functions converting between `AttributeValue` maps and schemaless
//! JSON documents. Numbers travel as DynamoDB's decimal strings and round
//! back through `i64`/`u64` before falling back to `f64`, so integer
//! counters (e.g. a prize's `currentWinners`) round-trip exactly.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Number, Value};
use showcase_core::storage::{Document, StorageError};

type Item = HashMap<String, AttributeValue>;

/// Convert a document to a DynamoDB item.
pub(crate) fn document_to_item(doc: &Document) -> Result<Item, StorageError> {
    doc.iter()
        .map(|(key, value)| Ok((key.clone(), value_to_attr(value)?)))
        .collect()
}

/// Convert a DynamoDB item to a document.
pub(crate) fn item_to_document(item: &Item) -> Result<Document, StorageError> {
    item.iter()
        .map(|(key, attr)| Ok((key.clone(), attr_to_value(attr)?)))
        .collect()
}

fn value_to_attr(value: &Value) -> Result<AttributeValue, StorageError> {
    match value {
        Value::Null => Ok(AttributeValue::Null(true)),
        Value::Bool(b) => Ok(AttributeValue::Bool(*b)),
        Value::Number(n) => Ok(AttributeValue::N(n.to_string())),
        Value::String(s) => Ok(AttributeValue::S(s.clone())),
        Value::Array(values) => Ok(AttributeValue::L(
            values.iter().map(value_to_attr).collect::<Result<_, _>>()?,
        )),
        Value::Object(map) => Ok(AttributeValue::M(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), value_to_attr(v)?)))
                .collect::<Result<_, StorageError>>()?,
        )),
    }
}

fn attr_to_value(attr: &AttributeValue) -> Result<Value, StorageError> {
    match attr {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::L(values) => Ok(Value::Array(
            values.iter().map(attr_to_value).collect::<Result<_, _>>()?,
        )),
        AttributeValue::M(map) => Ok(Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), attr_to_value(v)?)))
                .collect::<Result<_, StorageError>>()?,
        )),
        // Set types can appear in data written by bulk-load tooling;
        // read them back as plain arrays.
        AttributeValue::Ss(values) => Ok(Value::Array(
            values.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(values) => Ok(Value::Array(
            values
                .iter()
                .map(|n| parse_number(n))
                .collect::<Result<_, _>>()?,
        )),
        other => Err(StorageError::Serialization(format!(
            "unsupported attribute type: {other:?}"
        ))),
    }
}

fn parse_number(n: &str) -> Result<Value, StorageError> {
    if let Ok(i) = n.parse::<i64>() {
        return Ok(Value::Number(Number::from(i)));
    }
    if let Ok(u) = n.parse::<u64>() {
        return Ok(Value::Number(Number::from(u)));
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| StorageError::Serialization(format!("invalid number attribute: {n}")))
}
