//! JSON ⇄ DynamoDB attribute value mapping.
//!
//! | JSON    | attribute |
//! |---------|-----------|
//! | string  | `S`       |
//! | number  | `N`       |
//! | bool    | `BOOL`    |
//! | null    | `NULL`    |
//! | array   | `L`       |
//! | object  | `M`       |
//!
//! String and number sets read back as arrays. Binary attributes are
//! rejected.

use crate::error::{DynamoError, DynamoResult};
use aws_sdk_dynamodb::types::AttributeValue;
use rostersync_types::RecordKey;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// A DynamoDB item.
pub type Item = HashMap<String, AttributeValue>;

/// Partition key attribute name.
pub const ATTR_ID: &str = "ID";
/// Sort key attribute name.
pub const ATTR_USERNAME: &str = "Username";

/// Converts a JSON value to an attribute value.
pub fn json_to_attr(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attr).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), json_to_attr(v)))
                .collect(),
        ),
    }
}

/// Converts an attribute value back to JSON.
pub fn attr_to_json(attr: &AttributeValue) -> DynamoResult<Value> {
    Ok(match attr {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::N(n) => Value::Number(parse_number(n)?),
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::L(items) => Value::Array(
            items
                .iter()
                .map(attr_to_json)
                .collect::<DynamoResult<_>>()?,
        ),
        AttributeValue::M(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| Ok((k.clone(), attr_to_json(v)?)))
                .collect::<DynamoResult<Map<_, _>>>()?,
        ),
        AttributeValue::Ss(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(items) => Value::Array(
            items
                .iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<DynamoResult<_>>()?,
        ),
        AttributeValue::B(_) | AttributeValue::Bs(_) => {
            return Err(DynamoError::Unsupported("binary"));
        }
        _ => return Err(DynamoError::Unsupported("unknown attribute type")),
    })
}

/// Converts a JSON object into an item.
pub fn json_to_item(value: &Value) -> DynamoResult<Item> {
    let fields = value.as_object().ok_or(DynamoError::NotAnObject)?;
    Ok(fields
        .iter()
        .map(|(k, v)| (k.clone(), json_to_attr(v)))
        .collect())
}

/// Converts an item into a JSON object.
pub fn item_to_json(item: &Item) -> DynamoResult<Value> {
    attr_to_json(&AttributeValue::M(item.clone()))
}

/// Builds the key attributes of a record.
pub fn key_to_item(key: &RecordKey) -> Item {
    HashMap::from([
        (ATTR_ID.to_string(), AttributeValue::S(key.id.clone())),
        (
            ATTR_USERNAME.to_string(),
            AttributeValue::S(key.username.clone()),
        ),
    ])
}

/// Reads the record key back out of an item or key map.
pub fn item_to_key(item: &Item) -> DynamoResult<RecordKey> {
    Ok(serde_json::from_value(item_to_json(item)?)?)
}

fn parse_number(raw: &str) -> DynamoResult<Number> {
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(n.into());
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(n.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| DynamoError::Number(raw.to_string()))
}
