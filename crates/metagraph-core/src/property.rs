//! Property values stored on graph nodes and edges.
//!
//! Records are coerced to primitive values (strings, numbers, booleans and
//! lists of those) before they are bound as statement parameters. Records
//! that implement `Serialize` get this for free through [`properties_of`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::urn::Urn;

/// Property map keyed by field name. Ordered so generated statements are deterministic.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single graph property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
    /// Not storable as a property by Neo4j; passed through so the store decides.
    Map(PropertyMap),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerce a JSON value. `null` yields `None`: binding a null under
    /// `SET n += $properties` would erase the existing property.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Boolean(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Integer(i)),
                None => n.as_f64().map(Self::Float),
            },
            Value::String(s) => Some(Self::String(s)),
            Value::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(fields) => Some(Self::Map(map_from_json(fields))),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&Urn> for PropertyValue {
    fn from(urn: &Urn) -> Self {
        Self::String(urn.to_string())
    }
}

impl From<Urn> for PropertyValue {
    fn from(urn: Urn) -> Self {
        Self::String(urn.into())
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(map: PropertyMap) -> Self {
        Self::Map(map)
    }
}

/// Convert a JSON object into a property map, dropping null fields.
pub fn map_from_json(fields: serde_json::Map<String, Value>) -> PropertyMap {
    fields
        .into_iter()
        .filter_map(|(k, v)| PropertyValue::from_json(v).map(|v| (k, v)))
        .collect()
}

/// Deserialize a property map from a JSON object, dropping null fields.
///
/// For `#[serde(deserialize_with)]` on record types read from JSON.
pub fn deserialize_property_map<'de, D>(deserializer: D) -> std::result::Result<PropertyMap, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let fields = serde_json::Map::<String, Value>::deserialize(deserializer)?;
    Ok(map_from_json(fields))
}

/// Coerce any serializable record into a property map.
///
/// The record must serialize to a JSON object. `Option::None` fields vanish.
pub fn properties_of<T: Serialize + ?Sized>(record: &T) -> Result<PropertyMap> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(map_from_json(fields)),
        other => Err(CoreError::Coercion(format!(
            "record must serialize to a map, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
