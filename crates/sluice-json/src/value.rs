/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The value tree a JSON decode produces

use std::collections::HashMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A decoded JSON value
#[derive(Clone, Debug, Default, PartialEq)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    /// Integers that fit in 64 bits, larger ones become [`JsonValue::Float`]
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<JsonValue>),
    Map(JsonMap)
}

impl JsonValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(value) => Some(*value),
            _ => None
        }
    }

    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            JsonValue::Int(value) => Some(*value),
            _ => None
        }
    }

    /// The value as a float, integers are converted
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Int(value) => Some(*value as f64),
            JsonValue::Float(value) => Some(*value),
            _ => None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(value) => Some(value),
            _ => None
        }
    }

    pub fn as_list(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::List(values) => Some(values),
            _ => None
        }
    }

    pub const fn as_map(&self) -> Option<&JsonMap> {
        match self {
            JsonValue::Map(map) => Some(map),
            _ => None
        }
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(value) => JsonValue::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => JsonValue::Int(value),
                None => JsonValue::Float(number.as_f64().unwrap_or(f64::NAN))
            },
            serde_json::Value::String(value) => JsonValue::String(value),
            serde_json::Value::Array(values) => {
                JsonValue::List(values.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(object) => {
                let mut map = JsonMap::new();
                for (key, value) in object {
                    map.try_insert(key, JsonValue::from(value));
                }
                JsonValue::Map(map)
            }
        }
    }
}

/// A map with unique keys, iterated in insertion order.
///
/// Equality ignores order, two maps are equal when they hold
/// the same keys mapped to equal values.
#[derive(Clone, Debug, Default)]
pub struct JsonMap {
    entries: Vec<(String, JsonValue)>,
    index:   HashMap<String, usize>
}

impl JsonMap {
    pub fn new() -> JsonMap {
        JsonMap::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.index.get(key).map(|position| &self.entries[*position].1)
    }

    /// Insert a new key, returns false and leaves the map untouched
    /// if the key is already present
    pub fn try_insert(&mut self, key: String, value: JsonValue) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl PartialEq for JsonMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Serialize for JsonValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(value) => serializer.serialize_bool(*value),
            JsonValue::Int(value) => serializer.serialize_i64(*value),
            JsonValue::Float(value) => serializer.serialize_f64(*value),
            JsonValue::String(value) => serializer.serialize_str(value),
            JsonValue::List(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            JsonValue::Map(map) => map.serialize(serializer)
        }
    }
}

impl Serialize for JsonMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            state.serialize_entry(key, value)?;
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_keep_insertion_order_and_reject_duplicates() {
        let mut map = JsonMap::new();
        assert!(map.try_insert("b".to_string(), JsonValue::Int(1)));
        assert!(map.try_insert("a".to_string(), JsonValue::Null));
        assert!(!map.try_insert("b".to_string(), JsonValue::Int(2)));

        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(map.get("b"), Some(&JsonValue::Int(1)));

        let mut reordered = JsonMap::new();
        reordered.try_insert("a".to_string(), JsonValue::Null);
        reordered.try_insert("b".to_string(), JsonValue::Int(1));
        assert_eq!(map, reordered);
    }

    #[test]
    fn serializes_back_to_json() {
        let value = JsonValue::from(serde_json::json!({"z": [1, 2.5, null], "a": "x"}));
        let text = serde_json::to_string(&value).unwrap();
        let round: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(round, serde_json::json!({"z": [1, 2.5, null], "a": "x"}));
        assert_eq!(value.as_map().unwrap().get("z").unwrap().as_list().unwrap().len(), 3);
    }
}
