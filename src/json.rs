//! # Ordered JSON
//!
//! Headers are signed as the exact JSON text the issuer produced, so the
//! in-memory form must keep member order and must never silently merge
//! duplicate members. [`Object`] is an insertion-ordered association list whose
//! `insert` fails if the key already exists; deserializing text with a repeated
//! key at any nesting level is an error.
//!
//! Text handling (escaping, number lexing) is delegated to `serde_json`.

use std::fmt;

use serde::de::{self, DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// A JSON value whose objects preserve member order.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// JSON `null`.
    Null,

    /// JSON boolean.
    Bool(bool),

    /// JSON number.
    Number(serde_json::Number),

    /// JSON string.
    String(String),

    /// JSON array.
    Array(Vec<Self>),

    /// JSON object.
    Object(Object),
}

impl Value {
    /// The string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The object value, if this is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

/// An insertion-ordered JSON object with unique keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object(Vec<(String, Value)>);

impl Object {
    /// Create an empty object.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a member.
    ///
    /// # Errors
    ///
    /// Returns a format error if a member with the same key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(Error::Format(format!("duplicate key '{key}'")));
        }
        self.0.push((key, value.into()));
        Ok(())
    }

    /// Builder-style [`Object::insert`].
    ///
    /// # Errors
    ///
    /// Returns a format error if a member with the same key already exists.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// The value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The string value for `key`.
    ///
    /// Returns `Ok(None)` when the member is absent.
    ///
    /// # Errors
    ///
    /// Returns a format error if the member exists but is not a string.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
        self.get(key).map_or(Ok(None), |v| {
            v.as_str()
                .map(Some)
                .ok_or_else(|| Error::Format(format!("unexpected type of member '{key}'")))
        })
    }

    /// The object value for `key`.
    ///
    /// Returns `Ok(None)` when the member is absent.
    ///
    /// # Errors
    ///
    /// Returns a format error if the member exists but is not an object.
    pub fn get_object(&self, key: &str) -> Result<Option<&Self>> {
        self.get(key).map_or(Ok(None), |v| {
            v.as_object()
                .map(Some)
                .ok_or_else(|| Error::Format(format!("value at '{key}' is not a JSON object")))
        })
    }

    /// Whether a member with `key` exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Member keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Members, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the object has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse JSON text into an object.
    ///
    /// # Errors
    ///
    /// Returns a format error if the text is not a JSON object or repeats a key
    /// within any object.
    pub fn from_json(text: &[u8]) -> Result<Self> {
        serde_json::from_slice(text).map_err(|e| Error::Format(format!("issue parsing JSON: {e}")))
    }

    /// Compact JSON text for the object, members in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a format error if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Format(format!("issue serializing JSON: {e}")))
    }

    /// Convert any serializable struct or map into an object, keeping the field
    /// order the type serializes in.
    ///
    /// # Errors
    ///
    /// Returns a format error if `value` does not serialize to a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        let text = serde_json::to_vec(value)
            .map_err(|e| Error::Format(format!("issue serializing value: {e}")))?;
        Self::from_json(&text)
    }

    /// Deserialize the object into a typed value.
    ///
    /// # Errors
    ///
    /// Returns a format error if the object does not match `T`.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        let text = self.to_json()?;
        serde_json::from_slice(&text)
            .map_err(|e| Error::Format(format!("issue deserializing object: {e}")))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(object) => object.serialize(serializer),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Object {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(object) => Ok(object),
            _ => Err(de::Error::custom("expected a JSON object at the root")),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| E::custom("non-finite number"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut object = Object::new();
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value::<Value>()?;
            object.insert(key, value).map_err(<A::Error as de::Error>::custom)?;
        }
        Ok(Value::Object(object))
    }
}
