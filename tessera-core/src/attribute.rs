//! Typed attribute storage.
//!
//! An [`AttributeMap`] maps attribute types to values. Every write is
//! coerced to the attribute's declared value type, and writing
//! [`AttributeValue::Null`] removes the key.
//!
//! # Wire format
//!
//! A flat JSON object `{"LABEL": value, ...}`. Reading it back resolves the
//! labels through a [`TypeRegistry`] and decodes each value by its declared
//! type, so a map survives the round trip unchanged.

use crate::error::{Error, Result};
use crate::types::{AttributeKey, AttributeType, TypeRegistry};
use crate::value::{self, AttributeKind, AttributeValue, ValueType};
use std::collections::HashMap;

/// Per-annotation attribute store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    values: HashMap<AttributeKey, AttributeValue>,
}

impl AttributeMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`put`](Self::put).
    pub fn with<T: AttributeKind>(
        mut self,
        attr: AttributeType<T>,
        value: impl Into<AttributeValue>,
    ) -> Result<Self> {
        self.put(attr, value)?;
        Ok(self)
    }

    /// Typed read.
    #[must_use]
    pub fn get<T: AttributeKind>(&self, attr: AttributeType<T>) -> Option<T> {
        self.values.get(&attr.key()).and_then(T::from_value)
    }

    /// Typed read with a fallback.
    #[must_use]
    pub fn get_or<T: AttributeKind>(&self, attr: AttributeType<T>, default: T) -> T {
        self.get(attr).unwrap_or(default)
    }

    /// Untyped read.
    #[must_use]
    pub fn get_value(&self, key: impl Into<AttributeKey>) -> Option<&AttributeValue> {
        self.values.get(&key.into())
    }

    /// True if a value is stored for `key`.
    #[must_use]
    pub fn contains(&self, key: impl Into<AttributeKey>) -> bool {
        self.values.contains_key(&key.into())
    }

    /// Write a value, coercing it to `T`. `Null` removes the key.
    ///
    /// Returns the previous value.
    pub fn put<T: AttributeKind>(
        &mut self,
        attr: AttributeType<T>,
        value: impl Into<AttributeValue>,
    ) -> Result<Option<AttributeValue>> {
        self.put_decoded(attr.key(), T::VALUE_TYPE, value.into())
    }

    /// Write a value for an erased key, looking its value type up in `registry`.
    pub fn put_value(
        &mut self,
        registry: &TypeRegistry,
        key: AttributeKey,
        value: impl Into<AttributeValue>,
    ) -> Result<Option<AttributeValue>> {
        let value_type = registry.value_type(key)?;
        self.put_decoded(key, value_type, value.into())
    }

    /// Write a value for an erased key whose value type is already known.
    pub fn put_decoded(
        &mut self,
        key: AttributeKey,
        value_type: ValueType,
        value: AttributeValue,
    ) -> Result<Option<AttributeValue>> {
        let decoded = value::decode(value_type, value)?;
        if decoded.is_null() {
            return Ok(self.values.remove(&key));
        }
        Ok(self.values.insert(key, decoded))
    }

    /// Remove a value, returning it.
    pub fn remove(&mut self, key: impl Into<AttributeKey>) -> Option<AttributeValue> {
        self.values.remove(&key.into())
    }

    /// Copy every entry of `other` into this map, overwriting shared keys.
    ///
    /// Values in another map are already decoded, so no coercion happens.
    pub fn put_all(&mut self, other: &AttributeMap) {
        self.values
            .extend(other.values.iter().map(|(k, v)| (*k, v.clone())));
    }

    /// Number of stored attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(key, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Stored keys.
    pub fn keys(&self) -> impl Iterator<Item = AttributeKey> + '_ {
        self.values.keys().copied()
    }

    /// Serialize to the flat `label → value` wire object.
    #[must_use]
    pub fn to_wire(&self, registry: &TypeRegistry) -> serde_json::Map<String, serde_json::Value> {
        let mut entries: Vec<_> = self.values.iter().collect();
        entries.sort_by_key(|(k, _)| **k);
        entries
            .into_iter()
            .map(|(k, v)| (registry.label(*k), v.to_json()))
            .collect()
    }

    /// Read the flat wire object back.
    ///
    /// Labels unknown to `registry` are registered with a value type inferred
    /// from the JSON value. `null` entries are skipped.
    pub fn from_wire(
        registry: &TypeRegistry,
        wire: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self> {
        let mut map = Self::new();
        for (name, json) in wire {
            if json.is_null() {
                continue;
            }
            let key = match registry.attribute_key_of(name) {
                Ok(key) => key,
                Err(_) => {
                    let inferred = ValueType::infer(json).ok_or_else(|| {
                        Error::invalid_input(format!("cannot infer a value type for {name}"))
                    })?;
                    log::warn!("attribute {name} is not registered; registering it as {inferred}");
                    registry.make_attribute_key(name, inferred)?
                }
            };
            map.put_value(registry, key, AttributeValue::from_json(json)?)?;
        }
        Ok(map)
    }

    /// Serialize to a JSON string in the wire format.
    pub fn to_json_string(&self, registry: &TypeRegistry) -> Result<String> {
        Ok(serde_json::to_string(&self.to_wire(registry))?)
    }

    /// Parse a JSON string in the wire format.
    pub fn from_json_str(registry: &TypeRegistry, json: &str) -> Result<Self> {
        let wire: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        Self::from_wire(registry, &wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtin::{CONFIDENCE, INDEX, LEMMA, PART_OF_SPEECH};
    use crate::value::StringTag;

    #[test]
    fn test_put_coerces_to_declared_type() {
        let mut attrs = AttributeMap::new();
        attrs.put(INDEX, "3").unwrap();
        attrs.put(CONFIDENCE, 1i64).unwrap();
        attrs.put(PART_OF_SPEECH, "NN").unwrap();

        assert_eq!(attrs.get(INDEX), Some(3));
        assert_eq!(attrs.get(CONFIDENCE), Some(1.0));
        assert_eq!(attrs.get(PART_OF_SPEECH), Some(StringTag::new("NN")));
        assert_eq!(attrs.get_value(INDEX), Some(&AttributeValue::Integer(3)));
    }

    #[test]
    fn test_put_null_removes() {
        let mut attrs = AttributeMap::new();
        attrs.put(LEMMA, "run").unwrap();
        let previous = attrs.put(LEMMA, None::<String>).unwrap();

        assert_eq!(previous, Some(AttributeValue::String("run".into())));
        assert!(!attrs.contains(LEMMA));
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_rejected_value_leaves_map_untouched() {
        let mut attrs = AttributeMap::new();
        attrs.put(INDEX, 1i64).unwrap();
        assert!(attrs.put(INDEX, "one").is_err());
        assert_eq!(attrs.get(INDEX), Some(1));
    }

    #[test]
    fn test_get_or_and_put_all() {
        let mut a = AttributeMap::new();
        a.put(LEMMA, "be").unwrap();
        let b = AttributeMap::new().with(INDEX, 7i64).unwrap();
        a.put_all(&b);

        assert_eq!(a.len(), 2);
        assert_eq!(a.get_or(CONFIDENCE, 0.5), 0.5);
        assert_eq!(a.get_or(INDEX, 0), 7);
    }

    #[test]
    fn test_wire_round_trip() {
        let registry = TypeRegistry::new();
        let tags = registry.make_attribute_type::<Vec<String>>("FEATURES").unwrap();
        let flag = registry.make_attribute_type::<bool>("IS_STOPWORD").unwrap();

        let attrs = AttributeMap::new()
            .with(PART_OF_SPEECH, "VBZ")
            .and_then(|m| m.with(LEMMA, "be"))
            .and_then(|m| m.with(CONFIDENCE, 0.75))
            .and_then(|m| m.with(INDEX, 2i64))
            .and_then(|m| m.with(tags, vec!["Mood=Ind".to_string(), "Tense=Pres".to_string()]))
            .and_then(|m| m.with(flag, true))
            .unwrap();

        let json = attrs.to_json_string(&registry).unwrap();
        let back = AttributeMap::from_json_str(&registry, &json).unwrap();
        assert_eq!(back, attrs);
    }

    #[test]
    fn test_from_wire_registers_unknown_labels() {
        let registry = TypeRegistry::new();
        let back = AttributeMap::from_json_str(&registry, r#"{"WORD_COUNT": 4, "NOTE": null}"#)
            .unwrap();

        let key = registry.attribute_key_of("word_count").unwrap();
        assert_eq!(registry.value_type(key).unwrap(), ValueType::Integer);
        assert_eq!(back.get_value(key), Some(&AttributeValue::Integer(4)));
        assert_eq!(back.len(), 1);
    }
}
