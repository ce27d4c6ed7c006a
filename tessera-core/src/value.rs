//! Attribute values, value types and coercion.
//!
//! Every attribute type declares one [`ValueType`] when it is first
//! registered. Writes pass through [`decode`], so an attribute map only ever
//! stores values of the declared type: `"42"` written to an `Integer`
//! attribute is stored as `42`, `1` written to a `Boolean` one as `true`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Value Types
// =============================================================================

/// Declared value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Free text
    String,
    /// Signed 64-bit integer
    Integer,
    /// 64-bit float
    Float,
    /// true / false
    Boolean,
    /// A label from a tag family (part of speech, entity type, ...)
    Tag,
    /// List of strings
    StringList,
}

impl ValueType {
    /// Lower-case name used in messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Tag => "tag",
            ValueType::StringList => "string_list",
        }
    }

    /// Value type a JSON value most naturally maps to.
    ///
    /// Used when a wire map names an attribute nobody declared yet.
    #[must_use]
    pub fn infer(value: &serde_json::Value) -> Option<ValueType> {
        match value {
            serde_json::Value::Bool(_) => Some(ValueType::Boolean),
            serde_json::Value::Number(n) if n.is_i64() => Some(ValueType::Integer),
            serde_json::Value::Number(_) => Some(ValueType::Float),
            serde_json::Value::String(_) => Some(ValueType::String),
            serde_json::Value::Array(_) => Some(ValueType::StringList),
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tags
// =============================================================================

/// Capability shared by tag families.
///
/// A tag is a label that may sit in a hierarchy; `is_instance` is true when
/// `other` is this tag or one of its ancestors.
pub trait Tag: Sized + PartialEq {
    /// Label of the tag.
    fn name(&self) -> &str;

    /// Parent tag, if the family is hierarchical.
    fn parent(&self) -> Option<Self>;

    /// True if this tag equals `other` or descends from it.
    fn is_instance(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }
        let mut current = self.parent();
        while let Some(tag) = current {
            if &tag == other {
                return true;
            }
            current = tag.parent();
        }
        false
    }
}

/// Flat tag family backed by a plain label.
///
/// Labels compare case-sensitively (`NN` and `nn` are different tags).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringTag(String);

impl StringTag {
    /// Create a tag from a label; surrounding whitespace is dropped.
    #[must_use]
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().trim().to_string())
    }

    /// The label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Tag for StringTag {
    fn name(&self) -> &str {
        &self.0
    }

    fn parent(&self) -> Option<Self> {
        None
    }
}

impl fmt::Display for StringTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Attribute Values
// =============================================================================

/// A dynamically typed attribute value.
///
/// `Null` is the "no value" marker: writing it removes the attribute, and it
/// is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Absent value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Text value
    String(String),
    /// List of strings
    List(Vec<String>),
    /// Tag value (serialized as its label)
    Tag(StringTag),
}

impl AttributeValue {
    /// True for [`AttributeValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// The value type this value already conforms to, if any.
    #[must_use]
    pub const fn value_type(&self) -> Option<ValueType> {
        match self {
            AttributeValue::Null => None,
            AttributeValue::Boolean(_) => Some(ValueType::Boolean),
            AttributeValue::Integer(_) => Some(ValueType::Integer),
            AttributeValue::Float(_) => Some(ValueType::Float),
            AttributeValue::String(_) => Some(ValueType::String),
            AttributeValue::List(_) => Some(ValueType::StringList),
            AttributeValue::Tag(_) => Some(ValueType::Tag),
        }
    }

    /// Convert a JSON value. Objects are rejected; arrays must hold scalars.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        Ok(match value {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::Bool(b) => AttributeValue::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => AttributeValue::String(s.clone()),
            serde_json::Value::Array(items) => AttributeValue::List(
                items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => Ok(s.clone()),
                        serde_json::Value::Number(n) => Ok(n.to_string()),
                        serde_json::Value::Bool(b) => Ok(b.to_string()),
                        other => Err(Error::invalid_input(format!(
                            "list attribute items must be scalars, got {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            serde_json::Value::Object(_) => {
                return Err(Error::invalid_input(
                    "attribute values cannot be JSON objects",
                ))
            }
        })
    }

    /// Convert to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeValue::Null => serde_json::Value::Null,
            AttributeValue::Boolean(b) => serde_json::Value::Bool(*b),
            AttributeValue::Integer(i) => serde_json::Value::from(*i),
            AttributeValue::Float(f) => serde_json::Value::from(*f),
            AttributeValue::String(s) => serde_json::Value::String(s.clone()),
            AttributeValue::List(items) => serde_json::Value::from(items.clone()),
            AttributeValue::Tag(tag) => serde_json::Value::String(tag.as_str().to_string()),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => f.write_str("null"),
            AttributeValue::Boolean(b) => write!(f, "{b}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Float(x) => write!(f, "{x}"),
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::List(items) => write!(f, "[{}]", items.join(", ")),
            AttributeValue::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Boolean(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Integer(i64::from(v))
    }
}

impl From<usize> for AttributeValue {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or(AttributeValue::Float(v as f64), AttributeValue::Integer)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(v: Vec<String>) -> Self {
        AttributeValue::List(v)
    }
}

impl From<StringTag> for AttributeValue {
    fn from(v: StringTag) -> Self {
        AttributeValue::Tag(v)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AttributeValue::Null, Into::into)
    }
}

// =============================================================================
// Coercion
// =============================================================================

/// Coerce `value` to `value_type`.
///
/// `Null` passes through untouched; callers treat it as removal.
pub fn decode(value_type: ValueType, value: AttributeValue) -> Result<AttributeValue> {
    use AttributeValue as V;

    let fail = |value: &AttributeValue| {
        Error::invalid_value(value_type, format!("cannot coerce {value:?}"))
    };

    match (value_type, value) {
        (_, V::Null) => Ok(V::Null),

        (ValueType::String, V::String(s)) => Ok(V::String(s)),
        (ValueType::String, V::Tag(t)) => Ok(V::String(t.0)),
        (ValueType::String, V::Integer(i)) => Ok(V::String(i.to_string())),
        (ValueType::String, V::Float(x)) => Ok(V::String(x.to_string())),
        (ValueType::String, V::Boolean(b)) => Ok(V::String(b.to_string())),

        (ValueType::Integer, V::Integer(i)) => Ok(V::Integer(i)),
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        (ValueType::Integer, V::Float(x))
            if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 =>
        {
            Ok(V::Integer(x as i64))
        }
        (ValueType::Integer, V::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(V::Integer)
            .map_err(|e| Error::invalid_value(value_type, format!("{s:?}: {e}"))),

        (ValueType::Float, V::Float(x)) => Ok(V::Float(x)),
        (ValueType::Float, V::Integer(i)) => Ok(V::Float(i as f64)),
        (ValueType::Float, V::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(V::Float)
            .map_err(|e| Error::invalid_value(value_type, format!("{s:?}: {e}"))),

        (ValueType::Boolean, V::Boolean(b)) => Ok(V::Boolean(b)),
        (ValueType::Boolean, V::Integer(0)) => Ok(V::Boolean(false)),
        (ValueType::Boolean, V::Integer(1)) => Ok(V::Boolean(true)),
        (ValueType::Boolean, V::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(V::Boolean(true)),
            "false" => Ok(V::Boolean(false)),
            _ => Err(fail(&V::String(s))),
        },

        (ValueType::Tag, V::Tag(t)) => Ok(V::Tag(t)),
        (ValueType::Tag, V::String(s)) if !s.trim().is_empty() => Ok(V::Tag(StringTag::new(s))),

        (ValueType::StringList, V::List(items)) => Ok(V::List(items)),
        (ValueType::StringList, V::String(s)) => Ok(V::List(vec![s])),

        (_, other) => Err(fail(&other)),
    }
}

/// Rust types usable as the `T` of an `AttributeType<T>`.
pub trait AttributeKind: Sized + Clone + Send + Sync + 'static {
    /// Declared value type for attributes of this kind.
    const VALUE_TYPE: ValueType;

    /// Wrap into a dynamic value.
    fn into_value(self) -> AttributeValue;

    /// Read back from a stored (already decoded) value.
    fn from_value(value: &AttributeValue) -> Option<Self>;
}

impl AttributeKind for String {
    const VALUE_TYPE: ValueType = ValueType::String;

    fn into_value(self) -> AttributeValue {
        AttributeValue::String(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl AttributeKind for i64 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn into_value(self) -> AttributeValue {
        AttributeValue::Integer(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl AttributeKind for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn into_value(self) -> AttributeValue {
        AttributeValue::Float(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl AttributeKind for bool {
    const VALUE_TYPE: ValueType = ValueType::Boolean;

    fn into_value(self) -> AttributeValue {
        AttributeValue::Boolean(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl AttributeKind for StringTag {
    const VALUE_TYPE: ValueType = ValueType::Tag;

    fn into_value(self) -> AttributeValue {
        AttributeValue::Tag(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Tag(t) => Some(t.clone()),
            _ => None,
        }
    }
}

impl AttributeKind for Vec<String> {
    const VALUE_TYPE: ValueType = ValueType::StringList;

    fn into_value(self) -> AttributeValue {
        AttributeValue::List(self)
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_to_integer_requires_range() {
        assert_eq!(
            decode(ValueType::Integer, 42.0f64.into()).unwrap(),
            AttributeValue::Integer(42)
        );
        assert_eq!(
            decode(ValueType::Integer, (-9.0e18f64).into()).unwrap(),
            AttributeValue::Integer(-9_000_000_000_000_000_000)
        );
        for x in [1e300, -1e300, 9.3e18, f64::INFINITY, f64::NAN, 2.5] {
            assert!(
                matches!(decode(ValueType::Integer, x.into()), Err(Error::InvalidValue { .. })),
                "{x} should not coerce"
            );
        }
    }

    #[test]
    fn test_numeric_string_coercion() {
        assert_eq!(
            decode(ValueType::Integer, "42".into()).unwrap(),
            AttributeValue::Integer(42)
        );
        assert_eq!(
            decode(ValueType::Float, " 0.5 ".into()).unwrap(),
            AttributeValue::Float(0.5)
        );
        assert_eq!(
            decode(ValueType::Float, 3i64.into()).unwrap(),
            AttributeValue::Float(3.0)
        );
        assert_eq!(
            decode(ValueType::Integer, 7.0f64.into()).unwrap(),
            AttributeValue::Integer(7)
        );
        assert!(decode(ValueType::Integer, 7.5f64.into()).is_err());
        assert!(decode(ValueType::Integer, "seven".into()).is_err());
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(
            decode(ValueType::Boolean, "TRUE".into()).unwrap(),
            AttributeValue::Boolean(true)
        );
        assert_eq!(
            decode(ValueType::Boolean, 0i64.into()).unwrap(),
            AttributeValue::Boolean(false)
        );
        assert!(decode(ValueType::Boolean, 2i64.into()).is_err());
    }

    #[test]
    fn test_string_and_tag_coercion() {
        assert_eq!(
            decode(ValueType::Tag, "NNP".into()).unwrap(),
            AttributeValue::Tag(StringTag::new("NNP"))
        );
        assert_eq!(
            decode(ValueType::String, 12i64.into()).unwrap(),
            AttributeValue::String("12".into())
        );
        assert_eq!(
            decode(ValueType::StringList, "a".into()).unwrap(),
            AttributeValue::List(vec!["a".into()])
        );
        assert!(decode(ValueType::Tag, "   ".into()).is_err());
    }

    #[test]
    fn test_null_passes_through() {
        let none: Option<i64> = None;
        assert!(decode(ValueType::Integer, none.into()).unwrap().is_null());
    }

    #[test]
    fn test_flat_tag_is_instance_only_of_itself() {
        let nn = StringTag::new("NN");
        assert!(nn.is_instance(&StringTag::new("NN")));
        assert!(!nn.is_instance(&StringTag::new("NNP")));
        assert_eq!(nn.parent(), None);
    }

    #[test]
    fn test_json_conversion() {
        let value = AttributeValue::from_json(&serde_json::json!(["a", 1, true])).unwrap();
        assert_eq!(
            value,
            AttributeValue::List(vec!["a".into(), "1".into(), "true".into()])
        );
        assert!(AttributeValue::from_json(&serde_json::json!({"k": 1})).is_err());
        assert_eq!(AttributeValue::Integer(3).to_json(), serde_json::json!(3));
    }
}
