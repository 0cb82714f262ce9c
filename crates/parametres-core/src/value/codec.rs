//! Type-preserving value codec
//!
//! Stored entries are `(stored string, type tag)` pairs. The tag records the
//! original value's kind so a read reconstructs exactly what was written:
//! booleans survive their `"0"`/`"1"` string form, composites survive their
//! wire form, and a stored null stays distinct from an absent entry.

use crate::errors::Result;
use crate::value::serialized;
use serde_json::{Map, Value};

/// Kind of a stored value, recorded alongside its string form.
///
/// The wire names (`NULL`, `boolean`, `integer`, `double`, `string`, `array`,
/// `object`) are what the `type` column carries in both persistent backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Null,
    Boolean,
    Integer,
    Double,
    String,
    Array,
    Object,
}

impl TypeTag {
    /// Stable wire name for this tag
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Null => "NULL",
            TypeTag::Boolean => "boolean",
            TypeTag::Integer => "integer",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }

    /// Parse a wire name; `None` for anything unrecognized
    pub fn from_name(name: &str) -> Option<TypeTag> {
        match name {
            "NULL" => Some(TypeTag::Null),
            "boolean" => Some(TypeTag::Boolean),
            "integer" => Some(TypeTag::Integer),
            "double" => Some(TypeTag::Double),
            "string" => Some(TypeTag::String),
            "array" => Some(TypeTag::Array),
            "object" => Some(TypeTag::Object),
            _ => None,
        }
    }

    /// Tag describing a value's kind
    pub fn of(value: &Value) -> TypeTag {
        match value {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    TypeTag::Integer
                } else {
                    TypeTag::Double
                }
            }
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
        }
    }
}

/// Convert a value to its storable `(stored, tag)` pair.
///
/// Booleans become `"0"`/`"1"`, composites become their serialized wire form,
/// scalars pass through as their canonical string, null stores no string at
/// all (the tag alone reconstructs it).
pub fn encode(value: &Value) -> (Option<String>, TypeTag) {
    let tag = TypeTag::of(value);
    let stored = match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => Some(serialized::to_string(value)),
    };
    (stored, tag)
}

/// Reconstruct a value from its stored pair.
///
/// A stored string classified as a serialized composite is parsed first; the
/// intermediate value is then coerced to the recorded tag.
///
/// # Errors
///
/// Returns `ParametresError::Serialization` when a stored string classifies
/// as a composite payload but fails to parse.
pub fn decode(stored: Option<&str>, tag: TypeTag) -> Result<Value> {
    let parsed = match stored {
        None => Value::Null,
        Some(s) if serialized::looks_serialized(s) => serialized::from_str(s)?,
        Some(s) => Value::String(s.to_string()),
    };
    Ok(coerce(parsed, tag))
}

/// Force a decoded value into the kind its tag records.
fn coerce(value: Value, tag: TypeTag) -> Value {
    match tag {
        TypeTag::Null => Value::Null,
        TypeTag::Boolean => Value::Bool(truthy(&value)),
        TypeTag::Integer => Value::from(as_i64(&value)),
        TypeTag::Double => Value::from(as_f64(&value)),
        TypeTag::String => Value::String(as_string(value)),
        TypeTag::Array => match value {
            Value::Array(_) | Value::Object(_) => value,
            Value::Null => Value::Array(Vec::new()),
            scalar => Value::Array(vec![scalar]),
        },
        TypeTag::Object => match value {
            Value::Object(_) => value,
            Value::Array(items) => {
                let mut map = Map::new();
                for (index, item) in items.into_iter().enumerate() {
                    map.insert(index.to_string(), item);
                }
                Value::Object(map)
            }
            Value::Null => Value::Object(Map::new()),
            scalar => {
                let mut map = Map::new();
                map.insert("scalar".to_string(), scalar);
                Value::Object(map)
            }
        },
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn as_i64(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Array(items) => f64::from(u8::from(!items.is_empty())),
        Value::Object(map) => f64::from(u8::from(!map.is_empty())),
    }
}

fn as_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => (if b { "1" } else { "" }).to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s,
        composite @ (Value::Array(_) | Value::Object(_)) => serialized::to_string(&composite),
    }
}
