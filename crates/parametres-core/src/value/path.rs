//! Dotted-path lookup into composite values
//!
//! Keys may carry a sub-path past their property segment
//! (`auth.session.depth.field`); the same walker also serves the
//! default-configuration fallback.

use serde_json::Value;

/// Walk a value by path segments: objects by key, arrays by index.
///
/// Returns `None` as soon as a segment has nothing to match, including index
/// segments that fail to parse against an array.
pub fn get_path<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Walk a value by a dotted path string.
pub fn get_dotted<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let segments: Vec<&str> = path.split('.').collect();
    get_path(value, &segments)
}
