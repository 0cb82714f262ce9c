//! Key grammar
//!
//! A settings key is `file.property`, optionally extended with a dotted
//! sub-path (`auth.session.depth.field`): the first segment names the file
//! namespace, the second the stored property, and anything after that indexes
//! recursively into a composite value.

use crate::errors::{ParametresError, Result};

/// A parsed settings key, borrowing from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParts<'a> {
    /// Namespace segment (historically a configuration file's name)
    pub file: &'a str,
    /// Stored property within the file namespace
    pub property: &'a str,
    /// Remaining segments, used only for recursive lookup into composites
    pub path: Vec<&'a str>,
}

impl KeyParts<'_> {
    /// Full dotted path below the file segment, for default-config lookup
    pub fn dotted_property(&self) -> String {
        if self.path.is_empty() {
            return self.property.to_string();
        }
        let mut dotted = String::from(self.property);
        for segment in &self.path {
            dotted.push('.');
            dotted.push_str(segment);
        }
        dotted
    }
}

/// Split a key into its file, property and sub-path parts.
///
/// # Errors
///
/// `ParametresError::InvalidKey` when the key has fewer than two dot-separated
/// segments.
pub fn parse(key: &str) -> Result<KeyParts<'_>> {
    let mut segments = key.split('.');

    let file = segments.next().unwrap_or_default();
    let property = segments.next().ok_or_else(|| ParametresError::InvalidKey {
        key: key.to_string(),
    })?;

    Ok(KeyParts {
        file,
        property,
        path: segments.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_segments() {
        let parts = parse("test.site_name").unwrap();
        assert_eq!(parts.file, "test");
        assert_eq!(parts.property, "site_name");
        assert!(parts.path.is_empty());
        assert_eq!(parts.dotted_property(), "site_name");
    }

    #[test]
    fn test_parse_sub_path() {
        let parts = parse("auth.session.depth.field").unwrap();
        assert_eq!(parts.file, "auth");
        assert_eq!(parts.property, "session");
        assert_eq!(parts.path, vec!["depth", "field"]);
        assert_eq!(parts.dotted_property(), "session.depth.field");
    }

    #[test]
    fn test_parse_single_segment_fails() {
        let result = parse("foobar");
        assert_eq!(
            result,
            Err(ParametresError::InvalidKey {
                key: "foobar".to_string()
            })
        );
    }

    #[test]
    fn test_parse_empty_key_fails() {
        assert!(parse("").is_err());
    }
}
