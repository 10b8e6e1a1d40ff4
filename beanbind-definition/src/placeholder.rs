//! `${key}` substitution in deferred text values.

use std::collections::HashMap;
use std::fmt;

/// How deep replacement text may keep referring to further placeholders.
const MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    /// `${key}` with no value and no default.
    Unresolved { key: String },
    /// `${` with no closing `}`.
    Unterminated { text: String },
    /// Replacement text kept expanding into more placeholders.
    TooDeep { key: String },
}

impl fmt::Display for PlaceholderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderError::Unresolved { key } => {
                write!(f, "no value for placeholder `${{{key}}}`")
            }
            PlaceholderError::Unterminated { text } => {
                write!(f, "unterminated placeholder in {text:?}")
            }
            PlaceholderError::TooDeep { key } => write!(
                f,
                "placeholder `${{{key}}}` nests more than {MAX_DEPTH} levels deep"
            ),
        }
    }
}

impl std::error::Error for PlaceholderError {}

/// Replace every `${key}` in `text` with its value from `properties`, or
/// `${key:default}` with `default` when the key is missing.
///
/// Values may contain placeholders themselves; they are expanded in turn.
pub fn resolve_placeholders(
    text: &str,
    properties: &HashMap<String, String>,
) -> Result<String, PlaceholderError> {
    resolve_at(text, properties, 0)
}

fn resolve_at(
    text: &str,
    properties: &HashMap<String, String>,
    depth: usize,
) -> Result<String, PlaceholderError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let token_and_rest = &rest[start + 2..];
        let Some(end) = token_and_rest.find('}') else {
            return Err(PlaceholderError::Unterminated {
                text: text.to_owned(),
            });
        };
        let token = &token_and_rest[..end];
        let (key, default) = match token.split_once(':') {
            Some((key, default)) => (key, Some(default)),
            None => (token, None),
        };

        let replacement = match (properties.get(key), default) {
            (Some(value), _) => value.as_str(),
            (None, Some(default)) => default,
            (None, None) => {
                return Err(PlaceholderError::Unresolved {
                    key: key.to_owned(),
                });
            }
        };
        if depth >= MAX_DEPTH {
            return Err(PlaceholderError::TooDeep {
                key: key.to_owned(),
            });
        }
        crate::trace!(key, depth, "resolving placeholder");
        out.push_str(&resolve_at(replacement, properties, depth + 1)?);
        rest = &token_and_rest[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(resolve_placeholders("no tokens $here", &props(&[])).unwrap(), "no tokens $here");
    }

    #[test]
    fn keys_and_defaults() {
        let props = props(&[("host", "db"), ("port", "5432")]);
        assert_eq!(
            resolve_placeholders("${host}:${port}/${name:main}", &props).unwrap(),
            "db:5432/main"
        );
        assert_eq!(resolve_placeholders("${port:1}", &props).unwrap(), "5432");
        assert_eq!(resolve_placeholders("${empty:}", &props).unwrap(), "");
    }

    #[test]
    fn values_expand_recursively() {
        let props = props(&[("url", "http://${host}"), ("host", "${name}.local"), ("name", "box")]);
        assert_eq!(resolve_placeholders("${url}/", &props).unwrap(), "http://box.local/");
    }

    #[test]
    fn missing_and_malformed() {
        let err = resolve_placeholders("${missing}", &props(&[])).unwrap_err();
        assert_eq!(err, PlaceholderError::Unresolved { key: "missing".into() });
        assert_eq!(err.to_string(), "no value for placeholder `${missing}`");

        let err = resolve_placeholders("a ${open", &props(&[])).unwrap_err();
        assert!(matches!(err, PlaceholderError::Unterminated { .. }));
    }

    #[test]
    fn self_reference_stops() {
        let err = resolve_placeholders("${loop}", &props(&[("loop", "again ${loop}")])).unwrap_err();
        assert_eq!(err, PlaceholderError::TooDeep { key: "loop".into() });
    }
}
