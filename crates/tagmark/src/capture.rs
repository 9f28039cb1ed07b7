//! Captured groups from an open-pattern match.
//!
//! [`Captures`] is the engine's owned record of one match. Tag plugins lift
//! it into their own argument structs through [`FromCaptures`], so optional
//! arguments become `Option` fields instead of string lookups scattered
//! through render code.

use std::collections::BTreeMap;

use regex::Regex;

use crate::diagnostics::SoftError;

/// The groups captured by a tag's open pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    whole: String,
    positional: Vec<Option<String>>,
    named: BTreeMap<String, String>,
}

impl Captures {
    /// Captures the first match of `regex` in `haystack`.
    pub(crate) fn capture(regex: &Regex, haystack: &str) -> Option<Self> {
        let caps = regex.captures(haystack)?;
        let whole = caps.get(0)?.as_str().to_string();
        let positional = caps
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        let named = regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();
        Some(Self {
            whole,
            positional,
            named,
        })
    }

    /// Builds captures by hand, mostly for tests of render behaviors.
    pub fn from_parts<I, K, V>(whole: impl Into<String>, named: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            whole: whole.into(),
            positional: Vec::new(),
            named: named
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The whole open-marker match.
    pub fn whole(&self) -> &str {
        &self.whole
    }

    /// A named group, if it took part in the match.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// A named group that took part in the match and is not empty.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// A positional group (1-based, like regex group numbers).
    pub fn group(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.positional.get(i))
            .and_then(|g| g.as_deref())
    }

    /// Iterates named groups that took part in the match.
    pub fn named(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Typed arguments extracted from a tag's captures.
///
/// # Example
///
/// ```
/// use tagmark::{Captures, FromCaptures, SoftError};
///
/// struct ColorArgs {
///     color: String,
/// }
///
/// impl FromCaptures for ColorArgs {
///     fn from_captures(captures: &Captures) -> Result<Self, SoftError> {
///         let color = captures
///             .non_empty("color")
///             .ok_or_else(|| SoftError::missing_argument("[color] needs a color"))?;
///         Ok(ColorArgs { color: color.to_string() })
///     }
/// }
///
/// let captures = Captures::from_parts("[color=red]", [("color", "red")]);
/// assert_eq!(ColorArgs::from_captures(&captures).unwrap().color, "red");
/// ```
pub trait FromCaptures: Sized {
    fn from_captures(captures: &Captures) -> Result<Self, SoftError>;
}

impl FromCaptures for Captures {
    fn from_captures(captures: &Captures) -> Result<Self, SoftError> {
        Ok(captures.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_named_and_positional_groups() {
        let re = Regex::new(r"\[img(=(?P<align>\w+))?\]").unwrap();
        let caps = Captures::capture(&re, "x[img=left]").unwrap();
        assert_eq!(caps.whole(), "[img=left]");
        assert_eq!(caps.get("align"), Some("left"));
        assert_eq!(caps.group(1), Some("=left"));
        assert_eq!(caps.group(2), Some("left"));
        assert_eq!(caps.group(0), None);
    }

    #[test]
    fn missing_optional_group_is_none() {
        let re = Regex::new(r"\[img(=(?P<align>\w+))?\]").unwrap();
        let caps = Captures::capture(&re, "[img]").unwrap();
        assert_eq!(caps.get("align"), None);
        assert_eq!(caps.group(1), None);
        assert_eq!(caps.named().count(), 0);
    }

    #[test]
    fn non_empty_filters_blank_values() {
        let caps = Captures::from_parts("[x=]", [("arg", "")]);
        assert_eq!(caps.get("arg"), Some(""));
        assert_eq!(caps.non_empty("arg"), None);
    }
}
