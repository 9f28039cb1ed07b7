//! Placeholder substitution for tag arguments and content.
//!
//! Placeholders are written `${name}`. Known names are replaced in a single
//! pass; unknown ones are left exactly as written. Substituted values are
//! never re-scanned, so a value that happens to contain `${...}` is inserted
//! literally.

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.-]*)\}").expect("placeholder pattern is valid")
});

/// Caller-supplied variables available to render behaviors.
///
/// # Example
///
/// ```
/// use tagmark::Variables;
///
/// let mut vars = Variables::new();
/// vars.insert("site", "https://example.com");
///
/// assert_eq!(vars.resolve("${site}/about"), "https://example.com/about");
/// assert_eq!(vars.resolve("${missing}/about"), "${missing}/about");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every known `${name}` in `text`.
    ///
    /// Borrows when nothing was replaced.
    pub fn resolve<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.values.is_empty() || !text.contains("${") {
            return Cow::Borrowed(text);
        }
        PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| match self.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
    }
}

impl<K, V> FromIterator<(K, V)> for Variables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
