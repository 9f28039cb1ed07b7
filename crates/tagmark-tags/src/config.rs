//! Settings for the stock tag set.
//!
//! Every field has a default, so an empty or blank document is a valid config:
//!
//! ```
//! use tagmark_tags::TagsConfig;
//!
//! let config = TagsConfig::from_yaml("media_url: https://cdn.example.com/smilies/").unwrap();
//! assert_eq!(config.media_url, "https://cdn.example.com/smilies/");
//! assert_eq!(config.probe_timeout_ms, 2000);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tagmark::TextPolicy;

use crate::error::{Result, TagsError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    /// Prefix for smilie images, e.g. `/static/smilies/`. May contain
    /// `${name}` placeholders, resolved per render call.
    pub media_url: String,
    /// Timeout for one resource existence check.
    pub probe_timeout_ms: u64,
    /// How long a definitive existence answer is reused across calls.
    pub probe_cache_ttl_secs: u64,
    /// Most answers kept at once; expired ones are dropped first.
    pub probe_cache_capacity: usize,
    pub text_policy: TextPolicy,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            media_url: "/media/smilies/".to_string(),
            probe_timeout_ms: 2000,
            probe_cache_ttl_secs: 300,
            probe_cache_capacity: 1024,
            text_policy: TextPolicy::default(),
        }
    }
}

impl TagsConfig {
    /// Parses a YAML document. Blank input yields the defaults.
    pub fn from_yaml(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    /// Reads a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| TagsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&source)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn probe_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.probe_cache_ttl_secs)
    }
}
