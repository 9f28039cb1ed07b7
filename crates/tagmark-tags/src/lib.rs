//! The stock tag set for [`tagmark`]: formatting, links, images, e-mail,
//! video embeds, bare URL detection and smilies.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tagmark::{ProbeError, RenderContext};
//! use tagmark_tags::TagsConfig;
//!
//! let config = TagsConfig {
//!     media_url: "https://media.example.com/".into(),
//!     ..TagsConfig::default()
//! };
//! let parser = tagmark_tags::parser(&config)?;
//!
//! // Pretend every smilie image exists.
//! let ctx = RenderContext::new().with_probe(Arc::new(|_: &str| Ok::<_, ProbeError>(true)));
//! let rendered = parser.process("[b]Hello[/b] :)", ctx)?;
//! assert_eq!(
//!     rendered.html,
//!     r#"<strong>Hello</strong> <img src="https://media.example.com/smilie.gif" alt=":)" />"#
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Applications usually install the set once at startup with [`init`] and
//! check smilie images over HTTP with [`http_probe`].

mod config;
mod error;
pub mod format;
mod probe;
pub mod smilies;
pub mod web;

use std::sync::Arc;

use tagmark::{BBParser, Registry, RegistryBuilder};

pub use config::TagsConfig;
pub use error::{Result, TagsError};
pub use probe::{CachedProbe, HttpProbe, DEFAULT_CACHE_CAPACITY};
pub use web::{encode_href, Align, ImgArgs, UrlArgs};

/// Registers the stock set in its fixed order: formatting, web, smilies.
pub fn register_defaults(
    builder: &mut RegistryBuilder,
    config: &TagsConfig,
) -> tagmark::Result<()> {
    format::register(builder)?;
    web::register(builder)?;
    smilies::register(builder, config)
}

/// Builds a registry holding only the stock set.
pub fn registry(config: &TagsConfig) -> Result<Registry> {
    let mut builder = Registry::builder();
    register_defaults(&mut builder, config)?;
    Ok(builder.build()?)
}

/// A parser over a fresh stock registry, using the configured text policy.
pub fn parser(config: &TagsConfig) -> Result<BBParser> {
    Ok(BBParser::new(registry(config)?).text_policy(config.text_policy))
}

/// Installs the stock set as the process-wide registry.
///
/// Only the first call registers anything; later calls return the same
/// registry whatever their config.
pub fn init(config: &TagsConfig) -> Result<&'static Registry> {
    let registry = tagmark::registry::init(|builder| register_defaults(builder, config))?;
    tracing::debug!(definitions = registry.len(), "stock tags installed");
    Ok(registry)
}

/// An HTTP existence check with the configured timeout and answer cache.
pub fn http_probe(config: &TagsConfig) -> Arc<CachedProbe<HttpProbe>> {
    Arc::new(CachedProbe::with_capacity(
        HttpProbe::new(config.probe_timeout()),
        config.probe_cache_ttl(),
        config.probe_cache_capacity,
    ))
}
