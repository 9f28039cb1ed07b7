//! BBCode-style tag parser with pluggable tag definitions, rendering to HTML.
//!
//! This crate turns `[tag]content[/tag]` markup into HTML for forum and CMS
//! content. It knows nothing about any particular tag: every tag is a
//! [`TagDefinition`] registered in a [`Registry`], carrying its own regular
//! expressions and render behavior.
//!
//! Malformed markup never fails a parse. Unclosed tags, forbidden nesting
//! and content a tag rejects all fall back to the literal source text, and
//! each fallback is reported as a [`Diagnostic`] next to the output.
//!
//! # Example
//!
//! ```rust
//! use tagmark::{BBParser, Nesting, Registry, RenderContext, TagDefinition};
//!
//! let mut builder = Registry::builder();
//! builder
//!     .register(
//!         TagDefinition::paired("b", r"\[b\]", r"\[/b\]")
//!             .render(|scope| Ok(format!("<strong>{}</strong>", scope.render_children())))
//!             .build()?,
//!     )
//!     .register(
//!         TagDefinition::paired("link", r"\[link=(?P<href>[^\]]+)\]", r"\[/link\]")
//!             .nesting(Nesting::WithArgument)
//!             .render(|scope| {
//!                 let href = scope.resolve(scope.captures().get("href").unwrap_or_default());
//!                 Ok(format!(r#"<a href="{}">{}</a>"#, href, scope.render_children()))
//!             })
//!             .build()?,
//!     );
//! let parser = BBParser::new(builder.build()?);
//!
//! let ctx = RenderContext::new().variable("site", "https://example.com");
//! let rendered = parser.process("[link=${site}/faq][b]FAQ[/b][/link]", ctx)?;
//! assert_eq!(
//!     rendered.html,
//!     r#"<a href="https://example.com/faq"><strong>FAQ</strong></a>"#
//! );
//! assert!(rendered.diagnostics.is_empty());
//! # Ok::<(), tagmark::TagmarkError>(())
//! ```
//!
//! # Matching
//!
//! At each position every open pattern is tried, anchored there. Explicit
//! tags beat autodetected content, the argument form of a tag beats its
//! bare form, and otherwise the earliest registration wins. See
//! [`TagDefinition`] for the capabilities that shape the tree.

mod capture;
mod context;
mod definition;
mod diagnostics;
mod error;
mod matcher;
mod node;
mod parser;
mod probe;
pub mod registry;
mod render;
mod tree;
mod variables;

pub use capture::{Captures, FromCaptures};
pub use context::{Cancellation, RenderContext};
pub use definition::{
    Capabilities, Nesting, RenderFn, TagDefinition, TagDefinitionBuilder, TagKind,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity, SoftError};
pub use error::{PatternRole, Result, TagmarkError};
pub use node::{leaf_text, Node, PairedNode, Span, TagNode, TextNode};
pub use parser::{BBParser, Document, Rendered, DEFAULT_MAX_DEPTH};
pub use probe::{ProbeError, ResourceProbe, ResourceStatus};
pub use registry::{Registry, RegistryBuilder};
pub use render::{TagScope, TextPolicy};
pub use variables::Variables;
