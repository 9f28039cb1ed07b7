//! Tag definitions: the plugin contract.
//!
//! A [`TagDefinition`] pairs an open pattern (and, for paired tags, a close
//! pattern) with a capability descriptor and a render behavior. Definitions
//! are validated when built, so a malformed pattern fails at registration
//! instead of somewhere in the middle of a parse.
//!
//! # Example
//!
//! ```
//! use tagmark::{Nesting, TagDefinition};
//!
//! let bold = TagDefinition::paired("b", r"(?i)\[b\]", r"(?i)\[/b\]")
//!     .label("Bold")
//!     .nesting(Nesting::Always)
//!     .render(|scope| Ok(format!("<strong>{}</strong>", scope.render_children())))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(bold.name(), "b");
//! assert!(!bold.is_self_closing());
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::capture::Captures;
use crate::diagnostics::SoftError;
use crate::error::{PatternRole, Result, TagmarkError};
use crate::render::TagScope;

/// The render behavior of a tag.
///
/// Receives the node's [`TagScope`] and returns its HTML, or a [`SoftError`]
/// to have the node emitted as its raw source instead.
pub type RenderFn =
    Arc<dyn Fn(&mut TagScope<'_, '_>) -> std::result::Result<String, SoftError> + Send + Sync>;

/// Which nested tags a paired tag accepts.
///
/// Text and autodetected nodes (bare URLs) are always accepted; the policy
/// only concerns other tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nesting {
    /// Any tag may appear inside.
    #[default]
    Always,
    /// Tags may appear inside only when the open marker carried an argument.
    WithArgument,
    /// Only text and autodetected content.
    Never,
}

/// What a definition is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub nesting: Nesting,
    /// Without an argument the node degrades to literal text.
    pub requires_argument: bool,
    /// The definition recognizes bare content (like a URL) rather than an
    /// explicit tag. Explicit tags outrank it at the same position.
    pub autodetect: bool,
}

impl Capabilities {
    /// Whether a node with or without an argument may hold nested tags.
    pub fn allows_nested_tags(&self, has_argument: bool) -> bool {
        match self.nesting {
            Nesting::Always => true,
            Nesting::WithArgument => has_argument,
            Nesting::Never => false,
        }
    }
}

/// Self-closing or paired.
#[derive(Debug, Clone)]
pub enum TagKind {
    SelfClosing,
    Paired { close: Regex },
}

/// A registered tag: patterns, capabilities and render behavior.
#[derive(Clone)]
pub struct TagDefinition {
    name: String,
    label: String,
    open: Regex,
    open_anchored: Regex,
    kind: TagKind,
    capabilities: Capabilities,
    argument_groups: Vec<String>,
    render: RenderFn,
}

impl TagDefinition {
    /// Starts a definition for a tag with a close marker.
    pub fn paired(
        name: impl Into<String>,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> TagDefinitionBuilder {
        TagDefinitionBuilder::new(name.into(), open.into(), Some(close.into()))
    }

    /// Starts a definition for a tag without a close marker or children.
    pub fn self_closing(name: impl Into<String>, open: impl Into<String>) -> TagDefinitionBuilder {
        TagDefinitionBuilder::new(name.into(), open.into(), None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable name, e.g. for help listings.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &TagKind {
        &self.kind
    }

    pub fn is_self_closing(&self) -> bool {
        matches!(self.kind, TagKind::SelfClosing)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn argument_groups(&self) -> &[String] {
        &self.argument_groups
    }

    /// The open pattern as written, unanchored.
    pub fn open_pattern(&self) -> &Regex {
        &self.open
    }

    /// The open pattern anchored at the start of the haystack.
    pub(crate) fn open_anchored(&self) -> &Regex {
        &self.open_anchored
    }

    pub(crate) fn close_pattern(&self) -> Option<&Regex> {
        match &self.kind {
            TagKind::SelfClosing => None,
            TagKind::Paired { close } => Some(close),
        }
    }

    pub(crate) fn renderer(&self) -> &RenderFn {
        &self.render
    }

    /// Whether `captures` came from the explicit argument form of this tag.
    pub fn has_argument(&self, captures: &Captures) -> bool {
        self.argument_groups
            .iter()
            .any(|group| captures.non_empty(group).is_some())
    }
}

impl fmt::Debug for TagDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagDefinition")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("open", &self.open.as_str())
            .field("kind", &self.kind)
            .field("capabilities", &self.capabilities)
            .field("argument_groups", &self.argument_groups)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TagDefinition`].
pub struct TagDefinitionBuilder {
    name: String,
    label: Option<String>,
    open: String,
    close: Option<String>,
    capabilities: Capabilities,
    argument_groups: Option<Vec<String>>,
    render: Option<RenderFn>,
}

impl TagDefinitionBuilder {
    fn new(name: String, open: String, close: Option<String>) -> Self {
        Self {
            name,
            label: None,
            open,
            close,
            capabilities: Capabilities::default(),
            argument_groups: None,
            render: None,
        }
    }

    /// Sets the human-readable label (defaults to the name).
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn nesting(mut self, nesting: Nesting) -> Self {
        self.capabilities.nesting = nesting;
        self
    }

    pub fn requires_argument(mut self) -> Self {
        self.capabilities.requires_argument = true;
        self
    }

    /// Marks the definition as a bare-content recognizer.
    pub fn autodetect(mut self) -> Self {
        self.capabilities.autodetect = true;
        self
    }

    /// Names the captures that mark the explicit argument form.
    ///
    /// Defaults to every named group in the open pattern.
    pub fn argument_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argument_groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&mut TagScope<'_, '_>) -> std::result::Result<String, SoftError> + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Compiles the patterns and validates the definition.
    pub fn build(self) -> Result<TagDefinition> {
        if self.name.trim().is_empty() {
            return Err(TagmarkError::EmptyName);
        }

        let compile = |pattern: &str, role: PatternRole| {
            Regex::new(pattern).map_err(|source| TagmarkError::InvalidPattern {
                tag: self.name.clone(),
                role,
                source,
            })
        };

        let open = compile(&self.open, PatternRole::Open)?;
        let open_anchored = compile(&anchored(&self.open), PatternRole::Open)?;
        let kind = match &self.close {
            Some(close) => TagKind::Paired {
                close: compile(close, PatternRole::Close)?,
            },
            None => TagKind::SelfClosing,
        };

        let named: Vec<String> = open.capture_names().flatten().map(String::from).collect();
        let argument_groups = match self.argument_groups {
            Some(groups) => {
                if let Some(unknown) = groups.iter().find(|g| !named.contains(g)) {
                    return Err(TagmarkError::UnknownArgumentGroup {
                        tag: self.name.clone(),
                        group: unknown.clone(),
                    });
                }
                groups
            }
            None => named,
        };

        let render = match self.render {
            Some(render) => render,
            None => default_render(&kind),
        };

        Ok(TagDefinition {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            open,
            open_anchored,
            kind,
            capabilities: self.capabilities,
            argument_groups,
            render,
        })
    }
}

/// Self-closing tags echo their match; paired tags render their children.
fn default_render(kind: &TagKind) -> RenderFn {
    match kind {
        TagKind::SelfClosing => Arc::new(|scope: &mut TagScope<'_, '_>| {
            Ok::<_, SoftError>(scope.captures().whole().to_string())
        }),
        TagKind::Paired { .. } => {
            Arc::new(|scope: &mut TagScope<'_, '_>| Ok::<_, SoftError>(scope.render_children()))
        }
    }
}

/// Wraps a pattern so it only matches at the start of the haystack.
fn anchored(pattern: &str) -> String {
    format!(r"\A(?:{})", pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paired_definition_compiles() {
        let def = TagDefinition::paired("b", r"\[b\]", r"\[/b\]").build().unwrap();
        assert_eq!(def.name(), "b");
        assert_eq!(def.label(), "b");
        assert!(!def.is_self_closing());
        assert!(def.close_pattern().is_some());
    }

    #[test]
    fn invalid_open_pattern_fails_at_build() {
        let err = TagDefinition::self_closing("broken", r"\[b(").build().unwrap_err();
        match err {
            TagmarkError::InvalidPattern { tag, role, .. } => {
                assert_eq!(tag, "broken");
                assert_eq!(role, PatternRole::Open);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_close_pattern_fails_at_build() {
        let err = TagDefinition::paired("b", r"\[b\]", r"[/b")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TagmarkError::InvalidPattern {
                role: PatternRole::Close,
                ..
            }
        ));
    }

    #[test]
    fn empty_name_rejected() {
        let err = TagDefinition::self_closing("  ", "x").build().unwrap_err();
        assert!(matches!(err, TagmarkError::EmptyName));
    }

    #[test]
    fn argument_groups_default_to_named_groups() {
        let def = TagDefinition::paired("img", r"\[img(=(?P<align>\w+))?\]", r"\[/img\]")
            .build()
            .unwrap();
        assert_eq!(def.argument_groups(), &["align".to_string()]);
    }

    #[test]
    fn unknown_argument_group_rejected() {
        let err = TagDefinition::paired("img", r"\[img\]", r"\[/img\]")
            .argument_groups(["align"])
            .build()
            .unwrap_err();
        assert!(matches!(err, TagmarkError::UnknownArgumentGroup { .. }));
    }

    #[test]
    fn has_argument_ignores_empty_values() {
        let def = TagDefinition::paired("url", r#"\[url(=(?P<href>[^\]]*))?\]"#, r"\[/url\]")
            .build()
            .unwrap();
        let bare = Captures::from_parts("[url]", Vec::<(String, String)>::new());
        let empty = Captures::from_parts("[url=]", [("href", "")]);
        let explicit = Captures::from_parts("[url=x]", [("href", "x")]);
        assert!(!def.has_argument(&bare));
        assert!(!def.has_argument(&empty));
        assert!(def.has_argument(&explicit));
    }

    #[test]
    fn nesting_policy() {
        let caps = |nesting| Capabilities {
            nesting,
            ..Capabilities::default()
        };
        assert!(caps(Nesting::Always).allows_nested_tags(false));
        assert!(!caps(Nesting::WithArgument).allows_nested_tags(false));
        assert!(caps(Nesting::WithArgument).allows_nested_tags(true));
        assert!(!caps(Nesting::Never).allows_nested_tags(true));
    }

    #[test]
    fn anchored_pattern_only_matches_at_start() {
        let def = TagDefinition::self_closing("smile", r":\)").build().unwrap();
        assert!(def.open_anchored().is_match(":) hi"));
        assert!(!def.open_anchored().is_match("hi :)"));
        assert!(def.open_pattern().is_match("hi :)"));
    }
}
