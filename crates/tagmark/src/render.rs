//! Walks a document tree and produces HTML.
//!
//! Text nodes are written out under the parser's [`TextPolicy`]. Tag nodes
//! hand a [`TagScope`] to their definition's render behavior; if the
//! behavior gives up with a [`SoftError`], the node's raw source is written
//! instead and a diagnostic is recorded. Siblings are never affected.

use std::borrow::Cow;

use crate::capture::{Captures, FromCaptures};
use crate::context::RenderContext;
use crate::definition::TagDefinition;
use crate::diagnostics::{Diagnostic, DiagnosticKind, SoftError};
use crate::error::{Result, TagmarkError};
use crate::node::{leaf_text, Node, PairedNode, Span, TagNode};
use crate::probe::ResourceStatus;
use crate::variables::Variables;

/// How literal text (and markup that degraded to text) is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TextPolicy {
    /// Exactly as written.
    #[default]
    Verbatim,
    /// HTML-escaped (`<`, `>` and `&`).
    Escape,
}

impl TextPolicy {
    pub fn apply(self, text: &str) -> Cow<'_, str> {
        match self {
            TextPolicy::Verbatim => Cow::Borrowed(text),
            TextPolicy::Escape => html_escape::encode_text(text),
        }
    }
}

pub(crate) struct Renderer<'c> {
    ctx: &'c mut RenderContext,
    text_policy: TextPolicy,
    cancelled: bool,
    /// While non-zero, autodetected nodes render as their source text.
    literal_autodetect: usize,
}

impl<'c> Renderer<'c> {
    pub fn new(ctx: &'c mut RenderContext, text_policy: TextPolicy) -> Self {
        Self {
            ctx,
            text_policy,
            cancelled: false,
            literal_autodetect: 0,
        }
    }

    pub fn render(mut self, nodes: &[Node<'_>]) -> Result<String> {
        let mut out = String::new();
        self.render_nodes(nodes, &mut out);
        if self.cancelled {
            return Err(TagmarkError::Cancelled);
        }
        Ok(out)
    }

    fn render_nodes(&mut self, nodes: &[Node<'_>], out: &mut String) {
        for node in nodes {
            if self.cancelled || self.ctx.is_cancelled() {
                self.cancelled = true;
                return;
            }
            match node {
                Node::Text(text) => out.push_str(&self.text_policy.apply(text.text)),
                Node::SelfClosing(tag) | Node::Paired(PairedNode { tag, .. })
                    if self.literal_autodetect > 0
                        && tag.definition.capabilities().autodetect =>
                {
                    out.push_str(&self.text_policy.apply(tag.raw))
                }
                Node::SelfClosing(tag) => self.render_tag(tag, &[], "", out),
                Node::Paired(paired) => {
                    self.render_tag(&paired.tag, &paired.children, paired.inner_raw, out)
                }
            }
        }
    }

    fn render_tag(
        &mut self,
        tag: &TagNode<'_>,
        children: &[Node<'_>],
        inner_raw: &str,
        out: &mut String,
    ) {
        let render = tag.definition.renderer();
        let result = {
            let mut scope = TagScope {
                renderer: self,
                tag,
                children,
                inner_raw,
            };
            render(&mut scope)
        };
        match result {
            Ok(html) => out.push_str(&html),
            Err(err) => {
                self.ctx
                    .push(Diagnostic::new(err.kind, err.message, tag.span, tag.raw));
                out.push_str(&self.text_policy.apply(tag.raw));
            }
        }
    }
}

/// What a render behavior can see and do for the node it is rendering.
pub struct TagScope<'s, 'c> {
    renderer: &'s mut Renderer<'c>,
    tag: &'s TagNode<'s>,
    children: &'s [Node<'s>],
    inner_raw: &'s str,
}

impl<'s, 'c> TagScope<'s, 'c> {
    pub fn name(&self) -> &str {
        self.tag.definition.name()
    }

    pub fn definition(&self) -> &TagDefinition {
        &self.tag.definition
    }

    pub fn captures(&self) -> &Captures {
        &self.tag.captures
    }

    /// Lifts the captures into a typed argument struct.
    pub fn args<T: FromCaptures>(&self) -> std::result::Result<T, SoftError> {
        T::from_captures(&self.tag.captures)
    }

    /// Whether the open marker used the explicit argument form.
    pub fn has_argument(&self) -> bool {
        self.tag.has_argument
    }

    /// The node's whole raw source, markers included.
    pub fn raw(&self) -> &str {
        self.tag.raw
    }

    /// Raw source between the open and close markers (empty when self-closing).
    pub fn inner_raw(&self) -> &str {
        self.inner_raw
    }

    pub fn span(&self) -> Span {
        self.tag.span
    }

    pub fn children(&self) -> &[Node<'s>] {
        self.children
    }

    /// Renders the children with the same context and policy.
    pub fn render_children(&mut self) -> String {
        let children = self.children;
        let mut out = String::new();
        self.renderer.render_nodes(children, &mut out);
        out
    }

    /// Renders the children like [`render_children`](Self::render_children),
    /// except that autodetected content at any depth stays source text.
    ///
    /// Link-like tags use this so a bare URL inside them does not become a
    /// second link.
    pub fn render_children_without_autodetect(&mut self) -> String {
        self.renderer.literal_autodetect += 1;
        let out = self.render_children();
        self.renderer.literal_autodetect -= 1;
        out
    }

    /// Raw source of the children when they are only text and autodetected
    /// content; a nesting violation otherwise.
    pub fn leaf_content(&self) -> std::result::Result<String, SoftError> {
        leaf_text(self.children, self.name())
    }

    pub fn variables(&self) -> &Variables {
        self.renderer.ctx.variables()
    }

    /// Substitutes `${name}` placeholders from the caller's variables.
    pub fn resolve(&self, text: &str) -> String {
        self.renderer.ctx.variables().resolve(text).into_owned()
    }

    pub fn text_policy(&self) -> TextPolicy {
        self.renderer.text_policy
    }

    /// Whether an external resource exists.
    ///
    /// Never fails: a missing probe, a failed check and a missing resource
    /// all answer `false`, each with its own diagnostic.
    pub fn resource_exists(&mut self, url: &str) -> bool {
        if self.renderer.ctx.is_cancelled() {
            self.renderer.cancelled = true;
            return false;
        }
        let (kind, message) = match self.renderer.ctx.probe_resource(url) {
            Some(ResourceStatus::Present) => return true,
            Some(ResourceStatus::Absent) => (
                DiagnosticKind::ResourceAbsent,
                format!("resource {url} does not exist"),
            ),
            Some(ResourceStatus::Failed(err)) => (
                DiagnosticKind::ResourceCheckFailed,
                format!("could not check resource {url}: {err}"),
            ),
            None => (
                DiagnosticKind::ResourceCheckFailed,
                format!("no resource probe configured to check {url}"),
            ),
        };
        self.renderer
            .ctx
            .push(Diagnostic::new(kind, message, self.tag.span, self.tag.raw));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbatim_policy_borrows() {
        assert!(matches!(TextPolicy::Verbatim.apply("<b>"), Cow::Borrowed("<b>")));
    }

    #[test]
    fn escape_policy_escapes_markup() {
        assert_eq!(TextPolicy::Escape.apply("a < b & c"), "a &lt; b &amp; c");
    }
}
