//! The parsed document tree.
//!
//! Every node remembers the byte range of the input it came from. Top-level
//! spans tile the whole input and a paired node's children tile the region
//! between its open and close markers, so any node can always fall back to
//! its exact raw source.

use std::ops::Range;
use std::sync::Arc;

use crate::capture::Captures;
use crate::definition::TagDefinition;
use crate::diagnostics::SoftError;

/// A half-open byte range into the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// A node of the document tree.
#[derive(Debug, Clone)]
pub enum Node<'a> {
    /// Literal text, including markup that degraded to text.
    Text(TextNode<'a>),
    /// A tag without a close marker or children.
    SelfClosing(TagNode<'a>),
    /// A tag with a close marker and owned children.
    Paired(PairedNode<'a>),
}

/// A literal run of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode<'a> {
    pub span: Span,
    pub text: &'a str,
}

/// A matched tag and its open-pattern captures.
#[derive(Debug, Clone)]
pub struct TagNode<'a> {
    pub definition: Arc<TagDefinition>,
    pub captures: Captures,
    /// Whether one of the definition's argument groups took part in the match.
    pub has_argument: bool,
    /// Whole node: open marker through close marker for paired tags.
    pub span: Span,
    pub raw: &'a str,
}

/// A paired tag with the nodes found between its markers.
#[derive(Debug, Clone)]
pub struct PairedNode<'a> {
    pub tag: TagNode<'a>,
    /// The region strictly between the open and close markers.
    pub inner: Span,
    pub inner_raw: &'a str,
    pub children: Vec<Node<'a>>,
}

impl<'a> Node<'a> {
    pub fn span(&self) -> Span {
        match self {
            Node::Text(text) => text.span,
            Node::SelfClosing(tag) => tag.span,
            Node::Paired(paired) => paired.tag.span,
        }
    }

    /// The exact input text this node was built from.
    pub fn raw(&self) -> &'a str {
        match self {
            Node::Text(text) => text.text,
            Node::SelfClosing(tag) => tag.raw,
            Node::Paired(paired) => paired.tag.raw,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// The tag behind this node, if it is not text.
    pub fn tag(&self) -> Option<&TagNode<'a>> {
        match self {
            Node::Text(_) => None,
            Node::SelfClosing(tag) => Some(tag),
            Node::Paired(paired) => Some(&paired.tag),
        }
    }

    /// True for text and for nodes produced by an autodetecting definition.
    ///
    /// These are the only children a leaf-only tag accepts.
    pub fn is_leaf_content(&self) -> bool {
        match self.tag() {
            None => true,
            Some(tag) => tag.definition.capabilities().autodetect,
        }
    }

    pub fn children(&self) -> &[Node<'a>] {
        match self {
            Node::Paired(paired) => &paired.children,
            _ => &[],
        }
    }
}

/// Concatenates the raw source of text and autodetected children.
///
/// Fails with a nesting violation on the first child that is any other tag.
pub fn leaf_text(children: &[Node<'_>], tag_name: &str) -> Result<String, SoftError> {
    let mut out = String::new();
    for child in children {
        if !child.is_leaf_content() {
            return Err(SoftError::nesting(format!(
                "[{}] cannot contain nested tags here",
                tag_name
            )));
        }
        out.push_str(child.raw());
    }
    Ok(out)
}
