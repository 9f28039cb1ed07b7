//! Turns the matcher's decisions into a node tree.
//!
//! The builder scans a region left to right. Unmatched characters extend
//! the running text node; matched tags flush it. Paired tags recurse into
//! the region between their markers. Anything that cannot stand as a tag
//! (unterminated, missing argument, forbidden nesting, too deep) is folded
//! back into the running text unchanged, so the spans of the returned nodes
//! always tile the region exactly.

use crate::context::Cancellation;
use crate::definition::Nesting;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::matcher::{Decision, Matcher, OpenMatch};
use crate::node::{Node, PairedNode, Span, TagNode, TextNode};
use crate::registry::Registry;

/// What a tree build produced.
pub(crate) struct Built<'a> {
    pub nodes: Vec<Node<'a>>,
    pub diagnostics: Vec<Diagnostic>,
    pub cancelled: bool,
}

pub(crate) struct TreeBuilder<'r, 'a> {
    matcher: Matcher<'r>,
    input: &'a str,
    max_depth: usize,
    cancellation: Option<&'r Cancellation>,
    diagnostics: Vec<Diagnostic>,
    cancelled: bool,
}

/// What to do with a decision once policy has been applied.
enum Placement<'a> {
    Node(Node<'a>),
    /// Keep the source as literal text.
    Literal,
}

impl<'r, 'a> TreeBuilder<'r, 'a> {
    pub fn new(registry: &'r Registry, input: &'a str, max_depth: usize) -> Self {
        Self {
            matcher: Matcher::new(registry),
            input,
            max_depth,
            cancellation: None,
            diagnostics: Vec::new(),
            cancelled: false,
        }
    }

    pub fn with_cancellation(mut self, cancellation: &'r Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn build(mut self) -> Built<'a> {
        let nodes = self.build_region(0, self.input.len(), 0);
        Built {
            nodes,
            diagnostics: self.diagnostics,
            cancelled: self.cancelled,
        }
    }

    fn check_cancelled(&mut self) -> bool {
        if !self.cancelled {
            self.cancelled = self.cancellation.is_some_and(Cancellation::is_cancelled);
        }
        self.cancelled
    }

    fn build_region(&mut self, start: usize, end: usize, depth: usize) -> Vec<Node<'a>> {
        let mut nodes = Vec::new();
        let mut text_start = start;
        let mut pos = start;

        while pos < end {
            let Some(decision) = self.matcher.decide(self.input, pos, end) else {
                pos += self.input[pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                continue;
            };
            if self.check_cancelled() {
                break;
            }

            let (placement, next) = self.place(decision, depth);
            if let Placement::Node(node) = placement {
                self.push_text(&mut nodes, text_start, pos);
                nodes.push(node);
                text_start = next;
            }
            pos = next;
        }

        self.push_text(&mut nodes, text_start, end);
        nodes
    }

    fn place(&mut self, decision: Decision, depth: usize) -> (Placement<'a>, usize) {
        match decision {
            Decision::Unterminated(open) => {
                let end = open.span.end;
                self.record(
                    DiagnosticKind::Unterminated,
                    format!(
                        "[{}] has no closing marker; kept as text",
                        open.definition.name()
                    ),
                    open.span,
                );
                (Placement::Literal, end)
            }
            Decision::SelfClosing(open) => {
                let end = open.span.end;
                if self.missing_argument(&open, open.span) {
                    return (Placement::Literal, end);
                }
                let span = open.span;
                let tag = self.tag_node(open, span);
                (Placement::Node(Node::SelfClosing(tag)), end)
            }
            Decision::Paired { open, close } => {
                let span = Span::new(open.span.start, close.end);
                if self.missing_argument(&open, span) {
                    return (Placement::Literal, close.end);
                }
                if depth >= self.max_depth {
                    self.record(
                        DiagnosticKind::DepthExceeded,
                        format!(
                            "[{}] is nested deeper than {} levels; kept as text",
                            open.definition.name(),
                            self.max_depth
                        ),
                        span,
                    );
                    return (Placement::Literal, close.end);
                }

                let inner = Span::new(open.span.end, close.start);
                let children = self.build_region(inner.start, inner.end, depth + 1);

                let capabilities = open.definition.capabilities();
                if !capabilities.allows_nested_tags(open.has_argument)
                    && children.iter().any(|child| !child.is_leaf_content())
                {
                    let reason = if capabilities.nesting == Nesting::Never {
                        "cannot contain nested tags"
                    } else {
                        "cannot contain nested tags without an argument"
                    };
                    self.record(
                        DiagnosticKind::NestingViolation,
                        format!("[{}] {}; kept as text", open.definition.name(), reason),
                        span,
                    );
                    return (Placement::Literal, close.end);
                }

                let input = self.input;
                let tag = self.tag_node(open, span);
                let node = PairedNode {
                    tag,
                    inner,
                    inner_raw: &input[inner.range()],
                    children,
                };
                (Placement::Node(Node::Paired(node)), close.end)
            }
        }
    }

    fn missing_argument(&mut self, open: &OpenMatch, span: Span) -> bool {
        if !open.definition.capabilities().requires_argument || open.has_argument {
            return false;
        }
        self.record(
            DiagnosticKind::MissingArgument,
            format!(
                "[{}] requires an argument; kept as text",
                open.definition.name()
            ),
            span,
        );
        true
    }

    fn tag_node(&self, open: OpenMatch, span: Span) -> TagNode<'a> {
        let input = self.input;
        TagNode {
            definition: open.definition,
            captures: open.captures,
            has_argument: open.has_argument,
            span,
            raw: &input[span.range()],
        }
    }

    fn push_text(&self, nodes: &mut Vec<Node<'a>>, start: usize, end: usize) {
        let input = self.input;
        if start < end {
            nodes.push(Node::Text(TextNode {
                span: Span::new(start, end),
                text: &input[start..end],
            }));
        }
    }

    fn record(&mut self, kind: DiagnosticKind, message: String, span: Span) {
        self.diagnostics.push(Diagnostic::new(
            kind,
            message,
            span,
            &self.input[span.range()],
        ));
    }
}
