//! The parser front end: parse to a [`Document`], render it, or both at once.

use crate::context::{Cancellation, RenderContext};
use crate::diagnostics::Diagnostic;
use crate::error::{Result, TagmarkError};
use crate::node::Node;
use crate::registry::{self, Registry};
use crate::render::{Renderer, TextPolicy};
use crate::tree::TreeBuilder;

/// Paired tags nested deeper than this degrade to text.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parses and renders markup against a [`Registry`].
///
/// A parser is cheap to clone and holds no per-call state, so one instance
/// can serve any number of threads.
#[derive(Debug, Clone)]
pub struct BBParser {
    registry: Registry,
    text_policy: TextPolicy,
    max_depth: usize,
}

impl BBParser {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            text_policy: TextPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// A parser over the process-wide registry, if it has been initialized.
    pub fn global() -> Option<Self> {
        registry::global().cloned().map(Self::new)
    }

    /// Sets how literal text is written out.
    pub fn text_policy(mut self, policy: TextPolicy) -> Self {
        self.text_policy = policy;
        self
    }

    /// Sets the deepest allowed nesting of paired tags.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Builds the node tree for `input`.
    pub fn parse<'a>(&self, input: &'a str) -> Document<'a> {
        let built = TreeBuilder::new(&self.registry, input, self.max_depth).build();
        Document {
            input,
            nodes: built.nodes,
            diagnostics: built.diagnostics,
        }
    }

    /// Like [`parse`](Self::parse), stopping early once `cancellation` fires.
    pub fn parse_with<'a>(
        &self,
        input: &'a str,
        cancellation: &Cancellation,
    ) -> Result<Document<'a>> {
        if cancellation.is_cancelled() {
            return Err(TagmarkError::Cancelled);
        }
        let built = TreeBuilder::new(&self.registry, input, self.max_depth)
            .with_cancellation(cancellation)
            .build();
        if built.cancelled {
            return Err(TagmarkError::Cancelled);
        }
        Ok(Document {
            input,
            nodes: built.nodes,
            diagnostics: built.diagnostics,
        })
    }

    /// Renders a parsed document.
    ///
    /// The document's parse diagnostics are copied into `ctx` ahead of any
    /// raised while rendering.
    pub fn render(&self, document: &Document<'_>, ctx: &mut RenderContext) -> Result<String> {
        ctx.extend(document.diagnostics.iter().cloned());
        Renderer::new(ctx, self.text_policy).render(&document.nodes)
    }

    /// Parses and renders `input` in one call.
    ///
    /// # Example
    ///
    /// ```
    /// use tagmark::{BBParser, Registry, RenderContext, TagDefinition};
    ///
    /// let mut builder = Registry::builder();
    /// builder.register(
    ///     TagDefinition::paired("b", r"\[b\]", r"\[/b\]")
    ///         .render(|scope| Ok(format!("<strong>{}</strong>", scope.render_children())))
    ///         .build()
    ///         .unwrap(),
    /// );
    /// let parser = BBParser::new(builder.build().unwrap());
    ///
    /// let rendered = parser.process("[b]hi[/b] [b]open", RenderContext::new()).unwrap();
    /// assert_eq!(rendered.html, "<strong>hi</strong> [b]open");
    /// assert_eq!(rendered.diagnostics.len(), 1);
    /// ```
    pub fn process(&self, input: &str, mut ctx: RenderContext) -> Result<Rendered> {
        let document = self.parse_with(input, ctx.cancellation())?;
        let html = self.render(&document, &mut ctx)?;
        Ok(Rendered {
            html,
            diagnostics: ctx.take_diagnostics(),
        })
    }
}

/// A parsed input: top-level nodes whose spans tile the input exactly.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub input: &'a str,
    pub nodes: Vec<Node<'a>>,
    /// Structural problems found while parsing.
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Document<'a> {
    /// Walks every node depth-first, pre-order.
    pub fn walk(&self) -> impl Iterator<Item = &Node<'a>> {
        let mut stack: Vec<&Node<'a>> = self.nodes.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev());
            Some(node)
        })
    }
}

/// The result of [`BBParser::process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}
