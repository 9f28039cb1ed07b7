//! Property-based tests for tagmark using proptest.

use proptest::prelude::*;
use tagmark::{BBParser, Node, Registry, RenderContext, TagDefinition, TextPolicy, Variables};

// ============================================================================
// Test helpers
// ============================================================================

fn parser() -> BBParser {
    let mut builder = Registry::builder();
    for name in ["b", "i"] {
        builder.register(
            TagDefinition::paired(
                name,
                format!(r"\[{}\]", name),
                format!(r"\[/{}\]", name),
            )
            .render(|scope| {
                let name = scope.name().to_string();
                Ok(format!("<{0}>{1}</{0}>", name, scope.render_children()))
            })
            .build()
            .unwrap(),
        );
    }
    BBParser::new(builder.build().unwrap())
}

fn assert_tiles(nodes: &[Node<'_>], start: usize, end: usize) -> Result<(), TestCaseError> {
    let mut pos = start;
    for node in nodes {
        prop_assert_eq!(node.span().start, pos);
        if let Node::Paired(paired) = node {
            prop_assert!(paired.inner.start > node.span().start);
            prop_assert!(paired.inner.end < node.span().end);
            assert_tiles(&paired.children, paired.inner.start, paired.inner.end)?;
        }
        pos = node.span().end;
    }
    prop_assert_eq!(pos, end);
    Ok(())
}

// Plain text never contains an open marker.
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?:;'\"<>&é✓]{0,60}"
}

// Markup fragments that are often malformed.
fn fragments() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("[b]".to_string()),
            Just("[/b]".to_string()),
            Just("[i]".to_string()),
            Just("[/i]".to_string()),
            Just("[".to_string()),
            "[a-z ]{1,5}",
        ],
        0..20,
    )
    .prop_map(|parts| parts.concat())
}

// Well-formed same-name nesting around a word.
fn nested_bold() -> impl Strategy<Value = (usize, String)> {
    (1usize..8, "[a-z]{1,8}")
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Text without open markers renders to itself.
    #[test]
    fn plain_text_is_identity(content in plain_text()) {
        let rendered = parser().process(&content, RenderContext::new()).unwrap();
        prop_assert_eq!(&rendered.html, &content);
        prop_assert!(rendered.diagnostics.is_empty());
    }

    /// Under the escape policy plain text renders to its escaped form.
    #[test]
    fn plain_text_escapes_exactly(content in plain_text()) {
        let parser = parser().text_policy(TextPolicy::Escape);
        let rendered = parser.process(&content, RenderContext::new()).unwrap();
        prop_assert_eq!(rendered.html, html_escape::encode_text(&content).into_owned());
    }

    /// Top-level spans tile the input and children tile their parent's inner span.
    #[test]
    fn spans_tile_input(input in fragments()) {
        let document = parser().parse(&input);
        assert_tiles(&document.nodes, 0, input.len())?;
    }

    /// The inner close marker never closes the outer tag.
    #[test]
    fn same_name_nesting_is_balanced((depth, word) in nested_bold()) {
        let input = format!("{}{}{}", "[b]".repeat(depth), word, "[/b]".repeat(depth));
        let rendered = parser().process(&input, RenderContext::new()).unwrap();
        let expected = format!("{}{}{}", "<b>".repeat(depth), word, "</b>".repeat(depth));
        prop_assert_eq!(rendered.html, expected);
    }

    /// Resolving already-resolved text changes nothing.
    #[test]
    fn resolution_is_idempotent(
        name in "[a-z]{1,6}",
        value in "[a-zA-Z0-9/:.]{0,20}",
        prefix in "[a-z ]{0,10}",
    ) {
        let mut variables = Variables::new();
        variables.insert(name.clone(), value);
        let once = variables.resolve(&format!("{}${{{}}}", prefix, name)).into_owned();
        let twice = variables.resolve(&once).into_owned();
        prop_assert_eq!(once, twice);
    }
}
