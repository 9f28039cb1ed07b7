use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tagmark::{
    BBParser, Cancellation, Captures, DiagnosticKind, FromCaptures, Nesting, ProbeError, Registry,
    RenderContext, Severity, SoftError, TagDefinition, TagmarkError,
};

struct LinkArgs {
    href: Option<String>,
}

impl FromCaptures for LinkArgs {
    fn from_captures(captures: &Captures) -> Result<Self, SoftError> {
        Ok(Self {
            href: captures.non_empty("href").map(str::to_string),
        })
    }
}

fn parser() -> BBParser {
    let mut builder = Registry::builder();
    builder
        .register(
            TagDefinition::paired("b", r"\[b\]", r"\[/b\]")
                .render(|scope| Ok(format!("<b>{}</b>", scope.render_children())))
                .build()
                .unwrap(),
        )
        .register(
            TagDefinition::paired("link", r"\[link(=(?P<href>[^\]]+))?\]", r"\[/link\]")
                .nesting(Nesting::WithArgument)
                .render(|scope| {
                    let args: LinkArgs = scope.args()?;
                    match args.href {
                        Some(href) => {
                            let href = scope.resolve(&href);
                            let inner = scope.render_children_without_autodetect();
                            Ok(format!(r#"<a href="{}">{}</a>"#, href, inner))
                        }
                        None => {
                            let href = scope.resolve(&scope.leaf_content()?);
                            Ok(format!(r#"<a href="{0}">{0}</a>"#, href))
                        }
                    }
                })
                .build()
                .unwrap(),
        )
        .register(
            TagDefinition::paired("digits", r"\[digits\]", r"\[/digits\]")
                .nesting(Nesting::Never)
                .render(|scope| {
                    let content = scope.leaf_content()?;
                    if content.is_empty() || !content.chars().all(|c| c.is_ascii_digit()) {
                        return Err(SoftError::invalid_content("digits only"));
                    }
                    Ok(format!("<code>{}</code>", content))
                })
                .build()
                .unwrap(),
        )
        .register(
            TagDefinition::self_closing("pic", r":(?P<name>[a-z]+):")
                .render(|scope| {
                    let name = scope.captures().get("name").unwrap_or_default().to_string();
                    let url = scope.resolve(&format!("${{media}}{}.gif", name));
                    if scope.resource_exists(&url) {
                        Ok(format!(r#"<img src="{}" alt="{}" />"#, url, name))
                    } else {
                        Ok(scope.raw().to_string())
                    }
                })
                .build()
                .unwrap(),
        )
        .register(
            TagDefinition::self_closing("autolink", r"https?://[^\s\[\]]+")
                .autodetect()
                .render(|scope| Ok(format!(r#"<a href="{0}">{0}</a>"#, scope.raw())))
                .build()
                .unwrap(),
        );
    BBParser::new(builder.build().unwrap())
}

fn render(input: &str) -> tagmark::Rendered {
    parser().process(input, RenderContext::new()).unwrap()
}

// ==================== Identity Tests ====================

#[test]
fn plain_text_passes_through() {
    let rendered = render("nothing to see here, [not] a tag");
    assert_eq!(rendered.html, "nothing to see here, [not] a tag");
    assert!(rendered.diagnostics.is_empty());
}

// ==================== Nesting Tests ====================

#[test]
fn same_name_nesting_closes_at_matching_marker() {
    assert_eq!(render("[b][b]x[/b][/b]").html, "<b><b>x</b></b>");
    assert_eq!(render("[b]a[b]b[/b]c[/b]d").html, "<b>a<b>b</b>c</b>d");
}

#[test]
fn argument_form_permits_children() {
    let rendered = render("[link=http://a.com][b]x[/b][/link]");
    assert_eq!(rendered.html, r#"<a href="http://a.com"><b>x</b></a>"#);
    assert!(rendered.diagnostics.is_empty());
}

#[test]
fn bare_form_rejects_children() {
    let rendered = render("[link][b]x[/b][/link] after");
    assert_eq!(rendered.html, "[link][b]x[/b][/link] after");
    assert_eq!(rendered.diagnostics.len(), 1);
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::NestingViolation);
    assert_eq!(rendered.diagnostics[0].source, "[link][b]x[/b][/link]");
}

#[test]
fn bare_form_accepts_autodetected_child() {
    let rendered = render("[link]http://a.com[/link]");
    assert_eq!(rendered.html, r#"<a href="http://a.com">http://a.com</a>"#);
}

#[test]
fn autodetected_content_inside_link_stays_text() {
    let rendered = render("[link=http://a.com]see http://b.com[/link]");
    assert_eq!(rendered.html, r#"<a href="http://a.com">see http://b.com</a>"#);

    let rendered = render("[link=http://a.com][b]http://b.com[/b][/link] http://c.com");
    assert_eq!(
        rendered.html,
        r#"<a href="http://a.com"><b>http://b.com</b></a> <a href="http://c.com">http://c.com</a>"#
    );
    assert!(rendered.diagnostics.is_empty());
}

#[test]
fn autodetected_content_elsewhere_is_rendered() {
    assert_eq!(
        render("[b]http://b.com[/b]").html,
        r#"<b><a href="http://b.com">http://b.com</a></b>"#
    );
}

// ==================== Fallback Tests ====================

#[test]
fn content_validation_failure_keeps_source() {
    let rendered = render("[digits]12a[/digits] [digits]42[/digits]");
    assert_eq!(rendered.html, "[digits]12a[/digits] <code>42</code>");
    assert_eq!(rendered.diagnostics.len(), 1);
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::InvalidContent);
    assert_eq!(rendered.diagnostics[0].severity, Severity::Warning);
}

#[test]
fn unterminated_tag_keeps_source_from_open_marker() {
    let rendered = render("lead [b]bold text");
    assert_eq!(rendered.html, "lead [b]bold text");
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::Unterminated);
    assert_eq!(rendered.diagnostics[0].source, "[b]");
}

#[test]
fn failure_does_not_leak_into_siblings() {
    let rendered = render("[b]ok[/b][digits]x[/digits][b]ok[/b]");
    assert_eq!(rendered.html, "<b>ok</b>[digits]x[/digits]<b>ok</b>");
}

// ==================== Autodetect Tests ====================

#[test]
fn explicit_link_and_bare_url_stay_independent() {
    let rendered = render("[link=http://a.com]here[/link] and http://b.com");
    assert_eq!(
        rendered.html,
        r#"<a href="http://a.com">here</a> and <a href="http://b.com">http://b.com</a>"#
    );
}

// ==================== Variable Tests ====================

#[test]
fn variables_resolve_in_arguments() {
    let ctx = RenderContext::new().variable("home", "http://home.example");
    let rendered = parser().process("[link=${home}/x]go[/link]", ctx).unwrap();
    assert_eq!(rendered.html, r#"<a href="http://home.example/x">go</a>"#);
}

#[test]
fn unknown_variables_pass_through() {
    let rendered = render("[link=${nowhere}]go[/link]");
    assert_eq!(rendered.html, r#"<a href="${nowhere}">go</a>"#);
}

// ==================== Resource Tests ====================

#[test]
fn present_resource_renders_enhanced() {
    let ctx = RenderContext::new()
        .variable("media", "/m/")
        .with_probe(Arc::new(|_: &str| Ok::<_, ProbeError>(true)));
    let rendered = parser().process("hi :wave: there", ctx).unwrap();
    assert_eq!(rendered.html, r#"hi <img src="/m/wave.gif" alt="wave" /> there"#);
    assert!(rendered.diagnostics.is_empty());
}

#[test]
fn absent_resource_keeps_token() {
    let ctx = RenderContext::new()
        .variable("media", "/m/")
        .with_probe(Arc::new(|_: &str| Ok::<_, ProbeError>(false)));
    let rendered = parser().process(":wave:", ctx).unwrap();
    assert_eq!(rendered.html, ":wave:");
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::ResourceAbsent);
    assert_eq!(rendered.diagnostics[0].severity, Severity::Info);
}

#[test]
fn failed_check_keeps_token_and_is_distinguishable() {
    let ctx = RenderContext::new()
        .variable("media", "/m/")
        .with_probe(Arc::new(|_: &str| Err::<bool, _>(ProbeError::Timeout)));
    let rendered = parser().process(":wave:", ctx).unwrap();
    assert_eq!(rendered.html, ":wave:");
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::ResourceCheckFailed);
    assert_eq!(rendered.diagnostics[0].severity, Severity::Warning);
}

#[test]
fn missing_probe_is_a_failed_check() {
    let rendered = render(":wave:");
    assert_eq!(rendered.html, ":wave:");
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::ResourceCheckFailed);
}

#[test]
fn repeated_tokens_probe_once_per_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let probe = move |_: &str| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err::<bool, _>(ProbeError::Transport("refused".into()))
    };
    let ctx = RenderContext::new().with_probe(Arc::new(probe));
    let rendered = parser().process(":a: :a: :a:", ctx).unwrap();
    assert_eq!(rendered.html, ":a: :a: :a:");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(rendered.diagnostics.len(), 3);
}

// ==================== Cancellation Tests ====================

#[test]
fn cancellation_during_render_aborts() {
    let token = Cancellation::new();
    let trip = token.clone();
    let probe = move |_: &str| {
        trip.cancel();
        Ok::<_, ProbeError>(true)
    };
    let ctx = RenderContext::new()
        .with_probe(Arc::new(probe))
        .with_cancellation(token);
    let result = parser().process(":a: [b]more[/b]", ctx);
    assert!(matches!(result, Err(TagmarkError::Cancelled)));
}

// ==================== Registration Tests ====================

#[test]
fn invalid_pattern_fails_at_registration() {
    let err = TagDefinition::paired("broken", r"\[broken(", r"\[/broken\]")
        .build()
        .unwrap_err();
    assert!(matches!(err, TagmarkError::InvalidPattern { .. }));
}

#[test]
fn parsers_share_a_registry_across_threads() {
    let parser = parser();
    std::thread::scope(|scope| {
        for i in 0..4 {
            let parser = &parser;
            scope.spawn(move || {
                let input = format!("[b]{i}[/b]");
                let rendered = parser.process(&input, RenderContext::new()).unwrap();
                assert_eq!(rendered.html, format!("<b>{i}</b>"));
            });
        }
    });
}
