//! Inline formatting: `[b]`, `[i]`, `[u]` and `[s]`.

use tagmark::{RegistryBuilder, Result, TagDefinition};

/// Tag name, label and the HTML element it renders to.
const FORMATS: &[(&str, &str, &str)] = &[
    ("b", "Bold", "strong"),
    ("i", "Italic", "em"),
    ("u", "Underline", "u"),
    ("s", "Strikethrough", "del"),
];

pub fn register(builder: &mut RegistryBuilder) -> Result<()> {
    for &(name, label, element) in FORMATS {
        let definition = TagDefinition::paired(
            name,
            format!(r"(?i)\[{name}\]"),
            format!(r"(?i)\[/{name}\]"),
        )
        .label(label)
        .render(move |scope| Ok(format!("<{element}>{}</{element}>", scope.render_children())))
        .build()?;
        builder.register(definition);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagmark::{BBParser, Registry, RenderContext};

    fn render(input: &str) -> String {
        let mut builder = Registry::builder();
        register(&mut builder).unwrap();
        let parser = BBParser::new(builder.build().unwrap());
        parser.process(input, RenderContext::new()).unwrap().html
    }

    #[test]
    fn each_format_renders_its_element() {
        assert_eq!(render("[b]x[/b]"), "<strong>x</strong>");
        assert_eq!(render("[i]x[/i]"), "<em>x</em>");
        assert_eq!(render("[u]x[/u]"), "<u>x</u>");
        assert_eq!(render("[s]x[/s]"), "<del>x</del>");
    }

    #[test]
    fn markers_are_case_insensitive() {
        assert_eq!(render("[B]x[/b]"), "<strong>x</strong>");
    }

    #[test]
    fn formats_nest() {
        assert_eq!(
            render("[b]a [i]b [u]c[/u][/i][/b]"),
            "<strong>a <em>b <u>c</u></em></strong>"
        );
    }
}
