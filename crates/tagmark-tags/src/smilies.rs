//! Smilies: `:name:` images and the classic text emoticons.
//!
//! Every smilie is an image under the configured media prefix. It is only
//! shown when the image exists; otherwise the token stays as typed.

use html_escape::encode_double_quoted_attribute;
use tagmark::{RegistryBuilder, Result, TagDefinition, TagScope};

use crate::config::TagsConfig;
use crate::web::encode_href;

/// Image alias and the pattern of tokens drawn with it.
///
/// Tokens ending in a letter must be followed by a non-word character so
/// `:data` or `xDream` stay text.
pub const EMOTICONS: &[(&str, &str)] = &[
    // :D, :-D, :d, :-d
    ("lol", r":-?[Dd]\b"),
    // :), :-)
    ("smilie", r":-?\)"),
    // ;), ;-), ;D, ;-D, ;d, ;-d
    ("wink", r";-?(?:\)|[Dd]\b)"),
    // :P, :-P, :p, :-p
    ("razz", r":-?[Pp]\b"),
    // o_O, 0_0, O_o, ...
    ("eek", r"[oO0]_[oO0]\b"),
    // :(, :-(
    ("sad", r":-?\("),
    // ;_;, :'(, :'-(
    ("crying", r";_;|:'-?\("),
    // ^.^
    ("yell", r"\^\.\^"),
    // xD, XD, *g*
    ("grin", r"[xX]D\b|\*g\*"),
    // :|, :-|
    ("neutral", r":-?\|"),
];

pub fn register(builder: &mut RegistryBuilder, config: &TagsConfig) -> Result<()> {
    let media = config.media_url.clone();
    builder.register(
        TagDefinition::self_closing("smilies", r":(?P<name>[a-zA-Z-]+):")
            .label("Smilie")
            .render(move |scope| {
                let name = scope.captures().get("name").unwrap_or_default().to_string();
                Ok(smilie(scope, &media, &name, &name))
            })
            .build()?,
    );

    for &(alias, pattern) in EMOTICONS {
        let media = config.media_url.clone();
        builder.register(
            TagDefinition::self_closing(alias, pattern)
                .label("Smilie")
                .render(move |scope| {
                    let token = scope.raw().to_string();
                    Ok(smilie(scope, &media, alias, &token))
                })
                .build()?,
        );
    }
    Ok(())
}

/// The `<img>` for `image` when it exists, the token as text otherwise.
fn smilie(scope: &mut TagScope<'_, '_>, media: &str, image: &str, alt: &str) -> String {
    let url = scope.resolve(&format!("{media}{image}.gif"));
    if scope.resource_exists(&url) {
        format!(
            r#"<img src="{}" alt="{}" />"#,
            encode_href(&url),
            encode_double_quoted_attribute(alt)
        )
    } else {
        scope.text_policy().apply(scope.raw()).into_owned()
    }
}
