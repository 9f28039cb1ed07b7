//! Links, images, e-mail addresses, video embeds and bare URLs.
//!
//! Usage:
//!
//! ```text
//! [url]http://www.domain.com[/url]
//! [url=http://www.domain.com]Text[/url]
//! [url href="http://www.domain.com" css="big,red"]Text[/url]
//! [email]name@domain.com[/email]
//! [email=name@domain.com]Text[/email]
//! [img]http://www.domain.com/image.jpg[/img]
//! [img=left]http://www.domain.com/image.jpg[/img]
//! [youtube]FjPf6B8EVJI[/youtube]
//! [dailymotion]xtg9f[/dailymotion]
//! ```
//!
//! Bare `http(s)://` and `ftp(s)://` URLs in text become links too, unless an
//! explicit tag claims them first.

use std::fmt;
use std::str::FromStr;

use html_escape::encode_double_quoted_attribute;
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use tagmark::{
    Captures, FromCaptures, Nesting, RegistryBuilder, Result, SoftError, TagDefinition, TagScope,
};

/// Characters that cannot appear raw in an `href`. `%` is left alone so
/// already-encoded URLs pass through unchanged.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'\\')
    .add(b'^')
    .add(b'{')
    .add(b'|')
    .add(b'}');

static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i:https?://)?(?i:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:\S*&)?v=|embed/|v/)|youtu\.be/)([A-Za-z0-9_-]+)(?:[?&#]\S*)?$",
    )
    .expect("youtube url pattern is valid")
});

static DAILYMOTION_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:https?://)?(?i:www\.)?(?:dailymotion\.com/(?:embed/)?video/|dai\.ly/)([A-Za-z0-9]+)(?:_[\w-]*)?(?:[?#]\S*)?$")
        .expect("dailymotion url pattern is valid")
});

static YOUTUBE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("youtube id pattern is valid"));

static DAILYMOTION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("dailymotion id pattern is valid"));

/// Percent-encodes the characters of `url` that would break an attribute.
pub fn encode_href(url: &str) -> String {
    utf8_percent_encode(url, HREF).to_string()
}

pub fn register(builder: &mut RegistryBuilder) -> Result<()> {
    builder
        .register(url()?)
        .register(img()?)
        .register(email()?)
        .register(youtube()?)
        .register(dailymotion()?)
        .register(autodetect_url()?);
    Ok(())
}

// ============================================================================
// [url]
// ============================================================================

/// Arguments of a `[url]` open marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlArgs {
    pub href: Option<String>,
    /// Comma-separated CSS classes.
    pub css: Option<String>,
}

impl FromCaptures for UrlArgs {
    fn from_captures(captures: &Captures) -> std::result::Result<Self, SoftError> {
        let mut args = UrlArgs {
            href: captures.non_empty("href").map(str::to_string),
            css: None,
        };
        for (name, value) in [("arg1", "val1"), ("arg2", "val2")] {
            let (Some(name), Some(value)) = (captures.non_empty(name), captures.get(value)) else {
                continue;
            };
            match name.to_ascii_lowercase().as_str() {
                "href" => args.href = Some(value.to_string()),
                "css" => args.css = Some(value.to_string()),
                other => {
                    return Err(SoftError::invalid_content(format!(
                        "[url] has no attribute '{other}'"
                    )))
                }
            }
        }
        Ok(args)
    }
}

fn url() -> Result<TagDefinition> {
    TagDefinition::paired(
        "url",
        r#"(?i)\[url(?:="?(?P<href>[^\]"]+)"?| (?P<arg1>\w+)="?(?P<val1>[^ "\]]+)"?(?: (?P<arg2>\w+)="?(?P<val2>[^ "\]]+)"?)?)?\]"#,
        r"(?i)\[/url\]",
    )
    .label("Link")
    .nesting(Nesting::WithArgument)
    .argument_groups(["href", "arg1"])
    .render(render_url)
    .build()
}

fn render_url(scope: &mut TagScope<'_, '_>) -> std::result::Result<String, SoftError> {
    let args: UrlArgs = scope.args()?;
    let (href, inner) = match args.href {
        Some(href) => (
            scope.resolve(&href),
            scope.render_children_without_autodetect(),
        ),
        None => {
            let href = scope.resolve(scope.leaf_content()?.trim());
            let inner = scope.text_policy().apply(&href).into_owned();
            (href, inner)
        }
    };
    if href.is_empty() {
        return Err(SoftError::invalid_content("[url] has no target"));
    }

    let class = match args.css {
        Some(css) => format!(
            r#" class="{}""#,
            encode_double_quoted_attribute(&scope.resolve(&css).replace(',', " "))
        ),
        None => String::new(),
    };
    Ok(format!(r#"<a href="{}"{}>{}</a>"#, encode_href(&href), class, inner))
}

// ============================================================================
// [img]
// ============================================================================

/// Horizontal placement of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl FromStr for Align {
    type Err = SoftError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            other => Err(SoftError::invalid_content(format!(
                "'{other}' is not an image alignment (left, center, right)"
            ))),
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImgArgs {
    pub align: Option<Align>,
}

impl FromCaptures for ImgArgs {
    fn from_captures(captures: &Captures) -> std::result::Result<Self, SoftError> {
        let align = captures.get("align").map(str::parse::<Align>).transpose()?;
        Ok(ImgArgs { align })
    }
}

fn img() -> Result<TagDefinition> {
    TagDefinition::paired(
        "img",
        r"(?i)\[img(?:=(?P<align>[^\]]*))?\]",
        r"(?i)\[/img\]",
    )
    .label("Image")
    .nesting(Nesting::Never)
    .render(render_img)
    .build()
}

fn render_img(scope: &mut TagScope<'_, '_>) -> std::result::Result<String, SoftError> {
    let args: ImgArgs = scope.args()?;
    let src = scope.resolve(scope.leaf_content()?.trim());
    if src.is_empty() {
        return Err(SoftError::invalid_content("[img] has no source"));
    }
    let src = encode_href(&src);
    Ok(match args.align {
        Some(align) => format!(r#"<img src="{src}" alt="image" class="img-{align}" />"#),
        None => format!(r#"<img src="{src}" alt="image" />"#),
    })
}

// ============================================================================
// [email]
// ============================================================================

fn email() -> Result<TagDefinition> {
    TagDefinition::paired(
        "email",
        r"(?i)\[email(?:=(?P<mail>[^\]]+))?\]",
        r"(?i)\[/email\]",
    )
    .label("E-Mail")
    .nesting(Nesting::WithArgument)
    .render(render_email)
    .build()
}

fn render_email(scope: &mut TagScope<'_, '_>) -> std::result::Result<String, SoftError> {
    let (address, inner) = match scope.captures().non_empty("mail").map(str::to_string) {
        Some(mail) => (
            scope.resolve(mail.trim()),
            scope.render_children_without_autodetect(),
        ),
        None => {
            let address = scope.resolve(scope.leaf_content()?.trim());
            let inner = scope.text_policy().apply(&address).into_owned();
            (address, inner)
        }
    };
    if address.is_empty() || address.contains(char::is_whitespace) {
        return Err(SoftError::invalid_content(format!(
            "'{address}' is not an e-mail address"
        )));
    }
    Ok(format!(
        r#"<a href="mailto:{}">{}</a>"#,
        encode_double_quoted_attribute(&address),
        inner
    ))
}

// ============================================================================
// Video embeds
// ============================================================================

/// Finds the video id in tag content: either the bare id or a provider URL.
fn video_id<'c>(content: &'c str, id: &Regex, url: &Regex) -> Option<&'c str> {
    if id.is_match(content) {
        return Some(content);
    }
    url.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn youtube() -> Result<TagDefinition> {
    TagDefinition::paired("youtube", r"(?i)\[youtube\]", r"(?i)\[/youtube\]")
        .label("Youtube")
        .nesting(Nesting::Never)
        .render(|scope| {
            let content = scope.leaf_content()?;
            let id = video_id(content.trim(), &YOUTUBE_ID, &YOUTUBE_URL).ok_or_else(|| {
                SoftError::invalid_content(format!(
                    "'{}' does not seem like a youtube link",
                    content.trim()
                ))
            })?;
            Ok(format!(
                r#"<iframe width="560" height="315" src="https://www.youtube.com/embed/{id}" frameborder="0" allowfullscreen></iframe>"#
            ))
        })
        .build()
}

fn dailymotion() -> Result<TagDefinition> {
    TagDefinition::paired("dailymotion", r"(?i)\[dailymotion\]", r"(?i)\[/dailymotion\]")
        .label("Dailymotion")
        .nesting(Nesting::Never)
        .render(|scope| {
            let content = scope.leaf_content()?;
            let id = video_id(content.trim(), &DAILYMOTION_ID, &DAILYMOTION_URL).ok_or_else(
                || {
                    SoftError::invalid_content(format!(
                        "'{}' does not seem like a dailymotion id",
                        content.trim()
                    ))
                },
            )?;
            Ok(format!(
                r#"<iframe frameborder="0" width="480" height="360" src="https://www.dailymotion.com/embed/video/{id}"></iframe>"#
            ))
        })
        .build()
}

// ============================================================================
// Bare URLs
// ============================================================================

fn autodetect_url() -> Result<TagDefinition> {
    TagDefinition::self_closing(
        "autodetect_url",
        r"(?i)(?:ht|f)tps?://[-\w.]+(?::\d+)?(?:/[\w/.,~%+=&-]*(?:\?[^\s\[\]]+)?)?",
    )
    .label("Link")
    .autodetect()
    .render(|scope| {
        let url = scope.raw().to_string();
        Ok(format!(
            r#"<a href="{}">{}</a>"#,
            encode_href(&url),
            scope.text_policy().apply(&url)
        ))
    })
    .build()
}
