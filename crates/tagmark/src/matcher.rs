//! Picks the tag (if any) that starts at a scan position.
//!
//! Every open pattern is tried anchored at the position, never searching
//! ahead. When several match, candidates are ranked:
//!
//! 1. explicit tags before autodetected content,
//! 2. the argument form of a tag before its bare form,
//! 3. earlier registration before later.
//!
//! A paired candidate only wins if its close marker can be found inside the
//! enclosing region. Same-named open markers in between raise the nesting
//! depth, so `[b][b]x[/b][/b]` closes the outer tag at the last marker.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::capture::Captures;
use crate::definition::TagDefinition;
use crate::node::Span;
use crate::registry::Registry;

/// One definition's open-pattern match at the current position.
#[derive(Debug, Clone)]
pub(crate) struct OpenMatch {
    pub index: usize,
    pub definition: Arc<TagDefinition>,
    pub captures: Captures,
    pub has_argument: bool,
    /// Absolute byte range of the open marker.
    pub span: Span,
}

impl OpenMatch {
    fn rank(&self) -> (bool, bool, usize) {
        (
            self.definition.capabilities().autodetect,
            !self.has_argument,
            self.index,
        )
    }
}

/// What the matcher decided at a position.
#[derive(Debug)]
pub(crate) enum Decision {
    SelfClosing(OpenMatch),
    Paired { open: OpenMatch, close: Span },
    /// Only paired candidates matched and none of them is closed.
    Unterminated(OpenMatch),
}

pub(crate) struct Matcher<'r> {
    registry: &'r Registry,
    /// Close-marker cursors per definition index and region end, shared by
    /// every search over the same input.
    closes: HashMap<(usize, usize), Cursor<'r>>,
}

impl<'r> Matcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            closes: HashMap::new(),
        }
    }

    /// Decides what starts at `pos`, looking no further than `end`.
    pub fn decide(&mut self, input: &str, pos: usize, end: usize) -> Option<Decision> {
        let mut candidates = self.open_matches(&input[pos..end], pos);
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by_key(OpenMatch::rank);

        let mut unterminated = None;
        for candidate in candidates {
            if candidate.definition.is_self_closing() {
                tracing::trace!(tag = candidate.definition.name(), pos, "self-closing match");
                return Some(Decision::SelfClosing(candidate));
            }
            match self.find_close(input, &candidate, end) {
                Some(close) => {
                    tracing::trace!(tag = candidate.definition.name(), pos, "paired match");
                    return Some(Decision::Paired {
                        open: candidate,
                        close,
                    });
                }
                None => {
                    if unterminated.is_none() {
                        unterminated = Some(candidate);
                    }
                }
            }
        }
        unterminated.map(Decision::Unterminated)
    }

    /// All non-empty anchored open matches at the start of `window`.
    fn open_matches(&self, window: &str, offset: usize) -> Vec<OpenMatch> {
        self.registry
            .candidates(window)
            .into_iter()
            .filter_map(|index| {
                let definition = self.registry.get(index)?;
                let captures = Captures::capture(definition.open_anchored(), window)?;
                if captures.whole().is_empty() {
                    return None;
                }
                let has_argument = definition.has_argument(&captures);
                let span = Span::new(offset, offset + captures.whole().len());
                Some(OpenMatch {
                    index,
                    definition: Arc::clone(definition),
                    captures,
                    has_argument,
                    span,
                })
            })
            .collect()
    }

    /// Finds the close marker balancing `open`, tracking same-name depth.
    ///
    /// Each pattern's next match is searched for once and reused until the
    /// scan moves past its start, so one call is linear in the region.
    fn find_close(&mut self, input: &str, open: &OpenMatch, end: usize) -> Option<Span> {
        let registry: &'r Registry = self.registry;
        let definition = registry.get(open.index)?;
        let close = definition.close_pattern()?;
        let haystack = &input[..end];
        let mut nested: Vec<Cursor<'r>> = registry
            .named(definition.name())
            .filter(|definition| !definition.is_self_closing())
            .map(|definition| Cursor::new(definition.open_pattern()))
            .collect();
        let closes = self
            .closes
            .entry((open.index, end))
            .or_insert_with(|| Cursor::new(close));

        let mut depth = 1usize;
        let mut pos = open.span.end;
        loop {
            let close_match = closes.seek(haystack, pos)?;
            let inner = nested
                .iter_mut()
                .filter_map(|cursor| cursor.seek(haystack, pos))
                .filter(|m| m.start < close_match.start)
                .min_by_key(|m| m.start);

            match inner {
                Some(inner) => {
                    depth += 1;
                    pos = inner.end;
                }
                None => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(close_match);
                    }
                    pos = close_match.end;
                }
            }
        }
    }
}

/// The next non-empty match of one pattern at or after a moving position.
struct Cursor<'p> {
    pattern: &'p Regex,
    /// Position of the last search; `None` means not searched yet.
    from: Option<usize>,
    next: Option<Span>,
}

impl<'p> Cursor<'p> {
    fn new(pattern: &'p Regex) -> Self {
        Self {
            pattern,
            from: None,
            next: None,
        }
    }

    /// The first non-empty match starting at or after `pos`.
    ///
    /// A cached answer is reused when `pos` lies between the last search
    /// and the cached match, including a cached miss.
    fn seek(&mut self, haystack: &str, pos: usize) -> Option<Span> {
        let stale = match (self.from, self.next) {
            (None, _) => true,
            (Some(from), _) if pos < from => true,
            (_, Some(next)) => next.start < pos,
            (_, None) => false,
        };
        if stale {
            self.next = find_non_empty(self.pattern, haystack, pos);
            self.from = Some(pos);
        }
        self.next
    }
}

fn find_non_empty(pattern: &Regex, haystack: &str, mut pos: usize) -> Option<Span> {
    while pos <= haystack.len() {
        let m = pattern.find_at(haystack, pos)?;
        if !m.is_empty() {
            return Some(Span::new(m.start(), m.end()));
        }
        pos = m.start() + haystack[m.start()..].chars().next()?.len_utf8();
    }
    None
}
