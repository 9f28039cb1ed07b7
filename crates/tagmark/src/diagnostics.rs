//! Soft failures and the diagnostics they leave behind.
//!
//! Nothing in this module aborts a parse. A [`SoftError`] returned by a render
//! behavior replaces that node's output with its raw source; the renderer
//! turns it into a [`Diagnostic`] and carries on with the siblings.

use std::fmt;

use crate::node::Span;

/// How loudly a diagnostic should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// What went wrong at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiagnosticKind {
    /// An open marker with no matching close marker.
    Unterminated,
    /// A tag that requires an argument was used without one.
    MissingArgument,
    /// Paired tags nested deeper than the parser allows.
    DepthExceeded,
    /// Nested tags where the tag's nesting policy forbids them.
    NestingViolation,
    /// Tag content that does not look like what the tag expects.
    InvalidContent,
    /// A resource existence check failed (network error, timeout, bad response).
    ResourceCheckFailed,
    /// A resource existence check confirmed the resource is missing.
    ResourceAbsent,
}

impl DiagnosticKind {
    /// The severity a diagnostic of this kind is recorded with.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::ResourceAbsent => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

/// A recorded, non-fatal problem together with the source it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    /// The offending raw markup.
    pub source: String,
}

impl Diagnostic {
    /// Creates a diagnostic with the default severity for `kind`.
    pub fn new(
        kind: DiagnosticKind,
        message: impl Into<String>,
        span: Span,
        source: impl Into<String>,
    ) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: message.into(),
            span,
            source: source.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity, self.span.start, self.span.end, self.message
        )
    }
}

/// A render behavior's request to give up on its own node.
///
/// The node is emitted as its raw source text and a diagnostic is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftError {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl SoftError {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Nested tags where the tag does not accept them.
    pub fn nesting(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::NestingViolation, message)
    }

    /// Content that fails the tag's own validation.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::InvalidContent, message)
    }

    /// A required argument is missing or unusable.
    pub fn missing_argument(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::MissingArgument, message)
    }
}

impl fmt::Display for SoftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SoftError {}
