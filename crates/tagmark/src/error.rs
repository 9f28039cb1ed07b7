//! Error types for the tagmark crate.
//!
//! Malformed markup never produces one of these: it degrades to literal text
//! and a [`Diagnostic`](crate::Diagnostic). These errors are reserved for
//! broken tag definitions (caught at registration) and caller cancellation.

use thiserror::Error;

/// Which of a definition's patterns failed to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternRole {
    Open,
    Close,
}

impl std::fmt::Display for PatternRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternRole::Open => f.write_str("open"),
            PatternRole::Close => f.write_str("close"),
        }
    }
}

/// Errors raised while building tag definitions or running the engine.
#[derive(Debug, Error)]
pub enum TagmarkError {
    /// A tag definition supplied a pattern the regex engine rejects.
    #[error("tag '{tag}' has an invalid {role} pattern: {source}")]
    InvalidPattern {
        tag: String,
        role: PatternRole,
        #[source]
        source: regex::Error,
    },

    /// A tag definition was built without a name.
    #[error("tag definition has an empty name")]
    EmptyName,

    /// An argument group names a capture the open pattern does not define.
    #[error("tag '{tag}' declares argument group '{group}' which its open pattern does not capture")]
    UnknownArgumentGroup { tag: String, group: String },

    /// The combined open-pattern prefilter could not be compiled.
    #[error("failed to build the open-pattern prefilter: {0}")]
    Prefilter(#[source] regex::Error),

    /// The caller cancelled the parse or render.
    #[error("rendering was cancelled")]
    Cancelled,
}

/// Result type for tagmark operations.
pub type Result<T> = std::result::Result<T, TagmarkError>;
