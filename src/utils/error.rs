//! Error handling for structret

use std::path::PathBuf;

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Scanner error
///
/// Only front-end failures exist here. Resolution problems never surface
/// as errors; they degrade to a non-structural classification.
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ==================== Parser Errors ====================

    #[error("unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("expected identifier, got {got}")]
    ExpectedIdent { got: String, span: Span },

    #[error("expected type, got {got}")]
    ExpectedType { got: String, span: Span },

    #[error("unbalanced {open}: reached end of file")]
    Unbalanced { open: String, span: Span },

    #[error("invalid character {0:?}")]
    InvalidChar(char, Span),

    #[error("unterminated {what}")]
    Unterminated { what: String, span: Span },

    // ==================== Loader Errors ====================

    #[error("{}:{line}:{column}: {message}", file.display())]
    Syntax {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("cannot read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("cannot walk directory tree: {0}")]
    Walk(String),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::ExpectedIdent { span, .. } => Some(*span),
            Self::ExpectedType { span, .. } => Some(*span),
            Self::Unbalanced { span, .. } => Some(*span),
            Self::InvalidChar(_, span) => Some(*span),
            Self::Unterminated { span, .. } => Some(*span),
            Self::Syntax { .. } | Self::Io { .. } | Self::Walk(_) => None,
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io { path: path.into(), message: err.to_string() }
    }
}
