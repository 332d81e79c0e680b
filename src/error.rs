//! Crate-level error taxonomy.
//!
//! Mirrors the propagation policy: the analyzer is pure and never errors; the
//! loader wraps any resolution failure in [`LoadSymbolError`]; the
//! auto-importer absorbs and logs import failures rather than raising; the
//! auto-evaluator is transparent except for its own auto-flag retry.

use std::fmt;

use crate::runtime::RuntimeError;

/// Errors that can surface from the core across its public entry points.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("syntax error in source fragment: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("failed to load import database from {path}: {source}")]
    ImportDbLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// A parse failure that persisted after any `auto_flags` retry.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub message: String,
    pub offset: u32,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.offset)
    }
}

impl std::error::Error for SyntaxError {}

/// Raised by the symbol loader for any dotted path that could not be
/// resolved, or any exception thrown during attribute resolution. Always
/// chains the underlying cause so callers can walk it with
/// `std::error::Error::source`.
#[derive(Debug, thiserror::Error)]
#[error("could not load symbol '{path}'")]
pub struct LoadSymbolError {
    pub path: String,
    #[source]
    pub cause: Box<CoreError>,
}

impl LoadSymbolError {
    pub fn new(path: impl Into<String>, cause: CoreError) -> Self {
        Self {
            path: path.into(),
            cause: Box::new(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_symbol_error_chains_cause() {
        use std::error::Error;
        let inner = RuntimeError::NotFound("os.nonesuch".into());
        let err = LoadSymbolError::new("os.nonesuch", CoreError::Runtime(inner));
        assert!(err.source().is_some());
        assert_eq!(err.path, "os.nonesuch");
    }

    #[test]
    fn test_syntax_error_display() {
        let e = SyntaxError {
            message: "unexpected token".into(),
            offset: 12,
        };
        assert_eq!(e.to_string(), "unexpected token (at byte 12)");
    }
}
