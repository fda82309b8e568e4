//! Unified error type for the bramble library.
//!
//! Library code returns `BrambleError`; the CLI layer wraps results with
//! `anyhow` for convenience. Every failure in the core is non-recoverable
//! for the current operation: the error is propagated to the caller of tree
//! construction or filter access, which decides user-visible behavior.
//!
//! # Error Categories
//!
//! - **Io**: file system operations (open, read, write, decompress)
//! - **Format**: invalid on-disk data (magic bytes, version, field ranges)
//! - **Tree**: malformed tree description (depth jumps, extra children)
//! - **Validation**: invalid parameters or data invariants

use std::fmt;
use std::path::PathBuf;

/// Unified error type for the bramble library.
#[derive(Debug)]
pub enum BrambleError {
    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
    },

    /// Invalid on-disk format (magic bytes, version, structure).
    Format { path: PathBuf, detail: String },

    /// Malformed tree description line.
    Tree { line: usize, detail: String },

    /// Validation error (invalid parameters, broken invariants).
    Validation(String),
}

impl fmt::Display for BrambleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrambleError::Io {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "I/O error during {} on '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
            BrambleError::Format { path, detail } => {
                write!(f, "Invalid format in '{}': {}", path.display(), detail)
            }
            BrambleError::Tree { line, detail } => {
                write!(f, "Tree description error at line {}: {}", line, detail)
            }
            BrambleError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for BrambleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrambleError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BrambleError {
    fn from(err: std::io::Error) -> Self {
        BrambleError::Io {
            path: PathBuf::new(),
            operation: "unknown",
            source: err,
        }
    }
}

/// Convenience type alias for Results using BrambleError.
pub type Result<T> = std::result::Result<T, BrambleError>;

// ============================================================================
// Helper constructors
// ============================================================================

impl BrambleError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        BrambleError::Io {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Create a format error.
    pub fn format(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        BrambleError::Format {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Create a tree description error for a 1-based line number.
    pub fn tree(line: usize, detail: impl Into<String>) -> Self {
        BrambleError::Tree {
            line,
            detail: detail.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        BrambleError::Validation(msg.into())
    }
}

// ============================================================================
// Tests
// ============================================================================
