//! Cross-cutting error classification.
//!
//! Each domain keeps its own `thiserror` enum; `kind()` on those enums maps
//! them onto the four classes callers act on.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed input, rejected before any I/O.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The request is well formed but the current state forbids it.
    Conflict,
    /// Persistence or collaborator failure.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
