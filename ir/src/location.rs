//! Source locations attached to operations.
//!
//! A location is opaque to rewrite rules: they only carry it from the matched
//! operation onto the operations they create, so diagnostics about an expanded
//! op still point at the code that produced the original.

use std::sync::Arc;

/// Where an operation came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Location {
    #[default]
    #[display("unknown")]
    Unknown,
    #[display("{file}:{line}:{column}")]
    File { file: Arc<str>, line: u32, column: u32 },
    /// Free-form label, e.g. the name of the front-end construct.
    #[display("{_0}")]
    Name(Arc<str>),
}

impl Location {
    pub fn file(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self::File { file: file.into(), line, column }
    }

    pub fn name(name: impl Into<Arc<str>>) -> Self {
        Self::Name(name.into())
    }

    /// Rust call site of the caller.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = std::panic::Location::caller();
        Self::file(loc.file(), loc.line(), loc.column())
    }
}
