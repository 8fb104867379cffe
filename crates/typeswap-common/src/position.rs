//! Source locations for error reporting.
//!
//! The weaver itself never reads source text; a location is only carried
//! through to the host so a build can point at the offending declaration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A file/line/column triple, the sequence-point equivalent attached to
/// type definitions by the host graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
