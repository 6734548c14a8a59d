//! Span-preserving scanner for Go source files.
//!
//! Go source is parsed with `tree-sitter-go`. The syntax tree is reduced to a
//! small declaration model (package, imports, types, funcs) whose nodes keep
//! the byte ranges they came from. Struct tags are decoded the way Go's
//! `reflect.StructTag` does.
//!
//! Nothing here type-checks; declared types are exposed as exact source
//! slices so callers can copy them into generated code verbatim.

mod parser;
mod tags;

use thiserror::Error;

pub use parser::{
    Decl, FieldDecl, FuncDecl, Ident, ImportSpec, Receiver, SourceFile, TypeDecl, TypeExpr, TypeKind, TypeSpec,
    parse_file,
};
pub use tags::StructTag;

/// Byte range into the source a node was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

/// A source file could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Build an error pointing at byte `offset` of `src`.
    pub fn at(src: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(src.len());
        let before = &src[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}
