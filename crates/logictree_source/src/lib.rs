//! Source text storage and byte-span tracking.
//!
//! HDL files are loaded into a [`SourceDb`]; the lexer and parser attach
//! [`Span`]s to every token and AST node, and diagnostics resolve those spans
//! back to `file:line:col` through [`SourceDb::resolve_span`].

#![warn(missing_docs)]

pub mod source_db;
pub mod span;

pub use source_db::{ResolvedSpan, SourceDb, SourceFile};
pub use span::{FileId, Span};
