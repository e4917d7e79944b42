//! Hand-written parser for the combinational SystemVerilog subset.
//!
//! The entry points are [`parse_file`], for a file already loaded into a
//! [`SourceDb`], and [`parse_str`], which owns everything it needs and is
//! what the lowerer and tests use.
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): bytes to tokens; `E100` on bad input.
//! - **Parser** ([`parser`]): recursive descent with a Pratt core for
//!   expressions; `E101` on syntax errors, with `Error` nodes left in the
//!   tree for recovery.
//! - **AST** ([`ast`]): node types with spans and serde support.
//!
//! # Scope
//!
//! Modules with ANSI or non-ANSI ports, `wire`/`logic`/`reg` declarations,
//! `assign`, `always_comb`, `always @(*)`, `begin`/`end`, `if`/`else`,
//! `case`/`casez`/`casex`, bitwise, logical and equality operators, `?:`,
//! selects, concatenation and replication. Clocked forms (`always_ff`,
//! edge sensitivity lists, `<=`) are parsed so the lowerer can reject them
//! with a precise message.

#![warn(missing_docs)]

pub mod ast;
mod decl;
mod expr;
pub mod lexer;
pub mod parser;
mod stmt;
pub mod token;

pub use ast::SvSourceFile;
pub use token::{SvToken, Token};

use logictree_common::Interner;
use logictree_diagnostics::DiagnosticSink;
use logictree_source::{FileId, SourceDb};

/// Parses a loaded file.
///
/// An unknown `file_id` parses as empty input.
pub fn parse_file(
    file_id: FileId,
    source_db: &SourceDb,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> SvSourceFile {
    let source = source_db
        .file(file_id)
        .map_or("", |file| file.content.as_str());
    let tokens = lexer::lex(source, file_id, sink);
    parser::SvParser::new(tokens, source, interner, sink).parse_source_file()
}

/// A parse result that owns its source database, interner and diagnostics.
pub struct ParsedSource {
    /// The tree.
    pub ast: SvSourceFile,
    /// Holds the text the tree's spans point into.
    pub source_db: SourceDb,
    /// The parsed file.
    pub file: FileId,
    /// Names referenced by the tree.
    pub interner: Interner,
    /// Diagnostics from lexing and parsing.
    pub sink: DiagnosticSink,
}

impl ParsedSource {
    /// Source text of a span of this file.
    pub fn text(&self, span: logictree_source::Span) -> &str {
        self.source_db.snippet(span)
    }
}

/// Parses in-memory text registered as `<input>`.
pub fn parse_str(source: &str) -> ParsedSource {
    parse_named("<input>", source)
}

/// Parses in-memory text under a display name used in diagnostics.
pub fn parse_named(name: &str, source: &str) -> ParsedSource {
    let mut source_db = SourceDb::new();
    let file = source_db.add_source(name, source.to_string());
    let interner = Interner::new();
    let sink = DiagnosticSink::new();
    let ast = parse_file(file, &source_db, &interner, &sink);
    log::debug!(
        "parsed {name}: {} item(s), {} error(s)",
        ast.items.len(),
        sink.error_count()
    );
    ParsedSource {
        ast,
        source_db,
        file,
        interner,
        sink,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn parse_ok(source: &str) -> ParsedSource {
        let parsed = parse_str(source);
        assert!(
            !parsed.sink.has_errors(),
            "unexpected errors: {:?}",
            parsed
                .sink
                .diagnostics()
                .iter()
                .map(|d| d.message.clone())
                .collect::<Vec<_>>()
        );
        parsed
    }

    #[test]
    fn integration_mux4() {
        let parsed = parse_ok(
            "module mux4(
                input  logic [1:0] s,
                input  logic a, b, c, d,
                output logic y
            );
                always_comb begin
                    case (s)
                        2'b00: y = a;
                        2'b01: y = b;
                        2'b10: y = c;
                        default: y = d;
                    endcase
                end
            endmodule",
        );
        let m = parsed.ast.modules().next().map(|m| m.clone());
        let Some(m) = m else {
            panic!("expected module");
        };
        assert_eq!(parsed.interner.resolve(m.name), "mux4");
        assert_eq!(m.ports.len(), 3);
        assert_eq!(m.items.len(), 1);
    }

    #[test]
    fn integration_two_modules() {
        let parsed = parse_ok(
            "module a(input x, output y); assign y = ~x; endmodule
             module b(input x, output y); assign y = x; endmodule",
        );
        assert_eq!(parsed.ast.modules().count(), 2);
    }

    #[test]
    fn literal_text_is_read_back_through_the_span() {
        let parsed = parse_ok("module m(output [3:0] y); assign y = 4'b1010; endmodule");
        let Some(ModuleItem::ContinuousAssign(a)) = parsed
            .ast
            .modules()
            .next()
            .map(|m| m.items[0].clone())
        else {
            panic!("expected assign");
        };
        assert_eq!(parsed.text(a.value.span()), "4'b1010");
    }

    #[test]
    fn ast_serializes() {
        let parsed = parse_ok("module m(input a, output y); assign y = a; endmodule");
        let json = serde_json::to_string(&parsed.ast).unwrap();
        assert!(json.contains("ContinuousAssign"));
    }

    #[test]
    fn unknown_file_is_empty() {
        let db = SourceDb::new();
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let ast = parse_file(FileId::from_raw(7), &db, &interner, &sink);
        assert!(ast.items.is_empty());
        assert!(!sink.has_errors());
    }
}
