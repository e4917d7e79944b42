//! Parser state, primitive token operations and top-level rules.
//!
//! [`SvParser`] walks the token stream from [`crate::lexer::lex`]. Module
//! items live in `decl.rs`, statements in `stmt.rs` and expressions in
//! `expr.rs`; all of them are `impl SvParser` blocks.

use crate::ast::*;
use crate::token::{SvToken, Token};
use logictree_common::{Ident, Interner};
use logictree_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use logictree_source::Span;

/// Recursive descent parser over a lexed token stream.
///
/// Syntax errors are reported as `E101` and leave `Error` nodes in the
/// tree; parsing always runs to the end of input.
pub struct SvParser<'src> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source: &'src str,
    pub(crate) interner: &'src Interner,
    pub(crate) sink: &'src DiagnosticSink,
}

impl<'src> SvParser<'src> {
    /// Creates a parser over `tokens`, which were lexed from `source`.
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        interner: &'src Interner,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            interner,
            sink,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    pub(crate) fn current(&self) -> SvToken {
        self.peek_kind(0)
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(t) => t.span,
            None => Span::DUMMY,
        }
    }

    pub(crate) fn current_text(&self) -> &'src str {
        let span = self.current_span();
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or("")
    }

    pub(crate) fn at(&self, kind: SvToken) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.current() == SvToken::Eof
    }

    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: SvToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SvToken) {
        if !self.eat(kind) {
            self.expected(kind.describe());
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Ident {
        if self.at(SvToken::Identifier) {
            let ident = self.interner.get_or_intern(self.current_text());
            self.advance();
            ident
        } else {
            self.expected("identifier");
            self.interner.get_or_intern("<missing>")
        }
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> SvToken {
        self.tokens
            .get(self.pos + offset)
            .map_or(SvToken::Eof, |t| t.kind)
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    pub(crate) fn error(&self, msg: &str) {
        self.error_at(msg, self.current_span());
    }

    pub(crate) fn error_at(&self, msg: &str, span: Span) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 101),
            msg,
            span,
        ));
    }

    pub(crate) fn expected(&self, what: &str) {
        // the lexer already reported this one
        if self.at(SvToken::Error) {
            return;
        }
        self.error(&format!(
            "expected {what}, found {}",
            self.current().describe()
        ));
    }

    /// Skips past the next `;`, stopping early at `endmodule`.
    pub(crate) fn recover_to_semicolon(&mut self) {
        while !self.at_eof() && !self.at(SvToken::Semicolon) && !self.at(SvToken::Endmodule) {
            self.advance();
        }
        self.eat(SvToken::Semicolon);
    }

    // ========================================================================
    // Top-level parsing
    // ========================================================================

    /// Parses a whole file.
    pub fn parse_source_file(&mut self) -> SvSourceFile {
        let start = self.current_span();
        let mut items = Vec::new();

        while !self.at_eof() {
            if self.at(SvToken::Module) {
                items.push(SvItem::Module(self.parse_module()));
            } else {
                let span = self.current_span();
                self.expected("`module`");
                // skip to the next module header
                self.advance();
                while !self.at_eof() && !self.at(SvToken::Module) {
                    self.advance();
                }
                items.push(SvItem::Error(span.merge(self.prev_span())));
            }
        }

        let span = if items.is_empty() {
            start
        } else {
            start.merge(self.prev_span())
        };
        SvSourceFile { items, span }
    }

    fn parse_module(&mut self) -> SvModuleDecl {
        let start = self.current_span();
        self.expect(SvToken::Module);
        let name = self.expect_ident();

        let (port_style, ports, port_names) = if self.at(SvToken::LeftParen) {
            self.parse_port_list()
        } else {
            (PortStyle::Empty, Vec::new(), Vec::new())
        };
        self.expect(SvToken::Semicolon);

        let items = self.parse_module_items();
        self.expect(SvToken::Endmodule);
        // optional `endmodule : name`
        if self.eat(SvToken::Colon) {
            self.expect_ident();
        }

        SvModuleDecl {
            name,
            port_style,
            ports,
            port_names,
            items,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_port_list(&mut self) -> (PortStyle, Vec<SvPortDecl>, Vec<Ident>) {
        self.expect(SvToken::LeftParen);
        if self.eat(SvToken::RightParen) {
            return (PortStyle::Empty, Vec::new(), Vec::new());
        }

        if self.current().is_direction() || self.current().is_net_type() {
            let ports = self.parse_ansi_port_list();
            self.expect(SvToken::RightParen);
            (PortStyle::Ansi, ports, Vec::new())
        } else {
            let names = self.parse_identifier_list();
            self.expect(SvToken::RightParen);
            (PortStyle::NonAnsi, Vec::new(), names)
        }
    }

    /// `input logic [1:0] a, b, output y`: direction and type carry over to
    /// following names until a new direction or type appears.
    fn parse_ansi_port_list(&mut self) -> Vec<SvPortDecl> {
        let mut ports = Vec::new();
        let mut direction = Direction::Input;

        loop {
            let start = self.current_span();
            direction = self.eat_direction().unwrap_or(direction);
            let net = self.eat_net_kind();
            let signed = self.eat(SvToken::Signed);
            let range = self.at(SvToken::LeftBracket).then(|| self.parse_range());

            let mut names = vec![self.expect_ident()];
            while self.at(SvToken::Comma) && self.peek_kind(1) == SvToken::Identifier {
                self.advance();
                names.push(self.expect_ident());
            }

            ports.push(SvPortDecl {
                direction,
                net,
                signed,
                range,
                names,
                span: start.merge(self.prev_span()),
            });

            if !self.eat(SvToken::Comma) {
                break;
            }
        }
        ports
    }

    pub(crate) fn eat_direction(&mut self) -> Option<Direction> {
        let dir = match self.current() {
            SvToken::Input => Direction::Input,
            SvToken::Output => Direction::Output,
            SvToken::Inout => Direction::Inout,
            _ => return None,
        };
        self.advance();
        Some(dir)
    }

    pub(crate) fn eat_net_kind(&mut self) -> NetKind {
        let net = match self.current() {
            SvToken::Wire => NetKind::Wire,
            SvToken::Logic => NetKind::Logic,
            SvToken::Reg => NetKind::Reg,
            _ => return NetKind::Implicit,
        };
        self.advance();
        net
    }

    /// `[msb:lsb]`
    pub(crate) fn parse_range(&mut self) -> Range {
        let start = self.current_span();
        self.expect(SvToken::LeftBracket);
        let msb = self.parse_expr();
        self.expect(SvToken::Colon);
        let lsb = self.parse_expr();
        self.expect(SvToken::RightBracket);
        Range {
            msb,
            lsb,
            span: start.merge(self.prev_span()),
        }
    }

    pub(crate) fn parse_identifier_list(&mut self) -> Vec<Ident> {
        let mut names = vec![self.expect_ident()];
        while self.eat(SvToken::Comma) {
            names.push(self.expect_ident());
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use logictree_source::FileId;

    fn parse(source: &str) -> (SvSourceFile, Interner, DiagnosticSink) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let tokens = lexer::lex(source, FileId::from_raw(0), &sink);
        let ast = SvParser::new(tokens, source, &interner, &sink).parse_source_file();
        (ast, interner, sink)
    }

    fn only_module(ast: &SvSourceFile) -> &SvModuleDecl {
        let modules: Vec<_> = ast.modules().collect();
        assert_eq!(modules.len(), 1);
        modules[0]
    }

    #[test]
    fn empty_module() {
        let (ast, interner, sink) = parse("module m; endmodule");
        assert!(!sink.has_errors());
        let m = only_module(&ast);
        assert_eq!(interner.resolve(m.name), "m");
        assert_eq!(m.port_style, PortStyle::Empty);
    }

    #[test]
    fn ansi_ports_inherit_direction() {
        let (ast, interner, sink) =
            parse("module m(input logic [1:0] s, a, output logic signed y, z); endmodule");
        assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
        let m = only_module(&ast);
        assert_eq!(m.port_style, PortStyle::Ansi);
        assert_eq!(m.ports.len(), 2);
        let first = &m.ports[0];
        assert_eq!(first.direction, Direction::Input);
        assert!(first.range.is_some());
        let names: Vec<&str> = first.names.iter().map(|n| interner.resolve(*n)).collect();
        assert_eq!(names, ["s", "a"]);
        assert_eq!(m.ports[1].direction, Direction::Output);
        assert!(m.ports[1].signed);
        assert_eq!(m.ports[1].names.len(), 2);
    }

    #[test]
    fn ansi_port_per_declaration() {
        let (ast, _, sink) = parse("module m(input a, input b, output wire y); endmodule");
        assert!(!sink.has_errors());
        let m = only_module(&ast);
        assert_eq!(m.ports.len(), 3);
        assert_eq!(m.ports[0].net, NetKind::Implicit);
        assert_eq!(m.ports[2].net, NetKind::Wire);
    }

    #[test]
    fn non_ansi_header() {
        let (ast, _, sink) = parse("module m(a, b, y); input a, b; output y; endmodule");
        assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
        let m = only_module(&ast);
        assert_eq!(m.port_style, PortStyle::NonAnsi);
        assert_eq!(m.port_names.len(), 3);
        assert_eq!(m.items.len(), 2);
    }

    #[test]
    fn end_label_is_accepted() {
        let (_, _, sink) = parse("module m; endmodule : m");
        assert!(!sink.has_errors());
    }

    #[test]
    fn junk_before_module_recovers() {
        let (ast, _, sink) = parse("garbage here module m; endmodule");
        assert_eq!(sink.error_count(), 1);
        assert_eq!(ast.items.len(), 2);
        assert_eq!(ast.modules().count(), 1);
        assert_eq!(sink.diagnostics()[0].code.to_string(), "E101");
    }

    #[test]
    fn missing_semicolon_is_reported() {
        let (_, _, sink) = parse("module m(input a) endmodule");
        let diags = sink.take_all();
        assert!(diags[0].message.contains("expected `;`"));
    }
}
