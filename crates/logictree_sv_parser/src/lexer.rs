//! Lexical analyzer for the HDL subset.
//!
//! Converts source text into [`Token`]s. Whitespace, `//` and `/* */`
//! comments are skipped. Compiler directives (`` `timescale ``, `` `define ``
//! and friends) are skipped to the end of the line with a `W100` warning.
//! Malformed input is reported as `E100` and produces [`SvToken::Error`].

use crate::token::{lookup_keyword, SvToken, Token};
use logictree_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use logictree_source::{FileId, Span};

/// Lexes `source` into tokens. The result always ends with [`SvToken::Eof`].
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        file,
        sink,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: SvToken::Eof,
                    span: Span::new(self.file, self.pos as u32, self.pos as u32),
                });
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn token(&self, kind: SvToken, start: usize) -> Token {
        Token {
            kind,
            span: self.span_from(start),
        }
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 100),
            msg,
            span,
        ));
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_ascii_whitespace() && self.pos < self.source.len() {
                self.pos += 1;
            }
            if self.pos >= self.source.len() {
                return;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                self.skip_line();
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.source.len() {
                        self.error("unterminated block comment", self.span_from(start));
                        break;
                    }
                    if self.peek() == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'`' {
                let start = self.pos;
                self.skip_line();
                self.sink.emit(Diagnostic::warning(
                    DiagnosticCode::new(Category::Warning, 100),
                    "compiler directive ignored",
                    self.span_from(start),
                ));
                continue;
            }
            break;
        }
    }

    fn skip_line(&mut self) {
        while self.pos < self.source.len() && self.peek() != b'\n' {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        if is_ident_start(b) {
            while is_ident_char(self.peek()) {
                self.pos += 1;
            }
            let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
            let kind = lookup_keyword(text).unwrap_or(SvToken::Identifier);
            return self.token(kind, start);
        }

        if b.is_ascii_digit() {
            return self.lex_number(start);
        }

        if b == b'\'' {
            return self.lex_tick_literal(start);
        }

        self.lex_operator(start)
    }

    /// `42`, `4'b1010`, `8'sh_ff`, `16'd300`.
    fn lex_number(&mut self, start: usize) -> Token {
        self.eat_decimal_digits();
        if self.peek() != b'\'' {
            return self.token(SvToken::IntLiteral, start);
        }
        let mut offset = 1;
        if self.peek_at(offset).to_ascii_lowercase() == b's' {
            offset += 1;
        }
        let base = self.peek_at(offset).to_ascii_lowercase();
        if !matches!(base, b'b' | b'o' | b'd' | b'h') {
            // `4'` followed by junk; leave the tick for the next token
            return self.token(SvToken::IntLiteral, start);
        }
        self.pos += offset + 1;
        self.based_digits(start, base)
    }

    /// `'b101`, `'sh3`, or a fill literal `'0`, `'1`, `'x`, `'z`.
    fn lex_tick_literal(&mut self, start: usize) -> Token {
        let next = self.peek_at(1).to_ascii_lowercase();
        if matches!(next, b'0' | b'1' | b'x' | b'z') && !is_ident_char(self.peek_at(2)) {
            self.pos += 2;
            return self.token(SvToken::FillLiteral, start);
        }
        let mut offset = 1;
        if next == b's' {
            offset += 1;
        }
        let base = self.peek_at(offset).to_ascii_lowercase();
        if matches!(base, b'b' | b'o' | b'd' | b'h') {
            self.pos += offset + 1;
            return self.based_digits(start, base);
        }
        self.pos += 1;
        self.error("expected a base (b, o, d, h) after '", self.span_from(start));
        self.token(SvToken::Error, start)
    }

    fn based_digits(&mut self, start: usize, base: u8) -> Token {
        while self.peek().is_ascii_whitespace() && self.pos < self.source.len() {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.pos < self.source.len() {
            let ch = self.peek().to_ascii_lowercase();
            let valid = match base {
                b'b' => matches!(ch, b'0' | b'1' | b'x' | b'z' | b'?' | b'_'),
                b'o' => matches!(ch, b'0'..=b'7' | b'x' | b'z' | b'?' | b'_'),
                b'd' => ch.is_ascii_digit() || matches!(ch, b'x' | b'z' | b'?' | b'_'),
                _ => ch.is_ascii_hexdigit() || matches!(ch, b'x' | b'z' | b'?' | b'_'),
            };
            if !valid {
                break;
            }
            self.pos += 1;
        }
        if self.pos == digits_start {
            self.error("based literal has no digits", self.span_from(start));
            return self.token(SvToken::Error, start);
        }
        if is_ident_char(self.peek()) {
            let bad_start = self.pos;
            while is_ident_char(self.peek()) {
                self.pos += 1;
            }
            self.error(
                &format!("invalid digit for base '{}'", base as char),
                self.span_from(bad_start),
            );
            return self.token(SvToken::Error, start);
        }
        self.token(SvToken::SizedLiteral, start)
    }

    fn eat_decimal_digits(&mut self) {
        while self.peek().is_ascii_digit() || self.peek() == b'_' {
            self.pos += 1;
        }
    }

    fn lex_operator(&mut self, start: usize) -> Token {
        let b = self.peek();
        let next = self.peek_at(1);
        let (kind, len) = match (b, next) {
            (b'=', b'=') => (SvToken::DoubleEquals, 2),
            (b'!', b'=') => (SvToken::BangEquals, 2),
            (b'<', b'=') => (SvToken::LessEquals, 2),
            (b'<', b'<') => (SvToken::DoubleLess, 2),
            (b'>', b'=') => (SvToken::GreaterEquals, 2),
            (b'>', b'>') => (SvToken::DoubleGreater, 2),
            (b'&', b'&') => (SvToken::DoubleAmpersand, 2),
            (b'|', b'|') => (SvToken::DoublePipe, 2),
            (b'^', b'~') | (b'~', b'^') => (SvToken::TildeCaret, 2),
            (b'~', b'&') => (SvToken::TildeAmpersand, 2),
            (b'~', b'|') => (SvToken::TildePipe, 2),
            (b'(', _) => (SvToken::LeftParen, 1),
            (b')', _) => (SvToken::RightParen, 1),
            (b'[', _) => (SvToken::LeftBracket, 1),
            (b']', _) => (SvToken::RightBracket, 1),
            (b'{', _) => (SvToken::LeftBrace, 1),
            (b'}', _) => (SvToken::RightBrace, 1),
            (b',', _) => (SvToken::Comma, 1),
            (b';', _) => (SvToken::Semicolon, 1),
            (b':', _) => (SvToken::Colon, 1),
            (b'@', _) => (SvToken::At, 1),
            (b'*', _) => (SvToken::Star, 1),
            (b'?', _) => (SvToken::Question, 1),
            (b'+', _) => (SvToken::Plus, 1),
            (b'-', _) => (SvToken::Minus, 1),
            (b'/', _) => (SvToken::Slash, 1),
            (b'%', _) => (SvToken::Percent, 1),
            (b'=', _) => (SvToken::Equals, 1),
            (b'!', _) => (SvToken::Bang, 1),
            (b'<', _) => (SvToken::LessThan, 1),
            (b'>', _) => (SvToken::GreaterThan, 1),
            (b'&', _) => (SvToken::Ampersand, 1),
            (b'|', _) => (SvToken::Pipe, 1),
            (b'^', _) => (SvToken::Caret, 1),
            (b'~', _) => (SvToken::Tilde, 1),
            _ => {
                self.pos += 1;
                // step over the rest of a UTF-8 sequence
                while self.pos < self.source.len() && (self.peek() & 0xC0) == 0x80 {
                    self.pos += 1;
                }
                let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
                self.error(
                    &format!("unrecognized character '{text}'"),
                    self.span_from(start),
                );
                return self.token(SvToken::Error, start);
            }
        };
        self.pos += len;
        self.token(kind, start)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_diagnostics::Severity;

    fn lex_with(source: &str) -> (Vec<SvToken>, DiagnosticSink) {
        let sink = DiagnosticSink::new();
        let kinds = lex(source, FileId::from_raw(0), &sink)
            .into_iter()
            .map(|t| t.kind)
            .collect();
        (kinds, sink)
    }

    fn kinds(source: &str) -> Vec<SvToken> {
        let (kinds, sink) = lex_with(source);
        assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
        kinds
    }

    #[test]
    fn module_header() {
        assert_eq!(
            kinds("module m(input logic [1:0] s);"),
            vec![
                SvToken::Module,
                SvToken::Identifier,
                SvToken::LeftParen,
                SvToken::Input,
                SvToken::Logic,
                SvToken::LeftBracket,
                SvToken::IntLiteral,
                SvToken::Colon,
                SvToken::IntLiteral,
                SvToken::RightBracket,
                SvToken::Identifier,
                SvToken::RightParen,
                SvToken::Semicolon,
                SvToken::Eof,
            ]
        );
    }

    #[test]
    fn literal_forms() {
        assert_eq!(
            kinds("4'b10_10 8'shFF 'b1 'h f 12 '0 '1 'x 'z 4'bxz?1"),
            vec![
                SvToken::SizedLiteral,
                SvToken::SizedLiteral,
                SvToken::SizedLiteral,
                SvToken::SizedLiteral,
                SvToken::IntLiteral,
                SvToken::FillLiteral,
                SvToken::FillLiteral,
                SvToken::FillLiteral,
                SvToken::FillLiteral,
                SvToken::SizedLiteral,
                SvToken::Eof,
            ]
        );
    }

    #[test]
    fn operators_take_the_longest_match() {
        assert_eq!(
            kinds("== != <= && || ~^ ^~ ~& ~| ~ ! ^"),
            vec![
                SvToken::DoubleEquals,
                SvToken::BangEquals,
                SvToken::LessEquals,
                SvToken::DoubleAmpersand,
                SvToken::DoublePipe,
                SvToken::TildeCaret,
                SvToken::TildeCaret,
                SvToken::TildeAmpersand,
                SvToken::TildePipe,
                SvToken::Tilde,
                SvToken::Bang,
                SvToken::Caret,
                SvToken::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a // line\n /* block\n comment */ b"),
            vec![SvToken::Identifier, SvToken::Identifier, SvToken::Eof]
        );
    }

    #[test]
    fn directive_is_a_warning() {
        let (kinds, sink) = lex_with("`timescale 1ns/1ps\nmodule");
        assert_eq!(kinds, vec![SvToken::Module, SvToken::Eof]);
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].code.to_string(), "W100");
    }

    #[test]
    fn bad_digit_is_e100() {
        let (kinds, sink) = lex_with("4'b102");
        assert_eq!(kinds[0], SvToken::Error);
        let diags = sink.take_all();
        assert_eq!(diags[0].code.to_string(), "E100");
    }

    #[test]
    fn unrecognized_character() {
        let (kinds, sink) = lex_with("a # b");
        assert_eq!(kinds[1], SvToken::Error);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn unterminated_block_comment() {
        let (_, sink) = lex_with("a /* never closed");
        assert!(sink.has_errors());
    }
}
