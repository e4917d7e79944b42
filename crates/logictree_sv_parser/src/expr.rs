//! Pratt expression parser.
//!
//! | BP (L,R) | Operators |
//! |----------|-----------|
//! | (1,2)    | `\|\|` |
//! | (3,4)    | `&&` |
//! | (5,6)    | `\|` |
//! | (7,8)    | `^` `~^` `^~` |
//! | (9,10)   | `&` |
//! | (11,12)  | `==` `!=` |
//! | prefix 13 | `!` `~` `&` `~&` `\|` `~\|` `^` `~^` |
//!
//! The ternary `? :` is handled at min_bp 0 and is right-associative.
//! Selects (`[i]`, `[m:l]`) are postfix and bind tighter than any prefix
//! operator. Arithmetic, shift and relational operators are reported as
//! unsupported and their operands are still parsed so recovery stays local.

use crate::ast::*;
use crate::parser::SvParser;
use crate::token::SvToken;

const PREFIX_BP: u8 = 13;

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::LogOr => (1, 2),
        BinaryOp::LogAnd => (3, 4),
        BinaryOp::BitOr => (5, 6),
        BinaryOp::BitXor | BinaryOp::BitXnor => (7, 8),
        BinaryOp::BitAnd => (9, 10),
        BinaryOp::Eq | BinaryOp::Neq => (11, 12),
    }
}

impl SvParser<'_> {
    /// Parses an expression.
    pub fn parse_expr(&mut self) -> Expr {
        self.parse_expr_bp(0)
    }

    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_prefix_expr();

        loop {
            if self.at(SvToken::Question) && min_bp == 0 {
                self.advance();
                let then_expr = self.parse_expr_bp(0);
                self.expect(SvToken::Colon);
                let else_expr = self.parse_expr_bp(0);
                let span = lhs.span().merge(else_expr.span());
                lhs = Expr::Ternary {
                    condition: Box::new(lhs),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                    span,
                };
                continue;
            }

            if self.at(SvToken::LeftBracket) {
                lhs = self.parse_postfix_select(lhs);
                continue;
            }

            if self.current().is_unsupported_operator() {
                // consume `op rhs` at a precedence above equality
                if min_bp > 12 {
                    break;
                }
                self.error(&format!(
                    "operator {} is not supported; only bitwise, logical and equality operators are",
                    self.current().describe()
                ));
                self.advance();
                let rhs = self.parse_expr_bp(14);
                lhs = Expr::Error(lhs.span().merge(rhs.span()));
                continue;
            }

            let Some(op) = self.current_binary_op() else {
                break;
            };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr_bp(r_bp);
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
                span,
            };
        }

        lhs
    }

    fn current_binary_op(&self) -> Option<BinaryOp> {
        Some(match self.current() {
            SvToken::DoubleEquals => BinaryOp::Eq,
            SvToken::BangEquals => BinaryOp::Neq,
            SvToken::DoubleAmpersand => BinaryOp::LogAnd,
            SvToken::DoublePipe => BinaryOp::LogOr,
            SvToken::Ampersand => BinaryOp::BitAnd,
            SvToken::Pipe => BinaryOp::BitOr,
            SvToken::Caret => BinaryOp::BitXor,
            SvToken::TildeCaret => BinaryOp::BitXnor,
            _ => return None,
        })
    }

    fn current_unary_op(&self) -> Option<UnaryOp> {
        Some(match self.current() {
            SvToken::Bang => UnaryOp::LogNot,
            SvToken::Tilde => UnaryOp::BitNot,
            SvToken::Ampersand => UnaryOp::RedAnd,
            SvToken::TildeAmpersand => UnaryOp::RedNand,
            SvToken::Pipe => UnaryOp::RedOr,
            SvToken::TildePipe => UnaryOp::RedNor,
            SvToken::Caret => UnaryOp::RedXor,
            SvToken::TildeCaret => UnaryOp::RedXnor,
            _ => return None,
        })
    }

    fn parse_prefix_expr(&mut self) -> Expr {
        let start = self.current_span();

        if let Some(op) = self.current_unary_op() {
            self.advance();
            let operand = self.parse_expr_bp(PREFIX_BP);
            return Expr::Unary {
                op,
                span: start.merge(operand.span()),
                operand: Box::new(operand),
            };
        }

        match self.current() {
            SvToken::Identifier => {
                let name = self.expect_ident();
                Expr::Identifier { name, span: start }
            }
            SvToken::IntLiteral | SvToken::SizedLiteral | SvToken::FillLiteral => {
                let kind = match self.current() {
                    SvToken::IntLiteral => LiteralKind::Int,
                    SvToken::SizedLiteral => LiteralKind::Based,
                    _ => LiteralKind::Fill,
                };
                self.advance();
                Expr::Literal { kind, span: start }
            }
            SvToken::LeftParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(SvToken::RightParen);
                Expr::Paren {
                    inner: Box::new(inner),
                    span: start.merge(self.prev_span()),
                }
            }
            SvToken::LeftBrace => self.parse_concat_or_repeat(),
            SvToken::Plus | SvToken::Minus => {
                self.error(&format!(
                    "unary {} is not supported",
                    self.current().describe()
                ));
                self.advance();
                let operand = self.parse_expr_bp(PREFIX_BP);
                Expr::Error(start.merge(operand.span()))
            }
            SvToken::Error => {
                self.advance();
                Expr::Error(start)
            }
            _ => {
                self.expected("expression");
                Expr::Error(start)
            }
        }
    }

    /// `{a, b}` or `{N{a, b}}`
    fn parse_concat_or_repeat(&mut self) -> Expr {
        let start = self.current_span();
        self.expect(SvToken::LeftBrace);

        if self.at(SvToken::RightBrace) {
            self.advance();
            self.error_at("empty concatenation", start.merge(self.prev_span()));
            return Expr::Error(start.merge(self.prev_span()));
        }

        let first = self.parse_expr();

        if self.eat(SvToken::LeftBrace) {
            let mut elements = vec![self.parse_expr()];
            while self.eat(SvToken::Comma) {
                elements.push(self.parse_expr());
            }
            self.expect(SvToken::RightBrace);
            self.expect(SvToken::RightBrace);
            return Expr::Repeat {
                count: Box::new(first),
                elements,
                span: start.merge(self.prev_span()),
            };
        }

        let mut elements = vec![first];
        while self.eat(SvToken::Comma) {
            elements.push(self.parse_expr());
        }
        self.expect(SvToken::RightBrace);
        Expr::Concat {
            elements,
            span: start.merge(self.prev_span()),
        }
    }

    /// `base[i]` or `base[m:l]`
    fn parse_postfix_select(&mut self, base: Expr) -> Expr {
        let start = base.span();
        self.expect(SvToken::LeftBracket);
        let first = self.parse_expr();

        if self.eat(SvToken::Colon) {
            let lsb = self.parse_expr();
            self.expect(SvToken::RightBracket);
            return Expr::RangeSelect {
                base: Box::new(base),
                msb: Box::new(first),
                lsb: Box::new(lsb),
                span: start.merge(self.prev_span()),
            };
        }

        self.expect(SvToken::RightBracket);
        Expr::Index {
            base: Box::new(base),
            index: Box::new(first),
            span: start.merge(self.prev_span()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use logictree_common::Interner;
    use logictree_diagnostics::DiagnosticSink;
    use logictree_source::FileId;

    fn parse_expr_str(source: &str) -> (Expr, DiagnosticSink) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let tokens = lexer::lex(source, FileId::from_raw(0), &sink);
        let expr = SvParser::new(tokens, source, &interner, &sink).parse_expr();
        (expr, sink)
    }

    fn parse_ok(source: &str) -> Expr {
        let (expr, sink) = parse_expr_str(source);
        assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
        expr
    }

    fn binary_op(e: &Expr) -> BinaryOp {
        match e {
            Expr::Binary { op, .. } => *op,
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let e = parse_ok("a | b & c");
        assert_eq!(binary_op(&e), BinaryOp::BitOr);
        let Expr::Binary { right, .. } = &e else {
            unreachable!()
        };
        assert_eq!(binary_op(right), BinaryOp::BitAnd);
    }

    #[test]
    fn equality_binds_tighter_than_bitwise() {
        let e = parse_ok("s == 2'b01 && t != 1'b0");
        assert_eq!(binary_op(&e), BinaryOp::LogAnd);
        let Expr::Binary { left, right, .. } = &e else {
            unreachable!()
        };
        assert_eq!(binary_op(left), BinaryOp::Eq);
        assert_eq!(binary_op(right), BinaryOp::Neq);
    }

    #[test]
    fn binary_is_left_associative() {
        let e = parse_ok("a ^ b ^ c");
        let Expr::Binary { left, right, .. } = &e else {
            unreachable!()
        };
        assert_eq!(binary_op(left), BinaryOp::BitXor);
        assert!(matches!(**right, Expr::Identifier { .. }));
    }

    #[test]
    fn ternary_is_right_associative() {
        let e = parse_ok("a ? b : c ? d : e");
        let Expr::Ternary { else_expr, .. } = &e else {
            panic!("expected ternary");
        };
        assert!(matches!(**else_expr, Expr::Ternary { .. }));
    }

    #[test]
    fn prefix_applies_after_select() {
        let e = parse_ok("~s[1]");
        let Expr::Unary { op, operand, .. } = &e else {
            panic!("expected unary");
        };
        assert_eq!(*op, UnaryOp::BitNot);
        assert!(matches!(**operand, Expr::Index { .. }));
    }

    #[test]
    fn reduction_is_a_prefix() {
        let e = parse_ok("&s | b");
        let Expr::Binary { left, .. } = &e else {
            panic!("expected binary");
        };
        assert!(matches!(**left, Expr::Unary { op: UnaryOp::RedAnd, .. }));
    }

    #[test]
    fn selects_and_concat() {
        assert!(matches!(parse_ok("s[3:1]"), Expr::RangeSelect { .. }));
        let Expr::Concat { elements, .. } = parse_ok("{a, s[0], 2'b10}") else {
            panic!("expected concat");
        };
        assert_eq!(elements.len(), 3);
        let Expr::Repeat { elements, .. } = parse_ok("{4{a}}") else {
            panic!("expected repeat");
        };
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn parens_are_kept() {
        let e = parse_ok("(a)");
        assert!(matches!(e, Expr::Paren { .. }));
        assert!(matches!(e.unparen(), Expr::Identifier { .. }));
    }

    #[test]
    fn arithmetic_is_rejected() {
        let (e, sink) = parse_expr_str("a + b");
        assert!(matches!(e, Expr::Error(_)));
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("`+`"));
    }

    #[test]
    fn empty_concat_is_an_error() {
        let (e, sink) = parse_expr_str("{}");
        assert!(matches!(e, Expr::Error(_)));
        assert!(sink.has_errors());
    }

    #[test]
    fn literal_kinds() {
        assert!(matches!(
            parse_ok("'1"),
            Expr::Literal {
                kind: LiteralKind::Fill,
                ..
            }
        ));
        assert!(matches!(
            parse_ok("42"),
            Expr::Literal {
                kind: LiteralKind::Int,
                ..
            }
        ));
    }
}
