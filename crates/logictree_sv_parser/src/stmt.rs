//! Statement parsing: blocks, `if`, `case`, assignments and event control.

use crate::ast::*;
use crate::parser::SvParser;
use crate::token::SvToken;

impl SvParser<'_> {
    /// Parses one statement.
    pub fn parse_statement(&mut self) -> Statement {
        match self.current() {
            SvToken::Begin => self.parse_block(),
            SvToken::If => self.parse_if(),
            SvToken::Case | SvToken::Casez | SvToken::Casex => self.parse_case(),
            SvToken::At => self.parse_event_control(),
            SvToken::Semicolon => {
                let span = self.current_span();
                self.advance();
                Statement::Null(span)
            }
            SvToken::Identifier | SvToken::LeftBrace => self.parse_assignment(),
            _ => {
                let start = self.current_span();
                self.expected("statement");
                self.recover_statement();
                Statement::Error(start.merge(self.prev_span()))
            }
        }
    }

    /// Skips to the end of the broken statement without eating a block
    /// terminator the caller still needs.
    fn recover_statement(&mut self) {
        while !matches!(
            self.current(),
            SvToken::Semicolon
                | SvToken::End
                | SvToken::Endcase
                | SvToken::Endmodule
                | SvToken::Eof
        ) {
            self.advance();
        }
        self.eat(SvToken::Semicolon);
    }

    /// `begin [: label] stmts end [: label]`
    fn parse_block(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(SvToken::Begin);
        let label = self.eat(SvToken::Colon).then(|| self.expect_ident());

        let mut stmts = Vec::new();
        while !self.at(SvToken::End) && !self.at(SvToken::Endmodule) && !self.at_eof() {
            let before = self.pos;
            stmts.push(self.parse_statement());
            if self.pos == before {
                self.advance();
            }
        }
        self.expect(SvToken::End);
        if self.eat(SvToken::Colon) {
            self.expect_ident();
        }

        Statement::Block {
            label,
            stmts,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_if(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(SvToken::If);
        self.expect(SvToken::LeftParen);
        let condition = self.parse_expr();
        self.expect(SvToken::RightParen);
        let then_stmt = Box::new(self.parse_statement());
        let else_stmt = self
            .eat(SvToken::Else)
            .then(|| Box::new(self.parse_statement()));

        Statement::If {
            condition,
            then_stmt,
            else_stmt,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_case(&mut self) -> Statement {
        let start = self.current_span();
        let kind = match self.current() {
            SvToken::Casez => CaseKind::Casez,
            SvToken::Casex => CaseKind::Casex,
            _ => CaseKind::Case,
        };
        self.advance();
        self.expect(SvToken::LeftParen);
        let expr = self.parse_expr();
        self.expect(SvToken::RightParen);

        let mut arms = Vec::new();
        while !self.at(SvToken::Endcase) && !self.at(SvToken::Endmodule) && !self.at_eof() {
            let before = self.pos;
            arms.push(self.parse_case_arm());
            if self.pos == before {
                self.advance();
            }
        }
        self.expect(SvToken::Endcase);

        Statement::Case {
            kind,
            expr,
            arms,
            span: start.merge(self.prev_span()),
        }
    }

    /// `default [:] stmt` or `p1, p2: stmt`
    fn parse_case_arm(&mut self) -> CaseArm {
        let start = self.current_span();
        if self.eat(SvToken::Default) {
            self.eat(SvToken::Colon);
            let body = self.parse_statement();
            return CaseArm {
                patterns: Vec::new(),
                is_default: true,
                body,
                span: start.merge(self.prev_span()),
            };
        }

        let mut patterns = vec![self.parse_expr()];
        while self.eat(SvToken::Comma) {
            patterns.push(self.parse_expr());
        }
        self.expect(SvToken::Colon);
        let body = self.parse_statement();
        CaseArm {
            patterns,
            is_default: false,
            body,
            span: start.merge(self.prev_span()),
        }
    }

    /// `@(...) stmt`, `@* stmt`
    fn parse_event_control(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(SvToken::At);
        let sensitivity = self.parse_event_expression();
        let body = Box::new(self.parse_statement());
        Statement::EventControl {
            sensitivity,
            body,
            span: start.merge(self.prev_span()),
        }
    }

    /// What follows `@`: `*`, `(*)` or a parenthesized list.
    pub(crate) fn parse_event_expression(&mut self) -> SensitivityList {
        if self.eat(SvToken::Star) {
            return SensitivityList::Star;
        }
        self.expect(SvToken::LeftParen);
        if self.eat(SvToken::Star) {
            self.expect(SvToken::RightParen);
            return SensitivityList::Star;
        }

        let mut items = Vec::new();
        loop {
            let start = self.current_span();
            let edge = match self.current() {
                SvToken::Posedge => Some(EdgeKind::Posedge),
                SvToken::Negedge => Some(EdgeKind::Negedge),
                _ => None,
            };
            if edge.is_some() {
                self.advance();
            }
            let signal = self.parse_expr();
            items.push(SensitivityItem {
                edge,
                signal,
                span: start.merge(self.prev_span()),
            });
            if !self.eat(SvToken::Or) && !self.eat(SvToken::Comma) {
                break;
            }
        }
        self.expect(SvToken::RightParen);
        SensitivityList::List(items)
    }

    /// `target = value;` or `target <= value;`
    fn parse_assignment(&mut self) -> Statement {
        let start = self.current_span();
        let target = self.parse_expr();
        let blocking = if self.eat(SvToken::Equals) {
            true
        } else if self.eat(SvToken::LessEquals) {
            false
        } else {
            self.expected("`=` or `<=`");
            self.recover_statement();
            return Statement::Error(start.merge(self.prev_span()));
        };
        let value = self.parse_expr();
        self.expect(SvToken::Semicolon);
        let span = start.merge(self.prev_span());

        if blocking {
            Statement::Blocking {
                target,
                value,
                span,
            }
        } else {
            Statement::NonBlocking {
                target,
                value,
                span,
            }
        }
    }
}
