//! Module item parsing: declarations, continuous assignments and the
//! `always` family.

use crate::ast::*;
use crate::parser::SvParser;
use crate::token::SvToken;

impl SvParser<'_> {
    /// Parses items up to `endmodule` or end of input.
    pub(crate) fn parse_module_items(&mut self) -> Vec<ModuleItem> {
        let mut items = Vec::new();
        while !self.at(SvToken::Endmodule) && !self.at_eof() {
            let before = self.pos;
            items.push(self.parse_module_item());
            if self.pos == before {
                // never spin on a token nothing accepts
                self.advance();
            }
        }
        items
    }

    fn parse_module_item(&mut self) -> ModuleItem {
        match self.current() {
            SvToken::Wire | SvToken::Logic | SvToken::Reg => self.parse_net_decl(),
            SvToken::Input | SvToken::Output | SvToken::Inout => self.parse_port_decl(),
            SvToken::Assign => self.parse_continuous_assign(),
            SvToken::Always => {
                let (body, span) = self.parse_always_body(SvToken::Always);
                ModuleItem::AlwaysBlock(AlwaysBlock { body, span })
            }
            SvToken::AlwaysComb => {
                let (body, span) = self.parse_always_body(SvToken::AlwaysComb);
                ModuleItem::AlwaysComb(AlwaysBlock { body, span })
            }
            SvToken::AlwaysLatch => {
                let (body, span) = self.parse_always_body(SvToken::AlwaysLatch);
                ModuleItem::AlwaysLatch(AlwaysBlock { body, span })
            }
            SvToken::AlwaysFf => self.parse_always_ff(),
            _ => {
                let start = self.current_span();
                if self.at(SvToken::Identifier) {
                    self.error("unsupported module item (instances and typed declarations are not part of the subset)");
                } else {
                    self.expected("module item");
                }
                self.recover_to_semicolon();
                ModuleItem::Error(start.merge(self.prev_span()))
            }
        }
    }

    /// `wire [3:0] a, b = c;`
    fn parse_net_decl(&mut self) -> ModuleItem {
        let start = self.current_span();
        let net = self.eat_net_kind();
        let signed = self.eat(SvToken::Signed);
        let range = self.at(SvToken::LeftBracket).then(|| self.parse_range());

        let mut names = Vec::new();
        loop {
            let name_start = self.current_span();
            let name = self.expect_ident();
            let init = self.eat(SvToken::Equals).then(|| self.parse_expr());
            names.push(DeclName {
                name,
                init,
                span: name_start.merge(self.prev_span()),
            });
            if !self.eat(SvToken::Comma) {
                break;
            }
        }
        self.expect(SvToken::Semicolon);

        ModuleItem::NetDecl(NetDecl {
            net,
            signed,
            range,
            names,
            span: start.merge(self.prev_span()),
        })
    }

    /// Non-ANSI body declaration: `output reg [1:0] y;`
    fn parse_port_decl(&mut self) -> ModuleItem {
        let start = self.current_span();
        let direction = self.eat_direction().unwrap_or(Direction::Input);
        let net = self.eat_net_kind();
        let signed = self.eat(SvToken::Signed);
        let range = self.at(SvToken::LeftBracket).then(|| self.parse_range());
        let names = self.parse_identifier_list();
        self.expect(SvToken::Semicolon);

        ModuleItem::PortDecl(SvPortDecl {
            direction,
            net,
            signed,
            range,
            names,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_continuous_assign(&mut self) -> ModuleItem {
        let start = self.current_span();
        self.expect(SvToken::Assign);
        let target = self.parse_expr();
        self.expect(SvToken::Equals);
        let value = self.parse_expr();
        self.expect(SvToken::Semicolon);
        ModuleItem::ContinuousAssign(ContinuousAssign {
            target,
            value,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_always_body(&mut self, keyword: SvToken) -> (Statement, logictree_source::Span) {
        let start = self.current_span();
        self.expect(keyword);
        let body = self.parse_statement();
        (body, start.merge(self.prev_span()))
    }

    fn parse_always_ff(&mut self) -> ModuleItem {
        let start = self.current_span();
        self.expect(SvToken::AlwaysFf);
        let sensitivity = if self.eat(SvToken::At) {
            self.parse_event_expression()
        } else {
            self.expected("`@`");
            SensitivityList::Star
        };
        let body = self.parse_statement();
        ModuleItem::AlwaysFf(AlwaysFfBlock {
            sensitivity,
            body,
            span: start.merge(self.prev_span()),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse_str;

    fn items(body: &str) -> Vec<ModuleItem> {
        let source = format!("module m; {body} endmodule");
        let parsed = parse_str(&source);
        assert!(
            !parsed.sink.has_errors(),
            "{:?}",
            parsed.sink.diagnostics()
        );
        let items = parsed
            .ast
            .modules()
            .next()
            .map(|m| m.items.clone())
            .unwrap_or_default();
        items
    }

    #[test]
    fn net_decl_with_initializer() {
        let items = items("wire [3:0] a, b = 4'b0;");
        let ModuleItem::NetDecl(decl) = &items[0] else {
            panic!("expected a net declaration");
        };
        assert_eq!(decl.net, NetKind::Wire);
        assert_eq!(decl.names.len(), 2);
        assert!(decl.names[0].init.is_none());
        assert!(decl.names[1].init.is_some());
    }

    #[test]
    fn body_port_decl() {
        let items = items("output reg signed [7:0] y;");
        let ModuleItem::PortDecl(p) = &items[0] else {
            panic!("expected a port declaration");
        };
        assert_eq!(p.direction, Direction::Output);
        assert_eq!(p.net, NetKind::Reg);
        assert!(p.signed);
    }

    #[test]
    fn always_variants() {
        let items = items(
            "always @(*) y = a;
             always_comb y = a;
             always_ff @(posedge clk) q <= d;
             always_latch if (en) q = d;",
        );
        assert!(matches!(items[0], ModuleItem::AlwaysBlock(_)));
        assert!(matches!(items[1], ModuleItem::AlwaysComb(_)));
        let ModuleItem::AlwaysFf(ff) = &items[2] else {
            panic!("expected always_ff");
        };
        assert!(!ff.sensitivity.is_combinational());
        assert!(matches!(items[3], ModuleItem::AlwaysLatch(_)));
    }

    #[test]
    fn instance_is_rejected_and_skipped() {
        let parsed = parse_str("module m; sub u0 (a, b); assign y = a; endmodule");
        assert_eq!(parsed.sink.error_count(), 1);
        let module = parsed.ast.modules().next().map(|m| m.items.len());
        assert_eq!(module, Some(2));
    }
}
