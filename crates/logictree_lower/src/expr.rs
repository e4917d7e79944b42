//! Expression lowering.
//!
//! Expressions are lowered bottom-up. Unsized literals stay unresolved until
//! the other operand or the assignment target gives them a width.

use crate::context::LoweringCtx;
use crate::error::{LowerError, LowerResult, W201};
use crate::literal::Literal;
use logictree_diagnostics::Diagnostic;
use logictree_ir::build::{bit, bit_of, expand_eq_const, not, var_ref};
use logictree_ir::{CmpOp, Expr, ExprRef, GateOp, MAX_WIDTH};
use logictree_source::Span;
use logictree_sv_parser::ast::{self, BinaryOp, UnaryOp};

/// A lowered operand whose width may still be open.
#[derive(Clone, Debug)]
pub(crate) enum Operand {
    Sized(ExprRef),
    Unsized(Literal),
}

impl LoweringCtx<'_> {
    /// Lowers an expression at its own width.
    pub fn lower_expr(&mut self, e: &ast::Expr) -> LowerResult<ExprRef> {
        Ok(match self.operand(e)? {
            Operand::Sized(x) => x,
            Operand::Unsized(lit) => Expr::Const(lit.to_const()).into_ref(),
        })
    }

    /// Lowers an expression that must be `width` bits wide.
    pub fn lower_expr_to(&mut self, e: &ast::Expr, width: u32) -> LowerResult<ExprRef> {
        let op = self.operand(e)?;
        self.fit(op, width, e.span())
    }

    /// Lowers a condition to one bit; a vector is true when nonzero.
    pub fn lower_cond(&mut self, e: &ast::Expr) -> LowerResult<ExprRef> {
        let x = self.lower_expr(e)?;
        Ok(if x.width() == 1 {
            x
        } else {
            not(expand_eq_const(&x, 0))
        })
    }

    /// Lowers an assignment target: a variable or a constant select of one.
    pub fn lower_lvalue(&mut self, target: &ast::Expr) -> LowerResult<ExprRef> {
        let lhs = match target.unparen() {
            ast::Expr::Identifier { name, span } => {
                let name = self.name(*name);
                var_ref(&self.lookup(name, *span)?)
            }
            e @ (ast::Expr::Index { .. } | ast::Expr::RangeSelect { .. }) => self.select(e)?,
            other => {
                return Err(LowerError::Unsupported {
                    what: format!("assignment target `{}`", self.text(other.span())),
                    span: other.span(),
                })
            }
        };
        Ok(lhs)
    }

    fn fit(&self, op: Operand, width: u32, span: Span) -> LowerResult<ExprRef> {
        match op {
            Operand::Sized(x) if x.width() == width => Ok(x),
            Operand::Sized(x) => Err(LowerError::WidthMismatch {
                detail: format!(
                    "`{}` is {} bits, expected {width}",
                    self.text(span),
                    x.width()
                ),
                span,
            }),
            Operand::Unsized(lit) => match lit.fit(width) {
                Some(c) => Ok(Expr::Const(c).into_ref()),
                None => Err(LowerError::WidthMismatch {
                    detail: format!("literal `{}` does not fit in {width} bits", lit.text),
                    span,
                }),
            },
        }
    }

    /// Brings two operands to a common width.
    fn unify(
        &self,
        a: Operand,
        b: Operand,
        spans: (Span, Span),
    ) -> LowerResult<(ExprRef, ExprRef)> {
        match (a, b) {
            (Operand::Sized(x), Operand::Sized(y)) => {
                if x.width() != y.width() {
                    return Err(LowerError::WidthMismatch {
                        detail: format!(
                            "`{}` is {} bits but `{}` is {} bits",
                            self.text(spans.0),
                            x.width(),
                            self.text(spans.1),
                            y.width()
                        ),
                        span: spans.0.merge(spans.1),
                    });
                }
                Ok((x, y))
            }
            (Operand::Sized(x), lit @ Operand::Unsized(_)) => {
                let w = x.width();
                Ok((x, self.fit(lit, w, spans.1)?))
            }
            (lit @ Operand::Unsized(_), Operand::Sized(y)) => {
                let w = y.width();
                Ok((self.fit(lit, w, spans.0)?, y))
            }
            (Operand::Unsized(l), Operand::Unsized(r)) => {
                let w = l.width.max(r.width);
                Ok((
                    self.fit(Operand::Unsized(l), w, spans.0)?,
                    self.fit(Operand::Unsized(r), w, spans.1)?,
                ))
            }
        }
    }

    pub(crate) fn operand(&mut self, e: &ast::Expr) -> LowerResult<Operand> {
        let x = match e {
            ast::Expr::Identifier { name, span } => {
                let name = self.name(*name);
                var_ref(&self.lookup(name, *span)?)
            }
            ast::Expr::Literal { kind, span } => {
                let lit = Literal::parse(self.text(*span), *kind, self.strict_literals, *span)?;
                if !lit.sized {
                    return Ok(Operand::Unsized(lit));
                }
                Expr::Const(lit.to_const()).into_ref()
            }
            ast::Expr::Paren { inner, .. } => return self.operand(inner),
            ast::Expr::Index { .. } | ast::Expr::RangeSelect { .. } => self.select(e)?,
            ast::Expr::Concat { elements, span } => self.concat(elements, 1, *span)?,
            ast::Expr::Repeat {
                count,
                elements,
                span,
            } => {
                let n = match self.constant(count)? {
                    Some(n) if n > 0 => n,
                    _ => {
                        return Err(LowerError::Unsupported {
                            what: format!("replication count `{}`", self.text(count.span())),
                            span: count.span(),
                        })
                    }
                };
                self.concat(elements, n, *span)?
            }
            ast::Expr::Unary { op, operand, span } => self.unary(*op, operand, *span)?,
            ast::Expr::Binary {
                left,
                op,
                right,
                span,
            } => self.binary(left, *op, right, *span)?,
            ast::Expr::Ternary {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                let c = self.lower_cond(condition)?;
                let t = self.operand(then_expr)?;
                let f = self.operand(else_expr)?;
                let (t, f) = self.unify(t, f, (then_expr.span(), else_expr.span()))?;
                Expr::new_mux(c, t, f)?
            }
            ast::Expr::Error(span) => {
                return Err(LowerError::Unsupported {
                    what: "malformed expression".into(),
                    span: *span,
                })
            }
        };
        Ok(Operand::Sized(x))
    }

    fn unary(&mut self, op: UnaryOp, operand: &ast::Expr, span: Span) -> LowerResult<ExprRef> {
        match op {
            UnaryOp::LogNot => Ok(not(self.lower_cond(operand)?)),
            UnaryOp::BitNot => {
                let x = self.lower_expr(operand)?;
                if x.width() == 1 {
                    return Ok(Expr::new_not(x)?);
                }
                let bits = (0..x.width()).rev().map(|i| not(bit_of(&x, i))).collect();
                Ok(Expr::new_concat(bits)?)
            }
            _ => Err(LowerError::Unsupported {
                what: format!("reduction operator `{}`", op.as_str()),
                span,
            }),
        }
    }

    fn binary(
        &mut self,
        left: &ast::Expr,
        op: BinaryOp,
        right: &ast::Expr,
        span: Span,
    ) -> LowerResult<ExprRef> {
        let gate = match op {
            BinaryOp::LogAnd | BinaryOp::LogOr => {
                let a = self.lower_cond(left)?;
                let b = self.lower_cond(right)?;
                let op = if op == BinaryOp::LogAnd {
                    GateOp::And
                } else {
                    GateOp::Or
                };
                return Ok(Expr::new_gate(op, a, b)?);
            }
            BinaryOp::Eq | BinaryOp::Neq => {
                return self.equality(left, op == BinaryOp::Neq, right, span)
            }
            BinaryOp::BitAnd => GateOp::And,
            BinaryOp::BitOr => GateOp::Or,
            BinaryOp::BitXor => GateOp::Xor,
            BinaryOp::BitXnor => GateOp::Xnor,
        };
        let a = self.operand(left)?;
        let b = self.operand(right)?;
        let (a, b) = self.unify(a, b, (left.span(), right.span()))?;
        Ok(Expr::new_gate(gate, a, b)?)
    }

    /// `==`/`!=`. Against a constant on a signal or select, the test is
    /// expanded into bit literals; otherwise it stays a comparison node.
    fn equality(
        &mut self,
        left: &ast::Expr,
        negate: bool,
        right: &ast::Expr,
        span: Span,
    ) -> LowerResult<ExprRef> {
        let a = self.operand(left)?;
        let b = self.operand(right)?;
        let expandable = match (&a, &b) {
            (Operand::Sized(x), k) | (k, Operand::Sized(x)) if is_bit_addressable(x) => {
                constant_value(k, x.width()).map(|v| (x.clone(), v))
            }
            _ => None,
        };
        let Some((subject, value)) = expandable else {
            return self.compare(a, b, negate, (left.span(), right.span()));
        };
        let width = subject.width();
        if width < 64 && value >> width != 0 {
            self.warn(Diagnostic::warning(
                W201,
                format!(
                    "`{}` can never equal {value}; the comparison is constant",
                    subject
                ),
                span,
            ));
            return Ok(bit(negate));
        }
        let e = expand_eq_const(&subject, value);
        Ok(if negate { not(e) } else { e })
    }

    fn compare(
        &self,
        a: Operand,
        b: Operand,
        negate: bool,
        spans: (Span, Span),
    ) -> LowerResult<ExprRef> {
        let (a, b) = self.unify(a, b, spans)?;
        let op = if negate { CmpOp::Neq } else { CmpOp::Eq };
        Ok(Expr::new_compare(op, a, b)?)
    }

    fn concat(&mut self, elements: &[ast::Expr], times: u64, span: Span) -> LowerResult<ExprRef> {
        let mut parts = Vec::with_capacity(elements.len());
        for el in elements {
            match self.operand(el)? {
                Operand::Sized(x) => parts.push(x),
                Operand::Unsized(lit) => {
                    return Err(LowerError::Unsupported {
                        what: format!("unsized literal `{}` in a concatenation", lit.text),
                        span: el.span(),
                    })
                }
            }
        }
        let once_width: u64 = parts.iter().map(|p| u64::from(p.width())).sum();
        let total = once_width.checked_mul(times);
        if total.map_or(true, |w| w > u64::from(MAX_WIDTH)) {
            return Err(LowerError::WidthMismatch {
                detail: format!(
                    "concatenation of {times} x {once_width} bits is wider than {MAX_WIDTH} bits"
                ),
                span,
            });
        }
        let once = parts.clone();
        for _ in 1..times {
            parts.extend(once.iter().cloned());
        }
        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        Ok(Expr::new_concat(parts)?)
    }

    /// `s[i]` or `s[m:l]` with constant bounds, renumbered from the low
    /// bound of the declaration.
    fn select(&mut self, e: &ast::Expr) -> LowerResult<ExprRef> {
        let (base, span) = match e {
            ast::Expr::Index { base, span, .. } | ast::Expr::RangeSelect { base, span, .. } => {
                (base, *span)
            }
            _ => {
                return Err(LowerError::Unsupported {
                    what: format!("select `{}`", self.text(e.span())),
                    span: e.span(),
                })
            }
        };
        let ast::Expr::Identifier { name, span: name_span } = base.unparen() else {
            return Err(LowerError::Unsupported {
                what: format!("select of `{}`", self.text(base.span())),
                span,
            });
        };
        let name = self.name(*name);
        let var = self.lookup(name, *name_span)?;
        let low = self.low_bound(name);
        let position = |ctx: &Self, bound: &ast::Expr| -> LowerResult<u32> {
            let Some(index) = ctx.constant(bound)? else {
                return Err(LowerError::NonConstantSelect {
                    signal: name.to_string(),
                    span,
                });
            };
            let pos = i64::try_from(index).unwrap_or(i64::MAX).saturating_sub(low);
            if pos < 0 || pos >= i64::from(var.width) {
                let select = ctx.text(span).strip_prefix(ctx.text(base.span())).unwrap_or("");
                return Err(LowerError::SelectOutOfRange {
                    signal: name.to_string(),
                    select: select.trim().to_string(),
                    span,
                });
            }
            Ok(pos as u32)
        };
        let base = var_ref(&var);
        Ok(match e {
            ast::Expr::RangeSelect { msb, lsb, .. } => {
                let m = position(&*self, msb)?;
                let l = position(&*self, lsb)?;
                Expr::new_part_select(base, m, l)?
            }
            _ => {
                let ast::Expr::Index { index, .. } = e else {
                    return Err(LowerError::Unsupported {
                        what: format!("select `{}`", self.text(span)),
                        span,
                    });
                };
                Expr::new_bit_select(base, position(&*self, index)?)?
            }
        })
    }

    /// Value of a literal, looking through parentheses; `None` for anything
    /// that is not a literal.
    pub(crate) fn constant(&self, e: &ast::Expr) -> LowerResult<Option<u64>> {
        match e.unparen() {
            ast::Expr::Literal { kind, span } => {
                let lit = Literal::parse(self.text(*span), *kind, self.strict_literals, *span)?;
                Ok(Some(lit.value))
            }
            _ => Ok(None),
        }
    }
}

fn is_bit_addressable(x: &Expr) -> bool {
    matches!(
        x,
        Expr::Var(_) | Expr::PartSelect { .. } | Expr::BitSelect { .. }
    )
}

/// Value of a constant operand compared against a `width`-bit subject.
fn constant_value(op: &Operand, width: u32) -> Option<u64> {
    match op {
        Operand::Unsized(lit) if lit.fill.is_some() => lit.fit(width).map(|c| c.value),
        Operand::Unsized(lit) => Some(lit.value),
        Operand::Sized(x) => x.as_const().map(|c| c.value),
    }
}

#[cfg(test)]
mod tests {
    use crate::{lower_source, LowerError, LowerOptions};
    use logictree_ir::build::*;
    use logictree_ir::Module;

    fn rhs_of(src: &str, target: &str) -> logictree_ir::ExprRef {
        let modules = lower_source(src, &LowerOptions::default()).unwrap();
        modules[0].assignments[target].rhs().clone()
    }

    fn lower_err(src: &str) -> LowerError {
        lower_source(src, &LowerOptions::default()).unwrap_err()
    }

    fn one(src: &str) -> Module {
        lower_source(src, &LowerOptions::default()).unwrap().remove(0)
    }

    #[test]
    fn gates_map_one_to_one() {
        let y = rhs_of(
            "module m(input a, b, c, d, output y); assign y = (a & b) | (c ^ d) | ~(a ~^ c); endmodule",
            "y",
        );
        let expected = or(
            or(and(var("a"), var("b")), xor(var("c"), var("d"))),
            not(xnor(var("a"), var("c"))),
        );
        assert_eq!(*y, *expected);
    }

    #[test]
    fn logical_operators_reduce_vectors() {
        let y = rhs_of(
            "module m(input [1:0] s, input a, output y); assign y = s && !a; endmodule",
            "y",
        );
        let s = vec_var("s", 2);
        let nonzero = not(and(not(bit_select(s.clone(), 1)), not(bit_select(s, 0))));
        assert_eq!(*y, *and(nonzero, not(var("a"))));
    }

    #[test]
    fn equality_against_constant_expands() {
        let y = rhs_of(
            "module m(input [1:0] s, output y); assign y = (s == 2'b10); endmodule",
            "y",
        );
        let s = vec_var("s", 2);
        assert_eq!(*y, *and(bit_select(s.clone(), 1), not(bit_select(s, 0))));
    }

    #[test]
    fn constant_on_the_left_and_inequality() {
        let y = rhs_of(
            "module m(input [1:0] s, output y); assign y = (2'b01 != s); endmodule",
            "y",
        );
        let s = vec_var("s", 2);
        assert_eq!(*y, *not(and(not(bit_select(s.clone(), 1)), bit_select(s, 0))));
    }

    #[test]
    fn equality_on_a_part_select_uses_absolute_bits() {
        let y = rhs_of(
            "module m(input [3:0] s, output y); assign y = (s[3:2] == 2'b01); endmodule",
            "y",
        );
        let s = vec_var("s", 4);
        assert_eq!(*y, *and(not(bit_select(s.clone(), 3)), bit_select(s, 2)));
    }

    #[test]
    fn impossible_constant_is_a_constant_result() {
        let m = one("module m(input [1:0] s, output y, output z); assign y = (s == 5); assign z = (s != 3'd7); endmodule");
        assert_eq!(*m.assignments["y"].rhs().clone(), *bit(false));
        assert_eq!(*m.assignments["z"].rhs().clone(), *bit(true));
    }

    #[test]
    fn vector_against_vector_stays_a_comparison() {
        let y = rhs_of(
            "module m(input [1:0] a, b, output y); assign y = a == b; endmodule",
            "y",
        );
        assert_eq!(*y, *eq(vec_var("a", 2), vec_var("b", 2)));
    }

    #[test]
    fn ascending_ranges_renumber_from_the_low_bound() {
        let m = one("module m(input [0:3] v, input [7:4] w, output y, output z); assign y = v[3]; assign z = w[4]; endmodule");
        assert_eq!(*m.assignments["y"].rhs().clone(), *bit_select(vec_var("v", 4), 3));
        assert_eq!(*m.assignments["z"].rhs().clone(), *bit_select(vec_var("w", 4), 0));
    }

    #[test]
    fn unsized_literals_take_the_context_width() {
        let y = rhs_of(
            "module m(input [3:0] a, output [3:0] y); assign y = a & 3; endmodule",
            "y",
        );
        assert_eq!(y.width(), 4);
        let y = rhs_of(
            "module m(input [3:0] a, output [3:0] y); assign y = a ^ '1; endmodule",
            "y",
        );
        let Some(c) = y.operands()[1].as_const() else {
            panic!("expected a constant operand in {y}");
        };
        assert!(c.is_ones());
    }

    #[test]
    fn ternary_becomes_mux() {
        let y = rhs_of(
            "module m(input s, a, b, output y); assign y = s ? a : b; endmodule",
            "y",
        );
        assert_eq!(*y, *mux(var("s"), var("a"), var("b")));
    }

    #[test]
    fn concat_and_repeat() {
        let y = rhs_of(
            "module m(input a, b, output [3:0] y); assign y = {a, {2{b}}, 1'b0}; endmodule",
            "y",
        );
        assert_eq!(y.width(), 4);
        assert_eq!(y.kind(), "Concat");
    }

    #[test]
    fn vector_not_is_bitwise() {
        let y = rhs_of(
            "module m(input [1:0] a, output [1:0] y); assign y = ~a; endmodule",
            "y",
        );
        let a = vec_var("a", 2);
        assert_eq!(
            *y,
            *concat(vec![not(bit_select(a.clone(), 1)), not(bit_select(a, 0))])
        );
    }

    #[test]
    fn replication_is_bounded_before_it_is_built() {
        assert!(matches!(
            lower_err("module m(input a, output y); assign y = {4000000000{a}}; endmodule"),
            LowerError::WidthMismatch { ref detail, .. } if detail.contains("4000000000")
        ));
        assert!(matches!(
            lower_err("module m(input [1:0] a, output y); assign y = {33{a}}; endmodule"),
            LowerError::WidthMismatch { .. }
        ));
        let y = rhs_of(
            "module m(input [1:0] a, output [63:0] y); assign y = {32{a}}; endmodule",
            "y",
        );
        assert_eq!(y.width(), 64);
    }

    #[test]
    fn rejected_expressions() {
        assert!(matches!(
            lower_err("module m(input [3:0] a, output y); assign y = &a; endmodule"),
            LowerError::Unsupported { .. }
        ));
        assert!(matches!(
            lower_err("module m(input [3:0] a, input i, output y); assign y = a[i]; endmodule"),
            LowerError::NonConstantSelect { ref signal, .. } if signal == "a"
        ));
        assert!(matches!(
            lower_err("module m(input [3:0] a, output y); assign y = a[4]; endmodule"),
            LowerError::SelectOutOfRange { ref select, .. } if select == "[4]"
        ));
        assert!(matches!(
            lower_err("module m(input [3:0] a, input [1:0] b, output [3:0] y); assign y = a & b; endmodule"),
            LowerError::WidthMismatch { .. }
        ));
        assert!(matches!(
            lower_err("module m(input [1:0] a, output [1:0] y); assign y = a & 5; endmodule"),
            LowerError::WidthMismatch { .. }
        ));
    }
}
