//! Local algebraic simplification.
//!
//! Children are simplified first, then the rules below are applied at the
//! node until none matches. Every rule either folds to a constant, returns
//! an operand, or wraps an operand in a single `Not`, so rewriting always
//! shrinks the tree and terminates.
//!
//! | Node | Rules |
//! |------|-------|
//! | `Not` | constant fold, `~~a → a` |
//! | `And` | `a&0 → 0`, `a&1 → a`, `a&a → a`, `a&~a → 0` |
//! | `Or` | `a|1 → 1`, `a|0 → a`, `a|a → a`, `a|~a → 1` |
//! | `Xor` | `a^0 → a`, `a^1 → ~a`, `a^a → 0`, `a^~a → 1` |
//! | `Xnor` | `a~^1 → a`, `a~^0 → ~a`, `a~^a → 1`, `a~^~a → 0` |
//! | `Nand`/`Nor` | dominating constant, `~(a&1) → ~a`, `~(a&a) → ~a` |
//! | `Eq`/`Neq` | fold, `a==a → 1`, 1-bit compare with a constant |
//! | `Mux` | constant selector, equal arms, `s?1:0 → s`, `s?0:1 → ~s` |
//!
//! "1" is all-ones in the operand width. Rules that produce a `Not` only
//! fire on 1-bit operands.

use crate::rebuild::{map_operands, map_stmt_exprs};
use logictree_ir::build::{bit, konst, not};
use logictree_ir::{mask, CmpOp, Expr, ExprRef, GateOp, StmtRef};
use std::convert::Infallible;

/// Simplifies an expression.
pub fn simplify(expr: &ExprRef) -> ExprRef {
    let children_done = match map_operands(expr, |c| Ok::<_, Infallible>(simplify(c))) {
        Ok(e) => e,
        Err(never) => match never {},
    };
    rewrite(children_done)
}

/// Simplifies every expression held by a statement.
pub fn simplify_stmt(stmt: &StmtRef) -> StmtRef {
    match map_stmt_exprs(stmt, &mut |e| Ok::<_, Infallible>(simplify(e))) {
        Ok(s) => s,
        Err(never) => match never {},
    }
}

fn rewrite(mut expr: ExprRef) -> ExprRef {
    while let Some(next) = rule(&expr) {
        expr = next;
    }
    expr
}

fn rule(expr: &ExprRef) -> Option<ExprRef> {
    match &**expr {
        Expr::Const(_) | Expr::Var(_) => None,
        Expr::Not(x) => match &**x {
            Expr::Const(c) => Some(konst(!c.value, c.width)),
            Expr::Not(inner) => Some(inner.clone()),
            _ => None,
        },
        Expr::Gate { op, a, b } => gate_rule(*op, a, b),
        Expr::Compare { op, lhs, rhs } => compare_rule(*op, lhs, rhs),
        Expr::Mux {
            selector,
            if_true,
            if_false,
        } => {
            if let Some(c) = selector.as_const() {
                return Some(if c.value & 1 == 1 {
                    if_true.clone()
                } else {
                    if_false.clone()
                });
            }
            if if_true == if_false {
                return Some(if_true.clone());
            }
            if if_true.width() == 1 {
                if if_true.is_ones() && if_false.is_zero() {
                    return Some(selector.clone());
                }
                if if_true.is_zero() && if_false.is_ones() {
                    return Some(not(selector.clone()));
                }
            }
            None
        }
        Expr::BitSelect { base, index } => base.as_const().map(|c| bit(c.bit_at(*index))),
        Expr::PartSelect { base, msb, lsb } => {
            let c = base.as_const()?;
            Some(konst(c.value >> (*msb).min(*lsb), expr.width()))
        }
        Expr::Concat(parts) => {
            let mut acc = 0u64;
            for p in parts {
                let c = p.as_const()?;
                acc = acc.checked_shl(c.width).unwrap_or(0) | (c.value & mask(c.width));
            }
            Some(konst(acc, expr.width()))
        }
    }
}

/// `a` is `~b` or `b` is `~a`.
fn complementary(a: &ExprRef, b: &ExprRef) -> bool {
    matches!(&**a, Expr::Not(x) if x == b) || matches!(&**b, Expr::Not(x) if x == a)
}

fn gate_rule(op: GateOp, a: &ExprRef, b: &ExprRef) -> Option<ExprRef> {
    let width = a.width();
    if let (Some(x), Some(y)) = (a.as_const(), b.as_const()) {
        return Some(konst(op.apply(x.value, y.value, width), width));
    }
    let zero = || konst(0, width);
    let ones = || konst(u64::MAX, width);
    let scalar = width == 1;
    match op {
        GateOp::And => {
            if a.is_zero() || b.is_zero() {
                Some(zero())
            } else if a.is_ones() {
                Some(b.clone())
            } else if b.is_ones() || a == b {
                Some(a.clone())
            } else if complementary(a, b) {
                Some(zero())
            } else {
                None
            }
        }
        GateOp::Or => {
            if a.is_ones() || b.is_ones() {
                Some(ones())
            } else if a.is_zero() {
                Some(b.clone())
            } else if b.is_zero() || a == b {
                Some(a.clone())
            } else if complementary(a, b) {
                Some(ones())
            } else {
                None
            }
        }
        GateOp::Xor => {
            if a.is_zero() {
                Some(b.clone())
            } else if b.is_zero() {
                Some(a.clone())
            } else if a == b {
                Some(zero())
            } else if scalar && a.is_ones() {
                Some(not(b.clone()))
            } else if scalar && b.is_ones() {
                Some(not(a.clone()))
            } else if complementary(a, b) {
                Some(ones())
            } else {
                None
            }
        }
        GateOp::Xnor => {
            if a == b {
                Some(ones())
            } else if a.is_ones() {
                Some(b.clone())
            } else if b.is_ones() {
                Some(a.clone())
            } else if scalar && a.is_zero() {
                Some(not(b.clone()))
            } else if scalar && b.is_zero() {
                Some(not(a.clone()))
            } else if complementary(a, b) {
                Some(zero())
            } else {
                None
            }
        }
        GateOp::Nand => {
            if a.is_zero() || b.is_zero() {
                Some(ones())
            } else if scalar && a.is_ones() {
                Some(not(b.clone()))
            } else if scalar && (b.is_ones() || a == b) {
                Some(not(a.clone()))
            } else if complementary(a, b) {
                Some(ones())
            } else {
                None
            }
        }
        GateOp::Nor => {
            if a.is_ones() || b.is_ones() {
                Some(zero())
            } else if scalar && a.is_zero() {
                Some(not(b.clone()))
            } else if scalar && (b.is_zero() || a == b) {
                Some(not(a.clone()))
            } else if complementary(a, b) {
                Some(zero())
            } else {
                None
            }
        }
    }
}

fn compare_rule(op: CmpOp, lhs: &ExprRef, rhs: &ExprRef) -> Option<ExprRef> {
    let wanted = op == CmpOp::Eq;
    if let (Some(x), Some(y)) = (lhs.as_const(), rhs.as_const()) {
        let m = mask(lhs.width());
        return Some(bit((x.value & m == y.value & m) == wanted));
    }
    if lhs == rhs {
        return Some(bit(wanted));
    }
    if complementary(lhs, rhs) {
        return Some(bit(!wanted));
    }
    if lhs.width() == 1 {
        let (subject, c) = match (lhs.as_const(), rhs.as_const()) {
            (None, Some(c)) => (lhs, c),
            (Some(c), None) => (rhs, c),
            _ => return None,
        };
        // `s == 1` is `s`, `s == 0` is `~s`; `!=` flips.
        return Some(if (c.value & 1 == 1) == wanted {
            subject.clone()
        } else {
            not(subject.clone())
        });
    }
    None
}
