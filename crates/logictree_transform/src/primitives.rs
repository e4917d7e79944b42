//! Decomposition into AND, OR and NOT.
//!
//! 1-bit results become trees over variables, constants and bit-selects of
//! variables. A wider result is split per bit and reassembled with a
//! `Concat`, most significant bit first.

use crate::rebuild::map_stmt_exprs;
use logictree_ir::build::{and, bit, bit_of, concat, expand_eq, not, or};
use logictree_ir::{CmpOp, Expr, ExprRef, GateOp, StmtRef};
use std::convert::Infallible;

/// Rewrites `expr` using only AND, OR and NOT gates.
pub fn to_primitives(expr: &ExprRef) -> ExprRef {
    match &**expr {
        Expr::Const(_) | Expr::Var(_) => expr.clone(),
        _ if expr.width() > 1 => {
            let bits = (0..expr.width())
                .rev()
                .map(|i| scalar(&bit_of(expr, i)))
                .collect();
            concat(bits)
        }
        _ => scalar(expr),
    }
}

/// Applies [`to_primitives`] to every expression held by a statement.
pub fn to_primitives_stmt(stmt: &StmtRef) -> StmtRef {
    match map_stmt_exprs(stmt, &mut |e| Ok::<_, Infallible>(to_primitives(e))) {
        Ok(s) => s,
        Err(never) => match never {},
    }
}

/// `(a & ~b) | (~a & b)`
fn xor_sop(a: ExprRef, b: ExprRef) -> ExprRef {
    or(and(a.clone(), not(b.clone())), and(not(a), b))
}

/// `(a & b) | (~a & ~b)`
fn xnor_sop(a: ExprRef, b: ExprRef) -> ExprRef {
    or(and(a.clone(), b.clone()), and(not(a), not(b)))
}

fn scalar(expr: &ExprRef) -> ExprRef {
    match &**expr {
        Expr::Const(_) | Expr::Var(_) => expr.clone(),
        Expr::BitSelect { base, index } => {
            if base.as_var().is_some() {
                expr.clone()
            } else {
                scalar(&bit_of(base, *index))
            }
        }
        Expr::PartSelect { base, msb, lsb } => scalar(&bit_of(base, (*msb).min(*lsb))),
        // A 1-bit concat has exactly one part.
        Expr::Concat(parts) => match parts.last() {
            Some(p) => scalar(p),
            None => bit(false),
        },
        Expr::Not(x) => not(scalar(x)),
        Expr::Gate { op, a, b } => {
            let (a, b) = (scalar(a), scalar(b));
            match op {
                GateOp::And => and(a, b),
                GateOp::Or => or(a, b),
                GateOp::Xor => xor_sop(a, b),
                GateOp::Xnor => not(xor_sop(a, b)),
                GateOp::Nand => not(and(a, b)),
                GateOp::Nor => not(or(a, b)),
            }
        }
        Expr::Compare { op, lhs, rhs } => {
            let equal = if lhs.width() == 1 {
                None
            } else {
                Some(scalar(&expand_eq(lhs, rhs)))
            };
            match (op, equal) {
                (CmpOp::Eq, Some(e)) => e,
                (CmpOp::Neq, Some(e)) => not(e),
                (CmpOp::Eq, None) => xnor_sop(scalar(lhs), scalar(rhs)),
                (CmpOp::Neq, None) => xor_sop(scalar(lhs), scalar(rhs)),
            }
        }
        Expr::Mux {
            selector,
            if_true,
            if_false,
        } => {
            let s = scalar(selector);
            or(
                and(s.clone(), scalar(if_true)),
                and(not(s), scalar(if_false)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_ir::build::*;
    use logictree_ir::{all_assignments, assign, eval, only_primitives, Env, Stmt, Var};

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|n| n.to_string()).collect()
    }

    fn assert_equivalent(original: &ExprRef, names: &[String]) {
        let prim = to_primitives(original);
        assert!(only_primitives(&prim) || prim.width() > 1, "{prim}");
        for env in all_assignments(names) {
            assert_eq!(
                eval(original, &env).unwrap(),
                eval(&prim, &env).unwrap(),
                "{original} vs {prim} at {env:?}"
            );
        }
    }

    #[test]
    fn xor_expansion_shape() {
        let e = to_primitives(&xor(var("a"), var("b")));
        assert_eq!(e.to_string(), "((a & (~b)) | ((~a) & b))");
    }

    #[test]
    fn mux_becomes_and_or_form() {
        let e = to_primitives(&mux(var("s"), var("b"), var("a")));
        assert_eq!(e.to_string(), "((s & b) | ((~s) & a))");
    }

    #[test]
    fn compound_gates_are_equivalent() {
        let ns = names(&["a", "b", "c"]);
        let (a, b, c) = (var("a"), var("b"), var("c"));
        for e in [
            xnor(a.clone(), b.clone()),
            nand(a.clone(), c.clone()),
            nor(b.clone(), c.clone()),
            eq(a.clone(), b.clone()),
            neq(a.clone(), c.clone()),
            mux(c.clone(), xor(a.clone(), b.clone()), nand(a, b)),
        ] {
            assert_equivalent(&e, &ns);
        }
    }

    #[test]
    fn multi_bit_compare_expands_over_bits() {
        let (s, t) = (vec_var("s", 2), vec_var("t", 2));
        let e = to_primitives(&eq(s.clone(), t.clone()));
        assert!(only_primitives(&e));
        let ne = to_primitives(&neq(s.clone(), t.clone()));
        for sv in 0..4 {
            for tv in 0..4 {
                let env: Env = [("s".to_string(), sv), ("t".to_string(), tv)].into();
                assert_eq!(eval(&e, &env).unwrap(), (sv == tv) as u64);
                assert_eq!(eval(&ne, &env).unwrap(), (sv != tv) as u64);
            }
        }
    }

    #[test]
    fn vector_results_are_concats_of_bits() {
        let (v, w) = (vec_var("v", 2), vec_var("w", 2));
        let e = to_primitives(&xor(v, w));
        match &*e {
            Expr::Concat(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(parts.iter().all(|p| only_primitives(p)));
            }
            other => panic!("expected Concat, got {other}"),
        }
        let env: Env = [("v".to_string(), 0b10), ("w".to_string(), 0b11)].into();
        assert_eq!(eval(&e, &env).unwrap(), 0b01);
    }

    #[test]
    fn statement_rhs_is_rewritten() {
        let st = assign(Var::scalar("y"), xnor(var("a"), var("b")));
        let out = to_primitives_stmt(&st);
        match &*out {
            Stmt::Assign(a) => assert!(only_primitives(a.rhs())),
            other => panic!("expected Assign, got {}", other.kind()),
        }
    }
}
