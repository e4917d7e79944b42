//! Child-mapping helpers shared by the rewrites.
//!
//! Both helpers return the original `Arc` when no child changed, so
//! untouched subtrees stay shared with the input.

use logictree_ir::build::{bit_select, concat, gate, mux, not, part_select};
use logictree_ir::{CaseItem, CaseStmt, Expr, ExprRef, IfStmt, Stmt, StmtRef};
use std::sync::Arc;

/// Rebuilds `expr` with every direct operand replaced by `f(operand)`.
pub(crate) fn map_operands<E>(
    expr: &ExprRef,
    mut f: impl FnMut(&ExprRef) -> Result<ExprRef, E>,
) -> Result<ExprRef, E> {
    fn same(a: &ExprRef, b: &ExprRef) -> bool {
        Arc::ptr_eq(a, b)
    }
    let rebuilt = match &**expr {
        Expr::Const(_) | Expr::Var(_) => return Ok(expr.clone()),
        Expr::Not(x) => {
            let x2 = f(x)?;
            if same(x, &x2) {
                return Ok(expr.clone());
            }
            not(x2)
        }
        Expr::Gate { op, a, b } => {
            let (a2, b2) = (f(a)?, f(b)?);
            if same(a, &a2) && same(b, &b2) {
                return Ok(expr.clone());
            }
            gate(*op, a2, b2)
        }
        Expr::Compare { op, lhs, rhs } => {
            let (l2, r2) = (f(lhs)?, f(rhs)?);
            if same(lhs, &l2) && same(rhs, &r2) {
                return Ok(expr.clone());
            }
            Expr::Compare {
                op: *op,
                lhs: l2,
                rhs: r2,
            }
            .into_ref()
        }
        Expr::Mux {
            selector,
            if_true,
            if_false,
        } => {
            let (s2, t2, f2) = (f(selector)?, f(if_true)?, f(if_false)?);
            if same(selector, &s2) && same(if_true, &t2) && same(if_false, &f2) {
                return Ok(expr.clone());
            }
            mux(s2, t2, f2)
        }
        Expr::BitSelect { base, index } => {
            let b2 = f(base)?;
            if same(base, &b2) {
                return Ok(expr.clone());
            }
            bit_select(b2, *index)
        }
        Expr::PartSelect { base, msb, lsb } => {
            let b2 = f(base)?;
            if same(base, &b2) {
                return Ok(expr.clone());
            }
            part_select(b2, *msb, *lsb)
        }
        Expr::Concat(parts) => {
            let parts2 = parts.iter().map(&mut f).collect::<Result<Vec<_>, E>>()?;
            if parts.iter().zip(&parts2).all(|(p, q)| same(p, q)) {
                return Ok(expr.clone());
            }
            concat(parts2)
        }
    };
    Ok(rebuilt)
}

/// Rebuilds `stmt` with every expression it holds replaced by `f(expr)`.
///
/// Assignment targets are left alone; only right-hand sides, conditions and
/// selectors go through `f`.
pub(crate) fn map_stmt_exprs<E>(
    stmt: &StmtRef,
    f: &mut impl FnMut(&ExprRef) -> Result<ExprRef, E>,
) -> Result<StmtRef, E> {
    let rebuilt = match &**stmt {
        Stmt::Assign(a) => {
            let rhs = f(a.rhs())?;
            if Arc::ptr_eq(&rhs, a.rhs()) {
                return Ok(stmt.clone());
            }
            Stmt::Assign(a.with_rhs(rhs))
        }
        Stmt::If(i) => Stmt::If(IfStmt {
            cond: f(&i.cond)?,
            then_branch: map_stmt_exprs(&i.then_branch, f)?,
            else_branch: match &i.else_branch {
                Some(e) => Some(map_stmt_exprs(e, f)?),
                None => None,
            },
        }),
        Stmt::Case(c) => {
            let selector = f(&c.selector)?;
            let mut items = Vec::with_capacity(c.items.len());
            for item in &c.items {
                items.push(CaseItem {
                    labels: item.labels.clone(),
                    body: map_stmt_exprs(&item.body, f)?,
                    is_default: item.is_default,
                });
            }
            Stmt::Case(CaseStmt { selector, items })
        }
        Stmt::Block(stmts) => Stmt::Block(
            stmts
                .iter()
                .map(|s| map_stmt_exprs(s, f))
                .collect::<Result<_, E>>()?,
        ),
    };
    Ok(rebuilt.into_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_ir::build::*;
    use std::convert::Infallible;

    #[test]
    fn unchanged_children_keep_identity() {
        let e = and(var("a"), not(var("b")));
        let out = map_operands(&e, |c| Ok::<_, Infallible>(c.clone())).unwrap();
        assert!(Arc::ptr_eq(&e, &out));
    }

    #[test]
    fn changed_child_rebuilds_parent() {
        let e = or(var("a"), var("b"));
        let out = map_operands(&e, |c| Ok::<_, Infallible>(not(c.clone()))).unwrap();
        assert_eq!(out.to_string(), "((~a) | (~b))");
    }
}
