//! Collapses a full `if`/`else` over one target into a mux assignment.

use crate::error::{RewriteError, RewriteResult};
use logictree_ir::build::mux;
use logictree_ir::{Assign, IfStmt, Stmt, StmtRef};

/// `if (c) y = t; else y = f;` becomes `y = c ? t : f`.
///
/// Else-if chains are collapsed from the innermost `if` outwards, so
/// `if (c0) y = a; else if (c1) y = b; else y = d;` becomes
/// `y = c0 ? a : (c1 ? b : d)`.
pub fn if_to_mux(stmt: &Stmt) -> RewriteResult<StmtRef> {
    match stmt {
        Stmt::If(i) => Ok(Stmt::Assign(collapse(i)?).into_ref()),
        // A block around a single `if` is accepted too.
        Stmt::Block(stmts) if stmts.len() == 1 => if_to_mux(&stmts[0]),
        other => Err(RewriteError::WrongKind {
            expected: "If",
            found: other.kind(),
        }),
    }
}

fn collapse(i: &IfStmt) -> RewriteResult<Assign> {
    let else_branch = i.else_branch.as_ref().ok_or_else(|| RewriteError::MissingElse {
        cond: i.cond.to_string(),
    })?;
    let then_assign = branch(&i.then_branch)?;
    let else_assign = branch(else_branch)?;
    if then_assign.lhs() != else_assign.lhs() {
        return Err(RewriteError::MismatchedTargets {
            first: then_assign.lhs().to_string(),
            second: else_assign.lhs().to_string(),
        });
    }
    log::debug!("if_to_mux: {} selects on {}", then_assign.lhs(), i.cond);
    Ok(then_assign.with_rhs(mux(
        i.cond.clone(),
        then_assign.rhs().clone(),
        else_assign.rhs().clone(),
    )))
}

fn branch(stmt: &StmtRef) -> RewriteResult<Assign> {
    if let Some(a) = stmt.single_assign() {
        return Ok(a.clone());
    }
    match &**stmt {
        Stmt::If(inner) => collapse(inner),
        Stmt::Block(stmts) if stmts.len() == 1 => branch(&stmts[0]),
        other => Err(RewriteError::NotSingleAssign { kind: other.kind() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_ir::build::*;
    use logictree_ir::{all_assignments, assign, exec, if_stmt, CaseFallback, Var};

    fn y() -> Var {
        Var::scalar("y")
    }

    #[test]
    fn full_if_becomes_mux() {
        let st = if_stmt(var("c"), assign(y(), var("a")), Some(assign(y(), var("b"))));
        let out = if_to_mux(&st).unwrap();
        assert_eq!(out.single_assign().unwrap().to_string(), "y = (c ? a : b)");
    }

    #[test]
    fn else_if_chain_is_collapsed_recursively() {
        let st = if_stmt(
            var("c0"),
            assign(y(), var("a")),
            Some(if_stmt(
                var("c1"),
                assign(y(), var("b")),
                Some(assign(y(), var("d"))),
            )),
        );
        let out = if_to_mux(&st).unwrap();
        assert_eq!(
            out.single_assign().unwrap().to_string(),
            "y = (c0 ? a : (c1 ? b : d))"
        );
        let names: Vec<String> = ["c0", "c1", "a", "b", "d"]
            .iter()
            .map(|n| n.to_string())
            .collect();
        for env in all_assignments(&names) {
            assert_eq!(
                exec(&st, &env, CaseFallback::Zero).unwrap(),
                exec(&out, &env, CaseFallback::Zero).unwrap()
            );
        }
    }

    #[test]
    fn missing_else_is_rejected() {
        let st = if_stmt(var("c"), assign(y(), var("a")), None);
        assert_eq!(
            if_to_mux(&st).unwrap_err(),
            RewriteError::MissingElse { cond: "c".into() }
        );
    }

    #[test]
    fn different_targets_are_rejected() {
        let st = if_stmt(
            var("c"),
            assign(y(), var("a")),
            Some(assign(Var::scalar("z"), var("b"))),
        );
        assert!(matches!(
            if_to_mux(&st).unwrap_err(),
            RewriteError::MismatchedTargets { .. }
        ));
    }

    #[test]
    fn multi_statement_branch_is_rejected() {
        let body = Stmt::Block(vec![assign(y(), var("a")), assign(y(), var("b"))]).into_ref();
        let st = if_stmt(var("c"), body, Some(assign(y(), var("d"))));
        assert_eq!(
            if_to_mux(&st).unwrap_err(),
            RewriteError::NotSingleAssign { kind: "Block" }
        );
    }

    #[test]
    fn non_if_input_is_rejected() {
        let err = if_to_mux(&assign(y(), var("a"))).unwrap_err();
        assert!(matches!(err, RewriteError::WrongKind { found: "Assign", .. }));
    }
}
