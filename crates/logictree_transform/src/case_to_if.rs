//! Rewrites `case` statements into priority `if` chains or mux expressions.

use crate::error::{RewriteError, RewriteResult};
use logictree_config::CaseMode;
use logictree_ir::build::{and, expand_eq_const, konst, mux, not, or, or_all};
use logictree_ir::{
    Assign, CaseFallback, CaseItem, CaseStmt, ExprRef, IfStmt, Module, Stmt, StmtRef,
};
use std::collections::BTreeMap;

/// Result of rewriting one `case`.
#[derive(Clone, Debug, PartialEq)]
pub enum Lowered {
    /// [`CaseMode::If`]: a nested `if` statement.
    Stmt(StmtRef),
    /// [`CaseMode::Mux`]: the value assigned, as an expression.
    Expr(ExprRef),
}

impl Lowered {
    /// The statement, if this is one.
    pub fn as_stmt(&self) -> Option<&StmtRef> {
        match self {
            Lowered::Stmt(s) => Some(s),
            Lowered::Expr(_) => None,
        }
    }

    /// The expression, if this is one.
    pub fn as_expr(&self) -> Option<&ExprRef> {
        match self {
            Lowered::Expr(e) => Some(e),
            Lowered::Stmt(_) => None,
        }
    }
}

/// Knobs for [`case_to_if_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaseToIfOptions {
    /// Output shape.
    pub mode: CaseMode,
    /// Mux-mode value for selector values no arm covers.
    pub fallback: CaseFallback,
}

/// Rewrites `case` with the default [`CaseFallback`].
pub fn case_to_if(case: &CaseStmt, mode: CaseMode) -> RewriteResult<Lowered> {
    case_to_if_with(
        case,
        &CaseToIfOptions {
            mode,
            ..CaseToIfOptions::default()
        },
    )
}

/// Rewrites `case` into an `if` chain or a mux expression.
///
/// A 1-bit selector takes the first arm labeled 1 as the then-branch and
/// the first arm labeled 0 as the else-branch, with the default filling a
/// missing side. Wider selectors become a chain of bitwise-expanded
/// equalities in arm order, ending in the default.
pub fn case_to_if_with(case: &CaseStmt, options: &CaseToIfOptions) -> RewriteResult<Lowered> {
    if case.items.is_empty() {
        return Err(RewriteError::EmptyCase {
            selector: case.selector.to_string(),
        });
    }
    log::debug!(
        "case_to_if: case ({}) with {} item(s), mode {:?}",
        case.selector,
        case.items.len(),
        options.mode
    );
    let default = case.default_item().map(|d| &d.body);
    if case.selector.width() == 1 {
        if let Some(lowered) = binary(case, default, options)? {
            return Ok(lowered);
        }
    }
    let arms: Vec<(ExprRef, &StmtRef)> = case
        .labeled_items()
        .map(|item| (item_condition(&case.selector, item), &item.body))
        .collect();
    match options.mode {
        CaseMode::If => {
            let mut tail = default.cloned();
            for (cond, body) in arms.iter().rev() {
                tail = Some(if_node(cond.clone(), body, tail));
            }
            // Only reachable without labeled arms, where the default is the result.
            Ok(Lowered::Stmt(
                tail.unwrap_or_else(|| Stmt::Block(Vec::new()).into_ref()),
            ))
        }
        CaseMode::Mux => {
            let target = common_target(case)?;
            let mut tail = match default {
                Some(body) => rhs_of(body)?,
                None => fallback_value(target, options.fallback),
            };
            for (cond, body) in arms.iter().rev() {
                tail = select(cond.clone(), rhs_of(body)?, tail);
            }
            Ok(Lowered::Expr(tail))
        }
    }
}

/// 1-bit selector: `If(s, arm_1, arm_0)`. `None` when no arm is labeled 0 or 1.
fn binary(
    case: &CaseStmt,
    default: Option<&StmtRef>,
    options: &CaseToIfOptions,
) -> RewriteResult<Option<Lowered>> {
    let sel = &case.selector;
    let pick = |v: u64| {
        case.labeled_items()
            .find(|i| i.labels.iter().any(|l| l.value == v))
            .map(|i| &i.body)
    };
    let (on_one, on_zero) = (pick(1), pick(0));
    if on_one.is_none() && on_zero.is_none() {
        return Ok(None);
    }
    let then_body = on_one.or(default);
    let else_body = on_zero.or(default);
    let lowered = match options.mode {
        CaseMode::If => Lowered::Stmt(match (then_body, else_body) {
            (Some(t), e) => if_node(sel.clone(), t, e.cloned()),
            (None, Some(e)) => if_node(not(sel.clone()), e, None),
            (None, None) => return Ok(None),
        }),
        CaseMode::Mux => {
            let target = common_target(case)?;
            let value = |body: Option<&StmtRef>| match body {
                Some(b) => rhs_of(b),
                None => Ok(fallback_value(target, options.fallback)),
            };
            Lowered::Expr(select(sel.clone(), value(then_body)?, value(else_body)?))
        }
    };
    Ok(Some(lowered))
}

fn item_condition(sel: &ExprRef, item: &CaseItem) -> ExprRef {
    let terms = item.labels.iter().map(|l| expand_eq_const(sel, l.value));
    or_all(terms).unwrap_or_else(|| konst(0, 1))
}

fn if_node(cond: ExprRef, then_branch: &StmtRef, else_branch: Option<StmtRef>) -> StmtRef {
    Stmt::If(IfStmt {
        cond,
        then_branch: then_branch.clone(),
        else_branch,
    })
    .into_ref()
}

/// Rewrites every driver of `module` that is a `case`.
pub fn case_to_if_module(
    module: &Module,
    options: &CaseToIfOptions,
) -> RewriteResult<BTreeMap<String, Lowered>> {
    case_to_if_map(&module.drivers, options)
}

/// Rewrites every `case` value of `drivers`, keyed as in the input.
/// Other statements are skipped.
pub fn case_to_if_map(
    drivers: &BTreeMap<String, StmtRef>,
    options: &CaseToIfOptions,
) -> RewriteResult<BTreeMap<String, Lowered>> {
    let mut out = BTreeMap::new();
    for (name, stmt) in drivers {
        if let Stmt::Case(case) = &**stmt {
            out.insert(name.clone(), case_to_if_with(case, options)?);
        }
    }
    Ok(out)
}

/// `(c & t) | (~c & f)` for 1-bit values, a `Mux` otherwise.
fn select(cond: ExprRef, if_true: ExprRef, if_false: ExprRef) -> ExprRef {
    if if_true.width() == 1 {
        or(and(cond.clone(), if_true), and(not(cond), if_false))
    } else {
        mux(cond, if_true, if_false)
    }
}

fn single(body: &StmtRef) -> RewriteResult<&Assign> {
    body.single_assign()
        .ok_or(RewriteError::NotSingleAssign { kind: body.kind() })
}

fn rhs_of(body: &StmtRef) -> RewriteResult<ExprRef> {
    Ok(single(body)?.rhs().clone())
}

/// The one left-hand side every arm assigns.
fn common_target(case: &CaseStmt) -> RewriteResult<&ExprRef> {
    let mut bodies = case.items.iter().map(|i| &i.body);
    let first = match bodies.next() {
        Some(b) => single(b)?.lhs(),
        None => {
            return Err(RewriteError::EmptyCase {
                selector: case.selector.to_string(),
            })
        }
    };
    for body in bodies {
        let lhs = single(body)?.lhs();
        if lhs != first {
            return Err(RewriteError::MismatchedTargets {
                first: first.to_string(),
                second: lhs.to_string(),
            });
        }
    }
    Ok(first)
}

fn fallback_value(target: &ExprRef, fallback: CaseFallback) -> ExprRef {
    match fallback {
        CaseFallback::Zero => konst(0, target.width()),
        CaseFallback::Hold => target.clone(),
    }
}
