//! Procedural statements: AST to IR statements, and combinational
//! flattening of a process into one right-hand side per written target.

use crate::context::LoweringCtx;
use crate::error::{LowerError, LowerResult};
use crate::expr::Operand;
use logictree_ir::build::{
    and, and_all, expand_eq_const, konst, mux, not, or_all, splice, var_ref,
};
use logictree_ir::{
    Assign, CaseFallback, CaseItem, CaseStmt, Expr, ExprRef, IfStmt, Stmt, StmtRef,
};
use logictree_source::Span;
use logictree_sv_parser::ast::{self, CaseArm, CaseKind, Statement};
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// AST to IR
// ============================================================================

impl LoweringCtx<'_> {
    /// Lowers a procedural statement. Null statements lower to `None`.
    pub fn lower_stmt(&mut self, stmt: &Statement) -> LowerResult<Option<StmtRef>> {
        let lowered = match stmt {
            Statement::Blocking { target, value, .. } => {
                let lhs = self.lower_lvalue(target)?;
                let rhs = self.lower_expr_to(value, lhs.width())?;
                Stmt::Assign(Assign::new(lhs, rhs)?)
            }
            Statement::NonBlocking { span, .. } => {
                return Err(LowerError::Unsupported {
                    what: "non-blocking assignment `<=`".into(),
                    span: *span,
                })
            }
            Statement::Block { stmts, .. } => {
                let mut body = Vec::with_capacity(stmts.len());
                for s in stmts {
                    if let Some(s) = self.lower_stmt(s)? {
                        body.push(s);
                    }
                }
                Stmt::Block(body)
            }
            Statement::If {
                condition,
                then_stmt,
                else_stmt,
                ..
            } => {
                let cond = self.lower_cond(condition)?;
                let then_branch = self
                    .lower_stmt(then_stmt)?
                    .unwrap_or_else(|| Stmt::Block(Vec::new()).into_ref());
                let else_branch = match else_stmt {
                    Some(e) => self.lower_stmt(e)?,
                    None => None,
                };
                Stmt::If(IfStmt::new(cond, then_branch, else_branch)?)
            }
            Statement::Case {
                kind, expr, arms, span,
            } => Stmt::Case(self.lower_case(*kind, expr, arms, *span)?),
            Statement::EventControl { span, .. } => {
                return Err(LowerError::Unsupported {
                    what: "event control inside a procedural block".into(),
                    span: *span,
                })
            }
            Statement::Null(_) => return Ok(None),
            Statement::Error(span) => {
                return Err(LowerError::Unsupported {
                    what: "malformed statement".into(),
                    span: *span,
                })
            }
        };
        let lowered = lowered.into_ref();
        let source = self.text(stmt.span()).trim();
        self.overlay.set_stmt_source(&lowered, source);
        Ok(Some(lowered))
    }

    fn lower_case(
        &mut self,
        kind: CaseKind,
        selector: &ast::Expr,
        arms: &[CaseArm],
        span: Span,
    ) -> LowerResult<CaseStmt> {
        if kind != CaseKind::Case {
            let what = if kind == CaseKind::Casez { "casez" } else { "casex" };
            return Err(LowerError::Unsupported {
                what: what.into(),
                span,
            });
        }
        let selector = self.lower_expr(selector)?;
        let width = selector.width();
        let mut items = Vec::with_capacity(arms.len());
        let mut seen_default = false;
        for arm in arms {
            let body = self
                .lower_stmt(&arm.body)?
                .unwrap_or_else(|| Stmt::Block(Vec::new()).into_ref());
            if arm.is_default {
                if seen_default {
                    return Err(LowerError::IllegalDefault { span: arm.span });
                }
                seen_default = true;
                items.push(CaseItem::default_arm(body));
                continue;
            }
            let mut labels = Vec::with_capacity(arm.patterns.len());
            for pattern in &arm.patterns {
                labels.push(self.case_label(pattern, width)?);
            }
            items.push(CaseItem::labeled(labels, body));
        }
        Ok(CaseStmt::new(selector, items)?)
    }

    fn case_label(&mut self, pattern: &ast::Expr, width: u32) -> LowerResult<logictree_ir::Const> {
        let not_constant = || LowerError::Unsupported {
            what: format!("case label `{}` is not a constant", self.text(pattern.span())),
            span: pattern.span(),
        };
        if !matches!(pattern.unparen(), ast::Expr::Literal { .. }) {
            return Err(not_constant());
        }
        let fitted = match self.operand(pattern)? {
            Operand::Unsized(lit) => lit.fit(width),
            Operand::Sized(x) => x.as_const().and_then(|c| c.resized(width)),
        };
        fitted.ok_or_else(|| LowerError::WidthMismatch {
            detail: format!(
                "case label `{}` does not fit the {width}-bit selector",
                self.text(pattern.span())
            ),
            span: pattern.span(),
        })
    }
}

// ============================================================================
// Flattening
// ============================================================================

/// Current value of one written target.
///
/// `lhs` is always the whole variable; writes to a select are spliced into
/// `value`.
#[derive(Clone, Debug)]
pub(crate) struct Slot {
    pub lhs: ExprRef,
    pub value: ExprRef,
}

/// Lowest bit written by a select target; `None` for a whole variable.
pub(crate) fn field_of(lhs: &ExprRef) -> Option<u32> {
    match &**lhs {
        Expr::BitSelect { index, .. } => Some(*index),
        Expr::PartSelect { msb, lsb, .. } => Some((*msb).min(*lsb)),
        _ => None,
    }
}

type State = BTreeMap<String, Slot>;

/// Symbolic execution of a process.
///
/// Blocking assignments overwrite; reads of a target written earlier in the
/// process see the written value. An `if` chain or `case` merges its arms
/// into a priority sum of products,
/// `(c0 & v0) | (~c0 & c1 & v1) | ... | (~c0 & ... & ~cn-1 & velse)`,
/// with muxes standing in for the products on vector targets. An arm that
/// leaves a target alone contributes its value before the statement, or the
/// fallback when there is none.
pub(crate) struct Flattener {
    fallback: CaseFallback,
    order: Vec<String>,
}

impl Flattener {
    pub(crate) fn new(fallback: CaseFallback) -> Self {
        Self {
            fallback,
            order: Vec::new(),
        }
    }

    /// Final value of every written target, in first-write order.
    pub(crate) fn run(mut self, stmt: &Stmt) -> Vec<(String, Slot)> {
        let mut state = State::new();
        self.exec(stmt, &mut state);
        self.order
            .into_iter()
            .filter_map(|key| state.remove(&key).map(|slot| (key, slot)))
            .collect()
    }

    fn note(&mut self, key: &str) {
        if !self.order.iter().any(|k| k == key) {
            self.order.push(key.to_string());
        }
    }

    fn exec(&mut self, stmt: &Stmt, state: &mut State) {
        match stmt {
            Stmt::Assign(a) => {
                let key = a.target().name.clone();
                self.note(&key);
                let whole = var_ref(a.target());
                let rhs = substitute(a.rhs(), state);
                let value = match field_of(a.lhs()) {
                    Some(low) => {
                        let prior = state
                            .get(&key)
                            .map(|slot| slot.value.clone())
                            .unwrap_or_else(|| self.fallback_value(&whole));
                        splice(&prior, low, &rhs)
                    }
                    None => rhs,
                };
                state.insert(key, Slot { lhs: whole, value });
            }
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.exec(s, state);
                }
            }
            Stmt::If(first) => {
                let mut arms = Vec::new();
                let mut current = first;
                let tail = loop {
                    arms.push((substitute(&current.cond, state), &*current.then_branch));
                    match current.else_branch.as_deref() {
                        Some(Stmt::If(next)) => current = next,
                        other => break other,
                    }
                };
                self.merge(arms, tail, state);
            }
            Stmt::Case(c) => {
                let selector = substitute(&c.selector, state);
                let arms = c
                    .labeled_items()
                    .map(|item| {
                        let hit = or_all(
                            item.labels
                                .iter()
                                .map(|label| expand_eq_const(&selector, label.value)),
                        );
                        (hit.unwrap_or_else(|| konst(0, 1)), &*item.body)
                    })
                    .collect();
                let tail = c.default_item().map(|item| &*item.body);
                self.merge(arms, tail, state);
            }
        }
    }

    fn merge(&mut self, arms: Vec<(ExprRef, &Stmt)>, tail: Option<&Stmt>, state: &mut State) {
        let before = state.clone();
        let outcomes: Vec<State> = arms
            .iter()
            .map(|(_, body)| {
                let mut s = before.clone();
                self.exec(body, &mut s);
                s
            })
            .collect();
        let tail_state = tail.map(|body| {
            let mut s = before.clone();
            self.exec(body, &mut s);
            s
        });
        let conds: Vec<ExprRef> = arms.into_iter().map(|(c, _)| c).collect();

        let mut keys: Vec<String> = Vec::new();
        for outcome in outcomes.iter().chain(tail_state.iter()) {
            for (key, slot) in outcome {
                let unchanged = before
                    .get(key)
                    .is_some_and(|old| Arc::ptr_eq(&old.value, &slot.value));
                if !unchanged && !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }

        for key in keys {
            let Some(lhs) = outcomes
                .iter()
                .chain(tail_state.iter())
                .find_map(|o| o.get(&key))
                .map(|slot| slot.lhs.clone())
            else {
                continue;
            };
            let prior = before
                .get(&key)
                .map(|slot| slot.value.clone())
                .unwrap_or_else(|| self.fallback_value(&lhs));
            let value_in = |o: &State| o.get(&key).map_or(prior.clone(), |slot| slot.value.clone());
            let values: Vec<ExprRef> = outcomes.iter().map(value_in).collect();
            let otherwise = tail_state.as_ref().map_or(prior.clone(), value_in);
            let value = priority(&conds, values, otherwise);
            state.insert(key, Slot { lhs, value });
        }
    }

    fn fallback_value(&self, lhs: &ExprRef) -> ExprRef {
        match self.fallback {
            CaseFallback::Zero => konst(0, lhs.width()),
            CaseFallback::Hold => lhs.clone(),
        }
    }
}

/// Merges guarded values, first condition taking priority.
fn priority(conds: &[ExprRef], values: Vec<ExprRef>, otherwise: ExprRef) -> ExprRef {
    if otherwise.width() > 1 {
        return conds
            .iter()
            .zip(values)
            .rev()
            .fold(otherwise, |acc, (c, v)| mux(c.clone(), v, acc));
    }
    let negated: Vec<ExprRef> = conds.iter().map(|c| not(c.clone())).collect();
    let mut terms = Vec::with_capacity(conds.len() + 1);
    for (i, (c, v)) in conds.iter().zip(values).enumerate() {
        let guard = and_all(negated[..i].iter().cloned().chain([c.clone()]));
        terms.push(guarded(guard, v));
    }
    terms.push(guarded(and_all(negated.iter().cloned()), otherwise));
    or_all(terms).unwrap_or_else(|| konst(0, 1))
}

fn guarded(guard: Option<ExprRef>, value: ExprRef) -> ExprRef {
    match guard {
        Some(g) => and(g, value),
        None => value,
    }
}

/// Replaces reads of targets written earlier in the process.
fn substitute(expr: &ExprRef, state: &State) -> ExprRef {
    if state.is_empty() {
        return expr.clone();
    }
    match &**expr {
        Expr::Var(v) => match state.get(&v.name) {
            Some(slot) => slot.value.clone(),
            None => expr.clone(),
        },
        Expr::Const(_) => expr.clone(),
        Expr::Not(x) => not(substitute(x, state)),
        Expr::Gate { op, a, b } => Expr::Gate {
            op: *op,
            a: substitute(a, state),
            b: substitute(b, state),
        }
        .into_ref(),
        Expr::Compare { op, lhs, rhs } => Expr::Compare {
            op: *op,
            lhs: substitute(lhs, state),
            rhs: substitute(rhs, state),
        }
        .into_ref(),
        Expr::Mux {
            selector,
            if_true,
            if_false,
        } => mux(
            substitute(selector, state),
            substitute(if_true, state),
            substitute(if_false, state),
        ),
        Expr::BitSelect { base, index } => Expr::BitSelect {
            base: substitute(base, state),
            index: *index,
        }
        .into_ref(),
        Expr::PartSelect { base, msb, lsb } => Expr::PartSelect {
            base: substitute(base, state),
            msb: *msb,
            lsb: *lsb,
        }
        .into_ref(),
        Expr::Concat(parts) => {
            Expr::Concat(parts.iter().map(|p| substitute(p, state)).collect()).into_ref()
        }
    }
}
