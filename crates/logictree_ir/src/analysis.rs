//! Read and write sets of statements.
//!
//! - `free_vars`: variables read. An assignment reads only its right-hand
//!   side; conditions and selectors are reads.
//! - `writes`: variables written on at least one path.
//! - `writes_must`: variables written on every path. An `if` without `else`
//!   and a `case` without `default` guarantee nothing. With a default, a
//!   variable is guaranteed when every labeled arm writes it, or when the
//!   default and at least one labeled arm write it.
//!
//! [`Analyzer`] memoizes each result per node. It borrows the tree it
//! analyzes, so the cache cannot outlive the nodes it describes.

use crate::expr::{Expr, Var};
use crate::node::NodeId;
use crate::stmt::{CaseStmt, Stmt};
use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;

/// A deterministic set of variables.
pub type VarSet = BTreeSet<Var>;

/// Variables read by an expression.
pub fn expr_free_vars(expr: &Expr) -> VarSet {
    let mut out = VarSet::new();
    collect_vars(expr, &mut out);
    out
}

fn collect_vars(expr: &Expr, out: &mut VarSet) {
    match expr {
        Expr::Var(v) => {
            out.insert(v.clone());
        }
        Expr::Const(_) => {}
        _ => {
            for child in expr.operands() {
                collect_vars(child, out);
            }
        }
    }
}

#[derive(Default)]
struct Memo {
    free: HashMap<NodeId, VarSet>,
    writes: HashMap<NodeId, VarSet>,
    must: HashMap<NodeId, VarSet>,
}

/// Memoizing read/write analysis over one statement tree.
pub struct Analyzer<'t> {
    memo: Memo,
    _tree: PhantomData<&'t Stmt>,
}

impl Default for Analyzer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> Analyzer<'t> {
    /// Creates an analyzer with empty caches.
    pub fn new() -> Self {
        Self {
            memo: Memo::default(),
            _tree: PhantomData,
        }
    }

    /// Number of cached results across all three analyses.
    pub fn cached(&self) -> usize {
        self.memo.free.len() + self.memo.writes.len() + self.memo.must.len()
    }

    /// Variables read by `stmt`.
    pub fn free_vars(&mut self, stmt: &'t Stmt) -> VarSet {
        let id = NodeId::of(stmt);
        if let Some(hit) = self.memo.free.get(&id) {
            return hit.clone();
        }
        let result = match stmt {
            Stmt::Assign(a) => {
                let mut out = expr_free_vars(a.rhs());
                // Index expressions of a select target are reads; the
                // target itself is not.
                if let Expr::BitSelect { base, .. } | Expr::PartSelect { base, .. } = &**a.lhs() {
                    if base.as_var().is_none() {
                        out.extend(expr_free_vars(base));
                    }
                }
                out
            }
            Stmt::If(i) => {
                let mut out = expr_free_vars(&i.cond);
                out.extend(self.free_vars(&i.then_branch));
                if let Some(e) = &i.else_branch {
                    out.extend(self.free_vars(e));
                }
                out
            }
            Stmt::Case(c) => {
                let mut out = expr_free_vars(&c.selector);
                for item in &c.items {
                    out.extend(self.free_vars(&item.body));
                }
                out
            }
            Stmt::Block(stmts) => {
                let mut out = VarSet::new();
                for s in stmts {
                    out.extend(self.free_vars(s));
                }
                out
            }
        };
        self.memo.free.insert(id, result.clone());
        result
    }

    /// Variables written by `stmt` on some path.
    pub fn writes(&mut self, stmt: &'t Stmt) -> VarSet {
        let id = NodeId::of(stmt);
        if let Some(hit) = self.memo.writes.get(&id) {
            return hit.clone();
        }
        let result = match stmt {
            Stmt::Assign(a) => VarSet::from([a.target().clone()]),
            Stmt::If(i) => {
                let mut out = self.writes(&i.then_branch);
                if let Some(e) = &i.else_branch {
                    out.extend(self.writes(e));
                }
                out
            }
            Stmt::Case(c) => {
                let mut out = VarSet::new();
                for item in &c.items {
                    out.extend(self.writes(&item.body));
                }
                out
            }
            Stmt::Block(stmts) => {
                let mut out = VarSet::new();
                for s in stmts {
                    out.extend(self.writes(s));
                }
                out
            }
        };
        self.memo.writes.insert(id, result.clone());
        result
    }

    /// Variables written by `stmt` on every path.
    pub fn writes_must(&mut self, stmt: &'t Stmt) -> VarSet {
        let id = NodeId::of(stmt);
        if let Some(hit) = self.memo.must.get(&id) {
            return hit.clone();
        }
        let result = match stmt {
            Stmt::Assign(a) => VarSet::from([a.target().clone()]),
            Stmt::If(i) => match &i.else_branch {
                Some(e) => {
                    let t = self.writes_must(&i.then_branch);
                    let e = self.writes_must(e);
                    t.intersection(&e).cloned().collect()
                }
                None => VarSet::new(),
            },
            Stmt::Case(c) => self.case_writes_must(c),
            Stmt::Block(stmts) => {
                let mut out = VarSet::new();
                for s in stmts {
                    out.extend(self.writes_must(s));
                }
                out
            }
        };
        self.memo.must.insert(id, result.clone());
        result
    }

    fn case_writes_must(&mut self, case: &'t CaseStmt) -> VarSet {
        let Some(default) = case.default_item() else {
            return VarSet::new();
        };
        let default_must = self.writes_must(&default.body);
        let arms: Vec<VarSet> = case
            .labeled_items()
            .map(|item| self.writes_must(&item.body))
            .collect();
        if arms.is_empty() {
            // Every selector value reaches the default.
            return default_must;
        }

        let mut every_arm = arms[0].clone();
        for arm in &arms[1..] {
            every_arm.retain(|v| arm.contains(v));
        }
        let some_arm: VarSet = arms.iter().flatten().cloned().collect();
        every_arm
            .into_iter()
            .chain(default_must.intersection(&some_arm).cloned())
            .collect()
    }
}
