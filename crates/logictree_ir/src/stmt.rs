//! Statement nodes: assignments, if/else, case, and blocks.

use crate::error::{IrError, IrResult};
use crate::expr::{Const, Expr, ExprRef, Var};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an immutable statement.
pub type StmtRef = Arc<Stmt>;

/// Value given to a signal that a `case` or `if` without a matching arm
/// leaves unassigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFallback {
    /// Drive 0 (purely combinational reading).
    #[default]
    Zero,
    /// Keep the signal's previous value (latch reading).
    Hold,
}

/// `lhs = rhs`, where `lhs` is a variable or a constant select into one.
#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
    lhs: ExprRef,
    target: Var,
    rhs: ExprRef,
}

impl Assign {
    /// Checked constructor: `lhs` must name a variable and match `rhs` in width.
    pub fn new(lhs: ExprRef, rhs: ExprRef) -> IrResult<Self> {
        let target = lhs
            .lvalue_base()
            .cloned()
            .ok_or_else(|| IrError::invariant("Assign", format!("`{lhs}` is not assignable")))?;
        if lhs.width() != rhs.width() {
            return Err(IrError::invariant(
                "Assign",
                format!(
                    "`{lhs}` is {} bits but `{rhs}` is {} bits",
                    lhs.width(),
                    rhs.width()
                ),
            ));
        }
        Ok(Self { lhs, target, rhs })
    }

    /// Assignment to a whole variable. Widths are not checked.
    pub fn to_var(target: Var, rhs: ExprRef) -> Self {
        Self {
            lhs: Arc::new(Expr::Var(target.clone())),
            target,
            rhs,
        }
    }

    /// Left-hand side as written.
    pub fn lhs(&self) -> &ExprRef {
        &self.lhs
    }

    /// Right-hand side.
    pub fn rhs(&self) -> &ExprRef {
        &self.rhs
    }

    /// The variable written.
    pub fn target(&self) -> &Var {
        &self.target
    }

    /// Same target with a different right-hand side.
    pub fn with_rhs(&self, rhs: ExprRef) -> Self {
        Self {
            lhs: self.lhs.clone(),
            target: self.target.clone(),
            rhs,
        }
    }
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// `if (cond) then_branch else else_branch`.
#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    /// 1-bit condition.
    pub cond: ExprRef,
    /// Taken when `cond` is 1.
    pub then_branch: StmtRef,
    /// Taken when `cond` is 0, if present.
    pub else_branch: Option<StmtRef>,
}

impl IfStmt {
    /// Checked constructor.
    pub fn new(cond: ExprRef, then_branch: StmtRef, else_branch: Option<StmtRef>) -> IrResult<Self> {
        if cond.width() != 1 {
            return Err(IrError::invariant(
                "If",
                format!("condition `{cond}` is {} bits wide", cond.width()),
            ));
        }
        Ok(Self {
            cond,
            then_branch,
            else_branch,
        })
    }
}

/// One arm of a `case`.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseItem {
    /// Values that select this arm; empty for the default arm.
    pub labels: Vec<Const>,
    /// Arm body.
    pub body: StmtRef,
    /// `true` for the `default:` arm.
    pub is_default: bool,
}

impl CaseItem {
    /// An arm selected by `labels`.
    pub fn labeled(labels: Vec<Const>, body: StmtRef) -> Self {
        Self {
            labels,
            body,
            is_default: false,
        }
    }

    /// The `default:` arm.
    pub fn default_arm(body: StmtRef) -> Self {
        Self {
            labels: Vec::new(),
            body,
            is_default: true,
        }
    }

    /// `true` if `value` (already masked to the selector width) selects
    /// this arm. The default arm never matches by value.
    pub fn matches(&self, value: u64) -> bool {
        !self.is_default && self.labels.iter().any(|l| l.value == value)
    }

    /// `"0, 2'b10"` or `"default"`.
    pub fn label_text(&self) -> String {
        if self.is_default {
            return "default".to_string();
        }
        self.labels
            .iter()
            .map(Const::to_verilog)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `case (selector) items endcase`, items in source priority order.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseStmt {
    /// Value being matched.
    pub selector: ExprRef,
    /// Arms, including at most one default.
    pub items: Vec<CaseItem>,
}

impl CaseStmt {
    /// Checked constructor.
    pub fn new(selector: ExprRef, items: Vec<CaseItem>) -> IrResult<Self> {
        let case = Self { selector, items };
        case.check()?;
        Ok(case)
    }

    fn check(&self) -> IrResult<()> {
        let defaults = self.items.iter().filter(|i| i.is_default).count();
        if defaults > 1 {
            return Err(IrError::invariant("Case", "more than one default arm"));
        }
        for item in &self.items {
            if item.is_default && !item.labels.is_empty() {
                return Err(IrError::invariant("Case", "default arm carries labels"));
            }
            if !item.is_default && item.labels.is_empty() {
                return Err(IrError::invariant("Case", "arm without labels"));
            }
        }
        Ok(())
    }

    /// The `default:` arm, if any.
    pub fn default_item(&self) -> Option<&CaseItem> {
        self.items.iter().find(|i| i.is_default)
    }

    /// Non-default arms in priority order.
    pub fn labeled_items(&self) -> impl Iterator<Item = &CaseItem> {
        self.items.iter().filter(|i| !i.is_default)
    }

    /// First arm whose labels contain `value`, falling back to the default.
    pub fn select(&self, value: u64) -> Option<&CaseItem> {
        self.labeled_items()
            .find(|i| i.matches(value))
            .or_else(|| self.default_item())
    }
}

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// Blocking assignment.
    Assign(Assign),
    /// Conditional.
    If(IfStmt),
    /// Case statement.
    Case(CaseStmt),
    /// `begin ... end`.
    Block(Vec<StmtRef>),
}

impl Stmt {
    /// Wraps the statement in a [`StmtRef`].
    pub fn into_ref(self) -> StmtRef {
        Arc::new(self)
    }

    /// Node kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Stmt::Assign(_) => "Assign",
            Stmt::If(_) => "If",
            Stmt::Case(_) => "Case",
            Stmt::Block(_) => "Block",
        }
    }

    /// The assignment, if this is one.
    pub fn as_assign(&self) -> Option<&Assign> {
        match self {
            Stmt::Assign(a) => Some(a),
            _ => None,
        }
    }

    /// The assignment this statement reduces to: itself, or the only
    /// statement of a block (recursively).
    pub fn single_assign(&self) -> Option<&Assign> {
        match self {
            Stmt::Assign(a) => Some(a),
            Stmt::Block(stmts) if stmts.len() == 1 => stmts[0].single_assign(),
            _ => None,
        }
    }

    /// Re-checks every expression and statement rule in the tree.
    pub fn validate(&self) -> IrResult<()> {
        match self {
            Stmt::Assign(a) => {
                a.lhs.validate()?;
                a.rhs.validate()?;
                Assign::new(a.lhs.clone(), a.rhs.clone()).map(|_| ())
            }
            Stmt::If(i) => {
                i.cond.validate()?;
                IfStmt::new(i.cond.clone(), i.then_branch.clone(), i.else_branch.clone())?;
                i.then_branch.validate()?;
                if let Some(e) = &i.else_branch {
                    e.validate()?;
                }
                Ok(())
            }
            Stmt::Case(c) => {
                c.selector.validate()?;
                c.check()?;
                c.items.iter().try_for_each(|item| item.body.validate())
            }
            Stmt::Block(stmts) => stmts.iter().try_for_each(|s| s.validate()),
        }
    }
}

/// Builds `Assign(var, rhs)` as a statement.
pub fn assign(target: Var, rhs: ExprRef) -> StmtRef {
    Stmt::Assign(Assign::to_var(target, rhs)).into_ref()
}

/// Builds an `If` statement without checks.
pub fn if_stmt(cond: ExprRef, then_branch: StmtRef, else_branch: Option<StmtRef>) -> StmtRef {
    Stmt::If(IfStmt {
        cond,
        then_branch,
        else_branch,
    })
    .into_ref()
}
