//! The logic IR: immutable expression and statement trees with widths.
//!
//! Expressions ([`Expr`]) and statements ([`Stmt`]) are shared through
//! `Arc` and never mutated; rewrites build new roots that reuse untouched
//! subtrees. Per-node data that is not part of the logic, such as analysis
//! results or display labels, lives in side tables keyed by [`NodeId`]
//! ([`Analyzer`], [`Overlay`]).
//!
//! The crate also provides two-valued evaluation ([`eval`], [`exec`]) and gate
//! statistics ([`stats`]) used by tests and the CLI.

#![warn(missing_docs)]

pub mod analysis;
pub mod build;
pub mod error;
pub mod eval;
pub mod expr;
pub mod module;
pub mod node;
pub mod overlay;
pub mod stats;
pub mod stmt;

pub use analysis::{expr_free_vars, Analyzer, VarSet};
pub use error::{IrError, IrResult};
pub use eval::{all_assignments, eval, exec, Env};
pub use expr::{mask, CmpOp, Const, Expr, ExprRef, GateOp, Radix, Var, MAX_WIDTH};
pub use module::{Direction, Module, Port};
pub use node::{ExprNode, Node, NodeId, NodeRef, StmtNode};
pub use overlay::Overlay;
pub use stats::{gate_breakdown, gate_count, gate_summary, literal_sigs, only_primitives, Polarity};
pub use stmt::{assign, if_stmt, Assign, CaseFallback, CaseItem, CaseStmt, IfStmt, Stmt, StmtRef};
