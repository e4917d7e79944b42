//! Gate statistics over expression trees.

use crate::expr::{Expr, GateOp};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Polarity of a literal in a product term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Polarity {
    /// Bare literal.
    Pos,
    /// Under a `Not`.
    Neg,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Polarity::Pos => "+",
            Polarity::Neg => "-",
        })
    }
}

fn gate_name(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Not(_) => Some("NOT"),
        Expr::Gate { op, .. } => Some(op.name()),
        Expr::Compare { op, .. } => Some(op.name()),
        Expr::Mux { .. } => Some("MUX"),
        _ => None,
    }
}

/// Distinct gate nodes by kind.
///
/// Structurally equal subtrees count once, so a shared `~s0` feeding two
/// product terms is one NOT gate.
pub fn gate_breakdown(expr: &Expr) -> BTreeMap<&'static str, usize> {
    let mut seen: HashSet<&Expr> = HashSet::new();
    let mut counts = BTreeMap::new();
    let mut stack = vec![expr];
    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        if let Some(name) = gate_name(node) {
            *counts.entry(name).or_insert(0) += 1;
        }
        stack.extend(node.operands().into_iter().map(|e| &**e));
    }
    counts
}

/// Total number of distinct gates.
pub fn gate_count(expr: &Expr) -> usize {
    gate_breakdown(expr).values().sum()
}

/// `"AND:5, NOT:2, OR:2"`, kinds in alphabetical order.
pub fn gate_summary(expr: &Expr) -> String {
    gate_breakdown(expr)
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bit literals of a top-level AND tree as `(bit, polarity)` pairs.
///
/// `s[i]` contributes `(i, +)`, `~s[i]` contributes `(i, -)`, and a 1-bit
/// variable counts as bit 0. Other leaves are ignored.
pub fn literal_sigs(expr: &Expr) -> BTreeSet<(u32, Polarity)> {
    let mut out = BTreeSet::new();
    let mut stack = vec![expr];
    while let Some(node) = stack.pop() {
        match node {
            Expr::Gate {
                op: GateOp::And,
                a,
                b,
            } => {
                stack.push(a);
                stack.push(b);
            }
            Expr::Not(inner) => {
                if let Some(bit) = literal_bit(inner) {
                    out.insert((bit, Polarity::Neg));
                }
            }
            other => {
                if let Some(bit) = literal_bit(other) {
                    out.insert((bit, Polarity::Pos));
                }
            }
        }
    }
    out
}

fn literal_bit(expr: &Expr) -> Option<u32> {
    match expr {
        Expr::BitSelect { index, .. } => Some(*index),
        Expr::Var(v) if v.width == 1 => Some(0),
        _ => None,
    }
}

/// `true` when the tree uses only AND, OR and NOT over variables, constants
/// and bit-selects of variables.
pub fn only_primitives(expr: &Expr) -> bool {
    match expr {
        Expr::Const(_) | Expr::Var(_) => true,
        Expr::BitSelect { base, .. } => base.as_var().is_some(),
        Expr::Not(x) => only_primitives(x),
        Expr::Gate {
            op: GateOp::And | GateOp::Or,
            a,
            b,
        } => only_primitives(a) && only_primitives(b),
        _ => false,
    }
}
