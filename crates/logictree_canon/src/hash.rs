//! Canonical strings and logic hashes.

use crate::bdd::{bit_name, Bdd};
use crate::error::HashResult;
use logictree_common::LogicHash;
use logictree_ir::{expr_free_vars, Expr};
use std::collections::BTreeSet;

/// Bit-level variable names read by `expr`, sorted.
pub fn bit_variables(expr: &Expr) -> Vec<String> {
    let mut names = BTreeSet::new();
    for v in expr_free_vars(expr) {
        if v.width == 1 {
            names.insert(v.name);
        } else {
            names.extend((0..v.width).map(|i| bit_name(&v.name, i)));
        }
    }
    names.into_iter().collect()
}

/// Canonical string, hash and variable order of one expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashExplanation {
    /// The diagram as nested `ite(var, high, low)` terms.
    pub canonical: String,
    /// SHA-256 of `canonical`.
    pub hash: LogicHash,
    /// Variable order used, root first.
    pub order: Vec<String>,
}

/// Canonical string under the sorted variable order.
pub fn canonical_string(expr: &Expr) -> HashResult<String> {
    Ok(explain_logic_hash(expr)?.canonical)
}

/// Hash of the Boolean function `expr` computes.
///
/// Expressions that compute the same function over the same variables
/// hash equally, whatever their structure.
pub fn logic_hash(expr: &Expr) -> HashResult<LogicHash> {
    Ok(explain_logic_hash(expr)?.hash)
}

/// Like [`logic_hash`], with the canonical string and variable order.
pub fn explain_logic_hash(expr: &Expr) -> HashResult<HashExplanation> {
    explain_with_order(expr, bit_variables(expr))
}

/// [`explain_logic_hash`] under an explicit variable order.
///
/// Every bit variable of `expr` must appear in `order`.
pub fn explain_logic_hash_with_order(
    expr: &Expr,
    order: &[String],
) -> HashResult<HashExplanation> {
    explain_with_order(expr, order.to_vec())
}

fn explain_with_order(expr: &Expr, order: Vec<String>) -> HashResult<HashExplanation> {
    let mut bdd = Bdd::new(order);
    let bits = bdd.build(expr)?;
    let canonical = bdd.to_expr_bits(&bits);
    let hash = LogicHash::of_str(&canonical);
    log::debug!(
        "hashed {} bit(s) over {} variable(s) with {} node(s): {hash}",
        bits.len(),
        bdd.order().len(),
        bdd.node_count()
    );
    Ok(HashExplanation {
        canonical,
        hash,
        order: bdd.order().to_vec(),
    })
}
