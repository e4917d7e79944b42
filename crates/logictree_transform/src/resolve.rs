//! Inlining of intermediate signals.
//!
//! Each signal definition may read other defined signals. Definitions are
//! ordered with a dependency graph so every signal is resolved once, after
//! everything it reads; a loop in the graph is a combinational cycle.

use crate::error::{RewriteError, RewriteResult};
use crate::rebuild::map_operands;
use logictree_ir::{expr_free_vars, Assign, Expr, ExprRef, Module};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeMap, HashMap};

/// Substitutes every variable of `expr` that names a key of `signals` by
/// that signal's fully resolved definition.
pub fn resolve_signal_vars(
    expr: &ExprRef,
    signals: &BTreeMap<String, ExprRef>,
) -> RewriteResult<ExprRef> {
    let resolved = resolve_all(signals)?;
    Ok(substitute(expr, &resolved))
}

/// Resolves every assignment of `module` against the others.
pub fn resolve_module(module: &Module) -> RewriteResult<BTreeMap<String, Assign>> {
    let signals: BTreeMap<String, ExprRef> = module
        .assignments
        .iter()
        .map(|(key, a)| (key.clone(), a.rhs().clone()))
        .collect();
    let resolved = resolve_all(&signals)?;
    Ok(module
        .assignments
        .iter()
        .filter_map(|(key, a)| {
            let rhs = resolved.get(key.as_str())?;
            Some((key.clone(), a.with_rhs(rhs.clone())))
        })
        .collect())
}

fn resolve_all(signals: &BTreeMap<String, ExprRef>) -> RewriteResult<HashMap<&str, ExprRef>> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for (name, def) in signals {
        graph.add_node(name.as_str());
        for v in expr_free_vars(def) {
            if let Some((dep, _)) = signals.get_key_value(v.name.as_str()) {
                if dep == name {
                    return Err(RewriteError::Cycle {
                        signal: name.clone(),
                    });
                }
                let actual = signals[dep].width();
                if v.width != actual {
                    return Err(RewriteError::WidthMismatch {
                        signal: v.name.clone(),
                        declared: v.width,
                        actual,
                    });
                }
                graph.add_edge(name.as_str(), dep.as_str(), ());
            }
        }
    }
    let order = toposort(&graph, None).map_err(|cycle| RewriteError::Cycle {
        signal: cycle.node_id().to_string(),
    })?;

    let mut resolved: HashMap<&str, ExprRef> = HashMap::with_capacity(order.len());
    // Edges point from a signal to what it reads; dependencies come last.
    for name in order.into_iter().rev() {
        let def = &signals[name];
        let value = substitute(def, &resolved);
        resolved.insert(name, value);
    }
    log::debug!("resolved {} signal definition(s)", resolved.len());
    Ok(resolved)
}

fn substitute(expr: &ExprRef, resolved: &HashMap<&str, ExprRef>) -> ExprRef {
    if let Expr::Var(v) = &**expr {
        return resolved
            .get(v.name.as_str())
            .cloned()
            .unwrap_or_else(|| expr.clone());
    }
    match map_operands(expr, |c| Ok::<_, std::convert::Infallible>(substitute(c, resolved))) {
        Ok(e) => e,
        Err(never) => match never {},
    }
}
