//! Decoration kept outside the nodes: display labels and source text.

use crate::expr::ExprRef;
use crate::node::{Node, NodeId, NodeRef};
use crate::stmt::StmtRef;
use std::collections::HashMap;

/// Keeps a decorated node alive so its identity cannot be reused.
#[derive(Clone, Debug)]
enum Pinned {
    Expr(#[allow(dead_code)] ExprRef),
    Stmt(#[allow(dead_code)] StmtRef),
}

#[derive(Clone, Debug)]
struct Decoration {
    _node: Pinned,
    label: Option<String>,
    expr_source: Option<String>,
}

/// Side table of labels and source snippets keyed by node identity.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    entries: HashMap<NodeId, Decoration>,
}

impl Overlay {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_expr(&mut self, node: &ExprRef) -> &mut Decoration {
        self.entries
            .entry(NodeId::of(&**node))
            .or_insert_with(|| Decoration {
                _node: Pinned::Expr(node.clone()),
                label: None,
                expr_source: None,
            })
    }

    fn entry_stmt(&mut self, node: &StmtRef) -> &mut Decoration {
        self.entries
            .entry(NodeId::of(&**node))
            .or_insert_with(|| Decoration {
                _node: Pinned::Stmt(node.clone()),
                label: None,
                expr_source: None,
            })
    }

    /// Overrides the label of an expression.
    pub fn set_expr_label(&mut self, node: &ExprRef, label: impl Into<String>) {
        self.entry_expr(node).label = Some(label.into());
    }

    /// Records the source text an expression was lowered from.
    pub fn set_expr_source(&mut self, node: &ExprRef, source: impl Into<String>) {
        self.entry_expr(node).expr_source = Some(source.into());
    }

    /// Overrides the label of a statement.
    pub fn set_stmt_label(&mut self, node: &StmtRef, label: impl Into<String>) {
        self.entry_stmt(node).label = Some(label.into());
    }

    /// Records the source text a statement was lowered from.
    pub fn set_stmt_source(&mut self, node: &StmtRef, source: impl Into<String>) {
        self.entry_stmt(node).expr_source = Some(source.into());
    }

    /// Label override for a node.
    pub fn label(&self, node: NodeRef<'_>) -> Option<&str> {
        self.entries.get(&node.id())?.label.as_deref()
    }

    /// Recorded source text for a node.
    pub fn expr_source(&self, node: NodeRef<'_>) -> Option<&str> {
        self.entries.get(&node.id())?.expr_source.as_deref()
    }

    /// The override label, or the node's own label.
    pub fn label_or_default(&self, node: NodeRef<'_>) -> String {
        self.label(node)
            .map(str::to_string)
            .unwrap_or_else(|| node.label())
    }

    /// Number of decorated nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is decorated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;
    use crate::expr::Var;
    use crate::stmt::assign;

    #[test]
    fn labels_are_per_identity() {
        let a1 = and(var("a"), var("b"));
        let a2 = and(var("a"), var("b"));
        let mut ov = Overlay::new();
        ov.set_expr_label(&a1, "y = AND{a, b}");
        assert_eq!(ov.label(NodeRef::Expr(&a1)), Some("y = AND{a, b}"));
        assert_eq!(ov.label(NodeRef::Expr(&a2)), None);
        assert_eq!(ov.label_or_default(NodeRef::Expr(&a2)), "AND");
    }

    #[test]
    fn source_and_label_share_an_entry() {
        let s = assign(Var::scalar("y"), var("a"));
        let mut ov = Overlay::new();
        ov.set_stmt_source(&s, "assign y = a;");
        ov.set_stmt_label(&s, "y");
        assert_eq!(ov.len(), 1);
        assert_eq!(ov.expr_source(NodeRef::Stmt(&s)), Some("assign y = a;"));
        assert_eq!(ov.label_or_default(NodeRef::Stmt(&s)), "y");
    }
}
