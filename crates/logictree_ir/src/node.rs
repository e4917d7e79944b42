//! Traits shared by every node, and a uniform reference for tree walks.

use crate::analysis::{Analyzer, VarSet};
use crate::expr::{Expr, ExprRef};
use crate::stmt::{CaseItem, Stmt};

/// Behaviour common to expressions, statements and case arms.
///
/// `depth` and `delay` default to a walk over [`children`](Node::children).
pub trait Node {
    /// Structural children in order.
    fn children(&self) -> Vec<NodeRef<'_>>;

    /// Node kind name, e.g. `"And"`, `"If"`, `"CaseItem"`.
    fn kind(&self) -> &'static str;

    /// Short human-readable label.
    fn label(&self) -> String;

    /// 0 for leaves, otherwise 1 + the deepest child.
    fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.depth())
            .max()
            .map_or(0, |d| d + 1)
    }

    /// Gate levels from inputs to output; leaves have delay 0.
    fn delay(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.delay())
            .max()
            .map_or(0, |d| d + 1)
    }
}

/// Expression-side queries.
pub trait ExprNode: Node {
    /// Result width.
    fn width(&self) -> u32;

    /// Variables read.
    fn free_vars(&self) -> VarSet;
}

/// Statement-side read/write analyses. These run an uncached
/// [`Analyzer`]; keep one analyzer around for repeated queries.
pub trait StmtNode: Node {
    /// Variables read.
    fn free_vars(&self) -> VarSet;

    /// Variables written on some path.
    fn writes(&self) -> VarSet;

    /// Variables written on every path.
    fn writes_must(&self) -> VarSet;
}

/// Identity of a node: the address of its allocation.
///
/// Only meaningful while the node is alive; side tables that key on it
/// either borrow the tree or hold a reference to the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Identity of any node.
    pub fn of<T>(node: &T) -> Self {
        NodeId(node as *const T as usize)
    }
}

/// A borrowed node of any kind.
#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
    /// Expression node.
    Expr(&'a Expr),
    /// Statement node.
    Stmt(&'a Stmt),
    /// Case arm.
    Item(&'a CaseItem),
}

impl NodeRef<'_> {
    /// Identity of the referenced node.
    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Expr(e) => NodeId::of(*e),
            NodeRef::Stmt(s) => NodeId::of(*s),
            NodeRef::Item(i) => NodeId::of(*i),
        }
    }
}

impl Node for NodeRef<'_> {
    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            NodeRef::Expr(e) => e.children(),
            NodeRef::Stmt(s) => s.children(),
            NodeRef::Item(i) => i.children(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            NodeRef::Expr(e) => Node::kind(*e),
            NodeRef::Stmt(s) => Node::kind(*s),
            NodeRef::Item(i) => Node::kind(*i),
        }
    }

    fn label(&self) -> String {
        match self {
            NodeRef::Expr(e) => e.label(),
            NodeRef::Stmt(s) => s.label(),
            NodeRef::Item(i) => i.label(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            NodeRef::Expr(e) => e.depth(),
            NodeRef::Stmt(s) => s.depth(),
            NodeRef::Item(i) => i.depth(),
        }
    }

    fn delay(&self) -> usize {
        match self {
            NodeRef::Expr(e) => e.delay(),
            NodeRef::Stmt(s) => s.delay(),
            NodeRef::Item(i) => i.delay(),
        }
    }
}

fn expr_children(operands: Vec<&ExprRef>) -> Vec<NodeRef<'_>> {
    operands.into_iter().map(|e| NodeRef::Expr(e)).collect()
}

impl Node for Expr {
    fn children(&self) -> Vec<NodeRef<'_>> {
        expr_children(self.operands())
    }

    fn kind(&self) -> &'static str {
        Expr::kind(self)
    }

    /// Variables by name, constants by Verilog spelling, selects as
    /// written, operators by gate name.
    fn label(&self) -> String {
        match self {
            Expr::Const(c) => c.to_verilog(),
            Expr::Var(v) => v.name.clone(),
            Expr::BitSelect { .. } | Expr::PartSelect { .. } => self.to_string(),
            Expr::Not(_) => "NOT".to_string(),
            Expr::Gate { op, .. } => op.name().to_string(),
            Expr::Compare { op, .. } => op.name().to_string(),
            Expr::Mux { .. } => "MUX".to_string(),
            Expr::Concat(_) => "CONCAT".to_string(),
        }
    }
}

impl ExprNode for Expr {
    fn width(&self) -> u32 {
        Expr::width(self)
    }

    fn free_vars(&self) -> VarSet {
        crate::analysis::expr_free_vars(self)
    }
}

impl Node for Stmt {
    fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            Stmt::Assign(a) => vec![NodeRef::Expr(a.rhs())],
            Stmt::If(i) => {
                let mut out = vec![NodeRef::Expr(&i.cond), NodeRef::Stmt(&i.then_branch)];
                if let Some(e) = &i.else_branch {
                    out.push(NodeRef::Stmt(e));
                }
                out
            }
            Stmt::Case(c) => {
                let mut out = vec![NodeRef::Expr(&c.selector)];
                out.extend(c.items.iter().map(NodeRef::Item));
                out
            }
            Stmt::Block(stmts) => stmts.iter().map(|s| NodeRef::Stmt(s)).collect(),
        }
    }

    fn kind(&self) -> &'static str {
        Stmt::kind(self)
    }

    fn label(&self) -> String {
        match self {
            Stmt::Assign(a) => a.to_string(),
            Stmt::If(i) => format!("if({})", i.cond),
            Stmt::Case(c) => format!("case({})", c.selector),
            Stmt::Block(_) => "begin".to_string(),
        }
    }

    fn delay(&self) -> usize {
        match self {
            Stmt::Assign(a) => a.rhs().delay(),
            Stmt::Block(stmts) => stmts.iter().map(|s| s.delay()).max().unwrap_or(0),
            Stmt::If(_) | Stmt::Case(_) => self
                .children()
                .iter()
                .map(|c| c.delay())
                .max()
                .map_or(0, |d| d + 1),
        }
    }
}

impl StmtNode for Stmt {
    fn free_vars(&self) -> VarSet {
        Analyzer::new().free_vars(self)
    }

    fn writes(&self) -> VarSet {
        Analyzer::new().writes(self)
    }

    fn writes_must(&self) -> VarSet {
        Analyzer::new().writes_must(self)
    }
}

impl Node for CaseItem {
    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Stmt(&self.body)]
    }

    fn kind(&self) -> &'static str {
        "CaseItem"
    }

    fn label(&self) -> String {
        self.label_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;
    use crate::expr::Var;
    use crate::stmt::{assign, if_stmt, CaseStmt};

    #[test]
    fn gate_depth_is_one_plus_deepest_child() {
        let e = or(and(var("a"), not(var("b"))), var("c"));
        assert_eq!(var("a").depth(), 0);
        assert_eq!(e.depth(), 3);
        assert_eq!(e.delay(), 3);
    }

    #[test]
    fn assign_delay_is_rhs_delay() {
        let s = assign(Var::scalar("y"), and(var("a"), var("b")));
        assert_eq!(s.delay(), 1);
        assert_eq!(s.depth(), 2);
    }

    #[test]
    fn if_and_case_delay() {
        let y = Var::scalar("y");
        let s = if_stmt(
            var("c"),
            assign(y.clone(), and(var("a"), var("b"))),
            Some(assign(y.clone(), var("d"))),
        );
        assert_eq!(s.delay(), 2);

        let case = Stmt::Case(
            CaseStmt::new(
                var("s"),
                vec![crate::stmt::CaseItem::default_arm(assign(y, var("a")))],
            )
            .unwrap(),
        );
        // selector 0, item -> body -> rhs: item delay 1, case 2
        assert_eq!(case.delay(), 2);
    }

    #[test]
    fn children_order() {
        let y = Var::scalar("y");
        let s = if_stmt(var("c"), assign(y.clone(), var("a")), Some(assign(y, var("b"))));
        let kinds: Vec<&str> = s.children().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, ["Var", "Assign", "Assign"]);
        let m = mux(var("s"), var("a"), var("b"));
        let labels: Vec<String> = m.children().iter().map(|c| c.label()).collect();
        assert_eq!(labels, ["s", "a", "b"]);
    }

    #[test]
    fn node_ids_are_stable_and_distinct() {
        let a = var("a");
        let b = var("a");
        assert_eq!(NodeRef::Expr(&a).id(), NodeId::of(&*a));
        assert_ne!(NodeId::of(&*a), NodeId::of(&*b));
    }

    #[test]
    fn labels() {
        assert_eq!(Node::label(&*and(var("a"), var("b"))), "AND");
        assert_eq!(Node::label(&*bit_select(vec_var("s", 4), 2)), "s[2]");
        let s = assign(Var::scalar("y"), not(var("a")));
        assert_eq!(s.label(), "y = (~a)");
    }
}
