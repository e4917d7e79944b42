//! Serializable view tree.
//!
//! [`TreeNode`] is the shape handed to viewers: every IR node becomes one
//! entry with `type`, `label`, `depth`, `delay`, an optional `expr_source`
//! and its `children`. `If` and `Case` get synthetic wrapper entries
//! (`ThenBranch`, `ElseBranch`, `Selector`) so branches are labeled.
//!
//! The DOT and ASCII renderers draw the same tree.

use crate::error::ExportResult;
use logictree_ir::{Assign, CaseItem, Expr, Module, Node, NodeRef, Overlay, Stmt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One entry of the view tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Node type, e.g. `"And"`, `"LogicAssign"`, `"ThenBranch"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display label.
    pub label: String,
    /// Structural depth of the node.
    pub depth: usize,
    /// Gate delay of the node.
    pub delay: usize,
    /// Source text the node was lowered from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr_source: Option<String>,
    /// Children in order.
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// A wrapper entry around `child`.
    fn synthetic(kind: &str, label: String, child: TreeNode) -> Self {
        Self {
            kind: kind.to_string(),
            label,
            depth: child.depth + 1,
            delay: child.delay,
            expr_source: None,
            children: vec![child],
        }
    }

    /// Number of entries in the tree, wrappers included.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::len).sum::<usize>()
    }

    /// Always `false`; a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Builds view trees, taking label and source overrides from an
/// [`Overlay`].
pub struct TreeBuilder<'o> {
    overlay: &'o Overlay,
}

impl<'o> TreeBuilder<'o> {
    /// Creates a builder reading `overlay`.
    pub fn new(overlay: &'o Overlay) -> Self {
        Self { overlay }
    }

    /// View tree rooted at `node`.
    pub fn build(&self, node: NodeRef<'_>) -> TreeNode {
        match node {
            NodeRef::Expr(e) => self.expr(e),
            NodeRef::Stmt(s) => self.stmt(s),
            NodeRef::Item(i) => self.item(i),
        }
    }

    /// View tree of a flattened assignment.
    pub fn assign(&self, a: &Assign) -> TreeNode {
        let rhs = self.expr(a.rhs());
        TreeNode {
            kind: "LogicAssign".to_string(),
            label: format!("{} = {}", a.lhs(), a.rhs().inline()),
            depth: rhs.depth + 1,
            delay: rhs.delay,
            expr_source: self
                .overlay
                .expr_source(NodeRef::Expr(a.rhs()))
                .map(str::to_string),
            children: vec![rhs],
        }
    }

    fn entry(&self, node: NodeRef<'_>, kind: &str, label: String) -> TreeNode {
        TreeNode {
            kind: kind.to_string(),
            label: self.overlay.label(node).map_or(label, str::to_string),
            depth: node.depth(),
            delay: node.delay(),
            expr_source: self.overlay.expr_source(node).map(str::to_string),
            children: Vec::new(),
        }
    }

    fn expr(&self, e: &Expr) -> TreeNode {
        let mut t = self.entry(NodeRef::Expr(e), e.kind(), e.label());
        t.children = e.operands().into_iter().map(|c| self.expr(c)).collect();
        t
    }

    fn stmt(&self, s: &Stmt) -> TreeNode {
        let node = NodeRef::Stmt(s);
        match s {
            Stmt::Assign(a) => {
                let label = format!("{} = {}", a.lhs(), a.rhs().inline());
                let mut t = self.entry(node, "LogicAssign", label);
                t.children = vec![self.expr(a.rhs())];
                t
            }
            Stmt::If(i) => {
                let mut t = self.entry(node, "IfStatement", s.label());
                t.children.push(TreeNode::synthetic(
                    "ThenBranch",
                    "then".into(),
                    self.stmt(&i.then_branch),
                ));
                if let Some(e) = &i.else_branch {
                    t.children
                        .push(TreeNode::synthetic("ElseBranch", "else".into(), self.stmt(e)));
                }
                t
            }
            Stmt::Case(c) => {
                let mut t = self.entry(node, "CaseStatement", s.label());
                t.children.push(TreeNode::synthetic(
                    "Selector",
                    format!("selector = {}", c.selector),
                    self.expr(&c.selector),
                ));
                t.children.extend(c.items.iter().map(|i| self.item(i)));
                t
            }
            Stmt::Block(stmts) => {
                let mut t = self.entry(node, "Block", s.label());
                t.children = stmts.iter().map(|st| self.stmt(st)).collect();
                t
            }
        }
    }

    fn item(&self, item: &CaseItem) -> TreeNode {
        let mut t = self.entry(
            NodeRef::Item(item),
            "CaseItem",
            format!("case {}", item.label_text()),
        );
        t.children = vec![self.stmt(&item.body)];
        t
    }
}

/// View tree of any node, without overrides.
pub fn to_tree(node: NodeRef<'_>) -> TreeNode {
    TreeBuilder::new(&Overlay::new()).build(node)
}

/// JSON value of the view tree rooted at `node`.
pub fn to_json(node: NodeRef<'_>, overlay: &Overlay) -> ExportResult<Value> {
    Ok(serde_json::to_value(TreeBuilder::new(overlay).build(node))?)
}

/// Pretty-printed JSON of the view tree rooted at `node`.
pub fn to_json_string(node: NodeRef<'_>, overlay: &Overlay) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(
        &TreeBuilder::new(overlay).build(node),
    )?)
}

/// View trees of every assignment of `module`, keyed by target.
pub fn module_trees(module: &Module) -> BTreeMap<String, TreeNode> {
    let builder = TreeBuilder::new(&module.overlay);
    module
        .assignments
        .iter()
        .map(|(name, a)| (name.clone(), builder.assign(a)))
        .collect()
}

/// `{"module": name, "assignments": {target: tree, ...}}`.
pub fn module_to_json(module: &Module) -> ExportResult<Value> {
    let trees = module_trees(module);
    log::debug!(
        "serializing {} assignment(s) of module `{}`",
        trees.len(),
        module.name
    );
    let mut assignments = serde_json::Map::new();
    for (name, tree) in trees {
        assignments.insert(name, serde_json::to_value(tree)?);
    }
    let mut root = serde_json::Map::new();
    root.insert("module".into(), Value::String(module.name.clone()));
    root.insert("assignments".into(), Value::Object(assignments));
    Ok(Value::Object(root))
}
