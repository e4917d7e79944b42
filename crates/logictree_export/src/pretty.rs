//! Text renderings for terminals.

use crate::tree::TreeNode;
use logictree_ir::{CaseItem, Expr, GateOp, NodeRef, Stmt};
use std::fmt::Write;

// ============================================================================
// Indented pretty print
// ============================================================================

/// Indented multi-line dump of a tree, two spaces per level.
///
/// ```text
/// CASE(
///   s
///   CASE_ITEM: 2'b00
///     ASSIGN: y
///       a
/// )
/// ```
pub fn pretty_print(node: NodeRef<'_>) -> String {
    let mut out = String::new();
    match node {
        NodeRef::Expr(e) => pp_expr(&mut out, e, 0),
        NodeRef::Stmt(s) => pp_stmt(&mut out, s, 0),
        NodeRef::Item(i) => pp_item(&mut out, i, 0),
    }
    out
}

fn line(out: &mut String, level: usize, text: &str) {
    let _ = writeln!(out, "{}{text}", "  ".repeat(level));
}

fn pp_expr(out: &mut String, e: &Expr, level: usize) {
    match e {
        Expr::Const(c) => line(out, level, &c.to_verilog()),
        Expr::Var(v) => line(out, level, &v.name),
        Expr::BitSelect { .. } | Expr::PartSelect { .. } => line(out, level, &e.to_string()),
        Expr::Not(_) => line(out, level, "NOT"),
        Expr::Gate { op, .. } => line(out, level, op.name()),
        Expr::Compare { op, .. } => line(out, level, op.name()),
        Expr::Mux { .. } => line(out, level, "MUX"),
        Expr::Concat(_) => line(out, level, "CONCAT"),
    }
    if !matches!(e, Expr::BitSelect { .. } | Expr::PartSelect { .. }) {
        for child in e.operands() {
            pp_expr(out, child, level + 1);
        }
    }
}

fn pp_stmt(out: &mut String, s: &Stmt, level: usize) {
    match s {
        Stmt::Assign(a) => {
            line(out, level, &format!("ASSIGN: {}", a.lhs()));
            pp_expr(out, a.rhs(), level + 1);
        }
        Stmt::If(i) => {
            line(out, level, "IF:");
            line(out, level, " condition:");
            pp_expr(out, &i.cond, level + 1);
            line(out, level, " then:");
            pp_stmt(out, &i.then_branch, level + 2);
            if let Some(e) = &i.else_branch {
                line(out, level, " else:");
                pp_stmt(out, e, level + 2);
            }
        }
        Stmt::Case(c) => {
            line(out, level, "CASE(");
            pp_expr(out, &c.selector, level + 1);
            for item in &c.items {
                pp_item(out, item, level + 1);
            }
            line(out, level, ")");
        }
        Stmt::Block(stmts) => {
            line(out, level, "BEGIN");
            for st in stmts {
                pp_stmt(out, st, level + 1);
            }
            line(out, level, "END");
        }
    }
}

fn pp_item(out: &mut String, item: &CaseItem, level: usize) {
    line(out, level, &format!("CASE_ITEM: {}", item.label_text()));
    pp_stmt(out, &item.body, level + 1);
}

// ============================================================================
// Box-drawing tree
// ============================================================================

/// Box-drawing rendering of a view tree.
///
/// ```text
/// y = OR{a, b}
/// └── OR
///     ├── a
///     └── b
/// ```
pub fn ascii_tree(tree: &TreeNode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", tree.label);
    let count = tree.children.len();
    for (i, child) in tree.children.iter().enumerate() {
        ascii_walk(&mut out, child, "", i + 1 == count);
    }
    out
}

fn ascii_walk(out: &mut String, t: &TreeNode, prefix: &str, last: bool) {
    let branch = if last { "└── " } else { "├── " };
    let _ = writeln!(out, "{prefix}{branch}{}", t.label);
    let next = format!("{prefix}{}", if last { "    " } else { "│   " });
    let count = t.children.len();
    for (i, child) in t.children.iter().enumerate() {
        ascii_walk(out, child, &next, i + 1 == count);
    }
}

// ============================================================================
// One-line forms
// ============================================================================

fn scalar_const(e: &Expr) -> Option<&'static str> {
    let c = e.as_const()?;
    (c.width == 1).then_some(if c.value == 1 { "1" } else { "0" })
}

/// Readable infix form: `((a & b) | (~c))`, `(s ? a : b)`. XNOR reads as
/// equality, `(a == b)`.
pub fn explain_expr(e: &Expr) -> String {
    if let Some(bit) = scalar_const(e) {
        return bit.to_string();
    }
    match e {
        Expr::Gate { op, a, b } => {
            let (a, b) = (explain_expr(a), explain_expr(b));
            match op {
                GateOp::And => format!("({a} & {b})"),
                GateOp::Or => format!("({a} | {b})"),
                GateOp::Xor => format!("({a} ^ {b})"),
                GateOp::Xnor => format!("({a} == {b})"),
                GateOp::Nand | GateOp::Nor => format!("{}({a}, {b})", op.name()),
            }
        }
        Expr::Not(x) => format!("(~{})", explain_expr(x)),
        Expr::Mux {
            selector,
            if_true,
            if_false,
        } => format!(
            "({} ? {} : {})",
            explain_expr(selector),
            explain_expr(if_true),
            explain_expr(if_false)
        ),
        Expr::Compare { .. } | Expr::Const(_) | Expr::Var(_) => e.to_string(),
        Expr::BitSelect { .. } | Expr::PartSelect { .. } => e.to_string(),
        Expr::Concat(parts) => {
            let inner: Vec<String> = parts.iter().map(|p| explain_expr(p)).collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

/// Operator form printed next to BDD strings: `((a & b) | ~(c))`,
/// `(a ~^ b)`, with `1`/`0` for single-bit constants.
pub fn symbolic_expr(e: &Expr) -> String {
    if let Some(bit) = scalar_const(e) {
        return bit.to_string();
    }
    match e {
        Expr::Not(x) => format!("~({})", symbolic_expr(x)),
        Expr::Gate { op, a, b } => {
            let (a, b) = (symbolic_expr(a), symbolic_expr(b));
            match op {
                GateOp::And => format!("({a} & {b})"),
                GateOp::Or => format!("({a} | {b})"),
                GateOp::Xor => format!("({a} ^ {b})"),
                GateOp::Xnor => format!("({a} ~^ {b})"),
                GateOp::Nand => format!("~({a} & {b})"),
                GateOp::Nor => format!("~({a} | {b})"),
            }
        }
        Expr::Compare { op, lhs, rhs } => {
            format!("{}({}, {})", op.name(), symbolic_expr(lhs), symbolic_expr(rhs))
        }
        Expr::Mux {
            selector,
            if_true,
            if_false,
        } => format!(
            "MUX({}, {}, {})",
            symbolic_expr(selector),
            symbolic_expr(if_true),
            symbolic_expr(if_false)
        ),
        Expr::Concat(parts) => {
            let inner: Vec<String> = parts.iter().map(|p| symbolic_expr(p)).collect();
            format!("{{{}}}", inner.join(", "))
        }
        Expr::Const(_) | Expr::Var(_) | Expr::BitSelect { .. } | Expr::PartSelect { .. } => {
            e.to_string()
        }
    }
}
