//! Reduced ordered binary decision diagrams.
//!
//! Nodes are hash-consed through a unique table, so two references are
//! equal exactly when they denote the same Boolean function under the
//! manager's variable order. All operations go through [`Bdd::ite`], whose
//! results are cached.

use crate::error::{HashError, HashResult};
use logictree_ir::{CmpOp, Expr, GateOp};
use std::collections::HashMap;

/// Reference to a node of a [`Bdd`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BddRef(u32);

impl BddRef {
    /// The constant 0 function.
    pub const FALSE: BddRef = BddRef(0);
    /// The constant 1 function.
    pub const TRUE: BddRef = BddRef(1);

    /// `true` for [`BddRef::FALSE`] and [`BddRef::TRUE`].
    pub fn is_terminal(self) -> bool {
        self.0 < 2
    }

    /// Raw node index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
struct Node {
    level: u32,
    low: BddRef,
    high: BddRef,
}

const TERMINAL_LEVEL: u32 = u32::MAX;

/// A BDD manager over a fixed variable order.
#[derive(Debug)]
pub struct Bdd {
    order: Vec<String>,
    levels: HashMap<String, u32>,
    nodes: Vec<Node>,
    unique: HashMap<(u32, BddRef, BddRef), BddRef>,
    ite_cache: HashMap<(BddRef, BddRef, BddRef), BddRef>,
}

impl Bdd {
    /// A manager whose variables are `order`, first name at the root.
    pub fn new(order: Vec<String>) -> Self {
        let levels = order
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i as u32))
            .collect();
        let terminal = |v| Node {
            level: TERMINAL_LEVEL,
            low: BddRef(v),
            high: BddRef(v),
        };
        Self {
            order,
            levels,
            nodes: vec![terminal(0), terminal(1)],
            unique: HashMap::new(),
            ite_cache: HashMap::new(),
        }
    }

    /// Variable names, root first.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Number of nodes, terminals included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The function that is 1 exactly when `name` is 1.
    pub fn var(&mut self, name: &str) -> HashResult<BddRef> {
        let level = *self
            .levels
            .get(name)
            .ok_or_else(|| HashError::UnknownVariable(name.to_string()))?;
        Ok(self.mk(level, BddRef::FALSE, BddRef::TRUE))
    }

    /// A constant.
    pub fn constant(&self, value: bool) -> BddRef {
        if value {
            BddRef::TRUE
        } else {
            BddRef::FALSE
        }
    }

    fn mk(&mut self, level: u32, low: BddRef, high: BddRef) -> BddRef {
        if low == high {
            return low;
        }
        if let Some(&r) = self.unique.get(&(level, low, high)) {
            return r;
        }
        let r = BddRef(self.nodes.len() as u32);
        self.nodes.push(Node { level, low, high });
        self.unique.insert((level, low, high), r);
        r
    }

    fn level(&self, f: BddRef) -> u32 {
        self.nodes[f.0 as usize].level
    }

    /// Cofactors of `f` with respect to the variable at `level`.
    fn cofactors(&self, f: BddRef, level: u32) -> (BddRef, BddRef) {
        let n = self.nodes[f.0 as usize];
        if n.level == level {
            (n.low, n.high)
        } else {
            (f, f)
        }
    }

    /// `if f then g else h`.
    pub fn ite(&mut self, f: BddRef, g: BddRef, h: BddRef) -> BddRef {
        if f == BddRef::TRUE {
            return g;
        }
        if f == BddRef::FALSE {
            return h;
        }
        if g == h {
            return g;
        }
        if g == BddRef::TRUE && h == BddRef::FALSE {
            return f;
        }
        if let Some(&r) = self.ite_cache.get(&(f, g, h)) {
            return r;
        }
        let top = self.level(f).min(self.level(g)).min(self.level(h));
        let (f0, f1) = self.cofactors(f, top);
        let (g0, g1) = self.cofactors(g, top);
        let (h0, h1) = self.cofactors(h, top);
        let low = self.ite(f0, g0, h0);
        let high = self.ite(f1, g1, h1);
        let r = self.mk(top, low, high);
        self.ite_cache.insert((f, g, h), r);
        r
    }

    /// `¬f`
    pub fn not(&mut self, f: BddRef) -> BddRef {
        self.ite(f, BddRef::FALSE, BddRef::TRUE)
    }

    /// `f ∧ g`
    pub fn and(&mut self, f: BddRef, g: BddRef) -> BddRef {
        self.ite(f, g, BddRef::FALSE)
    }

    /// `f ∨ g`
    pub fn or(&mut self, f: BddRef, g: BddRef) -> BddRef {
        self.ite(f, BddRef::TRUE, g)
    }

    /// `f ⊕ g`
    pub fn xor(&mut self, f: BddRef, g: BddRef) -> BddRef {
        let ng = self.not(g);
        self.ite(f, ng, g)
    }

    /// Builds one diagram per bit of `expr`, least significant bit first.
    ///
    /// A 1-bit variable `a` becomes the variable `a`; bit `i` of a wider
    /// variable `s` becomes the variable `s[i]`.
    pub fn build(&mut self, expr: &Expr) -> HashResult<Vec<BddRef>> {
        match expr {
            Expr::Const(c) => Ok((0..c.width).map(|i| self.constant(c.bit_at(i))).collect()),
            Expr::Var(v) => {
                if v.width == 1 {
                    Ok(vec![self.var(&v.name)?])
                } else {
                    (0..v.width)
                        .map(|i| self.var(&bit_name(&v.name, i)))
                        .collect()
                }
            }
            Expr::Not(x) => {
                let bits = self.build(x)?;
                Ok(bits.into_iter().map(|b| self.not(b)).collect())
            }
            Expr::Gate { op, a, b } => {
                let (xa, xb) = (self.build(a)?, self.build(b)?);
                same_width(op.kind(), &xa, &xb)?;
                Ok(xa
                    .into_iter()
                    .zip(xb)
                    .map(|(x, y)| self.gate(*op, x, y))
                    .collect())
            }
            Expr::Compare { op, lhs, rhs } => {
                let (xl, xr) = (self.build(lhs)?, self.build(rhs)?);
                same_width(op.kind(), &xl, &xr)?;
                let mut acc = BddRef::TRUE;
                for (x, y) in xl.into_iter().zip(xr) {
                    let bit_eq = self.xor(x, y);
                    let bit_eq = self.not(bit_eq);
                    acc = self.and(acc, bit_eq);
                }
                Ok(vec![match op {
                    CmpOp::Eq => acc,
                    CmpOp::Neq => self.not(acc),
                }])
            }
            Expr::Mux {
                selector,
                if_true,
                if_false,
            } => {
                let sel = self.build(selector)?;
                if sel.len() != 1 {
                    return Err(HashError::WidthMismatch {
                        node: "Mux",
                        detail: format!("selector is {} bits wide", sel.len()),
                    });
                }
                let (t, f) = (self.build(if_true)?, self.build(if_false)?);
                same_width("Mux", &t, &f)?;
                Ok(t.into_iter()
                    .zip(f)
                    .map(|(x, y)| self.ite(sel[0], x, y))
                    .collect())
            }
            Expr::BitSelect { base, index } => {
                let bits = self.build(base)?;
                let b = bits.get(*index as usize).ok_or_else(|| HashError::WidthMismatch {
                    node: "BitSelect",
                    detail: format!("index {index} outside {} bits", bits.len()),
                })?;
                Ok(vec![*b])
            }
            Expr::PartSelect { base, msb, lsb } => {
                let bits = self.build(base)?;
                let (lo, hi) = ((*msb).min(*lsb) as usize, (*msb).max(*lsb) as usize);
                if hi >= bits.len() {
                    return Err(HashError::WidthMismatch {
                        node: "PartSelect",
                        detail: format!("[{msb}:{lsb}] outside {} bits", bits.len()),
                    });
                }
                Ok(bits[lo..=hi].to_vec())
            }
            Expr::Concat(parts) => {
                let mut out = Vec::new();
                for part in parts.iter().rev() {
                    out.extend(self.build(part)?);
                }
                Ok(out)
            }
        }
    }

    fn gate(&mut self, op: GateOp, x: BddRef, y: BddRef) -> BddRef {
        match op {
            GateOp::And => self.and(x, y),
            GateOp::Or => self.or(x, y),
            GateOp::Xor => self.xor(x, y),
            GateOp::Xnor => {
                let r = self.xor(x, y);
                self.not(r)
            }
            GateOp::Nand => {
                let r = self.and(x, y);
                self.not(r)
            }
            GateOp::Nor => {
                let r = self.or(x, y);
                self.not(r)
            }
        }
    }

    /// `TRUE`, `FALSE`, or `ite(var, high, low)` for one diagram.
    pub fn to_expr(&self, root: BddRef) -> String {
        let mut memo = HashMap::new();
        self.render(root, &mut memo)
    }

    /// [`to_expr`](Bdd::to_expr) for one diagram per bit; more than one bit
    /// renders as `{msb, ..., lsb}`.
    pub fn to_expr_bits(&self, bits: &[BddRef]) -> String {
        let mut memo = HashMap::new();
        if let [only] = bits {
            return self.render(*only, &mut memo);
        }
        let parts: Vec<String> = bits
            .iter()
            .rev()
            .map(|b| self.render(*b, &mut memo))
            .collect();
        format!("{{{}}}", parts.join(", "))
    }

    fn render(&self, f: BddRef, memo: &mut HashMap<BddRef, String>) -> String {
        match f {
            BddRef::FALSE => return "FALSE".to_string(),
            BddRef::TRUE => return "TRUE".to_string(),
            _ => {}
        }
        if let Some(s) = memo.get(&f) {
            return s.clone();
        }
        let n = self.nodes[f.0 as usize];
        let high = self.render(n.high, memo);
        let low = self.render(n.low, memo);
        let s = format!("ite({}, {high}, {low})", self.order[n.level as usize]);
        memo.insert(f, s.clone());
        s
    }

    /// Evaluates a diagram under `assignment` (missing names read as 0).
    pub fn eval(&self, root: BddRef, assignment: &HashMap<String, bool>) -> bool {
        let mut f = root;
        while !f.is_terminal() {
            let n = self.nodes[f.0 as usize];
            let name = &self.order[n.level as usize];
            f = if assignment.get(name).copied().unwrap_or(false) {
                n.high
            } else {
                n.low
            };
        }
        f == BddRef::TRUE
    }
}

/// The BDD variable for bit `i` of the vector `name`.
pub fn bit_name(name: &str, i: u32) -> String {
    format!("{name}[{i}]")
}

fn same_width(node: &'static str, a: &[BddRef], b: &[BddRef]) -> HashResult<()> {
    if a.len() != b.len() {
        return Err(HashError::WidthMismatch {
            node,
            detail: format!("{} bits against {} bits", a.len(), b.len()),
        });
    }
    Ok(())
}
