//! Unchecked builders and bit-level helpers.
//!
//! Rewrites that preserve widths by construction use these instead of the
//! checked `Expr::new_*` constructors. Trees built here can still be checked
//! with [`Expr::validate`](crate::Expr::validate).

use crate::expr::{CmpOp, Const, Expr, ExprRef, GateOp, Var};
use std::sync::Arc;

/// 1-bit variable.
pub fn var(name: &str) -> ExprRef {
    Arc::new(Expr::Var(Var::scalar(name)))
}

/// Variable of the given width.
pub fn vec_var(name: &str, width: u32) -> ExprRef {
    Arc::new(Expr::Var(Var {
        name: name.to_string(),
        width,
        signed: false,
    }))
}

/// Reference to an existing variable.
pub fn var_ref(v: &Var) -> ExprRef {
    Arc::new(Expr::Var(v.clone()))
}

/// Constant; the value is masked to the width.
pub fn konst(value: u64, width: u32) -> ExprRef {
    let mut c = Const::ones(width);
    c.value &= value;
    Arc::new(Expr::Const(c))
}

/// 1-bit constant.
pub fn bit(value: bool) -> ExprRef {
    Arc::new(Expr::Const(Const::bit(value)))
}

/// `~a`
pub fn not(a: ExprRef) -> ExprRef {
    Arc::new(Expr::Not(a))
}

/// Two-input gate.
pub fn gate(op: GateOp, a: ExprRef, b: ExprRef) -> ExprRef {
    Arc::new(Expr::Gate { op, a, b })
}

/// `a & b`
pub fn and(a: ExprRef, b: ExprRef) -> ExprRef {
    gate(GateOp::And, a, b)
}

/// `a | b`
pub fn or(a: ExprRef, b: ExprRef) -> ExprRef {
    gate(GateOp::Or, a, b)
}

/// `a ^ b`
pub fn xor(a: ExprRef, b: ExprRef) -> ExprRef {
    gate(GateOp::Xor, a, b)
}

/// `~(a ^ b)`
pub fn xnor(a: ExprRef, b: ExprRef) -> ExprRef {
    gate(GateOp::Xnor, a, b)
}

/// `~(a & b)`
pub fn nand(a: ExprRef, b: ExprRef) -> ExprRef {
    gate(GateOp::Nand, a, b)
}

/// `~(a | b)`
pub fn nor(a: ExprRef, b: ExprRef) -> ExprRef {
    gate(GateOp::Nor, a, b)
}

/// `lhs == rhs`
pub fn eq(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    Arc::new(Expr::Compare {
        op: CmpOp::Eq,
        lhs,
        rhs,
    })
}

/// `lhs != rhs`
pub fn neq(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    Arc::new(Expr::Compare {
        op: CmpOp::Neq,
        lhs,
        rhs,
    })
}

/// `selector ? if_true : if_false`
pub fn mux(selector: ExprRef, if_true: ExprRef, if_false: ExprRef) -> ExprRef {
    Arc::new(Expr::Mux {
        selector,
        if_true,
        if_false,
    })
}

/// `base[index]`
pub fn bit_select(base: ExprRef, index: u32) -> ExprRef {
    Arc::new(Expr::BitSelect { base, index })
}

/// `base[msb:lsb]`
pub fn part_select(base: ExprRef, msb: u32, lsb: u32) -> ExprRef {
    Arc::new(Expr::PartSelect { base, msb, lsb })
}

/// `{parts...}`
pub fn concat(parts: Vec<ExprRef>) -> ExprRef {
    Arc::new(Expr::Concat(parts))
}

/// Left-associated AND of all terms; `None` when empty.
pub fn and_all<I: IntoIterator<Item = ExprRef>>(terms: I) -> Option<ExprRef> {
    terms.into_iter().reduce(and)
}

/// Left-associated OR of all terms; `None` when empty.
pub fn or_all<I: IntoIterator<Item = ExprRef>>(terms: I) -> Option<ExprRef> {
    terms.into_iter().reduce(or)
}

/// One bit of a vector expression as a 1-bit expression.
///
/// Variables wider than one bit become `BitSelect`s; selects and concats are
/// resolved to the underlying bit; bitwise gates and muxes are split per bit.
/// 1-bit expressions are returned as they are for `i == 0`.
pub fn bit_of(expr: &ExprRef, i: u32) -> ExprRef {
    if expr.width() == 1 {
        return expr.clone();
    }
    match &**expr {
        Expr::Const(c) => bit(c.bit_at(i)),
        Expr::Var(_) => bit_select(expr.clone(), i),
        Expr::Gate { op, a, b } => gate(*op, bit_of(a, i), bit_of(b, i)),
        Expr::Mux {
            selector,
            if_true,
            if_false,
        } => mux(selector.clone(), bit_of(if_true, i), bit_of(if_false, i)),
        Expr::PartSelect { base, msb, lsb } => bit_of(base, (*msb).min(*lsb) + i),
        Expr::Concat(parts) => {
            // parts[0] holds the most significant bits.
            let mut offset = 0;
            for part in parts.iter().rev() {
                let w = part.width();
                if i < offset + w {
                    return bit_of(part, i - offset);
                }
                offset += w;
            }
            bit(false)
        }
        // Widths of Not, Compare and BitSelect are always 1.
        Expr::Not(_) | Expr::Compare { .. } | Expr::BitSelect { .. } => expr.clone(),
    }
}

/// `whole` with bits `low..low + value.width()` replaced by `value`.
///
/// The result is a concat of single bits, most significant first, or the
/// lone bit when `whole` is one bit wide.
pub fn splice(whole: &ExprRef, low: u32, value: &ExprRef) -> ExprRef {
    let high = low + value.width();
    let mut bits: Vec<ExprRef> = (0..whole.width())
        .rev()
        .map(|i| {
            if (low..high).contains(&i) {
                bit_of(value, i - low)
            } else {
                bit_of(whole, i)
            }
        })
        .collect();
    if bits.len() == 1 {
        return bits.remove(0);
    }
    concat(bits)
}

/// Expands `subject == value` into an AND of bit literals.
///
/// Bit `i` contributes `subject[i]` when bit `i` of `value` is 1 and
/// `~subject[i]` otherwise. Bits are folded from the most significant down,
/// left-associated. A value that does not fit the subject's width yields the
/// constant 0.
pub fn expand_eq_const(subject: &ExprRef, value: u64) -> ExprRef {
    let width = subject.width();
    if width < 64 && value >> width != 0 {
        return bit(false);
    }
    let literals = (0..width).rev().map(|i| {
        let b = bit_of(subject, i);
        if (value >> i) & 1 == 1 {
            b
        } else {
            not(b)
        }
    });
    and_all(literals).unwrap_or_else(|| bit(true))
}

/// Expands `a == b` for same-width vectors into
/// `AND_i ((a[i] & b[i]) | (~a[i] & ~b[i]))`, most significant bit first.
pub fn expand_eq(a: &ExprRef, b: &ExprRef) -> ExprRef {
    let width = a.width().min(b.width());
    let bits = (0..width).rev().map(|i| {
        let (x, y) = (bit_of(a, i), bit_of(b, i));
        or(and(x.clone(), y.clone()), and(not(x), not(y)))
    });
    and_all(bits).unwrap_or_else(|| bit(true))
}
