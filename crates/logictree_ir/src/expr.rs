//! Expression nodes.
//!
//! Every expression is immutable and shared through [`ExprRef`]. Widths are
//! derived from the operands; the `new_*` constructors check the width rules
//! and [`Expr::validate`] re-checks a whole tree.
//!
//! Equality is structural and ignores operand order for the commutative
//! gates (AND, OR, XOR, XNOR), so `a & b == b & a`. Hashing goes through
//! [`Expr::canonical_key`], which sorts those operands by their own keys, so
//! it agrees with equality.

use crate::error::{IrError, IrResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared handle to an immutable expression.
pub type ExprRef = Arc<Expr>;

/// Widest value the IR represents; values are held in a `u64`.
pub const MAX_WIDTH: u32 = 64;

/// All-ones mask for `width` bits.
pub fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

// ============================================================================
// Leaves
// ============================================================================

/// Radix a literal was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Radix {
    /// `'b`
    Binary,
    /// `'o`
    Octal,
    /// `'d` or bare decimal
    Decimal,
    /// `'h`
    Hex,
}

impl Radix {
    fn letter(self) -> char {
        match self {
            Radix::Binary => 'b',
            Radix::Octal => 'o',
            Radix::Decimal => 'd',
            Radix::Hex => 'h',
        }
    }
}

/// A constant bit vector.
#[derive(Clone, Debug)]
pub struct Const {
    /// Unsigned value; always fits in `width` bits.
    pub value: u64,
    /// Width in bits, `1..=64`.
    pub width: u32,
    /// Declared signed (`'s`).
    pub signed: bool,
    /// Radix of the source literal, when known.
    pub base: Option<Radix>,
    /// Source spelling, when known.
    pub raw: Option<String>,
}

impl Const {
    /// Checked constructor.
    pub fn new(value: u64, width: u32) -> IrResult<Self> {
        if width == 0 || width > MAX_WIDTH {
            return Err(IrError::invariant(
                "Const",
                format!("width {width} outside 1..={MAX_WIDTH}"),
            ));
        }
        if value & !mask(width) != 0 {
            return Err(IrError::invariant(
                "Const",
                format!("value {value} does not fit in {width} bits"),
            ));
        }
        Ok(Self {
            value,
            width,
            signed: false,
            base: None,
            raw: None,
        })
    }

    /// A 1-bit constant.
    pub fn bit(value: bool) -> Self {
        Self {
            value: value as u64,
            width: 1,
            signed: false,
            base: None,
            raw: None,
        }
    }

    /// All zeros; `width` is clamped to the representable range.
    pub fn zeros(width: u32) -> Self {
        Self {
            value: 0,
            width: width.clamp(1, MAX_WIDTH),
            ..Self::bit(false)
        }
    }

    /// All ones; `width` is clamped to the representable range.
    pub fn ones(width: u32) -> Self {
        let width = width.clamp(1, MAX_WIDTH);
        Self {
            value: mask(width),
            width,
            ..Self::bit(false)
        }
    }

    /// Marks the constant signed.
    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Records the source radix.
    pub fn with_base(mut self, base: Radix) -> Self {
        self.base = Some(base);
        self
    }

    /// Records the source spelling.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Same value at another width, or `None` when it does not fit.
    pub fn resized(&self, width: u32) -> Option<Self> {
        let mut c = Const::new(self.value, width).ok()?;
        c.signed = self.signed;
        c.base = self.base;
        Some(c)
    }

    /// `true` when every bit is 0.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// `true` when every bit is 1.
    pub fn is_ones(&self) -> bool {
        self.value == mask(self.width)
    }

    /// Bit `i` of the value.
    pub fn bit_at(&self, i: u32) -> bool {
        i < 64 && (self.value >> i) & 1 == 1
    }

    /// Verilog spelling: the source text if it was a based literal, else
    /// `W'b…` zero-padded to the width (or the radix it was written in).
    pub fn to_verilog(&self) -> String {
        if let Some(raw) = &self.raw {
            if raw.contains('\'') {
                return raw.clone();
            }
        }
        let s = if self.signed { "s" } else { "" };
        let base = self.base.unwrap_or(Radix::Binary);
        let digits = match base {
            Radix::Binary => format!("{:0width$b}", self.value, width = self.width as usize),
            Radix::Octal => format!("{:o}", self.value),
            Radix::Decimal => self.value.to_string(),
            Radix::Hex => format!("{:x}", self.value),
        };
        format!("{}'{}{}{}", self.width, s, base.letter(), digits)
    }
}

impl PartialEq for Const {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.width == other.width
    }
}

impl Eq for Const {}

/// A named signal of a given width.
///
/// Two `Var`s are the same variable when their names match; width and
/// signedness are declaration metadata.
#[derive(Clone, Debug)]
pub struct Var {
    /// Signal name.
    pub name: String,
    /// Width in bits.
    pub width: u32,
    /// Declared signed.
    pub signed: bool,
}

impl Var {
    /// Checked constructor.
    pub fn new(name: impl Into<String>, width: u32) -> IrResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(IrError::invariant("Var", "name must not be empty"));
        }
        if width == 0 || width > MAX_WIDTH {
            return Err(IrError::invariant(
                "Var",
                format!("`{name}` has width {width} outside 1..={MAX_WIDTH}"),
            ));
        }
        Ok(Self {
            name,
            width,
            signed: false,
        })
    }

    /// A 1-bit variable. The name is not checked; see [`Expr::validate`].
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: 1,
            signed: false,
        }
    }

    /// Marks the variable signed.
    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Var {}

impl Hash for Var {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Var {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Var {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Two-input bitwise gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GateOp {
    /// `a & b`
    And,
    /// `a | b`
    Or,
    /// `a ^ b`
    Xor,
    /// `~(a ^ b)`
    Xnor,
    /// `~(a & b)`
    Nand,
    /// `~(a | b)`
    Nor,
}

impl GateOp {
    /// Upper-case gate name used in labels and statistics.
    pub fn name(self) -> &'static str {
        match self {
            GateOp::And => "AND",
            GateOp::Or => "OR",
            GateOp::Xor => "XOR",
            GateOp::Xnor => "XNOR",
            GateOp::Nand => "NAND",
            GateOp::Nor => "NOR",
        }
    }

    /// Node kind name used in serialized trees.
    pub fn kind(self) -> &'static str {
        match self {
            GateOp::And => "And",
            GateOp::Or => "Or",
            GateOp::Xor => "Xor",
            GateOp::Xnor => "Xnor",
            GateOp::Nand => "Nand",
            GateOp::Nor => "Nor",
        }
    }

    /// Operand order is ignored by equality and hashing.
    ///
    /// Only the four base gates qualify; `Nand` and `Nor` compare in order.
    pub fn is_commutative(self) -> bool {
        matches!(self, GateOp::And | GateOp::Or | GateOp::Xor | GateOp::Xnor)
    }

    /// Applies the gate to `width`-bit values.
    pub fn apply(self, a: u64, b: u64, width: u32) -> u64 {
        let m = mask(width);
        let v = match self {
            GateOp::And => a & b,
            GateOp::Or => a | b,
            GateOp::Xor => a ^ b,
            GateOp::Xnor => !(a ^ b),
            GateOp::Nand => !(a & b),
            GateOp::Nor => !(a | b),
        };
        v & m
    }

    fn write_infix(self, f: &mut fmt::Formatter<'_>, a: &Expr, b: &Expr) -> fmt::Result {
        match self {
            GateOp::And => write!(f, "({a} & {b})"),
            GateOp::Or => write!(f, "({a} | {b})"),
            GateOp::Xor => write!(f, "({a} ^ {b})"),
            GateOp::Xnor => write!(f, "~({a} ^ {b})"),
            GateOp::Nand => write!(f, "~({a} & {b})"),
            GateOp::Nor => write!(f, "~({a} | {b})"),
        }
    }
}

/// Equality comparisons; both produce one bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Neq,
}

impl CmpOp {
    /// Upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            CmpOp::Eq => "EQ",
            CmpOp::Neq => "NEQ",
        }
    }

    /// Node kind name.
    pub fn kind(self) -> &'static str {
        match self {
            CmpOp::Eq => "Eq",
            CmpOp::Neq => "Neq",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Neq => "!=",
        }
    }
}

// ============================================================================
// Expression
// ============================================================================

/// A combinational expression.
#[derive(Clone, Debug)]
pub enum Expr {
    /// Constant.
    Const(Const),
    /// Signal reference.
    Var(Var),
    /// 1-bit inversion.
    Not(ExprRef),
    /// Bitwise gate over same-width operands.
    Gate {
        /// Which gate.
        op: GateOp,
        /// First operand.
        a: ExprRef,
        /// Second operand.
        b: ExprRef,
    },
    /// Equality test producing one bit.
    Compare {
        /// `==` or `!=`.
        op: CmpOp,
        /// Left operand.
        lhs: ExprRef,
        /// Right operand, same width as `lhs`.
        rhs: ExprRef,
    },
    /// `selector ? if_true : if_false`.
    Mux {
        /// 1-bit select.
        selector: ExprRef,
        /// Value when the selector is 1.
        if_true: ExprRef,
        /// Value when the selector is 0.
        if_false: ExprRef,
    },
    /// Bit `index` of `base`, counted from the least significant bit.
    BitSelect {
        /// Selected vector.
        base: ExprRef,
        /// Bit position.
        index: u32,
    },
    /// Bits between `msb` and `lsb` of `base`, inclusive.
    PartSelect {
        /// Selected vector.
        base: ExprRef,
        /// Position written first in the source.
        msb: u32,
        /// Position written second in the source.
        lsb: u32,
    },
    /// Concatenation, most significant part first.
    Concat(Vec<ExprRef>),
}

impl Expr {
    /// Wraps the expression in an [`ExprRef`].
    pub fn into_ref(self) -> ExprRef {
        Arc::new(self)
    }

    /// Result width in bits.
    pub fn width(&self) -> u32 {
        match self {
            Expr::Const(c) => c.width,
            Expr::Var(v) => v.width,
            Expr::Not(x) => x.width(),
            Expr::Gate { a, .. } => a.width(),
            Expr::Compare { .. } | Expr::BitSelect { .. } => 1,
            Expr::Mux { if_true, .. } => if_true.width(),
            Expr::PartSelect { msb, lsb, .. } => msb.abs_diff(*lsb) + 1,
            Expr::Concat(parts) => parts.iter().map(|p| p.width()).sum(),
        }
    }

    /// Node kind name, e.g. `"And"`, `"BitSelect"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Const(_) => "Const",
            Expr::Var(_) => "Var",
            Expr::Not(_) => "Not",
            Expr::Gate { op, .. } => op.kind(),
            Expr::Compare { op, .. } => op.kind(),
            Expr::Mux { .. } => "Mux",
            Expr::BitSelect { .. } => "BitSelect",
            Expr::PartSelect { .. } => "PartSelect",
            Expr::Concat(_) => "Concat",
        }
    }

    /// Direct operands in order.
    pub fn operands(&self) -> Vec<&ExprRef> {
        match self {
            Expr::Const(_) | Expr::Var(_) => Vec::new(),
            Expr::Not(x) => vec![x],
            Expr::Gate { a, b, .. } => vec![a, b],
            Expr::Compare { lhs, rhs, .. } => vec![lhs, rhs],
            Expr::Mux {
                selector,
                if_true,
                if_false,
            } => vec![selector, if_true, if_false],
            Expr::BitSelect { base, .. } | Expr::PartSelect { base, .. } => vec![base],
            Expr::Concat(parts) => parts.iter().collect(),
        }
    }

    /// The constant, if this is one.
    pub fn as_const(&self) -> Option<&Const> {
        match self {
            Expr::Const(c) => Some(c),
            _ => None,
        }
    }

    /// The variable, if this is one.
    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Expr::Var(v) => Some(v),
            _ => None,
        }
    }

    /// `true` for a constant with every bit 0.
    pub fn is_zero(&self) -> bool {
        self.as_const().is_some_and(Const::is_zero)
    }

    /// `true` for a constant with every bit 1.
    pub fn is_ones(&self) -> bool {
        self.as_const().is_some_and(Const::is_ones)
    }

    /// The variable written by an assignment with this expression on the
    /// left: the `Var` itself, or the base of a select into one.
    pub fn lvalue_base(&self) -> Option<&Var> {
        match self {
            Expr::Var(v) => Some(v),
            Expr::BitSelect { base, .. } | Expr::PartSelect { base, .. } => base.as_var(),
            _ => None,
        }
    }

    /// Deterministic string that is equal for equal expressions.
    ///
    /// Commutative gates list their operand keys in sorted order.
    pub fn canonical_key(&self) -> String {
        match self {
            Expr::Const(c) => format!("{}'d{}", c.width, c.value),
            Expr::Var(v) => v.name.clone(),
            Expr::Not(x) => format!("NOT({})", x.canonical_key()),
            Expr::Gate { op, a, b } => {
                let (x, y) = (a.canonical_key(), b.canonical_key());
                let (x, y) = if op.is_commutative() { sorted_pair(x, y) } else { (x, y) };
                format!("{}({x},{y})", op.name())
            }
            Expr::Compare { op, lhs, rhs } => {
                format!("{}({},{})", op.name(), lhs.canonical_key(), rhs.canonical_key())
            }
            Expr::Mux {
                selector,
                if_true,
                if_false,
            } => format!(
                "MUX({},{},{})",
                selector.canonical_key(),
                if_true.canonical_key(),
                if_false.canonical_key()
            ),
            Expr::BitSelect { base, index } => format!("{}[{index}]", base.canonical_key()),
            Expr::PartSelect { base, msb, lsb } => {
                format!("{}[{msb}:{lsb}]", base.canonical_key())
            }
            Expr::Concat(parts) => {
                let keys: Vec<String> = parts.iter().map(|p| p.canonical_key()).collect();
                format!("CONCAT({})", keys.join(","))
            }
        }
    }

    /// Compact prefix form used in labels: `AND{a, NOT{b}}`.
    pub fn inline(&self) -> String {
        match self {
            Expr::Const(c) => c.to_verilog(),
            Expr::Var(v) => v.name.clone(),
            Expr::BitSelect { .. } | Expr::PartSelect { .. } => self.to_string(),
            Expr::Not(x) => format!("NOT{{{}}}", x.inline()),
            Expr::Gate { op, a, b } => format!("{}{{{}, {}}}", op.name(), a.inline(), b.inline()),
            Expr::Compare { op, lhs, rhs } => {
                format!("{}{{{}, {}}}", op.name(), lhs.inline(), rhs.inline())
            }
            Expr::Mux {
                selector,
                if_true,
                if_false,
            } => format!(
                "MUX{{{}, {}, {}}}",
                selector.inline(),
                if_true.inline(),
                if_false.inline()
            ),
            Expr::Concat(parts) => {
                let inner: Vec<String> = parts.iter().map(|p| p.inline()).collect();
                format!("CONCAT{{{}}}", inner.join(", "))
            }
        }
    }

    /// Re-checks every width and shape rule in the tree.
    pub fn validate(&self) -> IrResult<()> {
        match self {
            Expr::Const(c) => {
                Const::new(c.value, c.width)?;
            }
            Expr::Var(v) => {
                Var::new(v.name.clone(), v.width)?;
            }
            Expr::Not(x) => {
                x.validate()?;
                check_not(x)?;
            }
            Expr::Gate { op, a, b } => {
                a.validate()?;
                b.validate()?;
                check_same_width(op.kind(), a, b)?;
            }
            Expr::Compare { op, lhs, rhs } => {
                lhs.validate()?;
                rhs.validate()?;
                check_same_width(op.kind(), lhs, rhs)?;
            }
            Expr::Mux {
                selector,
                if_true,
                if_false,
            } => {
                selector.validate()?;
                if_true.validate()?;
                if_false.validate()?;
                check_mux(selector, if_true, if_false)?;
            }
            Expr::BitSelect { base, index } => {
                base.validate()?;
                check_bit_select(base, *index)?;
            }
            Expr::PartSelect { base, msb, lsb } => {
                base.validate()?;
                check_part_select(base, *msb, *lsb)?;
            }
            Expr::Concat(parts) => {
                for p in parts {
                    p.validate()?;
                }
                check_concat(parts)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Checked constructors
    // ------------------------------------------------------------------------

    /// `~x`; `x` must be 1 bit.
    pub fn new_not(x: ExprRef) -> IrResult<ExprRef> {
        check_not(&x)?;
        Ok(Expr::Not(x).into_ref())
    }

    /// Two-input gate over same-width operands.
    pub fn new_gate(op: GateOp, a: ExprRef, b: ExprRef) -> IrResult<ExprRef> {
        check_same_width(op.kind(), &a, &b)?;
        Ok(Expr::Gate { op, a, b }.into_ref())
    }

    /// Equality test over same-width operands.
    pub fn new_compare(op: CmpOp, lhs: ExprRef, rhs: ExprRef) -> IrResult<ExprRef> {
        check_same_width(op.kind(), &lhs, &rhs)?;
        Ok(Expr::Compare { op, lhs, rhs }.into_ref())
    }

    /// `selector ? if_true : if_false`.
    pub fn new_mux(selector: ExprRef, if_true: ExprRef, if_false: ExprRef) -> IrResult<ExprRef> {
        check_mux(&selector, &if_true, &if_false)?;
        Ok(Expr::Mux {
            selector,
            if_true,
            if_false,
        }
        .into_ref())
    }

    /// `base[index]`.
    pub fn new_bit_select(base: ExprRef, index: u32) -> IrResult<ExprRef> {
        check_bit_select(&base, index)?;
        Ok(Expr::BitSelect { base, index }.into_ref())
    }

    /// `base[msb:lsb]`.
    pub fn new_part_select(base: ExprRef, msb: u32, lsb: u32) -> IrResult<ExprRef> {
        check_part_select(&base, msb, lsb)?;
        Ok(Expr::PartSelect { base, msb, lsb }.into_ref())
    }

    /// `{parts...}`.
    pub fn new_concat(parts: Vec<ExprRef>) -> IrResult<ExprRef> {
        check_concat(&parts)?;
        Ok(Expr::Concat(parts).into_ref())
    }
}

fn sorted_pair(x: String, y: String) -> (String, String) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

fn check_not(x: &Expr) -> IrResult<()> {
    if x.width() != 1 {
        return Err(IrError::invariant(
            "Not",
            format!("operand `{x}` is {} bits wide, expected 1", x.width()),
        ));
    }
    Ok(())
}

fn check_same_width(node: &'static str, a: &Expr, b: &Expr) -> IrResult<()> {
    if a.width() != b.width() {
        return Err(IrError::invariant(
            node,
            format!(
                "operand widths differ: `{a}` is {} bits, `{b}` is {} bits",
                a.width(),
                b.width()
            ),
        ));
    }
    Ok(())
}

fn check_mux(selector: &Expr, if_true: &Expr, if_false: &Expr) -> IrResult<()> {
    if selector.width() != 1 {
        return Err(IrError::invariant(
            "Mux",
            format!("selector `{selector}` is {} bits wide", selector.width()),
        ));
    }
    check_same_width("Mux", if_true, if_false)
}

fn check_bit_select(base: &Expr, index: u32) -> IrResult<()> {
    if index >= base.width() {
        return Err(IrError::invariant(
            "BitSelect",
            format!("index {index} out of range for `{base}` of width {}", base.width()),
        ));
    }
    Ok(())
}

fn check_part_select(base: &Expr, msb: u32, lsb: u32) -> IrResult<()> {
    if msb.max(lsb) >= base.width() {
        return Err(IrError::invariant(
            "PartSelect",
            format!("[{msb}:{lsb}] out of range for `{base}` of width {}", base.width()),
        ));
    }
    Ok(())
}

fn check_concat(parts: &[ExprRef]) -> IrResult<()> {
    if parts.is_empty() {
        return Err(IrError::invariant("Concat", "no parts"));
    }
    let total: u32 = parts.iter().map(|p| p.width()).sum();
    if total > MAX_WIDTH {
        return Err(IrError::invariant(
            "Concat",
            format!("total width {total} exceeds {MAX_WIDTH}"),
        ));
    }
    Ok(())
}

fn same_unordered(a: &ExprRef, b: &ExprRef, c: &ExprRef, d: &ExprRef) -> bool {
    (a == c && b == d) || (a == d && b == c)
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        match (self, other) {
            (Expr::Const(x), Expr::Const(y)) => x == y,
            (Expr::Var(x), Expr::Var(y)) => x == y,
            (Expr::Not(x), Expr::Not(y)) => x == y,
            (
                Expr::Gate { op, a, b },
                Expr::Gate {
                    op: op2,
                    a: a2,
                    b: b2,
                },
            ) => {
                op == op2
                    && if op.is_commutative() {
                        same_unordered(a, b, a2, b2)
                    } else {
                        a == a2 && b == b2
                    }
            }
            (
                Expr::Compare { op, lhs, rhs },
                Expr::Compare {
                    op: op2,
                    lhs: l2,
                    rhs: r2,
                },
            ) => op == op2 && lhs == l2 && rhs == r2,
            (
                Expr::Mux {
                    selector,
                    if_true,
                    if_false,
                },
                Expr::Mux {
                    selector: s2,
                    if_true: t2,
                    if_false: f2,
                },
            ) => selector == s2 && if_true == t2 && if_false == f2,
            (
                Expr::BitSelect { base, index },
                Expr::BitSelect {
                    base: b2,
                    index: i2,
                },
            ) => index == i2 && base == b2,
            (
                Expr::PartSelect { base, msb, lsb },
                Expr::PartSelect {
                    base: b2,
                    msb: m2,
                    lsb: l2,
                },
            ) => msb == m2 && lsb == l2 && base == b2,
            (Expr::Concat(x), Expr::Concat(y)) => x == y,
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_key().hash(state);
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => f.write_str(&c.to_verilog()),
            Expr::Var(v) => f.write_str(&v.name),
            Expr::Not(x) => write!(f, "(~{x})"),
            Expr::Gate { op, a, b } => op.write_infix(f, a, b),
            Expr::Compare { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Expr::Mux {
                selector,
                if_true,
                if_false,
            } => write!(f, "({selector} ? {if_true} : {if_false})"),
            Expr::BitSelect { base, index } => write!(f, "{base}[{index}]"),
            Expr::PartSelect { base, msb, lsb } => write!(f, "{base}[{msb}:{lsb}]"),
            Expr::Concat(parts) => {
                f.write_str("{")?;
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                f.write_str("}")
            }
        }
    }
}
