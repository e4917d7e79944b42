//! Numeric literal parsing.
//!
//! Handles bare decimals (`42`, `1_000`), sized based literals (`4'b1010`,
//! `8'hFF`, `8'sd5`, `6'o17`), unsized based literals (`'b1`, `'hF`) and
//! fill literals (`'0`, `'1`, `'x`, `'z`). Values are held in a `u64`;
//! anything wider is rejected.

use crate::error::{LowerError, LowerResult};
use logictree_ir::{mask, Const, Radix, MAX_WIDTH};
use logictree_source::Span;
use logictree_sv_parser::ast::LiteralKind;

/// A parsed literal before it is placed in a context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    /// Value, already masked to `width`.
    pub value: u64,
    /// Declared width, or the value's bit length when unsized.
    pub width: u32,
    /// `N'...` with an explicit width.
    pub sized: bool,
    /// `'s` marker.
    pub signed: bool,
    /// Radix as written.
    pub base: Radix,
    /// `Some(bit)` for `'0`/`'1`, which fill every bit of their context.
    pub fill: Option<bool>,
    /// Source text.
    pub text: String,
}

fn bit_length(value: u64) -> u32 {
    (64 - value.leading_zeros()).max(1)
}

fn is_unknown_digit(c: char) -> bool {
    matches!(c, 'x' | 'X' | 'z' | 'Z' | '?')
}

impl Literal {
    /// Parses the source text of a literal token.
    ///
    /// `x`/`z`/`?` digits read as 0 unless `strict`, which rejects them.
    pub fn parse(text: &str, kind: LiteralKind, strict: bool, span: Span) -> LowerResult<Self> {
        let cleaned: String = text
            .chars()
            .filter(|c| *c != '_' && !c.is_whitespace())
            .collect();
        let too_wide = || LowerError::LiteralTooWide {
            text: text.to_string(),
            span,
        };
        let unknown = || LowerError::UnknownBits {
            text: text.to_string(),
            span,
        };
        match kind {
            LiteralKind::Int => {
                let value: u64 = cleaned.parse().map_err(|_| too_wide())?;
                Ok(Self::bare(value, Radix::Decimal, text))
            }
            LiteralKind::Fill => {
                let digit = cleaned.chars().last().unwrap_or('0');
                if is_unknown_digit(digit) && strict {
                    return Err(unknown());
                }
                let mut lit = Self::bare(u64::from(digit == '1'), Radix::Binary, text);
                lit.fill = Some(digit == '1');
                Ok(lit)
            }
            LiteralKind::Based => {
                let Some((size, rest)) = cleaned.split_once('\'') else {
                    return Err(LowerError::Unsupported {
                        what: format!("literal `{text}`"),
                        span,
                    });
                };
                let (signed, rest) = match rest.strip_prefix(&['s', 'S'][..]) {
                    Some(r) => (true, r),
                    None => (false, rest),
                };
                let mut chars = rest.chars();
                let base = match chars.next().map(|c| c.to_ascii_lowercase()) {
                    Some('b') => Radix::Binary,
                    Some('o') => Radix::Octal,
                    Some('d') => Radix::Decimal,
                    Some('h') => Radix::Hex,
                    _ => {
                        return Err(LowerError::Unsupported {
                            what: format!("literal `{text}`"),
                            span,
                        })
                    }
                };
                let digits = chars.as_str();
                if digits.chars().any(is_unknown_digit) && strict {
                    return Err(unknown());
                }
                let value = digits_value(digits, base).ok_or_else(too_wide)?;
                let mut lit = if size.is_empty() {
                    Self::bare(value, base, text)
                } else {
                    let width: u32 = size.parse().map_err(|_| too_wide())?;
                    if width > MAX_WIDTH {
                        return Err(too_wide());
                    }
                    if width == 0 {
                        return Err(LowerError::Unsupported {
                            what: format!("zero-width literal `{text}`"),
                            span,
                        });
                    }
                    if value & !mask(width) != 0 {
                        log::warn!("literal `{text}` truncated to {width} bits");
                    }
                    Self {
                        value: value & mask(width),
                        width,
                        sized: true,
                        signed: false,
                        base,
                        fill: None,
                        text: text.to_string(),
                    }
                };
                lit.signed = signed;
                Ok(lit)
            }
        }
    }

    fn bare(value: u64, base: Radix, text: &str) -> Self {
        Self {
            value,
            width: bit_length(value),
            sized: false,
            signed: false,
            base,
            fill: None,
            text: text.to_string(),
        }
    }

    /// The literal at its own width.
    pub fn to_const(&self) -> Const {
        Const {
            value: self.value,
            width: self.width,
            signed: self.signed,
            base: Some(self.base),
            raw: Some(self.text.clone()),
        }
    }

    /// The literal placed in a `width`-bit context.
    ///
    /// Sized literals only fit their own width. Unsized ones fit any width
    /// that holds their value; fill literals fit every width.
    pub fn fit(&self, width: u32) -> Option<Const> {
        if width == 0 || width > MAX_WIDTH {
            return None;
        }
        if let Some(one) = self.fill {
            let c = if one { Const::ones(width) } else { Const::zeros(width) };
            return Some(c.with_raw(self.text.clone()));
        }
        if self.sized {
            return (width == self.width).then(|| self.to_const());
        }
        self.to_const().resized(width)
    }
}

/// Value of based digits; `None` on overflow. Unknown digits read as 0.
fn digits_value(digits: &str, base: Radix) -> Option<u64> {
    if base == Radix::Decimal {
        if digits.chars().all(is_unknown_digit) {
            return Some(0);
        }
        return digits.parse().ok();
    }
    let (radix, bits) = match base {
        Radix::Binary => (2, 1),
        Radix::Octal => (8, 3),
        _ => (16, 4),
    };
    let mut value: u64 = 0;
    for c in digits.chars() {
        let d = if is_unknown_digit(c) {
            0
        } else {
            u64::from(c.to_digit(radix)?)
        };
        if value >> (64 - bits) != 0 {
            return None;
        }
        value = (value << bits) | d;
    }
    Some(value)
}
