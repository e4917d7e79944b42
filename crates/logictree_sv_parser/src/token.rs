//! Token types for the HDL subset lexer.
//!
//! Covers the keywords, operators and literal forms of combinational
//! SystemVerilog that the lowerer understands, plus the handful of
//! arithmetic and relational operators that are lexed only so the parser
//! can name them when rejecting them.

use logictree_source::Span;
use serde::{Deserialize, Serialize};

/// A token kind.
///
/// Keywords are case-sensitive. Literal text is not stored in the token; it
/// is read back from the source through the token's span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SvToken {
    // === Keywords ===
    /// `always`
    Always,
    /// `always_comb`
    AlwaysComb,
    /// `always_ff`
    AlwaysFf,
    /// `always_latch`
    AlwaysLatch,
    /// `assign`
    Assign,
    /// `begin`
    Begin,
    /// `case`
    Case,
    /// `casex`
    Casex,
    /// `casez`
    Casez,
    /// `default`
    Default,
    /// `else`
    Else,
    /// `end`
    End,
    /// `endcase`
    Endcase,
    /// `endmodule`
    Endmodule,
    /// `if`
    If,
    /// `inout`
    Inout,
    /// `input`
    Input,
    /// `logic`
    Logic,
    /// `module`
    Module,
    /// `negedge`
    Negedge,
    /// `or` (sensitivity-list separator)
    Or,
    /// `output`
    Output,
    /// `posedge`
    Posedge,
    /// `reg`
    Reg,
    /// `signed`
    Signed,
    /// `wire`
    Wire,

    // === Literals ===
    /// Bare decimal, e.g. `42`.
    IntLiteral,
    /// Sized or unsized based literal, e.g. `4'b1010`, `8'shFF`, `'b1`.
    SizedLiteral,
    /// Fill literal: `'0`, `'1`, `'x`, `'z`.
    FillLiteral,

    // === Punctuation ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `@`
    At,
    /// `*`
    Star,
    /// `?`
    Question,

    // === Operators ===
    /// `=`
    Equals,
    /// `==`
    DoubleEquals,
    /// `!=`
    BangEquals,
    /// `<=` (non-blocking assignment)
    LessEquals,
    /// `&`
    Ampersand,
    /// `&&`
    DoubleAmpersand,
    /// `|`
    Pipe,
    /// `||`
    DoublePipe,
    /// `^`
    Caret,
    /// `~^` or `^~`
    TildeCaret,
    /// `~`
    Tilde,
    /// `~&`
    TildeAmpersand,
    /// `~|`
    TildePipe,
    /// `!`
    Bang,

    // === Recognized but unsupported ===
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEquals,
    /// `<<`
    DoubleLess,
    /// `>>`
    DoubleGreater,
    /// `/`
    Slash,
    /// `%`
    Percent,

    // === Special ===
    /// Identifier.
    Identifier,
    /// End of input.
    Eof,
    /// Lexing error; already reported.
    Error,
}

impl SvToken {
    /// `input`, `output` or `inout`.
    pub fn is_direction(self) -> bool {
        matches!(self, SvToken::Input | SvToken::Output | SvToken::Inout)
    }

    /// `wire`, `logic` or `reg`.
    pub fn is_net_type(self) -> bool {
        matches!(self, SvToken::Wire | SvToken::Logic | SvToken::Reg)
    }

    /// Any `always*` keyword.
    pub fn is_always_variant(self) -> bool {
        matches!(
            self,
            SvToken::Always | SvToken::AlwaysComb | SvToken::AlwaysFf | SvToken::AlwaysLatch
        )
    }

    /// Operators the lexer knows but the subset has no meaning for.
    pub fn is_unsupported_operator(self) -> bool {
        matches!(
            self,
            SvToken::Plus
                | SvToken::Minus
                | SvToken::LessThan
                | SvToken::GreaterThan
                | SvToken::GreaterEquals
                | SvToken::DoubleLess
                | SvToken::DoubleGreater
                | SvToken::Slash
                | SvToken::Percent
        )
    }

    /// Human-readable name used in "expected X, found Y" messages.
    pub fn describe(self) -> &'static str {
        match self {
            SvToken::Always => "`always`",
            SvToken::AlwaysComb => "`always_comb`",
            SvToken::AlwaysFf => "`always_ff`",
            SvToken::AlwaysLatch => "`always_latch`",
            SvToken::Assign => "`assign`",
            SvToken::Begin => "`begin`",
            SvToken::Case => "`case`",
            SvToken::Casex => "`casex`",
            SvToken::Casez => "`casez`",
            SvToken::Default => "`default`",
            SvToken::Else => "`else`",
            SvToken::End => "`end`",
            SvToken::Endcase => "`endcase`",
            SvToken::Endmodule => "`endmodule`",
            SvToken::If => "`if`",
            SvToken::Inout => "`inout`",
            SvToken::Input => "`input`",
            SvToken::Logic => "`logic`",
            SvToken::Module => "`module`",
            SvToken::Negedge => "`negedge`",
            SvToken::Or => "`or`",
            SvToken::Output => "`output`",
            SvToken::Posedge => "`posedge`",
            SvToken::Reg => "`reg`",
            SvToken::Signed => "`signed`",
            SvToken::Wire => "`wire`",
            SvToken::IntLiteral => "integer literal",
            SvToken::SizedLiteral => "based literal",
            SvToken::FillLiteral => "fill literal",
            SvToken::LeftParen => "`(`",
            SvToken::RightParen => "`)`",
            SvToken::LeftBracket => "`[`",
            SvToken::RightBracket => "`]`",
            SvToken::LeftBrace => "`{`",
            SvToken::RightBrace => "`}`",
            SvToken::Comma => "`,`",
            SvToken::Semicolon => "`;`",
            SvToken::Colon => "`:`",
            SvToken::At => "`@`",
            SvToken::Star => "`*`",
            SvToken::Question => "`?`",
            SvToken::Equals => "`=`",
            SvToken::DoubleEquals => "`==`",
            SvToken::BangEquals => "`!=`",
            SvToken::LessEquals => "`<=`",
            SvToken::Ampersand => "`&`",
            SvToken::DoubleAmpersand => "`&&`",
            SvToken::Pipe => "`|`",
            SvToken::DoublePipe => "`||`",
            SvToken::Caret => "`^`",
            SvToken::TildeCaret => "`~^`",
            SvToken::Tilde => "`~`",
            SvToken::TildeAmpersand => "`~&`",
            SvToken::TildePipe => "`~|`",
            SvToken::Bang => "`!`",
            SvToken::Plus => "`+`",
            SvToken::Minus => "`-`",
            SvToken::LessThan => "`<`",
            SvToken::GreaterThan => "`>`",
            SvToken::GreaterEquals => "`>=`",
            SvToken::DoubleLess => "`<<`",
            SvToken::DoubleGreater => "`>>`",
            SvToken::Slash => "`/`",
            SvToken::Percent => "`%`",
            SvToken::Identifier => "identifier",
            SvToken::Eof => "end of file",
            SvToken::Error => "invalid token",
        }
    }
}

/// A token with its source location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Kind of token.
    pub kind: SvToken,
    /// Location in the source.
    pub span: Span,
}

/// Maps an identifier to its keyword token, if it is one.
pub fn lookup_keyword(s: &str) -> Option<SvToken> {
    match s {
        "always" => Some(SvToken::Always),
        "always_comb" => Some(SvToken::AlwaysComb),
        "always_ff" => Some(SvToken::AlwaysFf),
        "always_latch" => Some(SvToken::AlwaysLatch),
        "assign" => Some(SvToken::Assign),
        "begin" => Some(SvToken::Begin),
        "case" => Some(SvToken::Case),
        "casex" => Some(SvToken::Casex),
        "casez" => Some(SvToken::Casez),
        "default" => Some(SvToken::Default),
        "else" => Some(SvToken::Else),
        "end" => Some(SvToken::End),
        "endcase" => Some(SvToken::Endcase),
        "endmodule" => Some(SvToken::Endmodule),
        "if" => Some(SvToken::If),
        "inout" => Some(SvToken::Inout),
        "input" => Some(SvToken::Input),
        "logic" => Some(SvToken::Logic),
        "module" => Some(SvToken::Module),
        "negedge" => Some(SvToken::Negedge),
        "or" => Some(SvToken::Or),
        "output" => Some(SvToken::Output),
        "posedge" => Some(SvToken::Posedge),
        "reg" => Some(SvToken::Reg),
        "signed" => Some(SvToken::Signed),
        "wire" => Some(SvToken::Wire),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(lookup_keyword("always_comb"), Some(SvToken::AlwaysComb));
        assert_eq!(lookup_keyword("Module"), None);
        assert_eq!(lookup_keyword("y"), None);
    }

    #[test]
    fn predicates() {
        assert!(SvToken::Inout.is_direction());
        assert!(!SvToken::Wire.is_direction());
        assert!(SvToken::Reg.is_net_type());
        assert!(SvToken::AlwaysFf.is_always_variant());
        assert!(!SvToken::Assign.is_always_variant());
        assert!(SvToken::Plus.is_unsupported_operator());
        assert!(!SvToken::Caret.is_unsupported_operator());
    }

    #[test]
    fn describe_quotes_punctuation() {
        assert_eq!(SvToken::Semicolon.describe(), "`;`");
        assert_eq!(SvToken::Eof.describe(), "end of file");
    }
}
