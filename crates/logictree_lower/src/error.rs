//! Lowering errors and their diagnostic codes.
//!
//! Codes `E200`--`E209` cover lowering failures. `W200` marks an undeclared
//! name that was read as an implicit 1-bit net; `W201` marks a comparison
//! against a constant that cannot match.

use logictree_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use logictree_ir::IrError;
use logictree_source::Span;

/// Construct outside the supported subset.
pub const E200: DiagnosticCode = DiagnosticCode::new(Category::Error, 200);
/// Undeclared name under `strict_identifiers`.
pub const E201: DiagnosticCode = DiagnosticCode::new(Category::Error, 201);
/// Select bound that is not a constant.
pub const E202: DiagnosticCode = DiagnosticCode::new(Category::Error, 202);
/// Select bound outside the declared range.
pub const E203: DiagnosticCode = DiagnosticCode::new(Category::Error, 203);
/// Operand widths that do not agree.
pub const E204: DiagnosticCode = DiagnosticCode::new(Category::Error, 204);
/// Second `default` item in a `case`.
pub const E205: DiagnosticCode = DiagnosticCode::new(Category::Error, 205);
/// `x`/`z` literal digits under `strict_literals`.
pub const E206: DiagnosticCode = DiagnosticCode::new(Category::Error, 206);
/// Literal wider than 64 bits.
pub const E207: DiagnosticCode = DiagnosticCode::new(Category::Error, 207);
/// Name declared twice.
pub const E208: DiagnosticCode = DiagnosticCode::new(Category::Error, 208);
/// Signal driven from two places.
pub const E209: DiagnosticCode = DiagnosticCode::new(Category::Error, 209);

/// Undeclared name read as an implicit 1-bit net.
pub const W200: DiagnosticCode = DiagnosticCode::new(Category::Warning, 200);
/// Equality against a constant that does not fit the other operand.
pub const W201: DiagnosticCode = DiagnosticCode::new(Category::Warning, 201);

/// Result alias for lowering.
pub type LowerResult<T> = Result<T, LowerError>;

/// Why a module could not be lowered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LowerError {
    /// Construct outside the supported subset.
    #[error("unsupported construct: {what}")]
    Unsupported {
        /// What was found.
        what: String,
        /// Where.
        span: Span,
    },
    /// Undeclared name with `strict_identifiers` set.
    #[error("unknown identifier `{name}`")]
    UnknownIdentifier {
        /// The name.
        name: String,
        /// Where it was used.
        span: Span,
    },
    /// Select whose bounds are not constants.
    #[error("select on `{signal}` must have constant bounds")]
    NonConstantSelect {
        /// Selected signal.
        signal: String,
        /// The select.
        span: Span,
    },
    /// Select outside the declared range.
    #[error("select {select} is outside the range of `{signal}`")]
    SelectOutOfRange {
        /// Selected signal.
        signal: String,
        /// The select as written, e.g. `[8]`.
        select: String,
        /// The select.
        span: Span,
    },
    /// Operands or assignment sides of different widths.
    #[error("width mismatch: {detail}")]
    WidthMismatch {
        /// Both widths, in words.
        detail: String,
        /// The offending expression or assignment.
        span: Span,
    },
    /// More than one `default` item.
    #[error("case statement has more than one default item")]
    IllegalDefault {
        /// The second default.
        span: Span,
    },
    /// `x`/`z`/`?` digits with `strict_literals` set.
    #[error("literal `{text}` contains x/z digits")]
    UnknownBits {
        /// Literal text.
        text: String,
        /// Where.
        span: Span,
    },
    /// Literal wider than 64 bits.
    #[error("literal `{text}` is wider than 64 bits")]
    LiteralTooWide {
        /// Literal text.
        text: String,
        /// Where.
        span: Span,
    },
    /// Name declared twice in one module.
    #[error("`{name}` is already declared")]
    Redeclared {
        /// The name.
        name: String,
        /// The second declaration.
        span: Span,
        /// The first declaration.
        previous: Span,
    },
    /// Signal driven by two assignments or blocks.
    #[error("`{name}` is driven more than once")]
    MultipleDrivers {
        /// The driven target.
        name: String,
        /// The second driver.
        span: Span,
        /// The first driver.
        previous: Span,
    },
    /// The source did not parse; the parser's diagnostics say why.
    #[error("{count} syntax error(s)")]
    Parse {
        /// Number of parse errors.
        count: usize,
    },
    /// An IR constructor rejected a node.
    #[error(transparent)]
    Ir(#[from] IrError),
}

impl LowerError {
    /// Primary source location, when the error has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            LowerError::Unsupported { span, .. }
            | LowerError::UnknownIdentifier { span, .. }
            | LowerError::NonConstantSelect { span, .. }
            | LowerError::SelectOutOfRange { span, .. }
            | LowerError::WidthMismatch { span, .. }
            | LowerError::IllegalDefault { span }
            | LowerError::UnknownBits { span, .. }
            | LowerError::LiteralTooWide { span, .. }
            | LowerError::Redeclared { span, .. }
            | LowerError::MultipleDrivers { span, .. } => Some(*span),
            LowerError::Parse { .. } | LowerError::Ir(_) => None,
        }
    }

    /// Diagnostic code of the error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            LowerError::Unsupported { .. } | LowerError::Parse { .. } | LowerError::Ir(_) => E200,
            LowerError::UnknownIdentifier { .. } => E201,
            LowerError::NonConstantSelect { .. } => E202,
            LowerError::SelectOutOfRange { .. } => E203,
            LowerError::WidthMismatch { .. } => E204,
            LowerError::IllegalDefault { .. } => E205,
            LowerError::UnknownBits { .. } => E206,
            LowerError::LiteralTooWide { .. } => E207,
            LowerError::Redeclared { .. } => E208,
            LowerError::MultipleDrivers { .. } => E209,
        }
    }

    /// Renders the error as a diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let span = self.span().unwrap_or(Span::DUMMY);
        let diag = Diagnostic::error(self.code(), self.to_string(), span);
        match self {
            LowerError::Redeclared { previous, .. } => {
                diag.with_label(Label::secondary(*previous, "first declared here"))
            }
            LowerError::MultipleDrivers { previous, .. } => {
                diag.with_label(Label::secondary(*previous, "first driven here"))
            }
            LowerError::UnknownIdentifier { .. } => {
                diag.with_help("declare the signal, or disable `strict_identifiers`")
            }
            LowerError::UnknownBits { .. } => {
                diag.with_help("x/z digits read as 0 unless `strict_literals` is set")
            }
            LowerError::Unsupported { .. } => {
                diag.with_note("only combinational logic can be lowered")
            }
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_source::FileId;

    #[test]
    fn codes_follow_the_variant() {
        let span = Span::new(FileId::from_raw(0), 3, 7);
        let err = LowerError::IllegalDefault { span };
        assert_eq!(err.code().to_string(), "E205");
        let diag = err.to_diagnostic();
        assert_eq!(diag.primary_span, span);
        assert_eq!(diag.message, "case statement has more than one default item");
    }

    #[test]
    fn redeclaration_points_at_both_sites() {
        let file = FileId::from_raw(0);
        let err = LowerError::Redeclared {
            name: "y".into(),
            span: Span::new(file, 20, 21),
            previous: Span::new(file, 5, 6),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.labels[0].span, Span::new(file, 5, 6));
    }

    #[test]
    fn parse_failures_have_no_span() {
        let err = LowerError::Parse { count: 2 };
        assert_eq!(err.span(), None);
        assert_eq!(err.to_string(), "2 syntax error(s)");
    }
}
