//! The diagnostic record and its source labels.

use crate::code::{DiagnosticCode, Severity};
use logictree_source::Span;
use serde::{Deserialize, Serialize};

/// Whether a label marks the main location or supporting context.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// Underlined with `^`.
    Primary,
    /// Underlined with `-`.
    Secondary,
}

/// A message attached to a source span.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// Annotated range.
    pub span: Span,
    /// Text printed beside the underline.
    pub message: String,
    /// Primary or secondary.
    pub style: LabelStyle,
}

impl Label {
    /// Label on the main location.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Label on a related location.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

/// One reported problem.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Stable code.
    pub code: DiagnosticCode,
    /// Headline message.
    pub message: String,
    /// Where the problem is.
    pub primary_span: Span,
    /// Extra annotated spans.
    pub labels: Vec<Label>,
    /// `= note:` lines.
    pub notes: Vec<String>,
    /// `= help:` lines.
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            primary_span: span,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// An error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Error, code, message, span)
    }

    /// A warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Warning, code, message, span)
    }

    /// Adds a label.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note line.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn builder_collects_everything() {
        let code = DiagnosticCode::new(Category::Error, 203);
        let d = Diagnostic::error(code, "non-constant bit-select", Span::DUMMY)
            .with_label(Label::primary(Span::DUMMY, "index must be a literal"))
            .with_label(Label::secondary(Span::DUMMY, "base declared here"))
            .with_note("selects are resolved at lowering time")
            .with_help("use a case statement on the index");
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.labels.len(), 2);
        assert_eq!(d.labels[1].style, LabelStyle::Secondary);
        assert_eq!(d.notes.len(), 1);
        assert_eq!(d.help.len(), 1);
    }

    #[test]
    fn warning_severity() {
        let code = DiagnosticCode::new(Category::Warning, 201);
        let d = Diagnostic::warning(code, "implicit net `q`", Span::DUMMY);
        assert_eq!(d.severity, Severity::Warning);
        assert!(d.labels.is_empty());
    }
}
