//! Text rendering of diagnostics.

use crate::diagnostic::{Diagnostic, LabelStyle};
use logictree_source::SourceDb;
use std::fmt::Write;

/// Turns a diagnostic into printable text.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// rustc-style rendering:
///
/// ```text
/// error[E203]: bit-select index must be a constant
///   --> mux.sv:4:16
///   |
/// 4 |     assign y = a[i];
///   |                ^^^^ not a literal
///   = help: ...
/// ```
pub struct TerminalRenderer {
    /// Emit ANSI colors.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();
        let color = if diag.severity.is_error() { "1;31" } else { "1;33" };
        let head = self.paint(&format!("{}[{}]", diag.severity, diag.code), color);
        let _ = writeln!(out, "{head}: {}", diag.message);

        let span = diag.primary_span;
        if let (Some(resolved), Some(file)) = (source_db.resolve_span(span), source_db.file(span.file)) {
            let line_no = resolved.start_line.to_string();
            let gutter = " ".repeat(line_no.len());
            let _ = writeln!(out, "{gutter}--> {resolved}");
            let _ = writeln!(out, "{gutter} |");
            let _ = writeln!(out, "{line_no} | {}", file.line_text(span.start));

            let label = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| format!(" {}", l.message))
                .unwrap_or_default();
            let indent = " ".repeat(resolved.start_col.saturating_sub(1) as usize);
            let carets = "^".repeat(span.len().max(1) as usize);
            let _ = writeln!(out, "{gutter} | {indent}{}{label}", self.paint(&carets, color));
        }

        for note in &diag.notes {
            let _ = writeln!(out, "  = note: {note}");
        }
        for help in &diag.help {
            let _ = writeln!(out, "  = help: {help}");
        }
        out
    }
}
