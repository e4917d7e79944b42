//! User-facing diagnostics for the parser and lowerer.
//!
//! Problems in HDL input are reported as [`Diagnostic`] values carrying a
//! stable [`DiagnosticCode`] (`E100` lexical, `E101` syntax, `E2xx`
//! lowering). Passes push them into a [`DiagnosticSink`]; the CLI drains the
//! sink and prints each entry with [`TerminalRenderer`].

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod sink;

pub use code::{Category, DiagnosticCode, Severity};
pub use diagnostic::{Diagnostic, Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use sink::DiagnosticSink;
