//! State threaded through the lowering of one module.

use crate::error::{LowerError, LowerResult, W200};
use crate::LowerOptions;
use logictree_common::{Ident, Interner};
use logictree_diagnostics::{Diagnostic, DiagnosticSink};
use logictree_ir::{CaseFallback, Overlay, Var};
use logictree_source::{SourceDb, Span};
use std::collections::{BTreeMap, BTreeSet};

/// Declarations, options and side tables for the module being lowered.
///
/// One context is created per module; nothing carries over between modules.
pub struct LoweringCtx<'a> {
    /// Every declared signal by name.
    pub signal_map: BTreeMap<String, Var>,
    /// Declared `[msb:lsb]` of vector signals.
    pub vector_widths: BTreeMap<String, (i64, i64)>,
    /// Output port names.
    pub output_signals: BTreeSet<String>,
    /// Undeclared names are errors instead of implicit nets.
    pub strict_identifiers: bool,
    /// `x`/`z` literal digits are errors instead of zeros.
    pub strict_literals: bool,
    /// Value of a signal no arm assigns.
    pub case_fallback: CaseFallback,
    /// Labels and source text of the nodes the module keeps.
    pub overlay: Overlay,
    declared_at: BTreeMap<String, Span>,
    implicit: BTreeSet<String>,
    interner: &'a Interner,
    source_db: &'a SourceDb,
    sink: &'a DiagnosticSink,
}

impl<'a> LoweringCtx<'a> {
    /// Creates an empty context.
    pub fn new(
        options: &LowerOptions,
        interner: &'a Interner,
        source_db: &'a SourceDb,
        sink: &'a DiagnosticSink,
    ) -> Self {
        Self {
            signal_map: BTreeMap::new(),
            vector_widths: BTreeMap::new(),
            output_signals: BTreeSet::new(),
            strict_identifiers: options.strict_identifiers,
            strict_literals: options.strict_literals,
            case_fallback: options.case_fallback,
            overlay: Overlay::new(),
            declared_at: BTreeMap::new(),
            implicit: BTreeSet::new(),
            interner,
            source_db,
            sink,
        }
    }

    /// Name of an interned identifier.
    pub fn name(&self, ident: Ident) -> &'a str {
        self.interner.resolve(ident)
    }

    /// Source text under `span`.
    pub fn text(&self, span: Span) -> &'a str {
        self.source_db.snippet(span)
    }

    /// Reports a warning to the sink and the log.
    pub fn warn(&self, diag: Diagnostic) {
        log::warn!("{}", diag.message);
        self.sink.emit(diag);
    }

    /// Records a declaration of `var`, with its range when it has one.
    pub fn declare(&mut self, var: Var, range: Option<(i64, i64)>, span: Span) -> LowerResult<()> {
        if let Some(previous) = self.declared_at.get(&var.name) {
            return Err(LowerError::Redeclared {
                name: var.name,
                span,
                previous: *previous,
            });
        }
        log::trace!("declare `{}` ({} bits)", var.name, var.width);
        self.declared_at.insert(var.name.clone(), span);
        if let Some(range) = range {
            self.vector_widths.insert(var.name.clone(), range);
        }
        self.signal_map.insert(var.name.clone(), var);
        Ok(())
    }

    /// Where `name` was declared.
    pub fn declaration(&self, name: &str) -> Option<Span> {
        self.declared_at.get(name).copied()
    }

    /// The variable a name refers to.
    ///
    /// An undeclared name is an implicit 1-bit net, reported once, or an
    /// error under `strict_identifiers`.
    pub fn lookup(&mut self, name: &str, span: Span) -> LowerResult<Var> {
        if let Some(var) = self.signal_map.get(name) {
            return Ok(var.clone());
        }
        if self.strict_identifiers {
            return Err(LowerError::UnknownIdentifier {
                name: name.to_string(),
                span,
            });
        }
        if self.implicit.insert(name.to_string()) {
            self.warn(Diagnostic::warning(
                W200,
                format!("`{name}` is not declared; treating it as a 1-bit net"),
                span,
            ));
        }
        Ok(Var::scalar(name))
    }

    /// Low bound of the declared range of `name`; 0 for scalars.
    pub fn low_bound(&self, name: &str) -> i64 {
        self.vector_widths
            .get(name)
            .map_or(0, |(msb, lsb)| (*msb).min(*lsb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_source::FileId;

    fn with_ctx(options: LowerOptions, f: impl FnOnce(&mut LoweringCtx<'_>, &DiagnosticSink)) {
        let interner = Interner::new();
        let db = SourceDb::new();
        let sink = DiagnosticSink::new();
        let mut ctx = LoweringCtx::new(&options, &interner, &db, &sink);
        f(&mut ctx, &sink);
    }

    #[test]
    fn redeclaration_is_an_error() {
        with_ctx(LowerOptions::default(), |ctx, _| {
            let file = FileId::from_raw(0);
            ctx.declare(Var::scalar("a"), None, Span::new(file, 0, 1)).unwrap();
            let err = ctx
                .declare(Var::scalar("a"), None, Span::new(file, 9, 10))
                .unwrap_err();
            assert!(matches!(err, LowerError::Redeclared { previous, .. } if previous.start == 0));
        });
    }

    #[test]
    fn implicit_nets_warn_once() {
        with_ctx(LowerOptions::default(), |ctx, sink| {
            assert_eq!(ctx.lookup("n", Span::DUMMY).unwrap().width, 1);
            assert_eq!(ctx.lookup("n", Span::DUMMY).unwrap().width, 1);
            let diags = sink.diagnostics();
            assert_eq!(diags.len(), 1);
            assert_eq!(diags[0].code, W200);
            assert!(!sink.has_errors());
        });
    }

    #[test]
    fn strict_identifiers_reject_implicit_nets() {
        let options = LowerOptions {
            strict_identifiers: true,
            ..LowerOptions::default()
        };
        with_ctx(options, |ctx, _| {
            let err = ctx.lookup("n", Span::DUMMY).unwrap_err();
            assert!(matches!(err, LowerError::UnknownIdentifier { ref name, .. } if name == "n"));
        });
    }

    #[test]
    fn low_bound_follows_the_declaration() {
        with_ctx(LowerOptions::default(), |ctx, _| {
            let v = Var::new("v", 4).unwrap();
            ctx.declare(v, Some((3, 6)), Span::DUMMY).unwrap();
            assert_eq!(ctx.low_bound("v"), 3);
            assert_eq!(ctx.low_bound("s"), 0);
        });
    }
}
