//! Expression pass trait and runner.
//!
//! Provides the [`ExprPass`] trait, the built-in passes, and [`Pipeline`],
//! which builds the configured pass order from `[transform]` settings.

use crate::error::RewriteResult;
use crate::primitives::to_primitives;
use crate::resolve::resolve_signal_vars;
use crate::simplify::simplify;
use logictree_config::TransformConfig;
use logictree_ir::ExprRef;
use std::collections::BTreeMap;

/// A rewrite from one expression to an equivalent one.
pub trait ExprPass: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the pass.
    fn run(&self, expr: &ExprRef) -> RewriteResult<ExprRef>;
}

/// [`simplify`] as a pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimplifyPass;

impl ExprPass for SimplifyPass {
    fn name(&self) -> &'static str {
        "simplify"
    }

    fn run(&self, expr: &ExprRef) -> RewriteResult<ExprRef> {
        Ok(simplify(expr))
    }
}

/// [`to_primitives`] as a pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrimitivesPass;

impl ExprPass for PrimitivesPass {
    fn name(&self) -> &'static str {
        "primitives"
    }

    fn run(&self, expr: &ExprRef) -> RewriteResult<ExprRef> {
        Ok(to_primitives(expr))
    }
}

/// [`resolve_signal_vars`] against a fixed set of definitions.
#[derive(Clone, Debug, Default)]
pub struct ResolvePass {
    signals: BTreeMap<String, ExprRef>,
}

impl ResolvePass {
    /// A pass that inlines `signals`.
    pub fn new(signals: BTreeMap<String, ExprRef>) -> Self {
        Self { signals }
    }
}

impl ExprPass for ResolvePass {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn run(&self, expr: &ExprRef) -> RewriteResult<ExprRef> {
        resolve_signal_vars(expr, &self.signals)
    }
}

/// Runs `passes` in order, feeding each the previous result.
pub fn run_passes(expr: &ExprRef, passes: &[&dyn ExprPass]) -> RewriteResult<ExprRef> {
    let mut current = expr.clone();
    for pass in passes {
        let next = pass.run(&current)?;
        log::debug!("pass {}: {} -> {}", pass.name(), current, next);
        current = next;
    }
    Ok(current)
}

/// An owned, ordered list of passes.
#[derive(Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn ExprPass>>,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives first (when enabled), then simplify (when enabled).
    pub fn from_config(config: &TransformConfig) -> Self {
        let mut pipeline = Self::new();
        if config.primitives {
            pipeline = pipeline.with(PrimitivesPass);
        }
        if config.simplify {
            pipeline = pipeline.with(SimplifyPass);
        }
        pipeline
    }

    /// Appends a pass.
    pub fn with(mut self, pass: impl ExprPass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Puts a pass in front of the others.
    pub fn prepend(mut self, pass: impl ExprPass + 'static) -> Self {
        self.passes.insert(0, Box::new(pass));
        self
    }

    /// Pass names in run order.
    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Runs every pass in order.
    pub fn run(&self, expr: &ExprRef) -> RewriteResult<ExprRef> {
        let passes: Vec<&dyn ExprPass> = self.passes.iter().map(|p| p.as_ref()).collect();
        run_passes(expr, &passes)
    }
}
