//! Conformance test helpers for logictree.
//!
//! Runs HDL source text through parse → lower → transform → hash and
//! returns structured results for assertion in integration tests.

#![warn(missing_docs)]

use logictree_config::LogictreeConfig;
use logictree_diagnostics::{Diagnostic, Severity};
use logictree_ir::{Env, ExprRef, Module, Var};
use logictree_lower::{lower_parsed, LowerError, LowerOptions};
use logictree_transform::{resolve_module, Pipeline};
use std::collections::BTreeSet;

/// Result of parsing and lowering one source text.
pub struct PipelineResult {
    /// Lowered modules, or the error that stopped lowering.
    pub modules: Result<Vec<Module>, LowerError>,
    /// Diagnostics from parsing and lowering, the lowering error included.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of error-severity diagnostics.
    pub error_count: usize,
    /// Number of warning-severity diagnostics.
    pub warning_count: usize,
}

impl PipelineResult {
    /// The only module; panics otherwise.
    pub fn single(self) -> Module {
        let mut modules = self.modules.unwrap_or_else(|e| panic!("lowering failed: {e}"));
        assert_eq!(modules.len(), 1, "expected exactly one module");
        modules.remove(0)
    }

    /// Diagnostic codes in emission order, e.g. `["W200", "E204"]`.
    pub fn codes(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.code.to_string()).collect()
    }
}

/// Builds a `LogictreeConfig` from TOML text.
pub fn make_config(toml_text: &str) -> LogictreeConfig {
    logictree_config::load_config_from_str(toml_text).unwrap()
}

/// Parses and lowers `source` with the `[lowering]` settings of `config`.
pub fn run_pipeline(source: &str, config: &LogictreeConfig) -> PipelineResult {
    let parsed = logictree_sv_parser::parse_named("conformance.sv", source);
    let modules = lower_parsed(&parsed, &LowerOptions::from(&config.lowering));
    let mut diagnostics = parsed.sink.diagnostics();
    if let Err(e) = &modules {
        if !matches!(e, LowerError::Parse { .. }) {
            diagnostics.push(e.to_diagnostic());
        }
    }
    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    PipelineResult {
        modules,
        diagnostics,
        error_count,
        warning_count,
    }
}

/// [`run_pipeline`] with the default configuration.
pub fn full_pipeline(source: &str) -> PipelineResult {
    run_pipeline(source, &LogictreeConfig::default())
}

/// Lowers a single-module source with default settings.
pub fn lower_one(source: &str) -> Module {
    full_pipeline(source).single()
}

/// The hash-ready expression of `output`: intermediate signals inlined and
/// the `[transform]` passes of `config` applied.
pub fn prepared_output(module: &Module, output: &str, config: &LogictreeConfig) -> ExprRef {
    let resolved = resolve_module(module).unwrap();
    let assign = resolved
        .get(output)
        .unwrap_or_else(|| panic!("no assignment to `{output}`"));
    Pipeline::from_config(&config.transform)
        .run(assign.rhs())
        .unwrap()
}

/// Names of a variable set.
pub fn names<'a>(vars: impl IntoIterator<Item = &'a Var>) -> BTreeSet<String> {
    vars.into_iter().map(|v| v.name.clone()).collect()
}

/// Every assignment of the given `(name, width)` inputs, first name most
/// significant.
pub fn input_space(inputs: &[(&str, u32)]) -> Vec<Env> {
    let total: u32 = inputs.iter().map(|(_, w)| w).sum();
    (0..1u64 << total)
        .map(|mut bits| {
            let mut env = Env::new();
            for (name, width) in inputs.iter().rev() {
                env.insert(name.to_string(), bits & ((1 << width) - 1));
                bits >>= width;
            }
            env
        })
        .collect()
}
