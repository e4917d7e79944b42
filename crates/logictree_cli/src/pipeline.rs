//! Shared steps of every command: configuration, logging, reading and
//! lowering the input file, and diagnostic rendering.

use std::path::{Path, PathBuf};

use logictree_config::{LogLevel, LogictreeConfig};
use logictree_diagnostics::{Diagnostic, DiagnosticRenderer, Severity, TerminalRenderer};
use logictree_ir::{Assign, ExprRef, Module};
use logictree_lower::{lower_parsed, LowerError, LowerOptions};
use logictree_sv_parser::ParsedSource;
use logictree_transform::{resolve_module, Pipeline, RewriteResult};

use crate::GlobalArgs;

/// The configuration for `input`: `--config` when given, else the
/// `logictree.toml` next to `input`, else defaults.
pub fn resolve_config(
    input: &Path,
    global: &GlobalArgs,
) -> Result<LogictreeConfig, logictree_config::ConfigError> {
    match config_path(input, global) {
        Some(path) => logictree_config::load_config(&path),
        None => Ok(LogictreeConfig::default()),
    }
}

fn config_path(input: &Path, global: &GlobalArgs) -> Option<PathBuf> {
    global
        .config
        .clone()
        .or_else(|| logictree_config::find_config(input))
}

/// Level set on the command line: `--log-level`, then `--verbose`, then
/// `--quiet`.
pub fn explicit_level(global: &GlobalArgs) -> Option<LogLevel> {
    if let Some(level) = global.log_level {
        Some(level)
    } else if global.verbose {
        Some(LogLevel::Debug)
    } else if global.quiet {
        Some(LogLevel::Error)
    } else {
        None
    }
}

/// Installs the `env_logger` backend.
///
/// The level comes from the command line, then `RUST_LOG`, then the
/// configuration file.
pub fn init_logging(global: &GlobalArgs, configured: LogLevel) {
    let mut builder = env_logger::Builder::new();
    builder.format_timestamp(None).format_target(false);
    match (explicit_level(global), std::env::var("RUST_LOG")) {
        (Some(level), _) => {
            builder.filter_level(level.filter());
        }
        (None, Ok(spec)) => {
            builder.parse_filters(&spec);
        }
        (None, Err(_)) => {
            builder.filter_level(configured.filter());
        }
    }
    let _ = builder.try_init();
}

/// Reads and parses an HDL file.
pub fn read_source(path: &Path) -> Result<ParsedSource, std::io::Error> {
    let text = std::fs::read_to_string(path)?;
    log::info!("parsing {}", path.display());
    Ok(logictree_sv_parser::parse_named(
        &path.display().to_string(),
        &text,
    ))
}

/// Prints diagnostics to stderr. Warnings are dropped under `--quiet`.
pub fn render(parsed: &ParsedSource, diagnostics: &[Diagnostic], global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for diag in diagnostics {
        if global.quiet && diag.severity != Severity::Error {
            continue;
        }
        eprintln!("{}", renderer.render(diag, &parsed.source_db));
    }
}

/// Reads, parses and lowers `path`.
///
/// Returns `Ok(None)` after reporting when parsing or lowering fails; I/O
/// failures are errors.
pub fn load_modules(
    path: &Path,
    global: &GlobalArgs,
    config: &LogictreeConfig,
) -> Result<Option<Vec<Module>>, std::io::Error> {
    let parsed = read_source(path)?;
    let result = lower_parsed(&parsed, &LowerOptions::from(&config.lowering));
    render(&parsed, &parsed.sink.diagnostics(), global);
    match result {
        Ok(modules) => {
            if modules.is_empty() && !global.quiet {
                eprintln!("warning: no modules in {}", path.display());
            }
            Ok(Some(modules))
        }
        Err(LowerError::Parse { count }) => {
            eprintln!("error: aborting due to {count} syntax error(s)");
            Ok(None)
        }
        Err(err) => {
            render(&parsed, &[err.to_diagnostic()], global);
            Ok(None)
        }
    }
}

/// One output prepared for hashing or display.
pub struct Output {
    /// `module.signal`, or just the signal for single-module files.
    pub name: String,
    /// Right-hand side with intermediate signals inlined and the configured
    /// passes applied.
    pub expr: ExprRef,
    /// Declared input ports of the module.
    pub decl_inputs: Vec<String>,
}

/// The selected outputs of every module, resolved against the module's
/// other assignments and run through the `[transform]` passes.
pub fn prepare_outputs(
    modules: &[Module],
    names: &[String],
    config: &LogictreeConfig,
) -> RewriteResult<Vec<Output>> {
    let pipeline = Pipeline::from_config(&config.transform);
    log::debug!("output passes: [{}]", pipeline.names().join(", "));
    let mut outputs = Vec::new();
    for module in modules {
        let resolved = resolve_module(module)?;
        for (signal, _) in selected(module, names) {
            let Some(assign) = resolved.get(signal) else {
                continue;
            };
            outputs.push(Output {
                name: qualified(modules, module, signal),
                expr: pipeline.run(assign.rhs())?,
                decl_inputs: module.declared_inputs(),
            });
        }
    }
    Ok(outputs)
}

/// The selected assignments of `module`, as lowered.
pub fn selected<'m>(module: &'m Module, names: &[String]) -> Vec<(&'m str, &'m Assign)> {
    let picked = module.selected_outputs(names);
    for name in names {
        if !picked.iter().any(|(k, _)| *k == name.as_str()) {
            log::warn!("module `{}` has no output `{name}`", module.name);
        }
    }
    picked
}

fn qualified(modules: &[Module], module: &Module, signal: &str) -> String {
    if modules.len() == 1 {
        signal.to_string()
    } else {
        format!("{}.{signal}", module.name)
    }
}
