//! Configuration types deserialized from `logictree.toml`.

use serde::Deserialize;

pub use logictree_ir::CaseFallback;

/// The whole settings file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogictreeConfig {
    /// HDL lowering behaviour.
    pub lowering: LoweringConfig,
    /// Rewrites applied before hashing and export.
    pub transform: TransformConfig,
    /// BDD hashing.
    pub hash: HashConfig,
    /// Logging and golden-file output.
    pub output: OutputConfig,
}

/// `[lowering]`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoweringConfig {
    /// Reject assignments to undeclared names instead of inventing 1-bit signals.
    pub strict_identifiers: bool,
    /// Reject `x`/`z`/`?` literal digits instead of reading them as 0.
    pub strict_literals: bool,
    /// Value of a signal that no arm of an `if` or `case` assigns.
    pub case_fallback: CaseFallback,
}

/// How `case` statements are rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Nested `if`/`else` statements.
    #[default]
    If,
    /// A sum-of-products expression.
    Mux,
}

/// `[transform]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Shape produced by `case_to_if`.
    pub case_mode: CaseMode,
    /// Run the algebraic simplifier.
    pub simplify: bool,
    /// Decompose into AND/OR/NOT before simplifying.
    pub primitives: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            case_mode: CaseMode::If,
            simplify: true,
            primitives: false,
        }
    }
}

/// `[hash]`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashConfig {
    /// Explicit BDD variable order. Empty means sorted names.
    pub order: Vec<String>,
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Logging disabled.
    Off,
    /// Errors only.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Progress messages.
    Info,
    /// Pass-level detail.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// The matching `log` filter.
    pub fn filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Level used when neither the command line nor `RUST_LOG` sets one.
    pub log_level: LogLevel,
    /// Directory for `hash --save-golden`.
    pub golden_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            golden_dir: "golden_hashes".to_string(),
        }
    }
}
