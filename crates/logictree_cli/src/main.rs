//! logictree CLI: analysis, hashing and export of combinational HDL.
//!
//! Every subcommand reads one HDL file, lowers each module it declares and
//! works on the lowered outputs. Settings come from `logictree.toml` next
//! to the input file, or from `--config`.

#![warn(missing_docs)]

mod analyze;
mod export;
mod hash;
mod pipeline;
mod rewrite;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use logictree_config::{CaseMode, LogLevel};

/// logictree: logic trees and canonical hashes for combinational HDL.
#[derive(Parser, Debug)]
#[command(name = "logictree", version, about = "Logic tree toolkit for combinational HDL")]
pub struct Cli {
    /// Suppress everything but results and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug-level logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `logictree.toml` to use instead of the one next to the input.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level; overrides `RUST_LOG` and the configuration file.
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the tree, Verilog form, depth and gate summary of each output.
    Analyze(FileArgs),
    /// Print the logic hash of each output; optionally save or compare goldens.
    Hash(HashArgs),
    /// Print the canonical BDD expression, variable order and hash.
    Explain(FileArgs),
    /// Print the symbolic expression next to its BDD canonical string.
    BddExpr(FileArgs),
    /// Pretty-print the statement driving each signal.
    Pretty(FileArgs),
    /// Export trees as ASCII, JSON, DOT, PNG or SVG.
    Export(ExportArgs),
    /// Apply structural rewrites and print the result.
    Rewrite(RewriteArgs),
}

impl Command {
    /// The HDL file the command reads.
    pub fn file(&self) -> &Path {
        match self {
            Command::Analyze(a) | Command::Explain(a) | Command::BddExpr(a) | Command::Pretty(a) => {
                &a.file
            }
            Command::Hash(a) => &a.file,
            Command::Export(a) => &a.file,
            Command::Rewrite(a) => &a.file,
        }
    }
}

/// Arguments shared by commands that only need an input file.
#[derive(Parser, Debug)]
pub struct FileArgs {
    /// HDL source file.
    pub file: PathBuf,

    /// Restrict to these outputs (repeatable). Default: every output port.
    #[arg(short, long = "output")]
    pub outputs: Vec<String>,
}

/// Arguments for `logictree hash`.
#[derive(Parser, Debug)]
pub struct HashArgs {
    /// HDL source file.
    pub file: PathBuf,

    /// Restrict to these outputs (repeatable). Default: every output port.
    #[arg(short, long = "output")]
    pub outputs: Vec<String>,

    /// Save a golden record under this name.
    #[arg(long, value_name = "NAME")]
    pub save_golden: Option<String>,

    /// Directory for saved golden records (default from `[output] golden_dir`).
    #[arg(long, value_name = "DIR")]
    pub golden_dir: Option<PathBuf>,

    /// Compare against a stored golden record.
    #[arg(long, value_name = "PATH")]
    pub compare_golden: Option<PathBuf>,
}

/// Arguments for `logictree export`.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// HDL source file.
    pub file: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum)]
    pub format: ExportFormat,

    /// Destination file. Text formats default to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Restrict to these outputs (repeatable). Default: every output port.
    #[arg(short, long = "output")]
    pub outputs: Vec<String>,
}

/// Arguments for `logictree rewrite`.
#[derive(Parser, Debug)]
pub struct RewriteArgs {
    /// HDL source file.
    pub file: PathBuf,

    /// Rewrite `case` statements into `if` chains or mux expressions.
    #[arg(long, value_enum, value_name = "MODE")]
    pub case_to_if: Option<CaseModeArg>,

    /// Collapse full `if`/`else` over one target into a mux.
    #[arg(long)]
    pub if_to_mux: bool,

    /// Decompose every gate into AND/OR/NOT.
    #[arg(long)]
    pub primitives: bool,

    /// Run the algebraic simplifier last.
    #[arg(long)]
    pub simplify: bool,
}

/// Export formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Box-drawing text tree.
    Ascii,
    /// Graphviz DOT text.
    Dot,
    /// PNG rendered with Graphviz `dot`.
    Png,
    /// SVG rendered with Graphviz `dot`.
    Svg,
    /// JSON view tree.
    Json,
}

/// `case` rewrite shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CaseModeArg {
    /// Nested `if`/`else`.
    If,
    /// Sum-of-products expression.
    Mux,
}

impl From<CaseModeArg> for CaseMode {
    fn from(arg: CaseModeArg) -> Self {
        match arg {
            CaseModeArg::If => CaseMode::If,
            CaseModeArg::Mux => CaseMode::Mux,
        }
    }
}

/// Log levels accepted by `--log-level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    /// No logging.
    Off,
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warn,
    /// Progress messages.
    Info,
    /// Pass-level detail.
    Debug,
    /// Everything.
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Off => LogLevel::Off,
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from the terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-result output.
    pub quiet: bool,
    /// Whether to log at debug level.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
    /// Explicit log level.
    pub log_level: Option<LogLevel>,
}

/// Exit code for configuration and I/O failures.
pub const EXIT_IO: i32 = 2;

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config.clone(),
        log_level: cli.log_level.map(LogLevel::from),
    };

    match run(&cli.command, &global) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(EXIT_IO);
        }
    }
}

fn run(command: &Command, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = pipeline::resolve_config(command.file(), global)?;
    pipeline::init_logging(global, config.output.log_level);

    match command {
        Command::Analyze(args) => analyze::run(args, global, &config),
        Command::Hash(args) => hash::run(args, global, &config),
        Command::Explain(args) => hash::explain(args, global, &config),
        Command::BddExpr(args) => hash::bdd_expr(args, global, &config),
        Command::Pretty(args) => rewrite::pretty(args, global, &config),
        Command::Export(args) => export::run(args, global, &config),
        Command::Rewrite(args) => rewrite::run(args, global, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_analyze_default() {
        let cli = Cli::parse_from(["logictree", "analyze", "mux.sv"]);
        match cli.command {
            Command::Analyze(ref args) => {
                assert_eq!(args.file, PathBuf::from("mux.sv"));
                assert!(args.outputs.is_empty());
            }
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn parse_repeated_outputs() {
        let cli = Cli::parse_from(["logictree", "analyze", "m.sv", "--output", "y", "-o", "z"]);
        match cli.command {
            Command::Analyze(ref args) => assert_eq!(args.outputs, vec!["y", "z"]),
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn parse_hash_with_golden_flags() {
        let cli = Cli::parse_from([
            "logictree",
            "hash",
            "mux.sv",
            "--save-golden",
            "mux2",
            "--golden-dir",
            "goldens",
        ]);
        match cli.command {
            Command::Hash(ref args) => {
                assert_eq!(args.save_golden.as_deref(), Some("mux2"));
                assert_eq!(args.golden_dir, Some(PathBuf::from("goldens")));
                assert!(args.compare_golden.is_none());
            }
            _ => panic!("expected Hash command"),
        }
    }

    #[test]
    fn parse_hash_compare() {
        let cli = Cli::parse_from([
            "logictree",
            "hash",
            "mux.sv",
            "--compare-golden",
            "golden_hashes/mux2.json",
        ]);
        match cli.command {
            Command::Hash(ref args) => {
                assert_eq!(
                    args.compare_golden,
                    Some(PathBuf::from("golden_hashes/mux2.json"))
                );
            }
            _ => panic!("expected Hash command"),
        }
    }

    #[test]
    fn parse_bdd_expr_subcommand_name() {
        let cli = Cli::parse_from(["logictree", "bdd-expr", "a.sv"]);
        assert!(matches!(cli.command, Command::BddExpr(_)));
        assert_eq!(cli.command.file(), Path::new("a.sv"));
    }

    #[test]
    fn parse_export_formats() {
        for (text, format) in [
            ("ascii", ExportFormat::Ascii),
            ("dot", ExportFormat::Dot),
            ("png", ExportFormat::Png),
            ("svg", ExportFormat::Svg),
            ("json", ExportFormat::Json),
        ] {
            let cli = Cli::parse_from(["logictree", "export", "a.sv", "--format", text]);
            match cli.command {
                Command::Export(ref args) => assert_eq!(args.format, format),
                _ => panic!("expected Export command"),
            }
        }
    }

    #[test]
    fn export_requires_a_format() {
        assert!(Cli::try_parse_from(["logictree", "export", "a.sv"]).is_err());
    }

    #[test]
    fn parse_rewrite_flags() {
        let cli = Cli::parse_from([
            "logictree",
            "rewrite",
            "a.sv",
            "--case-to-if",
            "mux",
            "--primitives",
            "--simplify",
        ]);
        match cli.command {
            Command::Rewrite(ref args) => {
                assert_eq!(args.case_to_if, Some(CaseModeArg::Mux));
                assert!(!args.if_to_mux);
                assert!(args.primitives);
                assert!(args.simplify);
            }
            _ => panic!("expected Rewrite command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "logictree",
            "--quiet",
            "--color",
            "never",
            "--log-level",
            "trace",
            "pretty",
            "a.sv",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.log_level, Some(LogLevelArg::Trace));
    }

    #[test]
    fn global_flags_after_the_subcommand() {
        let cli = Cli::parse_from(["logictree", "explain", "a.sv", "--verbose", "--config", "x.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["logictree", "--log-level", "loud", "pretty", "a.sv"]).is_err());
    }

    #[test]
    fn arg_enums_map_onto_config_enums() {
        assert_eq!(CaseMode::from(CaseModeArg::If), CaseMode::If);
        assert_eq!(LogLevel::from(LogLevelArg::Debug), LogLevel::Debug);
    }
}
