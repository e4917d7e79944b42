//! Lowering of parsed HDL into logictree IR.
//!
//! Each module declaration becomes one [`Module`]:
//!
//! - ports and `wire`/`logic`/`reg` declarations fill `signal_map` and
//!   `vector_widths`;
//! - continuous assignments and combinational processes are lowered to IR
//!   statements, kept as `drivers` and `processes`;
//! - every process is flattened into one simplified right-hand side per
//!   written target, kept as `assignments`.
//!
//! Lowering stops at the first construct it cannot express and reports it
//! as a [`LowerError`]. Warnings (implicit nets, constant comparisons) go to
//! the [`DiagnosticSink`] and the log.

#![warn(missing_docs)]

pub mod context;
pub mod error;
mod expr;
pub mod literal;
mod module;
mod stmt;

pub use context::LoweringCtx;
pub use error::{LowerError, LowerResult};

use logictree_common::Interner;
use logictree_config::LoweringConfig;
use logictree_diagnostics::DiagnosticSink;
use logictree_ir::{CaseFallback, Module};
use logictree_source::{SourceDb, Span};
use logictree_sv_parser::{ParsedSource, SvSourceFile};
use module::ModuleLowerer;
use std::collections::BTreeMap;

/// Lowering policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LowerOptions {
    /// Undeclared names are errors instead of implicit 1-bit nets.
    pub strict_identifiers: bool,
    /// `x`/`z`/`?` literal digits are errors instead of zeros.
    pub strict_literals: bool,
    /// Value of a target that no arm of an `if` or `case` assigns.
    pub case_fallback: CaseFallback,
}

impl From<&LoweringConfig> for LowerOptions {
    fn from(config: &LoweringConfig) -> Self {
        Self {
            strict_identifiers: config.strict_identifiers,
            strict_literals: config.strict_literals,
            case_fallback: config.case_fallback,
        }
    }
}

/// Lowers every module of a parsed file, in source order.
pub fn lower(
    ast: &SvSourceFile,
    source_db: &SourceDb,
    interner: &Interner,
    sink: &DiagnosticSink,
    options: &LowerOptions,
) -> LowerResult<Vec<Module>> {
    let mut seen: BTreeMap<&str, Span> = BTreeMap::new();
    let mut modules = Vec::new();
    for decl in ast.modules() {
        let name = interner.resolve(decl.name);
        if let Some(previous) = seen.insert(name, decl.span) {
            return Err(LowerError::Redeclared {
                name: name.to_string(),
                span: decl.span,
                previous,
            });
        }
        let mut ctx = LoweringCtx::new(options, interner, source_db, sink);
        modules.push(ModuleLowerer::new(&mut ctx, name).lower(decl)?);
    }
    log::info!("lowered {} module(s)", modules.len());
    Ok(modules)
}

/// Lowers a [`ParsedSource`]; any parse error fails with
/// [`LowerError::Parse`].
pub fn lower_parsed(parsed: &ParsedSource, options: &LowerOptions) -> LowerResult<Vec<Module>> {
    if parsed.sink.has_errors() {
        return Err(LowerError::Parse {
            count: parsed.sink.error_count(),
        });
    }
    lower(
        &parsed.ast,
        &parsed.source_db,
        &parsed.interner,
        &parsed.sink,
        options,
    )
}

/// Parses and lowers HDL text.
pub fn lower_source(text: &str, options: &LowerOptions) -> LowerResult<Vec<Module>> {
    lower_parsed(&logictree_sv_parser::parse_str(text), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_ir::build::*;
    use logictree_ir::{
        eval, exec, expr_free_vars, gate_breakdown, literal_sigs, Analyzer, Direction, Env, Polarity,
        Stmt,
    };
    use std::collections::BTreeSet;

    fn lower_one(src: &str) -> Module {
        let mut modules = lower_source(src, &LowerOptions::default()).unwrap();
        assert_eq!(modules.len(), 1);
        modules.remove(0)
    }

    #[test]
    fn and_gate() {
        let m = lower_one("module m(input a, input b, output y); assign y = a & b; endmodule");
        let a = &m.assignments["y"];
        assert_eq!(a.lhs(), &var("y"));
        assert_eq!(a.rhs(), &and(var("a"), var("b")));
        let names: BTreeSet<String> = m.free_vars().into_iter().map(|v| v.name).collect();
        assert_eq!(names, BTreeSet::from(["a", "b"].map(String::from)));
        let driver = &m.drivers["y"];
        let writes: Vec<String> = Analyzer::new()
            .writes(driver)
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(writes, ["y"]);
        assert_eq!(gate_breakdown(a.rhs()).get("AND"), Some(&1));
    }

    #[test]
    fn equality_literals() {
        let m = lower_one("module m(input [1:0] s, output y); assign y = (s == 2'b10); endmodule");
        let rhs = m.assignments["y"].rhs();
        let sigs: Vec<(u32, Polarity)> = literal_sigs(rhs).into_iter().collect();
        assert_eq!(sigs, [(0, Polarity::Neg), (1, Polarity::Pos)]);
        let counts = gate_breakdown(rhs);
        assert_eq!((counts.get("AND"), counts.get("NOT")), (Some(&1), Some(&1)));
    }

    #[test]
    fn ports_keep_declaration_order_and_ranges() {
        let m = lower_one(
            "module m(a, y, s); input [3:0] a; output y; input [0:1] s; assign y = a[0] & s[1]; endmodule",
        );
        let names: Vec<&str> = m.ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "y", "s"]);
        assert_eq!(m.ports[0].range, Some((3, 0)));
        assert_eq!(m.ports[1].direction, Direction::Output);
        assert_eq!(m.vector_widths["s"], (0, 1));
        assert_eq!(m.signal_map["a"].width, 4);
        assert_eq!(m.output_names(), ["y"]);
    }

    #[test]
    fn port_may_be_retyped_by_a_net_declaration() {
        let m = lower_one("module m(a, y); input a; output y; reg y; always @(*) y = ~a; endmodule");
        assert_eq!(m.assignments["y"].rhs(), &not(var("a")));
    }

    #[test]
    fn net_initializer_is_a_continuous_assign() {
        let m = lower_one("module m(input a, b, output y); wire t = a ^ b; assign y = t; endmodule");
        assert_eq!(m.assignments["t"].rhs(), &xor(var("a"), var("b")));
        assert!(m.drivers.contains_key("t"));
    }

    #[test]
    fn three_way_if_chain() {
        let m = lower_one(
            "module m(input s0, s1, d0, d1, d2, output reg y);
               always_comb begin
                 if (s0) y = d0; else if (s1) y = d1; else y = d2;
               end
             endmodule",
        );
        let rhs = m.assignments["y"].rhs();
        let counts = gate_breakdown(rhs);
        assert_eq!(counts.get("OR"), Some(&2));
        assert_eq!(counts.get("NOT"), Some(&2));
        assert_eq!(counts.get("AND"), Some(&5));
        let names: BTreeSet<String> = m.free_vars().into_iter().map(|v| v.name).collect();
        let expected: BTreeSet<String> = ["s0", "s1", "d0", "d1", "d2"].map(String::from).into();
        assert_eq!(names, expected);
        assert!(matches!(&*m.drivers["y"], Stmt::If(_)));
        assert_eq!(m.processes.len(), 1);
    }

    #[test]
    fn case_driver_is_the_case_statement() {
        let m = lower_one(
            "module m(input s, a, b, output reg y);
               always_comb case (s) 1'b0: y = a; 1'b1: y = b; endcase
             endmodule",
        );
        let Stmt::Case(case) = &*m.drivers["y"] else {
            panic!("driver is {}", m.drivers["y"].kind());
        };
        assert_eq!(case.items.len(), 2);
        assert!(case.default_item().is_none());
    }

    #[test]
    fn flattened_case_matches_execution() {
        let m = lower_one(
            "module m(input [1:0] s, input a, b, c, output reg y);
               always @(*) begin
                 case (s)
                   2'b00: y = a;
                   2'b10: y = b;
                   default: y = c;
                 endcase
               end
             endmodule",
        );
        let rhs = m.assignments["y"].rhs();
        for s in 0..4u64 {
            for abc in 0..8u64 {
                let env: Env = [
                    ("s".to_string(), s),
                    ("a".to_string(), abc & 1),
                    ("b".to_string(), (abc >> 1) & 1),
                    ("c".to_string(), (abc >> 2) & 1),
                ]
                .into();
                let by_stmt = exec(&m.drivers["y"], &env, CaseFallback::Zero).unwrap()["y"];
                assert_eq!(logictree_ir::eval(rhs, &env).unwrap(), by_stmt, "s={s} abc={abc}");
            }
        }
    }

    #[test]
    fn hold_fallback_reads_the_target() {
        let options = LowerOptions {
            case_fallback: CaseFallback::Hold,
            ..LowerOptions::default()
        };
        let src = "module m(input c, a, output reg y); always_comb if (c) y = a; endmodule";
        let m = lower_source(src, &options).unwrap().remove(0);
        let names: BTreeSet<String> = expr_free_vars(m.assignments["y"].rhs())
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert!(names.contains("y"));
    }

    #[test]
    fn bit_targets_merge_into_their_signal() {
        let m = lower_one(
            "module m(input a, b, output [1:0] y); assign y[0] = a; assign y[1] = b; endmodule",
        );
        let keys: Vec<&str> = m.assignments.keys().map(String::as_str).collect();
        assert_eq!(keys, ["y"]);
        let y = &m.assignments["y"];
        assert_eq!(y.lhs(), &vec_var("y", 2));
        for (a, b) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            let env = Env::from([("a".to_string(), a), ("b".to_string(), b)]);
            assert_eq!(eval(y.rhs(), &env).unwrap(), (b << 1) | a);
        }
        assert!(matches!(&*m.drivers["y"], Stmt::Block(both) if both.len() == 2));
    }

    #[test]
    fn bit_write_after_whole_write_updates_the_signal() {
        let m = lower_one(
            "module m(input a, output reg [1:0] y);
               always_comb begin y = 2'b00; y[0] = a; end
             endmodule",
        );
        let keys: Vec<&str> = m.assignments.keys().map(String::as_str).collect();
        assert_eq!(keys, ["y"]);
        let rhs = m.assignments["y"].rhs();
        for a in [0, 1] {
            let env = Env::from([("a".to_string(), a)]);
            assert_eq!(eval(rhs, &env).unwrap(), a);
        }
    }

    #[test]
    fn overlapping_select_drivers_conflict() {
        for src in [
            "module m(input [1:0] a, input b, output [1:0] y); assign y = a; assign y[0] = b; endmodule",
            "module m(input [1:0] a, input b, output [1:0] y); assign y[0] = b; assign y = a; endmodule",
            "module m(input [3:0] a, output [3:0] y); assign y[2:0] = a[2:0]; assign y[3:2] = a[1:0]; endmodule",
        ] {
            let err = lower_source(src, &LowerOptions::default()).unwrap_err();
            assert!(
                matches!(err, LowerError::MultipleDrivers { ref name, .. } if name == "y"),
                "{src}: {err:?}"
            );
        }
        let err = lower_source(
            "module m(input a, b, output reg [1:0] y);
               assign y[1] = b;
               always_comb y[0] = a;
             endmodule",
            &LowerOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LowerError::MultipleDrivers { .. }));
    }

    #[test]
    fn overlay_records_source_text() {
        let m = lower_one("module m(input a, b, output y); assign y = a | b; endmodule");
        let rhs = m.assignments["y"].rhs();
        assert_eq!(
            m.overlay.expr_source(logictree_ir::NodeRef::Expr(rhs)),
            Some("assign y = a | b;")
        );
    }

    #[test]
    fn implicit_net_is_a_warning() {
        let parsed = logictree_sv_parser::parse_str(
            "module m(input a, output y); assign y = a & ghost; endmodule",
        );
        let modules = lower_parsed(&parsed, &LowerOptions::default()).unwrap();
        assert_eq!(modules.len(), 1);
        let warnings = parsed.sink.diagnostics();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, error::W200);

        let strict = LowerOptions {
            strict_identifiers: true,
            ..LowerOptions::default()
        };
        assert!(matches!(
            lower_parsed(&parsed, &strict),
            Err(LowerError::UnknownIdentifier { .. })
        ));
    }

    #[test]
    fn options_follow_the_config() {
        let config = LoweringConfig {
            strict_identifiers: true,
            strict_literals: false,
            case_fallback: CaseFallback::Hold,
        };
        let options = LowerOptions::from(&config);
        assert!(options.strict_identifiers);
        assert_eq!(options.case_fallback, CaseFallback::Hold);
    }

    #[test]
    fn lowering_errors() {
        let err = |src: &str| lower_source(src, &LowerOptions::default()).unwrap_err();
        assert!(matches!(
            err("module m(input a, output y); assign y = a; endmodule junk"),
            LowerError::Parse { count } if count >= 1
        ));
        assert!(matches!(
            err("module m(input clk, a, output reg y); always_ff @(posedge clk) y <= a; endmodule"),
            LowerError::Unsupported { .. }
        ));
        assert!(matches!(
            err("module m(input clk, a, output reg y); always @(posedge clk) y = a; endmodule"),
            LowerError::Unsupported { .. }
        ));
        assert!(matches!(
            err("module m(input a, output reg y); always_comb y <= a; endmodule"),
            LowerError::Unsupported { .. }
        ));
        assert!(matches!(
            err("module m(input a, output y); wire a; endmodule"),
            LowerError::Redeclared { .. }
        ));
        assert!(matches!(
            err("module m(input a, b, output y); assign y = a; assign y = b; endmodule"),
            LowerError::MultipleDrivers { .. }
        ));
        assert!(matches!(
            err("module m(input [1:0] s, input a, output reg y);
                   always_comb case (s) 2'b00: y = a; default: y = 0; default: y = 1; endcase
                 endmodule"),
            LowerError::IllegalDefault { .. }
        ));
        assert!(matches!(
            err("module a; endmodule module a; endmodule"),
            LowerError::Redeclared { .. }
        ));
    }

    #[test]
    fn strict_literals_reject_unknown_digits() {
        let src = "module m(output [3:0] y); assign y = 4'b1x0z; endmodule";
        let m = lower_source(src, &LowerOptions::default()).unwrap().remove(0);
        assert_eq!(m.assignments["y"].rhs().as_const().map(|c| c.value), Some(0b1000));
        let strict = LowerOptions {
            strict_literals: true,
            ..LowerOptions::default()
        };
        assert!(matches!(
            lower_source(src, &strict),
            Err(LowerError::UnknownBits { .. })
        ));
    }
}
