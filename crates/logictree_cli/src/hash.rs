//! `logictree hash`, `explain` and `bdd-expr`: canonical forms of each
//! output.
//!
//! Outputs are hashed in parallel; each hash builds its own BDD manager.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use logictree_canon::{
    bit_variables, explain_logic_hash, explain_logic_hash_with_order, Golden, HashExplanation,
    HashResult,
};
use logictree_config::LogictreeConfig;
use logictree_export::symbolic_expr;
use logictree_ir::expr_free_vars;
use rayon::prelude::*;

use crate::pipeline::{load_modules, prepare_outputs, Output};
use crate::{FileArgs, GlobalArgs, HashArgs};

/// Explains `output` under the configured variable order, or the sorted
/// order when none is configured.
fn explain_output(output: &Output, config: &LogictreeConfig) -> HashResult<HashExplanation> {
    if config.hash.order.is_empty() {
        explain_logic_hash(&output.expr)
    } else {
        explain_logic_hash_with_order(&output.expr, &config.hash.order)
    }
}

fn explain_all(
    outputs: &[Output],
    config: &LogictreeConfig,
) -> HashResult<Vec<HashExplanation>> {
    outputs.par_iter().map(|o| explain_output(o, config)).collect()
}

/// Loads, lowers and prepares the selected outputs, reporting failures.
fn outputs_of(
    file: &Path,
    selected: &[String],
    global: &GlobalArgs,
    config: &LogictreeConfig,
) -> Result<Option<Vec<Output>>, Box<dyn std::error::Error>> {
    let Some(modules) = load_modules(file, global, config)? else {
        return Ok(None);
    };
    match prepare_outputs(&modules, selected, config) {
        Ok(outputs) if outputs.is_empty() => {
            eprintln!("error: no outputs to hash in {}", file.display());
            Ok(None)
        }
        Ok(outputs) => Ok(Some(outputs)),
        Err(e) => {
            eprintln!("error: {e}");
            Ok(None)
        }
    }
}

/// Sorted signal names read by an output.
fn sorted_inputs(output: &Output) -> Vec<String> {
    expr_free_vars(&output.expr)
        .into_iter()
        .map(|v| v.name)
        .collect()
}

/// Runs the `logictree hash` command.
pub fn run(
    args: &HashArgs,
    global: &GlobalArgs,
    config: &LogictreeConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(outputs) = outputs_of(&args.file, &args.outputs, global, config)? else {
        return Ok(1);
    };
    let explained = match explain_all(&outputs, config) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(1);
        }
    };
    for (output, e) in outputs.iter().zip(&explained) {
        println!("{}", hash_line(output, e));
    }

    if args.save_golden.is_none() && args.compare_golden.is_none() {
        return Ok(0);
    }
    let stem = args.save_golden.as_deref();
    let fresh = match capture_all(&outputs, stem) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(1);
        }
    };

    if args.save_golden.is_some() {
        let dir = args
            .golden_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.golden_dir));
        for golden in &fresh {
            let path = golden.save(&dir)?;
            if !global.quiet {
                eprintln!("   Golden hash written to {}", path.display());
            }
        }
    }

    if let Some(path) = &args.compare_golden {
        let stored = Golden::load(path)?;
        let Some(current) = pick(&fresh, &stored) else {
            eprintln!(
                "error: no output matches golden record `{}`; select one with --output",
                stored.name
            );
            return Ok(1);
        };
        let verdict = current.compare(&stored);
        println!("golden {}: {verdict}", stored.name);
        if !verdict.is_match() {
            return Ok(1);
        }
    }
    Ok(0)
}

fn hash_line(output: &Output, e: &HashExplanation) -> String {
    format!(
        "{}: {}\n  inputs: [{}]",
        output.name,
        e.hash,
        sorted_inputs(output).join(", ")
    )
}

/// Name of the golden record for `output`: `stem` for a lone output,
/// `stem_signal` otherwise, and the output name without a stem.
pub fn golden_name(stem: Option<&str>, output: &Output, lone: bool) -> String {
    let signal = output.name.replace('.', "_");
    match stem {
        Some(stem) if lone => stem.to_string(),
        Some(stem) => format!("{stem}_{signal}"),
        None => signal,
    }
}

fn capture_all(outputs: &[Output], stem: Option<&str>) -> HashResult<Vec<Golden>> {
    let lone = outputs.len() == 1;
    outputs
        .par_iter()
        .map(|o| Golden::capture(&golden_name(stem, o, lone), &o.expr, &o.decl_inputs))
        .collect()
}

/// The fresh record to compare with `stored`: the only one, or the one with
/// the same name.
fn pick<'g>(fresh: &'g [Golden], stored: &Golden) -> Option<&'g Golden> {
    match fresh {
        [only] => Some(only),
        _ => fresh.iter().find(|g| g.name == stored.name),
    }
}

/// Runs the `logictree explain` command.
pub fn explain(
    args: &FileArgs,
    global: &GlobalArgs,
    config: &LogictreeConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(outputs) = outputs_of(&args.file, &args.outputs, global, config)? else {
        return Ok(1);
    };
    match explain_all(&outputs, config) {
        Ok(explained) => {
            for (output, e) in outputs.iter().zip(&explained) {
                print!("{}", explanation(output, e));
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(1)
        }
    }
}

/// Canonical expression, variable order and hash of one output.
pub fn explanation(output: &Output, e: &HashExplanation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", output.name);
    let _ = writeln!(out, "  canonical: {}", e.canonical);
    let _ = writeln!(out, "  variable order:");
    for (i, name) in e.order.iter().enumerate() {
        let _ = writeln!(out, "    {i}: {name}");
    }
    let _ = writeln!(out, "  hash: {}", e.hash);
    out
}

/// Runs the `logictree bdd-expr` command.
pub fn bdd_expr(
    args: &FileArgs,
    global: &GlobalArgs,
    config: &LogictreeConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(outputs) = outputs_of(&args.file, &args.outputs, global, config)? else {
        return Ok(1);
    };
    match explain_all(&outputs, config) {
        Ok(explained) => {
            for (output, e) in outputs.iter().zip(&explained) {
                println!("{}", output.name);
                println!("  symbolic: {}", symbolic_expr(&output.expr));
                println!("  bdd:      {}", e.canonical);
                log::debug!("bit variables: {:?}", bit_variables(&output.expr));
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_canon::GoldenVerdict;
    use logictree_ir::build::*;

    fn output(name: &str, expr: logictree_ir::ExprRef) -> Output {
        Output {
            name: name.to_string(),
            expr,
            decl_inputs: vec!["b".into(), "a".into()],
        }
    }

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: None,
            log_level: None,
        }
    }

    #[test]
    fn golden_names() {
        let o = output("m.y", var("a"));
        assert_eq!(golden_name(Some("mux2"), &o, true), "mux2");
        assert_eq!(golden_name(Some("mux2"), &o, false), "mux2_m_y");
        assert_eq!(golden_name(None, &o, false), "m_y");
    }

    #[test]
    fn equivalent_outputs_hash_equally_in_parallel() {
        let outputs = vec![
            output("p", and(var("a"), var("b"))),
            output("q", not(or(not(var("a")), not(var("b"))))),
        ];
        let explained = explain_all(&outputs, &LogictreeConfig::default()).unwrap();
        assert_eq!(explained[0].hash, explained[1].hash);
        assert_eq!(explained[0].order, ["a", "b"]);
    }

    #[test]
    fn configured_order_is_used() {
        let mut config = LogictreeConfig::default();
        config.hash.order = vec!["b".into(), "a".into()];
        let e = explain_output(&output("y", and(var("a"), var("b"))), &config).unwrap();
        assert_eq!(e.order, ["b", "a"]);
        assert!(e.canonical.starts_with("ite(b,"));
    }

    #[test]
    fn explanation_lists_the_order() {
        let o = output("y", or(var("b"), var("a")));
        let e = explain_output(&o, &LogictreeConfig::default()).unwrap();
        let text = explanation(&o, &e);
        assert!(text.contains("    0: a\n    1: b\n"));
        assert!(text.contains(&e.hash.to_string()));
    }

    #[test]
    fn captured_goldens_keep_declaration_order() {
        let fresh = capture_all(&[output("y", and(var("a"), var("b")))], Some("and2")).unwrap();
        assert_eq!(fresh[0].name, "and2");
        assert_eq!(fresh[0].inputs.decl, ["b", "a"]);
        assert_eq!(fresh[0].inputs.flat, ["a", "b"]);
        assert_eq!(pick(&fresh, &fresh[0]).map(|g| g.name.as_str()), Some("and2"));
    }

    fn write_file(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn save_then_compare_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_file(
            dir.path(),
            "and2.sv",
            "module and2(input a, b, output y); assign y = a & b; endmodule",
        );
        let goldens = dir.path().join("goldens");
        let config = LogictreeConfig::default();
        let save = HashArgs {
            file: src.clone(),
            outputs: vec![],
            save_golden: Some("and2".into()),
            golden_dir: Some(goldens.clone()),
            compare_golden: None,
        };
        assert_eq!(run(&save, &global(), &config).unwrap(), 0);
        let saved = goldens.join("and2.json");
        assert!(saved.is_file());

        // Same function written differently still matches.
        write_file(
            dir.path(),
            "and2.sv",
            "module and2(input a, b, output y); assign y = ~(~a | ~b); endmodule",
        );
        let compare = HashArgs {
            save_golden: None,
            golden_dir: None,
            compare_golden: Some(saved.clone()),
            ..save
        };
        assert_eq!(run(&compare, &global(), &config).unwrap(), 0);

        write_file(
            dir.path(),
            "and2.sv",
            "module and2(input a, b, output y); assign y = a | b; endmodule",
        );
        assert_eq!(run(&compare, &global(), &config).unwrap(), 1);
    }

    #[test]
    fn verdict_for_changed_inputs() {
        let a = Golden::capture("y", &and(var("a"), var("b")), &[]).unwrap();
        let b = Golden::capture("y", &and(var("a"), var("c")), &[]).unwrap();
        assert!(matches!(b.compare(&a), GoldenVerdict::InputsChanged { .. }));
    }
}
