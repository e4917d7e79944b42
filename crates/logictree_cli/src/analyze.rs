//! `logictree analyze`: a per-output overview of the lowered logic.

use std::fmt::Write as _;

use logictree_config::LogictreeConfig;
use logictree_export::{ascii_tree, TreeBuilder};
use logictree_ir::{gate_summary, Module, Node};

use crate::pipeline::{load_modules, selected};
use crate::{FileArgs, GlobalArgs};

/// Runs the `logictree analyze` command.
pub fn run(
    args: &FileArgs,
    global: &GlobalArgs,
    config: &LogictreeConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(modules) = load_modules(&args.file, global, config)? else {
        return Ok(1);
    };
    if !global.quiet {
        eprintln!("   Analyzing {}", args.file.display());
    }
    for module in &modules {
        print!("{}", report(module, &args.outputs));
    }
    Ok(0)
}

/// ASCII tree, Verilog form, depth and gate summary of each selected output.
pub fn report(module: &Module, outputs: &[String]) -> String {
    let builder = TreeBuilder::new(&module.overlay);
    let mut out = String::new();
    let _ = writeln!(out, "module {}", module.name);
    for (signal, assign) in selected(module, outputs) {
        let rhs = assign.rhs();
        let _ = writeln!(out);
        let _ = writeln!(out, "Signal: {signal}");
        let _ = writeln!(out, "ASCII Tree:");
        out.push_str(&ascii_tree(&builder.assign(assign)));
        let _ = writeln!(out, "  Verilog: {rhs}");
        let _ = writeln!(out, "  Depth:   {}", rhs.depth());
        let _ = writeln!(out, "  Gates:   {}", gate_summary(rhs));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_lower::{lower_source, LowerOptions};

    #[test]
    fn report_lists_each_output() {
        let m = lower_source(
            "module m(input a, b, c, output y, output z); assign y = a & b; assign z = ~c; endmodule",
            &LowerOptions::default(),
        )
        .unwrap()
        .remove(0);
        let text = report(&m, &[]);
        assert!(text.starts_with("module m\n"));
        assert!(text.contains("Signal: y"));
        assert!(text.contains("Signal: z"));
        assert!(text.contains("  Depth:   1"));
        assert!(text.contains("└── "));
    }

    #[test]
    fn report_honors_the_selection() {
        let m = lower_source(
            "module m(input a, b, output y, output z); assign y = a | b; assign z = a; endmodule",
            &LowerOptions::default(),
        )
        .unwrap()
        .remove(0);
        let text = report(&m, &["z".to_string()]);
        assert!(text.contains("Signal: z"));
        assert!(!text.contains("Signal: y"));
        assert!(text.contains("  Depth:   0"));
    }
}
