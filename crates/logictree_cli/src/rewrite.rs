//! `logictree pretty` and `logictree rewrite`: the statements driving each
//! signal, as lowered or after structural rewrites.

use std::fmt::Write as _;

use logictree_config::LogictreeConfig;
use logictree_export::pretty_print;
use logictree_ir::{Module, NodeRef, Stmt, StmtRef};
use logictree_transform::{
    case_to_if_with, if_to_mux, simplify_stmt, to_primitives_stmt, CaseToIfOptions, Lowered,
    RewriteResult,
};

use crate::pipeline::load_modules;
use crate::{FileArgs, GlobalArgs, RewriteArgs};

/// Runs the `logictree pretty` command.
pub fn pretty(
    args: &FileArgs,
    global: &GlobalArgs,
    config: &LogictreeConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(modules) = load_modules(&args.file, global, config)? else {
        return Ok(1);
    };
    for module in &modules {
        let text = drivers_text(module, &args.outputs, |_, s| {
            Ok::<_, std::convert::Infallible>(s.clone())
        })?;
        print!("{text}");
    }
    Ok(0)
}

/// Runs the `logictree rewrite` command.
pub fn run(
    args: &RewriteArgs,
    global: &GlobalArgs,
    config: &LogictreeConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(modules) = load_modules(&args.file, global, config)? else {
        return Ok(1);
    };
    let steps = Steps::from_args(args, config);
    for module in &modules {
        match drivers_text(module, &[], |key, s| steps.apply(module, key, s)) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("error: in module `{}`: {e}", module.name);
                return Ok(1);
            }
        }
    }
    Ok(0)
}

/// The rewrites requested on the command line, in application order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Steps {
    /// `case` rewrite, if any.
    pub case_to_if: Option<CaseToIfOptions>,
    /// Collapse `if`/`else` into a mux.
    pub if_to_mux: bool,
    /// Decompose gates into AND/OR/NOT.
    pub primitives: bool,
    /// Simplify last.
    pub simplify: bool,
}

impl Steps {
    /// Steps for `args`; the `case` fallback comes from `[lowering]`.
    pub fn from_args(args: &RewriteArgs, config: &LogictreeConfig) -> Self {
        Self {
            case_to_if: args.case_to_if.map(|mode| CaseToIfOptions {
                mode: mode.into(),
                fallback: config.lowering.case_fallback,
            }),
            if_to_mux: args.if_to_mux,
            primitives: args.primitives,
            simplify: args.simplify,
        }
    }

    /// Applies every step to the driver of `key`.
    pub fn apply(&self, module: &Module, key: &str, stmt: &StmtRef) -> RewriteResult<StmtRef> {
        let mut stmt = stmt.clone();
        if let Some(options) = &self.case_to_if {
            let rewritten = match &*stmt {
                Stmt::Case(case) => match case_to_if_with(case, options)? {
                    Lowered::Stmt(s) => Some(s),
                    // The mux form is the value of the target.
                    Lowered::Expr(e) => module
                        .assignments
                        .get(key)
                        .map(|a| Stmt::Assign(a.with_rhs(e)).into_ref()),
                },
                _ => None,
            };
            if let Some(s) = rewritten {
                stmt = s;
            }
        }
        if self.if_to_mux && is_if(&stmt) {
            stmt = if_to_mux(&stmt)?;
        }
        if self.primitives {
            stmt = to_primitives_stmt(&stmt);
        }
        if self.simplify {
            stmt = simplify_stmt(&stmt);
        }
        log::debug!("rewrote driver of `{key}` to {}", stmt.kind());
        Ok(stmt)
    }
}

fn is_if(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::If(_) => true,
        Stmt::Block(stmts) => matches!(stmts.as_slice(), [only] if matches!(&**only, Stmt::If(_))),
        _ => false,
    }
}

/// Pretty prints of the selected drivers of `module`, each after `f`.
fn drivers_text<E>(
    module: &Module,
    outputs: &[String],
    f: impl Fn(&str, &StmtRef) -> Result<StmtRef, E>,
) -> Result<String, E> {
    let mut out = String::new();
    let _ = writeln!(out, "module {}", module.name);
    for (key, driver) in &module.drivers {
        if !outputs.is_empty() && !outputs.contains(key) {
            continue;
        }
        let stmt = f(key, driver)?;
        let _ = writeln!(out, "// {key}");
        out.push_str(&pretty_print(NodeRef::Stmt(&stmt)));
    }
    Ok(out)
}
