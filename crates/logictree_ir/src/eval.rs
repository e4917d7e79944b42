//! Two-valued evaluation of expressions and statements.

use crate::analysis::Analyzer;
use crate::error::{IrError, IrResult};
use crate::expr::{mask, CmpOp, Expr};
use crate::stmt::{CaseFallback, Stmt};
use std::collections::BTreeMap;

/// Signal values by name. Vectors are unsigned integers, bit 0 the LSB.
pub type Env = BTreeMap<String, u64>;

/// Evaluates `expr`, masked to its width.
pub fn eval(expr: &Expr, env: &Env) -> IrResult<u64> {
    eval_with(expr, &|name| env.get(name).copied())
}

fn eval_with(expr: &Expr, lookup: &dyn Fn(&str) -> Option<u64>) -> IrResult<u64> {
    let width = expr.width();
    let value = match expr {
        Expr::Const(c) => c.value,
        Expr::Var(v) => lookup(&v.name).ok_or_else(|| IrError::Unbound(v.name.clone()))?,
        Expr::Not(x) => !eval_with(x, lookup)?,
        Expr::Gate { op, a, b } => op.apply(eval_with(a, lookup)?, eval_with(b, lookup)?, width),
        Expr::Compare { op, lhs, rhs } => {
            let m = mask(lhs.width());
            let same = eval_with(lhs, lookup)? & m == eval_with(rhs, lookup)? & m;
            match op {
                CmpOp::Eq => same as u64,
                CmpOp::Neq => !same as u64,
            }
        }
        Expr::Mux {
            selector,
            if_true,
            if_false,
        } => {
            if eval_with(selector, lookup)? & 1 == 1 {
                eval_with(if_true, lookup)?
            } else {
                eval_with(if_false, lookup)?
            }
        }
        Expr::BitSelect { base, index } => eval_with(base, lookup)? >> index,
        Expr::PartSelect { base, msb, lsb } => eval_with(base, lookup)? >> (*msb).min(*lsb),
        Expr::Concat(parts) => {
            let mut acc = 0u64;
            for p in parts {
                let w = p.width();
                let shifted = if w >= 64 { 0 } else { acc << w };
                acc = shifted | (eval_with(p, lookup)? & mask(w));
            }
            acc
        }
    };
    Ok(value & mask(width))
}

/// Executes `stmt` and returns the value of every signal it writes.
///
/// Reads see earlier writes of the same run first, then `inputs`. When an
/// `if` without `else` or a `case` without a matching arm leaves a signal
/// unwritten, `fallback` decides its value: [`CaseFallback::Zero`] writes 0,
/// [`CaseFallback::Hold`] keeps the value from `inputs`.
pub fn exec(stmt: &Stmt, inputs: &Env, fallback: CaseFallback) -> IrResult<Env> {
    let mut written = Env::new();
    run(stmt, inputs, &mut written, fallback)?;
    Ok(written)
}

fn run(stmt: &Stmt, inputs: &Env, written: &mut Env, fallback: CaseFallback) -> IrResult<()> {
    match stmt {
        Stmt::Assign(a) => {
            let value = {
                let lookup = |n: &str| written.get(n).or_else(|| inputs.get(n)).copied();
                eval_with(a.rhs(), &lookup)?
            };
            let target = &a.target().name;
            let (offset, width) = match &**a.lhs() {
                Expr::BitSelect { index, .. } => (*index, 1),
                Expr::PartSelect { msb, lsb, .. } => ((*msb).min(*lsb), msb.abs_diff(*lsb) + 1),
                _ => (0, a.target().width),
            };
            let old = written
                .get(target)
                .or_else(|| inputs.get(target))
                .copied()
                .unwrap_or(0);
            let field = mask(width) << offset;
            let new = (old & !field) | ((value & mask(width)) << offset);
            written.insert(target.clone(), new & mask(a.target().width));
        }
        Stmt::Block(stmts) => {
            for s in stmts {
                run(s, inputs, written, fallback)?;
            }
        }
        Stmt::If(i) => {
            let cond = {
                let lookup = |n: &str| written.get(n).or_else(|| inputs.get(n)).copied();
                eval_with(&i.cond, &lookup)?
            };
            if cond & 1 == 1 {
                run(&i.then_branch, inputs, written, fallback)?;
            } else if let Some(e) = &i.else_branch {
                run(e, inputs, written, fallback)?;
            } else {
                apply_fallback(stmt, inputs, written, fallback)?;
            }
        }
        Stmt::Case(c) => {
            let sel = {
                let lookup = |n: &str| written.get(n).or_else(|| inputs.get(n)).copied();
                eval_with(&c.selector, &lookup)?
            };
            let m = mask(c.selector.width());
            let hit = c
                .labeled_items()
                .find(|item| item.labels.iter().any(|l| l.value & m == sel))
                .or_else(|| c.default_item());
            match hit {
                Some(item) => run(&item.body, inputs, written, fallback)?,
                None => apply_fallback(stmt, inputs, written, fallback)?,
            }
        }
    }
    Ok(())
}

fn apply_fallback(
    stmt: &Stmt,
    inputs: &Env,
    written: &mut Env,
    fallback: CaseFallback,
) -> IrResult<()> {
    for v in Analyzer::new().writes(stmt) {
        if written.contains_key(&v.name) {
            continue;
        }
        let value = match fallback {
            CaseFallback::Zero => 0,
            CaseFallback::Hold => inputs
                .get(&v.name)
                .copied()
                .ok_or_else(|| IrError::Unbound(v.name.clone()))?,
        };
        written.insert(v.name, value);
    }
    Ok(())
}

/// Every assignment of `names` to 0/1, in binary counting order with the
/// first name as the most significant bit.
pub fn all_assignments(names: &[String]) -> Vec<Env> {
    let n = names.len().min(20);
    (0..1u64 << n)
        .map(|bits| {
            names[..n]
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), (bits >> (n - 1 - i)) & 1))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;
    use crate::expr::{Const, Var};
    use crate::stmt::{assign, if_stmt, CaseItem, CaseStmt};

    fn env(pairs: &[(&str, u64)]) -> Env {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn gates_and_not() {
        let e = or(and(var("a"), var("b")), not(var("c")));
        assert_eq!(eval(&e, &env(&[("a", 1), ("b", 0), ("c", 0)])).unwrap(), 1);
        assert_eq!(eval(&e, &env(&[("a", 1), ("b", 0), ("c", 1)])).unwrap(), 0);
    }

    #[test]
    fn vars_are_masked_to_width() {
        assert_eq!(eval(&var("a"), &env(&[("a", 6)])).unwrap(), 0);
        assert_eq!(eval(&vec_var("s", 2), &env(&[("s", 6)])).unwrap(), 2);
    }

    #[test]
    fn selects_and_concat() {
        let s = vec_var("s", 4);
        let e = env(&[("s", 0b1010), ("a", 1)]);
        assert_eq!(eval(&bit_select(s.clone(), 1), &e).unwrap(), 1);
        assert_eq!(eval(&bit_select(s.clone(), 2), &e).unwrap(), 0);
        assert_eq!(eval(&part_select(s.clone(), 3, 1), &e).unwrap(), 0b101);
        assert_eq!(eval(&concat(vec![var("a"), part_select(s, 1, 0)]), &e).unwrap(), 0b110);
    }

    #[test]
    fn compare_and_mux() {
        let s = vec_var("s", 2);
        let e = env(&[("s", 2), ("a", 0), ("b", 1)]);
        assert_eq!(eval(&eq(s.clone(), konst(2, 2)), &e).unwrap(), 1);
        assert_eq!(eval(&neq(s, konst(2, 2)), &e).unwrap(), 0);
        assert_eq!(eval(&mux(var("b"), var("a"), var("b")), &e).unwrap(), 0);
    }

    #[test]
    fn unbound_variable() {
        assert_eq!(eval(&var("q"), &Env::new()), Err(IrError::Unbound("q".into())));
    }

    #[test]
    fn case_runs_first_match_then_default() {
        let y = Var::scalar("y");
        let c = Stmt::Case(
            CaseStmt::new(
                vec_var("s", 2),
                vec![
                    CaseItem::labeled(vec![Const::new(0, 2).unwrap()], assign(y.clone(), var("a"))),
                    CaseItem::labeled(vec![Const::new(2, 2).unwrap()], assign(y.clone(), var("b"))),
                    CaseItem::default_arm(assign(y, var("c"))),
                ],
            )
            .unwrap(),
        );
        for (s, want) in [(0, 1), (1, 0), (2, 0), (3, 0)] {
            let out = exec(&c, &env(&[("s", s), ("a", 1), ("b", 0), ("c", 0)]), CaseFallback::Zero).unwrap();
            assert_eq!(out["y"], want, "s={s}");
        }
    }

    #[test]
    fn fallback_policy() {
        let y = Var::scalar("y");
        let s = if_stmt(var("c"), assign(y, var("a")), None);
        let inputs = env(&[("c", 0), ("a", 1), ("y", 1)]);
        assert_eq!(exec(&s, &inputs, CaseFallback::Zero).unwrap()["y"], 0);
        assert_eq!(exec(&s, &inputs, CaseFallback::Hold).unwrap()["y"], 1);
        let no_prior = env(&[("c", 0), ("a", 1)]);
        assert!(exec(&s, &no_prior, CaseFallback::Hold).is_err());
    }

    #[test]
    fn blocking_writes_are_visible_to_later_reads() {
        let t = Var::scalar("t");
        let y = Var::scalar("y");
        let s = Stmt::Block(vec![
            assign(t, not(var("a"))),
            assign(y, and(var("t"), var("b"))),
        ]);
        let out = exec(&s, &env(&[("a", 0), ("b", 1)]), CaseFallback::Zero).unwrap();
        assert_eq!(out["y"], 1);
    }

    #[test]
    fn select_targets_update_one_field() {
        let y = vec_var("y", 4);
        let s = Stmt::Block(vec![
            Stmt::Assign(crate::stmt::Assign::new(y.clone(), konst(0b1111, 4)).unwrap()).into_ref(),
            Stmt::Assign(crate::stmt::Assign::new(bit_select(y, 2), bit(false)).unwrap()).into_ref(),
        ]);
        assert_eq!(exec(&s, &Env::new(), CaseFallback::Zero).unwrap()["y"], 0b1011);
    }

    #[test]
    fn enumerates_assignments_msb_first() {
        let all = all_assignments(&["a".to_string(), "b".to_string()]);
        assert_eq!(all.len(), 4);
        assert_eq!(all[1]["a"], 0);
        assert_eq!(all[1]["b"], 1);
        assert_eq!(all[2]["a"], 1);
    }
}
