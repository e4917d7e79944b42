//! End-to-end scenarios: HDL text in, lowered logic and rewrites out.

use logictree_conformance::{input_space, lower_one, names};
use logictree_ir::build::*;
use logictree_ir::{
    eval, exec, gate_breakdown, literal_sigs, Analyzer, CaseFallback, Polarity, Stmt,
};
use logictree_transform::{case_to_if, simplify, CaseMode};
use std::collections::BTreeSet;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn and_gate() {
    let m = lower_one("module top(input a, input b, output y); assign y = a & b; endmodule");
    let y = &m.assignments["y"];
    assert_eq!(y.lhs(), &var("y"));
    assert_eq!(y.rhs(), &and(var("a"), var("b")));
    assert_eq!(names(&m.free_vars()), set(&["a", "b"]));
    assert_eq!(names(&Analyzer::new().writes(&m.drivers["y"])), set(&["y"]));
    assert_eq!(gate_breakdown(y.rhs()).get("AND"), Some(&1));
}

#[test]
fn equality_against_a_literal_expands_per_bit() {
    let m = lower_one("module top(input [1:0] s, output y); assign y = (s == 2'b10); endmodule");
    let rhs = m.assignments["y"].rhs();
    let s = vec_var("s", 2);
    assert_eq!(
        rhs,
        &and(bit_select(s.clone(), 1), not(bit_select(s, 0)))
    );
    let sigs = literal_sigs(rhs);
    assert_eq!(sigs, BTreeSet::from([(1, Polarity::Pos), (0, Polarity::Neg)]));
    let counts = gate_breakdown(rhs);
    assert_eq!(counts.get("AND"), Some(&1));
    assert_eq!(counts.get("NOT"), Some(&1));
}

const MUX2: &str = "module mux2(input s, input a, input b, output reg y);
  always_comb begin
    case (s)
      1'b0: y = a;
      1'b1: y = b;
    endcase
  end
endmodule";

#[test]
fn one_bit_case_becomes_an_if() {
    let m = lower_one(MUX2);
    let Stmt::Case(case) = &*m.drivers["y"] else {
        panic!("driver is {}", m.drivers["y"].kind());
    };
    let out = case_to_if(case, CaseMode::If).unwrap();
    let Stmt::If(i) = &**out.as_stmt().unwrap() else {
        panic!("expected an if statement");
    };
    assert_eq!(i.cond, var("s"));
    assert_eq!(i.then_branch.single_assign().unwrap().to_string(), "y = b");
    let else_branch = i.else_branch.as_ref().unwrap();
    assert_eq!(else_branch.single_assign().unwrap().to_string(), "y = a");
}

#[test]
fn one_bit_case_as_a_mux() {
    let m = lower_one(MUX2);
    let Stmt::Case(case) = &*m.drivers["y"] else {
        panic!("driver is {}", m.drivers["y"].kind());
    };
    let out = case_to_if(case, CaseMode::Mux).unwrap();
    let e = simplify(out.as_expr().unwrap());
    assert_eq!(
        e,
        or(and(var("s"), var("b")), and(not(var("s")), var("a")))
    );
    for env in input_space(&[("s", 1), ("a", 1), ("b", 1)]) {
        assert_eq!(
            eval(&e, &env).unwrap(),
            eval(m.assignments["y"].rhs(), &env).unwrap()
        );
    }
}

#[test]
fn three_way_priority_chain() {
    let m = lower_one(
        "module pri(input s0, s1, d0, d1, d2, output reg y);
           always_comb begin
             if (s0) y = d0;
             else if (s1) y = d1;
             else y = d2;
           end
         endmodule",
    );
    let rhs = m.assignments["y"].rhs();
    let counts = gate_breakdown(rhs);
    assert_eq!(counts.get("AND"), Some(&5));
    assert_eq!(counts.get("OR"), Some(&2));
    assert_eq!(counts.get("NOT"), Some(&2));
    assert_eq!(names(&m.free_vars()), set(&["s0", "s1", "d0", "d1", "d2"]));

    for env in input_space(&[("s0", 1), ("s1", 1), ("d0", 1), ("d1", 1), ("d2", 1)]) {
        let want = if env["s0"] == 1 {
            env["d0"]
        } else if env["s1"] == 1 {
            env["d1"]
        } else {
            env["d2"]
        };
        assert_eq!(eval(rhs, &env).unwrap(), want, "{env:?}");
    }
}

#[test]
fn two_bit_case_rewrite_preserves_behavior() {
    let m = lower_one(
        "module sel(input [1:0] s, input a, b, c, output reg y);
           always @(*) begin
             case (s)
               2'b00: y = a;
               2'b10: y = b;
               default: y = c;
             endcase
           end
         endmodule",
    );
    let driver = &m.drivers["y"];
    let Stmt::Case(case) = &**driver else {
        panic!("driver is {}", driver.kind());
    };
    let rewritten = case_to_if(case, CaseMode::If).unwrap();
    let rewritten = rewritten.as_stmt().unwrap();
    for env in input_space(&[("s", 2), ("a", 1), ("b", 1), ("c", 1)]) {
        let want = match env["s"] {
            0 => env["a"],
            2 => env["b"],
            _ => env["c"],
        };
        let by_case = exec(driver, &env, CaseFallback::Zero).unwrap()["y"];
        let by_if = exec(rewritten, &env, CaseFallback::Zero).unwrap()["y"];
        assert_eq!(by_case, want, "{env:?}");
        assert_eq!(by_if, want, "{env:?}");
        assert_eq!(eval(m.assignments["y"].rhs(), &env).unwrap(), want, "{env:?}");
    }
}

#[test]
fn intermediate_wires_stay_named() {
    let m = lower_one(
        "module chain(input a, b, c, output y);
           wire t;
           assign t = a & b;
           assign y = t | c;
         endmodule",
    );
    assert_eq!(m.assignments["y"].rhs(), &or(var("t"), var("c")));
    assert_eq!(m.output_names(), ["y"]);
    assert_eq!(names(&m.free_vars()), set(&["a", "b", "c", "t"]));
}
