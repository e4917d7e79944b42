//! Logic hashing across the full pipeline: equal functions hash equally
//! whatever their source shape.

use logictree_canon::{canonical_string, logic_hash, Golden, GoldenVerdict};
use logictree_config::LogictreeConfig;
use logictree_conformance::{lower_one, make_config, prepared_output};
use logictree_ir::build::*;
use logictree_ir::only_primitives;
use logictree_transform::to_primitives;

fn primitives() -> LogictreeConfig {
    make_config("[transform]\nprimitives = true\nsimplify = true\n")
}

#[test]
fn de_morgan_forms_hash_equally() {
    let m = lower_one(
        "module dm(input a, b, output y, output z);
           assign y = a & b;
           assign z = ~(~a | ~b);
         endmodule",
    );
    let config = primitives();
    let y = prepared_output(&m, "y", &config);
    let z = prepared_output(&m, "z", &config);
    assert!(only_primitives(&y));
    assert!(only_primitives(&z));
    assert_eq!(logic_hash(&y).unwrap(), logic_hash(&z).unwrap());
    assert_eq!(canonical_string(&y).unwrap(), canonical_string(&z).unwrap());
}

#[test]
fn xor_and_its_sum_of_products_hash_equally() {
    let m = lower_one(
        "module x(input a, b, output p, output q);
           assign p = a ^ b;
           assign q = (a & ~b) | (~a & b);
         endmodule",
    );
    let config = primitives();
    let p = prepared_output(&m, "p", &config);
    let q = prepared_output(&m, "q", &config);
    assert_eq!(logic_hash(&p).unwrap(), logic_hash(&q).unwrap());
}

#[test]
fn different_functions_hash_differently() {
    let m = lower_one(
        "module d(input a, b, output y, output z);
           assign y = a & b;
           assign z = a | b;
         endmodule",
    );
    let config = LogictreeConfig::default();
    let y = prepared_output(&m, "y", &config);
    let z = prepared_output(&m, "z", &config);
    assert_ne!(logic_hash(&y).unwrap(), logic_hash(&z).unwrap());
}

#[test]
fn intermediate_signals_are_inlined_before_hashing() {
    let m = lower_one(
        "module chain(input a, b, c, output y);
           wire t;
           assign t = a & b;
           assign y = t | c;
         endmodule",
    );
    let y = prepared_output(&m, "y", &LogictreeConfig::default());
    let flat = or(and(var("a"), var("b")), var("c"));
    assert_eq!(logic_hash(&y).unwrap(), logic_hash(&flat).unwrap());
}

#[test]
fn literal_comparison_matches_its_bit_form() {
    let m = lower_one("module cmp(input [1:0] s, output y); assign y = (s == 2'b10); endmodule");
    let y = prepared_output(&m, "y", &LogictreeConfig::default());
    let s = vec_var("s", 2);
    let by_hand = not(or(not(bit_select(s.clone(), 1)), bit_select(s, 0)));
    assert_eq!(
        logic_hash(&y).unwrap(),
        logic_hash(&to_primitives(&by_hand)).unwrap()
    );
}

#[test]
fn golden_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let m = lower_one("module and2(input b, a, output y); assign y = a & b; endmodule");
    let y = prepared_output(&m, "y", &LogictreeConfig::default());
    let golden = Golden::capture("and2", &y, &m.declared_inputs()).unwrap();
    assert_eq!(golden.inputs.decl, ["b", "a"]);
    assert_eq!(golden.inputs.flat, ["a", "b"]);

    let path = golden.save(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("and2.json"));
    let stored = Golden::load(&path).unwrap();
    assert_eq!(stored, golden);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["name"], "and2");
    assert!(json["hash"].is_string());
    assert!(json["expr"].as_str().unwrap().starts_with("ite("));
    assert!(json["inputs"]["flat"].is_array());

    let rewritten = lower_one("module and2(input b, a, output y); assign y = ~(~a | ~b); endmodule");
    let fresh = Golden::capture(
        "and2",
        &prepared_output(&rewritten, "y", &primitives()),
        &rewritten.declared_inputs(),
    )
    .unwrap();
    assert_eq!(fresh.compare(&stored), GoldenVerdict::Match);

    let widened = Golden::capture("and2", &and(var("a"), var("c")), &[]).unwrap();
    assert!(matches!(
        widened.compare(&stored),
        GoldenVerdict::InputsChanged { .. }
    ));

    let changed = Golden::capture("and2", &or(var("a"), var("b")), &[]).unwrap();
    assert!(matches!(
        changed.compare(&stored),
        GoldenVerdict::HashMismatch { .. }
    ));
}
