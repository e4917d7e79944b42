//! Exported views of lowered modules.

use logictree_conformance::lower_one;
use logictree_export::{ascii_tree, module_to_json, pretty_print, to_dot_module, TreeBuilder};
use logictree_ir::NodeRef;

#[test]
fn json_carries_source_text_and_depths() {
    let m = lower_one("module m(input a, b, c, output y); assign y = (a & b) | c; endmodule");
    let value = module_to_json(&m).unwrap();
    assert_eq!(value["module"], "m");
    let y = &value["assignments"]["y"];
    assert_eq!(y["type"], "LogicAssign");
    assert_eq!(y["expr_source"], "assign y = (a & b) | c;");
    assert_eq!(y["depth"], 3);
    let or = &y["children"][0];
    assert_eq!(or["type"], "Or");
    assert_eq!(or["children"].as_array().map(Vec::len), Some(2));
}

#[test]
fn ascii_and_dot_draw_the_same_tree() {
    let m = lower_one("module m(input a, b, output y); assign y = a ^ b; endmodule");
    let tree = TreeBuilder::new(&m.overlay).assign(&m.assignments["y"]);
    let ascii = ascii_tree(&tree);
    assert_eq!(ascii.lines().count(), tree.len());

    let dot = to_dot_module(&m, &[]);
    assert!(dot.starts_with("digraph \"m\" {"));
    assert_eq!(dot.matches("->").count(), tree.len() - 1);
}

#[test]
fn pretty_print_keeps_procedural_structure() {
    let m = lower_one(
        "module m(input c, a, b, output reg y);
           always_comb if (c) y = a; else y = b;
         endmodule",
    );
    let text = pretty_print(NodeRef::Stmt(&m.drivers["y"]));
    assert!(text.starts_with("IF:\n condition:\n  c\n"), "{text}");
    assert_eq!(text.matches("ASSIGN: y").count(), 2, "{text}");
}
