//! Views of logictree IR for people and tools.
//!
//! - [`tree`]: the serializable view tree and its JSON form.
//! - [`dot`]: Graphviz text, plus PNG/SVG rendering through the `dot` binary.
//! - [`pretty`]: indented dumps, box-drawing trees and one-line expression forms.

#![warn(missing_docs)]

pub mod dot;
pub mod error;
pub mod pretty;
pub mod tree;

pub use dot::{render_dot, render_dot_with, to_dot, to_dot_module, tree_to_dot, ImageFormat};
pub use error::{ExportError, ExportResult};
pub use pretty::{ascii_tree, explain_expr, pretty_print, symbolic_expr};
pub use tree::{module_to_json, module_trees, to_json, to_json_string, to_tree, TreeBuilder, TreeNode};
