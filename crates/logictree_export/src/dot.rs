//! Graphviz output.

use crate::error::{ExportError, ExportResult};
use crate::tree::{to_tree, TreeNode, TreeBuilder};
use logictree_ir::{Module, NodeRef};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Stdio};

/// Image formats `dot` can produce for us.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    /// `-Tpng`
    Png,
    /// `-Tsvg`
    Svg,
}

impl ImageFormat {
    /// Format name as passed to `-T` and used as file extension.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

struct DotWriter {
    out: String,
    next_id: usize,
}

impl DotWriter {
    fn new(name: &str) -> Self {
        let mut out = String::new();
        let _ = writeln!(out, "digraph \"{}\" {{", escape(name));
        let _ = writeln!(out, "  node [shape=box, fontname=\"monospace\"];");
        Self { out, next_id: 0 }
    }

    fn tree(&mut self, t: &TreeNode, indent: &str) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        let _ = writeln!(self.out, "{indent}n{id} [label=\"{}\"];", escape(&t.label));
        for child in &t.children {
            let cid = self.tree(child, indent);
            let _ = writeln!(self.out, "{indent}n{id} -> n{cid};");
        }
        id
    }

    fn cluster(&mut self, index: usize, name: &str, t: &TreeNode) {
        let _ = writeln!(self.out, "  subgraph cluster_{index} {{");
        let _ = writeln!(self.out, "    label=\"{}\";", escape(name));
        self.tree(t, "    ");
        let _ = writeln!(self.out, "  }}");
    }

    fn finish(mut self) -> String {
        self.out.push_str("}\n");
        self.out
    }
}

/// DOT text for a view tree.
pub fn tree_to_dot(tree: &TreeNode, name: &str) -> String {
    let mut w = DotWriter::new(name);
    w.tree(tree, "  ");
    w.finish()
}

/// DOT text for the tree rooted at `node`: one box per node, edges from
/// parent to child.
pub fn to_dot(node: NodeRef<'_>, name: &str) -> String {
    tree_to_dot(&to_tree(node), name)
}

/// DOT text for a module, one cluster per selected output.
///
/// `outputs` empty selects the module's outputs.
pub fn to_dot_module(module: &Module, outputs: &[String]) -> String {
    let builder = TreeBuilder::new(&module.overlay);
    let mut w = DotWriter::new(&module.name);
    for (i, (name, assign)) in module.selected_outputs(outputs).into_iter().enumerate() {
        w.cluster(i, name, &builder.assign(assign));
    }
    w.finish()
}

/// Renders DOT text to an image with the Graphviz `dot` binary.
pub fn render_dot(dot: &str, format: ImageFormat, out: &Path) -> ExportResult<()> {
    render_dot_with("dot", dot, format, out)
}

/// [`render_dot`] with an explicit Graphviz executable.
pub fn render_dot_with(
    program: &str,
    dot: &str,
    format: ImageFormat,
    out: &Path,
) -> ExportResult<()> {
    let spawned = Command::new(program)
        .arg(format!("-T{}", format.as_str()))
        .arg("-o")
        .arg(out)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExportError::GraphvizMissing {
                format: format.as_str().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(dot.as_bytes())?;
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(ExportError::Graphviz {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    log::info!("rendered {} to {}", format.as_str(), out.display());
    Ok(())
}
