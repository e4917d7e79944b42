//! `logictree export`: view trees as ASCII, JSON, DOT or rendered images.

use std::path::{Path, PathBuf};

use logictree_config::LogictreeConfig;
use logictree_export::{
    ascii_tree, module_to_json, render_dot, to_dot_module, ExportResult, ImageFormat, TreeBuilder,
};
use logictree_ir::Module;

use crate::pipeline::{load_modules, selected};
use crate::{ExportArgs, ExportFormat, GlobalArgs};

/// Runs the `logictree export` command.
pub fn run(
    args: &ExportArgs,
    global: &GlobalArgs,
    config: &LogictreeConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(modules) = load_modules(&args.file, global, config)? else {
        return Ok(1);
    };
    let image = match args.format {
        ExportFormat::Png => Some(ImageFormat::Png),
        ExportFormat::Svg => Some(ImageFormat::Svg),
        _ => None,
    };
    if let Some(format) = image {
        for module in &modules {
            let out = image_path(args.out.as_deref(), module, &modules, format);
            render_dot(&to_dot_module(module, &args.outputs), format, &out)?;
            if !global.quiet {
                eprintln!("   Wrote {}", out.display());
            }
        }
        return Ok(0);
    }

    let text = render_text(&modules, args.format, &args.outputs)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, text)?;
            if !global.quiet {
                eprintln!("   Wrote {}", path.display());
            }
        }
        None => print!("{text}"),
    }
    Ok(0)
}

/// Text export of every module.
///
/// JSON is one object for a single module and an array otherwise.
pub fn render_text(
    modules: &[Module],
    format: ExportFormat,
    outputs: &[String],
) -> ExportResult<String> {
    let mut text = String::new();
    match format {
        ExportFormat::Json => {
            let mut values = modules
                .iter()
                .map(module_to_json)
                .collect::<ExportResult<Vec<_>>>()?;
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                serde_json::Value::Array(values)
            };
            text = serde_json::to_string_pretty(&value)?;
            text.push('\n');
        }
        ExportFormat::Dot => {
            for module in modules {
                text.push_str(&to_dot_module(module, outputs));
            }
        }
        ExportFormat::Ascii | ExportFormat::Png | ExportFormat::Svg => {
            for module in modules {
                let builder = TreeBuilder::new(&module.overlay);
                for (_, assign) in selected(module, outputs) {
                    text.push_str(&ascii_tree(&builder.assign(assign)));
                }
            }
        }
    }
    Ok(text)
}

/// Where an image of `module` goes: `--out` for a single module,
/// `<stem>_<module>.<ext>` next to it for several, else
/// `<module>_tree.<ext>`.
pub fn image_path(
    out: Option<&Path>,
    module: &Module,
    modules: &[Module],
    format: ImageFormat,
) -> PathBuf {
    let ext = format.as_str();
    match out {
        Some(path) if modules.len() == 1 => path.to_path_buf(),
        Some(path) => {
            let stem = path
                .file_stem()
                .map_or_else(|| "tree".to_string(), |s| s.to_string_lossy().into_owned());
            path.with_file_name(format!("{stem}_{}.{ext}", module.name))
        }
        None => PathBuf::from(format!("{}_tree.{ext}", module.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_lower::{lower_source, LowerOptions};

    fn modules(src: &str) -> Vec<Module> {
        lower_source(src, &LowerOptions::default()).unwrap()
    }

    #[test]
    fn json_uses_the_tree_field_names() {
        let ms = modules("module m(input a, b, output y); assign y = a ^ b; endmodule");
        let text = render_text(&ms, ExportFormat::Json, &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["module"], "m");
        let y = &value["assignments"]["y"];
        assert_eq!(y["type"], "LogicAssign");
        assert!(y["children"].is_array());
        assert!(y.get("depth").is_some());
        assert!(y.get("delay").is_some());
    }

    #[test]
    fn several_modules_export_as_an_array() {
        let ms = modules(
            "module p(input a, output y); assign y = a; endmodule
             module q(input a, output z); assign z = ~a; endmodule",
        );
        let text = render_text(&ms, ExportFormat::Json, &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn dot_is_one_digraph_per_module() {
        let ms = modules("module m(input a, b, output y); assign y = a & b; endmodule");
        let text = render_text(&ms, ExportFormat::Dot, &[]).unwrap();
        assert!(text.starts_with("digraph \"m\" {"));
        assert!(text.contains("subgraph cluster_0"));
        assert!(text.contains("->"));
    }

    #[test]
    fn ascii_draws_each_selected_output() {
        let ms = modules(
            "module m(input a, b, output y, output z); assign y = a | b; assign z = a; endmodule",
        );
        let text = render_text(&ms, ExportFormat::Ascii, &["y".to_string()]).unwrap();
        assert!(text.starts_with("y = "));
        assert!(!text.contains("z = "));
    }

    #[test]
    fn image_paths() {
        let ms = modules(
            "module p(input a, output y); assign y = a; endmodule
             module q(input a, output z); assign z = a; endmodule",
        );
        assert_eq!(
            image_path(None, &ms[0], &ms, ImageFormat::Png),
            PathBuf::from("p_tree.png")
        );
        assert_eq!(
            image_path(Some(Path::new("out/graph.svg")), &ms[1], &ms, ImageFormat::Svg),
            PathBuf::from("out/graph_q.svg")
        );
        assert_eq!(
            image_path(Some(Path::new("one.png")), &ms[0], &ms[..1], ImageFormat::Png),
            PathBuf::from("one.png")
        );
    }
}
