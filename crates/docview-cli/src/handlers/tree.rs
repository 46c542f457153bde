use crate::types::OutputFormat;
use anyhow::Result;
use docview_engine::load_tree;
use docview_runtime::AppConfig;
use docview_types::DocumentNode;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

pub fn handle(config: &AppConfig, format: OutputFormat) -> Result<()> {
    let root = config.root_path()?;
    let tree = load_tree(&root, &config.filter())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
        OutputFormat::Plain => print!("{}", render_tree(&tree, std::io::stdout().is_terminal())),
    }
    Ok(())
}

pub fn render_tree(tree: &DocumentNode, color: bool) -> String {
    let mut out = String::new();
    out.push_str(&dir_label(&tree.name, color));
    out.push('\n');
    push_children(&mut out, &tree.children, "", color);

    let count = tree.document_count();
    let summary = format!(
        "{} document{}",
        count,
        if count == 1 { "" } else { "s" }
    );
    if color {
        out.push_str(&summary.dimmed().to_string());
    } else {
        out.push_str(&summary);
    }
    out.push('\n');
    out
}

fn push_children(out: &mut String, children: &[DocumentNode], prefix: &str, color: bool) {
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        let branch = if last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(branch);
        if child.is_dir {
            out.push_str(&dir_label(&child.name, color));
        } else {
            out.push_str(&child.name);
        }
        out.push('\n');

        if child.is_dir {
            let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
            push_children(out, &child.children, &nested, color);
        }
    }
}

fn dir_label(name: &str, color: bool) -> String {
    let label = format!("{}/", name);
    if color {
        label.blue().bold().to_string()
    } else {
        label
    }
}
