use anyhow::Result;
use colored::Colorize;

use super::Workspace;
use crate::project::{Project, COMPONENT_ROOT, LAYOUT_ROOT};

pub fn execute(config_path: &str, id: &str) -> Result<()> {
    let workspace = Workspace::open(config_path)?;
    let project = workspace.load(id)?;
    print!("{}", render(&project));
    Ok(())
}

/// Indented outline of both roots; instances show their target
pub fn render(project: &Project) -> String {
    let mut out = String::new();
    for root in [COMPONENT_ROOT, LAYOUT_ROOT] {
        out.push_str(&format!("{}\n", root.bold()));
        render_children(project, root, 1, &mut out);
    }
    out
}

fn render_children(project: &Project, parent: &str, depth: usize, out: &mut String) {
    for child in project.get_children(parent) {
        let label = match child.instance_of() {
            Some(target) => format!("-> {}", target),
            None => child.class().to_string(),
        };
        let marker = if child.is_extended() { " *" } else { "" };
        out.push_str(&format!(
            "{}{} {}{}\n",
            "  ".repeat(depth),
            child.name(),
            label.dimmed(),
            marker
        ));
        render_children(project, child.name(), depth + 1, out);
    }
}
