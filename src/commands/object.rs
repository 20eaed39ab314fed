use anyhow::Result;
use colored::Colorize;

use super::{parse_key_value, Workspace};
use crate::component::{ComponentDescriptor, PropertyValue};
use crate::editor::Editor;
use crate::project::LAYOUT_ROOT;

pub struct AddArgs<'a> {
    pub name: &'a str,
    pub class: Option<&'a str>,
    pub parent: Option<&'a str>,
    pub properties: &'a [String],
    pub instance_of: Option<&'a str>,
}

pub fn add(config_path: &str, id: &str, args: AddArgs<'_>) -> Result<()> {
    let properties = args
        .properties
        .iter()
        .map(|raw| parse_key_value(raw))
        .collect::<Result<Vec<_>>>()?;
    let parent = args.parent.unwrap_or(LAYOUT_ROOT);
    let class = match (args.class, args.instance_of) {
        (_, Some(target)) => format!("instance of {}", target),
        (Some(class), None) => class.to_string(),
        (None, None) => anyhow::bail!("Missing component class for '{}'", args.name),
    };

    let mut workspace = Workspace::open(config_path)?;
    let mut placed = String::new();
    workspace.update(id, |project| {
        match args.instance_of {
            Some(target) => {
                Editor::new(project).add_instance(parent, args.name, target)?;
                for (key, value) in &properties {
                    project.set_property(args.name, key, PropertyValue::parse(value))?;
                }
            }
            None => {
                let descriptor = properties.iter().fold(
                    ComponentDescriptor::new(args.name, class.as_str()),
                    |descriptor, (key, value)| descriptor.with_property(key.as_str(), PropertyValue::parse(value)),
                );
                project.add_object(parent, descriptor)?;
            }
        }
        placed = project.get_parent(args.name).unwrap_or(LAYOUT_ROOT).to_string();
        Ok(())
    })?;

    if placed != parent {
        println!(
            "{} `{}` cannot live under `{}`, placed under `{}`",
            "warning:".yellow().bold(),
            args.name,
            parent,
            placed
        );
    }
    println!("       {} `{}` ({}) under `{}`", "Added".green().bold(), args.name, class, placed);
    Ok(())
}

pub fn remove(config_path: &str, id: &str, name: &str) -> Result<()> {
    let mut workspace = Workspace::open(config_path)?;
    workspace.update(id, |project| {
        Editor::new(project).remove_with_references(name)?;
        Ok(())
    })?;
    println!("     {} `{}`", "Removed".green().bold(), name);
    Ok(())
}

pub fn move_object(config_path: &str, id: &str, name: &str, parent: &str, order: Option<&str>) -> Result<()> {
    let order: Vec<String> = order
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut workspace = Workspace::open(config_path)?;
    workspace.update(id, |project| {
        Editor::new(project).move_object(name, parent, &order)?;
        Ok(())
    })?;
    println!("       {} `{}` under `{}`", "Moved".green().bold(), name, parent);
    Ok(())
}

pub fn rename(config_path: &str, id: &str, name: &str, new_name: &str) -> Result<()> {
    let mut workspace = Workspace::open(config_path)?;
    workspace.update(id, |project| {
        Editor::new(project).rename_object(name, new_name)?;
        Ok(())
    })?;
    println!("     {} `{}` to `{}`", "Renamed".green().bold(), name, new_name);
    Ok(())
}

/// Generate an edit window with a form and save/cancel toolbar
pub fn window_form(config_path: &str, id: &str, base: &str) -> Result<()> {
    let mut workspace = Workspace::open(config_path)?;
    let mut window = String::new();
    workspace.update(id, |project| {
        window = Editor::new(project).create_window_form(base)?.window;
        Ok(())
    })?;
    println!("     {} edit window `{}`", "Created".green().bold(), window);
    Ok(())
}
