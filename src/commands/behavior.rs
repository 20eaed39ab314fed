use anyhow::Result;
use colored::Colorize;

use super::Workspace;
use crate::component::Param;
use crate::events::{EventBinding, EventTable};

#[derive(Default)]
pub struct EventArgs<'a> {
    pub code: Option<&'a str>,
    pub local: bool,
    pub buffer: Option<u32>,
    pub params: Option<&'a str>,
    pub rename: Option<&'a str>,
    pub remove: bool,
}

pub fn event(config_path: &str, id: &str, object: &str, event: &str, args: EventArgs<'_>) -> Result<()> {
    let mut workspace = Workspace::open(config_path)?;
    let mut action = "Updated";

    workspace.update(id, |project| {
        let class = project.effective_class(project.get_object(object)?).to_string();
        let declared = project.capabilities().event_params(&class, event).is_some();
        let events = project.events_mut();

        if args.remove {
            if !events.event_exists(object, event) {
                anyhow::bail!("Object '{}' has no handler for '{}'", object, event);
            }
            events.remove_object_event(object, event);
            action = "Removed";
            return Ok(());
        }
        if let Some(new_name) = args.rename {
            events.rename_local_event(object, event, new_name)?;
            action = "Renamed";
            return Ok(());
        }

        let mut binding = match events.get_event_info(object, event) {
            Some(existing) => existing.clone(),
            None if declared || args.local => {
                action = "Added";
                EventBinding::new("")
            }
            None => anyhow::bail!(
                "Class {} has no event '{}'. Use --local to declare a custom event",
                class,
                event
            ),
        };
        if let Some(code) = args.code {
            binding.code = code.to_string();
        }
        if let Some(params) = args.params {
            binding.params = Some(Param::parse_list(params));
        }
        if args.buffer.is_some() {
            binding.buffer = args.buffer;
        }
        binding.local = binding.local || (args.local && !declared);
        events.set_event(object, event, binding);
        Ok(())
    })?;

    println!("     {} event `{}.{}`", action.green().bold(), object, event);
    Ok(())
}

#[derive(Default)]
pub struct MethodArgs<'a> {
    pub params: Option<&'a str>,
    pub code: Option<&'a str>,
    pub description: Option<&'a str>,
    pub rename: Option<&'a str>,
    pub remove: bool,
}

pub fn method(config_path: &str, id: &str, object: &str, name: &str, args: MethodArgs<'_>) -> Result<()> {
    let mut workspace = Workspace::open(config_path)?;
    let mut action = "Updated";
    let mut signature = String::new();

    workspace.update(id, |project| {
        project.get_object(object)?;
        let methods = project.methods_mut();

        if args.remove {
            if !methods.method_exists(object, name) {
                anyhow::bail!("Object '{}' has no method '{}'", object, name);
            }
            methods.remove_method(object, name);
            action = "Removed";
            return Ok(());
        }
        if let Some(new_name) = args.rename {
            methods.rename_method(object, name, new_name)?;
            action = "Renamed";
            return Ok(());
        }

        if !methods.method_exists(object, name) {
            action = "Added";
            methods.add_method(object, name, Vec::new(), "")?;
        }
        let item = methods
            .get_object_method_mut(object, name)
            .ok_or_else(|| anyhow::anyhow!("Method '{}' of '{}' vanished", name, object))?;
        if let Some(params) = args.params {
            item.set_params(Param::parse_list(params));
        }
        if let Some(code) = args.code {
            item.set_code(code);
        }
        if let Some(description) = args.description {
            item.set_description(description);
        }
        signature = EventTable::params_to_string(item.params());
        Ok(())
    })?;

    println!("     {} method `{}.{}({})`", action.green().bold(), object, name, signature);
    Ok(())
}
