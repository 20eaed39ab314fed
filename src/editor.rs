/// Designer actions built on top of `Project`
///
/// These are the operations a designer UI triggers directly: they keep
/// cross-object references (instances, store and model links) consistent,
/// which the project itself leaves to its caller.

use crate::capabilities::RootPin;
use crate::component::{ComponentDescriptor, PropertyValue};
use crate::error::{DesignerError, Entity, Result};
use crate::events::EventBinding;
use crate::project::{is_root, is_valid_name, Project, COMPONENT_ROOT, LAYOUT_ROOT};

/// Names of the objects created by `Editor::create_window_form`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowForm {
    pub window: String,
    pub docked: String,
    pub toolbar: String,
    pub save_button: String,
    pub cancel_button: String,
    pub form: String,
}

pub struct Editor<'a> {
    project: &'a mut Project,
}

impl<'a> Editor<'a> {
    pub fn new(project: &'a mut Project) -> Self {
        Editor { project }
    }

    pub fn project(&self) -> &Project {
        &*self.project
    }

    /// Remove an object, every instance aliasing it or its subtree, and clear
    /// reference properties that pointed at any removed object.
    pub fn remove_with_references(&mut self, name: &str) -> Result<()> {
        if is_root(name) {
            return Err(DesignerError::invalid(format!("'{}' is a fixed root", name)));
        }
        self.project.get_object(name)?;

        let mut removed = vec![name.to_string()];
        removed.extend(self.project.tree().get_children_recursive(name));

        let instances: Vec<String> = removed
            .iter()
            .flat_map(|n| self.project.instances_of(n))
            .filter(|instance| !removed.contains(instance))
            .collect();

        // (name, reference property) of everything about to disappear
        let references: Vec<(String, String)> = removed
            .iter()
            .chain(instances.iter())
            .filter_map(|n| {
                let descriptor = self.project.get_object(n).ok()?;
                let class = self.project.effective_class(descriptor);
                let property = self.project.capabilities().reference_property(class)?;
                Some((n.clone(), property.to_string()))
            })
            .collect();

        self.project.remove_object(name)?;
        for instance in instances {
            if self.project.object_exists(&instance) {
                self.project.remove_object(&instance)?;
            }
        }

        for node in self.project.tree_mut().items_mut() {
            let Some(descriptor) = node.data.as_object_mut() else {
                continue;
            };
            for (target, property) in &references {
                if descriptor.get(property).and_then(PropertyValue::as_str) == Some(target.as_str()) {
                    descriptor.remove_property(property);
                    tracing::debug!(object = %node.id, property = %property, target = %target, "reference cleared");
                }
            }
        }
        Ok(())
    }

    /// Move an object under `new_parent` and apply a sibling order given as names.
    pub fn move_object(&mut self, name: &str, new_parent: &str, order: &[String]) -> Result<()> {
        if is_root(name) {
            return Err(DesignerError::invalid(format!("'{}' is a fixed root", name)));
        }
        let descriptor = self.project.get_object(name)?;
        if !self.project.object_exists(new_parent) {
            return Err(DesignerError::not_found(Entity::Object, new_parent));
        }

        let old_parent = self.project.get_parent(name).map(str::to_string);
        let class = self.project.effective_class(descriptor).to_string();
        let is_instance = descriptor.is_instance();
        let caps = self.project.capabilities();

        if old_parent.as_deref() != Some(new_parent) {
            match caps.root_pin(&class) {
                RootPin::ComponentRoot if !is_instance => {
                    return Err(DesignerError::invalid(format!("'{}' must stay a component", name)));
                }
                RootPin::AnyRoot if !is_root(new_parent) => {
                    return Err(DesignerError::invalid(format!(
                        "'{}' can only be placed directly under a root",
                        name
                    )));
                }
                _ => {}
            }
            if is_instance && new_parent == COMPONENT_ROOT {
                return Err(DesignerError::invalid(format!(
                    "instance '{}' cannot become a component",
                    name
                )));
            }
            if old_parent.as_deref() == Some(COMPONENT_ROOT) && self.project.has_instances(name) {
                return Err(DesignerError::invalid(format!(
                    "'{}' has instances and must stay a component",
                    name
                )));
            }
            self.project.change_parent(name, new_parent)?;
        }

        let extended = new_parent == COMPONENT_ROOT && !is_instance;
        self.project.get_object_mut(name)?.set_extended(extended);

        for (index, sibling) in order.iter().enumerate() {
            if self.project.get_parent(sibling) == Some(new_parent) {
                self.project.set_item_order(sibling, index as i64)?;
            } else {
                tracing::warn!(object = %sibling, parent = new_parent, "not a child of the target, order ignored");
            }
        }
        self.project.resort_items(Some(new_parent));
        tracing::debug!(object = name, parent = new_parent, "object sorted");
        Ok(())
    }

    /// Add an instance of an extended component
    pub fn add_instance(&mut self, parent: &str, name: &str, target: &str) -> Result<()> {
        self.project.get_object(target)?;
        if !self.project.is_extended_component(target) {
            return Err(DesignerError::invalid(format!(
                "'{}' is not an extended component",
                target
            )));
        }
        self.project
            .add_object(parent, ComponentDescriptor::instance(name, target))
    }

    /// Rename an object and repoint everything that refers to it by name
    pub fn rename_object(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let descriptor = self.project.get_object(old_name)?;
        if old_name == new_name {
            return Ok(());
        }
        if !is_valid_name(new_name) {
            return Err(DesignerError::invalid(format!("'{}' is not a valid object name", new_name)));
        }
        if self.project.object_exists(new_name) {
            return Err(DesignerError::conflict(Entity::Object, new_name));
        }

        let class = self.project.effective_class(descriptor).to_string();
        let capabilities = self.project.capabilities_arc();
        let reference = capabilities.reference_property(&class).map(str::to_string);

        self.project.tree_mut().rename_item(old_name, new_name)?;
        self.project.get_object_mut(new_name)?.set_name(new_name);
        self.project.events_mut().rename_object(old_name, new_name);
        self.project.methods_mut().rename_object(old_name, new_name);

        for node in self.project.tree_mut().items_mut() {
            let Some(descriptor) = node.data.as_object_mut() else {
                continue;
            };
            if descriptor.instance_of() == Some(old_name) {
                descriptor.set_instance_of(new_name);
            }
            if let Some(property) = &reference {
                if descriptor.get(property).and_then(PropertyValue::as_str) == Some(old_name) {
                    descriptor
                        .set_property(capabilities.as_ref(), property, PropertyValue::from(new_name))?;
                }
            }
        }
        tracing::debug!(old_name, new_name, "object renamed");
        Ok(())
    }

    /// Generate an edit window: window, bottom toolbar with save and cancel
    /// buttons, and an empty form. Names are derived from `base` and made unique.
    pub fn create_window_form(&mut self, base: &str) -> Result<WindowForm> {
        if !is_valid_name(base) {
            return Err(DesignerError::invalid(format!("'{}' is not a valid object name", base)));
        }

        // Built on a copy so a failure halfway leaves the project untouched
        let mut draft = self.project.clone();

        let window = draft.unique_id(base);
        let names = WindowForm {
            docked: unique_from(&draft, &window, "Docked"),
            toolbar: unique_from(&draft, &window, "Toolbar"),
            save_button: unique_from(&draft, &window, "SaveBtn"),
            cancel_button: unique_from(&draft, &window, "CancelBtn"),
            form: unique_from(&draft, &window, "Form"),
            window,
        };
        let fill = unique_from(&draft, &names.window, "Fill");

        draft.add_object(
            COMPONENT_ROOT,
            ComponentDescriptor::new(names.window.as_str(), "Window")
                .with_property("width", 600i64)
                .with_property("height", 400i64)
                .with_property("layout", "fit")
                .with_property("modal", true),
        )?;
        draft.add_object(&names.window, ComponentDescriptor::new(names.docked.as_str(), "Docked"))?;
        draft.add_object(
            &names.docked,
            ComponentDescriptor::new(names.toolbar.as_str(), "Toolbar")
                .with_property("dock", "bottom")
                .with_property("ui", "footer"),
        )?;
        draft.add_object(&names.toolbar, ComponentDescriptor::new(fill.as_str(), "Toolbar_Fill"))?;
        for (button, text) in [(&names.save_button, "SAVE"), (&names.cancel_button, "CANCEL")] {
            draft.add_object(
                &names.toolbar,
                ComponentDescriptor::new(button.as_str(), "Button")
                    .with_property("text", format!("[js:]appLang.{}", text))
                    .with_property("minWidth", 80i64),
            )?;
        }
        draft.add_object(
            &names.window,
            ComponentDescriptor::new(names.form.as_str(), "Form")
                .with_property("bodyPadding", 5i64)
                .with_property("layout", "anchor"),
        )?;

        let events = draft.events_mut();
        events.set_event(&names.save_button, "click", EventBinding::new("this.onSaveData();"));
        events.set_event(&names.cancel_button, "click", EventBinding::new("this.close();"));
        events.set_event(&names.window, "dataSaved", EventBinding::new("").local());

        let code = format!(
            "var form = this.childObjects.{}.getForm();\nif (!form.isValid()) {{\n    return;\n}}\nthis.fireEvent(\"dataSaved\");\nthis.close();",
            names.form
        );
        draft
            .methods_mut()
            .add_method(&names.window, "onSaveData", Vec::new(), code)?
            .set_description("Validate the form and notify listeners");

        *self.project = draft;
        tracing::debug!(window = %names.window, "edit window created");
        Ok(names)
    }
}

fn unique_from(project: &Project, window: &str, suffix: &str) -> String {
    project.unique_id(&format!("{}{}", window, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str, class: &str) -> ComponentDescriptor {
        ComponentDescriptor::new(name, class)
    }

    #[test]
    fn test_remove_with_references() {
        let mut project = Project::new();
        project.add_object(COMPONENT_ROOT, object("users", "Store")).unwrap();
        project
            .add_object(LAYOUT_ROOT, object("grid", "Grid").with_property("store", "users"))
            .unwrap();
        project.add_object(LAYOUT_ROOT, ComponentDescriptor::instance("usersCopy", "users")).unwrap();

        Editor::new(&mut project).remove_with_references("users").unwrap();

        assert!(!project.object_exists("users"));
        assert!(!project.object_exists("usersCopy"));
        assert!(project.get_object("grid").unwrap().get("store").is_none());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_remove_clears_references_to_removed_instances() {
        let mut project = Project::new();
        project.add_object(COMPONENT_ROOT, object("users", "Store")).unwrap();
        project.add_object(LAYOUT_ROOT, ComponentDescriptor::instance("usersCopy", "users")).unwrap();
        project
            .add_object(LAYOUT_ROOT, object("grid", "Grid").with_property("store", "usersCopy"))
            .unwrap();

        Editor::new(&mut project).remove_with_references("users").unwrap();

        assert!(!project.object_exists("usersCopy"));
        assert!(project.get_object("grid").unwrap().get("store").is_none());
    }

    #[test]
    fn test_move_object_applies_order() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("a", "Panel")).unwrap();
        project.add_object(LAYOUT_ROOT, object("b", "Panel")).unwrap();
        project.add_object("a", object("x", "Panel")).unwrap();

        let order = vec!["x".to_string(), "b".to_string()];
        Editor::new(&mut project).move_object("x", "b", &order).unwrap();
        assert_eq!(project.get_parent("x"), Some("b"));

        let order = vec!["b".to_string(), "a".to_string()];
        Editor::new(&mut project).move_object("b", LAYOUT_ROOT, &order).unwrap();
        assert_eq!(project.child_names(LAYOUT_ROOT), vec!["b", "a"]);
    }

    #[test]
    fn test_move_object_rules() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("panel", "Panel")).unwrap();
        project.add_object(LAYOUT_ROOT, object("store", "Store")).unwrap();
        project.add_object(COMPONENT_ROOT, object("form", "Form")).unwrap();
        project.add_object(LAYOUT_ROOT, ComponentDescriptor::instance("formView", "form")).unwrap();
        project.add_object(COMPONENT_ROOT, object("win", "Window")).unwrap();

        let mut editor = Editor::new(&mut project);
        assert!(editor.move_object("store", "panel", &[]).is_err());
        assert!(editor.move_object("formView", COMPONENT_ROOT, &[]).is_err());
        assert!(editor.move_object("form", LAYOUT_ROOT, &[]).is_err());
        assert!(editor.move_object("win", LAYOUT_ROOT, &[]).is_err());
        assert!(editor.move_object("panel", "ghost", &[]).unwrap_err().is_not_found());

        editor.move_object("store", COMPONENT_ROOT, &[]).unwrap();
        editor.move_object("panel", COMPONENT_ROOT, &[]).unwrap();
        assert!(project.get_object("store").unwrap().is_extended());
        assert!(project.get_object("panel").unwrap().is_extended());
        assert_eq!(project.get_parent("form"), Some(COMPONENT_ROOT));
    }

    #[test]
    fn test_add_instance_requires_extended_target() {
        let mut project = Project::new();
        project.add_object(COMPONENT_ROOT, object("form", "Form")).unwrap();
        project.add_object(LAYOUT_ROOT, object("panel", "Panel")).unwrap();

        let mut editor = Editor::new(&mut project);
        editor.add_instance("panel", "formView", "form").unwrap();
        assert!(editor.add_instance(LAYOUT_ROOT, "panelView", "panel").is_err());
        assert!(editor.add_instance(LAYOUT_ROOT, "ghostView", "ghost").unwrap_err().is_not_found());
        assert_eq!(project.get_parent("formView"), Some("panel"));
    }

    #[test]
    fn test_rename_object_repoints_references() {
        let mut project = Project::new();
        project.add_object(COMPONENT_ROOT, object("users", "Store")).unwrap();
        project
            .add_object(LAYOUT_ROOT, object("grid", "Grid").with_property("store", "users"))
            .unwrap();
        project.add_object(LAYOUT_ROOT, ComponentDescriptor::instance("copy", "users")).unwrap();
        project.events_mut().set_event("users", "load", EventBinding::new("x();"));
        project.methods_mut().add_method("users", "reload", Vec::new(), "").unwrap();

        Editor::new(&mut project).rename_object("users", "people").unwrap();

        assert!(!project.object_exists("users"));
        assert_eq!(project.get_object("people").unwrap().name(), "people");
        assert_eq!(project.get_object("copy").unwrap().instance_of(), Some("people"));
        assert_eq!(
            project.get_object("grid").unwrap().get("store").and_then(PropertyValue::as_str),
            Some("people")
        );
        assert_eq!(project.events().get_event_code("people", "load"), "x();");
        assert!(project.methods().method_exists("people", "reload"));
        assert!(project.validate().is_ok());

        let mut editor = Editor::new(&mut project);
        assert!(editor.rename_object("grid", "copy").unwrap_err().is_conflict());
        assert!(editor.rename_object("ghost", "x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_window_form() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("editUser", "Panel")).unwrap();

        let names = Editor::new(&mut project).create_window_form("editUser").unwrap();

        assert_eq!(names.window, "editUser1");
        assert_eq!(project.get_parent(&names.window), Some(COMPONENT_ROOT));
        assert_eq!(project.get_parent(&names.toolbar), Some(names.docked.as_str()));
        assert_eq!(project.get_parent(&names.form), Some(names.window.as_str()));
        assert_eq!(
            project.events().get_event_code(&names.save_button, "click"),
            "this.onSaveData();"
        );
        assert!(project.events().is_local_event(&names.window, "dataSaved"));
        assert!(project.methods().method_exists(&names.window, "onSaveData"));

        let code = project.get_object_code(&names.window, &[]).unwrap();
        assert!(code.contains("dockedItems: ["));
        assert!(code.contains("onSaveData: function() {"));
    }
}
