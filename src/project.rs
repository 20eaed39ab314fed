use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::capabilities::{CapabilityProvider, CapabilityTable, RootPin};
use crate::component::{ComponentDescriptor, PropertyValue};
use crate::error::{DesignerError, Entity, Result};
use crate::events::EventTable;
use crate::methods::MethodTable;
use crate::tree::Tree;

/// Reusable component definitions
pub const COMPONENT_ROOT: &str = "_Component_";
/// Live application layout
pub const LAYOUT_ROOT: &str = "_Layout_";

pub const DEFAULT_NAMESPACE: &str = "appComponents";
pub const DEFAULT_RUN_NAMESPACE: &str = "appApplication";

/// Payload of a project tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectNode {
    /// One of the two fixed synthetic containers
    Root { title: String },
    Object(ComponentDescriptor),
}

impl ProjectNode {
    pub fn as_object(&self) -> Option<&ComponentDescriptor> {
        match self {
            ProjectNode::Object(descriptor) => Some(descriptor),
            ProjectNode::Root { .. } => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ComponentDescriptor> {
        match self {
            ProjectNode::Object(descriptor) => Some(descriptor),
            ProjectNode::Root { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Namespace of generated component classes
    pub namespace: String,
    /// Namespace holding live application objects
    pub runnamespace: String,
    /// Included script and project files
    #[serde(default)]
    pub files: Vec<String>,
    /// Included language packs
    #[serde(default)]
    pub langs: Vec<String>,
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            namespace: DEFAULT_NAMESPACE.to_string(),
            runnamespace: DEFAULT_RUN_NAMESPACE.to_string(),
            files: Vec::new(),
            langs: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_capabilities() -> Arc<dyn CapabilityProvider> {
    Arc::new(CapabilityTable::builtin())
}

/// True for names usable as object identifiers in generated code
pub fn is_valid_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("static pattern"))
        .is_match(name)
}

pub fn is_root(name: &str) -> bool {
    name == COMPONENT_ROOT || name == LAYOUT_ROOT
}

/// Designer project: object tree plus event and method tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    tree: Tree<ProjectNode>,
    #[serde(default)]
    events: EventTable,
    #[serde(default)]
    methods: MethodTable,
    #[serde(default)]
    config: ProjectConfig,
    #[serde(default)]
    action_js: String,
    #[serde(skip, default = "default_capabilities")]
    capabilities: Arc<dyn CapabilityProvider>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    pub fn new() -> Self {
        Self::with_capabilities(default_capabilities())
    }

    pub fn with_capabilities(capabilities: Arc<dyn CapabilityProvider>) -> Self {
        let mut tree = Tree::new();
        for (id, title, order) in [(COMPONENT_ROOT, "Components", -1000), (LAYOUT_ROOT, "Application", -500)] {
            tree.add_item(id, None, ProjectNode::Root { title: title.to_string() }, Some(order))
                .expect("fresh tree holds no roots yet");
        }
        tree.sort_items(None);

        Project {
            tree,
            events: EventTable::new(),
            methods: MethodTable::new(),
            config: ProjectConfig::default(),
            action_js: String::new(),
            capabilities,
        }
    }

    /// Swap the capability catalog, e.g. after restoring a snapshot
    pub fn set_capabilities(&mut self, capabilities: Arc<dyn CapabilityProvider>) {
        self.capabilities = capabilities;
    }

    pub fn capabilities(&self) -> &dyn CapabilityProvider {
        self.capabilities.as_ref()
    }

    pub fn capabilities_arc(&self) -> Arc<dyn CapabilityProvider> {
        Arc::clone(&self.capabilities)
    }

    pub fn is_container(&self, class: &str) -> bool {
        self.capabilities.is_container(class)
    }

    pub fn is_draggable(&self, class: &str) -> bool {
        self.capabilities.is_draggable(class)
    }

    pub fn is_window_component(&self, class: &str) -> bool {
        self.capabilities.is_window_component(class)
    }

    pub fn is_visible_component(&self, class: &str) -> bool {
        self.capabilities.is_visible_component(class)
    }

    pub fn tree(&self) -> &Tree<ProjectNode> {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree<ProjectNode> {
        &mut self.tree
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventTable {
        &mut self.events
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn methods_mut(&mut self) -> &mut MethodTable {
        &mut self.methods
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ProjectConfig {
        &mut self.config
    }

    /// Merge free-form config options; `namespace`/`runnamespace` update the typed fields
    pub fn set_config<I, K, V>(&mut self, options: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in options {
            let (key, value) = (key.into(), value.into());
            match key.as_str() {
                "namespace" => self.config.namespace = value,
                "runnamespace" => self.config.runnamespace = value,
                _ => {
                    self.config.extra.insert(key, value);
                }
            }
        }
    }

    pub fn action_js(&self) -> &str {
        &self.action_js
    }

    pub fn set_action_js(&mut self, code: impl Into<String>) {
        self.action_js = code.into();
    }

    /// Add an object, correcting its parent where the class demands it.
    ///
    /// Root-pinned classes go to their root whatever was requested, a missing
    /// parent falls back to the layout root, and instances never become
    /// components.
    pub fn add_object(&mut self, parent: &str, mut descriptor: ComponentDescriptor) -> Result<()> {
        let name = descriptor.name().to_string();
        if !is_valid_name(&name) {
            return Err(DesignerError::invalid(format!("'{}' is not a valid object name", name)));
        }
        if self.tree.item_exists(&name) {
            return Err(DesignerError::conflict(Entity::Object, name));
        }
        descriptor.validate(self.capabilities())?;

        let pin = match descriptor.instance_of() {
            Some(target) => {
                let target = self.instance_target(target)?;
                match self.capabilities.root_pin(target.class()) {
                    RootPin::AnyRoot => RootPin::AnyRoot,
                    _ => RootPin::Free,
                }
            }
            None => self.capabilities.root_pin(descriptor.class()),
        };

        let mut resolved = if self.tree.item_exists(parent) {
            parent.to_string()
        } else {
            tracing::warn!(object = %name, parent, "parent not found, using layout root");
            LAYOUT_ROOT.to_string()
        };
        match pin {
            RootPin::ComponentRoot => resolved = COMPONENT_ROOT.to_string(),
            RootPin::AnyRoot if !is_root(&resolved) => resolved = LAYOUT_ROOT.to_string(),
            _ => {}
        }
        if descriptor.is_instance() && resolved == COMPONENT_ROOT {
            resolved = LAYOUT_ROOT.to_string();
        }
        if resolved != parent {
            tracing::warn!(object = %name, requested = parent, parent = %resolved, "object redirected");
        }
        self.ensure_can_hold_children(&resolved)?;

        descriptor.set_extended(resolved == COMPONENT_ROOT && !descriptor.is_instance());
        self.tree
            .add_item(name.clone(), Some(&resolved), ProjectNode::Object(descriptor), None)?;
        tracing::debug!(object = %name, parent = %resolved, "object added");
        Ok(())
    }

    /// Remove an object and its subtree together with their events and methods.
    /// References held in other objects' properties are left to the caller.
    pub fn remove_object(&mut self, name: &str) -> Result<()> {
        if is_root(name) {
            return Err(DesignerError::invalid(format!("'{}' is a fixed root", name)));
        }
        if !self.tree.item_exists(name) {
            return Err(DesignerError::not_found(Entity::Object, name));
        }

        let descendants = self.tree.get_children_recursive(name);
        self.events.remove_object_events(name);
        for id in &descendants {
            self.events.remove_object_events(id);
        }
        self.methods.remove_object_methods(name);
        for id in &descendants {
            self.methods.remove_object_methods(id);
        }
        for id in &descendants {
            self.tree.remove_item(id);
        }
        self.tree.remove_item(name);

        tracing::debug!(object = name, descendants = descendants.len(), "object removed");
        Ok(())
    }

    /// Swap the descriptor stored under `name`, keeping its tree position
    /// An instance replacement follows the same rules as adding one.
    pub fn replace_object(&mut self, name: &str, mut descriptor: ComponentDescriptor) -> Result<()> {
        self.get_object(name)?;
        descriptor.validate(self.capabilities())?;
        descriptor.set_name(name);
        let parent = self.tree.parent_id(name).map(str::to_string);

        if let Some(target) = descriptor.instance_of() {
            if target == name {
                return Err(DesignerError::invalid(format!("'{}' cannot be an instance of itself", name)));
            }
            self.instance_target(target)?;
            if self.tree.has_children(name) {
                return Err(DesignerError::invalid(format!(
                    "'{}' has children and cannot become an instance",
                    name
                )));
            }
            if self.has_instances(name) {
                return Err(DesignerError::invalid(format!(
                    "'{}' has instances and cannot become an instance",
                    name
                )));
            }
            if parent.as_deref() == Some(COMPONENT_ROOT) {
                return Err(DesignerError::invalid(format!(
                    "component '{}' cannot become an instance",
                    name
                )));
            }
        }
        descriptor.set_extended(parent.as_deref() == Some(COMPONENT_ROOT) && !descriptor.is_instance());
        self.tree.update_item(name, ProjectNode::Object(descriptor))
    }

    /// Object an instance may point at: it must exist and not be an instance itself
    fn instance_target(&self, target: &str) -> Result<&ComponentDescriptor> {
        let target = self.get_object(target)?;
        if target.is_instance() {
            return Err(DesignerError::invalid(format!(
                "'{}' is itself an instance and cannot be instanced",
                target.name()
            )));
        }
        Ok(target)
    }

    pub fn change_parent(&mut self, name: &str, new_parent: &str) -> Result<()> {
        if is_root(name) {
            return Err(DesignerError::invalid(format!("'{}' is a fixed root", name)));
        }
        if !self.tree.item_exists(new_parent) {
            return Err(DesignerError::not_found(Entity::Object, new_parent));
        }
        self.ensure_can_hold_children(new_parent)?;
        self.tree.change_parent(name, new_parent)?;
        tracing::debug!(object = name, parent = new_parent, "object moved");
        Ok(())
    }

    pub fn set_item_order(&mut self, name: &str, order: i64) -> Result<()> {
        self.tree.set_item_order(name, order)
    }

    /// Resort children of `parent`, or the whole tree when `None`
    pub fn resort_items(&mut self, parent: Option<&str>) {
        self.tree.sort_items(parent);
    }

    /// True for objects and the two roots
    pub fn object_exists(&self, name: &str) -> bool {
        self.tree.item_exists(name)
    }

    pub fn get_object(&self, name: &str) -> Result<&ComponentDescriptor> {
        self.tree
            .get_item(name)
            .ok()
            .and_then(|node| node.data.as_object())
            .ok_or_else(|| DesignerError::not_found(Entity::Object, name))
    }

    pub fn get_object_mut(&mut self, name: &str) -> Result<&mut ComponentDescriptor> {
        self.tree
            .get_item_mut(name)
            .ok()
            .and_then(|node| node.data.as_object_mut())
            .ok_or_else(|| DesignerError::not_found(Entity::Object, name))
    }

    /// Set a property of an object, checked against its class schema
    pub fn set_property(&mut self, name: &str, property: &str, value: PropertyValue) -> Result<()> {
        let capabilities = Arc::clone(&self.capabilities);
        self.get_object_mut(name)?
            .set_property(capabilities.as_ref(), property, value)
    }

    /// Every object keyed by name
    pub fn get_objects(&self) -> BTreeMap<String, &ComponentDescriptor> {
        self.tree
            .items()
            .filter_map(|node| node.data.as_object().map(|d| (node.id.clone(), d)))
            .collect()
    }

    /// Extended components in tree order
    pub fn get_components(&self) -> Vec<&ComponentDescriptor> {
        self.get_children(COMPONENT_ROOT)
    }

    /// Objects of the given classes. Components directly under the component
    /// root are reported as extended regardless of their stored flag.
    pub fn get_objects_by_class(&self, classes: &[&str]) -> BTreeMap<String, ComponentDescriptor> {
        let classes: Vec<String> = classes.iter().map(|c| upper_first(c)).collect();
        self.tree
            .items()
            .filter_map(|node| {
                let descriptor = node.data.as_object()?;
                if !classes.iter().any(|c| c == descriptor.class()) {
                    return None;
                }
                let mut descriptor = descriptor.clone();
                if node.parent.as_deref() == Some(COMPONENT_ROOT) && !descriptor.is_instance() {
                    descriptor.set_extended(true);
                }
                Some((node.id.clone(), descriptor))
            })
            .collect()
    }

    /// Store objects, plus instances whose target is a store
    pub fn get_stores(&self) -> BTreeMap<String, ComponentDescriptor> {
        self.tree
            .items()
            .filter_map(|node| {
                let descriptor = node.data.as_object()?;
                let store = match descriptor.instance_of() {
                    Some(_) => self
                        .resolve_instance(descriptor)
                        .is_some_and(|target| self.capabilities.is_store(target.class())),
                    None => self.capabilities.is_store(descriptor.class()),
                };
                if !store {
                    return None;
                }
                let mut descriptor = descriptor.clone();
                if node.parent.as_deref() == Some(COMPONENT_ROOT) && !descriptor.is_instance() {
                    descriptor.set_extended(true);
                }
                Some((node.id.clone(), descriptor))
            })
            .collect()
    }

    pub fn get_models(&self) -> BTreeMap<String, ComponentDescriptor> {
        self.get_objects_by_class(&["Model"])
    }

    pub fn get_menu(&self) -> BTreeMap<String, ComponentDescriptor> {
        self.get_objects_by_class(&["Menu"])
    }

    pub fn get_grids(&self) -> BTreeMap<String, ComponentDescriptor> {
        self.get_objects_by_class(&["Grid"])
    }

    /// Target of an instance, looked up by name
    pub fn resolve_instance(&self, descriptor: &ComponentDescriptor) -> Option<&ComponentDescriptor> {
        descriptor
            .instance_of()
            .and_then(|target| self.get_object(target).ok())
    }

    /// Class of the object itself, or of its target for instances
    pub fn effective_class<'a>(&'a self, descriptor: &'a ComponentDescriptor) -> &'a str {
        self.resolve_instance(descriptor)
            .map(|target| target.class())
            .unwrap_or_else(|| descriptor.class())
    }

    /// Names of all instances pointing at `name`
    pub fn instances_of(&self, name: &str) -> Vec<String> {
        self.tree
            .items()
            .filter_map(|node| node.data.as_object())
            .filter(|d| d.instance_of() == Some(name))
            .map(|d| d.name().to_string())
            .collect()
    }

    pub fn has_instances(&self, name: &str) -> bool {
        self.tree
            .items()
            .filter_map(|node| node.data.as_object())
            .any(|d| d.instance_of() == Some(name))
    }

    /// Whether `name` currently lives directly under the component root
    pub fn is_extended_component(&self, name: &str) -> bool {
        self.tree.parent_id(name) == Some(COMPONENT_ROOT)
            && self.get_object(name).is_ok_and(|d| !d.is_instance())
    }

    pub fn has_children(&self, name: &str) -> bool {
        self.tree.has_children(name)
    }

    pub fn get_children(&self, name: &str) -> Vec<&ComponentDescriptor> {
        self.tree
            .get_children(name)
            .into_iter()
            .filter_map(|node| node.data.as_object())
            .collect()
    }

    pub fn child_names(&self, name: &str) -> Vec<String> {
        self.tree
            .get_children(name)
            .into_iter()
            .map(|node| node.id.clone())
            .collect()
    }

    /// Parent name, when the parent exists
    pub fn get_parent(&self, name: &str) -> Option<&str> {
        self.tree
            .parent_id(name)
            .filter(|parent| self.tree.item_exists(parent))
    }

    /// Layout containers that can be mounted as top-level views
    pub fn get_root_panels(&self) -> Vec<String> {
        self.get_children(LAYOUT_ROOT)
            .into_iter()
            .filter(|descriptor| {
                let class = self.effective_class(descriptor);
                self.capabilities.lookup(class).is_some_and(|c| c.container)
                    && class != "Window"
                    && class != "Menu"
                    && !self.capabilities.is_window_component(class)
            })
            .map(|descriptor| descriptor.name().to_string())
            .collect()
    }

    /// `prefix` when free, else `prefix` followed by the smallest free number from 1
    pub fn unique_id(&self, prefix: &str) -> String {
        if !self.object_exists(prefix) {
            return prefix.to_string();
        }
        let mut postfix = 1u64;
        loop {
            let candidate = format!("{}{}", prefix, postfix);
            if !self.object_exists(&candidate) {
                return candidate;
            }
            postfix += 1;
        }
    }

    /// Structural check for restored snapshots
    pub fn validate(&self) -> Result<()> {
        self.tree.validate().map_err(DesignerError::DataCorruption)?;

        for root in [COMPONENT_ROOT, LAYOUT_ROOT] {
            match self.tree.get_item(root) {
                Ok(node) if node.parent.is_none() && node.data.as_object().is_none() => {}
                _ => {
                    return Err(DesignerError::DataCorruption(format!(
                        "root container '{}' is missing",
                        root
                    )))
                }
            }
        }

        for node in self.tree.items() {
            match &node.data {
                ProjectNode::Root { .. } if !is_root(&node.id) => {
                    return Err(DesignerError::DataCorruption(format!(
                        "unexpected root container '{}'",
                        node.id
                    )));
                }
                ProjectNode::Object(descriptor) => {
                    if descriptor.name() != node.id {
                        return Err(DesignerError::DataCorruption(format!(
                            "object '{}' is stored under '{}'",
                            descriptor.name(),
                            node.id
                        )));
                    }
                    if node.parent.is_none() {
                        return Err(DesignerError::DataCorruption(format!(
                            "object '{}' has no parent",
                            node.id
                        )));
                    }
                    if let Some(target) = descriptor.instance_of() {
                        if self.get_object(target).is_err() {
                            return Err(DesignerError::DataCorruption(format!(
                                "instance '{}' points at missing object '{}'",
                                node.id, target
                            )));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Instances alias a definition and may not hold children of their own
    fn ensure_can_hold_children(&self, parent: &str) -> Result<()> {
        match self.get_object(parent) {
            Ok(descriptor) if descriptor.is_instance() => Err(DesignerError::invalid(format!(
                "instance '{}' cannot contain objects",
                parent
            ))),
            _ => Ok(()),
        }
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::ClassCapabilities;
    use crate::events::EventBinding;

    fn object(name: &str, class: &str) -> ComponentDescriptor {
        ComponentDescriptor::new(name, class)
    }

    #[test]
    fn test_new_project_has_roots() {
        let project = Project::new();
        let roots: Vec<&str> = project.tree().roots().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec![COMPONENT_ROOT, LAYOUT_ROOT]);
        assert!(project.object_exists(LAYOUT_ROOT));
        assert!(project.get_object(LAYOUT_ROOT).is_err());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_window_redirected_to_component_root() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("win1", "Window")).unwrap();
        assert_eq!(project.get_parent("win1"), Some(COMPONENT_ROOT));
        assert!(project.get_object("win1").unwrap().is_extended());
    }

    #[test]
    fn test_store_pinned_to_a_root() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("panel", "Panel")).unwrap();
        project.add_object("panel", object("store", "Data_Store")).unwrap();
        project.add_object(COMPONENT_ROOT, object("shared", "Store")).unwrap();

        assert_eq!(project.get_parent("store"), Some(LAYOUT_ROOT));
        assert_eq!(project.get_parent("shared"), Some(COMPONENT_ROOT));
    }

    #[test]
    fn test_missing_parent_falls_back_to_layout() {
        let mut project = Project::new();
        project.add_object("nowhere", object("panel", "Panel")).unwrap();
        assert_eq!(project.get_parent("panel"), Some(LAYOUT_ROOT));
        assert!(!project.get_object("panel").unwrap().is_extended());
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("panel", "Panel")).unwrap();
        assert!(project.add_object(LAYOUT_ROOT, object("panel", "Grid")).unwrap_err().is_conflict());
        assert_eq!(project.get_object("panel").unwrap().class(), "Panel");

        assert!(project.add_object(LAYOUT_ROOT, object("bad name", "Panel")).is_err());
        assert!(project.add_object(LAYOUT_ROOT, object(LAYOUT_ROOT, "Panel")).is_err());
    }

    #[test]
    fn test_invalid_property_rejected_before_insert() {
        let mut project = Project::new();
        let panel = object("panel", "Panel").with_property("width", "wide");
        assert!(project.add_object(LAYOUT_ROOT, panel).is_err());
        assert!(!project.object_exists("panel"));
    }

    #[test]
    fn test_remove_object_cascades() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("form", "Form")).unwrap();
        project.add_object("form", object("fieldset", "Form_Fieldset")).unwrap();
        project.add_object("fieldset", object("field", "Form_Field_Text")).unwrap();
        project.events_mut().set_event("field", "change", EventBinding::new("x();"));
        project.methods_mut().add_method("form", "submit", Vec::new(), "").unwrap();

        project.remove_object("form").unwrap();

        for name in ["form", "fieldset", "field"] {
            assert!(!project.object_exists(name));
            assert!(project.events().get_object_events(name).is_empty());
            assert!(project.methods().get_object_methods(name).is_empty());
        }
        assert!(project.validate().is_ok());
        assert!(project.remove_object("form").unwrap_err().is_not_found());
        assert!(project.remove_object(LAYOUT_ROOT).is_err());
    }

    #[test]
    fn test_replace_object_keeps_position() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("main", "Panel")).unwrap();
        project.add_object("main", object("a", "Panel")).unwrap();
        project.add_object("main", object("b", "Panel")).unwrap();

        project.replace_object("a", object("other", "Container")).unwrap();

        assert_eq!(project.get_object("a").unwrap().class(), "Container");
        assert_eq!(project.get_object("a").unwrap().name(), "a");
        assert_eq!(project.child_names("main"), vec!["a", "b"]);
        assert!(project.replace_object("ghost", object("ghost", "Panel")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_replace_with_instance_follows_instance_rules() {
        let mut project = Project::new();
        project.add_object(COMPONENT_ROOT, object("editForm", "Form")).unwrap();
        project.add_object(LAYOUT_ROOT, object("main", "Panel")).unwrap();
        project.add_object("main", object("child", "Panel")).unwrap();
        project.add_object(LAYOUT_ROOT, object("leaf", "Panel")).unwrap();
        project.add_object(LAYOUT_ROOT, ComponentDescriptor::instance("formView", "editForm")).unwrap();

        let err = project
            .replace_object("leaf", ComponentDescriptor::instance("leaf", "ghost"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            project.replace_object("leaf", ComponentDescriptor::instance("leaf", "formView")),
            Err(DesignerError::InvalidOperation(_))
        ));
        assert!(matches!(
            project.replace_object("main", ComponentDescriptor::instance("main", "editForm")),
            Err(DesignerError::InvalidOperation(_))
        ));
        assert!(project.get_object("main").unwrap().instance_of().is_none());

        project
            .replace_object("leaf", ComponentDescriptor::instance("leaf", "editForm"))
            .unwrap();
        assert_eq!(project.instances_of("editForm"), vec!["formView", "leaf"]);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_instances() {
        let mut project = Project::new();
        project.add_object(COMPONENT_ROOT, object("baseStore", "Data_Store")).unwrap();
        project.add_object(COMPONENT_ROOT, object("editForm", "Form")).unwrap();
        project
            .add_object(LAYOUT_ROOT, ComponentDescriptor::instance("storeCopy", "baseStore"))
            .unwrap();
        project
            .add_object(COMPONENT_ROOT, ComponentDescriptor::instance("formCopy", "editForm"))
            .unwrap();

        assert_eq!(project.get_parent("formCopy"), Some(LAYOUT_ROOT));
        assert!(project.has_instances("baseStore"));
        assert!(!project.has_instances("storeCopy"));

        let stores = project.get_stores();
        assert!(stores.contains_key("baseStore"));
        assert!(stores.contains_key("storeCopy"));
        assert!(!stores.contains_key("formCopy"));
        assert!(stores["baseStore"].is_extended());

        let err = project
            .add_object("formCopy", object("inner", "Panel"))
            .unwrap_err();
        assert!(matches!(err, DesignerError::InvalidOperation(_)));

        assert!(project
            .add_object(LAYOUT_ROOT, ComponentDescriptor::instance("dangling", "ghost"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_objects_by_class_tags_extended() {
        let mut project = Project::new();
        project.add_object(COMPONENT_ROOT, object("grid1", "Grid")).unwrap();
        project.add_object(LAYOUT_ROOT, object("grid2", "Grid")).unwrap();
        project.get_object_mut("grid1").unwrap().set_extended(false);

        let grids = project.get_grids();
        assert_eq!(grids.len(), 2);
        assert!(grids["grid1"].is_extended());
        assert!(!grids["grid2"].is_extended());
        assert_eq!(project.get_objects_by_class(&["grid"]).len(), 2);
    }

    #[test]
    fn test_root_panels() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("main", "Panel")).unwrap();
        project.add_object(LAYOUT_ROOT, object("menu", "Menu")).unwrap();
        project.add_object(LAYOUT_ROOT, object("field", "Form_Field_Text")).unwrap();
        project.add_object(LAYOUT_ROOT, object("tabs", "Tabpanel")).unwrap();
        project.add_object(COMPONENT_ROOT, object("editor", "Form")).unwrap();
        project
            .add_object(LAYOUT_ROOT, ComponentDescriptor::instance("editorView", "editor"))
            .unwrap();
        project.add_object(LAYOUT_ROOT, object("crud", "Component_Window_System_Crud")).unwrap();

        assert_eq!(project.get_root_panels(), vec!["main", "tabs", "editorView"]);
    }

    #[test]
    fn test_unique_id() {
        let mut project = Project::new();
        assert_eq!(project.unique_id("Foo"), "Foo");
        for name in ["Foo", "Foo1", "Foo2"] {
            project.add_object(LAYOUT_ROOT, object(name, "Panel")).unwrap();
        }
        assert_eq!(project.unique_id("Foo"), "Foo3");
    }

    #[test]
    fn test_change_parent_rules() {
        let mut project = Project::new();
        project.add_object(LAYOUT_ROOT, object("a", "Panel")).unwrap();
        project.add_object("a", object("b", "Panel")).unwrap();

        assert!(project.change_parent("a", "b").is_err());
        assert!(project.change_parent(LAYOUT_ROOT, "a").is_err());
        assert!(project.change_parent("b", "ghost").unwrap_err().is_not_found());
        project.change_parent("b", LAYOUT_ROOT).unwrap();
        assert_eq!(project.get_parent("b"), Some(LAYOUT_ROOT));
    }

    #[test]
    fn test_synthetic_capabilities() {
        let table = CapabilityTable::new()
            .with_class("Frame", ClassCapabilities::container("X.Frame").window());
        let mut project = Project::with_capabilities(Arc::new(table));

        project.add_object(LAYOUT_ROOT, object("frame", "Frame")).unwrap();
        project.add_object(LAYOUT_ROOT, object("win", "Window")).unwrap();

        assert_eq!(project.get_parent("frame"), Some(COMPONENT_ROOT));
        // Window is unknown to this catalog, so it is not pinned
        assert_eq!(project.get_parent("win"), Some(LAYOUT_ROOT));
    }

    #[test]
    fn test_set_config() {
        let mut project = Project::new();
        project.set_config([("namespace", "myCmp"), ("theme", "gray")]);
        assert_eq!(project.config().namespace, "myCmp");
        assert_eq!(project.config().runnamespace, DEFAULT_RUN_NAMESPACE);
        assert_eq!(project.config().extra.get("theme").map(String::as_str), Some("gray"));
    }

    #[test]
    fn test_validate_detects_broken_instance() {
        let mut project = Project::new();
        project.add_object(COMPONENT_ROOT, object("base", "Panel")).unwrap();
        project
            .add_object(LAYOUT_ROOT, ComponentDescriptor::instance("copy", "base"))
            .unwrap();
        project.tree_mut().remove_item("base");
        assert!(matches!(project.validate(), Err(DesignerError::DataCorruption(_))));
    }
}
