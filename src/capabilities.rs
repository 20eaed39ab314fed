/// Class capability catalog
///
/// Component classes are plain string tags. Everything the engine needs to
/// know about a class (can it hold children, where must it live, which
/// properties and events it declares) comes from a `CapabilityProvider`
/// injected into the project, so tests can swap in a smaller catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::component::{Param, INSTANCE_CLASS};

/// Substring that marks packaged window components (e.g. `Component_Window_System_Crud`)
pub const WINDOW_COMPONENT_MARKER: &str = "Component_Window";

/// Type slot of a declared property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Bool,
    Number,
    String,
    /// Raw expression emitted into generated code as-is
    Code,
    Any,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Bool => "boolean",
            PropertyKind::Number => "number",
            PropertyKind::String => "string",
            PropertyKind::Code => "code",
            PropertyKind::Any => "any",
        };
        f.write_str(name)
    }
}

/// Where a class is allowed to live in the project tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootPin {
    /// Anywhere
    Free,
    /// Directly under either root; other parents fall back to the layout root
    AnyRoot,
    /// Always under the component root
    ComponentRoot,
}

#[derive(Debug, Clone)]
pub struct ClassCapabilities {
    pub container: bool,
    pub draggable: bool,
    pub has_docked: bool,
    pub has_menu: bool,
    pub window_like: bool,
    pub store: bool,
    /// Stores and models are data objects, not visual components
    pub visible: bool,
    /// Always emitted as a class definition, never instantiated directly
    pub defined: bool,
    pub root_pin: RootPin,
    /// Framework class the generator instantiates or extends
    pub ext_class: String,
    /// Config key of the parent under which this class is nested
    pub slot: String,
    /// Emit children directly into `slot` instead of this object (docked/menu holders)
    pub flatten: bool,
    /// Property on other descriptors that holds references to objects of this class
    pub reference_property: Option<String>,
    /// Declared property schema; empty means an open property bag
    pub properties: BTreeMap<String, PropertyKind>,
    /// Framework-declared events with their handler parameters
    pub events: BTreeMap<String, Vec<Param>>,
}

impl ClassCapabilities {
    pub fn leaf(ext_class: &str) -> Self {
        ClassCapabilities {
            container: false,
            draggable: true,
            has_docked: false,
            has_menu: false,
            window_like: false,
            store: false,
            visible: true,
            defined: false,
            root_pin: RootPin::Free,
            ext_class: ext_class.to_string(),
            slot: "items".to_string(),
            flatten: false,
            reference_property: None,
            properties: BTreeMap::new(),
            events: BTreeMap::new(),
        }
    }

    pub fn container(ext_class: &str) -> Self {
        ClassCapabilities {
            container: true,
            ..Self::leaf(ext_class)
        }
    }

    pub fn with_docked(mut self) -> Self {
        self.has_docked = true;
        self
    }

    pub fn with_menu(mut self) -> Self {
        self.has_menu = true;
        self
    }

    pub fn window(mut self) -> Self {
        self.window_like = true;
        self.draggable = false;
        self.root_pin = RootPin::ComponentRoot;
        self
    }

    /// Data object pinned to a root, referenced from other objects through `property`
    pub fn data_object(mut self, property: &str, store: bool) -> Self {
        self.store = store;
        self.visible = false;
        self.draggable = store;
        self.root_pin = RootPin::AnyRoot;
        self.reference_property = Some(property.to_string());
        self
    }

    pub fn defined(mut self) -> Self {
        self.defined = true;
        self
    }

    pub fn in_slot(mut self, slot: &str, flatten: bool) -> Self {
        self.slot = slot.to_string();
        self.flatten = flatten;
        self
    }

    pub fn property(mut self, name: &str, kind: PropertyKind) -> Self {
        self.properties.insert(name.to_string(), kind);
        self
    }

    pub fn properties(mut self, list: &[(&str, PropertyKind)]) -> Self {
        for (name, kind) in list {
            self.properties.insert(name.to_string(), *kind);
        }
        self
    }

    pub fn event(mut self, name: &str, params: &[(&str, &str)]) -> Self {
        let params = params.iter().map(|(n, t)| Param::new(*n, *t)).collect();
        self.events.insert(name.to_string(), params);
        self
    }
}

/// Capability query used by the project and the code generator
pub trait CapabilityProvider: fmt::Debug + Send + Sync {
    fn lookup(&self, class: &str) -> Option<&ClassCapabilities>;

    fn is_window_component(&self, class: &str) -> bool {
        class.contains(WINDOW_COMPONENT_MARKER)
            || self.lookup(class).is_some_and(|c| c.window_like)
    }

    fn is_container(&self, class: &str) -> bool {
        self.is_window_component(class) || self.lookup(class).is_some_and(|c| c.container)
    }

    fn is_draggable(&self, class: &str) -> bool {
        !self.is_window_component(class) && self.lookup(class).map_or(true, |c| c.draggable)
    }

    fn has_docked(&self, class: &str) -> bool {
        self.lookup(class).is_some_and(|c| c.has_docked)
    }

    fn has_menu(&self, class: &str) -> bool {
        self.lookup(class).is_some_and(|c| c.has_menu)
    }

    fn is_store(&self, class: &str) -> bool {
        self.lookup(class).is_some_and(|c| c.store)
    }

    fn is_visible_component(&self, class: &str) -> bool {
        self.lookup(class).map_or(true, |c| c.visible)
    }

    fn is_defined(&self, class: &str) -> bool {
        self.lookup(class).is_some_and(|c| c.defined)
    }

    fn root_pin(&self, class: &str) -> RootPin {
        if self.is_window_component(class) {
            return RootPin::ComponentRoot;
        }
        self.lookup(class).map_or(RootPin::Free, |c| c.root_pin)
    }

    fn valid_property(&self, class: &str, property: &str) -> bool {
        match self.lookup(class) {
            Some(caps) if !caps.properties.is_empty() => caps.properties.contains_key(property),
            _ => true,
        }
    }

    fn property_kind(&self, class: &str, property: &str) -> Option<PropertyKind> {
        self.lookup(class)
            .and_then(|c| c.properties.get(property))
            .copied()
    }

    fn reference_property(&self, class: &str) -> Option<&str> {
        self.lookup(class).and_then(|c| c.reference_property.as_deref())
    }

    fn event_params(&self, class: &str, event: &str) -> Option<&[Param]> {
        self.lookup(class)
            .and_then(|c| c.events.get(event))
            .map(Vec::as_slice)
    }
}

/// Immutable class table
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    classes: BTreeMap<String, ClassCapabilities>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: &str, caps: ClassCapabilities) -> Self {
        self.classes.insert(class.to_string(), caps);
        self
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Default catalog of the framework's component classes
    pub fn builtin() -> Self {
        use PropertyKind::*;

        const COMMON: &[(&str, PropertyKind)] = &[
            ("cls", String),
            ("disabled", Bool),
            ("flex", Number),
            ("height", Number),
            ("hidden", Bool),
            ("html", String),
            ("itemId", String),
            ("layout", Any),
            ("margin", Any),
            ("padding", Any),
            ("region", String),
            ("scrollable", Any),
            ("title", String),
            ("width", Number),
        ];
        const FIELD: &[(&str, PropertyKind)] = &[
            ("allowBlank", Bool),
            ("fieldLabel", String),
            ("name", String),
            ("value", Any),
        ];
        const BUTTON: &[(&str, PropertyKind)] = &[
            ("iconCls", String),
            ("minWidth", Number),
            ("text", String),
            ("tooltip", String),
        ];
        const STORE: &[(&str, PropertyKind)] = &[
            ("autoLoad", Bool),
            ("fields", Code),
            ("model", String),
            ("pageSize", Number),
            ("proxy", Code),
            ("remoteSort", Bool),
        ];

        let click = [("button", "Ext.button.Button"), ("e", "Event")];
        let data = |ext: &str| {
            ClassCapabilities::leaf(ext)
                .data_object("store", true)
                .properties(STORE)
                .event("load", &[("store", "Ext.data.Store"), ("records", "Array"), ("successful", "Boolean")])
        };

        CapabilityTable::new()
            .with_class("Panel", ClassCapabilities::container("Ext.panel.Panel").with_docked().properties(COMMON))
            .with_class(
                "Tabpanel",
                ClassCapabilities::container("Ext.tab.Panel")
                    .with_docked()
                    .properties(COMMON)
                    .property("activeTab", Number),
            )
            .with_class(
                "Toolbar",
                ClassCapabilities::container("Ext.toolbar.Toolbar")
                    .properties(COMMON)
                    .properties(&[("dock", String), ("ui", String)]),
            )
            .with_class("Toolbar_Fill", ClassCapabilities::leaf("Ext.toolbar.Fill"))
            .with_class(
                "Form",
                ClassCapabilities::container("Ext.form.Panel")
                    .with_docked()
                    .properties(COMMON)
                    .properties(&[("bodyCls", String), ("bodyPadding", Number), ("fieldDefaults", Code)])
                    .event("dirtychange", &[("form", "Ext.form.Basic"), ("dirty", "Boolean")]),
            )
            .with_class("Form_Fieldset", ClassCapabilities::container("Ext.form.FieldSet").properties(COMMON))
            .with_class(
                "Form_Fieldcontainer",
                ClassCapabilities::container("Ext.form.FieldContainer").properties(COMMON).properties(FIELD),
            )
            .with_class(
                "Form_Checkboxgroup",
                ClassCapabilities::container("Ext.form.CheckboxGroup").properties(COMMON).properties(FIELD),
            )
            .with_class(
                "Form_Radiogroup",
                ClassCapabilities::container("Ext.form.RadioGroup").properties(COMMON).properties(FIELD),
            )
            .with_class(
                "Form_Field_Text",
                ClassCapabilities::leaf("Ext.form.field.Text")
                    .properties(COMMON)
                    .properties(FIELD)
                    .event("change", &[("field", "Ext.form.field.Text"), ("newValue", "Object"), ("oldValue", "Object")]),
            )
            .with_class(
                "Window",
                ClassCapabilities::container("Ext.window.Window")
                    .with_docked()
                    .window()
                    .properties(COMMON)
                    .properties(&[("closeAction", String), ("modal", Bool), ("resizable", Bool)])
                    .event("show", &[("window", "Ext.window.Window")])
                    .event("close", &[("panel", "Ext.panel.Panel")]),
            )
            .with_class(
                "Grid",
                ClassCapabilities::container("Ext.grid.Panel")
                    .with_docked()
                    .properties(COMMON)
                    .properties(&[("columnLines", Bool), ("store", String)])
                    .event("itemclick", &[("view", "Ext.view.View"), ("record", "Ext.data.Model"), ("item", "HTMLElement"), ("index", "Number"), ("e", "Event")])
                    .event("selectionchange", &[("sm", "Ext.selection.Model"), ("selected", "Array")]),
            )
            .with_class(
                "Grid_Column",
                ClassCapabilities::leaf("Ext.grid.column.Column")
                    .in_slot("columns", false)
                    .properties(&[("align", String), ("dataIndex", String), ("flex", Number), ("sortable", Bool), ("text", String), ("width", Number)]),
            )
            .with_class(
                "Tree",
                ClassCapabilities::container("Ext.tree.Panel")
                    .with_docked()
                    .properties(COMMON)
                    .properties(&[("rootVisible", Bool), ("store", String)]),
            )
            .with_class("Docked", ClassCapabilities::container("").in_slot("dockedItems", true))
            .with_class("Menu", ClassCapabilities::container("Ext.menu.Menu").in_slot("menu", true))
            .with_class("Container", ClassCapabilities::container("Ext.container.Container").properties(COMMON))
            .with_class("Buttongroup", ClassCapabilities::container("Ext.container.ButtonGroup").properties(COMMON))
            .with_class(
                "Button",
                ClassCapabilities::container("Ext.button.Button")
                    .with_menu()
                    .properties(COMMON)
                    .properties(BUTTON)
                    .event("click", &click),
            )
            .with_class(
                "Button_Split",
                ClassCapabilities::container("Ext.button.Split")
                    .with_menu()
                    .properties(COMMON)
                    .properties(BUTTON)
                    .event("click", &click),
            )
            .with_class(
                "Menu_Item",
                ClassCapabilities::container("Ext.menu.Item")
                    .with_menu()
                    .properties(BUTTON)
                    .event("click", &[("item", "Ext.menu.Item"), ("e", "Event")]),
            )
            .with_class(
                "Menu_Checkitem",
                ClassCapabilities::container("Ext.menu.CheckItem")
                    .with_menu()
                    .properties(BUTTON)
                    .property("checked", Bool)
                    .event("checkchange", &[("item", "Ext.menu.CheckItem"), ("checked", "Boolean")]),
            )
            .with_class("Menu_Separator", ClassCapabilities::container("Ext.menu.Separator").with_menu())
            .with_class(
                "Model",
                ClassCapabilities::leaf("Ext.data.Model")
                    .data_object("model", false)
                    .defined()
                    .properties(&[("fields", Code), ("idProperty", String)]),
            )
            .with_class("Store", data("Ext.data.Store"))
            .with_class("Data_Store", data("Ext.data.Store"))
            .with_class("Data_Store_Tree", data("Ext.data.TreeStore"))
            .with_class("Data_Store_Buffered", data("Ext.data.BufferedStore"))
            .with_class(INSTANCE_CLASS, ClassCapabilities::leaf(""))
    }
}

impl CapabilityProvider for CapabilityTable {
    fn lookup(&self, class: &str) -> Option<&ClassCapabilities> {
        self.classes.get(class)
    }
}
