/// Code generator for client-side component code
///
/// Extended components become class definitions in the project namespace,
/// layout objects become instances assigned into the run namespace. The
/// object tree is first lowered to a small `Js` value tree and then printed,
/// so identical projects always produce byte-identical text.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::capabilities::{CapabilityProvider, PropertyKind};
use crate::component::{ComponentDescriptor, PropertyValue};
use crate::error::Result;
use crate::project::{Project, COMPONENT_ROOT, LAYOUT_ROOT};

const INDENT: &str = "    ";

/// Prefix marking a string property as a raw expression
pub const RAW_PREFIX: &str = "[js:]";

/// Placeholder written into generated code and the literal that replaces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub placeholder: String,
    pub value: String,
}

impl Replacement {
    pub fn new(placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        Replacement {
            placeholder: placeholder.into(),
            value: value.into(),
        }
    }
}

/// Global literal replacement of every placeholder
pub fn apply_replacements(code: &str, replacements: &[Replacement]) -> String {
    replacements
        .iter()
        .filter(|r| !r.placeholder.is_empty())
        .fold(code.to_string(), |acc, r| acc.replace(&r.placeholder, &r.value))
}

/// SHA-256 hex digest used to cache generated includes
pub fn code_hash(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl Project {
    /// Code for the whole project
    pub fn get_code(&self, replacements: &[Replacement]) -> String {
        apply_replacements(&CodeGenerator::new(self).generate(), replacements)
    }

    /// Code for a single object
    pub fn get_object_code(&self, name: &str, replacements: &[Replacement]) -> Result<String> {
        let code = CodeGenerator::new(self).generate_object(name)?;
        Ok(apply_replacements(&code, replacements))
    }
}

/// Printable JavaScript value
#[derive(Debug, Clone, PartialEq)]
enum Js {
    Raw(String),
    Object(Vec<Entry>),
    Array(Vec<Js>),
    Call(String, Vec<Js>),
    Function { params: String, body: String },
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    doc: Option<String>,
    key: String,
    value: Js,
}

impl Entry {
    fn new(key: impl Into<String>, value: Js) -> Self {
        Entry {
            doc: None,
            key: key.into(),
            value,
        }
    }
}

impl Js {
    fn render(&self, level: usize) -> String {
        match self {
            Js::Raw(text) => text.clone(),
            Js::Object(entries) if entries.is_empty() => "{}".to_string(),
            Js::Object(entries) => {
                let mut out = String::from("{\n");
                for (i, entry) in entries.iter().enumerate() {
                    if let Some(doc) = &entry.doc {
                        out.push_str(&indent_block(doc, level + 1));
                    }
                    out.push_str(&pad(level + 1));
                    out.push_str(&entry.key);
                    out.push_str(": ");
                    out.push_str(&entry.value.render(level + 1));
                    if i + 1 < entries.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&pad(level));
                out.push('}');
                out
            }
            Js::Array(items) if items.is_empty() => "[]".to_string(),
            Js::Array(items) => {
                let mut out = String::from("[\n");
                for (i, item) in items.iter().enumerate() {
                    out.push_str(&pad(level + 1));
                    out.push_str(&item.render(level + 1));
                    if i + 1 < items.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&pad(level));
                out.push(']');
                out
            }
            Js::Call(callee, args) => {
                let args: Vec<String> = args.iter().map(|a| a.render(level)).collect();
                format!("{}({})", callee, args.join(", "))
            }
            Js::Function { params, body } => {
                if body.trim().is_empty() {
                    return format!("function({}) {{}}", params);
                }
                format!(
                    "function({}) {{\n{}{}}}",
                    params,
                    indent_block(body, level + 1),
                    pad(level)
                )
            }
        }
    }
}

fn pad(level: usize) -> String {
    INDENT.repeat(level)
}

/// Re-indent a block of text, keeping its relative indentation
fn indent_block(text: &str, level: usize) -> String {
    let mut out = String::new();
    for line in text.trim_matches('\n').lines() {
        let line = line.trim_end();
        if !line.is_empty() {
            out.push_str(&pad(level));
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// How nested children are referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Children created in place
    Inline,
    /// Inside a class definition: children live in `this.childObjects`
    Define,
}

pub struct CodeGenerator<'a> {
    project: &'a Project,
    caps: &'a dyn CapabilityProvider,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(project: &'a Project) -> Self {
        CodeGenerator {
            project,
            caps: project.capabilities(),
        }
    }

    pub fn generate(&self) -> String {
        let config = self.project.config();
        let mut units = vec![format!(
            "Ext.ns({}, {});",
            quote(&config.namespace),
            quote(&config.runnamespace)
        )];

        for descriptor in self.emission_order(COMPONENT_ROOT) {
            units.push(self.define_unit(descriptor, &config.namespace));
        }
        for descriptor in self.emission_order(LAYOUT_ROOT) {
            units.push(self.layout_unit(descriptor));
        }

        let action_js = self.project.action_js().trim();
        if !action_js.is_empty() {
            units.push(action_js.to_string());
        }

        let mut code = units.join("\n\n");
        code.push('\n');
        code
    }

    pub fn generate_object(&self, name: &str) -> Result<String> {
        let descriptor = self.project.get_object(name)?;
        let mut code = if self.project.is_extended_component(name) {
            self.define_unit(descriptor, &self.project.config().namespace)
        } else if self.project.get_parent(name) == Some(LAYOUT_ROOT) {
            self.layout_unit(descriptor)
        } else {
            format!("{};", self.create(descriptor, Mode::Inline).render(0))
        };
        code.push('\n');
        Ok(code)
    }

    /// Children of a root: class definitions first, then data objects, then views
    fn emission_order(&self, root: &str) -> Vec<&'a ComponentDescriptor> {
        let mut children = self.project.get_children(root);
        children.sort_by_key(|descriptor| {
            let class = self.project.effective_class(descriptor);
            if self.caps.is_defined(class) {
                0
            } else if !self.caps.is_visible_component(class) {
                1
            } else {
                2
            }
        });
        children
    }

    fn layout_unit(&self, descriptor: &ComponentDescriptor) -> String {
        let config = self.project.config();
        if !descriptor.is_instance() && self.caps.is_defined(descriptor.class()) {
            return self.define_unit(descriptor, &config.runnamespace);
        }
        format!(
            "{}.{} = {};",
            config.runnamespace,
            descriptor.name(),
            self.create(descriptor, Mode::Inline).render(0)
        )
    }

    fn define_unit(&self, descriptor: &ComponentDescriptor, namespace: &str) -> String {
        let class = descriptor.class();
        let mut entries = vec![Entry::new(
            "extend",
            Js::Raw(quote(&self.ext_class(class))),
        )];
        entries.extend(self.property_entries(descriptor));
        entries.extend(self.listener_entry(descriptor, Mode::Inline));

        let slots = self.slots(descriptor);
        if !slots.is_empty() {
            let mut created = Vec::new();
            self.collect_created(descriptor, &mut created);

            // One statement per child so parents can refer to children created before them
            let mut body = String::from("this.childObjects = {};\n");
            for child in &created {
                body.push_str(&format!(
                    "this.childObjects.{} = {};\n",
                    child.name(),
                    self.create(child, Mode::Define).render(0)
                ));
            }
            for (slot, members) in &slots {
                let refs = members
                    .iter()
                    .map(|child| Js::Raw(format!("this.childObjects.{}", child.name())))
                    .collect();
                body.push_str(&format!("this.{} = {};\n", slot, Js::Array(refs).render(0)));
            }
            body.push_str("this.callParent();");

            entries.push(Entry::new(
                "initComponent",
                Js::Function {
                    params: String::new(),
                    body,
                },
            ));
        }
        entries.extend(self.method_entries(descriptor));

        format!(
            "Ext.define({}, {});",
            quote(&format!("{}.{}", namespace, descriptor.name())),
            Js::Object(entries).render(0)
        )
    }

    /// `Ext.create(...)` expression for one object
    fn create(&self, descriptor: &ComponentDescriptor, mode: Mode) -> Js {
        let class_ref = match descriptor.instance_of() {
            Some(target) => format!("{}.{}", self.project.config().namespace, target),
            None => self.ext_class(descriptor.class()),
        };
        Js::Call(
            "Ext.create".to_string(),
            vec![
                Js::Raw(quote(&class_ref)),
                Js::Object(self.config_entries(descriptor, mode)),
            ],
        )
    }

    fn config_entries(&self, descriptor: &ComponentDescriptor, mode: Mode) -> Vec<Entry> {
        let mut entries = self.property_entries(descriptor);

        for (slot, members) in self.slots(descriptor) {
            let items = members
                .into_iter()
                .map(|child| match mode {
                    Mode::Inline => self.create(child, Mode::Inline),
                    Mode::Define => Js::Raw(format!("this.childObjects.{}", child.name())),
                })
                .collect();
            entries.push(Entry::new(slot, Js::Array(items)));
        }

        entries.extend(self.listener_entry(descriptor, mode));
        entries.extend(self.method_entries(descriptor));
        entries
    }

    fn property_entries(&self, descriptor: &ComponentDescriptor) -> Vec<Entry> {
        let class = self.project.effective_class(descriptor);
        descriptor
            .properties()
            .iter()
            .map(|(key, value)| Entry::new(key.clone(), self.property_value(class, key, value)))
            .collect()
    }

    fn property_value(&self, class: &str, key: &str, value: &PropertyValue) -> Js {
        let text = match value {
            PropertyValue::String(text) => text,
            other => return Js::Raw(other.to_string()),
        };
        if let Some(raw) = text.strip_prefix(RAW_PREFIX) {
            return Js::Raw(raw.to_string());
        }
        if self.caps.property_kind(class, key) == Some(PropertyKind::Code) {
            return Js::Raw(text.clone());
        }
        self.reference(key, text)
            .unwrap_or_else(|| Js::Raw(quote(text)))
    }

    /// Reference expression when `property` points at a project object of the matching class
    fn reference(&self, property: &str, target: &str) -> Option<Js> {
        let descriptor = self.project.get_object(target).ok()?;
        let class = self.project.effective_class(descriptor);
        if self.caps.reference_property(class) != Some(property) {
            return None;
        }

        let config = self.project.config();
        let extended = self.project.is_extended_component(target);
        let js = if self.caps.is_defined(class) && !descriptor.is_instance() {
            let namespace = if extended { &config.namespace } else { &config.runnamespace };
            Js::Raw(quote(&format!("{}.{}", namespace, target)))
        } else if extended {
            Js::Call(
                "Ext.create".to_string(),
                vec![
                    Js::Raw(quote(&format!("{}.{}", config.namespace, target))),
                    Js::Object(Vec::new()),
                ],
            )
        } else {
            Js::Raw(format!("{}.{}", config.runnamespace, target))
        };
        Some(js)
    }

    /// Handlers for events that have code
    fn listener_entry(&self, descriptor: &ComponentDescriptor, mode: Mode) -> Option<Entry> {
        let class = self.project.effective_class(descriptor);
        let events = self.project.events().get_object_events(descriptor.name());

        let listeners: Vec<Entry> = events
            .iter()
            .filter(|(_, binding)| !binding.code.trim().is_empty())
            .map(|(event, binding)| {
                let params = binding
                    .params
                    .as_deref()
                    .or_else(|| self.caps.event_params(class, event))
                    .unwrap_or(&[]);
                let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();

                let mut handler = vec![Entry::new(
                    "fn",
                    Js::Function {
                        params: names.join(", "),
                        body: binding.code.clone(),
                    },
                )];
                if let Some(buffer) = binding.buffer {
                    handler.push(Entry::new("buffer", Js::Raw(buffer.to_string())));
                }
                if mode == Mode::Define {
                    handler.push(Entry::new("scope", Js::Raw("this".to_string())));
                }
                Entry::new(event.clone(), Js::Object(handler))
            })
            .collect();

        if listeners.is_empty() {
            None
        } else {
            Some(Entry::new("listeners", Js::Object(listeners)))
        }
    }

    fn method_entries(&self, descriptor: &ComponentDescriptor) -> Vec<Entry> {
        self.project
            .methods()
            .get_object_methods(descriptor.name())
            .into_iter()
            .map(|method| Entry {
                doc: Some(method.doc_comment()),
                key: method.name().to_string(),
                value: Js::Function {
                    params: method
                        .params()
                        .iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    body: method.code().to_string(),
                },
            })
            .collect()
    }

    /// Children grouped by the config key they nest under.
    /// Docked and menu holders contribute their own children directly.
    fn slots(&self, descriptor: &ComponentDescriptor) -> BTreeMap<String, Vec<&'a ComponentDescriptor>> {
        let mut slots: BTreeMap<String, Vec<&'a ComponentDescriptor>> = BTreeMap::new();
        if descriptor.is_instance() || !self.caps.is_container(descriptor.class()) {
            return slots;
        }

        for child in self.project.get_children(descriptor.name()) {
            let child_class = self.project.effective_class(child);
            match self.caps.lookup(child_class) {
                Some(caps) if caps.flatten && !child.is_instance() => {
                    if !self.slot_allowed(descriptor.class(), &caps.slot) {
                        tracing::warn!(
                            object = descriptor.name(),
                            child = child.name(),
                            slot = %caps.slot,
                            "class cannot hold this slot, skipped"
                        );
                        continue;
                    }
                    self.warn_dropped_holder_config(child);
                    slots
                        .entry(caps.slot.clone())
                        .or_default()
                        .extend(self.project.get_children(child.name()));
                }
                Some(caps) => slots.entry(caps.slot.clone()).or_default().push(child),
                None => slots.entry("items".to_string()).or_default().push(child),
            }
        }
        slots.retain(|_, members| !members.is_empty());
        slots
    }

    /// Flattened holders only contribute children; their own config has nowhere to go
    fn warn_dropped_holder_config(&self, holder: &ComponentDescriptor) {
        let name = holder.name();
        let events = self.project.events().get_object_events(name).len();
        let methods = self.project.methods().get_object_methods(name).len();
        if !holder.properties().is_empty() || events > 0 || methods > 0 {
            tracing::warn!(
                object = name,
                properties = holder.properties().len(),
                events,
                methods,
                "holder config is not emitted"
            );
        }
    }

    fn slot_allowed(&self, class: &str, slot: &str) -> bool {
        match slot {
            "dockedItems" => self.caps.has_docked(class),
            "menu" => self.caps.has_menu(class),
            _ => true,
        }
    }

    /// Every nested object below `descriptor`, children before their parents
    fn collect_created(&self, descriptor: &ComponentDescriptor, out: &mut Vec<&'a ComponentDescriptor>) {
        for members in self.slots(descriptor).into_values() {
            for child in members {
                self.collect_created(child, out);
                out.push(child);
            }
        }
    }

    fn ext_class(&self, class: &str) -> String {
        match self.caps.lookup(class) {
            Some(caps) if !caps.ext_class.is_empty() => caps.ext_class.clone(),
            _ => "Ext.Component".to_string(),
        }
    }
}
