use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::capabilities::{CapabilityProvider, PropertyKind};
use crate::error::{DesignerError, Result};

/// Class tag of descriptors that alias an extended component
pub const INSTANCE_CLASS: &str = "Object_Instance";

/// Single property value in a descriptor's property bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a loosely typed literal: booleans, integers, floats, else string
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => return PropertyValue::Bool(true),
            "false" => return PropertyValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return PropertyValue::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return PropertyValue::Float(f);
            }
        }
        PropertyValue::String(raw.to_string())
    }

    fn matches(&self, kind: PropertyKind) -> bool {
        match kind {
            PropertyKind::Any => true,
            PropertyKind::Bool => matches!(self, PropertyValue::Bool(_)),
            PropertyKind::Number => matches!(self, PropertyValue::Int(_) | PropertyValue::Float(_)),
            PropertyKind::String | PropertyKind::Code => matches!(self, PropertyValue::String(_)),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

/// Named, optionally typed parameter of an event handler or method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Parse "int id, string name, e" style lists; the last word is the name
    pub fn parse_list(raw: &str) -> Vec<Param> {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let words: Vec<&str> = part.split_whitespace().collect();
                match words.split_last() {
                    Some((name, kind)) => Param::new(*name, kind.join(" ")),
                    None => Param::new(part, ""),
                }
            })
            .collect()
    }
}

/// One UI component instance in the design tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    name: String,
    class: String,
    #[serde(default)]
    properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    extended: bool,
    /// Name of the extended component this instance aliases. Resolved on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instance_of: Option<String>,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        ComponentDescriptor {
            name: name.into(),
            class: class.into(),
            properties: BTreeMap::new(),
            extended: false,
            instance_of: None,
        }
    }

    pub fn instance(name: impl Into<String>, target: impl Into<String>) -> Self {
        let mut descriptor = Self::new(name, INSTANCE_CLASS);
        descriptor.instance_of = Some(target.into());
        descriptor
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn is_instance(&self) -> bool {
        self.instance_of.is_some()
    }

    pub fn instance_of(&self) -> Option<&str> {
        self.instance_of.as_deref()
    }

    pub fn set_instance_of(&mut self, target: impl Into<String>) {
        self.instance_of = Some(target.into());
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn set_extended(&mut self, extended: bool) {
        self.extended = extended;
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.properties.get(property)
    }

    pub fn remove_property(&mut self, property: &str) -> Option<PropertyValue> {
        self.properties.remove(property)
    }

    /// Set a property after checking it against the class schema
    pub fn set_property(
        &mut self,
        provider: &dyn CapabilityProvider,
        property: &str,
        value: PropertyValue,
    ) -> Result<()> {
        self.check_property(provider, property, &value)?;
        self.properties.insert(property.to_string(), value);
        Ok(())
    }

    /// Check every stored property against the class schema
    pub fn validate(&self, provider: &dyn CapabilityProvider) -> Result<()> {
        for (property, value) in &self.properties {
            self.check_property(provider, property, value)?;
        }
        Ok(())
    }

    fn check_property(
        &self,
        provider: &dyn CapabilityProvider,
        property: &str,
        value: &PropertyValue,
    ) -> Result<()> {
        let invalid = |reason: &str| DesignerError::InvalidProperty {
            class: self.class.clone(),
            property: property.to_string(),
            reason: reason.to_string(),
        };

        if !provider.valid_property(&self.class, property) {
            return Err(invalid("not part of the class schema"));
        }
        match provider.property_kind(&self.class, property) {
            Some(kind) if !value.matches(kind) => {
                Err(invalid(&format!("expected a {} value", kind)))
            }
            _ => Ok(()),
        }
    }
}
