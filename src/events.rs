/// Event handler bindings per (object, event)
///
/// Framework events are declared by the component class and keep their
/// names forever; only their code and buffer change. Local events are
/// user-defined and may be renamed or dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::component::Param;
use crate::error::{DesignerError, Entity, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBinding {
    pub code: String,
    /// Handler parameters; `None` falls back to the class-declared signature
    #[serde(default)]
    pub params: Option<Vec<Param>>,
    #[serde(default)]
    pub local: bool,
    /// Buffer delay in milliseconds
    #[serde(default)]
    pub buffer: Option<u32>,
}

impl EventBinding {
    pub fn new(code: impl Into<String>) -> Self {
        EventBinding {
            code: code.into(),
            params: None,
            local: false,
            buffer: None,
        }
    }

    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    pub fn with_params(mut self, params: Vec<Param>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_buffer(mut self, buffer: Option<u32>) -> Self {
        self.buffer = buffer;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTable {
    events: BTreeMap<String, BTreeMap<String, EventBinding>>,
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &BTreeMap<String, BTreeMap<String, EventBinding>> {
        &self.events
    }

    /// Insert or overwrite the binding for (object, event)
    pub fn set_event(&mut self, object: &str, event: &str, binding: EventBinding) {
        tracing::debug!(object, event, local = binding.local, "event set");
        self.events
            .entry(object.to_string())
            .or_default()
            .insert(event.to_string(), binding);
    }

    pub fn event_exists(&self, object: &str, event: &str) -> bool {
        self.get_event_info(object, event).is_some()
    }

    /// Handler code, empty when no binding exists
    pub fn get_event_code(&self, object: &str, event: &str) -> &str {
        self.get_event_info(object, event)
            .map(|b| b.code.as_str())
            .unwrap_or("")
    }

    pub fn get_event_info(&self, object: &str, event: &str) -> Option<&EventBinding> {
        self.events.get(object).and_then(|e| e.get(event))
    }

    /// Replace only the handler code of an existing binding
    pub fn update_event(&mut self, object: &str, event: &str, code: impl Into<String>) -> Result<()> {
        let binding = self
            .events
            .get_mut(object)
            .and_then(|e| e.get_mut(event))
            .ok_or_else(|| DesignerError::not_found(Entity::Event, format!("{}.{}", object, event)))?;
        binding.code = code.into();
        Ok(())
    }

    pub fn get_object_events(&self, object: &str) -> BTreeMap<String, EventBinding> {
        self.events.get(object).cloned().unwrap_or_default()
    }

    pub fn remove_object_event(&mut self, object: &str, event: &str) {
        if let Some(events) = self.events.get_mut(object) {
            events.remove(event);
            if events.is_empty() {
                self.events.remove(object);
            }
        }
    }

    pub fn remove_object_events(&mut self, object: &str) {
        self.events.remove(object);
    }

    pub fn get_local_events(&self, object: &str) -> BTreeMap<String, EventBinding> {
        self.events
            .get(object)
            .map(|events| {
                events
                    .iter()
                    .filter(|(_, b)| b.local)
                    .map(|(name, b)| (name.clone(), b.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn object_has_local_events(&self, object: &str) -> bool {
        self.events
            .get(object)
            .is_some_and(|events| events.values().any(|b| b.local))
    }

    pub fn is_local_event(&self, object: &str, event: &str) -> bool {
        self.get_event_info(object, event).is_some_and(|b| b.local)
    }

    /// Move a local binding under a new event name, keeping code, params and buffer
    pub fn rename_local_event(&mut self, object: &str, event: &str, new_name: &str) -> Result<()> {
        if !self.event_exists(object, event) {
            return Err(DesignerError::not_found(Entity::Event, format!("{}.{}", object, event)));
        }
        if !self.is_local_event(object, event) {
            return Err(DesignerError::invalid(format!(
                "event '{}' of '{}' is declared by the component and cannot be renamed",
                event, object
            )));
        }
        if event == new_name {
            return Ok(());
        }
        if self.event_exists(object, new_name) {
            return Err(DesignerError::conflict(Entity::Event, format!("{}.{}", object, new_name)));
        }

        if let Some(events) = self.events.get_mut(object) {
            if let Some(binding) = events.remove(event) {
                events.insert(new_name.to_string(), binding);
            }
        }
        tracing::debug!(object, event, new_name, "local event renamed");
        Ok(())
    }

    /// Move every binding of `object` under `new_object`
    pub fn rename_object(&mut self, object: &str, new_object: &str) {
        if let Some(events) = self.events.remove(object) {
            self.events.insert(new_object.to_string(), events);
        }
    }

    /// "Type name , name" display form of a handler signature
    pub fn params_to_string(params: &[Param]) -> String {
        params
            .iter()
            .map(|p| {
                if p.kind.is_empty() {
                    p.name.clone()
                } else {
                    format!("{} {}", p.kind, p.name)
                }
            })
            .collect::<Vec<_>>()
            .join(" , ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EventTable {
        let mut table = EventTable::new();
        table.set_event("saveBtn", "click", EventBinding::new("this.save();"));
        table.set_event(
            "win",
            "dataSaved",
            EventBinding::new("console.log(id);")
                .local()
                .with_params(vec![Param::new("id", "int")])
                .with_buffer(Some(250)),
        );
        table
    }

    #[test]
    fn test_set_event_overwrites() {
        let mut table = table();
        table.set_event("saveBtn", "click", EventBinding::new("other();"));
        assert_eq!(table.get_event_code("saveBtn", "click"), "other();");
        assert_eq!(table.get_event_code("saveBtn", "missing"), "");
    }

    #[test]
    fn test_local_events() {
        let table = table();
        assert!(table.is_local_event("win", "dataSaved"));
        assert!(!table.is_local_event("saveBtn", "click"));
        assert!(!table.is_local_event("ghost", "click"));
        assert_eq!(table.get_local_events("win").len(), 1);
        assert!(table.get_local_events("saveBtn").is_empty());
        assert!(table.object_has_local_events("win"));
    }

    #[test]
    fn test_rename_local_event_preserves_fields() {
        let mut table = table();
        let before = table.get_event_info("win", "dataSaved").cloned().unwrap();

        table.rename_local_event("win", "dataSaved", "saved").unwrap();

        assert!(!table.event_exists("win", "dataSaved"));
        assert_eq!(table.get_event_info("win", "saved"), Some(&before));
    }

    #[test]
    fn test_rename_rejections() {
        let mut table = table();
        let err = table.rename_local_event("saveBtn", "click", "press").unwrap_err();
        assert!(matches!(err, DesignerError::InvalidOperation(_)));
        assert!(table.event_exists("saveBtn", "click"));

        assert!(table.rename_local_event("win", "ghost", "x").unwrap_err().is_not_found());

        table.set_event("win", "other", EventBinding::new("").local());
        assert!(table.rename_local_event("win", "dataSaved", "other").unwrap_err().is_conflict());
        assert!(table.event_exists("win", "dataSaved"));
    }

    #[test]
    fn test_update_and_remove() {
        let mut table = table();
        table.update_event("saveBtn", "click", "x();").unwrap();
        assert_eq!(table.get_event_code("saveBtn", "click"), "x();");
        assert!(table.update_event("saveBtn", "dblclick", "").is_err());

        table.remove_object_event("saveBtn", "click");
        assert!(table.get_object_events("saveBtn").is_empty());
        table.remove_object_events("win");
        assert!(table.events().is_empty());
    }

    #[test]
    fn test_params_to_string() {
        let params = vec![Param::new("id", "int"), Param::new("e", "")];
        assert_eq!(EventTable::params_to_string(&params), "int id , e");
        assert_eq!(EventTable::params_to_string(&[]), "");
    }
}
