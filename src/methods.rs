use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::component::Param;
use crate::error::{DesignerError, Entity, Result};

/// Custom method attached to a project object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodItem {
    name: String,
    #[serde(default)]
    params: Vec<Param>,
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

impl MethodItem {
    pub fn new(name: impl Into<String>) -> Self {
        MethodItem {
            name: name.into(),
            params: Vec::new(),
            code: String::new(),
            description: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn set_params(&mut self, params: Vec<Param>) {
        self.params = params;
    }

    pub fn add_param(&mut self, name: impl Into<String>, kind: impl Into<String>) {
        self.params.push(Param::new(name, kind));
    }

    /// Drop the parameter at `index`; out-of-range indexes are ignored
    pub fn remove_param(&mut self, index: usize) {
        if index < self.params.len() {
            self.params.remove(index);
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, text: impl Into<String>) {
        self.description = text.into();
    }

    /// Parameter names as written in a function signature: "id , name"
    pub fn params_line(&self) -> String {
        self.params
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(" , ")
    }

    /// Typed parameter list for display: "int id , string name"
    pub fn params_description(&self) -> String {
        self.params
            .iter()
            .map(|p| format!("{} {}", p.kind, p.name))
            .collect::<Vec<_>>()
            .join(" , ")
    }

    /// Doc comment block built from the description and parameters
    pub fn doc_comment(&self) -> String {
        let description = self.description.lines().collect::<Vec<_>>().join("\n * ");
        let mut doc = format!("/**\n * {}\n *\n", description);
        for param in &self.params {
            doc.push_str(&format!(" * @param {} {}\n", param.kind, param.name));
        }
        doc.push_str(" */");
        doc
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodTable {
    methods: BTreeMap<String, BTreeMap<String, MethodItem>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn methods(&self) -> &BTreeMap<String, BTreeMap<String, MethodItem>> {
        &self.methods
    }

    pub fn add_method(
        &mut self,
        object: &str,
        method: &str,
        params: Vec<Param>,
        code: impl Into<String>,
    ) -> Result<&mut MethodItem> {
        if self.method_exists(object, method) {
            return Err(DesignerError::conflict(Entity::Method, format!("{}.{}", object, method)));
        }

        let mut item = MethodItem::new(method);
        item.set_params(params);
        item.set_code(code);

        tracing::debug!(object, method, "method added");
        let methods = self.methods.entry(object.to_string()).or_default();
        Ok(methods.entry(method.to_string()).or_insert(item))
    }

    /// Methods of one object ordered by name
    pub fn get_object_methods(&self, object: &str) -> Vec<&MethodItem> {
        self.methods
            .get(object)
            .map(|m| m.values().collect())
            .unwrap_or_default()
    }

    pub fn get_object_method(&self, object: &str, method: &str) -> Option<&MethodItem> {
        self.methods.get(object).and_then(|m| m.get(method))
    }

    pub fn get_object_method_mut(&mut self, object: &str, method: &str) -> Option<&mut MethodItem> {
        self.methods.get_mut(object).and_then(|m| m.get_mut(method))
    }

    pub fn method_exists(&self, object: &str, method: &str) -> bool {
        self.get_object_method(object, method).is_some()
    }

    pub fn remove_method(&mut self, object: &str, method: &str) {
        if let Some(methods) = self.methods.get_mut(object) {
            methods.remove(method);
            if methods.is_empty() {
                self.methods.remove(object);
            }
        }
    }

    pub fn remove_object_methods(&mut self, object: &str) {
        self.methods.remove(object);
    }

    pub fn remove_all(&mut self) {
        self.methods.clear();
    }

    /// Replace params and code of an existing method
    pub fn update_method(
        &mut self,
        object: &str,
        method: &str,
        params: Vec<Param>,
        code: impl Into<String>,
    ) -> Result<()> {
        let item = self.require_mut(object, method)?;
        item.set_params(params);
        item.set_code(code);
        Ok(())
    }

    pub fn set_method_code(&mut self, object: &str, method: &str, code: impl Into<String>) -> Result<()> {
        self.require_mut(object, method)?.set_code(code);
        Ok(())
    }

    /// Rename a method. Renaming onto an existing method is a conflict.
    pub fn rename_method(&mut self, object: &str, old_name: &str, new_name: &str) -> Result<()> {
        if !self.method_exists(object, old_name) {
            return Err(DesignerError::not_found(Entity::Method, format!("{}.{}", object, old_name)));
        }
        if old_name == new_name {
            return Ok(());
        }
        if self.method_exists(object, new_name) {
            return Err(DesignerError::conflict(Entity::Method, format!("{}.{}", object, new_name)));
        }

        if let Some(methods) = self.methods.get_mut(object) {
            if let Some(mut item) = methods.remove(old_name) {
                item.set_name(new_name);
                methods.insert(new_name.to_string(), item);
            }
        }
        tracing::debug!(object, old_name, new_name, "method renamed");
        Ok(())
    }

    /// Move every method of `object` under `new_object`
    pub fn rename_object(&mut self, object: &str, new_object: &str) {
        if let Some(methods) = self.methods.remove(object) {
            self.methods.insert(new_object.to_string(), methods);
        }
    }

    fn require_mut(&mut self, object: &str, method: &str) -> Result<&mut MethodItem> {
        self.get_object_method_mut(object, method)
            .ok_or_else(|| DesignerError::not_found(Entity::Method, format!("{}.{}", object, method)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_method_rejects_duplicates() {
        let mut table = MethodTable::new();
        table
            .add_method("win", "save", vec![Param::new("id", "int")], "return true;")
            .unwrap()
            .set_description("Save data");

        let err = table.add_method("win", "save", Vec::new(), "").unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(table.get_object_method("win", "save").unwrap().code(), "return true;");
        assert_eq!(table.get_object_method("win", "save").unwrap().description(), "Save data");
    }

    #[test]
    fn test_rename_method() {
        let mut table = MethodTable::new();
        table.add_method("win", "save", vec![Param::new("id", "int")], "return true;").unwrap();
        table.add_method("win", "load", Vec::new(), "").unwrap();

        table.rename_method("win", "save", "persist").unwrap();
        let item = table.get_object_method("win", "persist").unwrap();
        assert_eq!(item.name(), "persist");
        assert_eq!(item.code(), "return true;");
        assert!(!table.method_exists("win", "save"));

        assert!(table.rename_method("win", "persist", "load").unwrap_err().is_conflict());
        assert!(table.rename_method("win", "ghost", "x").unwrap_err().is_not_found());
        assert!(table.method_exists("win", "persist"));
    }

    #[test]
    fn test_update_method() {
        let mut table = MethodTable::new();
        table.add_method("grid", "reload", Vec::new(), "").unwrap();
        table
            .update_method("grid", "reload", vec![Param::new("force", "bool")], "this.getStore().load();")
            .unwrap();
        let item = table.get_object_method("grid", "reload").unwrap();
        assert_eq!(item.params_line(), "force");
        assert!(table.update_method("grid", "nope", Vec::new(), "").is_err());
        assert!(table.set_method_code("grid", "nope", "").is_err());
    }

    #[test]
    fn test_remove_methods() {
        let mut table = MethodTable::new();
        table.add_method("a", "one", Vec::new(), "").unwrap();
        table.add_method("a", "two", Vec::new(), "").unwrap();
        table.add_method("b", "one", Vec::new(), "").unwrap();

        table.remove_method("a", "one");
        assert_eq!(table.get_object_methods("a").len(), 1);
        table.remove_object_methods("a");
        assert!(table.get_object_methods("a").is_empty());
        table.remove_all();
        assert!(table.methods().is_empty());
    }

    #[test]
    fn test_item_formatting() {
        let mut item = MethodItem::new("save");
        item.add_param("id", "int");
        item.add_param("name", "string");
        item.set_description("Save data\nand close");

        assert_eq!(item.params_line(), "id , name");
        assert_eq!(item.params_description(), "int id , string name");
        assert_eq!(
            item.doc_comment(),
            "/**\n * Save data\n * and close\n *\n * @param int id\n * @param string name\n */"
        );

        item.remove_param(0);
        item.remove_param(5);
        assert_eq!(item.params_line(), "name");
    }
}
