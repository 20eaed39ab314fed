use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use uidesigner::capabilities::{CapabilityTable, ClassCapabilities};
use uidesigner::events::EventBinding;
use uidesigner::{
    ComponentDescriptor, DesignerError, FileAdapter, Project, StorageAdapter, COMPONENT_ROOT,
    LAYOUT_ROOT,
};

fn adapter(dir: &TempDir) -> FileAdapter {
    FileAdapter::new(dir.path().join("layouts"), Arc::new(CapabilityTable::builtin()))
}

fn sample() -> Project {
    let mut project = Project::new();
    project
        .add_object(COMPONENT_ROOT, ComponentDescriptor::new("editForm", "Form"))
        .unwrap();
    project
        .add_object(LAYOUT_ROOT, ComponentDescriptor::instance("form", "editForm"))
        .unwrap();
    project
        .events_mut()
        .set_event("editForm", "saved", EventBinding::new("").local());
    project.set_action_js("appApplication.form.show();");
    project
}

#[test]
fn test_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = adapter(&temp_dir);

    storage.save("main", &sample(), false).unwrap();
    assert!(storage.project_path("main").exists());
    assert!(!storage.export_path("main").exists());

    let loaded = storage.load("main").unwrap();
    assert_eq!(loaded.get_object("form").unwrap().instance_of(), Some("editForm"));
    assert!(loaded.events().is_local_event("editForm", "saved"));
    assert_eq!(loaded.action_js(), "appApplication.form.show();");
    assert_eq!(loaded.get_code(&[]), sample().get_code(&[]));
}

#[test]
fn test_export_and_import() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = adapter(&temp_dir);

    storage.save("main", &sample(), false).unwrap();
    assert!(storage.import("main").unwrap().is_none());

    storage.save("main", &sample(), true).unwrap();
    let exported = fs::read_to_string(storage.export_path("main")).unwrap();
    assert!(exported.contains("\n  "), "export copy should be pretty-printed");

    let imported = storage.import("main").unwrap().unwrap();
    assert!(imported.object_exists("editForm"));
}

#[test]
fn test_corrupt_files_are_reported() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = adapter(&temp_dir);
    storage.save("main", &sample(), false).unwrap();

    fs::write(storage.project_path("main"), "{\"tree\": 42}").unwrap();
    assert!(matches!(storage.load("main"), Err(DesignerError::DataCorruption(_))));

    // Parses, but an instance points at a missing object
    let mut json: serde_json::Value = serde_json::to_value(sample()).unwrap();
    json["tree"]["items"]
        .as_object_mut()
        .unwrap()
        .remove("editForm");
    json["tree"]["children"][COMPONENT_ROOT] = serde_json::json!([]);
    fs::write(storage.project_path("main"), json.to_string()).unwrap();
    assert!(matches!(storage.load("main"), Err(DesignerError::DataCorruption(_))));
}

#[test]
fn test_missing_project() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = adapter(&temp_dir);
    assert!(storage.load("nope").unwrap_err().is_not_found());
    assert!(storage.delete("nope").unwrap_err().is_not_found());
    assert!(storage.list().unwrap().is_empty());
}

#[test]
fn test_list_and_delete() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = adapter(&temp_dir);
    for id in ["beta", "alpha"] {
        storage.save(id, &Project::new(), true).unwrap();
    }
    fs::write(storage.dir().join("notes.txt"), "ignored").unwrap();

    assert_eq!(storage.list().unwrap(), vec!["alpha", "beta"]);

    storage.delete("alpha").unwrap();
    assert!(!storage.exists("alpha"));
    assert!(!storage.export_path("alpha").exists());
    assert_eq!(storage.list().unwrap(), vec!["beta"]);
}

#[test]
fn test_loaded_project_uses_adapter_capabilities() {
    let temp_dir = TempDir::new().unwrap();
    let table = CapabilityTable::new()
        .with_class("Panel", ClassCapabilities::container("Ext.panel.Panel"))
        .with_class("Frame", ClassCapabilities::container("X.Frame").window());
    let mut storage = FileAdapter::new(temp_dir.path(), Arc::new(table));

    storage.save("custom", &Project::new(), false).unwrap();
    let mut project = storage.load("custom").unwrap();
    project
        .add_object(LAYOUT_ROOT, ComponentDescriptor::new("frame", "Frame"))
        .unwrap();
    assert_eq!(project.get_parent("frame"), Some(COMPONENT_ROOT));
}
