//! Generated code tests
//!
//! The golden project below covers a class definition with placeholder
//! replacement, a layout object referencing it, a nested column slot and
//! an event listener. Mismatches print a line diff.

use similar::{ChangeTag, TextDiff};
use uidesigner::config::Config;
use uidesigner::events::EventBinding;
use uidesigner::{code_hash, ComponentDescriptor, Project, COMPONENT_ROOT, LAYOUT_ROOT};

const EXPECTED: &str = r#"Ext.ns("appComponents", "appApplication");

Ext.define("appComponents.userStore", {
    extend: "Ext.data.Store",
    autoLoad: true,
    proxy: {type: "ajax", url: "/admin/users"}
});

appApplication.usersGrid = Ext.create("Ext.grid.Panel", {
    store: Ext.create("appComponents.userStore", {}),
    title: "Users",
    columns: [
        Ext.create("Ext.grid.column.Column", {
            dataIndex: "name",
            text: "Name"
        })
    ],
    listeners: {
        itemclick: {
            fn: function(view, record, item, index, e) {
                console.log(record.get("name"));
            }
        }
    }
});

appApplication.usersGrid.show();
"#;

fn golden_project() -> Project {
    let mut project = Project::new();
    project
        .add_object(
            COMPONENT_ROOT,
            ComponentDescriptor::new("userStore", "Store")
                .with_property("autoLoad", true)
                .with_property("proxy", r#"{type: "ajax", url: "[%wroot%][%admp%][%-%]users"}"#),
        )
        .unwrap();
    project
        .add_object(
            LAYOUT_ROOT,
            ComponentDescriptor::new("usersGrid", "Grid")
                .with_property("store", "userStore")
                .with_property("title", "Users"),
        )
        .unwrap();
    project
        .add_object(
            "usersGrid",
            ComponentDescriptor::new("nameColumn", "Grid_Column")
                .with_property("text", "Name")
                .with_property("dataIndex", "name"),
        )
        .unwrap();
    project.events_mut().set_event(
        "usersGrid",
        "itemclick",
        EventBinding::new(r#"console.log(record.get("name"));"#),
    );
    project.set_action_js("appApplication.usersGrid.show();");
    project
}

fn print_diff(expected: &str, actual: &str) {
    let diff = TextDiff::from_lines(expected, actual);
    eprintln!("\n{}", "=".repeat(80));
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        eprint!("{} {}", sign, change);
    }
    eprintln!("{}", "=".repeat(80));
}

#[test]
fn test_golden_project_code() {
    let project = golden_project();
    let actual = project.get_code(&Config::default().replacements());
    if actual != EXPECTED {
        print_diff(EXPECTED, &actual);
        panic!("generated code does not match the golden output");
    }
}

#[test]
fn test_generation_is_deterministic() {
    let replacements = Config::default().replacements();
    let first = golden_project().get_code(&replacements);
    let second = golden_project().get_code(&replacements);
    assert_eq!(first, second);
    assert_eq!(code_hash(&first), code_hash(&second));

    // A snapshot round trip must not change the output either
    let json = serde_json::to_string(&golden_project()).unwrap();
    let restored: Project = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.get_code(&replacements), first);
}

#[test]
fn test_placeholders_kept_without_replacements() {
    let code = golden_project().get_code(&[]);
    assert!(code.contains("[%wroot%][%admp%][%-%]users"));
}

#[test]
fn test_object_code_for_nested_object() {
    let project = golden_project();
    let code = project.get_object_code("nameColumn", &[]).unwrap();
    assert_eq!(
        code,
        "Ext.create(\"Ext.grid.column.Column\", {\n    dataIndex: \"name\",\n    text: \"Name\"\n});\n"
    );
}

#[test]
fn test_component_methods_and_buffered_listeners() {
    let mut project = Project::new();
    project
        .add_object(COMPONENT_ROOT, ComponentDescriptor::new("searchForm", "Form"))
        .unwrap();
    project
        .add_object("searchForm", ComponentDescriptor::new("query", "Form_Field_Text"))
        .unwrap();
    project.events_mut().set_event(
        "query",
        "change",
        EventBinding::new("this.search(newValue);").with_buffer(Some(300)),
    );
    project
        .methods_mut()
        .add_method(
            "searchForm",
            "search",
            vec![uidesigner::Param::new("text", "string")],
            "this.fireEvent(\"search\", text);",
        )
        .unwrap()
        .set_description("Run a search");

    let code = project.get_object_code("searchForm", &[]).unwrap();
    assert!(code.contains("buffer: 300,\n"));
    assert!(code.contains("scope: this\n"));
    assert!(code.contains(
        "    /**\n     * Run a search\n     *\n     * @param string text\n     */\n    search: function(text) {\n        this.fireEvent(\"search\", text);\n    }\n"
    ));
}

#[test]
fn test_window_form_children_created_before_use() {
    let mut project = Project::new();
    let names = uidesigner::Editor::new(&mut project)
        .create_window_form("editWindow")
        .unwrap();
    let code = project.get_object_code(&names.window, &[]).unwrap();

    let init_at = code.find("initComponent: function() {").unwrap();
    assert!(code[init_at..].contains("\n        this.childObjects = {};\n"));

    // Each child is assigned in its own statement before anything reads it
    for child in [&names.save_button, &names.cancel_button, &names.toolbar, &names.form] {
        let assigned = format!("this.childObjects.{} = Ext.create(", child);
        let assigned_at = code
            .find(&assigned)
            .unwrap_or_else(|| panic!("no assignment for {}", child));
        let first_use = code.find(&format!("this.childObjects.{}", child)).unwrap();
        assert_eq!(first_use, assigned_at, "{} read before it is created", child);
    }

    let toolbar_at = code
        .find(&format!("this.childObjects.{} = ", names.toolbar))
        .unwrap();
    let save_at = code
        .find(&format!("this.childObjects.{} = ", names.save_button))
        .unwrap();
    assert!(save_at < toolbar_at);
    assert!(code.contains("this.dockedItems = [\n"));
    assert!(code.contains("this.items = [\n"));
}
