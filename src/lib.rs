pub mod capabilities;
pub mod codegen;
pub mod commands;
pub mod component;
pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod methods;
pub mod project;
pub mod storage;
pub mod tree;

pub use capabilities::{CapabilityProvider, CapabilityTable, ClassCapabilities};
pub use codegen::{code_hash, Replacement};
pub use component::{ComponentDescriptor, Param, PropertyValue};
pub use editor::Editor;
pub use error::{DesignerError, Result};
pub use project::{Project, COMPONENT_ROOT, LAYOUT_ROOT};
pub use storage::{FileAdapter, MemoryAdapter, StorageAdapter};

/// Initialize logging from `RUST_LOG`, warnings only by default
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("uidesigner=warn"))
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
