use std::fmt;

/// What kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Object,
    Event,
    Method,
    Node,
    Project,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Object => "object",
            Entity::Event => "event",
            Entity::Method => "method",
            Entity::Node => "tree node",
            Entity::Project => "project",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DesignerError {
    /// Referenced entity does not exist
    #[error("{entity} '{name}' not found")]
    NotFound { entity: Entity, name: String },

    /// Entity with the same key already exists
    #[error("{entity} '{name}' already exists")]
    Conflict { entity: Entity, name: String },

    /// Request is well-formed but not allowed in the current state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Property is not part of the class schema or has the wrong type
    #[error("invalid property '{property}' for class {class}: {reason}")]
    InvalidProperty {
        class: String,
        property: String,
        reason: String,
    },

    /// Deserialized data is not a structurally valid project
    #[error("invalid project data: {0}")]
    DataCorruption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DesignerError {
    pub fn not_found(entity: Entity, name: impl Into<String>) -> Self {
        DesignerError::NotFound {
            entity,
            name: name.into(),
        }
    }

    pub fn conflict(entity: Entity, name: impl Into<String>) -> Self {
        DesignerError::Conflict {
            entity,
            name: name.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        DesignerError::InvalidOperation(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DesignerError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DesignerError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, DesignerError>;
