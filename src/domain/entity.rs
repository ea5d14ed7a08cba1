use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt, str::FromStr};
use uuid::Uuid;

/// Kind-specific attributes attached to an entity (description,
/// timestamps, deadline, ...). Kept as free-form JSON so the engine
/// stays agnostic of what each board variant stores on its records.
pub type Attributes = BTreeMap<String, Value>;

/// The entity kinds of the containment chains the engine supports:
///
/// - `Board → Column → Task` (classic kanban)
/// - `Stage → Layer → Project → TaskColumn → Task` (content planner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Board,
    Column,
    Stage,
    Layer,
    Project,
    TaskColumn,
    Task,
}

impl EntityKind {
    /// Stable slug used in generated ids and composite identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Column => "column",
            Self::Stage => "stage",
            Self::Layer => "layer",
            Self::Project => "project",
            Self::TaskColumn => "task-column",
            Self::Task => "task",
        }
    }

    /// Whether this kind may own ordered children.
    pub fn is_container(&self) -> bool {
        !matches!(self, Self::Task)
    }

    /// Root kinds live at the top of a chain and have no parent.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Board | Self::Stage)
    }

    /// The containment chart: which kinds may live directly under
    /// this one. Tasks are accepted by both column flavours so a
    /// leaf can only ever move between columns of the same depth.
    pub fn allows_child(&self, child: EntityKind) -> bool {
        matches!(
            (self, child),
            (Self::Board, Self::Column)
                | (Self::Column, Self::Task)
                | (Self::Stage, Self::Layer)
                | (Self::Layer, Self::Project)
                | (Self::Project, Self::TaskColumn)
                | (Self::TaskColumn, Self::Task)
        )
    }

    /// Default title given to a freshly added entity when the caller
    /// supplies none.
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Board => "New Board",
            Self::Column => "New Column",
            Self::Stage => "New Stage",
            Self::Layer => "New Layer",
            Self::Project => "New Project",
            Self::TaskColumn => "New Column",
            Self::Task => "New Task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "board" => Ok(Self::Board),
            "column" => Ok(Self::Column),
            "stage" => Ok(Self::Stage),
            "layer" => Ok(Self::Layer),
            "project" => Ok(Self::Project),
            "task-column" => Ok(Self::TaskColumn),
            "task" => Ok(Self::Task),
            _ => Err(format!("Unknown entity kind '{}'", s)),
        }
    }
}

/// A single record in the entity store.
///
/// Ordering among siblings is not stored here; it lives in the
/// snapshot's order index, keyed by `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Entity {
    /// Creates an entity with a freshly generated id and creation
    /// timestamps stamped into its attributes.
    pub fn new(kind: EntityKind, parent_id: Option<String>, title: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        let mut attributes = Attributes::new();
        attributes.insert("createdAt".to_string(), Value::String(now.clone()));
        attributes.insert("updatedAt".to_string(), Value::String(now));

        Self {
            id: generate_id(kind),
            kind,
            parent_id,
            title: title.into(),
            attributes,
        }
    }
}

/// Generates a collision-free entity id, prefixed with the kind slug
/// (`task-550e8400-...`).
pub fn generate_id(kind: EntityKind) -> String {
    format!("{}-{}", kind.as_str(), Uuid::new_v4())
}
