//! # Trellis Core
//!
//! Core engine for ordered hierarchical board collections.
//!
//! This crate provides the normalized data model and mutation
//! algorithms behind kanban-style board UIs: a flat entity store with
//! a per-parent order index, cascading deletion, within- and
//! across-parent moves, and a drag-session interpreter that turns
//! pick-up/hover/drop events into engine calls, without any
//! dependency on specific UI implementations or storage backends.

pub mod domain;
pub mod drag;
pub mod engine;
pub mod error;
pub mod reporter;
pub mod storage;

// Re-export commonly used types
pub use domain::{
    entity::{Attributes, Entity, EntityKind},
    snapshot::{Snapshot, ROOT_KEY},
};
pub use drag::{DragRef, DragSession};
pub use engine::Engine;
pub use error::{Result, TrellisError};
pub use reporter::ErrorReporter;
pub use storage::Storage;
