use crate::{domain::Snapshot, error::Result};
use async_trait::async_trait;

pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Storage trait for persisting the board snapshot.
///
/// The engine calls [`save`](Storage::save) after every committed
/// mutation, fire-and-forget: a failure is surfaced through the error
/// reporter and never corrupts the in-memory snapshot.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend.
    async fn initialize(&self) -> Result<()>;

    /// Loads the persisted snapshot, `None` if nothing was saved yet.
    async fn load(&self) -> Result<Option<Snapshot>>;

    /// Saves the full snapshot.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Checks if the backend has been initialized.
    async fn is_initialized(&self) -> bool;
}
