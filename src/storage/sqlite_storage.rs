use crate::{
    domain::Snapshot,
    error::{Result, TrellisError},
    storage::Storage,
};
use async_trait::async_trait;

/// SQLite-based storage backend for the board snapshot.
pub struct SqliteStorage {
    _connection: (), // Placeholder for future implementation
}

impl SqliteStorage {
    /// Creates a new SQLite storage instance
    pub fn new(_database_path: &str) -> Result<Self> {
        // TODO: Implement SQLite storage
        Err(TrellisError::Persistence(
            "SQLite storage not yet implemented".to_string(),
        ))
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        Err(TrellisError::Persistence(
            "SQLite storage not yet implemented".to_string(),
        ))
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        Err(TrellisError::Persistence(
            "SQLite storage not yet implemented".to_string(),
        ))
    }

    async fn save(&self, _snapshot: &Snapshot) -> Result<()> {
        Err(TrellisError::Persistence(
            "SQLite storage not yet implemented".to_string(),
        ))
    }

    async fn is_initialized(&self) -> bool {
        false
    }
}
