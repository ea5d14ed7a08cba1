use crate::{
    domain::Snapshot,
    error::{Result, TrellisError},
    storage::Storage,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage: the whole snapshot as one pretty-printed JSON
/// document under a dot-directory in the project root.
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const TRELLIS_DIR: &'static str = ".trellis";
    const SNAPSHOT_FILE: &'static str = "snapshot.json";

    /// Creates a new FileStorage instance for the given project root.
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::TRELLIS_DIR),
        }
    }

    fn snapshot_file(&self) -> PathBuf {
        self.root_path.join(Self::SNAPSHOT_FILE)
    }

    async fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_path.exists() {
            fs::create_dir_all(&self.root_path)
                .await
                .map_err(|e| TrellisError::Persistence(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists().await?;

        if !self.snapshot_file().exists() {
            self.save(&Snapshot::new()).await?;
        }

        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        let file = self.snapshot_file();
        if !file.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&file)
            .await
            .map_err(|e| TrellisError::Persistence(e.to_string()))?;
        let snapshot: Snapshot = serde_json::from_str(&contents)
            .map_err(|e| TrellisError::Serialization(e.to_string()))?;

        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.ensure_directory_exists().await?;

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| TrellisError::Serialization(e.to_string()))?;
        fs::write(self.snapshot_file(), json)
            .await
            .map_err(|e| TrellisError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.snapshot_file().exists()
    }
}
