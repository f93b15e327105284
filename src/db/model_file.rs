use std::path::PathBuf;

use crate::{
    error::AppResult,
    services::{collaborative::TrainedModel, exporter::write_atomically},
};

use super::ModelStore;

/// Keeps the trained model as a JSON file on local disk
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ModelStore for FileModelStore {
    async fn save(&self, model: &TrainedModel) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_atomically(&self.path, &serde_json::to_vec(model)?).await?;
        tracing::info!(path = %self.path.display(), "Trained model saved");
        Ok(())
    }

    async fn load(&self) -> AppResult<Option<TrainedModel>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}
