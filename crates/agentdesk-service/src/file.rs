use std::path::{Path, PathBuf};

use agentdesk_core::attachment::mime_type_for;
use bytes::Bytes;

use crate::ServiceError;

/// A user-selected file: name, size and a way to get at its bytes.
#[derive(Debug, Clone)]
pub struct FileHandle {
    name: String,
    size: u64,
    source: FileSource,
}

#[derive(Debug, Clone)]
enum FileSource {
    Memory(Bytes),
    /// Read lazily when the transfer step runs.
    Path(PathBuf),
}

impl FileHandle {
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            size: data.len() as u64,
            source: FileSource::Memory(data),
        }
    }

    /// Stat a file on disk. Its content is not read until upload.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| ServiceError::Io(format!("stat {}: {e}", path.display())))?;
        if !meta.is_file() {
            return Err(ServiceError::Io(format!("{} is not a file", path.display())));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self {
            name,
            size: meta.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> &'static str {
        mime_type_for(&self.name)
    }

    pub async fn read(&self) -> Result<Bytes, ServiceError> {
        match &self.source {
            FileSource::Memory(data) => Ok(data.clone()),
            FileSource::Path(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|e| ServiceError::Io(format!("read {}: {e}", path.display()))),
        }
    }
}
