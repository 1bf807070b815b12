use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::store::lock;

/// Named string blobs: the durable key-value storage boundary.
pub trait BlobStore: Send + Sync {
    fn read(&self, name: &str) -> Result<Option<String>>;
    fn write(&self, name: &str, contents: &str) -> Result<()>;
    fn remove(&self, name: &str) -> Result<()>;
}

/// One `<name>.json` file per blob in a directory.
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.blob_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store file: {}", name))?;
        Ok(Some(contents))
    }

    fn write(&self, name: &str, contents: &str) -> Result<()> {
        // Each write gets its own temp file, renamed over the blob.
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temp file for store: {}", name))?;
        tmp.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write store file: {}", name))?;
        tmp.persist(self.blob_path(name))
            .with_context(|| format!("Failed to replace store file: {}", name))?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.blob_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove store file: {}", name))?;
        }
        Ok(())
    }
}

/// Process-local blobs, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.blobs).keys().cloned().collect();
        names.sort();
        names
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, name: &str) -> Result<Option<String>> {
        Ok(lock(&self.blobs).get(name).cloned())
    }

    fn write(&self, name: &str, contents: &str) -> Result<()> {
        lock(&self.blobs).insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        lock(&self.blobs).remove(name);
        Ok(())
    }
}
