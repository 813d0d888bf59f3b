use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    /// Removing a key that does not exist is not an error.
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
}

/// Stores each object as a flat file `root/key`.
#[derive(Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> anyhow::Result<PathBuf> {
        let mut components = Path::new(key).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(key)),
            _ => anyhow::bail!("invalid object key {key:?}"),
        }
    }
}

#[async_trait]
impl StorageClient for LocalDiskStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        let path = self.resolve(key)?;
        let size = body.len();
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        debug!(key, size, content_type, "object stored");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_and_delete_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let storage = LocalDiskStorage::new(&root).await.unwrap();

        storage
            .put_object("1700000000000-receipt-abcd1234.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        let path = root.join("1700000000000-receipt-abcd1234.png");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"png");

        storage.delete_object("1700000000000-receipt-abcd1234.png").await.unwrap();
        assert!(!path.exists());
        storage.delete_object("1700000000000-receipt-abcd1234.png").await.unwrap();
    }

    #[tokio::test]
    async fn keys_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(dir.path()).await.unwrap();
        for key in ["../evil.png", "nested/evil.png", "/etc/passwd", ""] {
            assert!(
                storage.put_object(key, Bytes::new(), "image/png").await.is_err(),
                "{key}"
            );
        }
    }
}
