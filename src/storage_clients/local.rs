use crate::error::{Result, StowageError};
use crate::storage_clients::{ObjectStore, StoreDefinition, StoreField, StoreFields, required_field};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Object store backed by a local directory: `<root>/<bucket>/<key>`.
pub struct LocalObjectStore {
    path: PathBuf,
}

impl LocalObjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        for (kind, name) in [("bucket", bucket), ("object", key)] {
            let escapes = Path::new(name)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if name.is_empty() || escapes {
                return Err(StowageError::InvalidName {
                    message: format!("'{}' is not a valid {} name", name, kind),
                });
            }
        }

        Ok(self.path.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        _content_type: Option<&str>,
    ) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        debug!(path = %path.display(), size = data.len(), "local put_object");

        let to_transfer = |e: std::io::Error| StowageError::Transfer {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: e.to_string(),
        };

        if let Some(parent_dir) = path.parent() {
            tokio::fs::create_dir_all(parent_dir)
                .await
                .map_err(to_transfer)?;
        }

        tokio::fs::write(&path, data).await.map_err(to_transfer)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        debug!(path = %path.display(), "local get_object");

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StowageError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) => Err(StowageError::Transfer {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

fn build_store(fields: &StoreFields) -> Result<Arc<dyn ObjectStore>> {
    let path = Path::new(required_field(fields, "path")?);

    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| StowageError::Connection {
            message: format!("Failed to create path {}: {}", path.display(), e),
        })?;
    } else if !path.is_dir() {
        return Err(StowageError::Connection {
            message: format!("{} is not a directory", path.display()),
        });
    }

    Ok(Arc::new(LocalObjectStore::new(path)))
}

const LOCAL_FIELDS: &[StoreField] = &[StoreField {
    key: "path",
    help: "The directory holding one sub-directory per bucket",
    required: true,
    secret: false,
    default_value: None,
}];

pub const DEFINITION: StoreDefinition = StoreDefinition {
    id: "local",
    label: "local directory",
    fields: LOCAL_FIELDS,
    build_store,
};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp_dir.path());

        store
            .put_object("photos", "2024/cat.png", b"meow", None)
            .await
            .unwrap();

        assert!(temp_dir.path().join("photos/2024/cat.png").is_file());
        assert_eq!(store.get_object("photos", "2024/cat.png").await.unwrap(), b"meow");
    }

    #[tokio::test]
    async fn test_get_missing_object() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp_dir.path());

        let err = store.get_object("nobucket", "nothing.txt").await.unwrap_err();
        assert_eq!(
            err,
            StowageError::ObjectNotFound {
                bucket: "nobucket".to_string(),
                key: "nothing.txt".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp_dir.path());

        for key in ["../outside.txt", "/etc/passwd", ""] {
            let err = store.put_object("bucket", key, b"x", None).await.unwrap_err();
            assert!(matches!(err, StowageError::InvalidName { .. }), "{key}");
        }
    }

    #[test]
    fn test_build_store_creates_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("objects");
        let mut fields = StoreFields::new();
        fields.insert("path".to_string(), root.display().to_string());

        assert!(build_store(&fields).is_ok());
        assert!(root.is_dir());
    }

    #[test]
    fn test_build_store_rejects_file_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("not-a-dir");
        std::fs::write(&root, b"").unwrap();
        let mut fields = StoreFields::new();
        fields.insert("path".to_string(), root.display().to_string());

        let err = build_store(&fields).err().unwrap();
        assert!(matches!(err, StowageError::Connection { .. }));
    }
}
