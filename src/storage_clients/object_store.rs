use async_trait::async_trait;

use crate::error::Result;

/// A remote object store addressed by bucket and key.
///
/// Each call is a single whole-object transfer. Implementations report a
/// missing bucket or key as `StowageError::ObjectNotFound` and every other
/// remote failure as `StowageError::Transfer`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}
