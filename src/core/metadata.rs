use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::Client;
use crate::error::Result;

/// Bytes of one object together with where they live remotely.
#[derive(Debug, PartialEq, Eq, Serialize, Clone)]
pub struct BucketObject {
    pub bucket_name: String,
    pub filename: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl BucketObject {
    pub fn new(bucket_name: impl Into<String>, filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            filename: filename.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Uploads this object through `client`.
    ///
    /// `timeout` falls back to the client's default when `None`.
    pub async fn upload(
        &self,
        client: &Client,
        timeout: Option<std::time::Duration>,
    ) -> Result<()> {
        client.upload_object(self, timeout).await.map(|_| ())
    }
}

/// An object written to the local filesystem, with the metadata the
/// filesystem reported after the write.
#[derive(Debug, PartialEq, Eq, Serialize, Clone)]
pub struct DownloadedFile {
    pub object: BucketObject,
    #[serde(skip)]
    pub local_data: Vec<u8>,
    pub parent_folder: String,
    pub full_file_path: String,
    pub extension: String,
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    pub mode: u32,
    pub modified: DateTime<Utc>,
    /// Taken when the download finished, not reported by the filesystem.
    pub created: DateTime<Utc>,
}

impl DownloadedFile {
    pub fn bucket(&self) -> &str {
        &self.object.bucket_name
    }
}
