//! Authenticated client and the transfer operations built on it.

use std::fmt;
use std::future::Future;
use std::path::{Component, Path};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::core::format::format_size_si;
use crate::core::metadata::{BucketObject, DownloadedFile};
use crate::core::permissions::file_mode;
use crate::error::{Result, StowageError};
use crate::storage_clients::{ObjectStore, build_store, parse_credential};

/// Bound applied to a transfer when the caller does not pass one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Send a content type guessed from the object name's extension.
    pub content_type_tagging: bool,
    pub default_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            content_type_tagging: true,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Builds a [`Client`] from an admin email and a credential payload.
pub struct ClientBuilder {
    admin_email: String,
    credential: Vec<u8>,
    options: ClientOptions,
}

impl ClientBuilder {
    pub fn new(admin_email: impl Into<String>, credential: impl Into<Vec<u8>>) -> Self {
        Self {
            admin_email: admin_email.into(),
            credential: credential.into(),
            options: ClientOptions::default(),
        }
    }

    pub fn content_type_tagging(mut self, enabled: bool) -> Self {
        self.options.content_type_tagging = enabled;
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.options.default_timeout = timeout;
        self
    }

    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Client> {
        check_timeout(self.options.default_timeout)?;
        let credential = parse_credential(&self.credential)?;
        let domain = domain_of(&self.admin_email)?;
        let store = build_store(&credential)?;

        info!(
            storage_type = %credential.storage_type,
            domain = %domain,
            "client ready"
        );

        Ok(Client {
            store,
            storage_type: credential.storage_type,
            admin_email: self.admin_email,
            domain,
            options: self.options,
        })
    }
}

/// Handle used to issue transfers. Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct Client {
    store: Arc<dyn ObjectStore>,
    storage_type: String,
    admin_email: String,
    domain: String,
    options: ClientOptions,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("storage_type", &self.storage_type)
            .field("admin_email", &self.admin_email)
            .field("domain", &self.domain)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn builder(
        admin_email: impl Into<String>,
        credential: impl Into<Vec<u8>>,
    ) -> ClientBuilder {
        ClientBuilder::new(admin_email, credential)
    }

    /// Wraps an already constructed backend.
    pub fn from_store(
        admin_email: impl Into<String>,
        store: Arc<dyn ObjectStore>,
        options: ClientOptions,
    ) -> Result<Self> {
        let admin_email = admin_email.into();
        let domain = domain_of(&admin_email)?;
        check_timeout(options.default_timeout)?;

        Ok(Self {
            store,
            storage_type: "custom".to_string(),
            admin_email,
            domain,
            options,
        })
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn storage_type(&self) -> &str {
        &self.storage_type
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn content_type_for(&self, filename: &str) -> Option<&'static str> {
        if !self.options.content_type_tagging {
            return None;
        }
        mime_guess::from_path(filename).first_raw()
    }

    pub async fn upload_data(
        &self,
        bucket_name: &str,
        filename: &str,
        data: impl Into<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Result<BucketObject> {
        let data = data.into();
        self.put(bucket_name, filename, &data, timeout).await?;
        Ok(BucketObject::new(bucket_name, filename, data))
    }

    pub async fn upload_object(
        &self,
        object: &BucketObject,
        timeout: Option<Duration>,
    ) -> Result<BucketObject> {
        self.put(&object.bucket_name, &object.filename, &object.data, timeout)
            .await?;
        Ok(object.clone())
    }

    /// Uploads a local file under its base name.
    pub async fn upload_path(
        &self,
        bucket_name: &str,
        path: impl AsRef<Path>,
        timeout: Option<Duration>,
    ) -> Result<BucketObject> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| StowageError::InvalidName {
                message: format!("{} has no file name", path.display()),
            })?;

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StowageError::local_io(path, e))?;

        self.upload_data(bucket_name, &filename, data, timeout).await
    }

    pub async fn download_object(
        &self,
        bucket_name: &str,
        object_name: &str,
        timeout: Option<Duration>,
    ) -> Result<BucketObject> {
        check_names(bucket_name, object_name)?;

        let data = self
            .bounded(
                "download",
                bucket_name,
                object_name,
                timeout,
                self.store.get_object(bucket_name, object_name),
            )
            .await?;

        debug!(
            bucket = bucket_name,
            object = object_name,
            size = data.len(),
            "downloaded object"
        );

        Ok(BucketObject::new(bucket_name, object_name, data))
    }

    /// Downloads an object into `destination`, creating the directory if
    /// needed, and reports the metadata of the written file.
    pub async fn download_to_dir(
        &self,
        bucket_name: &str,
        object_name: &str,
        destination: impl AsRef<Path>,
        timeout: Option<Duration>,
    ) -> Result<DownloadedFile> {
        let destination = destination.as_ref();

        if Path::new(object_name)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StowageError::InvalidName {
                message: format!(
                    "'{}' cannot be written below {}",
                    object_name,
                    destination.display()
                ),
            });
        }

        let object = self.download_object(bucket_name, object_name, timeout).await?;

        let full_file_path = destination.join(object_name);
        let parent = full_file_path.parent().unwrap_or(destination);
        if !parent.exists() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StowageError::local_io(parent, e))?;
        }

        tokio::fs::write(&full_file_path, &object.data)
            .await
            .map_err(|e| StowageError::local_io(&full_file_path, e))?;

        let local_data = tokio::fs::read(&full_file_path)
            .await
            .map_err(|e| StowageError::local_io(&full_file_path, e))?;

        let file = tokio::fs::File::open(&full_file_path)
            .await
            .map_err(|e| StowageError::local_io(&full_file_path, e))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| StowageError::local_io(&full_file_path, e))?;
        let modified: DateTime<Utc> = metadata
            .modified()
            .map_err(|e| StowageError::local_io(&full_file_path, e))?
            .into();

        let name = full_file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = full_file_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();

        info!(
            "Downloaded {}[{}] from {{{}}} to --> {}",
            object_name,
            format_size_si(metadata.len()),
            bucket_name,
            full_file_path.display()
        );

        Ok(DownloadedFile {
            object,
            local_data,
            parent_folder: destination.display().to_string(),
            full_file_path: full_file_path.display().to_string(),
            extension,
            name,
            size: metadata.len(),
            is_dir: metadata.is_dir(),
            mode: file_mode(&metadata, &full_file_path),
            modified,
            created: Utc::now(),
        })
    }

    async fn put(
        &self,
        bucket_name: &str,
        filename: &str,
        data: &[u8],
        timeout: Option<Duration>,
    ) -> Result<()> {
        check_names(bucket_name, filename)?;

        let content_type = self.content_type_for(filename);
        self.bounded(
            "upload",
            bucket_name,
            filename,
            timeout,
            self.store.put_object(bucket_name, filename, data, content_type),
        )
        .await?;

        info!(
            "Uploaded {}[{}] to --> {{{}}}",
            filename,
            format_size_si(data.len() as u64),
            bucket_name
        );

        Ok(())
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        bucket_name: &str,
        key: &str,
        timeout: Option<Duration>,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let limit = timeout.unwrap_or(self.options.default_timeout);
        check_timeout(limit)?;

        match tokio::time::timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(bucket = bucket_name, key, error = %e, "{} failed", operation);
                Err(e)
            }
            Err(_) => {
                warn!(bucket = bucket_name, key, ?limit, "{} timed out", operation);
                Err(StowageError::Timeout {
                    operation,
                    bucket: bucket_name.to_string(),
                    key: key.to_string(),
                    timeout: limit,
                })
            }
        }
    }
}

/// The part of an email after `@`.
pub fn domain_of(admin_email: &str) -> Result<String> {
    match admin_email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(domain.to_string())
        }
        _ => Err(StowageError::InvalidEmail {
            email: admin_email.to_string(),
        }),
    }
}

fn check_timeout(timeout: Duration) -> Result<()> {
    if timeout.is_zero() {
        return Err(StowageError::InvalidTimeout { timeout });
    }
    Ok(())
}

fn check_names(bucket_name: &str, object_name: &str) -> Result<()> {
    if bucket_name.is_empty() {
        return Err(StowageError::InvalidName {
            message: "bucket name is empty".to_string(),
        });
    }
    if object_name.is_empty() {
        return Err(StowageError::InvalidName {
            message: "object name is empty".to_string(),
        });
    }
    Ok(())
}
