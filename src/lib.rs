//! Upload and download whole objects to an object store under a bounded
//! timeout, and describe what was transferred.
//!
//! ```no_run
//! use stowage::Client;
//!
//! # async fn run() -> stowage::Result<()> {
//! let credential = std::fs::read("credential.json").unwrap_or_default();
//! let client = Client::builder("admin@example.com", credential).build()?;
//!
//! client.upload_path("reports", "/tmp/a/report.csv", None).await?;
//! let file = client
//!     .download_to_dir("reports", "report.csv", "/tmp/b", None)
//!     .await?;
//! println!("{} bytes at {}", file.size, file.full_file_path);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod core;
pub mod error;
pub mod storage_clients;

pub use client::{Client, ClientBuilder, ClientOptions, DEFAULT_TIMEOUT};
pub use crate::core::format::format_size_si;
pub use crate::core::metadata::{BucketObject, DownloadedFile};
pub use error::{Result, StowageError};
pub use storage_clients::{ObjectStore, StoreCredential};
