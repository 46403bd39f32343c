use crate::error::{Result, StowageError};
use crate::storage_clients::{ObjectStore, StoreDefinition, StoreField, StoreFields, required_field};
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3 as s3;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_types::region::Region;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

pub struct S3ObjectStore {
    client: s3::Client,
}

pub struct S3ObjectStoreConfig {
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
}

impl S3ObjectStore {
    pub fn new(config: S3ObjectStoreConfig) -> Self {
        let creds = Credentials::new(
            config.access_key,
            config.secret_key,
            config.session_token,
            None,
            "stowage",
        );

        let shared_config = aws_config::SdkConfig::builder()
            .credentials_provider(s3::config::SharedCredentialsProvider::new(creds))
            .region(Region::new(config.region))
            .build();

        let mut s3_config_builder = s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }
        let s3_config = s3_config_builder
            .force_path_style(config.force_path_style)
            .build();

        let client = s3::Client::from_conf(s3_config);

        Self { client }
    }

    /// Wraps a pre-configured SDK client.
    pub fn from_client(client: s3::Client) -> Self {
        Self { client }
    }
}

fn is_missing(code: Option<&str>) -> bool {
    matches!(code, Some("NoSuchBucket") | Some("NoSuchKey") | Some("NotFound"))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<()> {
        debug!(bucket, key, size = data.len(), "s3 put_object");

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(Bytes::copy_from_slice(data).into())
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                if is_missing(service_err.code()) {
                    StowageError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    StowageError::Transfer {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message: DisplayErrorContext(&service_err).to_string(),
                    }
                }
            })?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        debug!(bucket, key, "s3 get_object");

        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() || is_missing(service_err.code()) {
                    StowageError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    StowageError::Transfer {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message: DisplayErrorContext(&service_err).to_string(),
                    }
                }
            })?;

        let data = resp.body.collect().await.map_err(|e| StowageError::Transfer {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(data.into_bytes().to_vec())
    }
}

fn build_store(fields: &StoreFields) -> Result<Arc<dyn ObjectStore>> {
    let region = required_field(fields, "region")?.clone();
    let access_key = required_field(fields, "access_key")?.clone();
    let secret_key = required_field(fields, "secret_key")?.clone();
    let session_token = fields.get("session_token").cloned();
    let endpoint = fields.get("endpoint").cloned();
    let force_path_style = match fields.get("force_path_style").map(String::as_str) {
        None => false,
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        Some(other) => {
            return Err(StowageError::Credential {
                message: format!("force_path_style must be 'true' or 'false', got '{}'", other),
            });
        }
    };

    if let Some(endpoint) = &endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(StowageError::Connection {
                message: format!("Endpoint '{}' is not an http(s) URL", endpoint),
            });
        }
    }

    Ok(Arc::new(S3ObjectStore::new(S3ObjectStoreConfig {
        region,
        access_key,
        secret_key,
        session_token,
        endpoint,
        force_path_style,
    })))
}

fn default_s3_endpoint(fields: &StoreFields) -> String {
    let region = fields
        .get("region")
        .cloned()
        .unwrap_or_else(|| "us-east-1".to_string());
    format!("https://s3.{}.amazonaws.com", region)
}

const S3_FIELDS: &[StoreField] = &[
    StoreField {
        key: "region",
        help: "The region of the S3-compatible service",
        required: true,
        secret: false,
        default_value: None,
    },
    StoreField {
        key: "access_key",
        help: "The access key (HMAC key id for Google Cloud Storage)",
        required: true,
        secret: true,
        default_value: None,
    },
    StoreField {
        key: "secret_key",
        help: "The secret key",
        required: true,
        secret: true,
        default_value: None,
    },
    StoreField {
        key: "session_token",
        help: "An optional session token for temporary credentials",
        required: false,
        secret: true,
        default_value: None,
    },
    StoreField {
        key: "endpoint",
        help: "The endpoint URL (e.g. https://storage.googleapis.com)",
        required: false,
        secret: false,
        default_value: Some(default_s3_endpoint),
    },
    StoreField {
        key: "force_path_style",
        help: "Address buckets as path segments instead of subdomains ('true' or 'false')",
        required: false,
        secret: false,
        default_value: None,
    },
];

pub const DEFINITION: StoreDefinition = StoreDefinition {
    id: "s3",
    label: "S3-compatible",
    fields: S3_FIELDS,
    build_store,
};

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
    use aws_sdk_s3::operation::put_object::{PutObjectError, PutObjectOutput};
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::error::NoSuchKey;
    use aws_smithy_mocks::{mock, mock_client};

    fn fields(pairs: &[(&str, &str)]) -> StoreFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_endpoint_uses_region() {
        let fields = fields(&[("region", "eu-west-3")]);
        assert_eq!(default_s3_endpoint(&fields), "https://s3.eu-west-3.amazonaws.com");
    }

    #[test]
    fn test_build_store_rejects_bad_endpoint() {
        let fields = fields(&[
            ("region", "auto"),
            ("access_key", "key"),
            ("secret_key", "secret"),
            ("endpoint", "storage.googleapis.com"),
        ]);
        let err = build_store(&fields).err().unwrap();
        assert!(matches!(err, StowageError::Connection { .. }));
    }

    #[test]
    fn test_build_store_rejects_bad_path_style() {
        let fields = fields(&[
            ("region", "auto"),
            ("access_key", "key"),
            ("secret_key", "secret"),
            ("force_path_style", "sometimes"),
        ]);
        let err = build_store(&fields).err().unwrap();
        assert!(matches!(err, StowageError::Credential { .. }));
    }

    #[test]
    fn test_missing_codes() {
        assert!(is_missing(Some("NoSuchBucket")));
        assert!(is_missing(Some("NoSuchKey")));
        assert!(!is_missing(Some("AccessDenied")));
        assert!(!is_missing(None));
    }

    fn service_error(code: &str) -> ErrorMetadata {
        ErrorMetadata::builder()
            .code(code)
            .message("rejected by the service")
            .build()
    }

    #[tokio::test]
    async fn test_get_object_returns_body() {
        let rule = mock!(aws_sdk_s3::Client::get_object)
            .match_requests(|req| req.bucket() == Some("reports") && req.key() == Some("q1.csv"))
            .then_output(|| {
                GetObjectOutput::builder()
                    .body(ByteStream::from_static(b"a,b\n1,2\n"))
                    .build()
            });
        let store = S3ObjectStore::from_client(mock_client!(aws_sdk_s3, [&rule]));

        let data = store.get_object("reports", "q1.csv").await.unwrap();

        assert_eq!(data, b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_get_object_no_such_key_is_not_found() {
        let rule = mock!(aws_sdk_s3::Client::get_object)
            .then_error(|| GetObjectError::NoSuchKey(NoSuchKey::builder().build()));
        let store = S3ObjectStore::from_client(mock_client!(aws_sdk_s3, [&rule]));

        let err = store.get_object("reports", "missing.csv").await.unwrap_err();

        assert_eq!(
            err,
            StowageError::ObjectNotFound {
                bucket: "reports".to_string(),
                key: "missing.csv".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_get_object_no_such_bucket_is_not_found() {
        let rule = mock!(aws_sdk_s3::Client::get_object)
            .then_error(|| GetObjectError::generic(service_error("NoSuchBucket")));
        let store = S3ObjectStore::from_client(mock_client!(aws_sdk_s3, [&rule]));

        let err = store.get_object("gone", "q1.csv").await.unwrap_err();

        assert!(matches!(err, StowageError::ObjectNotFound { ref bucket, .. } if bucket == "gone"));
    }

    #[tokio::test]
    async fn test_get_object_access_denied_is_transfer_error() {
        let rule = mock!(aws_sdk_s3::Client::get_object)
            .then_error(|| GetObjectError::generic(service_error("AccessDenied")));
        let store = S3ObjectStore::from_client(mock_client!(aws_sdk_s3, [&rule]));

        let err = store.get_object("reports", "q1.csv").await.unwrap_err();

        match err {
            StowageError::Transfer { bucket, key, .. } => {
                assert_eq!(bucket, "reports");
                assert_eq!(key, "q1.csv");
            }
            other => panic!("expected a transfer error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_put_object_sends_content_type() {
        let rule = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|req| {
                req.bucket() == Some("reports")
                    && req.key() == Some("q1.csv")
                    && req.content_type() == Some("text/csv")
            })
            .then_output(|| PutObjectOutput::builder().build());
        let store = S3ObjectStore::from_client(mock_client!(aws_sdk_s3, [&rule]));

        store
            .put_object("reports", "q1.csv", b"a,b\n", Some("text/csv"))
            .await
            .unwrap();

        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_put_object_no_such_bucket_is_not_found() {
        let rule = mock!(aws_sdk_s3::Client::put_object)
            .then_error(|| PutObjectError::generic(service_error("NoSuchBucket")));
        let store = S3ObjectStore::from_client(mock_client!(aws_sdk_s3, [&rule]));

        let err = store
            .put_object("gone", "q1.csv", b"a,b\n", None)
            .await
            .unwrap_err();

        assert!(matches!(err, StowageError::ObjectNotFound { ref bucket, .. } if bucket == "gone"));
    }
}
