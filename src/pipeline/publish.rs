//! Publish: upload the archive and mint a presigned download URL.
//!
//! The orchestrator talks to the store only through [`ObjectStore`], so
//! tests can substitute a recording fake. [`S3Store`] is the production
//! implementation; Alibaba OSS, MinIO and AWS S3 all speak the S3 API, and
//! STS temporary credentials map onto an access key, secret and session token.
//!
//! The client makes exactly one attempt per operation and sends plain,
//! content-length framed bodies. The SDK's default flexible checksums use
//! `aws-chunked` encoding with a trailer, which OSS does not accept.

use crate::config::StoreConfig;
use crate::error::Pdf2ZipError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{
    Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Remote name for a freshly produced archive: `pdf_images_<uuid-v4>.zip`.
///
/// The random component is what keeps concurrent invocations from
/// overwriting each other's objects.
pub fn object_name() -> String {
    format!("pdf_images_{}.zip", Uuid::new_v4())
}

/// The two store operations the pipeline needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `local` as `key`, replacing any existing object.
    async fn put_file(&self, local: &Path, key: &str) -> Result<(), Pdf2ZipError>;

    /// A URL granting GET on `key` for `expires_in`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, Pdf2ZipError>;
}

/// S3-compatible object store client bound to one bucket.
#[derive(Debug, Clone)]
pub struct S3Store {
    inner: Option<(Client, String)>,
    missing: Vec<&'static str>,
}

impl S3Store {
    /// Build a client from `config`.
    ///
    /// Never fails: absent settings are remembered and reported as
    /// [`Pdf2ZipError::StoreNotConfigured`] by the first operation.
    pub fn new(config: &StoreConfig) -> Self {
        let missing = config.missing();
        let endpoint = config.endpoint_url();
        let (Some(endpoint), Some(bucket), Some(key_id), Some(secret), true) = (
            endpoint,
            config.bucket.clone(),
            config.access_key_id.clone(),
            config.access_key_secret.clone(),
            missing.is_empty(),
        ) else {
            return Self {
                inner: None,
                missing,
            };
        };

        let credentials = Credentials::new(
            key_id,
            secret,
            config.security_token.clone().filter(|t| !t.is_empty()),
            None,
            "pdf2zip",
        );

        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new(config.signing_region()))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style)
            .retry_config(RetryConfig::disabled())
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(timeout)
                    .operation_timeout(timeout)
                    .build(),
            )
            .build();

        Self {
            inner: Some((Client::from_conf(s3_config), bucket.trim().to_string())),
            missing,
        }
    }

    fn client(&self) -> Result<(&Client, &str), Pdf2ZipError> {
        match &self.inner {
            Some((client, bucket)) => Ok((client, bucket.as_str())),
            None => Err(Pdf2ZipError::StoreNotConfigured {
                missing: self.missing.clone(),
            }),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_file(&self, local: &Path, key: &str) -> Result<(), Pdf2ZipError> {
        let (client, bucket) = self.client()?;
        let upload_err = |detail: String| Pdf2ZipError::UploadFailed {
            object: key.to_string(),
            detail,
        };

        let body = ByteStream::from_path(local)
            .await
            .map_err(|e| upload_err(format!("cannot read '{}': {}", local.display(), e)))?;

        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/zip")
            .body(body)
            .send()
            .await
            .map_err(|e| upload_err(format!("{}", aws_sdk_s3::error::DisplayErrorContext(&e))))?;

        info!("Uploaded {} to bucket {} as {}", local.display(), bucket, key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, Pdf2ZipError> {
        let (client, bucket) = self.client()?;
        let sign_err = |detail: String| Pdf2ZipError::SigningFailed {
            object: key.to_string(),
            detail,
        };

        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| sign_err(e.to_string()))?;
        let request = client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| sign_err(format!("{}", aws_sdk_s3::error::DisplayErrorContext(&e))))?;

        info!("Generated presigned URL for {} (valid {}s)", key, expires_in.as_secs());
        Ok(request.uri().to_string())
    }
}
