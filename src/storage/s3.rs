//! S3-compatible object store.

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::time::Instant;

use super::{ObjectStore, StorageError, StorageResult};
use crate::config::StorageConfig;

/// Object store talking to an S3-compatible bucket.
///
/// Credentials come from the AWS default provider chain.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a store from an existing client.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the storage configuration.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(config.region.clone()));
        let retry_config = RetryConfig::standard().with_max_attempts(3);

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint_url,
            "S3 store configured"
        );

        Self::new(Client::from_conf(builder.build()), config.bucket.clone())
    }

    /// `CopySource` value: bucket plus the percent-encoded key, keeping `/`.
    fn copy_source(&self, key: &str) -> String {
        let encoded: Vec<_> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.bucket, encoded.join("/"))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let size = data.len();
        let start = Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    "S3 put failed"
                );
                StorageError::Put(e.to_string())
            })?;

        tracing::debug!(
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_millis() as u64,
            "S3 put"
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err)
                    if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) =>
                {
                    StorageError::NotFound(key.to_string())
                }
                _ => StorageError::Get(e.to_string()),
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Get(e.to_string()))?;

        Ok(data.into_bytes())
    }

    async fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        let start = Instant::now();

        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(self.copy_source(from))
            .key(to)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, from = %from, to = %to, "S3 copy failed");
                StorageError::Copy(e.to_string())
            })?;

        tracing::debug!(
            from = %from,
            to = %to,
            duration_ms = start.elapsed().as_millis() as u64,
            "S3 copy"
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, bucket = %self.bucket, key = %key, "S3 delete failed");
                StorageError::Delete(e.to_string())
            })?;

        tracing::debug!(key = %key, "S3 delete");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .finish()
    }
}
