//! S3 store.

use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use tracing::{debug, info};

use super::ObjectStore;
use crate::error::{ProviderError, ProviderResult};
use crate::feed::BoxFuture;

/// Stores objects in one S3 bucket.
///
/// Credentials and region come from the standard AWS environment
/// (`AWS_REGION`, `AWS_PROFILE`, instance role, ...).
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Creates a store for `bucket` from the AWS environment.
    ///
    /// `region` overrides the region found in the environment.
    pub async fn from_env(bucket: impl Into<String>, region: Option<String>) -> Self {
        let bucket = bucket.into();
        info!(bucket = %bucket, "Initializing S3 store");

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self::with_client(Client::new(&config), bucket)
    }

    /// Creates a store from an existing client.
    pub fn with_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Returns the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn read(&self, key: &str) -> ProviderResult<Vec<u8>> {
        debug!(bucket = %self.bucket, key, "Getting object");

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| get_error(&self.bucket, key, e))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| {
                ProviderError::network(format!("failed to read s3://{}/{}: {}", self.bucket, key, e))
                    .with_backend("s3")
            })?
            .into_bytes();

        Ok(bytes.to_vec())
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> ProviderResult<()> {
        let bytes = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(data.into())
            .send()
            .await
            .map_err(|e| {
                ProviderError::storage(format!(
                    "failed to write s3://{}/{}: {}",
                    self.bucket, key, e
                ))
                .with_backend("s3")
            })?;

        debug!(bucket = %self.bucket, key, bytes, "Put object");
        Ok(())
    }
}

fn get_error<R>(bucket: &str, key: &str, err: SdkError<GetObjectError, R>) -> ProviderError
where
    R: std::fmt::Debug,
{
    let not_found = err
        .as_service_error()
        .is_some_and(|e| matches!(e, GetObjectError::NoSuchKey(_)));

    let message = format!("s3://{}/{}: {}", bucket, key, err);
    let error = if not_found {
        ProviderError::not_found(message)
    } else {
        ProviderError::storage(message)
    };
    error.with_backend("s3")
}

impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>> {
        Box::pin(self.read(key))
    }

    fn put<'a>(&'a self, key: &'a str, data: Vec<u8>) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.write(key, data))
    }
}
