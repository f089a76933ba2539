//! S3-based object store
//!
//! Stores objects in AWS S3 (or S3-compatible services like MinIO) under
//! `{prefix}/{key}`. Every client error is reported as `Transient` except a
//! missing key on read, which is `NotFound`.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use super::error::StoreError;
use super::store::{ObjectStore, PutOptions, validate_key};

/// S3-based object store
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    /// Key prefix for all objects (no leading/trailing slash)
    prefix: String,
}

impl S3Store {
    /// Create a new S3 store with the given configuration
    pub async fn new(
        bucket: String,
        prefix: String,
        region: Option<String>,
        endpoint: Option<String>,
    ) -> Result<Self, StoreError> {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = region {
            config_loader = config_loader.region(aws_sdk_s3::config::Region::new(region));
        }

        let config = config_loader.load().await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&config);
        if let Some(endpoint_url) = endpoint {
            // Path-style addressing is required by most S3-compatible services
            s3_config = s3_config.endpoint_url(endpoint_url).force_path_style(true);
        }

        let client = Client::from_conf(s3_config.build());
        let prefix = prefix.trim_matches('/').to_string();

        tracing::debug!(
            bucket = %bucket,
            prefix = %prefix,
            "S3 store initialized"
        );

        Ok(Self {
            client,
            bucket,
            prefix,
        })
    }

    /// Full S3 key for an object key
    fn object_key(&self, key: &str) -> String {
        full_key(&self.prefix, key)
    }
}

fn full_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", prefix, key)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn backend_name(&self) -> &'static str {
        "s3"
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        validate_key(key)?;
        let s3_key = self.object_key(key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&s3_key)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    StoreError::NotFound {
                        key: key.to_string(),
                    }
                } else {
                    StoreError::Transient(format!("S3 get_object error: {}", service_err))
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Transient(format!("S3 body read error: {}", e)))?
            .into_bytes()
            .to_vec();

        tracing::debug!(key = %s3_key, size = data.len(), "Object read from S3");

        Ok(data)
    }

    async fn put(&self, key: &str, data: &[u8], options: &PutOptions) -> Result<(), StoreError> {
        validate_key(key)?;
        let s3_key = self.object_key(key);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&s3_key)
            .body(ByteStream::from(data.to_vec()))
            .set_content_type(options.content_type.clone());
        if options.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request
            .send()
            .await
            .map_err(|e| StoreError::Transient(format!("S3 put_object error: {}", e)))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %s3_key,
            size = data.len(),
            public_read = options.public_read,
            "Object stored in S3"
        );

        Ok(())
    }
}
