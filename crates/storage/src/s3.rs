use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    config::Credentials, presigning::PresigningConfig, primitives::ByteStream, types::Object,
    Client,
};
use chrono::DateTime;
use tracing::{debug, info};

use crate::{ListOptions, ObjectStore, StoredObject};

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, localstack); switches to path-style addressing.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Builds a client from the default AWS provider chain, overridden by
    /// static credentials and a custom endpoint when configured.
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if let (Some(key_id), Some(secret)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "educloud-static",
            ));
        }
        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.endpoint.is_some())
            .build();

        info!(bucket = %settings.bucket, region = %settings.region, "S3 client initialized");
        Self::new(Client::from_conf(s3_config), settings.bucket.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list(&self, prefix: &str, options: ListOptions) -> Result<Vec<StoredObject>> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| anyhow!("S3 list of s3://{}/{prefix} failed: {e}", self.bucket))?;
            pages += 1;
            objects.extend(page.contents().iter().filter_map(stored_object));

            match page.next_continuation_token() {
                Some(token) if options.exhaustive && page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!(bucket = %self.bucket, prefix, pages, count = objects.len(), "S3 listing complete");
        Ok(objects)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| anyhow!("S3 delete of s3://{}/{path} failed: {e}", self.bucket))?;

        info!("Removed s3://{}/{}", self.bucket, path);
        Ok(())
    }

    async fn upload(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(body))
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| anyhow!("S3 upload to s3://{}/{path} failed: {e}", self.bucket))?;

        info!(size, "Uploaded s3://{}/{}", self.bucket, path);
        Ok(path.to_string())
    }

    async fn presign_download(&self, path: &str, expires_in: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| anyhow!("invalid presign expiry {expires_in:?}: {e}"))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .presigned(presigning)
            .await
            .map_err(|e| anyhow!("S3 presign of s3://{}/{path} failed: {e}", self.bucket))?;

        Ok(request.uri().to_string())
    }
}

fn stored_object(object: &Object) -> Option<StoredObject> {
    let path = object.key()?.to_string();
    Some(StoredObject {
        path,
        size: object.size().and_then(|size| u64::try_from(size).ok()),
        last_modified: object
            .last_modified()
            .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())),
    })
}
