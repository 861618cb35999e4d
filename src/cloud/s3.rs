use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use rusoto_core::{ByteStream, HttpClient, Region};
use rusoto_credential::StaticProvider;
use rusoto_s3::{PutObjectRequest, S3Client, S3};
use tokio::runtime::Runtime;

use crate::cloud::connection::{BucketHandle, StorageConnection};

/// S3-backed storage connection.
///
/// Holds one shared client plus the Tokio runtime that drives its async
/// calls. Upload workers are plain OS threads; each `create_object` call
/// blocks its worker on the runtime while the request is in flight.
pub struct S3Connection {
    client: Arc<S3Client>,
    runtime: Arc<Runtime>,
}

impl S3Connection {
    /// Build a connection from static credentials.
    ///
    /// An unknown region name falls back to the rusoto default with a
    /// warning rather than failing, matching how the region is treated as
    /// advisory configuration.
    pub fn new(
        access_key: &str,
        secret_key: &str,
        region_name: &str,
        path_style: bool,
    ) -> Result<Self> {
        let region = resolve_region(region_name, path_style);
        debug!("Connecting to S3 region {}", region.name());

        let credentials =
            StaticProvider::new_minimal(access_key.to_string(), secret_key.to_string());
        let http_client = HttpClient::new().context("Failed to create HTTP client")?;
        let client = Arc::new(S3Client::new_with(http_client, credentials, region));
        let runtime = Arc::new(Runtime::new().context("Failed to create Tokio runtime")?);

        Ok(S3Connection { client, runtime })
    }
}

impl StorageConnection for S3Connection {
    fn open_bucket(&self, name: &str) -> Result<Box<dyn BucketHandle>> {
        Ok(Box::new(S3Bucket {
            client: Arc::clone(&self.client),
            runtime: Arc::clone(&self.runtime),
            bucket: name.to_string(),
        }))
    }
}

/// Resolve a region name, optionally forcing path-style addressing.
///
/// rusoto only emits path-style URLs for custom endpoints, so path-style
/// requests get a custom region pointing at the standard regional
/// endpoint.
fn resolve_region(region_name: &str, path_style: bool) -> Region {
    if path_style {
        return Region::Custom {
            name: region_name.to_string(),
            endpoint: format!("https://s3.{}.amazonaws.com", region_name),
        };
    }

    match region_name.parse::<Region>() {
        Ok(region) => region,
        Err(_) => {
            warn!("Invalid region '{}', using default", region_name);
            Region::default()
        }
    }
}

/// Handle to one S3 bucket, shared by all upload workers.
pub struct S3Bucket {
    client: Arc<S3Client>,
    runtime: Arc<Runtime>,
    bucket: String,
}

impl BucketHandle for S3Bucket {
    fn create_object(
        &self,
        key: &str,
        body: &mut dyn Read,
        public: bool,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        let mut contents = Vec::new();
        body.read_to_end(&mut contents)
            .with_context(|| format!("Failed to read upload body for {}", key))?;

        let acl = if public { "public-read" } else { "private" };
        let request = PutObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            body: Some(ByteStream::from(contents)),
            acl: Some(acl.to_string()),
            metadata: if metadata.is_empty() {
                None
            } else {
                Some(metadata.clone())
            },
            ..Default::default()
        };

        self.runtime
            .block_on(self.client.put_object(request))
            .with_context(|| {
                format!("Failed to create object {} in bucket {}", key, self.bucket)
            })?;

        Ok(())
    }
}
