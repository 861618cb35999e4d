//! Shared test doubles for the upload pipeline integration tests.

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use rust_s3_uploader::cloud::connection::{BucketHandle, StorageConnection};

/// One object captured by [`RecordingConnection`].
#[derive(Debug, Clone)]
pub struct CreatedObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub public: bool,
    pub metadata: HashMap<String, String>,
}

/// In-memory storage connection that records every created object.
pub struct RecordingConnection {
    created: Arc<Mutex<Vec<CreatedObject>>>,
    fail_on_key: Option<String>,
}

impl RecordingConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingConnection {
            created: Arc::new(Mutex::new(Vec::new())),
            fail_on_key: None,
        })
    }

    /// A connection whose uploads fail for keys containing `needle`.
    pub fn failing_on(needle: &str) -> Arc<Self> {
        Arc::new(RecordingConnection {
            created: Arc::new(Mutex::new(Vec::new())),
            fail_on_key: Some(needle.to_string()),
        })
    }

    pub fn created(&self) -> Vec<CreatedObject> {
        self.created.lock().unwrap().clone()
    }

    /// Sorted keys of every recorded object.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .created()
            .iter()
            .map(|object| object.key.clone())
            .collect();
        keys.sort();
        keys
    }
}

impl StorageConnection for RecordingConnection {
    fn open_bucket(&self, name: &str) -> Result<Box<dyn BucketHandle>> {
        Ok(Box::new(RecordingBucket {
            bucket: name.to_string(),
            created: Arc::clone(&self.created),
            fail_on_key: self.fail_on_key.clone(),
        }))
    }
}

struct RecordingBucket {
    bucket: String,
    created: Arc<Mutex<Vec<CreatedObject>>>,
    fail_on_key: Option<String>,
}

impl BucketHandle for RecordingBucket {
    fn create_object(
        &self,
        key: &str,
        body: &mut dyn Read,
        public: bool,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        if let Some(needle) = &self.fail_on_key {
            if key.contains(needle) {
                return Err(anyhow!("Injected upload failure for {}", key));
            }
        }

        let mut contents = Vec::new();
        body.read_to_end(&mut contents)?;
        self.created.lock().unwrap().push(CreatedObject {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            body: contents,
            public,
            metadata: metadata.clone(),
        });
        Ok(())
    }
}
