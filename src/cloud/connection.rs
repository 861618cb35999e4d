use std::collections::HashMap;
use std::io::Read;

use anyhow::Result;

/// A trait for storage backends that can receive uploaded objects.
///
/// This trait abstracts over the destination service so the upload
/// pipeline can run against S3 or an in-memory test double without
/// changing. Implementations are shared across upload workers.
pub trait StorageConnection: Send + Sync {
    /// Open a handle to the named bucket.
    fn open_bucket(&self, name: &str) -> Result<Box<dyn BucketHandle>>;
}

/// A bucket opened through a [`StorageConnection`].
///
/// The pipeline only ever creates objects; listing, deletion and bucket
/// management stay out of scope.
pub trait BucketHandle: Send + Sync {
    /// Create (or overwrite) the object at `key` from the body stream,
    /// with the requested visibility and per-object metadata.
    fn create_object(
        &self,
        key: &str,
        body: &mut dyn Read,
        public: bool,
        metadata: &HashMap<String, String>,
    ) -> Result<()>;
}
