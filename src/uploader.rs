//! Directory and single-file upload entry points.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use walkdir::WalkDir;

use crate::cloud::connection::StorageConnection;
use crate::cloud::s3::S3Connection;
use crate::constants::KILO_SIZE;
use crate::filter::PathFilter;
use crate::options::UploadOptions;
use crate::pool::{run_pool, WorkerContext};
use crate::queue::{ProgressCounter, UploadQueue};
use crate::staging;

/// Upload every qualifying file under `source` into `bucket`.
///
/// Traversal, filtering and optional gzip staging happen up front on the
/// calling thread; the populated queue is then drained by a pool of
/// worker threads. Configuration problems surface before any file is
/// read or staged.
///
/// ```no_run
/// use rust_s3_uploader::options::UploadOptions;
/// use rust_s3_uploader::uploader::upload_directory;
/// use std::path::Path;
///
/// # fn main() -> anyhow::Result<()> {
/// let options = UploadOptions {
///     destination_prefix: "backups/2024".to_string(),
///     workers: 8,
///     ..Default::default()
/// };
/// upload_directory(Path::new("/var/data/reports"), "archive-bucket", options)?;
/// # Ok(())
/// # }
/// ```
pub fn upload_directory(source: &Path, bucket: &str, options: UploadOptions) -> Result<()> {
    if !source.is_dir() {
        bail!("Source must be a directory");
    }
    let staging_dir = options.gzip_staging_dir(source)?.map(Path::to_path_buf);
    if options.workers == 0 {
        bail!("Worker count must be at least 1");
    }
    let connection = resolve_connection(&options)?;

    let queue = Arc::new(UploadQueue::new());
    let total_size = populate_queue(&queue, source, staging_dir.as_deref(), &options)?;
    let total_files = queue.len();
    debug!("Queued {} files ({} bytes) for upload", total_files, total_size);

    let bucket_handle = connection.open_bucket(bucket)?;
    let context = Arc::new(WorkerContext {
        queue,
        counter: Arc::new(ProgressCounter::new()),
        bucket: Arc::from(bucket_handle),
        bucket_name: bucket.to_string(),
        source: source.to_path_buf(),
        gzip_working_dir: staging_dir,
        destination_prefix: options.normalized_prefix(),
        public: options.public,
        metadata: options.metadata.clone(),
        total_files,
    });

    let start = Instant::now();
    run_pool(context, options.workers)?;

    info!(
        "Uploaded {} ({:.0} KB) in {}",
        total_files,
        total_size as f64 / KILO_SIZE,
        format_elapsed(start.elapsed())
    );
    Ok(())
}

/// Upload a single file into `bucket` under its basename.
///
/// No traversal, queue or pool is involved, and gzip staging does not
/// apply; the body is sent exactly as it is on disk.
pub fn upload_file(source: &Path, bucket: &str, options: UploadOptions) -> Result<()> {
    if !source.exists() {
        bail!("Source not found");
    }
    let connection = resolve_connection(&options)?;

    let total_size = fs::metadata(source)
        .with_context(|| format!("Failed to read metadata for {}", source.display()))?
        .len();
    let key = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            anyhow!(
                "Invalid file path - no filename component: {}",
                source.display()
            )
        })?;
    let destination = format!("{}{}", options.normalized_prefix(), key);

    let bucket_handle = connection.open_bucket(bucket)?;
    let start = Instant::now();

    info!("Uploading {} to s3://{}/{}", key, bucket, destination);
    let mut body = File::open(source)
        .with_context(|| format!("Failed to open {} for upload", source.display()))?;
    bucket_handle
        .create_object(&destination, &mut body, options.public, &options.metadata)
        .with_context(|| format!("Failed to upload {}", source.display()))?;

    info!(
        "Uploaded ({:.0} KB) in {}",
        total_size as f64 / KILO_SIZE,
        format_elapsed(start.elapsed())
    );
    Ok(())
}

/// Reuse the caller-supplied connection or build one from credentials.
fn resolve_connection(options: &UploadOptions) -> Result<Arc<dyn StorageConnection>> {
    if let Some(connection) = &options.connection {
        debug!("Using externally supplied storage connection");
        return Ok(Arc::clone(connection));
    }

    match (&options.s3_key, &options.s3_secret) {
        (Some(key), Some(secret)) => Ok(Arc::new(S3Connection::new(
            key,
            secret,
            &options.region,
            options.path_style,
        )?)),
        _ => bail!("Missing access keys"),
    }
}

/// Walk the source tree, filter candidates, stage gzip copies when
/// enabled and queue upload tasks. Returns the total queued size in
/// bytes, measured after staging.
fn populate_queue(
    queue: &UploadQueue,
    source: &Path,
    staging_dir: Option<&Path>,
    options: &UploadOptions,
) -> Result<u64> {
    let filter = PathFilter::new(options.name_filter.clone(), options.time_window.clone());
    let mut total_size = 0u64;

    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.context("Failed to walk source directory")?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let metadata = entry
            .metadata()
            .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
        let modified = metadata.modified().with_context(|| {
            format!("Failed to read modification time for {}", path.display())
        })?;

        if !filter.qualifies(path, modified) {
            debug!("Skipping {}", path.display());
            continue;
        }

        match staging_dir {
            Some(working_dir) if !staging::is_gzipped(path) => {
                let staged = staging::staged_path(path, source, working_dir)?;
                staging::stage_file(path, &staged)?;
                total_size += fs::metadata(&staged)
                    .with_context(|| {
                        format!("Failed to read metadata for {}", staged.display())
                    })?
                    .len();
                queue.push(staged);
            }
            _ => {
                total_size += metadata.len();
                queue.push(path.to_path_buf());
            }
        }
    }

    Ok(total_size)
}

/// Render elapsed wall time as minutes:seconds for the summary lines.
fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs_f64();
    let minutes = (total_secs / 60.0).floor();
    let seconds = total_secs - minutes * 60.0;
    format!("{}:{:04.2}", minutes as u64, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::connection::BucketHandle;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Connection double that only counts how often a bucket was opened.
    struct CountingConnection {
        opened: AtomicUsize,
    }

    impl CountingConnection {
        fn new() -> Arc<Self> {
            Arc::new(CountingConnection {
                opened: AtomicUsize::new(0),
            })
        }
    }

    impl StorageConnection for CountingConnection {
        fn open_bucket(&self, _name: &str) -> Result<Box<dyn BucketHandle>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(NullBucket))
        }
    }

    struct NullBucket;

    impl BucketHandle for NullBucket {
        fn create_object(
            &self,
            _key: &str,
            _body: &mut dyn Read,
            _public: bool,
            _metadata: &HashMap<String, String>,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_upload_directory_rejects_non_directory_source() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"data").unwrap();

        let err = upload_directory(&file, "bucket", UploadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Source must be a directory"));
    }

    #[test]
    fn test_upload_directory_gzip_misconfiguration_fails_before_connecting() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"data").unwrap();
        let connection = CountingConnection::new();
        let upstream: Arc<dyn StorageConnection> = connection.clone();
        let options = UploadOptions {
            gzip: true,
            connection: Some(upstream),
            ..Default::default()
        };

        let err = upload_directory(dir.path(), "bucket", options).unwrap_err();

        assert!(err.to_string().contains("gzip_working_dir required"));
        assert_eq!(connection.opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_upload_directory_rejects_zero_workers_before_credentials() {
        let dir = TempDir::new().unwrap();
        let options = UploadOptions {
            workers: 0,
            s3_key: None,
            s3_secret: None,
            ..Default::default()
        };

        let err = upload_directory(dir.path(), "bucket", options).unwrap_err();
        assert!(err.to_string().contains("Worker count must be at least 1"));
    }

    #[test]
    fn test_upload_directory_requires_credentials_without_connection() {
        let dir = TempDir::new().unwrap();
        let options = UploadOptions {
            s3_key: None,
            s3_secret: None,
            ..Default::default()
        };

        let err = upload_directory(dir.path(), "bucket", options).unwrap_err();
        assert!(err.to_string().contains("Missing access keys"));
    }

    #[test]
    fn test_upload_file_missing_source() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not-here.csv");

        let err = upload_file(&missing, "bucket", UploadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Source not found"));
    }

    #[test]
    fn test_upload_file_uses_supplied_connection() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("report.csv");
        fs::write(&file, b"id,value\n").unwrap();
        let connection = CountingConnection::new();
        let upstream: Arc<dyn StorageConnection> = connection.clone();
        let options = UploadOptions {
            s3_key: None,
            s3_secret: None,
            connection: Some(upstream),
            ..Default::default()
        };

        upload_file(&file, "bucket", options).unwrap();
        assert_eq!(connection.opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0:0.00");
        assert_eq!(format_elapsed(Duration::from_millis(5250)), "0:5.25");
        assert_eq!(format_elapsed(Duration::from_millis(90500)), "1:30.50");
        assert_eq!(format_elapsed(Duration::from_secs(65)), "1:5.00");
        assert_eq!(format_elapsed(Duration::from_secs(600)), "10:0.00");
    }
}
