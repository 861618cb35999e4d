//! Worker pool that drains the upload queue.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};

use crate::cloud::connection::BucketHandle;
use crate::queue::{ProgressCounter, UploadQueue};

/// Everything a worker needs to claim and upload queued files.
pub struct WorkerContext {
    pub queue: Arc<UploadQueue>,
    pub counter: Arc<ProgressCounter>,
    pub bucket: Arc<dyn BucketHandle>,
    pub bucket_name: String,
    /// Source directory whose prefix is stripped when computing keys
    pub source: PathBuf,
    /// Staging directory whose prefix is stripped for gzip-staged files
    pub gzip_working_dir: Option<PathBuf>,
    /// Normalized destination prefix, empty or slash-terminated
    pub destination_prefix: String,
    pub public: bool,
    pub metadata: HashMap<String, String>,
    /// Queue size at pool start, used in progress log lines
    pub total_files: usize,
}

/// Launch `workers` upload threads and block until every one has finished.
///
/// Workers drain the queue independently. A failing worker stops claiming
/// work, but its siblings keep draining; the first error in join order
/// becomes the pool's result.
pub fn run_pool(context: Arc<WorkerContext>, workers: usize) -> Result<()> {
    let handles = (0..workers)
        .map(|worker_id| {
            let worker_context = Arc::clone(&context);
            thread::Builder::new()
                .name(format!("upload-{}", worker_id))
                .spawn(move || upload_worker(worker_context))
                .context("Failed to spawn upload worker")
        })
        .collect::<Result<Vec<_>>>()?;

    let mut first_error = None;
    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    warn!("Additional upload worker error: {}", e);
                }
            }
            Err(_) => {
                if first_error.is_none() {
                    first_error = Some(anyhow!("Upload worker panicked"));
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Worker loop: claim a sequence number, pop a file, upload it.
///
/// The claim happens before the pop, so the sequence reflects the order
/// workers took work. A pop that comes back empty just rechecks the loop
/// condition.
fn upload_worker(context: Arc<WorkerContext>) -> Result<()> {
    while !context.queue.is_empty() {
        let sequence = context.counter.claim();
        if let Some(file) = context.queue.pop() {
            upload_one(&context, sequence, &file)?;
        }
    }
    Ok(())
}

fn upload_one(context: &WorkerContext, sequence: usize, file: &Path) -> Result<()> {
    let key = destination_key(file, &context.source, context.gzip_working_dir.as_deref())?;
    let destination = format!("{}{}", context.destination_prefix, key);

    info!(
        "[{}/{}] Uploading {} to s3://{}/{}",
        sequence, context.total_files, key, context.bucket_name, destination
    );

    let mut body = File::open(file)
        .with_context(|| format!("Failed to open {} for upload", file.display()))?;
    context
        .bucket
        .create_object(&destination, &mut body, context.public, &context.metadata)
        .with_context(|| format!("Failed to upload {}", file.display()))?;

    Ok(())
}

/// Compute the bucket key for a queued file: its path relative to the
/// source tree, or relative to the gzip working directory for staged
/// copies. Keys never start with a separator.
pub fn destination_key(
    file: &Path,
    source: &Path,
    gzip_working_dir: Option<&Path>,
) -> Result<String> {
    let relative = match file.strip_prefix(source) {
        Ok(relative) => relative,
        Err(_) => match gzip_working_dir {
            Some(working_dir) => file.strip_prefix(working_dir).with_context(|| {
                format!("File {} is outside the upload roots", file.display())
            })?,
            None => bail!("File {} is outside the upload roots", file.display()),
        },
    };

    Ok(relative.to_string_lossy().into_owned())
}
