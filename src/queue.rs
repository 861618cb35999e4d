//! Shared work queue and progress counter drained by the upload workers.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::queue::SegQueue;

/// Lock-free queue of files awaiting upload.
///
/// The orchestrator fills the queue completely before any worker starts,
/// so once a pop returns `None` the work is done rather than still being
/// produced.
pub struct UploadQueue {
    files: SegQueue<PathBuf>,
}

impl UploadQueue {
    pub fn new() -> Self {
        UploadQueue {
            files: SegQueue::new(),
        }
    }

    /// Add a file during population. Not called once workers are running.
    pub fn push(&self, file: PathBuf) {
        self.files.push(file);
    }

    /// Non-blocking pop. `None` means the queue has drained.
    pub fn pop(&self) -> Option<PathBuf> {
        self.files.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

impl Default for UploadQueue {
    fn default() -> Self {
        UploadQueue::new()
    }
}

/// Sequence counter for progress log lines.
///
/// Workers claim a number before popping, so the sequence reflects the
/// order in which work was taken, not the order uploads finish. The
/// counter only feeds logging and never gates correctness.
pub struct ProgressCounter {
    claimed: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        ProgressCounter {
            claimed: AtomicUsize::new(0),
        }
    }

    /// Claim the next 1-based sequence number.
    pub fn claim(&self) -> usize {
        self.claimed.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for ProgressCounter {
    fn default() -> Self {
        ProgressCounter::new()
    }
}
