//! Options accepted by the upload entry points.

use std::collections::HashMap;
use std::env;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Result};
use regex::Regex;

use crate::cloud::connection::StorageConnection;
use crate::constants::{
    DEFAULT_REGION, DEFAULT_WORKER_COUNT, MATCH_ALL_PATTERN, MTIME_WINDOW_LOOKAHEAD_SECS,
    S3_KEY_ENV, S3_SECRET_ENV,
};

/// Options shared by the directory and single-file upload entry points.
///
/// `Default::default()` produces a ready-to-use set: credentials come from
/// the `S3_KEY` and `S3_SECRET` environment variables, every basename
/// matches, and the modification-time window stretches from the epoch to
/// 24 hours past now so clock skew on network filesystems does not drop
/// fresh files.
#[derive(Clone)]
pub struct UploadOptions {
    /// Key prefix prepended to every destination key. A non-empty prefix
    /// is normalized to end with a slash.
    pub destination_prefix: String,
    /// Number of concurrent upload workers
    pub workers: usize,
    /// S3 access key ID
    pub s3_key: Option<String>,
    /// S3 secret access key
    pub s3_secret: Option<String>,
    /// Make uploaded objects publicly readable
    pub public: bool,
    /// Region for new S3 connections
    pub region: String,
    /// Metadata attached to every uploaded object
    pub metadata: HashMap<String, String>,
    /// Use path-style bucket addressing
    pub path_style: bool,
    /// Regex applied to file basenames; non-matching files are skipped
    pub name_filter: Regex,
    /// Compress files into the working directory before uploading
    pub gzip: bool,
    /// Working directory for gzip staging
    pub gzip_working_dir: Option<PathBuf>,
    /// Inclusive modification-time window a file must fall in to qualify
    pub time_window: RangeInclusive<SystemTime>,
    /// Externally supplied storage connection. When set, credential
    /// validation is skipped and no S3 connection is built.
    pub connection: Option<Arc<dyn StorageConnection>>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            destination_prefix: String::new(),
            workers: DEFAULT_WORKER_COUNT,
            s3_key: env::var(S3_KEY_ENV).ok(),
            s3_secret: env::var(S3_SECRET_ENV).ok(),
            public: false,
            region: DEFAULT_REGION.to_string(),
            metadata: HashMap::new(),
            path_style: false,
            name_filter: Regex::new(MATCH_ALL_PATTERN).expect("match-all pattern is valid"),
            gzip: false,
            gzip_working_dir: None,
            time_window: UNIX_EPOCH
                ..=SystemTime::now() + Duration::from_secs(MTIME_WINDOW_LOOKAHEAD_SECS),
            connection: None,
        }
    }
}

impl UploadOptions {
    /// The destination prefix with a trailing slash guaranteed when
    /// non-empty, so keys concatenate without doubling or losing a
    /// separator.
    pub fn normalized_prefix(&self) -> String {
        if self.destination_prefix.is_empty() || self.destination_prefix.ends_with('/') {
            self.destination_prefix.clone()
        } else {
            format!("{}/", self.destination_prefix)
        }
    }

    /// Check the gzip staging preconditions against the source directory.
    ///
    /// Returns the working directory when staging is enabled. Staging
    /// requires a working directory outside the source tree; a working
    /// directory inside it would feed staged copies back into traversal.
    pub fn gzip_staging_dir(&self, source: &Path) -> Result<Option<&Path>> {
        if !self.gzip {
            return Ok(None);
        }

        match &self.gzip_working_dir {
            None => bail!("gzip_working_dir required when using gzip"),
            Some(working_dir) => {
                if working_dir.starts_with(source) {
                    bail!("gzip_working_dir may not be located within source-folder");
                }
                Ok(Some(working_dir))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = UploadOptions::default();

        assert_eq!(options.destination_prefix, "");
        assert_eq!(options.workers, DEFAULT_WORKER_COUNT);
        assert!(!options.public);
        assert_eq!(options.region, DEFAULT_REGION);
        assert!(options.metadata.is_empty());
        assert!(!options.path_style);
        assert!(!options.gzip);
        assert!(options.gzip_working_dir.is_none());
        assert!(options.connection.is_none());
    }

    #[test]
    fn test_default_name_filter_matches_everything() {
        let options = UploadOptions::default();
        assert!(options.name_filter.is_match("anything.at-all"));
    }

    #[test]
    fn test_default_time_window_spans_epoch_to_past_now() {
        let options = UploadOptions::default();

        assert_eq!(*options.time_window.start(), UNIX_EPOCH);
        assert!(options.time_window.contains(&SystemTime::now()));
        assert!(options.time_window.contains(&UNIX_EPOCH));
    }

    #[test]
    fn test_normalized_prefix_empty_stays_empty() {
        let options = UploadOptions::default();
        assert_eq!(options.normalized_prefix(), "");
    }

    #[test]
    fn test_normalized_prefix_gains_trailing_slash() {
        let options = UploadOptions {
            destination_prefix: "backups/2024".to_string(),
            ..Default::default()
        };
        assert_eq!(options.normalized_prefix(), "backups/2024/");
    }

    #[test]
    fn test_normalized_prefix_keeps_existing_slash() {
        let options = UploadOptions {
            destination_prefix: "backups/".to_string(),
            ..Default::default()
        };
        assert_eq!(options.normalized_prefix(), "backups/");
    }

    #[test]
    fn test_gzip_staging_dir_disabled_is_none() {
        let options = UploadOptions::default();
        let staging = options.gzip_staging_dir(Path::new("/data/source")).unwrap();
        assert!(staging.is_none());
    }

    #[test]
    fn test_gzip_staging_dir_requires_working_dir() {
        let options = UploadOptions {
            gzip: true,
            ..Default::default()
        };

        let err = options
            .gzip_staging_dir(Path::new("/data/source"))
            .unwrap_err();
        assert!(err.to_string().contains("gzip_working_dir required"));
    }

    #[test]
    fn test_gzip_staging_dir_rejects_dir_inside_source() {
        let options = UploadOptions {
            gzip: true,
            gzip_working_dir: Some(PathBuf::from("/data/source/staging")),
            ..Default::default()
        };

        let err = options
            .gzip_staging_dir(Path::new("/data/source"))
            .unwrap_err();
        assert!(err.to_string().contains("may not be located within"));
    }

    #[test]
    fn test_gzip_staging_dir_rejects_source_itself() {
        let options = UploadOptions {
            gzip: true,
            gzip_working_dir: Some(PathBuf::from("/data/source")),
            ..Default::default()
        };

        assert!(options.gzip_staging_dir(Path::new("/data/source")).is_err());
    }

    #[test]
    fn test_gzip_staging_dir_accepts_sibling_dir() {
        let options = UploadOptions {
            gzip: true,
            gzip_working_dir: Some(PathBuf::from("/data/staging")),
            ..Default::default()
        };

        let staging = options.gzip_staging_dir(Path::new("/data/source")).unwrap();
        assert_eq!(staging, Some(Path::new("/data/staging")));
    }

    #[test]
    fn test_gzip_staging_dir_sibling_with_shared_name_prefix() {
        // Component-wise comparison: "/data/source-staging" is not within
        // "/data/source" even though the strings share a prefix.
        let options = UploadOptions {
            gzip: true,
            gzip_working_dir: Some(PathBuf::from("/data/source-staging")),
            ..Default::default()
        };

        assert!(options
            .gzip_staging_dir(Path::new("/data/source"))
            .unwrap()
            .is_some());
    }
}
