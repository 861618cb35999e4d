//! # rs-s3-upload
//!
//! A concurrent directory-to-S3 uploader written in Rust.
//!
//! ## Overview
//!
//! rs-s3-upload mirrors a local directory tree into an S3 bucket. It walks
//! the source directory, filters files by basename pattern and modification
//! time, optionally compresses each candidate with gzip into a staging
//! directory, and drains the resulting queue with a pool of worker threads.
//! A single-file entry point covers one-off uploads without traversal.
//!
//! ## Features
//!
//! - **Concurrent uploads**: A configurable pool of worker threads drains
//!   the upload queue
//! - **Basename and mtime filtering**: Regex patterns plus an inclusive
//!   modification-time window decide what qualifies
//! - **Gzip staging**: Candidates can be compressed into a working
//!   directory before upload; files already ending in `.gz` pass through
//! - **Key mirroring**: Destination keys reproduce the relative path under
//!   the source tree, with an optional prefix
//! - **Pluggable backends**: The S3 connection sits behind a trait, so
//!   tests run against an in-memory double
//!
//! ## Usage
//!
//! ```no_run
//! use rust_s3_uploader::options::UploadOptions;
//! use rust_s3_uploader::uploader::upload_directory;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = UploadOptions {
//!     destination_prefix: "backups/2024".to_string(),
//!     workers: 8,
//!     ..Default::default()
//! };
//!
//! upload_directory(Path::new("/var/data/reports"), "archive-bucket", options)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and option resolution
//! - [`config`]: YAML-file configuration loading
//! - [`options`]: Upload options shared by both entry points
//! - [`filter`]: Basename pattern and modification-time filtering
//! - [`staging`]: Gzip staging of files before upload
//! - [`queue`]: Work queue and progress counter shared across workers
//! - [`pool`]: Worker pool that drains the queue
//! - [`uploader`]: Directory and single-file upload entry points
//! - [`cloud`]: Storage backend traits and the S3 implementation
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and option resolution
pub mod cli;

/// Storage backend traits and the S3 implementation
pub mod cloud;

/// YAML-file configuration loading
pub mod config;

/// Application constants and default values
pub mod constants;

/// Basename pattern and modification-time filtering
pub mod filter;

/// Upload options shared by both entry points
pub mod options;

/// Worker pool that drains the upload queue
pub mod pool;

/// Work queue and progress counter shared across workers
pub mod queue;

/// Gzip staging of files before upload
pub mod staging;

/// Directory and single-file upload entry points
pub mod uploader;
