//! Storage backend integration for uploads.
//!
//! This module abstracts the destination service behind a pair of small
//! traits so the upload pipeline never talks to S3 directly. The real
//! backend wraps rusoto; tests substitute an in-memory connection through
//! the same seam.
//!
//! ## Usage Example
//!
//! ```no_run
//! use rust_s3_uploader::cloud::connection::StorageConnection;
//! use rust_s3_uploader::cloud::s3::S3Connection;
//!
//! # fn main() -> anyhow::Result<()> {
//! let connection = S3Connection::new("KEY", "SECRET", "us-east-1", false)?;
//! let bucket = connection.open_bucket("archive-bucket")?;
//!
//! let mut body = std::io::Cursor::new(b"hello".to_vec());
//! bucket.create_object("greetings/hello.txt", &mut body, false, &Default::default())?;
//! # Ok(())
//! # }
//! ```

/// Traits implemented by storage backends
pub mod connection;

/// Amazon S3 backend built on rusoto
pub mod s3;
