//! Global constants for the rs-s3-upload application.
//!
//! This module centralizes all hardcoded values so defaults and tuning
//! knobs live in one place.

// Size and formatting constants
/// Bytes per kilobyte, used when reporting uploaded sizes
pub const KILO_SIZE: f64 = 1024.0;

/// Block size for gzip staging reads and writes (1MB)
pub const GZIP_BLOCK_SIZE: usize = 1024 * 1024;

/// Extension produced by gzip staging; files already carrying it are
/// uploaded as-is
pub const GZIP_EXTENSION: &str = "gz";

// Upload defaults
/// Default number of concurrent upload workers
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Default S3 region for new connections
pub const DEFAULT_REGION: &str = "us-east-1";

/// Pattern used by the default basename filter (matches everything)
pub const MATCH_ALL_PATTERN: &str = ".*";

/// Forward extent of the default modification-time window (24 hours)
pub const MTIME_WINDOW_LOOKAHEAD_SECS: u64 = 24 * 60 * 60;

// Environment variables
/// Environment variable consulted for the S3 access key ID
pub const S3_KEY_ENV: &str = "S3_KEY";

/// Environment variable consulted for the S3 secret access key
pub const S3_SECRET_ENV: &str = "S3_SECRET";
