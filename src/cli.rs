use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use clap::{Args as ClapArgs, Parser, Subcommand};
use regex::Regex;

use crate::config::FileConfig;
use crate::options::UploadOptions;

/// Command-line arguments for the rs-s3-upload tool.
///
/// Two subcommands cover the two entry points: `directory` walks a tree
/// and uploads every qualifying file, `file` uploads exactly one file
/// under its basename.
#[derive(Parser, Debug)]
#[clap(name = "rs-s3-upload", about = "Concurrent directory-to-S3 uploader")]
pub struct Args {
    /// Verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the uploader.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload every qualifying file under a directory tree
    Directory(DirectoryOpts),

    /// Upload a single file under its basename
    File(FileOpts),
}

/// Options for the directory subcommand.
#[derive(ClapArgs, Debug)]
pub struct DirectoryOpts {
    /// Local directory to upload
    pub source: PathBuf,

    /// Destination bucket name
    pub bucket: String,

    /// Key prefix prepended to every uploaded object
    #[clap(short, long)]
    pub prefix: Option<String>,

    /// Number of concurrent upload workers (default: 5)
    #[clap(short, long)]
    pub workers: Option<usize>,

    /// S3 access key ID (default: S3_KEY environment variable)
    #[clap(long)]
    pub access_key: Option<String>,

    /// S3 secret access key (default: S3_SECRET environment variable)
    #[clap(long)]
    pub secret_key: Option<String>,

    /// Make uploaded objects publicly readable
    #[clap(long)]
    pub public: bool,

    /// AWS region for the bucket (default: us-east-1)
    #[clap(long)]
    pub region: Option<String>,

    /// Use path-style bucket addressing
    #[clap(long)]
    pub path_style: bool,

    /// Regex applied to file basenames; non-matching files are skipped
    #[clap(long)]
    pub pattern: Option<String>,

    /// Compress files with gzip before uploading
    #[clap(long)]
    pub gzip: bool,

    /// Working directory for gzip staging, outside the source tree
    #[clap(long)]
    pub gzip_working_dir: Option<PathBuf>,

    /// Only upload files modified at or after this RFC 3339 timestamp
    #[clap(long)]
    pub newer_than: Option<String>,

    /// Only upload files modified at or before this RFC 3339 timestamp
    #[clap(long)]
    pub older_than: Option<String>,

    /// Metadata attached to every uploaded object (repeatable)
    #[clap(long = "metadata", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    /// Path to a YAML file with upload options
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
}

/// Options for the file subcommand.
#[derive(ClapArgs, Debug)]
pub struct FileOpts {
    /// Local file to upload
    pub source: PathBuf,

    /// Destination bucket name
    pub bucket: String,

    /// Key prefix prepended to the uploaded object
    #[clap(short, long)]
    pub prefix: Option<String>,

    /// S3 access key ID (default: S3_KEY environment variable)
    #[clap(long)]
    pub access_key: Option<String>,

    /// S3 secret access key (default: S3_SECRET environment variable)
    #[clap(long)]
    pub secret_key: Option<String>,

    /// Make the uploaded object publicly readable
    #[clap(long)]
    pub public: bool,

    /// AWS region for the bucket (default: us-east-1)
    #[clap(long)]
    pub region: Option<String>,

    /// Use path-style bucket addressing
    #[clap(long)]
    pub path_style: bool,

    /// Metadata attached to the uploaded object (repeatable)
    #[clap(long = "metadata", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    /// Path to a YAML file with upload options
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
}

impl DirectoryOpts {
    /// Resolve the effective upload options. Command-line flags take
    /// precedence over the YAML config, which takes precedence over the
    /// built-in defaults.
    pub fn to_options(&self) -> Result<UploadOptions> {
        let file_config = load_file_config(self.config.as_deref())?;
        let mut options = UploadOptions::default();

        if let Some(prefix) = self.prefix.clone().or(file_config.destination_prefix) {
            options.destination_prefix = prefix;
        }
        if let Some(workers) = self.workers.or(file_config.workers) {
            options.workers = workers;
        }
        if let Some(region) = self.region.clone().or(file_config.region) {
            options.region = region;
        }
        options.public = self.public || file_config.public.unwrap_or(false);
        options.path_style = self.path_style || file_config.path_style.unwrap_or(false);
        options.gzip = self.gzip || file_config.gzip.unwrap_or(false);
        if let Some(working_dir) = self.gzip_working_dir.clone().or(file_config.gzip_working_dir)
        {
            options.gzip_working_dir = Some(working_dir);
        }
        if let Some(pattern) = self.pattern.clone().or(file_config.pattern) {
            options.name_filter = Regex::new(&pattern)
                .with_context(|| format!("Invalid basename pattern '{}'", pattern))?;
        }
        if let Some(key) = &self.access_key {
            options.s3_key = Some(key.clone());
        }
        if let Some(secret) = &self.secret_key {
            options.s3_secret = Some(secret.clone());
        }

        let mut metadata = file_config.metadata;
        metadata.extend(parse_metadata(&self.metadata)?);
        options.metadata = metadata;

        options.time_window = resolve_time_window(
            &options.time_window,
            self.newer_than.as_deref(),
            self.older_than.as_deref(),
        )?;

        Ok(options)
    }
}

impl FileOpts {
    /// Resolve the effective upload options for a single-file upload.
    /// Gzip and filtering fields from the config file do not apply here.
    pub fn to_options(&self) -> Result<UploadOptions> {
        let file_config = load_file_config(self.config.as_deref())?;
        let mut options = UploadOptions::default();

        if let Some(prefix) = self.prefix.clone().or(file_config.destination_prefix) {
            options.destination_prefix = prefix;
        }
        if let Some(region) = self.region.clone().or(file_config.region) {
            options.region = region;
        }
        options.public = self.public || file_config.public.unwrap_or(false);
        options.path_style = self.path_style || file_config.path_style.unwrap_or(false);
        if let Some(key) = &self.access_key {
            options.s3_key = Some(key.clone());
        }
        if let Some(secret) = &self.secret_key {
            options.s3_secret = Some(secret.clone());
        }

        let mut metadata = file_config.metadata;
        metadata.extend(parse_metadata(&self.metadata)?);
        options.metadata = metadata;

        Ok(options)
    }
}

fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => FileConfig::from_yaml_file(path),
        None => Ok(FileConfig::default()),
    }
}

/// Replace the default window bounds with any explicitly requested ones.
fn resolve_time_window(
    default: &RangeInclusive<SystemTime>,
    newer_than: Option<&str>,
    older_than: Option<&str>,
) -> Result<RangeInclusive<SystemTime>> {
    let start = match newer_than {
        Some(value) => parse_timestamp(value)?,
        None => *default.start(),
    };
    let end = match older_than {
        Some(value) => parse_timestamp(value)?,
        None => *default.end(),
    };
    Ok(start..=end)
}

fn parse_timestamp(value: &str) -> Result<SystemTime> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid RFC 3339 timestamp '{}'", value))?;
    Ok(SystemTime::from(parsed))
}

/// Parse repeated KEY=VALUE metadata flags into a map.
pub fn parse_metadata(entries: &[String]) -> Result<HashMap<String, String>> {
    let mut metadata = HashMap::new();
    for entry in entries {
        match entry.split_once('=') {
            Some((key, value)) => {
                metadata.insert(key.to_string(), value.to_string());
            }
            None => bail!("Invalid metadata entry '{}', expected KEY=VALUE", entry),
        }
    }
    Ok(metadata)
}
