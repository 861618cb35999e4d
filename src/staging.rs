//! Gzip staging: compresses qualifying files into a working directory
//! before they are queued for upload.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use flate2::{Compression, GzBuilder};
use log::debug;

use crate::constants::{GZIP_BLOCK_SIZE, GZIP_EXTENSION};

/// Returns true when the file already carries the gzip extension and must
/// be queued as-is instead of being recompressed.
pub fn is_gzipped(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(GZIP_EXTENSION)
}

/// Compute the staged path for a file: its source-directory prefix is
/// replaced with the working-directory prefix and `.gz` is appended to the
/// basename, so relative structure is preserved inside the working
/// directory.
pub fn staged_path(file: &Path, source: &Path, working_dir: &Path) -> Result<PathBuf> {
    let relative = file.strip_prefix(source).with_context(|| {
        format!(
            "File {} is not under source directory {}",
            file.display(),
            source.display()
        )
    })?;

    let mut staged_name = relative.as_os_str().to_os_string();
    staged_name.push(format!(".{}", GZIP_EXTENSION));
    Ok(working_dir.join(staged_name))
}

/// Write a gzip copy of `file` at `staged`, creating missing parent
/// directories first.
///
/// The gzip header records the original basename and modification time.
/// Data is copied in fixed-size blocks so memory stays bounded for large
/// inputs.
pub fn stage_file(file: &Path, staged: &Path) -> Result<()> {
    if let Some(parent) = staged.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create staging directory {}", parent.display())
        })?;
    }

    let metadata = fs::metadata(file)
        .with_context(|| format!("Failed to read metadata for {}", file.display()))?;
    let mtime = metadata
        .modified()
        .with_context(|| format!("Failed to read modification time for {}", file.display()))?
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as u32)
        .unwrap_or(0);
    let basename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let output = File::create(staged)
        .with_context(|| format!("Failed to create staged file {}", staged.display()))?;
    let mut encoder = GzBuilder::new()
        .filename(basename)
        .mtime(mtime)
        .write(output, Compression::default());

    let input = File::open(file)
        .with_context(|| format!("Failed to open {} for staging", file.display()))?;
    let mut reader = BufReader::new(input);
    let mut buffer = vec![0u8; GZIP_BLOCK_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("Failed to read from {}", file.display()))?;
        if bytes_read == 0 {
            break;
        }
        encoder
            .write_all(&buffer[..bytes_read])
            .with_context(|| format!("Failed to write staged data for {}", file.display()))?;
    }

    encoder
        .finish()
        .with_context(|| format!("Failed to finish gzip stream for {}", staged.display()))?;

    debug!("Staged {} as {}", file.display(), staged.display());
    Ok(())
}
