//! Collision-safe file placement.
//!
//! Artifacts are never written over an existing file. `Foo.jar` taken means
//! `Foo (1).jar`, then `Foo (2).jar`, and so on. Claiming a path creates it
//! with `create_new`, so two placements racing for the same name each end up
//! with their own file.
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};

/// Path tried for the `attempt`-th placement of `file_name` in `dir`.
///
/// Attempt 0 is the name itself; later attempts insert ` (n)` before the
/// extension.
pub fn candidate_path(dir: &Path, file_name: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return dir.join(file_name);
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    match name.extension() {
        Some(ext) => dir.join(format!("{} ({}).{}", stem, attempt, ext.to_string_lossy())),
        None => dir.join(format!("{} ({})", stem, attempt)),
    }
}

/// Create the first free candidate path for `file_name` in `dir` and return it
/// with the freshly created, empty file open for writing.
///
/// `dir` is created if it does not exist yet.
pub async fn claim_available_path(dir: &Path, file_name: &str) -> io::Result<(PathBuf, File)> {
    fs::create_dir_all(dir).await?;

    let mut attempt = 0;
    loop {
        let candidate = candidate_path(dir, file_name, attempt);
        match OpenOptions::new().write(true).create_new(true).open(&candidate).await {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}
