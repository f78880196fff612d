use std::fs;
use std::path::{Path, PathBuf};

use giclass_common::Result;

/// Create the directory (and any missing parents) if absent; a no-op when it
/// already exists. Returns the same path for chaining.
pub fn ensure_directory<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    fs::create_dir_all(&path)?;
    Ok(path.as_ref().to_path_buf())
}

/// Check whether the model artifact is present on disk.
///
/// A missing path is `Ok(false)`; only unrecoverable filesystem errors
/// propagate.
pub fn model_artifact_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
    Ok(path.as_ref().try_exists()?)
}
