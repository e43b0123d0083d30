//! Validation of input document paths before a batch starts.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::InputError;

/// Resolve every input to an absolute path and check that it is an
/// existing regular file.
///
/// The first failing path aborts the whole run. A file named more than once
/// (directly, relatively or through a symlink) is kept only at its first
/// position.
pub fn validate_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, InputError> {
    if paths.is_empty() {
        return Err(InputError::NoInputs);
    }

    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(paths.len());

    for path in paths {
        let absolute = std::path::absolute(path).map_err(|source| InputError::InvalidPath {
            path: path.clone(),
            source,
        })?;

        if !absolute.exists() {
            return Err(InputError::NotFound(absolute));
        }
        if absolute.is_dir() {
            return Err(InputError::IsDirectory(absolute));
        }

        let identity = fs::canonicalize(&absolute).unwrap_or_else(|_| absolute.clone());
        if !seen.insert(identity) {
            warn!("Ignoring repeated input {}", absolute.display());
            continue;
        }

        debug!("Validated input {}", absolute.display());
        resolved.push(absolute);
    }

    Ok(resolved)
}
