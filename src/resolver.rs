//! Resource Resolver
//!
//! Maps a request's resource path to file bytes, or to "absent".
//!
//! Paths are joined onto the configured root directory. An absolute path
//! replaces the root entirely (`Path::join` semantics), so with the default
//! root of `.` resolution matches plain working-directory lookups. The
//! filesystem is only ever read; contents are fully materialized in memory
//! with no size limit and no caching.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::Result;

/// Resolves resource paths against a root directory
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
}

impl FileResolver {
    /// Create a resolver rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory relative paths resolve against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the full contents of `path`
    ///
    /// Returns `Ok(None)` when the path does not exist, is not a regular
    /// file, or cannot be read. Only unexpected I/O failures after the file
    /// was opened surface as errors.
    pub fn resolve(&self, path: &str) -> Result<Option<Bytes>> {
        let full_path = self.root.join(path);

        match fs::metadata(&full_path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                tracing::debug!("Resource {} is not a regular file", full_path.display());
                return Ok(None);
            }
            Err(e) => {
                tracing::debug!("Resource {} unavailable: {}", full_path.display(), e);
                return Ok(None);
            }
        }

        match fs::read(&full_path) {
            Ok(contents) => Ok(Some(Bytes::from(contents))),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                tracing::debug!("Resource {} unreadable: {}", full_path.display(), e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for FileResolver {
    fn default() -> Self {
        Self::new(".")
    }
}
