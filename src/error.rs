//! Error types for the comparison engine

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A filesystem or configuration failure the engine propagates to its caller.
///
/// Classification never fails (unreadable paths classify as `Unknown`), but
/// listing a directory and reading file contents surface their errors so the
/// caller can pick its own degrade-vs-abort policy. The engine never retries.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("cannot list '{path}': {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl DiffError {
    pub(crate) fn list(path: &Path, source: io::Error) -> Self {
        DiffError::List {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        DiffError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}
