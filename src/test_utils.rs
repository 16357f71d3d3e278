//! Test utilities for building fixture directory trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// A temporary directory tree for testing.
///
/// Provides methods for creating files, subdirectories, symlinks, and
/// fifos. The tree is removed when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create a new empty temporary tree.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the tree's root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file with the given content, creating parents as needed.
    pub fn add_file(&self, rel: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Create a directory, creating parents as needed.
    pub fn add_dir(&self, rel: &str) -> PathBuf {
        let full_path = self.dir.path().join(rel);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Create a symlink at `rel` pointing at `target` (taken verbatim, so a
    /// relative target resolves against the link's parent).
    pub fn add_symlink(&self, target: &str, rel: &str) -> PathBuf {
        let full_path = self.dir.path().join(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::os::unix::fs::symlink(target, &full_path).expect("Failed to create symlink");
        full_path
    }

    /// Create a named pipe. Shells out to mkfifo; std has no wrapper.
    pub fn add_fifo(&self, rel: &str) -> PathBuf {
        let full_path = self.dir.path().join(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        let status = Command::new("mkfifo")
            .arg(&full_path)
            .status()
            .expect("Failed to run mkfifo");
        assert!(status.success(), "mkfifo failed for {:?}", full_path);
        full_path
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}
