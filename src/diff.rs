//! Tree comparison engine
//!
//! Decides, for a pair of paths, whether the two sides match, differ, or
//! cannot be confidently compared. Directories recurse through the listing
//! merge; child statuses roll up under the precedence Different > Unknown >
//! Matching, with one-sided children always forcing Different.

use std::ffi::OsString;
use std::fs;
use std::io::{BufReader, Read};
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::error::DiffError;
use crate::exclude::ExcludeFilter;
use crate::file_type::{FileType, classify, resolve_symlink};
use crate::list::list_dir;
use crate::merge::{MergeEvent, merge_names};

/// Symlink chains longer than this resolve to `Unknown` instead of
/// recursing further. Mirrors the kernel's ELOOP limit.
const MAX_LINK_DEPTH: usize = 40;

const CONTENT_CHUNK: usize = 64 * 1024;

/// Comparison result for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Matching,
    Different,
    Unknown,
    LeftOnly,
    RightOnly,
}

impl Status {
    /// Two-character code used by the listing output.
    pub fn code(self) -> &'static str {
        match self {
            Status::Matching => "==",
            Status::Different => "!=",
            Status::Unknown => "??",
            Status::LeftOnly => "<<",
            Status::RightOnly => ">>",
        }
    }
}

/// One name found on either side of a directory pair, with its comparison
/// result and each side's independently classified type.
///
/// A one-sided entry carries `Missing` for the absent side. For paired
/// entries both types reflect what each side actually is - a directory
/// compared against a file is `Different` with distinct types.
///
/// The name is the raw `OsString` from the listing so callers can rebuild
/// real paths from it; JSON output serializes the lossy UTF-8 view.
#[derive(Debug, Clone, Serialize)]
pub struct DiffEntry {
    #[serde(serialize_with = "serialize_lossy")]
    pub name: OsString,
    pub status: Status,
    pub left: FileType,
    pub right: FileType,
}

fn serialize_lossy<S: Serializer>(name: &OsString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&name.to_string_lossy())
}

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Regex patterns; names matching any of them are invisible to the diff.
    pub exclude_patterns: Vec<String>,
    /// Worker threads for directory recursion.
    /// 0 = rayon's default pool, 1 = sequential, N = dedicated pool of N.
    pub parallel_workers: usize,
}

/// The comparison engine. Holds the compiled exclusion filter; all state it
/// reads lives in the filesystem, fresh on every call.
pub struct DiffEngine {
    exclude: ExcludeFilter,
    parallel_workers: usize,
    /// Dedicated pool when a specific worker count was requested; `None`
    /// means sequential or rayon's global pool.
    pool: Option<rayon::ThreadPool>,
}

impl DiffEngine {
    /// Build an engine, compiling the exclusion patterns.
    pub fn new(config: EngineConfig) -> Result<Self, DiffError> {
        let pool = if config.parallel_workers > 1 {
            // Fall back to the global pool if pool creation fails.
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.parallel_workers)
                .build()
                .ok()
        } else {
            None
        };
        Ok(Self {
            exclude: ExcludeFilter::new(&config.exclude_patterns)?,
            parallel_workers: config.parallel_workers,
            pool,
        })
    }

    /// Compare the immediate children of `left_root/relative` and
    /// `right_root/relative`, in natural order of name.
    pub fn entries(
        &self,
        left_root: &Path,
        right_root: &Path,
        relative: &Path,
    ) -> Result<Vec<DiffEntry>, DiffError> {
        let left_dir = left_root.join(relative);
        let right_dir = right_root.join(relative);
        self.entries_at(&left_dir, &right_dir)
    }

    /// Compare the immediate children of two directories.
    pub fn entries_at(
        &self,
        left_dir: &Path,
        right_dir: &Path,
    ) -> Result<Vec<DiffEntry>, DiffError> {
        let lefts = list_dir(left_dir, &self.exclude)?;
        let rights = list_dir(right_dir, &self.exclude)?;
        let mut entries = Vec::new();
        for event in merge_names(&lefts, &rights) {
            trace!(?event, "merge event");
            let entry = match event {
                MergeEvent::Common(name) => {
                    let (status, left, right) =
                        self.diff_paths(&left_dir.join(&name), &right_dir.join(&name), 0)?;
                    DiffEntry {
                        name,
                        status,
                        left,
                        right,
                    }
                }
                MergeEvent::LeftOnly(name) => {
                    let left = classify(&left_dir.join(&name));
                    DiffEntry {
                        name,
                        status: Status::LeftOnly,
                        left,
                        right: FileType::Missing,
                    }
                }
                MergeEvent::RightOnly(name) => {
                    let right = classify(&right_dir.join(&name));
                    DiffEntry {
                        name,
                        status: Status::RightOnly,
                        left: FileType::Missing,
                        right,
                    }
                }
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Compare one pair of paths. Returns the status and each side's own
    /// (unresolved) type for display.
    pub fn diff_entry(
        &self,
        left: &Path,
        right: &Path,
    ) -> Result<(Status, FileType, FileType), DiffError> {
        self.diff_paths(left, right, 0)
    }

    /// Roll up a whole directory pair into one status.
    pub fn diff_dir(&self, left: &Path, right: &Path) -> Result<Status, DiffError> {
        self.diff_children(left, right)
    }

    fn diff_paths(
        &self,
        left: &Path,
        right: &Path,
        link_depth: usize,
    ) -> Result<(Status, FileType, FileType), DiffError> {
        let ltype = classify(left);
        let rtype = classify(right);

        // Hardlinks and bind mounts: same device and inode compare equal
        // without touching content.
        if let (Ok(lm), Ok(rm)) = (fs::metadata(left), fs::metadata(right)) {
            if lm.dev() == rm.dev() && lm.ino() == rm.ino() {
                debug!(?left, ?right, "identity shortcut");
                return Ok((Status::Matching, ltype, rtype));
            }
        }

        // A symlink diffs as its target but displays as itself. One link
        // level per recursion step, so chains compose transitively; the
        // depth bound is the only cycle protection.
        if ltype.is_link_kind() {
            if link_depth >= MAX_LINK_DEPTH {
                debug!(?left, "symlink chain too deep");
                return Ok((Status::Unknown, ltype, rtype));
            }
            let target = resolve_symlink(left).map_err(|e| DiffError::read(left, e))?;
            let (status, _, rtype) = self.diff_paths(&target, right, link_depth + 1)?;
            return Ok((status, ltype, rtype));
        }
        if rtype.is_link_kind() {
            if link_depth >= MAX_LINK_DEPTH {
                debug!(?right, "symlink chain too deep");
                return Ok((Status::Unknown, ltype, rtype));
            }
            let target = resolve_symlink(right).map_err(|e| DiffError::read(right, e))?;
            let (status, ltype2, _) = self.diff_paths(left, &target, link_depth + 1)?;
            return Ok((status, ltype2, rtype));
        }

        if ltype != rtype {
            return Ok((Status::Different, ltype, rtype));
        }
        if ltype.is_directory_kind() {
            let status = self.diff_children(left, right)?;
            return Ok((status, ltype, rtype));
        }
        if ltype.is_regular_kind() {
            let status = if same_contents(left, right)? {
                Status::Matching
            } else {
                Status::Different
            };
            return Ok((status, ltype, rtype));
        }
        // Both sides are a kind the engine cannot meaningfully compare
        // (sockets, pipes, devices, both missing).
        Ok((Status::Unknown, ltype, rtype))
    }

    fn diff_children(&self, left: &Path, right: &Path) -> Result<Status, DiffError> {
        let lefts = list_dir(left, &self.exclude)?;
        let rights = list_dir(right, &self.exclude)?;
        let events = merge_names(&lefts, &rights);

        // Any one-sided child settles the whole directory before any child
        // comparison runs.
        let mut common = Vec::with_capacity(events.len());
        for event in events {
            match event {
                MergeEvent::Common(name) => common.push(name),
                MergeEvent::LeftOnly(name) | MergeEvent::RightOnly(name) => {
                    debug!(?left, ?right, ?name, "one-sided child");
                    return Ok(Status::Different);
                }
            }
        }

        if self.parallel_workers == 1 {
            let mut status = Status::Matching;
            for name in &common {
                let (child, _, _) = self.diff_paths(&left.join(name), &right.join(name), 0)?;
                match child {
                    Status::Different | Status::LeftOnly | Status::RightOnly => {
                        return Ok(Status::Different);
                    }
                    Status::Unknown => status = Status::Unknown,
                    Status::Matching => {}
                }
            }
            return Ok(status);
        }

        // Parallel rollup. The fold below is order-independent under the
        // Different > Unknown > Matching precedence, so the outcome is the
        // same as the sequential loop; only the latency changes.
        let rollup = |names: &[OsString]| -> Result<Status, DiffError> {
            names
                .par_iter()
                .map(|name| {
                    self.diff_paths(&left.join(name), &right.join(name), 0)
                        .map(|(status, _, _)| status)
                })
                .try_reduce(|| Status::Matching, |a, b| Ok(combine(a, b)))
        };

        match &self.pool {
            Some(pool) => pool.install(|| rollup(&common)),
            None => rollup(&common),
        }
    }
}

/// Combine two child statuses under the rollup precedence.
fn combine(a: Status, b: Status) -> Status {
    use Status::*;
    match (a, b) {
        (Different | LeftOnly | RightOnly, _) | (_, Different | LeftOnly | RightOnly) => Different,
        (Unknown, _) | (_, Unknown) => Unknown,
        (Matching, Matching) => Matching,
    }
}

/// Exact byte equality of two regular files, short-circuiting on length.
fn same_contents(left: &Path, right: &Path) -> Result<bool, DiffError> {
    let lmeta = fs::metadata(left).map_err(|e| DiffError::read(left, e))?;
    let rmeta = fs::metadata(right).map_err(|e| DiffError::read(right, e))?;
    if lmeta.len() != rmeta.len() {
        return Ok(false);
    }

    let lfile = fs::File::open(left).map_err(|e| DiffError::read(left, e))?;
    let rfile = fs::File::open(right).map_err(|e| DiffError::read(right, e))?;
    let mut lreader = BufReader::with_capacity(CONTENT_CHUNK, lfile);
    let mut rreader = BufReader::with_capacity(CONTENT_CHUNK, rfile);
    let mut lbuf = vec![0u8; CONTENT_CHUNK];
    let mut rbuf = vec![0u8; CONTENT_CHUNK];
    loop {
        let n = lreader.read(&mut lbuf).map_err(|e| DiffError::read(left, e))?;
        if n == 0 {
            return Ok(true);
        }
        // Lengths are equal, so the right side must produce the same count
        // unless the file mutated mid-pass; that surfaces as a read error.
        rreader
            .read_exact(&mut rbuf[..n])
            .map_err(|e| DiffError::read(right, e))?;
        if lbuf[..n] != rbuf[..n] {
            return Ok(false);
        }
    }
}
