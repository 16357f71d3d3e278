//! File type classification from filesystem metadata
//!
//! Classification is a total function over arbitrary paths: a path that does
//! not exist maps to `Missing`, a path whose metadata cannot be read maps to
//! `Unknown`. Nothing here ever caches - every call reads live state.

use std::fs;
use std::io;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// What kind of thing sits at a path, in GNU ls taxonomy.
///
/// The variants mirror the LS_COLORS kind keys so a front end can color
/// entries with an externally supplied table. `Door` is kept for the code
/// table; Linux never reports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Nothing exists at the path
    Missing,
    /// Symlink whose target does not exist
    Orphan,
    /// Symlink with a resolvable target
    Symlink,
    /// Plain regular file
    File,
    /// Regular file with any executable bit
    Executable,
    /// Regular file with the set-user-id bit
    Setuid,
    /// Regular file with the set-group-id bit
    Setgid,
    /// Plain directory
    Directory,
    /// Directory with the sticky bit
    Sticky,
    /// Directory writable by others
    OtherWrite,
    /// Directory with sticky bit and others-write
    StickyWrite,
    BlockDevice,
    CharDevice,
    NamedPipe,
    Socket,
    Door,
    /// Unsupported or unreadable kind
    Unknown,
}

impl FileType {
    /// Two-letter code matching the LS_COLORS key for this kind.
    pub fn code(self) -> &'static str {
        match self {
            FileType::Missing => "mi",
            FileType::Orphan => "or",
            FileType::Symlink => "ln",
            FileType::File => "fi",
            FileType::Executable => "ex",
            FileType::Setuid => "su",
            FileType::Setgid => "sg",
            FileType::Directory => "di",
            FileType::Sticky => "st",
            FileType::OtherWrite => "ow",
            FileType::StickyWrite => "tw",
            FileType::BlockDevice => "bd",
            FileType::CharDevice => "cd",
            FileType::NamedPipe => "pi",
            FileType::Socket => "so",
            FileType::Door => "do",
            FileType::Unknown => "uk",
        }
    }

    /// True for any of the directory subkinds.
    pub fn is_directory_kind(self) -> bool {
        matches!(
            self,
            FileType::Directory | FileType::Sticky | FileType::OtherWrite | FileType::StickyWrite
        )
    }

    /// True for any of the regular-file subkinds.
    pub fn is_regular_kind(self) -> bool {
        matches!(
            self,
            FileType::File | FileType::Executable | FileType::Setuid | FileType::Setgid
        )
    }

    /// True for symlinks, resolvable or not.
    pub fn is_link_kind(self) -> bool {
        matches!(self, FileType::Symlink | FileType::Orphan)
    }
}

/// Classify the path from its own (unfollowed) metadata.
///
/// Symlinks classify as the link itself: `Symlink` when the target exists,
/// `Orphan` when it does not. Directory and regular-file subkinds come from
/// the mode bits, in the same precedence ls uses.
pub fn classify(path: &Path) -> FileType {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return FileType::Missing,
        Err(_) => return FileType::Unknown,
    };
    let ftype = meta.file_type();

    if ftype.is_symlink() {
        // The link itself is the type; following only decides orphan-ness.
        return match fs::metadata(path) {
            Ok(_) => FileType::Symlink,
            Err(_) => FileType::Orphan,
        };
    }

    let mode = meta.mode();
    if ftype.is_dir() {
        let sticky = mode & 0o1000 != 0;
        let write = mode & 0o0002 != 0;
        return match (sticky, write) {
            (true, true) => FileType::StickyWrite,
            (false, true) => FileType::OtherWrite,
            (true, false) => FileType::Sticky,
            (false, false) => FileType::Directory,
        };
    }

    if ftype.is_block_device() {
        return FileType::BlockDevice;
    }
    if ftype.is_char_device() {
        return FileType::CharDevice;
    }
    if ftype.is_fifo() {
        return FileType::NamedPipe;
    }
    if ftype.is_socket() {
        return FileType::Socket;
    }
    if !ftype.is_file() {
        return FileType::Unknown;
    }

    if mode & 0o4000 != 0 {
        FileType::Setuid
    } else if mode & 0o2000 != 0 {
        FileType::Setgid
    } else if mode & 0o0111 != 0 {
        FileType::Executable
    } else {
        FileType::File
    }
}

/// Resolve one level of symlink, joining a relative target against the
/// link's parent directory.
///
/// Deliberately not `canonicalize`: chains resolve one hop per call so the
/// diff engine can re-examine each intermediate target.
pub fn resolve_symlink(path: &Path) -> io::Result<PathBuf> {
    let target = fs::read_link(path)?;
    if target.is_relative() {
        Ok(path.parent().unwrap_or(Path::new("")).join(target))
    } else {
        Ok(target)
    }
}
