//! Directory listing in natural order

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use crate::error::DiffError;
use crate::exclude::ExcludeFilter;
use crate::natural::natural_os_cmp;

/// List the immediate children of `dir`: excluded names dropped, the rest
/// sorted in natural order.
///
/// Names stay as raw `OsString`s so paths rebuilt from them hit the real
/// filesystem entries even when a name is not valid UTF-8; the exclusion
/// filter matches against the lossy UTF-8 view. Filtering before the merge
/// is safe because an excluded name is absent from both sides' listings, so
/// the merge cursors stay in step. Listing failures (missing directory,
/// permission denied) propagate; callers decide whether that aborts the
/// pass.
pub fn list_dir(dir: &Path, exclude: &ExcludeFilter) -> Result<Vec<OsString>, DiffError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| DiffError::list(dir, e))? {
        let entry = entry.map_err(|e| DiffError::list(dir, e))?;
        let name = entry.file_name();
        if exclude.excluded(&name.to_string_lossy()) {
            continue;
        }
        names.push(name);
    }
    names.sort_by(|a, b| natural_os_cmp(a, b));
    Ok(names)
}
