//! ddiff - compare two directory trees entry by entry

pub mod diff;
pub mod error;
pub mod exclude;
pub mod file_type;
pub mod list;
pub mod merge;
pub mod natural;
pub mod output;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use diff::{DiffEngine, DiffEntry, EngineConfig, Status};
pub use error::DiffError;
pub use exclude::ExcludeFilter;
pub use file_type::{FileType, classify, resolve_symlink};
pub use list::list_dir;
pub use merge::{MergeEvent, merge_names};
pub use natural::{natural_cmp, natural_key_cmp, natural_os_cmp};
pub use output::{DiffFormatter, OutputConfig, StatusCounts, print_json};
