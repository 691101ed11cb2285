//! Directory walking logic

mod walker;

pub use walker::{build_walker, walk_source, EntrySink, WalkSummary};
pub(crate) use walker::error_path;
