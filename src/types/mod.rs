//! Core type definitions for dirbackup

mod decision;
mod entry;
mod error;
mod stats;

pub use decision::{ChangeReason, CopyDecision};
pub use entry::{Entry, EntryKind};
pub use error::{CopyStage, SyncError};
pub use stats::RunStats;
