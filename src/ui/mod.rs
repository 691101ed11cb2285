//! Terminal output for the end of a run

mod report;

pub use report::{format_failure, format_run_summary};
