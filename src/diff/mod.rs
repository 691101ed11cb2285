//! Change detection - decides whether a target copy is stale

mod compare;

pub use compare::{compare_metadata, should_copy};
