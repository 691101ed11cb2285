//! CopyDecision - output of the change detector

use super::SyncError;

/// Why a file was judged stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    /// Target path does not exist
    Missing,

    /// Byte length differs
    SizeChanged,

    /// Sizes match but modification times are not exactly equal
    ModTimeChanged,
}

/// Change detector verdict for one (source, target) pair
#[derive(Debug)]
pub enum CopyDecision {
    /// Target is stale and must be rewritten
    Copy(ChangeReason),

    /// Same size and identical modification time
    Skip,

    /// Stat failed; the caller logs and moves on
    Error(SyncError),
}

impl CopyDecision {
    pub fn is_copy(&self) -> bool {
        matches!(self, CopyDecision::Copy(_))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, CopyDecision::Skip)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CopyDecision::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(CopyDecision::Copy(ChangeReason::Missing).is_copy());
        assert!(CopyDecision::Skip.is_skip());
        assert!(CopyDecision::Error(SyncError::Config("x".to_string())).is_error());
        assert!(!CopyDecision::Skip.is_copy());
    }
}
