//! Report lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one report submission
///
/// The non-failed states form a chain that can only be walked forward.
/// `Failed` sits outside that chain and can be entered from any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportState {
    #[default]
    Initializing,
    Initialized,
    ReportSubmitted,
    UploadingFiles,
    Succeeded,
    Failed,
}

impl ReportState {
    /// Position in the forward chain, `None` for `Failed`
    #[must_use]
    pub fn rank(self) -> Option<u8> {
        match self {
            Self::Initializing => Some(0),
            Self::Initialized => Some(1),
            Self::ReportSubmitted => Some(2),
            Self::UploadingFiles => Some(3),
            Self::Succeeded => Some(4),
            Self::Failed => None,
        }
    }

    /// Whether `next` is a legal forward step from `self`
    ///
    /// Only strictly increasing moves between non-failed states qualify;
    /// failing is handled separately and is always allowed.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        match (self.rank(), next.rank()) {
            (Some(current), Some(next)) => next > current,
            _ => false,
        }
    }

    /// `true` for states nothing can follow
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// `true` for every state except `Failed`
    #[must_use]
    pub fn is_ok(self) -> bool {
        self.rank().is_some()
    }

    /// Stable lower-case name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::ReportSubmitted => "report_submitted",
            Self::UploadingFiles => "uploading_files",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ReportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: [ReportState; 5] = [
        ReportState::Initializing,
        ReportState::Initialized,
        ReportState::ReportSubmitted,
        ReportState::UploadingFiles,
        ReportState::Succeeded,
    ];

    #[test]
    fn test_forward_only() {
        for (i, from) in CHAIN.iter().enumerate() {
            for (j, to) in CHAIN.iter().enumerate() {
                assert_eq!(from.can_advance_to(*to), j > i, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_failed_is_outside_chain() {
        assert!(!ReportState::Failed.is_ok());
        assert!(ReportState::Failed.is_terminal());
        assert!(!ReportState::Initialized.can_advance_to(ReportState::Failed));
        assert!(!ReportState::Failed.can_advance_to(ReportState::Succeeded));
    }
}
