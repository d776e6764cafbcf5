use serde::{Deserialize, Serialize};

use bugline_types::{ReportId, ReportState, Severity};

use super::FailureContext;

/// Lifecycle events of one report submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReportEvent {
    /// Metadata request built and about to be sent
    Submitting {
        report_id: ReportId,
        severity: Severity,
        attachments: usize,
        body_bytes: u64,
    },

    /// The report moved to a new lifecycle state
    StateChanged {
        report_id: ReportId,
        from: ReportState,
        to: ReportState,
    },

    /// A transition was refused because it did not move forward
    TransitionRejected {
        report_id: ReportId,
        from: ReportState,
        to: ReportState,
    },

    /// Report ended in `Succeeded`
    Succeeded {
        report_id: ReportId,
        uploads: usize,
        bytes_sent: u64,
    },

    /// Report ended in `Failed`
    Failed {
        report_id: ReportId,
        state: ReportState,
        failure: FailureContext,
    },

    /// Caller stopped listening; in-flight work finishes silently
    Cancelled { report_id: ReportId },
}
