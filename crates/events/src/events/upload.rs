use serde::{Deserialize, Serialize};

use bugline_types::ReportId;

/// Attachment upload events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UploadEvent {
    /// Upload targets received from the report service
    TargetsReceived { report_id: ReportId, count: usize },

    /// An `uploadUrls` entry could not be read and was skipped
    TargetInvalid {
        report_id: ReportId,
        index: usize,
        reason: String,
    },

    /// A target names a file that was never attached
    TargetUnmatched {
        report_id: ReportId,
        file_name: String,
    },

    /// Multipart body built and upload started
    Started {
        report_id: ReportId,
        file_name: String,
        url: String,
        body_bytes: u64,
    },

    /// Storage provider accepted the file
    Completed {
        report_id: ReportId,
        file_name: String,
        status: u16,
    },

    /// Storage provider answered with status >= 300; the report continues
    Rejected {
        report_id: ReportId,
        file_name: String,
        status: u16,
        body: String,
    },

    /// Transport failed for this file; the report continues
    Errored {
        report_id: ReportId,
        file_name: String,
        error: String,
    },
}
