use serde::{Deserialize, Serialize};

use bugline_types::ReportId;

/// Byte-level progress of a report submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    /// Either counter changed
    Updated {
        report_id: ReportId,
        bytes_sent: u64,
        bytes_planned: u64,
        fraction: f32,
    },
}
