use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Screenshot capture queue events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CaptureEvent {
    /// A slot was reserved and a capture job queued
    Queued {
        slot: usize,
        file_name: String,
        show_ui: bool,
    },

    /// The screenshot source delivered a frame
    FrameReceived { slot: usize, width: u32, height: u32 },

    /// The frame was encoded and written into its slot
    Encoded { slot: usize, bytes: u64 },

    /// The job finished without a payload
    Failed { slot: usize, failure: FailureContext },
}
