#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Bug report submission
//!
//! A [`UserReport`] collects text, severity, contact email and attachments
//! (including screenshots captured in the background). Submitting it sends
//! the metadata to the report service, then uploads each attachment to the
//! target the service returned for it, one at a time, reporting lifecycle
//! states and a single byte-level progress fraction along the way.

mod attachment;
pub mod capture;
mod context;
pub mod progress;
mod report;
pub mod state;
pub mod submission;
mod upload;

pub use attachment::Attachment;
pub use capture::{CaptureQueue, CaptureReply, PixelBuffer, ScreenshotSource};
pub use context::ReportContext;
pub use progress::ByteCounters;
pub use report::UserReport;
pub use state::StateMachine;
pub use submission::{
    CancelHandle, ReportOutcome, ReportStatus, ReportUpdate, StatusPhase, Submission,
};
pub use upload::UploadSummary;
