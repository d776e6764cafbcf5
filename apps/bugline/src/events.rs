//! Event handling and user feedback

use crate::display::OutputRenderer;
use crate::logging::log_event_with_tracing;
use bugline_events::{AppEvent, CaptureEvent, EventMessage, GeneralEvent, UploadEvent};

/// Logs every event and surfaces the ones a reporter should see
pub struct EventHandler {
    renderer: OutputRenderer,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(renderer: OutputRenderer) -> Self {
        Self { renderer }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);

        match message.event {
            AppEvent::Upload(UploadEvent::TargetInvalid { index, reason, .. }) => {
                self.renderer
                    .show_warning(&format!("upload target {index} skipped: {reason}"));
            }
            AppEvent::Upload(UploadEvent::Rejected {
                file_name, status, ..
            }) => {
                self.renderer
                    .show_warning(&format!("upload of {file_name} rejected (HTTP {status})"));
            }
            AppEvent::Upload(UploadEvent::Errored {
                file_name, error, ..
            }) => {
                self.renderer
                    .show_warning(&format!("upload of {file_name} failed: {error}"));
            }
            AppEvent::Capture(CaptureEvent::Failed { slot, failure }) => {
                self.renderer.show_warning(&format!(
                    "screenshot {slot} not captured: {}",
                    failure.message
                ));
            }
            AppEvent::General(GeneralEvent::Warning { message, .. }) => {
                self.renderer.show_warning(&message);
            }
            _ => {}
        }
    }
}
