//! Forward-only report lifecycle

use crate::context::ReportEvents;
use bugline_errors::ReportError;
use bugline_events::{AppEvent, EventEmitter, ReportEvent};
use bugline_types::ReportState;

/// Tracks one report's [`ReportState`] and the reason it failed, if it did
#[derive(Debug)]
pub struct StateMachine {
    state: ReportState,
    error: Option<ReportError>,
    events: ReportEvents,
}

impl StateMachine {
    pub(crate) fn new(events: ReportEvents) -> Self {
        Self {
            state: ReportState::Initializing,
            error: None,
            events,
        }
    }

    /// Move forward to `next`
    ///
    /// Returns `false` and leaves the state untouched unless `next` ranks
    /// strictly above the current state. `Failed` is never reached this way.
    pub fn advance(&mut self, next: ReportState) -> bool {
        let from = self.state;
        if !from.can_advance_to(next) {
            self.events
                .emit(AppEvent::Report(ReportEvent::TransitionRejected {
                    report_id: self.events.report_id,
                    from,
                    to: next,
                }));
            return false;
        }

        self.state = next;
        self.emit_changed(from);
        true
    }

    /// Enter `Failed` with `reason`, from any state
    pub fn fail(&mut self, reason: ReportError) {
        let from = self.state;
        self.state = ReportState::Failed;
        self.error = Some(reason);
        if from != ReportState::Failed {
            self.emit_changed(from);
        }
    }

    #[must_use]
    pub fn state(&self) -> ReportState {
        self.state
    }

    #[must_use]
    pub fn error(&self) -> Option<ReportError> {
        self.error
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.state.is_ok()
    }

    /// Whether the metadata request/response is no longer needed
    #[must_use]
    pub fn releases_handle(&self) -> bool {
        matches!(
            self.state,
            ReportState::UploadingFiles | ReportState::Succeeded | ReportState::Failed
        )
    }

    fn emit_changed(&self, from: ReportState) {
        self.events.emit(AppEvent::Report(ReportEvent::StateChanged {
            report_id: self.events.report_id,
            from,
            to: self.state,
        }));
    }
}
