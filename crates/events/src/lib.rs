#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in bugline
//!
//! Library crates never print or log directly. They emit domain events on an
//! unbounded channel and the binary decides how to render or log them.
//!
//! ## Architecture
//!
//! - **Domain-driven events**: events grouped by functional domain (Report, Upload, Capture, ...)
//! - **Unified `EventEmitter` trait**: single API for all emissions
//! - **Tracing integration**: every event knows its log level and target

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, CaptureEvent, FailureContext, GeneralEvent, ProgressEvent, ReportEvent, UploadEvent,
};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// An event together with its emission metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event, deriving level and source from the event itself
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self { meta, event }
    }
}

/// Type alias for event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout bugline
///
/// Implemented for the raw `EventSender` and for any context struct that may
/// or may not carry one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Correlation id stamped on every event emitted through this emitter
    fn correlation_id(&self) -> Option<String> {
        None
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let mut message = EventMessage::from_event(event);
            if let Some(id) = self.correlation_id() {
                message.meta = message.meta.with_correlation_id(id);
            }
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(message);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
