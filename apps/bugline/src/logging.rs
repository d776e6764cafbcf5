//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields, so
//! debug log files carry the full submission history of a report.

use bugline_events::{
    AppEvent, CaptureEvent, EventMessage, GeneralEvent, ProgressEvent, ReportEvent, UploadEvent,
};
use tracing::{debug, error, info, trace, warn};

/// Log an `EventMessage` at the level its event asks for
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    match &message.event {
        AppEvent::Report(event) => log_report(meta, event),
        AppEvent::Upload(event) => log_upload(meta, event),
        AppEvent::Capture(event) => log_capture(meta, event),
        AppEvent::Progress(ProgressEvent::Updated {
            report_id,
            bytes_sent,
            bytes_planned,
            fraction,
        }) => {
            trace!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                bytes_sent = bytes_sent,
                bytes_planned = bytes_planned,
                fraction = fraction,
                "Progress updated"
            );
        }
        AppEvent::General(event) => log_general(meta, event),
    }
}

fn log_report(meta: &bugline_events::EventMeta, event: &ReportEvent) {
    match event {
        ReportEvent::Submitting {
            report_id,
            severity,
            attachments,
            body_bytes,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                severity = %severity,
                attachments = attachments,
                body_bytes = body_bytes,
                "Submitting report"
            );
        }
        ReportEvent::StateChanged {
            report_id,
            from,
            to,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                from = %from,
                to = %to,
                "Report state changed"
            );
        }
        ReportEvent::TransitionRejected {
            report_id,
            from,
            to,
        } => {
            warn!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                from = %from,
                to = %to,
                "Report state transition rejected"
            );
        }
        ReportEvent::Succeeded {
            report_id,
            uploads,
            bytes_sent,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                uploads = uploads,
                bytes_sent = bytes_sent,
                "Report succeeded"
            );
        }
        ReportEvent::Failed {
            report_id,
            state,
            failure,
        } => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                state = %state,
                retryable = failure.retryable,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Report failed"
            );
        }
        ReportEvent::Cancelled { report_id } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                "Report cancelled"
            );
        }
    }
}

fn log_upload(meta: &bugline_events::EventMeta, event: &UploadEvent) {
    match event {
        UploadEvent::TargetsReceived { report_id, count } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                count = count,
                "Upload targets received"
            );
        }
        UploadEvent::TargetInvalid {
            report_id,
            index,
            reason,
        } => {
            warn!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                index = index,
                reason = %reason,
                "Upload target skipped"
            );
        }
        UploadEvent::TargetUnmatched {
            report_id,
            file_name,
        } => {
            debug!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                file_name = %file_name,
                "No attachment for upload target"
            );
        }
        UploadEvent::Started {
            report_id,
            file_name,
            url,
            body_bytes,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                file_name = %file_name,
                url = %url,
                body_bytes = body_bytes,
                "Upload started"
            );
        }
        UploadEvent::Completed {
            report_id,
            file_name,
            status,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                file_name = %file_name,
                status = status,
                "Upload completed"
            );
        }
        UploadEvent::Rejected {
            report_id,
            file_name,
            status,
            body,
        } => {
            warn!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                file_name = %file_name,
                status = status,
                body = %body,
                "Upload rejected"
            );
        }
        UploadEvent::Errored {
            report_id,
            file_name,
            error,
        } => {
            warn!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                report_id = %report_id,
                file_name = %file_name,
                error = %error,
                "Upload errored"
            );
        }
    }
}

fn log_capture(meta: &bugline_events::EventMeta, event: &CaptureEvent) {
    match event {
        CaptureEvent::Queued {
            slot,
            file_name,
            show_ui,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                slot = slot,
                file_name = %file_name,
                show_ui = show_ui,
                "Screenshot queued"
            );
        }
        CaptureEvent::FrameReceived {
            slot,
            width,
            height,
        } => {
            debug!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                slot = slot,
                width = width,
                height = height,
                "Screenshot frame received"
            );
        }
        CaptureEvent::Encoded { slot, bytes } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                slot = slot,
                bytes = bytes,
                "Screenshot encoded"
            );
        }
        CaptureEvent::Failed { slot, failure } => {
            warn!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                slot = slot,
                code = ?failure.code,
                message = %failure.message,
                "Screenshot capture failed"
            );
        }
    }
}

fn log_general(meta: &bugline_events::EventMeta, event: &GeneralEvent) {
    match event {
        GeneralEvent::Warning { message } => {
            warn!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                message = %message,
                "Warning"
            );
        }
        GeneralEvent::Error { message } => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                message = %message,
                "Error"
            );
        }
        GeneralEvent::DebugLog { message } => {
            debug!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                message = %message,
                "Debug"
            );
        }
    }
}
