//! Composing a report and submitting it

use crate::attachment::{Attachment, SharedAttachments};
use crate::capture::{CaptureQueue, ScreenshotSource};
use crate::context::{ReportContext, ReportEvents};
use crate::progress::{ByteCounters, ProgressReporter};
use crate::state::StateMachine;
use crate::submission::{ReportStatus, ReportUpdate, Submission};
use crate::upload::UploadPipeline;
use bugline_errors::{CaptureError, Error, ReportError};
use bugline_events::{AppEvent, EventEmitter, EventSender, FailureContext, ReportEvent, UploadEvent};
use bugline_net::{HttpRequest, HttpResponse, HttpTransport, ProgressFn};
use bugline_types::{CreateReportRequest, CreateReportResponse, ReportId, ReportState, Severity};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

/// A bug report being composed
///
/// Set the text and attachments, then call [`UserReport::create_report`]
/// once. Screenshots requested with [`UserReport::attach_screenshot`] are
/// captured in the background and awaited before any upload starts.
pub struct UserReport {
    id: ReportId,
    content: String,
    severity: Severity,
    user_email: String,
    attachments: SharedAttachments,
    screenshot_source: Option<Arc<dyn ScreenshotSource>>,
    captures: Option<CaptureQueue>,
    events: Option<EventSender>,
    active: bool,
}

impl Default for UserReport {
    fn default() -> Self {
        Self::new()
    }
}

impl UserReport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            content: String::new(),
            severity: Severity::None,
            user_email: String::new(),
            attachments: SharedAttachments::default(),
            screenshot_source: None,
            captures: None,
            events: None,
            active: false,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn with_screenshot_source(mut self, source: Arc<dyn ScreenshotSource>) -> Self {
        self.screenshot_source = Some(source);
        self
    }

    #[must_use]
    pub fn id(&self) -> ReportId {
        self.id
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Append a line to the content, e.g. a build version or platform string
    pub fn append_content(&mut self, extra: &str) {
        if !self.content.is_empty() && !self.content.ends_with('\n') {
            self.content.push('\n');
        }
        self.content.push_str(extra);
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.user_email = email.into();
    }

    /// Attach raw bytes under `file_name`
    pub fn attach_file(
        &mut self,
        file_name: impl Into<String>,
        payload: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) {
        self.attachments
            .push(Attachment::new(file_name, payload, content_type));
    }

    /// Attach UTF-8 text as `text/plain`
    pub fn attach_text(&mut self, file_name: impl Into<String>, contents: &str) {
        self.attachments.push(Attachment::text(file_name, contents));
    }

    /// Queue a screenshot capture and reserve its attachment slot
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyActive`] once the report was submitted, an
    /// error if no screenshot source is configured, or one when called
    /// outside a Tokio runtime.
    pub fn attach_screenshot(&mut self, show_ui: bool) -> Result<usize, Error> {
        if self.active {
            return Err(Error::AlreadyActive);
        }
        if self.captures.is_none() {
            let source = self
                .screenshot_source
                .clone()
                .ok_or(CaptureError::NoSource)?;
            self.captures = Some(CaptureQueue::new(
                source,
                self.attachments.clone(),
                self.events.clone(),
            ));
        }
        match &self.captures {
            Some(captures) => captures.request_capture(show_ui),
            None => Err(CaptureError::NoSource.into()),
        }
    }

    /// Copy of the current attachments; pending screenshots have empty payloads
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments.snapshot()
    }

    /// Whether `create_report` has been called
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Submit the report
    ///
    /// Validation failures do not return `Err`: the returned [`Submission`]
    /// yields a single `Failed` status and no request is made.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyActive`] if this report was submitted before,
    /// or an internal error when called outside a Tokio runtime.
    pub fn create_report(&mut self, ctx: &ReportContext) -> Result<Submission, Error> {
        if self.active {
            return Err(Error::AlreadyActive);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::internal(format!("report submission needs a runtime: {e}")))?;
        self.active = true;

        let events = ReportEvents {
            sender: self.events.clone().or_else(|| ctx.events.clone()),
            report_id: self.id,
        };
        let (updates, rx) = mpsc::unbounded_channel();
        let (submission, cancel) = Submission::new(self.id, rx);
        let mut machine = StateMachine::new(events.clone());

        let prepared = ctx
            .token()
            .ok_or(ReportError::NoRequestToken)
            .and_then(|token| self.prepare(ctx, token));

        let (url, body) = match prepared {
            Ok(prepared) => prepared,
            Err(reason) => {
                machine.fail(reason);
                emit_failed(&events, &machine, FailureContext::from_error(&reason));
                let _ = updates.send(ReportUpdate::State(ReportStatus {
                    report_id: self.id,
                    state: machine.state(),
                    error: machine.error(),
                    progress: 0.0,
                    response: None,
                }));
                return Ok(submission);
            }
        };

        events.emit(AppEvent::Report(ReportEvent::Submitting {
            report_id: self.id,
            severity: self.severity,
            attachments: self.attachments.lock().len(),
            body_bytes: body.len() as u64,
        }));

        let worker = SubmissionWorker {
            transport: Arc::clone(&ctx.transport),
            attachments: self.attachments.clone(),
            captures: self.captures.clone(),
            progress: ProgressReporter::new(updates.clone(), events.clone()),
            machine,
            updates,
            cancel,
            events,
            metadata: None,
        };
        runtime.spawn(worker.run(url, body));

        Ok(submission)
    }

    /// Validate content and build the metadata URL and body
    fn prepare(
        &self,
        ctx: &ReportContext,
        token: &str,
    ) -> Result<(Result<String, Error>, Bytes), ReportError> {
        if self.content.is_empty() {
            return Err(ReportError::NoContent);
        }

        let request = CreateReportRequest {
            content: self.content.clone(),
            severity: self.severity.label().map(str::to_string),
            user_email: self.user_email.clone(),
            file_names: self.attachments.file_names(),
        };
        let body = serde_json::to_vec(&request).map_err(|_| ReportError::NoContent)?;
        if body.is_empty() {
            return Err(ReportError::NoContent);
        }

        let url: Result<String, Error> = ctx
            .create_report_url(token)
            .map_err(|e| bugline_errors::NetworkError::InvalidUrl(e.to_string()).into());
        Ok((url, Bytes::from(body)))
    }
}

fn emit_failed(events: &ReportEvents, machine: &StateMachine, failure: FailureContext) {
    events.emit(AppEvent::Report(ReportEvent::Failed {
        report_id: events.report_id,
        state: machine.state(),
        failure,
    }));
}

/// Runs the network half of one submission off the caller's task
struct SubmissionWorker {
    transport: Arc<dyn HttpTransport>,
    attachments: SharedAttachments,
    captures: Option<CaptureQueue>,
    progress: ProgressReporter,
    machine: StateMachine,
    updates: mpsc::UnboundedSender<ReportUpdate>,
    cancel: watch::Receiver<bool>,
    events: ReportEvents,
    /// Metadata response, held until uploads start
    metadata: Option<HttpResponse>,
}

impl SubmissionWorker {
    async fn run(mut self, url: Result<String, Error>, body: Bytes) {
        self.advance(ReportState::Initialized, None);

        let metadata_bytes = body.len() as u64;
        let mut counters = ByteCounters::new(metadata_bytes);
        let reporter = self.progress.clone();
        let on_progress: ProgressFn =
            Arc::new(move |sent| reporter.report_bytes(sent, metadata_bytes));

        let result = match url {
            Ok(url) => {
                self.transport
                    .send(HttpRequest::json(url, body), Some(on_progress))
                    .await
            }
            Err(e) => Err(e),
        };
        if self.cancelled() {
            return;
        }

        let response = match result {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                let message = format!(
                    "report service answered {}: {}",
                    response.status,
                    String::from_utf8_lossy(&response.body)
                );
                self.fail(ReportError::ErrorResponse, Some(message));
                return;
            }
            Err(e) => {
                self.fail(ReportError::UnableToProcess, Some(e.to_string()));
                return;
            }
        };

        counters.acknowledge(metadata_bytes);
        self.progress.report(counters);

        let parsed = CreateReportResponse::parse(&response.body);
        self.metadata = Some(response);
        self.advance(ReportState::ReportSubmitted, None);

        self.events.emit(AppEvent::Upload(UploadEvent::TargetsReceived {
            report_id: self.events.report_id,
            count: parsed.targets().len(),
        }));
        for (index, reason) in &parsed.rejected {
            self.events.emit(AppEvent::Upload(UploadEvent::TargetInvalid {
                report_id: self.events.report_id,
                index: *index,
                reason: reason.clone(),
            }));
        }

        self.advance(ReportState::UploadingFiles, None);
        if self.machine.releases_handle() {
            if let Some(metadata) = self.metadata.take() {
                self.events.emit_debug(format!(
                    "released metadata response ({} bytes, status {})",
                    metadata.body.len(),
                    metadata.status
                ));
            }
        }

        let pipeline = UploadPipeline {
            transport: self.transport.as_ref(),
            attachments: &self.attachments,
            captures: self.captures.as_ref(),
            progress: &self.progress,
            events: &self.events,
            cancel: &self.cancel,
        };
        let summary = pipeline.run(parsed.targets(), &mut counters).await;
        if self.cancelled() {
            return;
        }

        if summary.failed > 0 {
            self.events.emit_warning(format!(
                "{} of {} attachment uploads failed",
                summary.failed,
                summary.failed + summary.uploaded
            ));
        }

        if self.machine.is_ok() {
            self.events.emit(AppEvent::Report(ReportEvent::Succeeded {
                report_id: self.events.report_id,
                uploads: summary.uploaded,
                bytes_sent: counters.sent(),
            }));
            self.advance(ReportState::Succeeded, Some(parsed.raw));
        } else {
            self.notify(None);
        }
    }

    fn cancelled(&self) -> bool {
        let cancelled = *self.cancel.borrow();
        if cancelled {
            self.events.emit(AppEvent::Report(ReportEvent::Cancelled {
                report_id: self.events.report_id,
            }));
        }
        cancelled
    }

    fn advance(&mut self, next: ReportState, response: Option<serde_json::Value>) {
        if self.machine.advance(next) {
            self.notify(response);
        }
    }

    fn fail(&mut self, reason: ReportError, detail: Option<String>) {
        self.machine.fail(reason);
        let mut failure = FailureContext::from_error(&reason);
        if let Some(detail) = detail {
            failure.message = format!("{}: {detail}", failure.message);
        }
        emit_failed(&self.events, &self.machine, failure);
        self.notify(None);
    }

    fn notify(&self, response: Option<serde_json::Value>) {
        if *self.cancel.borrow() {
            return;
        }
        let _ = self.updates.send(ReportUpdate::State(ReportStatus {
            report_id: self.events.report_id,
            state: self.machine.state(),
            error: self.machine.error(),
            progress: self.progress.current(),
            response,
        }));
    }
}
