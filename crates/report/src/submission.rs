//! The asynchronous handle returned by `UserReport::create_report`

use bugline_errors::ReportError;
use bugline_types::{ReportId, ReportState};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Snapshot of a report, sent after every state transition
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStatus {
    pub report_id: ReportId,
    pub state: ReportState,
    pub error: Option<ReportError>,
    /// Last progress fraction emitted before this snapshot
    pub progress: f32,
    /// Parsed metadata response, present once the report succeeded
    pub response: Option<serde_json::Value>,
}

/// Coarse classification of a [`ReportStatus`] for host callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPhase {
    Pending,
    Completed,
    Failed,
}

impl ReportStatus {
    #[must_use]
    pub fn phase(&self) -> StatusPhase {
        match self.state {
            ReportState::Succeeded => StatusPhase::Completed,
            ReportState::Failed => StatusPhase::Failed,
            _ => StatusPhase::Pending,
        }
    }

    /// Stable code of the failure, if any
    #[must_use]
    pub fn error_code(&self) -> Option<&'static str> {
        self.error.map(ReportError::code)
    }
}

/// One observer notification
#[derive(Debug, Clone, PartialEq)]
pub enum ReportUpdate {
    State(ReportStatus),
    Progress(f32),
}

/// How a submission ended
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Succeeded(ReportStatus),
    Failed(ReportStatus),
    Cancelled,
}

impl ReportOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Stops a [`Submission`] from notifying its observer
///
/// Cancelling never aborts a request already on the wire; its result is
/// discarded and no further uploads are started.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// A report in flight
///
/// Updates are produced by a background worker and handed out on the task
/// that polls [`Submission::next`] or [`Submission::run`], so observers never
/// run on the worker.
#[derive(Debug)]
pub struct Submission {
    report_id: ReportId,
    updates: mpsc::UnboundedReceiver<ReportUpdate>,
    cancel: CancelHandle,
    cancelled: watch::Receiver<bool>,
    last: Option<ReportStatus>,
    finished: bool,
}

impl Submission {
    pub(crate) fn new(
        report_id: ReportId,
        updates: mpsc::UnboundedReceiver<ReportUpdate>,
    ) -> (Self, watch::Receiver<bool>) {
        let (tx, cancelled) = watch::channel(false);
        let submission = Self {
            report_id,
            updates,
            cancel: CancelHandle { tx: Arc::new(tx) },
            cancelled: cancelled.clone(),
            last: None,
            finished: false,
        };
        (submission, cancelled)
    }

    #[must_use]
    pub fn report_id(&self) -> ReportId {
        self.report_id
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Next update, or `None` once the report reached a terminal state, was
    /// cancelled, or its worker went away
    pub async fn next(&mut self) -> Option<ReportUpdate> {
        if self.finished || self.cancel.is_cancelled() {
            return None;
        }

        let update = tokio::select! {
            biased;
            _ = self.cancelled.wait_for(|c| *c) => None,
            update = self.updates.recv() => update,
        };

        // Re-check: cancellation wins over an update that raced with it
        if self.cancel.is_cancelled() {
            return None;
        }

        match &update {
            Some(ReportUpdate::State(status)) => {
                self.finished = status.state.is_terminal();
                self.last = Some(status.clone());
            }
            Some(ReportUpdate::Progress(_)) => {}
            None => self.finished = true,
        }
        update
    }

    /// Drive the report to completion, handing every update to `observer`
    pub async fn run<F>(mut self, mut observer: F) -> ReportOutcome
    where
        F: FnMut(&ReportUpdate),
    {
        while let Some(update) = self.next().await {
            observer(&update);
        }
        self.outcome()
    }

    /// Drive the report to completion without observing it
    pub async fn wait(self) -> ReportOutcome {
        self.run(|_| {}).await
    }

    fn outcome(self) -> ReportOutcome {
        if self.cancel.is_cancelled() {
            return ReportOutcome::Cancelled;
        }
        match self.last {
            Some(status) if status.state == ReportState::Succeeded => {
                ReportOutcome::Succeeded(status)
            }
            Some(status) if status.state == ReportState::Failed => ReportOutcome::Failed(status),
            // Worker ended without reaching a terminal state
            last => ReportOutcome::Failed(ReportStatus {
                report_id: self.report_id,
                state: ReportState::Failed,
                error: Some(ReportError::UnableToProcess),
                progress: last.map_or(0.0, |s| s.progress),
                response: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status(id: ReportId, state: ReportState) -> ReportStatus {
        ReportStatus {
            report_id: id,
            state,
            error: None,
            progress: 0.0,
            response: None,
        }
    }

    #[tokio::test]
    async fn test_stops_after_terminal_state() {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let (mut submission, _) = Submission::new(id, rx);

        tx.send(ReportUpdate::State(status(id, ReportState::Initialized)))
            .unwrap();
        tx.send(ReportUpdate::State(status(id, ReportState::Succeeded)))
            .unwrap();
        tx.send(ReportUpdate::Progress(1.0)).unwrap();

        assert!(submission.next().await.is_some());
        assert!(submission.next().await.is_some());
        assert!(submission.next().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_silences_queued_updates() {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let (submission, worker_view) = Submission::new(id, rx);

        tx.send(ReportUpdate::Progress(0.5)).unwrap();
        submission.cancel_handle().cancel();
        assert!(*worker_view.borrow());

        let mut seen = 0;
        let outcome = submission.run(|_| seen += 1).await;
        assert_eq!(seen, 0);
        assert_eq!(outcome, ReportOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_closed_channel_without_terminal_state_fails() {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let (submission, _) = Submission::new(id, rx);

        tx.send(ReportUpdate::State(status(id, ReportState::UploadingFiles)))
            .unwrap();
        drop(tx);

        match submission.wait().await {
            ReportOutcome::Failed(status) => {
                assert_eq!(status.error_code(), Some("UNABLE_TO_PROCESS"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_phase() {
        let id = Uuid::new_v4();
        assert_eq!(status(id, ReportState::Initialized).phase(), StatusPhase::Pending);
        assert_eq!(status(id, ReportState::Succeeded).phase(), StatusPhase::Completed);
        assert_eq!(status(id, ReportState::Failed).phase(), StatusPhase::Failed);
    }
}
