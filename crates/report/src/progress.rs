//! Byte accounting across the metadata request and every upload

use crate::context::ReportEvents;
use crate::submission::ReportUpdate;
use bugline_events::{AppEvent, EventEmitter, ProgressEvent};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

/// Planned and acknowledged byte totals for one submission
///
/// `planned` starts at the metadata body length and grows as each upload
/// body is built; `sent` grows as each request completes. Both only
/// increase. The fraction can dip when a new body is planned.
///
/// Owned by the submission worker alone. Uploads are sequential, so plain
/// integers suffice; running uploads in parallel would need these behind a
/// single coordinator or atomics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteCounters {
    planned: u64,
    sent: u64,
}

impl ByteCounters {
    #[must_use]
    pub fn new(planned: u64) -> Self {
        Self { planned, sent: 0 }
    }

    pub fn plan(&mut self, bytes: u64) {
        self.planned = self.planned.saturating_add(bytes);
    }

    pub fn acknowledge(&mut self, bytes: u64) {
        self.sent = self.sent.saturating_add(bytes);
    }

    #[must_use]
    pub fn planned(&self) -> u64 {
        self.planned
    }

    #[must_use]
    pub fn sent(&self) -> u64 {
        self.sent
    }

    #[must_use]
    pub fn fraction(&self) -> f32 {
        fraction(self.sent, self.planned)
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn fraction(sent: u64, planned: u64) -> f32 {
    if planned == 0 {
        return 1.0;
    }
    (sent as f64 / planned as f64).min(1.0) as f32
}

/// Forwards progress to the submission's observer channel
///
/// Called from the worker and from transport progress callbacks. A pair
/// identical to the previous one, or one that would move either total
/// backwards, is dropped.
#[derive(Clone)]
pub(crate) struct ProgressReporter {
    last: Arc<Mutex<Option<(u64, u64)>>>,
    updates: UnboundedSender<ReportUpdate>,
    events: ReportEvents,
}

impl ProgressReporter {
    pub(crate) fn new(updates: UnboundedSender<ReportUpdate>, events: ReportEvents) -> Self {
        Self {
            last: Arc::new(Mutex::new(None)),
            updates,
            events,
        }
    }

    pub(crate) fn report(&self, counters: ByteCounters) {
        self.report_bytes(counters.sent(), counters.planned());
    }

    pub(crate) fn report_bytes(&self, sent: u64, planned: u64) {
        {
            let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some((last_sent, last_planned)) = *last {
                if (sent, planned) == (last_sent, last_planned)
                    || sent < last_sent
                    || planned < last_planned
                {
                    return;
                }
            }
            *last = Some((sent, planned));
        }

        let fraction = fraction(sent, planned);
        let _ = self.updates.send(ReportUpdate::Progress(fraction));
        self.events.emit(AppEvent::Progress(ProgressEvent::Updated {
            report_id: self.events.report_id,
            bytes_sent: sent,
            bytes_planned: planned,
            fraction,
        }));
    }

    /// Most recently emitted fraction, `0.0` before the first
    pub(crate) fn current(&self) -> f32 {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map_or(0.0, |(sent, planned)| fraction(sent, planned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn reporter() -> (ProgressReporter, mpsc::UnboundedReceiver<ReportUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = ReportEvents {
            sender: None,
            report_id: Uuid::new_v4(),
        };
        (ProgressReporter::new(tx, events), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ReportUpdate>) -> Vec<f32> {
        let mut out = Vec::new();
        while let Ok(update) = rx.try_recv() {
            if let ReportUpdate::Progress(p) = update {
                out.push(p);
            }
        }
        out
    }

    #[test]
    fn test_counters() {
        let mut counters = ByteCounters::new(100);
        assert!((counters.fraction() - 0.0).abs() < f32::EPSILON);
        counters.acknowledge(100);
        assert!((counters.fraction() - 1.0).abs() < f32::EPSILON);
        counters.plan(300);
        assert!((counters.fraction() - 0.25).abs() < f32::EPSILON);
        assert_eq!((counters.sent(), counters.planned()), (100, 400));
    }

    #[test]
    fn test_ratio_only_drops_when_planned_grows() {
        let (reporter, mut rx) = reporter();
        let mut counters = ByteCounters::new(100);

        reporter.report_bytes(50, 100);
        reporter.report_bytes(100, 100);
        counters.acknowledge(100);
        reporter.report(counters);
        counters.plan(100);
        reporter.report(counters);
        reporter.report_bytes(150, 200);
        counters.acknowledge(100);
        reporter.report(counters);

        assert_eq!(drain(&mut rx), vec![0.5, 1.0, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_regressions_are_dropped() {
        let (reporter, mut rx) = reporter();
        reporter.report_bytes(80, 100);
        reporter.report_bytes(40, 100);
        reporter.report_bytes(80, 90);

        assert_eq!(drain(&mut rx), vec![0.8]);
        assert!((reporter.current() - 0.8).abs() < f32::EPSILON);
    }
}
