//! Deferred screenshot attachments
//!
//! A capture reserves its attachment slot immediately and fills it in later.
//! Jobs run one at a time on a single worker task in the order they were
//! requested: ask the [`ScreenshotSource`] for a frame, wait for its one-shot
//! reply, PNG-encode on the blocking pool, write the bytes into the slot.

use crate::attachment::{Attachment, SharedAttachments};
use bugline_errors::{CaptureError, Error};
use bugline_events::{AppEvent, CaptureEvent, EventEmitter, EventSender, FailureContext};
use std::io::Cursor;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot, watch};

/// File name pattern for screenshots, local time
pub const SCREENSHOT_NAME_FORMAT: &str = "%Y-%m-%d %H-%M-%S.png";

pub const SCREENSHOT_CONTENT_TYPE: &str = "image/png";

/// An uncompressed RGBA8 frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Sender half a [`ScreenshotSource`] answers on, exactly once
pub type CaptureReply = oneshot::Sender<PixelBuffer>;

/// Host capability producing screenshots
///
/// The source should send one frame on `reply` once it has one. Dropping
/// `reply` without sending marks the capture as failed; never answering
/// leaves the queue waiting.
pub trait ScreenshotSource: Send + Sync {
    fn request_capture(&self, show_ui: bool, reply: CaptureReply);
}

struct CaptureJob {
    slot: usize,
    show_ui: bool,
}

/// FIFO queue of screenshot captures feeding a report's attachments
#[derive(Clone)]
pub struct CaptureQueue {
    source: Arc<dyn ScreenshotSource>,
    attachments: SharedAttachments,
    jobs: Arc<Mutex<Option<mpsc::UnboundedSender<CaptureJob>>>>,
    pending: Arc<watch::Sender<usize>>,
    events: Option<EventSender>,
}

impl CaptureQueue {
    pub(crate) fn new(
        source: Arc<dyn ScreenshotSource>,
        attachments: SharedAttachments,
        events: Option<EventSender>,
    ) -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            source,
            attachments,
            jobs: Arc::new(Mutex::new(None)),
            pending: Arc::new(pending),
            events,
        }
    }

    /// Reserve a slot for a screenshot and queue its capture
    ///
    /// Returns the slot index. The slot holds an empty payload until the
    /// capture finishes.
    ///
    /// # Errors
    ///
    /// Returns an error when called outside a Tokio runtime.
    pub fn request_capture(&self, show_ui: bool) -> Result<usize, Error> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::internal(format!("screenshot capture needs a runtime: {e}")))?;

        let file_name = chrono::Local::now()
            .format(SCREENSHOT_NAME_FORMAT)
            .to_string();
        let slot = self.attachments.push(Attachment::pending(file_name.clone()));
        self.pending.send_modify(|n| *n += 1);

        self.emit(AppEvent::Capture(CaptureEvent::Queued {
            slot,
            file_name,
            show_ui,
        }));

        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = jobs.get_or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            let worker = CaptureWorker {
                source: Arc::clone(&self.source),
                attachments: self.attachments.clone(),
                pending: Arc::clone(&self.pending),
                events: self.events.clone(),
            };
            runtime.spawn(worker.run(rx));
            tx
        });

        if sender.send(CaptureJob { slot, show_ui }).is_err() {
            // Worker is gone; the slot stays empty
            self.pending.send_modify(|n| *n = n.saturating_sub(1));
            return Err(CaptureError::SourceDropped.into());
        }
        Ok(slot)
    }

    /// Number of queued or running captures
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Wait until every capture queued so far has finished
    pub async fn drain(&self) {
        let mut pending = self.pending.subscribe();
        // The sender lives in `self`, so this cannot observe a closed channel
        let _ = pending.wait_for(|n| *n == 0).await;
    }
}

impl EventEmitter for CaptureQueue {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

struct CaptureWorker {
    source: Arc<dyn ScreenshotSource>,
    attachments: SharedAttachments,
    pending: Arc<watch::Sender<usize>>,
    events: Option<EventSender>,
}

impl EventEmitter for CaptureWorker {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl CaptureWorker {
    async fn run(self, mut jobs: mpsc::UnboundedReceiver<CaptureJob>) {
        while let Some(job) = jobs.recv().await {
            if let Err(e) = self.capture(&job).await {
                self.emit(AppEvent::Capture(CaptureEvent::Failed {
                    slot: job.slot,
                    failure: FailureContext::from_error(&e),
                }));
            }
            self.pending.send_modify(|n| *n = n.saturating_sub(1));
        }
    }

    async fn capture(&self, job: &CaptureJob) -> Result<(), CaptureError> {
        let (reply, frame) = oneshot::channel();
        self.source.request_capture(job.show_ui, reply);
        let frame = frame.await.map_err(|_| CaptureError::SourceDropped)?;

        self.emit(AppEvent::Capture(CaptureEvent::FrameReceived {
            slot: job.slot,
            width: frame.width,
            height: frame.height,
        }));

        let png = tokio::task::spawn_blocking(move || encode_png(frame))
            .await
            .map_err(|e| CaptureError::EncodeFailed(e.to_string()))??;
        let bytes = png.len() as u64;

        if let Some(slot) = self.attachments.lock().get_mut(job.slot) {
            slot.payload = png.into();
            slot.content_type = SCREENSHOT_CONTENT_TYPE.to_string();
        }

        self.emit(AppEvent::Capture(CaptureEvent::Encoded {
            slot: job.slot,
            bytes,
        }));
        Ok(())
    }
}

/// Encode an RGBA8 frame as PNG
///
/// # Errors
///
/// Fails when the buffer length does not match `width * height * 4` or the
/// encoder rejects the image.
pub fn encode_png(frame: PixelBuffer) -> Result<Vec<u8>, CaptureError> {
    let expected = frame.width as usize * frame.height as usize * 4;
    let actual = frame.rgba.len();
    if actual != expected {
        return Err(CaptureError::InvalidFrame { expected, actual });
    }
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.rgba)
        .ok_or(CaptureError::InvalidFrame { expected, actual })?;

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| CaptureError::EncodeFailed(e.to_string()))?;
    Ok(png)
}
