//! Sequential attachment uploads

use crate::attachment::{Attachment, SharedAttachments};
use crate::capture::CaptureQueue;
use crate::context::ReportEvents;
use crate::progress::{ByteCounters, ProgressReporter};
use bugline_events::{AppEvent, EventEmitter, UploadEvent};
use bugline_net::{FilePart, HttpRequest, HttpTransport, MultipartBody, ProgressFn};
use bugline_types::UploadTarget;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Form field carrying the file itself
const FILE_FIELD: &str = "file";

/// Form field the storage provider reads the attachment's type from
const CONTENT_TYPE_FIELD: &str = "Content-Type";

/// What happened to the uploads of one report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Requests that completed with a 2xx status
    pub uploaded: usize,
    /// Requests that errored or returned a status of 300 or above
    pub failed: usize,
    /// Targets with no attachment of the same name
    pub unmatched: usize,
}

pub(crate) struct UploadPipeline<'a> {
    pub(crate) transport: &'a dyn HttpTransport,
    pub(crate) attachments: &'a SharedAttachments,
    pub(crate) captures: Option<&'a CaptureQueue>,
    pub(crate) progress: &'a ProgressReporter,
    pub(crate) events: &'a ReportEvents,
    pub(crate) cancel: &'a watch::Receiver<bool>,
}

impl UploadPipeline<'_> {
    /// Upload the first attachment named by each target, in target order
    ///
    /// Outstanding screenshot captures are awaited first. One request at a time; each body is built only after the previous
    /// upload finished. Per-file failures are reported as events and do not
    /// stop the remaining uploads.
    pub(crate) async fn run(
        &self,
        targets: &[UploadTarget],
        counters: &mut ByteCounters,
    ) -> UploadSummary {
        // Screenshots must be settled even when nothing will be uploaded
        if let Some(captures) = self.captures {
            captures.drain().await;
        }

        let mut summary = UploadSummary::default();
        if targets.is_empty() {
            return summary;
        }

        let mut requested = HashSet::new();
        for target in targets {
            if *self.cancel.borrow() {
                break;
            }
            requested.insert(target.file_name.as_str());

            let Some(attachment) = self.attachments.find(&target.file_name) else {
                summary.unmatched += 1;
                self.events.emit(AppEvent::Upload(UploadEvent::TargetUnmatched {
                    report_id: self.events.report_id,
                    file_name: target.file_name.clone(),
                }));
                continue;
            };

            if self.upload(target, &attachment, counters).await {
                summary.uploaded += 1;
            } else {
                summary.failed += 1;
            }
        }

        for attachment in self.attachments.snapshot() {
            if !requested.contains(attachment.file_name.as_str()) {
                self.events.emit_debug(format!(
                    "no upload target for attachment '{}'",
                    attachment.file_name
                ));
            }
        }

        summary
    }

    async fn upload(
        &self,
        target: &UploadTarget,
        attachment: &Attachment,
        counters: &mut ByteCounters,
    ) -> bool {
        let body = build_body(target, attachment);
        let body_bytes = body.len() as u64;

        counters.plan(body_bytes);
        self.progress.report(*counters);

        self.events.emit(AppEvent::Upload(UploadEvent::Started {
            report_id: self.events.report_id,
            file_name: target.file_name.clone(),
            url: target.url.clone(),
            body_bytes,
        }));

        let sent_before = counters.sent();
        let planned = counters.planned();
        let reporter = self.progress.clone();
        let on_progress: ProgressFn =
            Arc::new(move |sent| reporter.report_bytes(sent_before + sent, planned));

        let result = self
            .transport
            .send(HttpRequest::multipart(&target.url, body), Some(on_progress))
            .await;

        counters.acknowledge(body_bytes);
        self.progress.report(*counters);

        let report_id = self.events.report_id;
        let file_name = target.file_name.clone();
        match result {
            Ok(response) if response.status < 300 => {
                self.events.emit(AppEvent::Upload(UploadEvent::Completed {
                    report_id,
                    file_name,
                    status: response.status,
                }));
                true
            }
            Ok(response) => {
                self.events.emit(AppEvent::Upload(UploadEvent::Rejected {
                    report_id,
                    file_name,
                    status: response.status,
                    body: String::from_utf8_lossy(&response.body).into_owned(),
                }));
                false
            }
            Err(e) => {
                self.events.emit(AppEvent::Upload(UploadEvent::Errored {
                    report_id,
                    file_name,
                    error: e.to_string(),
                }));
                false
            }
        }
    }
}

/// Target fields in order, then the attachment's content type
///
/// A `Content-Type` field sent by the server is replaced by the attachment's.
pub(crate) fn build_body(target: &UploadTarget, attachment: &Attachment) -> MultipartBody {
    let fields = target
        .fields
        .iter()
        .filter(|(name, _)| name.as_str() != CONTENT_TYPE_FIELD)
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .chain(std::iter::once((
            CONTENT_TYPE_FIELD,
            attachment.content_type.as_str(),
        )));

    MultipartBody::encode(
        FilePart {
            field: FILE_FIELD,
            file_name: &attachment.file_name,
            content_type: &attachment.content_type,
            payload: &attachment.payload,
        },
        fields,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_injects_content_type_last() {
        let target = UploadTarget {
            file_name: "a.png".into(),
            url: "https://uploads.example.com".into(),
            fields: vec![
                ("key".to_string(), "reports/a.png".to_string()),
                ("Content-Type".to_string(), "application/octet-stream".to_string()),
                ("policy".to_string(), "p".to_string()),
            ],
        };
        let attachment = Attachment::new("a.png", vec![1, 2, 3], "image/png");

        let body = build_body(&target, &attachment);
        let text = String::from_utf8_lossy(body.bytes());

        let key = text.find("name=\"key\"").unwrap();
        let policy = text.find("name=\"policy\"").unwrap();
        let content_type = text.find("name=\"Content-Type\"").unwrap();
        let file = text.find("name=\"file\"; filename=\"a.png\"").unwrap();
        assert!(key < policy && policy < content_type && content_type < file);
        assert_eq!(text.matches("name=\"Content-Type\"").count(), 1);
        assert!(!text.contains("application/octet-stream"));
    }
}
