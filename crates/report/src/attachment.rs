//! Files attached to a report

use bytes::Bytes;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One file to upload once the report service hands out a target for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    /// Raw bytes, empty while a screenshot is still being captured
    pub payload: Bytes,
    pub content_type: String,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        payload: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            payload: payload.into(),
            content_type: content_type.into(),
        }
    }

    /// UTF-8 text sent as `text/plain`
    pub fn text(file_name: impl Into<String>, contents: &str) -> Self {
        Self::new(
            file_name,
            Bytes::copy_from_slice(contents.as_bytes()),
            "text/plain",
        )
    }

    /// Placeholder for a screenshot whose bytes arrive later
    pub(crate) fn pending(file_name: impl Into<String>) -> Self {
        Self::new(file_name, Bytes::new(), String::new())
    }
}

/// Attachment list shared between the report owner and the capture worker
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedAttachments(Arc<Mutex<Vec<Attachment>>>);

impl SharedAttachments {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<Attachment>> {
        // Writers only push or replace whole fields, so a poisoned list is still consistent
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append and return the new slot index
    pub(crate) fn push(&self, attachment: Attachment) -> usize {
        let mut attachments = self.lock();
        attachments.push(attachment);
        attachments.len() - 1
    }

    /// First attachment with this name
    pub(crate) fn find(&self, file_name: &str) -> Option<Attachment> {
        self.lock()
            .iter()
            .find(|a| a.file_name == file_name)
            .cloned()
    }

    pub(crate) fn file_names(&self) -> Vec<String> {
        self.lock().iter().map(|a| a.file_name.clone()).collect()
    }

    pub(crate) fn snapshot(&self) -> Vec<Attachment> {
        self.lock().clone()
    }
}
