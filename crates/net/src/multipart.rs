//! `multipart/form-data` body encoding

use bytes::Bytes;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

static BOUNDARY_SEQ: AtomicU64 = AtomicU64::new(0);

const FIELD_CONTENT_TYPE: &str = "text/plain; encoding=utf8";

/// The file part of a multipart body
#[derive(Debug, Clone, Copy)]
pub struct FilePart<'a> {
    /// Form field name, `file` for upload targets
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub payload: &'a [u8],
}

/// An encoded multipart body and the boundary separating its parts
#[derive(Debug, Clone)]
pub struct MultipartBody {
    body: Bytes,
    boundary: String,
}

impl MultipartBody {
    /// Encode `fields` as text parts followed by the file part
    ///
    /// Every part is introduced by `\r\n--<boundary>\r\n` and the body is
    /// closed by `\r\n--<boundary>--\r\n`. The payload is copied verbatim.
    /// Field and file names have `"`, CR and LF percent-encoded so they
    /// cannot end their quoted header value early.
    #[must_use]
    pub fn encode<'a, I>(file: FilePart<'_>, fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let boundary = generate_boundary();
        let delimiter = format!("\r\n--{boundary}\r\n");

        let mut body = Vec::with_capacity(file.payload.len() + 256);
        for (name, value) in fields {
            body.extend_from_slice(delimiter.as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\
                     Content-Type: {FIELD_CONTENT_TYPE}\r\n\r\n",
                    escape_quoted(name)
                )
                .as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
        }

        body.extend_from_slice(delimiter.as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: {}\r\n\r\n",
                escape_quoted(file.field),
                escape_quoted(file.file_name),
                file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.payload);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Self {
            body: Bytes::from(body),
            boundary,
        }
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.body
    }
}

/// Percent-encode the characters that would break a quoted header value
fn escape_quoted(value: &str) -> Cow<'_, str> {
    if !value.contains(['"', '\r', '\n']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("%22"),
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

// Nanosecond timestamp plus a process-wide sequence, so calls within the same
// clock tick still get distinct boundaries.
fn generate_boundary() -> String {
    let now = chrono::Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));
    let seq = BOUNDARY_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("bugline-{nanos:x}-{seq:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn file<'a>(payload: &'a [u8]) -> FilePart<'a> {
        FilePart {
            field: "file",
            file_name: "log.txt",
            content_type: "text/plain",
            payload,
        }
    }

    fn part_count(body: &MultipartBody) -> usize {
        let delimiter = format!("\r\n--{}\r\n", body.boundary());
        body.bytes()
            .windows(delimiter.len())
            .filter(|w| *w == delimiter.as_bytes())
            .count()
    }

    #[test]
    fn test_layout() {
        let body = MultipartBody::encode(file(b"hello"), [("key", "uploads/log.txt")]);
        let b = body.boundary().to_string();
        let expected = format!(
            "\r\n--{b}\r\n\
             Content-Disposition: form-data; name=\"key\"\r\n\
             Content-Type: text/plain; encoding=utf8\r\n\r\n\
             uploads/log.txt\
             \r\n--{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"log.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             hello\
             \r\n--{b}--\r\n"
        );
        assert_eq!(body.bytes().as_ref(), expected.as_bytes());
        assert_eq!(
            body.content_type(),
            format!("multipart/form-data; boundary={b}")
        );
    }

    #[test]
    fn test_utf8_payload_round_trips() {
        let text = "JBhMAMLMUNLs6uy5cw7iWBoXo3SFI5SP狗ジャパニーズ";
        let body = MultipartBody::encode(file(text.as_bytes()), std::iter::empty());
        let terminator = format!("\r\n--{}--\r\n", body.boundary());

        let bytes = body.bytes();
        let start = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|p| p + 4)
            .unwrap();
        let end = bytes.len() - terminator.len();
        assert_eq!(std::str::from_utf8(&bytes[start..end]).unwrap(), text);
    }

    #[test]
    fn test_names_cannot_break_headers() {
        let payload = b"x";
        let body = MultipartBody::encode(
            FilePart {
                field: "file",
                file_name: "evil\"; name=\"other\r\nX-Injected: 1.txt",
                content_type: "text/plain",
                payload,
            },
            [("a\"b", "v")],
        );
        let text = String::from_utf8_lossy(body.bytes());

        assert!(text.contains("name=\"a%22b\"\r\n"));
        assert!(text.contains(
            "filename=\"evil%22; name=%22other%0D%0AX-Injected: 1.txt\"\r\n"
        ));
        assert!(!text.contains("\r\nX-Injected"));
        assert_eq!(part_count(&body), 2);
    }

    #[test]
    fn test_plain_names_are_untouched() {
        assert!(matches!(escape_quoted("2024-01-01 10-00-00.png"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_boundaries_are_unique() {
        let a = MultipartBody::encode(file(b""), std::iter::empty());
        let b = MultipartBody::encode(file(b""), std::iter::empty());
        assert_ne!(a.boundary(), b.boundary());
    }

    proptest! {
        #[test]
        fn prop_one_part_per_field_plus_file(
            fields in proptest::collection::btree_map("[a-zA-Z0-9_-]{1,12}", "[ -~]{0,40}", 0..6),
            payload in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let body = MultipartBody::encode(
                file(&payload),
                fields.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            );
            prop_assert_eq!(part_count(&body), fields.len() + 1);

            let terminator = format!("\r\n--{}--\r\n", body.boundary());
            prop_assert!(body.bytes().ends_with(terminator.as_bytes()));

            let tail = &body.bytes()[body.len() - terminator.len() - payload.len()..body.len() - terminator.len()];
            prop_assert_eq!(tail, payload.as_slice());
        }
    }
}
