use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Level;
use uuid::Uuid;

/// Metadata attached to every emitted event.
///
/// Submission events carry the report id as their correlation id so that the
/// state, upload, capture and progress streams of one report can be stitched
/// back together downstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    /// Unique identifier for this specific event.
    pub event_id: Uuid,
    /// Report the event belongs to, when there is one.
    pub correlation_id: Option<String>,
    /// Timestamp captured at emission time.
    pub timestamp: DateTime<Utc>,
    /// Severity used for routing to the log sink.
    pub level: EventLevel,
    /// Subsystem that originated the event.
    pub source: EventSource,
    /// Small free-form labels (file name, target url, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl EventMeta {
    #[must_use]
    pub fn new(level: impl Into<EventLevel>, source: impl Into<EventSource>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            correlation_id: None,
            timestamp: Utc::now(),
            level: level.into(),
            source: source.into(),
            labels: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Convert the metadata level into a tracing level for downstream logging.
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        self.level.into()
    }
}

/// Lightweight severity levels used by the event system.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<EventLevel> for Level {
    fn from(level: EventLevel) -> Self {
        match level {
            EventLevel::Trace => Level::TRACE,
            EventLevel::Debug => Level::DEBUG,
            EventLevel::Info => Level::INFO,
            EventLevel::Warn => Level::WARN,
            EventLevel::Error => Level::ERROR,
        }
    }
}

impl From<Level> for EventLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::TRACE => EventLevel::Trace,
            Level::DEBUG => EventLevel::Debug,
            Level::INFO => EventLevel::Info,
            Level::WARN => EventLevel::Warn,
            Level::ERROR => EventLevel::Error,
        }
    }
}

/// Component that originated the event.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventSource(Cow<'static, str>);

impl EventSource {
    pub const GENERAL: Self = Self::const_str("general");
    pub const REPORT: Self = Self::const_str("report");
    pub const UPLOAD: Self = Self::const_str("upload");
    pub const CAPTURE: Self = Self::const_str("capture");
    pub const PROGRESS: Self = Self::const_str("progress");

    const fn const_str(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EventSource {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for EventSource {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
