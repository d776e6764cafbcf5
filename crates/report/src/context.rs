//! What a submission needs from its environment

use bugline_config::{constants::CREATE_REPORT_PATH, ApiConfig};
use bugline_events::{EventEmitter, EventSender};
use bugline_net::HttpTransport;
use bugline_types::ReportId;
use std::sync::Arc;

/// Transport, endpoint and event sink for report submission
#[derive(Clone)]
pub struct ReportContext {
    pub transport: Arc<dyn HttpTransport>,
    pub base_url: String,
    pub report_token: Option<String>,
    pub events: Option<EventSender>,
}

impl ReportContext {
    pub fn new(transport: Arc<dyn HttpTransport>, api: &ApiConfig) -> Self {
        Self {
            transport,
            base_url: api.base_url.clone(),
            report_token: api.report_token().map(str::to_string),
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Token, if present and not blank
    pub(crate) fn token(&self) -> Option<&str> {
        self.report_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// `<base>/user-report/v1/create-report?token=<token>`
    pub(crate) fn create_report_url(&self, token: &str) -> Result<String, url::ParseError> {
        let endpoint = format!(
            "{}/{CREATE_REPORT_PATH}",
            self.base_url.trim_end_matches('/')
        );
        url::Url::parse_with_params(&endpoint, &[("token", token)]).map(String::from)
    }
}

impl std::fmt::Debug for ReportContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportContext")
            .field("base_url", &self.base_url)
            .field("report_token", &self.report_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// Event emitter stamping every event with one report's id
#[derive(Debug, Clone)]
pub(crate) struct ReportEvents {
    pub(crate) sender: Option<EventSender>,
    pub(crate) report_id: ReportId,
}

impl EventEmitter for ReportEvents {
    fn event_sender(&self) -> Option<&EventSender> {
        self.sender.as_ref()
    }

    fn correlation_id(&self) -> Option<String> {
        Some(self.report_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bugline_errors::Error;
    use bugline_net::{HttpRequest, HttpResponse, ProgressFn};

    struct Unused;

    #[async_trait]
    impl HttpTransport for Unused {
        async fn send(
            &self,
            _request: HttpRequest,
            _progress: Option<ProgressFn>,
        ) -> Result<HttpResponse, Error> {
            Err(Error::internal("unused"))
        }
    }

    fn context(base_url: &str, token: &str) -> ReportContext {
        let api = ApiConfig {
            base_url: base_url.to_string(),
            report_token: token.to_string(),
        };
        ReportContext::new(Arc::new(Unused), &api)
    }

    #[test]
    fn test_create_report_url() {
        let ctx = context("https://api.example.com/", "abc");
        assert_eq!(
            ctx.create_report_url("abc").unwrap(),
            "https://api.example.com/user-report/v1/create-report?token=abc"
        );
    }

    #[test]
    fn test_token_is_query_encoded() {
        let ctx = context("https://api.example.com", "a b&c");
        let url = ctx.create_report_url("a b&c").unwrap();
        assert!(url.ends_with("?token=a+b%26c"));
    }

    #[test]
    fn test_blank_token_is_missing() {
        assert_eq!(context("https://api.example.com", "  ").token(), None);
        assert_eq!(context("https://api.example.com", "t").token(), Some("t"));
    }
}
