//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use bugline_errors::{Error, NetworkError};
    use bugline_net::*;
    use httpmock::prelude::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_post_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/user-report/v1/create-report")
                .query_param("token", "abc")
                .header("content-type", "application/json")
                .body(r#"{"content":"x"}"#);
            then.status(200).body(r#"{"uploadUrls":[]}"#);
        });

        let client = NetClient::with_defaults().unwrap();
        let request = HttpRequest::json(
            server.url("/user-report/v1/create-report?token=abc"),
            r#"{"content":"x"}"#,
        );
        let response = client.send(request, None).await.unwrap();

        mock.assert();
        assert!(response.is_success());
        assert_eq!(response.body.as_ref(), br#"{"uploadUrls":[]}"#);
    }

    #[tokio::test]
    async fn test_multipart_upload_reports_progress() {
        let server = MockServer::start();
        let payload = vec![7u8; UPLOAD_CHUNK_SIZE * 3 + 5];
        let body = MultipartBody::encode(
            FilePart {
                field: "file",
                file_name: "dump.bin",
                content_type: "application/octet-stream",
                payload: &payload,
            },
            [("key", "reports/dump.bin")],
        );
        let expected_len = body.len() as u64;
        let content_type = body.content_type();

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/upload")
                .header("content-type", content_type.as_str());
            then.status(204);
        });

        let last = Arc::new(AtomicU64::new(0));
        let ticks = Arc::new(AtomicU64::new(0));
        let progress: ProgressFn = {
            let last = Arc::clone(&last);
            let ticks = Arc::clone(&ticks);
            Arc::new(move |sent| {
                assert!(sent >= last.load(Ordering::SeqCst));
                last.store(sent, Ordering::SeqCst);
                ticks.fetch_add(1, Ordering::SeqCst);
            })
        };

        let client = NetClient::with_defaults().unwrap();
        let response = client
            .send(HttpRequest::multipart(server.url("/upload"), body), Some(progress))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(response.status, 204);
        assert_eq!(last.load(Ordering::SeqCst), expected_len);
        assert!(ticks.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/fail");
            then.status(403).body("denied");
        });

        let client = NetClient::with_defaults().unwrap();
        let response = client
            .send(HttpRequest::json(server.url("/fail"), "{}"), None)
            .await
            .unwrap();

        assert_eq!(response.status, 403);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = NetClient::with_defaults().unwrap();
        let err = client
            .send(HttpRequest::json("::nope::", "{}"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(NetworkError::InvalidUrl(_))));
    }
}
