//! Integration tests for types

#[cfg(test)]
mod tests {
    use bugline_types::*;

    #[test]
    fn test_request_serialization() {
        let request = CreateReportRequest {
            content: "crash on load".into(),
            severity: Severity::High.label().map(str::to_string),
            user_email: "qa@example.com".into(),
            file_names: vec!["a.png".into(), "b.txt".into()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": "crash on load",
                "severity": "high",
                "userEmail": "qa@example.com",
                "fileNames": ["a.png", "b.txt"],
            })
        );
    }

    #[test]
    fn test_request_omits_missing_severity() {
        let request = CreateReportRequest {
            content: "x".into(),
            severity: None,
            user_email: String::new(),
            file_names: vec![],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("severity"));
    }

    #[test]
    fn test_response_with_upload_urls() {
        let body = br#"{
            "id": "r-1",
            "uploadUrls": [
                {"fileName": "b.txt", "url": "https://s3/b", "fields": {"key": "k/b", "policy": "p"}},
                {"fileName": "a.png", "url": "https://s3/a", "fields": {}}
            ]
        }"#;
        let response = CreateReportResponse::parse(body);
        let targets = response.targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].file_name, "b.txt");
        assert_eq!(targets[0].field("key"), Some("k/b"));
        assert_eq!(targets[1].url, "https://s3/a");
        assert_eq!(response.raw["id"], "r-1");
    }

    #[test]
    fn test_field_values_become_text_in_server_order() {
        let body = br#"{"uploadUrls": [{
            "fileName": "a.png",
            "url": "https://s3/a",
            "fields": {"policy": "p", "success_action_status": 201, "acl": null, "key": "k/a", "x-amz-meta-draft": false}
        }]}"#;
        let response = CreateReportResponse::parse(body);
        let target = &response.targets()[0];
        assert_eq!(
            target.fields,
            vec![
                ("policy".to_string(), "p".to_string()),
                ("success_action_status".to_string(), "201".to_string()),
                ("acl".to_string(), String::new()),
                ("key".to_string(), "k/a".to_string()),
                ("x-amz-meta-draft".to_string(), "false".to_string()),
            ]
        );
        assert!(response.rejected.is_empty());
    }

    #[test]
    fn test_malformed_target_only_drops_itself() {
        let body = br#"{"uploadUrls": [
            {"fileName": "a.png", "url": "https://s3/a", "fields": {"key": "a"}},
            {"fileName": 7, "url": "https://s3/bad"},
            {"fileName": "b.txt", "url": "https://s3/b", "fields": ["nope"]},
            {"fileName": "c.txt", "url": "https://s3/c"}
        ]}"#;
        let response = CreateReportResponse::parse(body);
        let names: Vec<&str> = response
            .targets()
            .iter()
            .map(|t| t.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.png", "c.txt"]);
        let indices: Vec<usize> = response.rejected.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 2]);
        assert!(response.targets()[1].fields.is_empty());
    }

    #[test]
    fn test_response_without_upload_urls() {
        let response = CreateReportResponse::parse(b"{}");
        assert!(response.upload_urls.is_none());
        assert!(response.targets().is_empty());
    }

    #[test]
    fn test_garbage_response_is_empty_object() {
        let response = CreateReportResponse::parse(b"<html>oops</html>");
        assert!(response.targets().is_empty());
        assert!(response.raw.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_color_choice_default() {
        assert_eq!(ColorChoice::default(), ColorChoice::Auto);
    }
}
