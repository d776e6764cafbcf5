//! Integration tests for config

#[cfg(test)]
mod tests {
    use bugline_config::*;
    use bugline_types::Severity;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 5] = [
        "BUGLINE_API_URL",
        "BUGLINE_REPORT_TOKEN",
        "BUGLINE_TIMEOUT",
        "BUGLINE_SEVERITY",
        "BUGLINE_USER_EMAIL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[api]
base_url = "https://reports.example.com"
report_token = "abc123"

[network]
timeout = 60

[report]
default_severity = "high"
user_email = "qa@example.com"
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.api.base_url, "https://reports.example.com");
        assert_eq!(config.api.report_token(), Some("abc123"));
        assert_eq!(config.network.timeout, 60);
        assert_eq!(config.network.connect_timeout, 30);
        assert_eq!(config.report.default_severity, Severity::High);
        assert_eq!(config.report.user_email, "qa@example.com");
    }

    #[tokio::test]
    async fn test_missing_sections_use_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[api]\nreport_token = \"t\"").unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.api.base_url, constants::DEFAULT_API_URL);
        assert_eq!(config.report.default_severity, Severity::None);
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[api\nbase_url = ").unwrap();

        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            bugline_errors::Error::Config(bugline_errors::ConfigError::ParseError { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.report_token = "saved".into();
        config.save_to_file(&path).await.unwrap();

        let reloaded = Config::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.api.report_token(), Some("saved"));
    }

    #[test]
    fn test_blank_token_is_absent() {
        let mut config = Config::default();
        config.api.report_token = "   ".into();
        assert_eq!(config.api.report_token(), None);
        assert_eq!(config.redacted().api.report_token, "   ");

        config.api.report_token = "secret".into();
        assert_eq!(config.redacted().api.report_token, "********");
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("BUGLINE_REPORT_TOKEN", "from-env");
        std::env::set_var("BUGLINE_SEVERITY", "critical");
        std::env::set_var("BUGLINE_TIMEOUT", "12");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.api.report_token(), Some("from-env"));
        assert_eq!(config.report.default_severity, Severity::Critical);
        assert_eq!(config.network.timeout, 12);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("BUGLINE_TIMEOUT", "soon");

        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        clear_env();
    }
}
