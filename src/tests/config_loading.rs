#[cfg(test)]
mod test {

    use std::io::Write;
    use std::time::Duration;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use crate::config::proc_loader::{expand_env_vars, file_to_config, parse_config};
    use crate::config::settings::{LogFormat, RetryConfig};
    use crate::credentials::CredentialStrategy;
    use crate::tests::common::TEST_PKCS8_PEM;
    use crate::utils::config_loader;
    use crate::utils::logging::{self, LogLevel};
    use crate::ServiceConfig;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    async fn parse(yaml: &str) -> anyhow::Result<ServiceConfig> {
        parse_config(yaml.to_owned()).await
    }

    #[tokio::test]
    async fn client_secret_config_with_defaults() {
        let cfg = parse(
            r#"
provider:
  host: https://localhost:9444/
  scope: "internal_user_mgt_view internal_user_mgt_list"
credentials:
  type: client_secret
  client_id: { value: "abc" }
  client_secret: { value: "xyz" }
"#,
        )
        .await
        .unwrap();

        assert_eq!(cfg.provider.host, "https://localhost:9444");
        assert_eq!(cfg.settings.safety_margin(), Duration::from_secs(1));
        assert!(!cfg.settings.http.insecure_skip_tls_verify);

        let logging = cfg.settings.logging.clone().unwrap();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Compact);

        let retry = RetryConfig::to_settings(&cfg.settings.retry);
        assert_eq!((retry.attempts, retry.base_delay_ms, retry.max_delay_ms), (3, 200, 1000));

        let strategy = cfg.credential_strategy().unwrap();
        assert!(matches!(strategy, CredentialStrategy::ClientSecret(_)));
        assert_eq!(strategy.client_id(), "abc");
        assert_eq!(strategy.scope(), "internal_user_mgt_view internal_user_mgt_list");

        let request = strategy.token_request().unwrap();
        assert_eq!(request.url, "https://localhost:9444/oauth2/token");
    }

    #[tokio::test]
    async fn private_key_jwt_config_reads_key_file() {
        let key_file = write_temp(TEST_PKCS8_PEM);
        let yaml = format!(
            r#"
provider:
  host: https://idp.example
  scope: read
credentials:
  type: private_key_jwt
  client_id: {{ value: "abc" }}
  private_key: {{ path: "{}" }}
  key_id: "k1"
settings:
  safety_margin_seconds: 5
  http: {{ timeout_ms: 2000, connect_timeout_ms: 500 }}
  retry: {{ attempts: 5, base_delay_ms: 10, max_delay_ms: 100 }}
  logging: {{ level: debug, format: json }}
"#,
            key_file.path().display()
        );
        let config_file = write_temp(&yaml);

        let cfg = file_to_config(config_file.path()).await.unwrap();

        assert_eq!(cfg.settings.safety_margin(), Duration::from_secs(5));
        let transport = cfg.settings.http.transport_settings();
        assert_eq!(transport.timeout, Some(Duration::from_millis(2000)));
        assert_eq!(transport.connect_timeout, Some(Duration::from_millis(500)));
        assert_eq!(RetryConfig::to_settings(&cfg.settings.retry).attempts, 5);

        let strategy = cfg.credential_strategy().unwrap();
        match &strategy {
            CredentialStrategy::PrivateKeyJwt(credentials) => {
                assert!(credentials.client_assertion().is_ok());
            }
            other => panic!("unexpected strategy {other:?}"),
        }

        let source = cfg.build_token_source().unwrap();
        assert_eq!(source.strategy().kind(), "private_key_jwt");
    }

    #[tokio::test]
    async fn unreadable_private_key_fails_strategy() {
        let cfg = parse(
            r#"
provider:
  host: https://idp.example
credentials:
  type: private_key_jwt
  client_id: { value: "abc" }
  private_key: { value: "not a pem" }
"#,
        )
        .await
        .unwrap();

        let err = cfg.credential_strategy().unwrap_err();
        assert!(format!("{err:#}").contains("loading private key"));
    }

    #[tokio::test]
    #[serial]
    async fn env_vars_are_expanded_before_parsing() {
        std::env::set_var("SCIM_TEST_HOST", "https://from-env.example");
        std::env::remove_var("SCIM_TEST_SCOPE");

        let config_file = write_temp(
            r#"
provider:
  host: ${SCIM_TEST_HOST}
  scope: ${SCIM_TEST_SCOPE:internal_user_mgt_view}
credentials:
  type: client_secret
  client_id: { value: "abc" }
  client_secret: { value: "xyz" }
"#,
        );

        let cfg = config_loader::run(&config_file.path().display().to_string())
            .await
            .unwrap();

        assert_eq!(cfg.provider.host, "https://from-env.example");
        assert_eq!(cfg.provider.scope, "internal_user_mgt_view");

        std::env::remove_var("SCIM_TEST_HOST");
    }

    #[test]
    #[serial]
    fn unset_env_var_without_default_expands_to_empty() {
        std::env::remove_var("SCIM_TEST_UNSET");
        assert_eq!(expand_env_vars("a=${SCIM_TEST_UNSET};"), "a=;");
    }

    #[tokio::test]
    #[serial]
    async fn secrets_resolve_from_environment() {
        let cfg = parse(
            r#"
provider:
  host: https://idp.example
  scope: read
credentials:
  type: client_secret
  client_id: { value: "abc" }
  client_secret: { from_env: SCIM_TEST_CLIENT_SECRET }
"#,
        )
        .await
        .unwrap();

        std::env::remove_var("SCIM_TEST_CLIENT_SECRET");
        assert!(cfg.credential_strategy().is_err());

        std::env::set_var("SCIM_TEST_CLIENT_SECRET", "xyz");
        let request = cfg.credential_strategy().unwrap().token_request().unwrap();
        assert_eq!(request.headers["authorization"], "Basic YWJjOnh5eg==");

        std::env::remove_var("SCIM_TEST_CLIENT_SECRET");
    }

    #[tokio::test]
    async fn validation_reports_every_problem() {
        let err = parse(
            r#"
provider:
  host: localhost:9444
credentials:
  type: client_secret
  client_id: { value: "" }
  client_secret: { value: "  " }
settings:
  http: { timeout_ms: 0 }
  retry: { attempts: 0, base_delay_ms: 500, max_delay_ms: 100 }
  logging: { level: loud, format: compact }
"#,
        )
        .await
        .unwrap_err()
        .to_string();

        for expected in [
            "provider.host",
            "credentials.client_id",
            "credentials.client_secret",
            "settings.http.timeout_ms",
            "settings.retry.attempts",
            "settings.retry.max_delay_ms",
            "settings.logging.level",
        ] {
            assert!(err.contains(expected), "missing '{expected}' in: {err}");
        }
    }

    #[tokio::test]
    async fn unknown_credentials_type_is_rejected() {
        let result = parse(
            r#"
provider:
  host: https://idp.example
credentials:
  type: password
  client_id: { value: "abc" }
"#,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_config_file_is_reported() {
        let err = config_loader::run("does/not/exist.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Invalid config format"));
    }

    #[tokio::test]
    async fn cli_log_level_overrides_file() {
        let cfg = parse(
            r#"
provider:
  host: https://idp.example
credentials:
  type: client_secret
  client_id: { value: "abc" }
  client_secret: { value: "xyz" }
settings:
  logging: { level: warn, format: json }
"#,
        )
        .await
        .unwrap();

        assert_eq!(logging::resolve(&cfg, None).level, "warn");
        let resolved = logging::resolve(&cfg, Some(LogLevel::TRACE));
        assert_eq!(resolved.level, "trace");
        assert_eq!(resolved.format, LogFormat::Json);
    }
}
