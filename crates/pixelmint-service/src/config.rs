//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/pixelmint").
    pub data_dir: String,

    /// Identity provider base URL (token exchange + JWT issuer).
    pub auth_issuer_url: String,

    /// Expected JWT audience (default: "pixelmint").
    pub auth_audience: String,

    /// RSA public key (PEM) for validating identity-provider JWTs.
    pub auth_public_key_pem: Option<String>,

    /// Accept `test-token:<user-id>` bearer tokens. Integration-test only;
    /// never enable in production.
    pub allow_test_tokens: bool,

    /// Payment provider secret API key (optional).
    pub payment_api_key: Option<String>,

    /// Payment provider webhook signing secret (optional).
    pub payment_webhook_secret: Option<String>,

    /// Payment provider API base URL (overridable for tests).
    pub payment_api_url: Option<String>,

    /// Generation provider API base URL (optional).
    pub generation_api_url: Option<String>,

    /// Generation provider access token (optional).
    pub generation_api_token: Option<String>,

    /// Canonical application URL, used for checkout redirects and the
    /// auth-callback destination.
    pub app_url: String,

    /// Shared parent domain for session cookies (e.g. ".pixelmint.app").
    pub cookie_domain: String,

    /// Shared session cookie key written by the auth callback.
    pub session_cookie_name: String,

    /// The identity provider's native cookie key, preferred on read.
    pub provider_cookie_name: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Payment provider secrets file structure.
#[derive(Debug, Deserialize)]
struct PaymentSecrets {
    api_key: String,
    #[serde(default)]
    webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let (payment_api_key, payment_webhook_secret) = load_payment_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/pixelmint".into()),
            auth_issuer_url: std::env::var("AUTH_ISSUER_URL")
                .unwrap_or_else(|_| "https://auth.pixelmint.app".into()),
            auth_audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "pixelmint".into()),
            auth_public_key_pem: std::env::var("AUTH_PUBLIC_KEY_PEM").ok(),
            allow_test_tokens: std::env::var("ALLOW_TEST_TOKENS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            payment_api_key,
            payment_webhook_secret,
            payment_api_url: std::env::var("PAYMENT_API_URL").ok(),
            generation_api_url: std::env::var("GENERATION_API_URL").ok(),
            generation_api_token: std::env::var("GENERATION_API_TOKEN").ok(),
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".into()),
            cookie_domain: std::env::var("COOKIE_DOMAIN")
                .unwrap_or_else(|_| ".pixelmint.app".into()),
            session_cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "pm-session".into()),
            provider_cookie_name: std::env::var("PROVIDER_COOKIE_NAME")
                .unwrap_or_else(|_| "idp-auth-token".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Load payment provider secrets from file or environment.
fn load_payment_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/payments.json",
        "pixelmint/.secrets/payments.json",
        "../.secrets/payments.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<PaymentSecrets>(path) {
            tracing::info!(path = %path, "Loaded payment provider secrets from file");
            return (Some(secrets.api_key), secrets.webhook_secret);
        }
    }

    tracing::debug!("Payment secrets file not found, using environment variables");
    (
        std::env::var("PAYMENT_API_KEY").ok(),
        std::env::var("PAYMENT_WEBHOOK_SECRET").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/pixelmint".into(),
            auth_issuer_url: "https://auth.pixelmint.app".into(),
            auth_audience: "pixelmint".into(),
            auth_public_key_pem: None,
            allow_test_tokens: false,
            payment_api_key: None,
            payment_webhook_secret: None,
            payment_api_url: None,
            generation_api_url: None,
            generation_api_token: None,
            app_url: "http://localhost:3000".into(),
            cookie_domain: ".pixelmint.app".into(),
            session_cookie_name: "pm-session".into(),
            provider_cookie_name: "idp-auth-token".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
