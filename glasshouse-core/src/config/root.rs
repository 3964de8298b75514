use serde::Deserialize;

use super::telemetry::{LoggingConfig, TelemetryConfig};
use super::timeout::TimeoutConfig;
use super::tls::{ClientAuth, SessionResumptionConfig, TlsConfig, TlsOptions};

/// Main configuration document, one-to-one with spec.md §6 "Configuration".
///
/// Loaded from a single JSON document, per spec.md §6 ("A single document
/// (JSON) with recognised options") — the loader (teacher-style:
/// `config/loader.rs`) parses with `serde_json` rather than any other
/// format, and validates eagerly at startup; a configuration error is
/// fatal per spec.md §7.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TLS listen port. Default "443".
    #[serde(default = "default_tls_port")]
    pub tls_port: String,
    /// Plain-HTTP listen port; every request on this port is redirected to
    /// `http_redirect`. Default "80".
    #[serde(default = "default_http_port")]
    pub http_port: String,
    /// Bind address, e.g. "0.0.0.0".
    #[serde(default = "default_host")]
    pub host: String,
    /// Path to the TLS certificate chain (PEM).
    pub cert_file: String,
    /// Path to the TLS private key (PEM).
    pub key_file: String,
    /// URL the plain-HTTP listener redirects to.
    #[serde(default = "default_http_redirect")]
    pub http_redirect: String,
    /// Enable write-through to the analytics sink.
    #[serde(default)]
    pub log_to_db: bool,
    /// Analytics sink connection details (only consulted when `log_to_db`).
    #[serde(flatten)]
    pub analytics: AnalyticsConfig,
    /// Packet-capture interface name. Empty disables capture.
    ///
    /// Accepted for configuration-schema completeness (spec.md §6); this
    /// build has no packet-capture backend wired to it — see DESIGN.md.
    #[serde(default)]
    pub device: String,
    /// Header name whose presence on a request flags it as an "admin"
    /// request, triggering `access-control-allow-*: *` on the response.
    #[serde(default = "default_cors_key")]
    pub cors_key: String,
    /// Ambient logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Ambient timeout configuration (idle timers, body deadlines).
    #[serde(default)]
    pub timeout: TimeoutConfig,
    /// Ambient telemetry configuration (metrics port, health checks).
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Analytics (document-store) connection configuration.
///
/// Mirrors spec.md §6 exactly: `mongo_url`, `mongo_database`,
/// `mongo_collection`, `mongo_log_ips`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub mongo_url: Option<String>,
    #[serde(default)]
    pub mongo_database: Option<String>,
    #[serde(default)]
    pub mongo_collection: Option<String>,
    /// When true, the client IP (without the trailing port) is recorded
    /// alongside each analytics record.
    #[serde(default)]
    pub mongo_log_ips: bool,
}

fn default_tls_port() -> String {
    "443".to_string()
}

fn default_http_port() -> String {
    "80".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_redirect() -> String {
    "https://localhost".to_string()
}

fn default_cors_key() -> String {
    "x-api-key".to_string()
}

impl Config {
    /// Builds the ambient `TlsConfig` (certificate reloader, ALPN, cipher
    /// policy) from the flat `cert_file`/`key_file` keys spec.md §6 names.
    pub fn tls_config(&self) -> TlsConfig {
        TlsConfig {
            cert_path: self.cert_file.clone(),
            key_path: self.key_file.clone(),
            alpn: vec!["h2".to_string(), "http/1.1".to_string()],
            watch_delay_secs: 60,
            options: TlsOptions::default(),
            client_auth: ClientAuth::default(),
            session_resumption: SessionResumptionConfig::default(),
        }
    }
}
