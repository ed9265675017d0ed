//! Configuration types for crashreport-ingest

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf};

/// HTTP listener configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:12345)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Path the crash reporter posts to (default: "/crashreport")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Maximum accepted request body in bytes (default: 64 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Serve `save_dir` read-only on every other GET path (default: false)
    ///
    /// Anyone who can reach the listener can then download every stored report.
    #[serde(default)]
    pub serve_reports: bool,

    /// Emit a tracing span per HTTP request (default: true)
    #[serde(default = "default_true")]
    pub request_log: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            endpoint: default_endpoint(),
            max_body_bytes: default_max_body_bytes(),
            serve_reports: false,
            request_log: true,
        }
    }
}

/// Report ingestion settings (storage location, header names, limits)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Base directory receiving one sub-directory per report (default: "/home/crashreports/")
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Required prefix of the client identifier header (default: "CrashReportClient")
    #[serde(default = "default_client_prefix")]
    pub client_prefix: String,

    /// Header carrying the client identifier (default: "User-Agent")
    #[serde(default = "default_client_header")]
    pub client_header: String,

    /// Header carrying the authoritative file count (default: "NumberOfFiles")
    #[serde(default = "default_file_count_header")]
    pub file_count_header: String,

    /// Optional header carrying the session identifier (default: "SteamName")
    #[serde(default = "default_session_header")]
    pub session_header: String,

    /// Ceiling on the decompressed payload size in bytes (default: 256 MiB)
    #[serde(default = "default_max_decompressed_bytes")]
    pub max_decompressed_bytes: u64,

    /// Maximum number of reports extracted at the same time (default: 4)
    #[serde(default = "default_max_concurrent_extractions")]
    pub max_concurrent_extractions: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            client_prefix: default_client_prefix(),
            client_header: default_client_header(),
            file_count_header: default_file_count_header(),
            session_header: default_session_header(),
            max_decompressed_bytes: default_max_decompressed_bytes(),
            max_concurrent_extractions: default_max_concurrent_extractions(),
        }
    }
}

/// Main configuration
///
/// Built once at startup and shared read-only (usually as `Arc<Config>`).
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Config {
    /// Load a JSON configuration file, filling omitted fields with defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Base directory for extracted reports
    pub fn save_dir(&self) -> &PathBuf {
        &self.ingest.save_dir
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: &str| Error::Config {
            message: message.to_string(),
            key: Some(key.to_string()),
        };

        if !self.server.endpoint.starts_with('/') {
            return Err(invalid(
                "server.endpoint",
                "endpoint must be an absolute path starting with '/'",
            ));
        }
        if self.server.endpoint == "/health" {
            return Err(invalid(
                "server.endpoint",
                "endpoint must not shadow the /health route",
            ));
        }
        if self.server.max_body_bytes == 0 {
            return Err(invalid(
                "server.max_body_bytes",
                "body limit must be greater than zero",
            ));
        }
        if self.ingest.client_prefix.is_empty() {
            return Err(invalid(
                "ingest.client_prefix",
                "client prefix must not be empty",
            ));
        }
        for (key, name) in [
            ("ingest.client_header", &self.ingest.client_header),
            ("ingest.file_count_header", &self.ingest.file_count_header),
            ("ingest.session_header", &self.ingest.session_header),
        ] {
            if axum::http::HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(invalid(key, "not a valid HTTP header name"));
            }
        }
        if self.ingest.max_decompressed_bytes == 0 {
            return Err(invalid(
                "ingest.max_decompressed_bytes",
                "decompressed size limit must be greater than zero",
            ));
        }
        if self.ingest.max_concurrent_extractions == 0 {
            return Err(invalid(
                "ingest.max_concurrent_extractions",
                "at least one concurrent extraction is required",
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 12345))
}

fn default_endpoint() -> String {
    "/crashreport".into()
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("/home/crashreports/")
}

fn default_client_prefix() -> String {
    "CrashReportClient".into()
}

fn default_client_header() -> String {
    "User-Agent".into()
}

fn default_file_count_header() -> String {
    "NumberOfFiles".into()
}

fn default_session_header() -> String {
    "SteamName".into()
}

fn default_max_decompressed_bytes() -> u64 {
    256 * 1024 * 1024
}

fn default_max_concurrent_extractions() -> usize {
    4
}
