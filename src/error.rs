//! Error types for crashreport-ingest
//!
//! This module provides the error taxonomy for the ingest pipeline:
//! - Request errors raised while inspecting the upload headers
//! - Extraction errors raised while decompressing, decoding and writing a report
//! - Cursor errors raised by bounds-checked reads over the decompressed buffer
//! - HTTP status and machine-readable code mapping for the API layer and logs

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for crashreport-ingest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for crashreport-ingest
///
/// Every variant aborts the current request only. None of them is fatal to the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "save_dir")
        key: Option<String>,
    },

    /// The upload headers were rejected
    #[error("request rejected: {0}")]
    Request(#[from] RequestError),

    /// The report body could not be extracted
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Errors raised while validating the request headers, before the body is touched
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The client identifier header is missing or lacks the required prefix
    #[error("client identifier is missing or does not carry the expected prefix")]
    InvalidClientIdentifier,

    /// The file-count header is absent
    #[error("file-count header is missing")]
    MissingFileCountHeader,

    /// The file-count header is not a positive decimal integer
    #[error("invalid file count {value:?}")]
    InvalidFileCount {
        /// The raw header value that failed to parse
        value: String,
    },

    /// The session header is present but not valid UTF-8
    #[error("session identifier {value:?} is not valid UTF-8")]
    InvalidSessionId {
        /// The raw header value, lossily decoded
        value: String,
    },

    /// The request body could not be read from the connection
    #[error("failed to read request body: {reason}")]
    BodyRead {
        /// The underlying transport error
        reason: String,
    },
}

/// Bounds violation while reading the decompressed buffer
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CursorError {
    /// A read would run past the end of the buffer
    #[error("read of {requested} bytes at offset {offset} exceeds the {remaining} bytes remaining")]
    OutOfBounds {
        /// Cursor offset at which the read was attempted
        offset: usize,
        /// Number of bytes the read asked for
        requested: usize,
        /// Number of bytes left in the buffer
        remaining: usize,
    },
}

/// Errors raised by the extraction pipeline
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The caller asked for zero files
    #[error("expected file count must be at least 1")]
    InvalidFileCount,

    /// The body is not a valid gzip stream
    #[error("failed to decompress payload: {reason}")]
    DecompressionFailure {
        /// The reason decompression failed
        reason: String,
    },

    /// The decompressed payload grew past the configured ceiling
    #[error("decompressed payload exceeds the {limit} byte limit")]
    PayloadTooLarge {
        /// The configured limit in bytes
        limit: u64,
    },

    /// Decompression produced no bytes
    #[error("decompressed payload is empty")]
    EmptyPayload,

    /// One of the fixed header fields ran past the end of the buffer
    #[error("malformed manifest while reading {field}: {source}")]
    MalformedManifest {
        /// The manifest field being decoded
        field: &'static str,
        /// The underlying bounds violation
        source: CursorError,
    },

    /// A file record ran past the end of the buffer
    #[error("file record {record} is truncated: {source}")]
    TruncatedEntry {
        /// Zero-based number of the record being decoded
        record: u32,
        /// The underlying bounds violation
        source: CursorError,
    },

    /// A path component would escape the save directory
    #[error("unsafe path component {component:?}: {reason}")]
    UnsafePath {
        /// The offending component (lossily decoded)
        component: String,
        /// Why the component was rejected
        reason: &'static str,
    },

    /// The extraction directory could not be created
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// A file could not be opened or written
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// The file that could not be written
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The blocking extraction task did not complete
    #[error("extraction worker failed: {reason}")]
    WorkerFailed {
        /// The reason the worker failed (panic, cancellation)
        reason: String,
    },
}

/// Convert errors to HTTP status codes for API responses
///
/// The response body is always empty; the code returned by `error_code` is for logs.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 403 Forbidden - not our crash reporter
            Error::Request(RequestError::InvalidClientIdentifier) => 403,

            // 422 - the session cannot become a path component
            Error::Request(RequestError::InvalidSessionId { .. }) => 422,

            // 400 Bad Request - unusable headers or configuration
            Error::Request(_) => 400,
            Error::Config { .. } => 400,
            Error::Extract(ExtractError::InvalidFileCount) => 400,

            // 413 Payload Too Large
            Error::Extract(ExtractError::PayloadTooLarge { .. }) => 413,

            // 422 Unprocessable Entity - body could not be decoded safely
            Error::Extract(ExtractError::DecompressionFailure { .. }) => 422,
            Error::Extract(ExtractError::EmptyPayload) => 422,
            Error::Extract(ExtractError::MalformedManifest { .. }) => 422,
            Error::Extract(ExtractError::TruncatedEntry { .. }) => 422,
            Error::Extract(ExtractError::UnsafePath { .. }) => 422,

            // 500 Internal Server Error - server-side issues
            Error::Extract(ExtractError::CreateDirectory { .. }) => 500,
            Error::Extract(ExtractError::WriteFile { .. }) => 500,
            Error::Extract(ExtractError::WorkerFailed { .. }) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Request(e) => match e {
                RequestError::InvalidClientIdentifier => "invalid_client_identifier",
                RequestError::MissingFileCountHeader => "missing_file_count_header",
                RequestError::InvalidFileCount { .. } => "invalid_file_count",
                RequestError::InvalidSessionId { .. } => "invalid_session_id",
                RequestError::BodyRead { .. } => "body_read_failed",
            },
            Error::Extract(e) => match e {
                ExtractError::InvalidFileCount => "invalid_file_count",
                ExtractError::DecompressionFailure { .. } => "decompression_failure",
                ExtractError::PayloadTooLarge { .. } => "payload_too_large",
                ExtractError::EmptyPayload => "empty_payload",
                ExtractError::MalformedManifest { .. } => "malformed_manifest",
                ExtractError::TruncatedEntry { .. } => "truncated_entry",
                ExtractError::UnsafePath { .. } => "unsafe_path",
                ExtractError::CreateDirectory { .. } => "io_error",
                ExtractError::WriteFile { .. } => "io_error",
                ExtractError::WorkerFailed { .. } => "worker_failed",
            },
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}
