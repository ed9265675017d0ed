//! # crashreport-ingest
//!
//! Ingest server for crash-report archives uploaded by game crash reporters.
//!
//! A crash reporter POSTs a gzip-compressed container holding a directory name and a
//! number of embedded files. The server checks the client identifier and the announced
//! file count, decompresses the body, decodes the container with bounds-checked reads,
//! and writes each file to `<save_dir>/[<session>__]<directory>/<file>`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use crashreport_ingest::{Config, shutdown_signal};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.ingest.save_dir = "./crashreports".into();
//!     config.validate()?;
//!
//!     crashreport_ingest::api::start_api_server(Arc::new(config), shutdown_signal()).await?;
//!     Ok(())
//! }
//! ```
//!
//! The pipeline is also usable without HTTP:
//!
//! ```no_run
//! use crashreport_ingest::extraction::{Extractor, GzipDecompressor};
//! use std::sync::Arc;
//!
//! # fn example(body: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = Extractor::new("/srv/crashreports", Arc::new(GzipDecompressor::new(1 << 28)), 4);
//! let report = extractor.extract(body, 2, "")?;
//! println!("wrote {} files to {}", report.files.len(), report.directory.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP server
pub mod api;
/// Configuration types
pub mod config;
/// Binary container decoding
pub mod container;
/// Error types
pub mod error;
/// Report extraction pipeline
pub mod extraction;
/// Header-derived request fields
pub mod request;

// Re-export commonly used types
pub use config::{Config, IngestConfig, ServerConfig};
pub use error::{CursorError, Error, ExtractError, RequestError, Result, ToHttpStatus};
pub use extraction::{ExtractionReport, Extractor};
pub use request::{ReportHeaders, parse_file_count};

/// Resolve once the process is asked to stop (Ctrl+C, or SIGTERM on unix)
///
/// Pass it as the shutdown future of [`api::start_api_server`]. A signal source that
/// cannot be registered is logged and ignored, so the other one still works.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::info!("interrupt received, draining uploads before exit"),
        _ = terminate => tracing::info!("SIGTERM received, draining uploads before exit"),
    }
}
