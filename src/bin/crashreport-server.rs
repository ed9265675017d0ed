//! Crash report ingest server
//!
//! ```text
//! crashreport-server --config /etc/crashreport.json
//! crashreport-server --bind 0.0.0.0:12345 --save-dir /home/crashreports/
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `crashreport_ingest=info,tower_http=info`).

use clap::Parser;
use crashreport_ingest::{Config, shutdown_signal};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Receive crash reports over HTTP and store their files on disk
#[derive(Debug, Parser)]
#[command(name = "crashreport-server", version, about)]
struct Cli {
    /// JSON configuration file; omitted fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the configuration file)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Directory receiving the reports (overrides the configuration file)
    #[arg(short, long)]
    save_dir: Option<PathBuf>,

    /// Serve stored reports read-only on GET requests
    #[arg(long)]
    serve_reports: bool,
}

impl Cli {
    fn into_config(self) -> crashreport_ingest::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }
        if let Some(save_dir) = self.save_dir {
            config.ingest.save_dir = save_dir;
        }
        if self.serve_reports {
            config.server.serve_reports = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crashreport_ingest=info,tower_http=info".into()),
        )
        .init();

    let config = match Cli::parse().into_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match crashreport_ingest::api::start_api_server(config, shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
