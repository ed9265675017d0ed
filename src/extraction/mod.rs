//! Crash-report extraction
//!
//! This module turns an uploaded body into files on disk:
//! decompress → decode manifest → stream file records → write each file.
//!
//! Extraction is not transactional. When a later record fails, files written for
//! earlier records of the same report stay on disk.

mod decompress;
mod target;


// Re-exports
pub use decompress::{Decompressor, GzipDecompressor, Identity};
pub use target::{ExtractionTarget, sanitize_component};

use crate::config::IngestConfig;
use crate::container::{ByteCursor, FileRecordStream, Manifest};
use crate::error::ExtractError;
use axum::body::Bytes;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::spawn_blocking;
use tracing::{debug, info};

/// Result of a fully extracted report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Directory the files were written to
    pub directory: PathBuf,
    /// Written files, in stream order
    pub files: Vec<PathBuf>,
}

/// Drives one report from compressed body to files on disk
///
/// Cloning is cheap; clones share the decompressor and the worker permits.
#[derive(Clone)]
pub struct Extractor {
    save_dir: PathBuf,
    decompressor: Arc<dyn Decompressor>,
    permits: Arc<Semaphore>,
}

impl Extractor {
    /// Create an extractor writing under `save_dir`
    ///
    /// At most `max_concurrent` reports run through [`Extractor::extract_in_worker`]
    /// at once (minimum 1).
    pub fn new(
        save_dir: impl Into<PathBuf>,
        decompressor: Arc<dyn Decompressor>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            save_dir: save_dir.into(),
            decompressor,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Create a gzip extractor from the ingest settings
    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(
            config.save_dir.clone(),
            Arc::new(GzipDecompressor::new(config.max_decompressed_bytes)),
            config.max_concurrent_extractions,
        )
    }

    /// Base directory for extracted reports
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Extract one report synchronously
    ///
    /// `expected_file_count` is the authoritative record count; zero is rejected before
    /// any other work. Blocks on decompression and disk I/O.
    ///
    /// # Errors
    /// * `InvalidFileCount` - `expected_file_count` is zero
    /// * `DecompressionFailure` / `PayloadTooLarge` / `EmptyPayload` - unusable body
    /// * `MalformedManifest` - the fixed header overruns the buffer
    /// * `UnsafePath` - a session, directory or file name would escape its parent
    /// * `TruncatedEntry` - record `n` overruns the buffer
    /// * `CreateDirectory` / `WriteFile` - disk errors
    pub fn extract(
        &self,
        compressed: &[u8],
        expected_file_count: u32,
        session_id: &str,
    ) -> Result<ExtractionReport, ExtractError> {
        let expected =
            NonZeroU32::new(expected_file_count).ok_or(ExtractError::InvalidFileCount)?;

        let decompressed = self.decompressor.decompress(compressed)?;
        if decompressed.is_empty() {
            return Err(ExtractError::EmptyPayload);
        }

        let mut cursor = ByteCursor::new(&decompressed);
        let manifest = Manifest::decode(&mut cursor)?;
        debug!(
            directory = %String::from_utf8_lossy(manifest.directory_name),
            report = %String::from_utf8_lossy(manifest.report_file_name),
            declared_blob_size = manifest.declared_blob_size,
            declared_file_count = manifest.declared_file_count,
            expected_file_count,
            payload_bytes = decompressed.len(),
            "decoded report manifest"
        );

        let target = ExtractionTarget::resolve(&self.save_dir, session_id, manifest.directory_name)?;
        target.create()?;

        let mut files = Vec::new();
        for record in FileRecordStream::new(cursor, expected) {
            let record = record?;
            let path = target.file_path(record.name)?;
            std::fs::write(&path, record.data).map_err(|source| ExtractError::WriteFile {
                path: path.clone(),
                source,
            })?;
            debug!(
                index = record.index,
                ?path,
                bytes = record.data.len(),
                "wrote report file"
            );
            files.push(path);
        }

        info!(
            directory = ?target.path(),
            file_count = files.len(),
            "extracted crash report"
        );

        Ok(ExtractionReport {
            directory: target.path().to_path_buf(),
            files,
        })
    }

    /// Extract one report on the blocking pool, bounded by the worker permits
    ///
    /// The permit travels with the blocking task, so a dropped caller does not free
    /// a slot while its extraction is still writing.
    pub async fn extract_in_worker(
        &self,
        body: Bytes,
        expected_file_count: u32,
        session_id: String,
    ) -> Result<ExtractionReport, ExtractError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| ExtractError::WorkerFailed {
                reason: e.to_string(),
            })?;

        let extractor = self.clone();
        spawn_blocking(move || {
            let _permit = permit;
            extractor.extract(&body, expected_file_count, &session_id)
        })
        .await
        .map_err(|e| ExtractError::WorkerFailed {
            reason: format!("extraction task panicked: {}", e),
        })?
    }
}
