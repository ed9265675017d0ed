//! Fixed header of the crash-report container

use super::{ByteCursor, trim_at_nul};
use crate::error::{CursorError, ExtractError};

/// Decoded container header
///
/// Holds borrowed views into the decompressed buffer. Only `directory_name` drives
/// extraction; the remaining fields are kept for forward compatibility and are never
/// cross-checked against the buffer or the caller's file count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest<'a> {
    /// Name of the per-report directory, truncated at the first NUL
    pub directory_name: &'a [u8],
    /// Name of the report file, truncated at the first NUL (unused)
    pub report_file_name: &'a [u8],
    /// Blob size declared by the client (unused)
    pub declared_blob_size: u32,
    /// File count declared inside the blob (unused; the header count is authoritative)
    pub declared_file_count: u32,
}

impl<'a> Manifest<'a> {
    /// Decode the header from a cursor positioned at offset 0
    ///
    /// On success the cursor is left at the first file record.
    pub fn decode(cursor: &mut ByteCursor<'a>) -> Result<Self, ExtractError> {
        let directory_name = cursor
            .read_length_prefixed()
            .map_err(malformed("directory name"))?;
        let report_file_name = cursor
            .read_length_prefixed()
            .map_err(malformed("report file name"))?;
        let declared_blob_size = cursor
            .read_u32_le()
            .map_err(malformed("declared blob size"))?;
        let declared_file_count = cursor
            .read_u32_le()
            .map_err(malformed("declared file count"))?;

        Ok(Self {
            directory_name: trim_at_nul(directory_name),
            report_file_name: trim_at_nul(report_file_name),
            declared_blob_size,
            declared_file_count,
        })
    }
}

fn malformed(field: &'static str) -> impl FnOnce(CursorError) -> ExtractError {
    move |source| ExtractError::MalformedManifest { field, source }
}
