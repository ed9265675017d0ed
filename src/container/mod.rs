//! Binary container decoding
//!
//! A decompressed crash report is a flat little-endian container:
//!
//! ```text
//! [u32 dirNameLen][dirName]
//! [u32 reportNameLen][reportName]
//! [u32 declaredBlobSize]
//! [u32 declaredFileCount]
//! repeated by the caller-supplied count:
//!   [u32 index][u32 nameLen][name][u32 dataLen][data]
//! ```
//!
//! Every length is untrusted. All reads go through [`ByteCursor`], and every decoded
//! value borrows from the one decompressed buffer.

mod builder;
mod cursor;
mod manifest;
mod records;

pub use builder::ContainerBuilder;
pub use cursor::ByteCursor;
pub use manifest::Manifest;
pub use records::{FileRecord, FileRecordStream};

/// Cut a name field at its first NUL byte
///
/// The crash reporter writes strings into fixed-width, zero-padded buffers.
pub(crate) fn trim_at_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
