//! Bounds-checked sequential reader over a byte buffer

use crate::error::CursorError;

/// Sequential little-endian reader over a borrowed byte buffer
///
/// The offset never exceeds the buffer length. Every read that would cross the end
/// of the buffer fails with [`CursorError::OutOfBounds`] and leaves the offset unchanged.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Current read offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Read a little-endian `u32` and advance by 4
    pub fn read_u32_le(&mut self) -> Result<u32, CursorError> {
        let bytes = self.read_bytes(4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(word))
    }

    /// Borrow exactly `n` bytes and advance by `n`
    ///
    /// `n == 0` yields an empty slice.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CursorError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(CursorError::OutOfBounds {
                offset: self.offset,
                requested: n,
                remaining,
            });
        }
        let start = self.offset;
        self.offset += n;
        Ok(&self.buf[start..self.offset])
    }

    /// Read a `u32` length followed by that many bytes
    ///
    /// A length that overruns the buffer consumes the 4-byte prefix but no payload.
    pub fn read_length_prefixed(&mut self) -> Result<&'a [u8], CursorError> {
        let len = self.read_u32_le()?;
        // u32 always fits in usize on supported targets; saturate otherwise so the
        // bounds check below still rejects it.
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.read_bytes(len)
    }
}
