//! Lazy stream of embedded file records

use super::{ByteCursor, trim_at_nul};
use crate::error::{CursorError, ExtractError};
use std::num::NonZeroU32;

/// One embedded file, borrowed from the decompressed buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord<'a> {
    /// Index written by the client (does not control placement or order)
    pub index: u32,
    /// File name, truncated at the first NUL
    pub name: &'a [u8],
    /// File contents
    pub data: &'a [u8],
}

/// Forward-only iterator producing exactly `expected` records
///
/// The count comes from the caller, never from the blob. The first decoding failure is
/// yielded as [`ExtractError::TruncatedEntry`] and ends the stream.
#[derive(Debug)]
pub struct FileRecordStream<'a> {
    cursor: ByteCursor<'a>,
    expected: u32,
    produced: u32,
    failed: bool,
}

impl<'a> FileRecordStream<'a> {
    /// Start streaming records from a cursor left after the manifest
    pub fn new(cursor: ByteCursor<'a>, expected: NonZeroU32) -> Self {
        Self {
            cursor,
            expected: expected.get(),
            produced: 0,
            failed: false,
        }
    }

    /// Number of records successfully produced so far
    pub fn produced(&self) -> u32 {
        self.produced
    }

    fn read_record(&mut self) -> Result<FileRecord<'a>, CursorError> {
        let index = self.cursor.read_u32_le()?;
        let name = self.cursor.read_length_prefixed()?;
        let data = self.cursor.read_length_prefixed()?;
        Ok(FileRecord {
            index,
            name: trim_at_nul(name),
            data,
        })
    }
}

impl<'a> Iterator for FileRecordStream<'a> {
    type Item = Result<FileRecord<'a>, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.produced >= self.expected {
            return None;
        }

        let record = self.produced;
        match self.read_record() {
            Ok(file) => {
                self.produced += 1;
                Some(Ok(file))
            }
            Err(source) => {
                self.failed = true;
                Some(Err(ExtractError::TruncatedEntry { record, source }))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let left = (self.expected - self.produced) as usize;
        (0, Some(left))
    }
}

impl std::iter::FusedIterator for FileRecordStream<'_> {}
