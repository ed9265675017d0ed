//! Header-derived request fields
//!
//! The crash reporter identifies itself, announces how many files the body carries,
//! and optionally names the session. All of it is validated here, before the body is
//! decompressed.

use crate::config::IngestConfig;
use crate::error::{Error, ExtractError, RequestError};
use axum::body::{Body, Bytes, HttpBody};
use axum::http::{HeaderMap, header};
use std::num::NonZeroU32;
use std::pin::Pin;

/// Validated request headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeaders {
    /// Authoritative number of file records in the body
    pub file_count: NonZeroU32,
    /// Session identifier, empty when the client sent none
    pub session_id: String,
}

impl ReportHeaders {
    /// Validate the upload headers in order: client identifier, file count, session
    pub fn from_headers(
        headers: &HeaderMap,
        config: &IngestConfig,
    ) -> Result<Self, RequestError> {
        let client = headers
            .get(config.client_header.as_str())
            .and_then(|value| value.to_str().ok());
        match client {
            Some(id) if id.starts_with(&config.client_prefix) => {}
            _ => return Err(RequestError::InvalidClientIdentifier),
        }

        let raw_count = headers
            .get(config.file_count_header.as_str())
            .ok_or(RequestError::MissingFileCountHeader)?;
        let file_count = match raw_count.to_str() {
            Ok(value) => parse_file_count(value)?,
            Err(_) => {
                return Err(RequestError::InvalidFileCount {
                    value: String::from_utf8_lossy(raw_count.as_bytes()).into_owned(),
                });
            }
        };

        let session_id = match headers.get(config.session_header.as_str()) {
            None => String::new(),
            Some(raw) => match std::str::from_utf8(raw.as_bytes()) {
                Ok(value) => value.to_string(),
                Err(_) => {
                    return Err(RequestError::InvalidSessionId {
                        value: String::from_utf8_lossy(raw.as_bytes()).into_owned(),
                    });
                }
            },
        };

        Ok(Self {
            file_count,
            session_id,
        })
    }
}

/// Buffer the request body, refusing to hold more than `limit` bytes
///
/// A `Content-Length` above the limit is refused before anything is read. Bodies
/// without one are read frame by frame and dropped as soon as they cross the limit.
pub async fn read_body(
    headers: &HeaderMap,
    mut body: Body,
    limit: usize,
) -> Result<Bytes, Error> {
    let too_large = || ExtractError::PayloadTooLarge {
        limit: limit as u64,
    };

    let announced = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    if announced.is_some_and(|len| len > limit as u64) {
        return Err(too_large().into());
    }

    let mut buf = Vec::with_capacity(announced.map_or(0, |len| len as usize));
    while let Some(frame) = std::future::poll_fn(|cx| Pin::new(&mut body).poll_frame(cx)).await {
        let frame = frame.map_err(|e| RequestError::BodyRead {
            reason: e.to_string(),
        })?;
        if let Ok(data) = frame.into_data() {
            if buf.len() + data.len() > limit {
                return Err(too_large().into());
            }
            buf.extend_from_slice(&data);
        }
    }
    Ok(Bytes::from(buf))
}

/// Parse a decimal file count, rejecting zero, signs and anything outside `u32`
pub fn parse_file_count(value: &str) -> Result<NonZeroU32, RequestError> {
    let invalid = || RequestError::InvalidFileCount {
        value: value.to_string(),
    };

    let digits = value.trim_matches(|c: char| c.is_ascii_whitespace());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    digits
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(invalid)
}
