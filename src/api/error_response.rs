//! HTTP error response handling for the API
//!
//! The crash reporter only distinguishes success from failure, so error responses
//! carry a status code and no body. Details go to the log.

use crate::error::{Error, ToHttpStatus};
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Implement IntoResponse for Error to automatically convert errors to HTTP responses
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status_code, [(header::CONNECTION, "close")]).into_response()
    }
}

/// Bare `200 OK` sent once every file of a report is on disk
pub fn success_response() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain"),
            (header::CONNECTION, "close"),
        ],
    )
        .into_response()
}
