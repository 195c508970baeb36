use crate::error::SUCCESS;
use axum::Json;
use axum::response::{IntoResponse, Response};
use remit_derive::api_model;
use serde::Serialize;

/// Outcome block of every response.
#[api_model(response)]
#[derive(Clone, PartialEq, Eq)]
pub struct Status {
    pub success: bool,
    pub code: String,
    pub message: Option<String>,
}

/// Envelope wrapping every payload: `{ "status": {...}, "data": ..., "message": ... }`.
#[api_model(response)]
#[derive(Clone)]
pub struct ApiResponse<T> {
    pub status: Status,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status { success: true, code: SUCCESS.to_owned(), message: None },
            data: Some(data),
            message: None,
        }
    }

    /// Success without a payload (`"data": null`).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            status: Status { success: true, code: SUCCESS.to_owned(), message: None },
            data: None,
            message: None,
        }
    }

    /// Failure envelope. `detailed` repeats the message inside the status block.
    #[must_use]
    pub fn error(code: &str, message: String, detailed: bool) -> Self {
        Self {
            status: Status {
                success: false,
                code: code.to_owned(),
                message: detailed.then(|| message.clone()),
            },
            data: None,
            message: Some(message),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
