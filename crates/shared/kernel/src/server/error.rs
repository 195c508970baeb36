use super::response::ApiResponse;
use crate::error::{ErrorCode, ErrorKind, INTERNAL_ERROR};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

const INTERNAL_MESSAGE: &str = "An internal server error occurred.";

/// An error rendered as a failure envelope.
///
/// Built from any [`ErrorCode`] via `?`, so handlers return `Result<_, ApiError>` and let
/// slices report through their own error enums.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    detailed: bool,
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E: ErrorCode> From<E> for ApiError {
    fn from(err: E) -> Self {
        let kind = err.kind();
        let code = err.code();

        if kind == ErrorKind::Internal {
            error!(code, error = %err, "Unhandled error");
            return Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: INTERNAL_ERROR,
                message: INTERNAL_MESSAGE.to_owned(),
                detailed: true,
            };
        }

        warn!(code, error = %err, "Request rejected");
        Self { status: status_for(kind), code, message: err.to_string(), detailed: err.is_generic() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(self.code, self.message, self.detailed);
        (self.status, body).into_response()
    }
}
