use axum::extract::rejection::BytesRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("callback token missing or invalid")]
    InvalidCallbackToken,
    #[error("unable to read request body: {0}")]
    UnreadableBody(#[from] BytesRejection),
    #[error("unable to parse webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("error: {0}")]
    WrappedError(anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidCallbackToken => StatusCode::UNAUTHORIZED,
            AppError::UnreadableBody(_) | AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::WrappedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // internals never leak into the response body; plain-text error bodies end in a newline
    fn public_message(&self) -> &'static str {
        match self {
            AppError::MethodNotAllowed => "Method not allowed\n",
            AppError::InvalidCallbackToken => "Invalid callback token\n",
            AppError::UnreadableBody(_) => "Error reading request body\n",
            AppError::MalformedPayload(_) => "Error parsing webhook payload\n",
            AppError::WrappedError(_) => "Internal server error\n",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::WrappedError(err)
    }
}
