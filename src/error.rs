use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const MISSING_FIELDS: &str = "All fields are required";

#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Client input is missing or malformed; nothing was persisted.
    #[error("{0}")]
    Validation(String),

    /// Upload rejected by the content-type allow-list before any write.
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Malformed or oversized multipart body.
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),

    #[error("export failure: {0:#}")]
    Export(anyhow::Error),
}

impl ExpenseError {
    pub fn missing_fields() -> Self {
        Self::Validation(MISSING_FIELDS.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Multipart(e) => e.status(),
            Self::Storage(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExpenseError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Validation(msg) | Self::UnsupportedMediaType(msg) => msg.clone(),
            Self::Multipart(e) => e.body_text(),
            Self::Storage(_) | Self::Export(_) => {
                error!(error = %self, "request failed");
                "Server Error".to_string()
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(ExpenseError::missing_fields().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ExpenseError::UnsupportedMediaType("nope".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ExpenseError::Storage(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ExpenseError::Export(anyhow::anyhow!("xlsx")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn server_errors_hide_their_cause() {
        let resp = ExpenseError::Storage(anyhow::anyhow!("password=hunter2")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["message"], "Server Error");
    }

    #[tokio::test]
    async fn validation_message_is_returned() {
        let resp = ExpenseError::missing_fields().into_response();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["message"], MISSING_FIELDS);
    }
}
