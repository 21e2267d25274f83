use crate::api::pages::FailurePage;
use crate::services::google_api::GoogleApiError;
use crate::utils::validation::ValidationError;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Drive upload failed: {0}")]
    Storage(#[source] GoogleApiError),

    #[error("File {file_id} was stored in Drive but the sheet append failed: {source}")]
    Append {
        file_id: String,
        #[source]
        source: GoogleApiError,
    },

    #[error("Template error: {0}")]
    Render(#[from] askama::Error),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_)
            | AppError::Append { .. }
            | AppError::Render(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Upload failed: {:?}", self);
        } else {
            tracing::warn!("Upload rejected: {}", message);
        }

        let page = FailurePage { message: &message };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render failure page: {}", e);
                (status, message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation(ValidationError::MissingFile).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PayloadTooLarge("too big".to_string()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::Storage(GoogleApiError::QuotaExceeded("slow down".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Append {
                file_id: "drive-1".to_string(),
                source: GoogleApiError::SchemaMismatch("no header".to_string()),
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_append_message_names_orphaned_file() {
        let err = AppError::Append {
            file_id: "drive-1".to_string(),
            source: GoogleApiError::Unauthorized("token expired".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("drive-1"));
        assert!(message.contains("token expired"));
    }
}
