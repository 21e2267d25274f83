use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Failure kinds reported by the Drive and Sheets clients.
#[derive(Error, Debug)]
pub enum GoogleApiError {
    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Google API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Sheet schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

fn is_quota_reason(reason: &str) -> bool {
    reason == "quotaExceeded" || reason.ends_with("RateLimitExceeded") || reason == "rateLimitExceeded"
}

/// Maps a non-success status and its body onto a [`GoogleApiError`].
pub fn classify(status: StatusCode, body: &str) -> GoogleApiError {
    let (message, reasons) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (
            envelope.error.message,
            envelope
                .error
                .errors
                .into_iter()
                .map(|d| d.reason)
                .collect::<Vec<_>>(),
        ),
        Err(_) => (body.trim().to_string(), Vec::new()),
    };

    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        message
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => GoogleApiError::QuotaExceeded(message),
        StatusCode::FORBIDDEN if reasons.iter().any(|r| is_quota_reason(r)) => {
            GoogleApiError::QuotaExceeded(message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GoogleApiError::Unauthorized(message),
        _ => GoogleApiError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Passes successful responses through and converts the rest into errors.
pub async fn check_response(response: Response) -> Result<Response, GoogleApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify(status, &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unauthorized() {
        let body = r#"{"error":{"code":401,"message":"Request had invalid authentication credentials.","status":"UNAUTHENTICATED"}}"#;
        let err = classify(StatusCode::UNAUTHORIZED, body);
        assert!(matches!(err, GoogleApiError::Unauthorized(ref m) if m.contains("invalid authentication")));
    }

    #[test]
    fn test_classify_forbidden_rate_limit_as_quota() {
        let body = r#"{"error":{"code":403,"message":"User rate limit exceeded.","errors":[{"reason":"userRateLimitExceeded"}]}}"#;
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, body),
            GoogleApiError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_classify_forbidden_without_quota_reason() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","errors":[{"reason":"forbidden"}]}}"#;
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, body),
            GoogleApiError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_classify_plain_text_body() {
        let err = classify(StatusCode::BAD_GATEWAY, "upstream down\n");
        match err {
            GoogleApiError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_empty_body_uses_reason_phrase() {
        let err = classify(StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err.to_string(), "Quota exceeded: Too Many Requests");
    }
}
