//! Error mapping helpers for the Bitbucket HTTP client.

use reqwest::StatusCode;

use crate::error::{ReviewError, truncate_for_message};

/// Checks if a response status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

pub(super) fn map_transport_error(operation: &str, error: &reqwest::Error) -> ReviewError {
    if error.is_decode() {
        return ReviewError::Upstream {
            status: None,
            message: format!("{operation} response could not be read: {error}"),
        };
    }

    ReviewError::Network {
        message: format!("{operation} failed: {error}"),
    }
}

pub(super) fn map_http_error(
    operation: &str,
    status: StatusCode,
    maybe_message: Option<String>,
) -> ReviewError {
    let message = maybe_message.unwrap_or_else(|| "unknown error".to_owned());
    if is_auth_failure(status) {
        ReviewError::Authentication {
            message: format!("{operation} failed: Bitbucket returned {status} {message}"),
        }
    } else {
        ReviewError::Upstream {
            status: Some(status.as_u16()),
            message: format!("{operation} failed with status {status}: {message}"),
        }
    }
}

pub(super) fn map_decode_error(operation: &str, error: &serde_json::Error) -> ReviewError {
    ReviewError::Upstream {
        status: None,
        message: format!("{operation} response deserialisation failed: {error}"),
    }
}

/// Extracts the human-readable message from a Bitbucket error body.
///
/// Bitbucket wraps failures as `{"type": "error", "error": {"message": ...}}`.
pub(super) fn extract_bitbucket_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        let trimmed = body.trim();
        return (!trimmed.is_empty()).then(|| truncate_for_message(trimmed, 200));
    };
    value
        .get("error")
        .and_then(|error| error.get("message"))
        .or_else(|| value.get("message"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}
