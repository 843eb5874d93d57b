//! Wire types of the analyze endpoint. Parsing is kept free of I/O.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use serde::Deserialize;

use super::RecognitionError;

/// A successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    /// Recognized digits as reported by the service.
    pub value: String,
    /// Annotated image, still in the service's encoding (PNG/JPEG bytes).
    pub image: Vec<u8>,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    value: String,
    image: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<NestedError>,
    detail: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct NestedError {
    message: Option<String>,
}

pub(crate) fn parse_response(body: &str) -> Result<RecognitionResult, RecognitionError> {
    let response: AnalyzeResponse =
        serde_json::from_str(body).map_err(|e| RecognitionError::Decode(e.to_string()))?;

    let image = STANDARD
        .decode(response.image.trim())
        .map_err(|e| RecognitionError::Decode(format!("image is not valid base64: {e}")))?;

    Ok(RecognitionResult {
        value: response.value,
        image,
    })
}

/// Extracts the user-facing message from a failed response.
///
/// Looks for `message`, then `error.message`, then problem-details
/// `detail`/`title`; falls back to the raw body and finally the status line.
pub(crate) fn parse_error_body(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let candidate = parsed
            .message
            .or_else(|| parsed.error.and_then(|e| e.message))
            .or(parsed.detail)
            .or(parsed.title);
        if let Some(message) = candidate
            && !message.trim().is_empty()
        {
            return message;
        }
    }

    let raw = body.trim();
    if raw.is_empty() {
        status.to_string()
    } else {
        raw.to_string()
    }
}
