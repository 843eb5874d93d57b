//! Client for the external digit recognition service.

pub mod client;
pub mod wire;

pub use client::{ANALYZE_PATH, FORM_FIELD, RecognitionClient, UPLOAD_FILE_NAME};
pub use wire::RecognitionResult;

/// Everything that can go wrong between handing over an image and getting
/// a result back. All variants end up in the same notification path.
#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("recognition service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("malformed recognition response: {0}")]
    Decode(String),
}

impl RecognitionError {
    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            RecognitionError::Service { message, .. } => message.clone(),
            RecognitionError::Transport(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}
