use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

use super::RecognitionError;
use super::wire::{RecognitionResult, parse_error_body, parse_response};
use crate::config::ServiceConfig;

pub const ANALYZE_PATH: &str = "NumbersNeuralNetwork/Analize";
pub const FORM_FIELD: &str = "value";
pub const UPLOAD_FILE_NAME: &str = "image.png";
const UPLOAD_MIME: &str = "image/png";

/// Thin request/response mapper over the analyze endpoint.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RecognitionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RecognitionClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, RecognitionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(RecognitionError::ClientBuild)?;

        Ok(Self {
            http,
            endpoint: config.analyze_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts `image` once and maps the reply.
    ///
    /// The blob is sent as-is under the `value` field and always labelled
    /// `image.png`, whatever its real format. No retries.
    pub async fn analyze(&self, image: Vec<u8>) -> Result<RecognitionResult, RecognitionError> {
        let size = image.len();
        let part = Part::bytes(image)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(UPLOAD_MIME)?;
        let form = Form::new().part(FORM_FIELD, part);

        debug!(endpoint = %self.endpoint, bytes = size, "posting image for recognition");

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "recognition request failed"))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = parse_error_body(status, &body);
            warn!(%status, %message, "recognition service rejected the image");
            return Err(RecognitionError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let result = parse_response(&body)?;
        info!(
            value = %result.value,
            image_bytes = result.image.len(),
            "recognition finished"
        );
        Ok(result)
    }
}
