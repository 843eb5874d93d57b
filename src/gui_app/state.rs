use tracing::{debug, warn};

use crate::recognition::RecognitionResult;

pub const ERROR_TITLE: &str = "Error";

/// Which controls are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Nothing selected yet, or everything was reset.
    #[default]
    None,
    /// The last analysis finished and nothing is outstanding.
    Idle,
    /// At least one request is in flight.
    Analyzing,
}

/// Title/message pair shown in the blocking dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// Presentation state around one drawing/upload session.
///
/// The busy flag is cleared when the last outstanding request completes,
/// never at submission time. Overlapping requests are counted, not refused.
#[derive(Debug, Default)]
pub struct Session {
    mode: UiMode,
    submitted: Option<Vec<u8>>,
    recognized: Option<String>,
    result_image: Option<Vec<u8>>,
    notification: Option<Notification>,
    pending: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn is_busy(&self) -> bool {
        self.mode == UiMode::Analyzing
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn submitted_image(&self) -> Option<&[u8]> {
        self.submitted.as_deref()
    }

    pub fn recognized(&self) -> Option<&str> {
        self.recognized.as_deref()
    }

    pub fn result_image(&self) -> Option<&[u8]> {
        self.result_image.as_deref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// A file was picked: go busy right away, before its bytes are read.
    pub fn select_upload(&mut self) {
        self.mode = UiMode::Analyzing;
    }

    /// Clears the previous outcome and marks a request as outstanding.
    ///
    /// Hands the image straight back so the caller can submit exactly the
    /// bytes that are now displayed as the current image.
    pub fn begin_analysis(&mut self, image: Vec<u8>) -> Vec<u8> {
        self.recognized = None;
        self.result_image = None;
        self.submitted = Some(image.clone());
        self.pending += 1;
        self.mode = UiMode::Analyzing;
        debug!(bytes = image.len(), pending = self.pending, "analysis started");
        image
    }

    pub fn finish_analysis(&mut self, outcome: Result<RecognitionResult, String>) {
        self.pending = self.pending.saturating_sub(1);

        match outcome {
            Ok(result) => {
                self.recognized = Some(result.value);
                self.result_image = Some(result.image);
            }
            Err(message) => {
                warn!(%message, "analysis failed");
                self.notify(message);
            }
        }

        self.settle_mode();
    }

    /// A failure outside the request itself, e.g. an unreadable file.
    pub fn report_failure(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "could not submit image");
        self.notify(message);
        self.settle_mode();
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn reset(&mut self) {
        self.mode = UiMode::None;
        self.submitted = None;
        self.recognized = None;
        self.result_image = None;
    }

    fn notify(&mut self, message: String) {
        self.notification = Some(Notification {
            title: ERROR_TITLE.to_string(),
            message,
        });
    }

    fn settle_mode(&mut self) {
        if self.pending == 0 {
            self.mode = UiMode::Idle;
        }
    }
}
