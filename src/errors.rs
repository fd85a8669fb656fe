use thiserror::Error;

use crate::ux::Notification;

/// Every way an AI-backed action can end without a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("not signed in")] NotAuthenticated,
    #[error("daily AI quota exhausted")] QuotaExceeded,
    #[error("usage check failed: {0}")] TransientGate(String),
    #[error("network error: {0}")] Network(String),
    #[error("server error: {0}")] Server(String),
    #[error("unreadable AI response: {0}")] ResponseFormat(String),
    #[error("invalid AI response: {0}")] Validation(String),
    #[error("nothing to send: {0}")] MissingInput(String),
    #[error("request already in progress")] Busy,
}

/// Reason the usage gate refused to reserve a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    NotAuthenticated,
    QuotaExceeded,
    TransientError(String),
}

impl From<Denial> for PromptError {
    fn from(d: Denial) -> Self {
        match d {
            Denial::NotAuthenticated => PromptError::NotAuthenticated,
            Denial::QuotaExceeded => PromptError::QuotaExceeded,
            Denial::TransientError(msg) => PromptError::TransientGate(msg),
        }
    }
}

impl From<reqwest::Error> for PromptError {
    fn from(e: reqwest::Error) -> Self {
        PromptError::Network(e.to_string())
    }
}

impl PromptError {
    /// Whether a re-click may succeed. Nothing is ever retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransientGate(_) | Self::Network(_) | Self::Server(_) | Self::ResponseFormat(_) | Self::Busy
        )
    }

    /// Printed under the notification when `is_retryable`.
    pub fn retry_hint(&self) -> Option<&'static str> {
        self.is_retryable().then_some("Re-run the command to try again.")
    }

    /// The single user-facing message for this failure.
    pub fn notification(&self) -> Notification {
        match self {
            Self::NotAuthenticated => Notification::error(
                "Authentication Required",
                "Please sign in to use AI features.",
            ),
            Self::QuotaExceeded => Notification::error(
                "Daily Limit Reached",
                "You have used all of today's AI requests. Your quota resets tomorrow.",
            ),
            Self::TransientGate(_) => Notification::error(
                "Usage Check Failed",
                "We couldn't verify your remaining AI requests. Please try again.",
            ),
            Self::Network(_) => Notification::error(
                "Connection Problem",
                "The AI service could not be reached. Please try again.",
            ),
            Self::Server(msg) => Notification::error("Error", msg.clone()),
            Self::ResponseFormat(_) => Notification::error(
                "Unexpected Response",
                "The AI returned a response we couldn't read. Please try again.",
            ),
            Self::Validation(msg) => Notification::error("Invalid Response", msg.clone()),
            Self::MissingInput(msg) => Notification::error("Nothing to Send", msg.clone()),
            Self::Busy => Notification::info(
                "Please Wait",
                "This request is still in progress.",
            ),
        }
    }
}
