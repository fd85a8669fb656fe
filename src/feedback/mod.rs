use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::PromptError;
use crate::provider::DynBackend;

pub const FEEDBACK_TABLE: &str = "feedback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Review,
    Issue,
    Suggestion,
    Other,
}

impl FeedbackType {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackType::Review => "review",
            FeedbackType::Issue => "issue",
            FeedbackType::Suggestion => "suggestion",
            FeedbackType::Other => "other",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFeedback {
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: FeedbackType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: FeedbackType,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Insert-only feedback table, read back newest first.
pub struct FeedbackStore {
    backend: DynBackend,
}

impl FeedbackStore {
    pub fn new(backend: DynBackend) -> Self {
        Self { backend }
    }

    pub async fn submit(&self, fb: &NewFeedback) -> Result<(), PromptError> {
        if fb.name.trim().is_empty() || fb.message.trim().is_empty() {
            return Err(PromptError::MissingInput("Name and message are required.".into()));
        }
        if !fb.email.contains('@') {
            return Err(PromptError::MissingInput("A valid email address is required.".into()));
        }
        let row = serde_json::to_value(fb)
            .map_err(|e| PromptError::Validation(format!("feedback could not be encoded: {e}")))?;
        let reply = self.backend.insert(FEEDBACK_TABLE, &row).await?;
        if !reply.is_success() {
            return Err(PromptError::Server(format!("Feedback could not be saved (status {}).", reply.status)));
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<FeedbackEntry>, PromptError> {
        let reply = self.backend.select(FEEDBACK_TABLE, "created_at").await?;
        if !reply.is_success() {
            return Err(PromptError::Server(
                "Failed to load feedback. You may need to be authenticated.".into(),
            ));
        }
        serde_json::from_str(&reply.body)
            .map_err(|e| PromptError::ResponseFormat(format!("feedback rows: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::FakeBackend;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn submit_writes_type_field() {
        let fake = Arc::new(FakeBackend::default());
        let store = FeedbackStore::new(fake.clone());
        store
            .submit(&NewFeedback {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                kind: FeedbackType::Suggestion,
                message: "Add a dark mode".into(),
            })
            .await
            .unwrap();
        let rows = fake.rows.lock().clone();
        assert_eq!(rows[0]["type"], "suggestion");
        assert_eq!(rows[0]["message"], "Add a dark mode");
    }

    #[tokio::test]
    async fn submit_rejects_incomplete_entries() {
        let fake = Arc::new(FakeBackend::default());
        let store = FeedbackStore::new(fake.clone());
        let fb = NewFeedback {
            name: "Ada".into(),
            email: "not-an-email".into(),
            kind: FeedbackType::Review,
            message: "Great".into(),
        };
        assert!(matches!(store.submit(&fb).await, Err(PromptError::MissingInput(_))));
        assert!(fake.rows.lock().is_empty());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let fake = Arc::new(FakeBackend::default());
        for (id, at) in [
            ("0b7e2f4c-7c1a-4a53-9d0e-3f1c6f5a1a01", "2025-01-02T10:00:00Z"),
            ("0b7e2f4c-7c1a-4a53-9d0e-3f1c6f5a1a02", "2025-03-04T10:00:00Z"),
        ] {
            fake.rows.lock().push(json!({
                "id": id, "name": "N", "email": "n@example.com",
                "type": "review", "message": "ok", "created_at": at,
            }));
        }
        let entries = FeedbackStore::new(fake).list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].created_at > entries[1].created_at);
        assert_eq!(entries[0].kind, FeedbackType::Review);
    }
}
