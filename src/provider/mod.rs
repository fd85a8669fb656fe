use async_trait::async_trait;
use serde_json::Value;

use crate::errors::PromptError;

pub mod supabase;

/// Raw reply from the hosted backend. Transport failures never produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The hosted backend-as-a-service: edge functions, RPCs and table access.
/// Implementations return `PromptError::Network` when the request could
/// not be completed and an `HttpReply` for every answered request.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn invoke_function(&self, name: &str, body: &Value) -> Result<HttpReply, PromptError>;
    async fn rpc(&self, name: &str, args: &Value) -> Result<HttpReply, PromptError>;
    async fn insert(&self, table: &str, row: &Value) -> Result<HttpReply, PromptError>;
    /// All rows of `table`, newest first by `order_desc`.
    async fn select(&self, table: &str, order_desc: &str) -> Result<HttpReply, PromptError>;
}

pub type DynBackend = std::sync::Arc<dyn Backend>;

pub fn make_backend(cfg: &crate::config::Config) -> anyhow::Result<DynBackend> {
    Ok(std::sync::Arc::new(supabase::SupabaseBackend::new(cfg)?))
}

#[cfg(test)]
pub mod testing {
    //! In-memory backend used by unit tests.

    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct FakeBackend {
        pub limit: i64,
        pub used: Mutex<i64>,
        pub function_replies: Mutex<VecDeque<Result<HttpReply, PromptError>>>,
        pub rows: Mutex<Vec<Value>>,
        pub function_calls: AtomicUsize,
        pub increment_calls: AtomicUsize,
        pub last_function: Mutex<Option<(String, Value)>>,
        pub fail_increment: Mutex<Option<PromptError>>,
        pub raw_increment_reply: Mutex<Option<String>>,
        pub raw_remaining_reply: Mutex<Option<String>>,
        pub fail_remaining: Mutex<Option<PromptError>>,
        pub increment_status: Mutex<Option<u16>>,
        pub delay_ms: u64,
    }

    impl FakeBackend {
        pub fn with_remaining(limit: i64, remaining: i64) -> Self {
            Self { limit, used: Mutex::new(limit - remaining), ..Default::default() }
        }

        pub fn ok(body: Value) -> Result<HttpReply, PromptError> {
            Ok(HttpReply { status: 200, body: body.to_string() })
        }

        pub fn reply(self, r: Result<HttpReply, PromptError>) -> Self {
            self.function_replies.lock().push_back(r);
            self
        }

        pub fn function_calls(&self) -> usize {
            self.function_calls.load(Ordering::SeqCst)
        }

        pub fn remaining(&self) -> i64 {
            (self.limit - *self.used.lock()).max(0)
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn invoke_function(&self, name: &str, body: &Value) -> Result<HttpReply, PromptError> {
            self.function_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_function.lock() = Some((name.to_string(), body.clone()));
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            self.function_replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(PromptError::Network("no scripted reply".into())))
        }

        async fn rpc(&self, name: &str, _args: &Value) -> Result<HttpReply, PromptError> {
            match name {
                "increment_ai_usage" => {
                    self.increment_calls.fetch_add(1, Ordering::SeqCst);
                    if let Some(e) = self.fail_increment.lock().clone() {
                        return Err(e);
                    }
                    if let Some(status) = *self.increment_status.lock() {
                        return Ok(HttpReply { status, body: json!({ "message": "unavailable" }).to_string() });
                    }
                    if let Some(raw) = self.raw_increment_reply.lock().clone() {
                        return Ok(HttpReply { status: 200, body: raw });
                    }
                    let mut used = self.used.lock();
                    let ok = *used < self.limit;
                    if ok {
                        *used += 1;
                    }
                    Ok(HttpReply { status: 200, body: json!(ok).to_string() })
                }
                "can_use_ai_features" => {
                    if let Some(e) = self.fail_remaining.lock().clone() {
                        return Err(e);
                    }
                    if let Some(raw) = self.raw_remaining_reply.lock().clone() {
                        return Ok(HttpReply { status: 200, body: raw });
                    }
                    Ok(HttpReply { status: 200, body: json!(self.remaining()).to_string() })
                }
                other => Ok(HttpReply { status: 404, body: format!("unknown rpc {other}") }),
            }
        }

        async fn insert(&self, _table: &str, row: &Value) -> Result<HttpReply, PromptError> {
            self.rows.lock().push(row.clone());
            Ok(HttpReply { status: 201, body: String::new() })
        }

        async fn select(&self, _table: &str, order_desc: &str) -> Result<HttpReply, PromptError> {
            let mut rows = self.rows.lock().clone();
            rows.sort_by(|a, b| {
                let key = |v: &Value| v[order_desc].as_str().unwrap_or_default().to_string();
                key(b).cmp(&key(a))
            });
            Ok(HttpReply { status: 200, body: Value::Array(rows).to_string() })
        }
    }
}
