//! Per-user daily quota for AI calls.
//!
//! The server owns the counter and is the only place it changes: a call is
//! reserved with one atomic `increment_ai_usage` RPC, never a read followed
//! by a write. The session keeps a cached `remaining` for display, refreshed
//! from `can_use_ai_features` after every reservation attempt.

use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::errors::{Denial, PromptError};
use crate::provider::DynBackend;

pub const REMAINING_RPC: &str = "can_use_ai_features";
pub const INCREMENT_RPC: &str = "increment_ai_usage";

/// Who is using the app and what the client last heard about their quota.
/// Passed by reference to the gate and the orchestrator.
#[derive(Debug)]
pub struct Session {
    user_id: Option<String>,
    daily_limit: u32,
    remaining: Mutex<u32>,
}

impl Session {
    pub fn new(user_id: Option<String>, daily_limit: u32) -> Self {
        Self { user_id, daily_limit, remaining: Mutex::new(daily_limit) }
    }

    #[cfg(test)]
    pub fn anonymous(daily_limit: u32) -> Self {
        Self::new(None, daily_limit)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Cached snapshot; never authoritative.
    pub fn remaining(&self) -> u32 {
        *self.remaining.lock()
    }

    fn set_remaining(&self, value: i64) {
        let clamped = value.clamp(0, self.daily_limit as i64) as u32;
        *self.remaining.lock() = clamped;
    }
}

/// A confirmed server-side increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub remaining: u32,
}

pub struct UsageGate {
    backend: DynBackend,
}

impl UsageGate {
    pub fn new(backend: DynBackend) -> Self {
        Self { backend }
    }

    /// Re-read the remaining count from the server into the session cache.
    pub async fn refresh(&self, session: &Session) -> Result<u32, PromptError> {
        let Some(user) = session.user_id() else {
            session.set_remaining(session.daily_limit() as i64);
            return Ok(session.remaining());
        };
        let reply = self.backend.rpc(REMAINING_RPC, &json!({ "user_uuid": user })).await?;
        if !reply.is_success() {
            return Err(PromptError::TransientGate(format!("{REMAINING_RPC} returned {}", reply.status)));
        }
        match serde_json::from_str::<Value>(&reply.body).ok().and_then(|v| v.as_i64()) {
            Some(n) => {
                session.set_remaining(n);
                Ok(session.remaining())
            }
            None => Err(PromptError::TransientGate(format!("{REMAINING_RPC} returned a non-numeric value"))),
        }
    }

    /// Ask the server to atomically count one more AI call for the user.
    pub async fn check_and_reserve(&self, session: &Session) -> Result<Reservation, Denial> {
        let Some(user) = session.user_id() else {
            debug!("usage gate: no signed-in user");
            return Err(Denial::NotAuthenticated);
        };

        let reply = match self.backend.rpc(INCREMENT_RPC, &json!({ "user_uuid": user })).await {
            Ok(r) => r,
            Err(e) => {
                // Never reached the server, so nothing was consumed.
                warn!("usage gate: increment not delivered: {e}");
                self.refresh_quietly(session).await;
                return Err(Denial::TransientError(e.to_string()));
            }
        };

        if !reply.is_success() {
            warn!(status = reply.status, "usage gate: increment rejected by backend");
            self.refresh_quietly(session).await;
            return Err(Denial::TransientError(format!("{INCREMENT_RPC} returned {}", reply.status)));
        }

        match serde_json::from_str::<Value>(&reply.body).ok().and_then(|v| v.as_bool()) {
            Some(true) => {
                if self.refresh(session).await.is_err() {
                    // The increment is confirmed even if the re-read is not.
                    let left = session.remaining().saturating_sub(1);
                    session.set_remaining(left as i64);
                }
                info!(remaining = session.remaining(), "usage gate: call reserved");
                Ok(Reservation { remaining: session.remaining() })
            }
            Some(false) => {
                if self.refresh(session).await.is_err() {
                    session.set_remaining(0);
                }
                info!("usage gate: daily quota exhausted");
                Err(Denial::QuotaExceeded)
            }
            None => {
                warn!("usage gate: {INCREMENT_RPC} returned a non-boolean value");
                self.refresh_quietly(session).await;
                Err(Denial::TransientError(format!("{INCREMENT_RPC} returned a non-boolean value")))
            }
        }
    }

    async fn refresh_quietly(&self, session: &Session) {
        if let Err(e) = self.refresh(session).await {
            debug!("usage refresh failed, keeping cached value: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::FakeBackend;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn gate(fake: &Arc<FakeBackend>) -> UsageGate {
        UsageGate::new(fake.clone())
    }

    #[tokio::test]
    async fn last_remaining_call_succeeds_then_denies() {
        let fake = Arc::new(FakeBackend::with_remaining(5, 1));
        let session = Session::new(Some("u1".into()), 5);
        let g = gate(&fake);
        g.refresh(&session).await.unwrap();
        assert_eq!(session.remaining(), 1);

        let r = g.check_and_reserve(&session).await.unwrap();
        assert_eq!(r.remaining, 0);
        assert_eq!(session.remaining(), 0);

        assert_eq!(g.check_and_reserve(&session).await, Err(Denial::QuotaExceeded));
        assert_eq!(session.remaining(), 0);
    }

    #[tokio::test]
    async fn anonymous_session_is_denied_without_backend_call() {
        let fake = Arc::new(FakeBackend::with_remaining(5, 5));
        let session = Session::anonymous(5);
        assert_eq!(gate(&fake).check_and_reserve(&session).await, Err(Denial::NotAuthenticated));
        assert_eq!(fake.increment_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn network_failure_is_transient_and_consumes_nothing() {
        let fake = Arc::new(FakeBackend::with_remaining(5, 3));
        *fake.fail_increment.lock() = Some(PromptError::Network("connection reset".into()));
        let session = Session::new(Some("u1".into()), 5);

        let denied = gate(&fake).check_and_reserve(&session).await;
        assert!(matches!(denied, Err(Denial::TransientError(_))));
        assert_eq!(fake.remaining(), 3);
        assert_eq!(session.remaining(), 3);
    }

    #[tokio::test]
    async fn garbage_rpc_values_are_transient_errors() {
        let fake = Arc::new(FakeBackend::with_remaining(5, 2));
        *fake.raw_increment_reply.lock() = Some("\"yes\"".into());
        *fake.raw_remaining_reply.lock() = Some("null".into());
        let session = Session::new(Some("u1".into()), 5);
        let g = gate(&fake);

        assert!(matches!(g.check_and_reserve(&session).await, Err(Denial::TransientError(_))));
        assert!(matches!(g.refresh(&session).await, Err(PromptError::TransientGate(_))));
        assert_eq!(session.remaining(), 5);
    }

    #[tokio::test]
    async fn confirmed_increment_with_failed_refresh_decrements_cache_once() {
        let fake = Arc::new(FakeBackend::with_remaining(5, 3));
        let session = Session::new(Some("u1".into()), 5);
        let g = gate(&fake);
        g.refresh(&session).await.unwrap();

        *fake.fail_remaining.lock() = Some(PromptError::Network("timed out".into()));
        let r = g.check_and_reserve(&session).await.unwrap();
        assert_eq!(r.remaining, 2);
        assert_eq!(session.remaining(), 2);
        assert_eq!(fake.remaining(), 2);
    }

    #[tokio::test]
    async fn rejected_increment_is_transient_and_rereads_server() {
        let fake = Arc::new(FakeBackend::with_remaining(5, 2));
        *fake.increment_status.lock() = Some(503);
        let session = Session::new(Some("u1".into()), 5);
        assert_eq!(session.remaining(), 5);

        let denied = gate(&fake).check_and_reserve(&session).await;
        assert!(matches!(denied, Err(Denial::TransientError(_))));
        assert_eq!(fake.increment_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fake.remaining(), 2);
        assert_eq!(session.remaining(), 2);
    }

    #[tokio::test]
    async fn refresh_clamps_server_values() {
        let fake = Arc::new(FakeBackend::default());
        *fake.raw_remaining_reply.lock() = Some("42".into());
        let session = Session::new(Some("u1".into()), 5);
        assert_eq!(gate(&fake).refresh(&session).await.unwrap(), 5);

        *fake.raw_remaining_reply.lock() = Some("-3".into());
        assert_eq!(gate(&fake).refresh(&session).await.unwrap(), 0);
    }
}
