use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{Backend, HttpReply};
use crate::config::Config;
use crate::errors::PromptError;

/// Backend-as-a-service over its REST surface: edge functions under
/// `/functions/v1`, RPCs and tables under `/rest/v1`.
pub struct SupabaseBackend {
    base: String,
    anon_key: String,
    access_token: Option<String>,
    client: Client,
}

impl SupabaseBackend {
    pub fn new(cfg: &Config) -> Result<Self> {
        if cfg.backend_url.trim().is_empty() {
            return Err(anyhow!("backend_url is not configured"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            base: cfg.backend_url.trim_end_matches('/').to_string(),
            anon_key: cfg.anon_key.clone(),
            access_token: cfg.access_token.clone(),
            client,
        })
    }

    fn authorized(&self, rb: RequestBuilder) -> RequestBuilder {
        // Signed-in calls carry the user's token; otherwise the anon key.
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        rb.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    async fn send(&self, rb: RequestBuilder, what: &str) -> Result<HttpReply, PromptError> {
        let resp = self.authorized(rb).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(target: "backend", call = what, status, bytes = body.len(), "backend replied");
        Ok(HttpReply { status, body })
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn invoke_function(&self, name: &str, body: &Value) -> Result<HttpReply, PromptError> {
        let url = format!("{}/functions/v1/{}", self.base, name);
        debug!(target: "backend", function = name, "POST edge function");
        self.send(self.client.post(&url).json(body), name).await
    }

    async fn rpc(&self, name: &str, args: &Value) -> Result<HttpReply, PromptError> {
        let url = format!("{}/rest/v1/rpc/{}", self.base, name);
        debug!(target: "backend", rpc = name, "POST rpc");
        self.send(self.client.post(&url).json(args), name).await
    }

    async fn insert(&self, table: &str, row: &Value) -> Result<HttpReply, PromptError> {
        let url = format!("{}/rest/v1/{}", self.base, table);
        let rb = self
            .client
            .post(&url)
            .header("Prefer", "return=minimal")
            .json(row);
        self.send(rb, table).await
    }

    async fn select(&self, table: &str, order_desc: &str) -> Result<HttpReply, PromptError> {
        let url = format!("{}/rest/v1/{}", self.base, table);
        let order = format!("{order_desc}.desc");
        let rb = self
            .client
            .get(&url)
            .query(&[("select", "*"), ("order", order.as_str())]);
        self.send(rb, table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_backend_url() {
        let cfg = Config { backend_url: "  ".into(), ..Config::default() };
        assert!(SupabaseBackend::new(&cfg).is_err());
    }

    #[test]
    fn trims_trailing_slash() {
        let cfg = Config { backend_url: "https://demo.supabase.co/".into(), ..Config::default() };
        let b = SupabaseBackend::new(&cfg).unwrap();
        assert_eq!(b.base, "https://demo.supabase.co");
    }
}
