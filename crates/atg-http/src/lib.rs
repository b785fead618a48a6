//! Bot API HTTP adapter (reqwest).
//!
//! Implements the `atg-core` [`Gateway`] port: POSTs JSON parameters to
//! `{base}/bot{token}/{method}` and hands the raw envelope back for decoding.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use atg_core::{config::Config, errors::Error, gateway::Gateway, Result};

#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl HttpGateway {
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.bot_token.clone(),
            cfg.api_base_url.clone(),
            cfg.request_timeout,
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    // The request URL embeds the token, so it is stripped from the error.
    fn map_err(e: reqwest::Error) -> Error {
        Error::Transport(format!("bot api request failed: {}", e.without_url()))
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .field("token", &mask_token(&self.token))
            .finish()
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn call(&self, method: &str, params: Value) -> Result<String> {
        let resp = self
            .http
            .post(self.method_url(method))
            .json(&params)
            .send()
            .await
            .map_err(Self::map_err)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Self::map_err)?;

        // Error statuses still carry an `ok: false` envelope; the decoder reports it.
        if !status.is_success() {
            tracing::debug!(method, %status, "bot api returned error status");
        }
        Ok(body)
    }
}

/// Mask a bot token for logging: keeps the numeric bot id, hides the secret.
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{id}:***")
        }
        _ => "***".to_string(),
    }
}
