//! Request dispatcher for worker calls.
//!
//! Every request carries `Content-Type: application/json` and every response
//! body is parsed as JSON. Transport and parse failures never propagate: they
//! come back as an `{"error": "<message>"}` reply, the same shape a worker
//! uses to report its own errors. No retries, no timeouts.

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, USER_AGENT as USER_AGENT_HEADER};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Standard User-Agent header for mxc requests.
pub const USER_AGENT: &str = concat!("mxc/", env!("CARGO_PKG_VERSION"));

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Parsed JSON reply from a worker, or a synthesized failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply(Value);

impl ApiReply {
    /// Creates the uniform failure reply.
    pub fn failure(message: impl Into<String>) -> Self {
        Self(json!({ "error": message.into() }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns a displayable field, skipping missing, null, `false`, zero and empty values.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// The `error` field, whether synthesized or reported by the worker.
    pub fn error(&self) -> Option<String> {
        self.field("error")
    }

    /// Returns `key`, else the error text, else `fallback`.
    pub fn field_or_error(&self, key: &str, fallback: &str) -> String {
        self.field(key)
            .or_else(|| self.error())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Two-space indented JSON.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

/// HTTP dispatcher shared by all console actions.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    http: reqwest::Client,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a request and parses the reply; failures become `{"error": ...}`.
    pub async fn send(&self, method: Method, url: &str, payload: Option<&Value>) -> ApiReply {
        match self.try_send(method, url, payload).await {
            Ok(value) => ApiReply::from_value(value),
            Err(e) => {
                warn!(?method, url, error = %format!("{e:#}"), "request failed");
                ApiReply::failure(format!("{e:#}"))
            }
        }
    }

    pub async fn get(&self, url: &str) -> ApiReply {
        self.send(Method::Get, url, None).await
    }

    pub async fn post(&self, url: &str, payload: &Value) -> ApiReply {
        self.send(Method::Post, url, Some(payload)).await
    }

    /// Fetches a plain-text body.
    ///
    /// # Errors
    /// Returns an error if the request fails or the body cannot be read.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET text");
        let response = self
            .http
            .get(url)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .send()
            .await
            .with_context(|| format!("request {url}"))?;
        response.text().await.context("read response body")
    }

    async fn try_send(&self, method: Method, url: &str, payload: Option<&Value>) -> Result<Value> {
        let builder = match method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
        };
        let mut builder = builder
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(USER_AGENT_HEADER, USER_AGENT);
        if let Some(body) = payload {
            builder = builder.json(body);
        }

        debug!(?method, url, "dispatching request");
        let response = builder
            .send()
            .await
            .with_context(|| format!("request {url}"))?;
        let status = response.status();
        debug!(?method, url, %status, "response received");

        response
            .json::<Value>()
            .await
            .with_context(|| format!("parse response from {url} (status {status})"))
    }
}
