//! HTTP client with transparent retry for transient upstream failures.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::response::ResponseEnvelope;
use crate::transport::retry::{retry_delay, RATE_LIMIT_RESET_HEADER};
use crate::transport::spec::{append_query, RequestSpec};

/// Client-level transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL prefixed to relative request paths.
    pub base_url: String,
    /// Headers applied to every request; per-request headers win on conflict.
    pub default_headers: BTreeMap<String, String>,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Additional attempts after the first.
    pub max_retries: u32,
    /// Base delay for the 502/503/504 exponential backoff.
    pub base_backoff: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_headers: BTreeMap::new(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            base_backoff: Duration::from_millis(500),
        }
    }
}

impl TransportConfig {
    /// Create a configuration rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Add a default header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Set the whole-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry cap (additional attempts after the first).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base delay for the gateway-error backoff.
    pub fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }
}

/// Issues logical requests, absorbing transient upstream failures.
///
/// Holds no per-request state; one client is shared freely across calls.
#[derive(Debug, Clone)]
pub struct TransportClient {
    http: reqwest::Client,
    config: TransportConfig,
}

impl TransportClient {
    /// Build a client from the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Issue one logical request.
    ///
    /// An HTTP status never produces an error here: 429 waits out the rate
    /// limit and 502/503/504 back off exponentially, up to the configured
    /// cap, after which the last response is returned as-is. The error arm
    /// is reserved for requests that never produced a response at all
    /// (connect failures, DNS, socket timeouts).
    pub async fn request(&self, spec: &RequestSpec) -> Result<ResponseEnvelope> {
        let mut attempt = 0u32;
        loop {
            let envelope = self.execute_once(spec).await?;
            if envelope.is_success() || attempt >= self.config.max_retries {
                return Ok(envelope);
            }
            let reset = envelope.header(RATE_LIMIT_RESET_HEADER);
            let delay = match retry_delay(envelope.status, reset, attempt, self.config.base_backoff)
            {
                Some(delay) => delay,
                None => return Ok(envelope),
            };
            debug!(
                status = envelope.status,
                attempt,
                delay_ms = delay.as_millis() as u64,
                path = %spec.path,
                "retrying transient upstream failure"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Like [`Self::request`], but a final status outside 200-299 becomes an
    /// [`Error::UpstreamStatus`] carrying the envelope.
    pub async fn request_checked(&self, spec: &RequestSpec) -> Result<ResponseEnvelope> {
        let envelope = self.request(spec).await?;
        if envelope.is_success() {
            Ok(envelope)
        } else {
            Err(Error::UpstreamStatus {
                envelope: Box::new(envelope),
            })
        }
    }

    async fn execute_once(&self, spec: &RequestSpec) -> Result<ResponseEnvelope> {
        let url = self.build_url(spec)?;
        let mut request = self.http.request(spec.method.clone(), url);
        for (name, value) in self.merged_headers(spec) {
            request = request.header(&name, &value);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }
        if let Some(timeout) = spec.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.as_str().to_ascii_lowercase(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(ResponseEnvelope {
            status,
            headers,
            body,
        })
    }

    fn build_url(&self, spec: &RequestSpec) -> Result<Url> {
        let raw = if spec.path.starts_with("http://") || spec.path.starts_with("https://") {
            spec.path.clone()
        } else {
            format!(
                "{}/{}",
                self.config.base_url.trim_end_matches('/'),
                spec.path.trim_start_matches('/')
            )
        };
        let mut url = Url::parse(&raw).map_err(|e| Error::InvalidUrl {
            path: spec.path.clone(),
            detail: e.to_string(),
        })?;
        append_query(&mut url, &spec.query);
        Ok(url)
    }

    fn merged_headers(&self, spec: &RequestSpec) -> BTreeMap<String, String> {
        let mut headers = self.config.default_headers.clone();
        for (name, value) in &spec.headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}
