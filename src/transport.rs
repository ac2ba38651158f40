//! HTTP transport
//!
//! A single trait seam over reqwest so the API clients can be exercised
//! offline. Every call is one attempt: failures surface to the caller and
//! freshness is the cache layer's problem, so the transport never retries.

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .expect("reqwest client")
    })
}

/// JSON over HTTP as the API clients consume it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value>;
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value>;
}

/// reqwest-backed transport sharing one lazily-built client per process.
pub struct HttpTransport {
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let res = http_client()
            .get(url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        if !res.status().is_success() {
            bail!("http {} from {url}", res.status());
        }
        res.json()
            .await
            .with_context(|| format!("decoding GET {url}"))
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let res = http_client()
            .post(url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        if !res.status().is_success() {
            bail!("http {} from {url}", res.status());
        }
        res.json()
            .await
            .with_context(|| format!("decoding POST {url}"))
    }
}
