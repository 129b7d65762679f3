use crate::config::HttpSettings;
use crate::transport::TransportError;
use reqwest::Proxy;
use std::time::Duration;
use tracing::debug;

/// Stateless, pooled HTTP caller. One instance is shared by every adapter and
/// is safe to use from concurrent dispatches.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

/// Status and body of a completed exchange. Non-2xx statuses are not errors at
/// this layer; adapters decide what they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl HttpTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .pool_idle_timeout(Some(Duration::from_secs(settings.pool_idle_timeout_secs)))
            // Conservative HTTP/2 keepalive defaults for long-lived connections.
            .http2_adaptive_window(true)
            .http2_keep_alive_interval(Some(Duration::from_secs(30)))
            .http2_keep_alive_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = settings.proxy_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| TransportError::Other(format!("invalid proxy url: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing client (custom TLS, test doubles).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// POST a pre-serialized JSON body and read the whole response.
    ///
    /// The future is cancel-safe in the sense that dropping it aborts the
    /// in-flight request.
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<RawResponse, TransportError> {
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.body(body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(url, http_status = status, body_len = body.len(), "upstream responded");

        Ok(RawResponse { status, body })
    }
}
