// Gateway HTTP client: one JSON request/response per call.
// No retries; transport defaults for timeouts.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::simulator::endpoints::Endpoint;

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:9000";

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Gateway base URL concatenated with an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// WebSocket URL for a streaming endpoint (`http` → `ws`, `https` → `wss`).
    pub fn stream_url(&self, endpoint: &Endpoint) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint_url(endpoint.path))
            .with_context(|| format!("invalid stream url for {}", endpoint.path))?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => bail!("unsupported gateway scheme: {}", other),
        };
        if url.set_scheme(scheme).is_err() {
            bail!("cannot switch {} to {}", url, scheme);
        }
        Ok(url)
    }

    /// Send `body` as JSON to `endpoint` and return the raw response body.
    ///
    /// Only transport failures are errors. A non-2xx status is returned as a
    /// normal body, callers decide whether they care.
    pub async fn execute<B>(&self, endpoint: &Endpoint, body: &B, bearer: Option<&str>) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(endpoint.path);

        let mut request = self.client.request(endpoint.method.clone(), &url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .with_context(|| format!("{} {} failed", endpoint.method, url))?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, %url, "gateway returned non-success status");
        }

        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("failed to read response body from {}", url))?;

        Ok(bytes.to_vec())
    }
}
