use rand::prelude::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, ClientBuilder, Proxy};
use serde_json::Value;
use std::time::Duration;

/// Browser User-Agent pool rotated per request when the caller did not
/// pin one via a custom header.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// HTTP client for the analysis service: request timeout, optional proxy,
/// caller-supplied default headers.
pub struct AnalysisClient {
    inner: Client,
    request_timeout: Duration,
    default_headers: HeaderMap,
}

impl AnalysisClient {
    pub fn new(
        timeout_seconds: u64,
        proxy_url: Option<&str>,
        custom_headers: &[(String, String)],
    ) -> Self {
        let request_timeout = Duration::from_secs(timeout_seconds);

        let mut builder = ClientBuilder::new()
            .timeout(request_timeout)
            .danger_accept_invalid_certs(true);

        if let Some(proxy) = proxy_url {
            if let Ok(p) = Proxy::all(proxy) {
                builder = builder.proxy(p);
            }
        }

        Self {
            inner: builder.build().expect("failed to build reqwest client"),
            request_timeout,
            default_headers: build_header_map(custom_headers),
        }
    }

    /// POSTs a JSON body and returns the response body as a JSON value.
    /// A body that is not valid JSON comes back as a JSON string so the
    /// tolerant decoder's bare-string path can still work on it.
    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value, reqwest::Error> {
        let mut request = self
            .inner
            .post(url)
            .header(ACCEPT, "application/json")
            .timeout(self.request_timeout);

        for (name, value) in self.default_headers.iter() {
            request = request.header(name, value);
        }
        if !self.default_headers.contains_key(USER_AGENT) {
            request = request.header(USER_AGENT, random_user_agent());
        }

        let response = request.json(body).send().await?.error_for_status()?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

fn build_header_map(custom_headers: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (key, val) in custom_headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(val),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    *USER_AGENTS.choose(&mut rng).unwrap_or(&"Mozilla/5.0")
}
