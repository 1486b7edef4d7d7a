//! HTTP transport implementation using reqwest.
//!
//! Sends requests exactly as the client prepared them: headers are copied
//! verbatim and text bodies are sent as-is. Relative URLs (the default API
//! root is `/api`) are resolved against a configured origin.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use peach_application::ClientConfig;
use peach_application::ports::{HttpTransport, TransportError};
use peach_domain::{ApiRequest, Header, Headers, HttpMethod, RawResponse, RequestBody};
use reqwest::{Client, Method, Url};

const MAX_REDIRECTS: usize = 10;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    origin: Option<Url>,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport for the given client configuration.
    ///
    /// Default settings:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "peach-client/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("peach-client/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self::with_client(client, config))
    }

    /// Creates a transport around an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            origin: config.origin.clone(),
            timeout_ms: config.timeout_ms,
        }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Resolves the request URL, joining relative paths onto the origin.
    fn resolve_url(&self, url: &str) -> Result<Url, TransportError> {
        match Url::parse(url) {
            Ok(parsed) => Ok(parsed),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let origin = self.origin.as_ref().ok_or_else(|| {
                    TransportError::InvalidUrl(format!("relative URL without origin: {url}"))
                })?;
                origin
                    .join(url)
                    .map_err(|e| TransportError::InvalidUrl(format!("{e}: {url}")))
            }
            Err(e) => Err(TransportError::InvalidUrl(format!("{e}: {url}"))),
        }
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let url = self.resolve_url(&request.url)?;
        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(self.timeout_ms));

        for header in request.headers.iter() {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }

        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Text(text) => builder.body(text.clone()),
            // Only reachable if the augmenter was bypassed.
            RequestBody::Json(value) => builder.body(value.to_string()),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(k, v)| Header::new(k.as_str(), v.to_str().unwrap_or("<binary>")))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?
            .to_vec();

        let duration = start.elapsed();
        tracing::trace!(
            request_id = %request.id,
            status,
            bytes = body.len(),
            "transport response"
        );

        Ok(RawResponse::new(status, headers, body, duration))
    }
}
