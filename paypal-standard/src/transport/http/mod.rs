//! HTTP postback transport using reqwest.

use std::{sync::LazyLock, time::Duration};

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::{
    config::PostbackConfig,
    error::{IntegrationError, Result},
    transport::{PostbackRequest, PostbackResponse, PostbackTransport},
};

/// Default HTTP client, shared so default transports reuse one connection pool.
static DEFAULT_HTTP_CLIENT: LazyLock<std::result::Result<Client, String>> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| e.to_string())
});

/// Ensures the postback goes over HTTPS.
fn validate_url(url: &Url) -> Result<()> {
    if url.scheme() != "https" {
        return Err(IntegrationError::InvalidConfig(
            "verification URL must use HTTPS".to_owned(),
        ));
    }
    if url.host_str().is_none() {
        return Err(IntegrationError::InvalidConfig(format!("verification URL missing host: {url}")));
    }
    Ok(())
}

/// Validates header name and value for CRLF injection prevention.
fn validate_header(name: &str, value: &str) -> Result<()> {
    if name.contains(['\r', '\n', '\0']) {
        return Err(IntegrationError::InvalidConfig(
            "invalid header name: control characters not allowed".to_owned(),
        ));
    }
    if value.contains(['\r', '\n', '\0']) {
        return Err(IntegrationError::InvalidConfig(
            "invalid header value: control characters not allowed".to_owned(),
        ));
    }
    Ok(())
}

/// Sends postbacks over HTTPS.
///
/// # Examples
///
/// ```
/// use paypal_standard::{config::PostbackConfig, transport::HttpPostbackTransport};
///
/// let config = PostbackConfig { timeout_secs: 15, ..PostbackConfig::default() };
/// let transport = HttpPostbackTransport::with_config(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpPostbackTransport {
    client: Client,
}

impl HttpPostbackTransport {
    /// Creates a transport on the shared default client (30s timeout, 10s connect timeout).
    ///
    /// # Errors
    ///
    /// Returns error if the TLS backend could not be initialized.
    pub fn new() -> Result<Self> {
        let client = DEFAULT_HTTP_CLIENT.as_ref().map_err(|e| {
            IntegrationError::InvalidConfig(format!("cannot create HTTP client: {e}"))
        })?;
        Ok(Self { client: client.clone() })
    }

    /// Creates a transport with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn with_config(config: &PostbackConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self { client })
    }

    #[instrument(skip(self, request), fields(url = request.url, body_len = request.body.len()))]
    async fn execute(&self, request: PostbackRequest<'_>) -> Result<PostbackResponse> {
        let url = Url::parse(request.url).map_err(|e| {
            IntegrationError::InvalidConfig(format!("invalid verification URL: {e}"))
        })?;
        validate_url(&url)?;

        for (name, value) in &request.headers {
            validate_header(name, value)?;
        }

        // reqwest sets Content-Length from the sized body.
        let mut builder =
            self.client.post(url).header("Content-Type", "application/x-www-form-urlencoded");
        for (name, value) in request.headers {
            if !name.eq_ignore_ascii_case("Content-Length") {
                builder = builder.header(name, value);
            }
        }

        let response = builder.body(request.body.to_vec()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!(status, response_len = body.len(), "postback answered");
        Ok(PostbackResponse { status, body })
    }
}

impl PostbackTransport for HttpPostbackTransport {
    async fn post<'a>(&'a self, request: PostbackRequest<'a>) -> Result<PostbackResponse> {
        self.execute(request).await
    }
}
