// HTTP transport for the REST object model.
//
// Wraps `reqwest::Client` with base-URI joining, bearer token injection,
// rate limiting and debug body logging. Status interpretation is left to
// the caller: `send` returns the status and raw body for every response
// that made it back over the wire.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use tracing::debug;
use url::Url;

use crate::auth::{OAuthCredentials, TokenManager};
use crate::error::Error;
use crate::rate_limit::RateLimiter;
use crate::transport::TransportConfig;

/// Everything needed to build an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base of every request path. Must be absolute.
    pub base_url: Url,
    pub transport: TransportConfig,
    /// Requests per second; `None` is unbounded.
    pub rate_limit: Option<f64>,
    /// Log request and response bodies.
    pub debug: bool,
    pub oauth: Option<OAuthCredentials>,
}

/// Status and body of a response that came back over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Convert a non-success response into [`Error::Api`].
    pub fn into_api_error(self) -> Error {
        Error::Api {
            status: self.status.as_u16(),
            body: self.body,
        }
    }
}

/// Authenticated, rate-limited HTTP client against one base URI.
///
/// One instance is shared (behind `Arc`) by every object operation of a
/// provider configuration. The rate limiter and token cache are the only
/// state it carries between requests.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    limiter: RateLimiter,
    tokens: Option<Arc<TokenManager>>,
    debug: bool,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build the HTTP client, rate limiter and (optional) token manager.
    pub fn new(options: ClientOptions) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(options.base_url.as_str())?;
        let http = options.transport.build_client()?;
        let limiter = RateLimiter::new(options.rate_limit)?;
        let tokens = options
            .oauth
            .map(|creds| TokenManager::new(creds, &options.transport).map(Arc::new))
            .transpose()?;

        Ok(Self {
            http,
            base_url,
            limiter,
            tokens,
            debug: options.debug,
        })
    }

    /// Wrap an existing `reqwest::Client`: unbounded and unauthenticated.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            limiter: RateLimiter::unbounded(),
            tokens: None,
            debug: false,
        })
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_token_manager(mut self, tokens: Arc<TokenManager>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        if raw.trim().is_empty() {
            return Err(Error::validation("uri", "must not be empty"));
        }
        let url = Url::parse(raw)?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(Error::validation(
                "uri",
                format!("must be an absolute http(s) URI, got {raw}"),
            ));
        }
        Ok(url)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token_manager(&self) -> Option<&Arc<TokenManager>> {
        self.tokens.as_ref()
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join `path` onto the base URI with exactly one `/` at the seam.
    ///
    /// Plain concatenation rather than RFC 3986 resolution: a base of
    /// `https://host/api` and a path of `/profile` yields
    /// `https://host/api/profile`.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Send ─────────────────────────────────────────────────────────

    /// Issue one request and return the status and raw body.
    ///
    /// `operation` tags the log lines with the calling operation. Network
    /// failures come back as [`Error::Transport`] and are never retried here.
    pub async fn send(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> Result<RawResponse, Error> {
        let url = self.url(path)?;
        let mut req = self.http.request(method.clone(), url.clone());

        if let Some(body) = body {
            if self.debug {
                debug!(operation, %method, %url, body, "request body");
            }
            req = req
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body.to_owned());
        }

        self.limiter.acquire().await;

        // The token is fetched after the limiter wait so it is checked
        // against the moment of dispatch.
        if let Some(tokens) = &self.tokens {
            let token = tokens.get_token().await?;
            req = req.bearer_auth(token.token.expose_secret());
        }

        debug!(operation, "{method} {url}");
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        debug!(operation, status = status.as_u16(), "{method} {url} completed");
        if self.debug {
            debug!(operation, body = body.as_str(), "response body");
        }

        Ok(RawResponse { status, body })
    }

    /// GET `path` and fail unless it answers with a success status.
    ///
    /// Used as a connectivity check when a provider is configured.
    pub async fn probe(&self, path: &str) -> Result<(), Error> {
        let resp = self.send("probe", Method::GET, path, None).await?;
        if resp.is_success() {
            Ok(())
        } else {
            Err(resp.into_api_error())
        }
    }
}
