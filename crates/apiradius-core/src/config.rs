// ── Runtime provider configuration ──
//
// These types describe *how* to reach the REST API. They carry credential
// data and connection tuning, but never touch disk. The CLI constructs a
// `ProviderConfig` (via apiradius-config) and hands it in.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, info};
use url::Url;

use apiradius_api::{ApiClient, ClientOptions, OAuthCredentials, TransportConfig};

use crate::error::CoreError;
use crate::model::PROFILE_ID_PATTERN;

/// OAuth2 client-credentials settings.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub token_endpoint: Url,
    pub scopes: Vec<String>,
    /// Extra form fields sent with every grant request (e.g. `audience`).
    pub endpoint_params: Vec<(String, String)>,
}

/// Configuration for one provider instance.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URI every path is joined onto.
    pub uri: Url,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Per-request timeout in seconds. 0 = none.
    pub timeout_secs: u64,
    /// Requests-per-second ceiling. `None` or infinity = unbounded.
    pub rate_limit: Option<f64>,
    /// Log request and response bodies.
    pub debug: bool,
    pub oauth: Option<OAuthConfig>,
    /// Operator that owns the managed profiles.
    pub operator: String,
    /// Attribute holding the object id in API responses. `None` = `id`.
    pub id_attribute: Option<String>,
    /// Keys copied from the server's state into every update payload.
    pub copy_keys: Vec<String>,
    /// Path probed with a GET when connecting.
    pub test_path: Option<String>,
}

impl ProviderConfig {
    /// Minimal configuration: unbounded, unauthenticated, strict TLS.
    pub fn new(uri: Url, operator: impl Into<String>) -> Self {
        Self {
            uri,
            insecure: false,
            timeout_secs: 0,
            rate_limit: None,
            debug: false,
            oauth: None,
            operator: operator.into(),
            id_attribute: None,
            copy_keys: Vec::new(),
            test_path: None,
        }
    }

    /// Check every field that can be checked without the network.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !matches!(self.uri.scheme(), "http" | "https") || self.uri.cannot_be_a_base() {
            return Err(CoreError::validation(
                "uri",
                format!("must be an absolute http(s) URI, got {}", self.uri),
            ));
        }

        if let Some(rate) = self.rate_limit {
            if rate.is_nan() || rate <= 0.0 {
                return Err(CoreError::validation(
                    "rate_limit",
                    format!("must be a positive number of requests per second, got {rate}"),
                ));
            }
        }

        if !PROFILE_ID_PATTERN.is_match(&self.operator) {
            return Err(CoreError::validation(
                "operator",
                format!("'{}' must match {}", self.operator, PROFILE_ID_PATTERN.as_str()),
            ));
        }

        if self.id_attribute.as_deref().is_some_and(|a| a.trim().is_empty()) {
            return Err(CoreError::validation("id_attribute", "must not be blank"));
        }

        if let Some(oauth) = &self.oauth {
            if oauth.client_id.trim().is_empty() {
                return Err(CoreError::validation("oauth.client_id", "must not be blank"));
            }
            if !matches!(oauth.token_endpoint.scheme(), "http" | "https") {
                return Err(CoreError::validation(
                    "oauth.token_endpoint",
                    format!("must be an http(s) URL, got {}", oauth.token_endpoint),
                ));
            }
        }

        Ok(())
    }

    /// Lower into the transport layer's options.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.uri.clone(),
            transport: TransportConfig::from_flags(self.insecure, self.timeout_secs),
            rate_limit: self.rate_limit,
            debug: self.debug,
            oauth: self.oauth.as_ref().map(|o| OAuthCredentials {
                client_id: o.client_id.clone(),
                client_secret: o.client_secret.clone(),
                token_endpoint: o.token_endpoint.clone(),
                scopes: o.scopes.clone(),
                endpoint_params: o.endpoint_params.clone(),
            }),
        }
    }

    /// Validate, build the shared client and run the connectivity probe.
    pub async fn connect(&self) -> Result<Arc<ApiClient>, CoreError> {
        self.validate()?;
        let client = ApiClient::new(self.client_options())?;

        if let Some(path) = &self.test_path {
            debug!(path, "probing API");
            client.probe(path).await?;
            info!(uri = %self.uri, "API reachable");
        }

        Ok(Arc::new(client))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig::new(Url::parse("http://127.0.0.1:8085/").unwrap(), "acme")
    }

    #[test]
    fn default_config_is_valid() {
        config().validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_rate_limit() {
        for rate in [0.0, -1.0, f64::NAN] {
            let mut cfg = config();
            cfg.rate_limit = Some(rate);
            assert!(matches!(
                cfg.validate(),
                Err(CoreError::Validation { ref field, .. }) if field == "rate_limit"
            ));
        }
    }

    #[test]
    fn rejects_malformed_operator() {
        let mut cfg = config();
        cfg.operator = "Acme Corp".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_http_uri() {
        let mut cfg = config();
        cfg.uri = Url::parse("ftp://example.com/").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn lowers_into_client_options() {
        let mut cfg = config();
        cfg.insecure = true;
        cfg.timeout_secs = 5;
        cfg.rate_limit = Some(2.5);

        let opts = cfg.client_options();
        assert_eq!(opts.rate_limit, Some(2.5));
        assert_eq!(opts.transport.timeout, Some(std::time::Duration::from_secs(5)));
        assert!(opts.oauth.is_none());
    }
}
