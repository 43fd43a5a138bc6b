// OAuth2 client-credentials token lifecycle.
//
// Tokens are fetched on demand, cached until shortly before expiry, and
// refreshed proactively. The cache lock is held across the grant request so
// concurrent callers during an expired window produce exactly one grant.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Tokens are treated as expired this many seconds before their stated expiry.
const EXPIRY_LEEWAY_SECS: i64 = 10;

/// Client-credentials grant configuration.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub token_endpoint: Url,
    pub scopes: Vec<String>,
    /// Extra form fields sent with every grant request (e.g. `audience`).
    pub endpoint_params: Vec<(String, String)>,
}

/// A bearer token with its expiry and granted scopes.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: SecretString,
    /// `None` when the grant response omitted `expires_in`; such tokens never expire.
    pub expires_at: Option<DateTime<Utc>>,
    pub scopes: Vec<String>,
}

impl AccessToken {
    /// Whether this token must not be presented at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= now + TimeDelta::seconds(EXPIRY_LEEWAY_SECS))
    }
}

/// Token endpoint response shape (RFC 6749 section 5.1).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Caches and refreshes OAuth2 client-credentials tokens.
///
/// Shared by every request of one client; lives as long as the provider
/// configuration it was built from.
#[derive(Debug)]
pub struct TokenManager {
    credentials: OAuthCredentials,
    http: reqwest::Client,
    cache: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    /// Build a manager with its own HTTP client from the shared transport config.
    pub fn new(credentials: OAuthCredentials, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::with_client(credentials, transport.build_client()?))
    }

    /// Build a manager around an existing `reqwest::Client`.
    pub fn with_client(credentials: OAuthCredentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            http,
            cache: Mutex::new(None),
        }
    }

    /// Return a currently valid access token, granting a new one if needed.
    pub async fn get_token(&self) -> Result<AccessToken, Error> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if !token.is_expired_at(Utc::now()) {
                return Ok(token.clone());
            }
            debug!("cached access token expired, refreshing");
        }

        let token = self.grant().await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token. The next `get_token()` performs a fresh grant.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    async fn grant(&self) -> Result<AccessToken, Error> {
        let creds = &self.credentials;
        info!(endpoint = %creds.token_endpoint, "requesting client-credentials token");

        let scope = creds.scopes.join(" ");
        let mut form: Vec<(&str, &str)> = vec![("grant_type", "client_credentials")];
        if !creds.scopes.is_empty() {
            form.push(("scope", &scope));
        }
        form.extend(
            creds
                .endpoint_params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        let resp = self
            .http
            .post(creds.token_endpoint.clone())
            .basic_auth(&creds.client_id, Some(creds.client_secret.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("token request failed: {e}"),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Authentication {
            message: format!("failed to read token response: {e}"),
        })?;

        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("token endpoint returned HTTP {status}: {body}"),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Authentication {
                message: format!("unparsable token response: {e}"),
            })?;

        if let Some(kind) = parsed.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                debug!(token_type = kind, "token endpoint returned non-bearer token type");
            }
        }

        let scopes = parsed.scope.map_or_else(
            || creds.scopes.clone(),
            |s| s.split_whitespace().map(str::to_owned).collect(),
        );

        Ok(AccessToken {
            token: SecretString::from(parsed.access_token),
            expires_at: parsed
                .expires_in
                .and_then(TimeDelta::try_seconds)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl)),
            scopes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: Option<DateTime<Utc>>) -> AccessToken {
        AccessToken {
            token: SecretString::from("t".to_owned()),
            expires_at,
            scopes: Vec::new(),
        }
    }

    #[test]
    fn past_expiry_is_expired() {
        let now = Utc::now();
        assert!(token(Some(now - TimeDelta::seconds(1))).is_expired_at(now));
        assert!(token(Some(now)).is_expired_at(now));
    }

    #[test]
    fn expiry_inside_leeway_is_expired() {
        let now = Utc::now();
        assert!(token(Some(now + TimeDelta::seconds(5))).is_expired_at(now));
        assert!(!token(Some(now + TimeDelta::seconds(60))).is_expired_at(now));
    }

    #[test]
    fn token_without_expiry_never_expires() {
        assert!(!token(None).is_expired_at(Utc::now()));
    }
}
