//! Configuration for the apiradius CLI.
//!
//! One TOML file merged with `REST_API_*` environment variables, secret
//! resolution (env var or plaintext), and translation to
//! `apiradius_core::ProviderConfig`. The CLI layers its flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use apiradius_core::{CoreError, OAuthConfig, ProviderConfig};

/// Prefix of every environment variable the loader reads.
pub const ENV_PREFIX: &str = "REST_API_";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{field} is not configured (set it in the config file or {env})")]
    Missing { field: String, env: String },

    #[error("no client secret configured for OAuth client '{client_id}'")]
    NoCredentials { client_id: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Base URI of the REST API.
    pub uri: Option<String>,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds. 0 = none.
    #[serde(default)]
    pub timeout: u64,

    /// Requests per second. Absent = unbounded.
    pub rate_limit: Option<f64>,

    #[serde(default)]
    pub debug: bool,

    /// Operator whose profiles are managed.
    pub operator: Option<String>,

    pub id_attribute: Option<String>,

    /// TOML array, or a comma-separated string (`REST_API_COPY_KEYS=a,b`).
    #[serde(default, deserialize_with = "list_or_csv")]
    pub copy_keys: Vec<String>,

    /// Probed with a GET before any other request.
    pub test_path: Option<String>,

    pub oauth: Option<OAuthSection>,
}

/// `[oauth]` table: client-credentials grant settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OAuthSection {
    pub client_id: String,

    /// Client secret (plaintext, prefer `client_secret_env`).
    pub client_secret: Option<String>,

    /// Environment variable name containing the client secret.
    pub client_secret_env: Option<String>,

    pub token_endpoint: String,

    #[serde(default, deserialize_with = "list_or_csv")]
    pub scopes: Vec<String>,

    /// Extra form fields sent with the grant request.
    #[serde(default)]
    pub endpoint_params: BTreeMap<String, String>,
}

fn list_or_csv<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items,
        ListOrCsv::Csv(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect(),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "apiradius", "apiradius").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("apiradius");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file is not an error.
///
/// Nested keys use a double underscore: `REST_API_OAUTH__CLIENT_ID`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Copy with every secret replaced, for display.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if let Some(oauth) = cfg.oauth.as_mut() {
            if oauth.client_secret.is_some() {
                oauth.client_secret = Some(REDACTED.into());
            }
        }
        cfg
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate and build the runtime provider configuration.
    pub fn to_provider_config(&self) -> Result<ProviderConfig, ConfigError> {
        let raw_uri = self.uri.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "uri".into(),
            env: format!("{ENV_PREFIX}URI"),
        })?;
        let uri = parse_url("uri", raw_uri)?;

        let operator = self.operator.clone().ok_or_else(|| ConfigError::Missing {
            field: "operator".into(),
            env: format!("{ENV_PREFIX}OPERATOR"),
        })?;

        let oauth = self.oauth.as_ref().map(resolve_oauth).transpose()?;

        let config = ProviderConfig {
            uri,
            insecure: self.insecure,
            timeout_secs: self.timeout,
            rate_limit: self.rate_limit,
            debug: self.debug,
            oauth,
            operator,
            id_attribute: self.id_attribute.clone(),
            copy_keys: self.copy_keys.clone(),
            test_path: self.test_path.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Resolve the client secret: named env var first, then plaintext.
pub fn resolve_client_secret(oauth: &OAuthSection) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = oauth.client_secret_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref secret) = oauth.client_secret {
        return Ok(SecretString::from(secret.clone()));
    }

    Err(ConfigError::NoCredentials {
        client_id: oauth.client_id.clone(),
    })
}

fn resolve_oauth(oauth: &OAuthSection) -> Result<OAuthConfig, ConfigError> {
    Ok(OAuthConfig {
        client_id: oauth.client_id.clone(),
        client_secret: resolve_client_secret(oauth)?,
        token_endpoint: parse_url("oauth.token_endpoint", &oauth.token_endpoint)?,
        scopes: oauth.scopes.clone(),
        endpoint_params: oauth
            .endpoint_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    })
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must not be empty".into(),
        });
    }
    raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use secrecy::ExposeSecret;

    const FILE: &str = r#"
        uri = "http://127.0.0.1:8085/"
        operator = "acme"
        timeout = 15
        rate_limit = 4.0
        copy_keys = ["description"]

        [oauth]
        client_id = "radius-cli"
        client_secret = "from-file"
        token_endpoint = "http://127.0.0.1:8085/oauth/token"
        scopes = ["profiles:read"]
        endpoint_params = { audience = "radius" }
    "#;

    #[test]
    fn loads_file_and_builds_provider_config() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", FILE)?;
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            let provider = cfg.to_provider_config().unwrap();

            assert_eq!(provider.uri.as_str(), "http://127.0.0.1:8085/");
            assert_eq!(provider.operator, "acme");
            assert_eq!(provider.timeout_secs, 15);
            assert_eq!(provider.rate_limit, Some(4.0));
            assert_eq!(provider.copy_keys, vec!["description".to_owned()]);

            let oauth = provider.oauth.unwrap();
            assert_eq!(oauth.client_secret.expose_secret(), "from-file");
            assert_eq!(
                oauth.endpoint_params,
                vec![("audience".to_owned(), "radius".to_owned())]
            );
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", FILE)?;
            jail.set_env("REST_API_OPERATOR", "other_op");
            jail.set_env("REST_API_RATE_LIMIT", "2.5");
            jail.set_env("REST_API_OAUTH__CLIENT_ID", "env-client");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.operator.as_deref(), Some("other_op"));
            assert_eq!(cfg.rate_limit, Some(2.5));
            assert_eq!(cfg.oauth.unwrap().client_id, "env-client");
            Ok(())
        });
    }

    #[test]
    fn comma_separated_lists_from_environment() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", FILE)?;
            jail.set_env("REST_API_COPY_KEYS", "description, weight");
            jail.set_env("REST_API_OAUTH__SCOPES", "profiles:read,profiles:write");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.copy_keys, vec!["description".to_owned(), "weight".to_owned()]);
            assert_eq!(
                cfg.oauth.unwrap().scopes,
                vec!["profiles:read".to_owned(), "profiles:write".to_owned()]
            );
            Ok(())
        });
    }

    #[test]
    fn bracketed_list_from_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("REST_API_COPY_KEYS", "[description,weight]");
            let cfg = load_config_from(Path::new("missing.toml")).unwrap();
            assert_eq!(cfg.copy_keys, vec!["description".to_owned(), "weight".to_owned()]);
            Ok(())
        });
    }

    #[test]
    fn environment_alone_is_enough() {
        Jail::expect_with(|jail| {
            jail.set_env("REST_API_URI", "https://radius.example.com/api");
            jail.set_env("REST_API_OPERATOR", "acme");
            jail.set_env("REST_API_INSECURE", "true");

            let provider = load_config_from(Path::new("missing.toml"))
                .unwrap()
                .to_provider_config()
                .unwrap();
            assert!(provider.insecure);
            assert!(provider.oauth.is_none());
            Ok(())
        });
    }

    #[test]
    fn secret_env_takes_precedence() {
        Jail::expect_with(|jail| {
            jail.set_env("RADIUS_CLIENT_SECRET", "from-env");
            let section = OAuthSection {
                client_id: "c".into(),
                client_secret: Some("from-file".into()),
                client_secret_env: Some("RADIUS_CLIENT_SECRET".into()),
                token_endpoint: "http://localhost/token".into(),
                ..OAuthSection::default()
            };
            let secret = resolve_client_secret(&section).unwrap();
            assert_eq!(secret.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn missing_secret_is_an_error() {
        let section = OAuthSection {
            client_id: "c".into(),
            token_endpoint: "http://localhost/token".into(),
            ..OAuthSection::default()
        };
        assert!(matches!(
            resolve_client_secret(&section),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn missing_uri_names_env_var() {
        let err = Config::default().to_provider_config().unwrap_err();
        assert!(err.to_string().contains("REST_API_URI"));
    }

    #[test]
    fn invalid_rate_limit_is_rejected() {
        let cfg = Config {
            uri: Some("http://localhost/".into()),
            operator: Some("acme".into()),
            rate_limit: Some(0.0),
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_provider_config(),
            Err(ConfigError::Core(CoreError::Validation { .. }))
        ));
    }

    #[test]
    fn redacted_hides_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, FILE).unwrap();

        let shown = load_config_from(&path).unwrap().redacted().to_toml().unwrap();
        assert!(shown.contains(REDACTED));
        assert!(!shown.contains("from-file"));
    }
}
