// Shared transport configuration for building reqwest::Client instances.
//
// The REST client and the OAuth token manager share TLS and timeout
// settings through this module, so both honor the same `insecure` and
// `timeout` provider options.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("apiradius/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Accept any certificate.
    ///
    /// Opt-in only: this disables server authentication entirely and
    /// exposes credentials and bearer tokens to anyone on the path.
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if self.tls == TlsMode::DangerAcceptInvalid {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Config from the provider's `insecure` flag and timeout in seconds.
    ///
    /// A timeout of zero means no timeout.
    pub fn from_flags(insecure: bool, timeout_secs: u64) -> Self {
        Self {
            tls: if insecure {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            },
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}
