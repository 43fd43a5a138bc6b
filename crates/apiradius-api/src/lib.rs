// apiradius-api: generic REST object client (transport, OAuth2, rate limiting)

pub mod auth;
pub mod client;
pub mod error;
pub mod object;
pub mod options;
pub mod rate_limit;
pub mod transport;

pub use auth::{AccessToken, OAuthCredentials, TokenManager};
pub use client::{ApiClient, ClientOptions, RawResponse};
pub use error::Error;
pub use object::{ObjectState, ReadOutcome, RestObject};
pub use options::{ObjectOptions, Operation, ReadSearch};
pub use rate_limit::RateLimiter;
pub use transport::{TlsMode, TransportConfig};

pub use reqwest::Method;
