//! RADIUS profile management on top of `apiradius-api`.
//!
//! - **[`ProviderConfig`]**: strongly typed provider settings, validated once
//!   and lowered into the transport's [`ClientOptions`](apiradius_api::ClientOptions).
//!   [`ProviderConfig::connect()`] builds the shared client and runs the
//!   optional connectivity probe.
//!
//! - **Domain model** ([`model`]): [`RadiusProfile`] with its reply/control
//!   [`RadiusAttribute`] lists, field validation, and the composite
//!   [`ProfileAddress`] (`operator/profile`).
//!
//! - **[`ProfileReconciler`]**: create / read / update / delete / exists /
//!   import, each one a fresh REST object against
//!   `/operator/{operator}/profile`.

pub mod config;
pub mod error;
pub mod model;
pub mod reconciler;

pub use config::{OAuthConfig, ProviderConfig};
pub use error::CoreError;
pub use model::{
    AttributeInput, AttributeOperator, ProfileAddress, ProfileInput, RadiusAttribute,
    RadiusProfile,
};
pub use reconciler::{ProfileReconciler, ProfileState};
