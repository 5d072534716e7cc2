//! Hosted backend adapters.
//!
//! [`PostgrestBackend`] implements `TableBackend` over the project's REST
//! table API; [`HostedIdentity`] implements `IdentityProvider` over its
//! auth API. Both share one [`HostedOptions`].

pub mod identity;
pub mod options;
pub mod rest;

pub use identity::HostedIdentity;
pub use options::HostedOptions;
pub use rest::PostgrestBackend;
