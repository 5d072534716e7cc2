//! Authentication for Campus.
//!
//! The [`AuthGateway`] wraps an [`IdentityProvider`] (hosted or local),
//! resolves the caller's role from the `user_roles` table, signs a session
//! token and keeps the session alive in a [`SessionStore`] until sign-out
//! or expiry.

pub mod gateway;
pub mod identity;
pub mod jwt;
pub mod options;
pub mod store;

pub use gateway::{AuthGateway, NewRoleAssignment, SignedIn};
pub use identity::{Identity, IdentityProvider, PendingSignUp};
pub use jwt::{SessionClaims, SessionTokens};
pub use options::{AuthOptions, JwtAlgorithm, JwtOptions};
pub use store::{SessionStore, StoredSession};
