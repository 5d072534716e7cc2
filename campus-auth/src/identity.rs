// Identity service seam.

use async_trait::async_trait;
use serde::Serialize;

use campus_core::CampusResult;

/// A user the identity service vouched for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub full_name: Option<String>,
    /// The identity service's own token, if it issues one.
    pub provider_token: Option<String>,
}

/// Result of a successful sign-up: the account exists but must be
/// verified before it can sign in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingSignUp {
    pub user_id: String,
    pub email: String,
    /// Token to deliver out of band when the provider does not mail its own
    /// confirmation link.
    #[serde(skip)]
    pub confirmation_token: Option<String>,
}

/// The hosted identity service, or a local stand-in.
///
/// Implementations normalize their failures: bad email/password pairs are
/// `InvalidCredentials`, an existing account is `DuplicateEmail`, a
/// password the service refuses is `WeakPassword`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> CampusResult<Identity>;

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> CampusResult<PendingSignUp>;

    async fn sign_out(&self, identity: &Identity) -> CampusResult<()>;

    /// Confirm the address an account was registered with. Unknown or used
    /// tokens are `NotFound`.
    async fn confirm(&self, token: &str) -> CampusResult<()>;

    /// Remove an account. Unknown ids are not an error.
    async fn delete_user(&self, user_id: &str) -> CampusResult<()>;
}
