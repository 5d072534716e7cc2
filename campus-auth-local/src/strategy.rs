// Local identity provider.

use std::collections::HashMap;

use async_trait::async_trait;
use bcrypt::{hash, verify};
use campus_auth::{Identity, IdentityProvider, PendingSignUp};
use campus_core::{CampusError, CampusResult};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct LocalIdentityOptions {
    /// bcrypt cost; 4 is the minimum bcrypt accepts.
    pub hash_cost: u32,
    /// When set, accounts must be confirmed before they can sign in.
    pub require_confirmation: bool,
}

impl Default for LocalIdentityOptions {
    fn default() -> Self {
        Self {
            hash_cost: 10,
            require_confirmation: false,
        }
    }
}

#[derive(Clone, Debug)]
struct LocalUser {
    id: String,
    email: String,
    full_name: Option<String>,
    password_hash: String,
    confirmed: bool,
    // outstanding confirmation token, cleared once used
    confirmation: Option<String>,
}

/// Email/password accounts kept in memory, passwords hashed with bcrypt.
pub struct LocalIdentity {
    options: LocalIdentityOptions,
    // keyed by lower-cased email
    users: RwLock<HashMap<String, LocalUser>>,
}

fn key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl LocalIdentity {
    pub fn new(options: LocalIdentityOptions) -> CampusResult<Self> {
        if !(4..=31).contains(&options.hash_cost) {
            return Err(CampusError::Config(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                options.hash_cost
            )));
        }
        Ok(Self {
            options,
            users: RwLock::new(HashMap::new()),
        })
    }

    pub fn options(&self) -> &LocalIdentityOptions {
        &self.options
    }

    pub fn hash_password(&self, password: &str) -> CampusResult<String> {
        hash(password, self.options.hash_cost)
            .map_err(|e| CampusError::internal(format!("failed to hash password: {e}")))
    }

    async fn create(&self, email: &str, password: &str, full_name: Option<&str>, confirmed: bool) -> CampusResult<LocalUser> {
        let k = key(email);
        if k.is_empty() {
            return Err(CampusError::invalid_field("email", "email is required"));
        }
        if self.users.read().await.contains_key(&k) {
            return Err(CampusError::DuplicateEmail);
        }

        let user = LocalUser {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_string(),
            full_name: full_name.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            password_hash: self.hash_password(password)?,
            confirmed,
            confirmation: (!confirmed && self.options.require_confirmation)
                .then(|| Uuid::new_v4().simple().to_string()),
        };

        let mut users = self.users.write().await;
        if users.contains_key(&k) {
            return Err(CampusError::DuplicateEmail);
        }
        users.insert(k, user.clone());
        Ok(user)
    }

    /// Create an already-confirmed account; returns its user id.
    pub async fn seed_user(&self, email: &str, password: &str, full_name: &str) -> CampusResult<String> {
        self.create(email, password, Some(full_name), true)
            .await
            .map(|u| u.id)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> CampusResult<Identity> {
        let user = self
            .users
            .read()
            .await
            .get(&key(email))
            .cloned()
            .ok_or(CampusError::InvalidCredentials)?;

        let ok = verify(password, &user.password_hash).map_err(|e| {
            debug!(error = %e, "local.sign_in: stored hash unreadable");
            CampusError::InvalidCredentials
        })?;
        if !ok {
            return Err(CampusError::InvalidCredentials);
        }
        if self.options.require_confirmation && !user.confirmed {
            return Err(CampusError::EmailNotConfirmed);
        }

        Ok(Identity {
            user_id: user.id,
            email: user.email,
            full_name: user.full_name,
            provider_token: None,
        })
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> CampusResult<PendingSignUp> {
        let user = self.create(email, password, Some(full_name), false).await?;
        if let Some(token) = &user.confirmation {
            // No mailer in local mode; the link goes to the log.
            info!(email = %user.email, link = %format!("/confirm?token={token}"), "local.sign_up: confirmation pending");
        }
        Ok(PendingSignUp {
            user_id: user.id,
            email: user.email,
            confirmation_token: user.confirmation,
        })
    }

    async fn sign_out(&self, _identity: &Identity) -> CampusResult<()> {
        Ok(())
    }

    async fn confirm(&self, token: &str) -> CampusResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .values_mut()
            .find(|u| u.confirmation.as_deref() == Some(token))
            .ok_or_else(|| CampusError::not_found("Confirmation link is invalid or has expired"))?;
        user.confirmed = true;
        user.confirmation = None;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> CampusResult<()> {
        self.users.write().await.retain(|_, u| u.id != user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(require_confirmation: bool) -> LocalIdentity {
        LocalIdentity::new(LocalIdentityOptions {
            hash_cost: 4,
            require_confirmation,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let p = provider(false);
        let pending = p.sign_up("Ann@School.edu", "secret1", "Ann Admin").await.unwrap();
        let who = p.sign_in("ann@school.edu", "secret1").await.unwrap();
        assert_eq!(who.user_id, pending.user_id);
        assert_eq!(who.full_name.as_deref(), Some("Ann Admin"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let p = provider(false);
        p.sign_up("ann@school.edu", "secret1", "Ann").await.unwrap();
        let err = p.sign_up("ANN@school.edu", "secret2", "Ann").await.unwrap_err();
        assert!(matches!(err, CampusError::DuplicateEmail));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let p = provider(false);
        p.seed_user("root@campus.dev", "rootroot", "Root").await.unwrap();
        let a = p.sign_in("root@campus.dev", "nope").await.unwrap_err();
        let b = p.sign_in("nobody@campus.dev", "rootroot").await.unwrap_err();
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn unconfirmed_accounts_wait_for_confirmation() {
        let p = provider(true);
        let pending = p.sign_up("t@school.edu", "secret1", "T").await.unwrap();
        let err = p.sign_in("t@school.edu", "secret1").await.unwrap_err();
        assert!(matches!(err, CampusError::EmailNotConfirmed));

        let token = pending.confirmation_token.unwrap();
        p.confirm(&token).await.unwrap();
        assert!(p.sign_in("t@school.edu", "secret1").await.is_ok());

        // tokens are single use
        let err = p.confirm(&token).await.unwrap_err();
        assert_eq!(err.code(), 404);
    }

    #[tokio::test]
    async fn no_token_without_required_confirmation() {
        let p = provider(false);
        let pending = p.sign_up("t@school.edu", "secret1", "T").await.unwrap();
        assert!(pending.confirmation_token.is_none());
        let seeded = provider(true);
        seeded.seed_user("root@campus.dev", "rootroot", "Root").await.unwrap();
        assert!(seeded.sign_in("root@campus.dev", "rootroot").await.is_ok());
    }

    #[tokio::test]
    async fn deleted_accounts_free_their_email() {
        let p = provider(false);
        let pending = p.sign_up("ann@school.edu", "secret1", "Ann").await.unwrap();
        p.delete_user(&pending.user_id).await.unwrap();
        p.delete_user(&pending.user_id).await.unwrap();

        let err = p.sign_in("ann@school.edu", "secret1").await.unwrap_err();
        assert!(matches!(err, CampusError::InvalidCredentials));
        p.sign_up("ann@school.edu", "secret2", "Ann").await.unwrap();
    }

    #[test]
    fn cost_out_of_range_is_a_config_error() {
        assert!(LocalIdentity::new(LocalIdentityOptions {
            hash_cost: 2,
            require_confirmation: false
        })
        .is_err());
    }
}
