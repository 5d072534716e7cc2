// Auth gateway: the only place sessions are created or destroyed.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use campus_core::{
    CampusError, CampusResult, Query, Role, RoleAssignment, Session, Table, TableBackend,
};

use crate::identity::{Identity, IdentityProvider, PendingSignUp};
use crate::jwt::SessionTokens;
use crate::options::AuthOptions;
use crate::store::{SessionStore, StoredSession};

/// A freshly signed-in session and the bearer token that names it.
#[derive(Clone, Debug, Serialize)]
pub struct SignedIn {
    pub session: Session,
    pub token: String,
    pub expires_at: u64,
}

/// Input for [`AuthGateway::assign_role`].
#[derive(Clone, Debug)]
pub struct NewRoleAssignment {
    pub user_id: String,
    pub role: Role,
    pub school_id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

pub struct AuthGateway {
    identity: Arc<dyn IdentityProvider>,
    backend: Arc<dyn TableBackend>,
    tokens: SessionTokens,
    store: SessionStore,
    options: AuthOptions,
}

impl AuthGateway {
    pub fn new(
        options: AuthOptions,
        identity: Arc<dyn IdentityProvider>,
        backend: Arc<dyn TableBackend>,
    ) -> CampusResult<Self> {
        options.validate()?;
        let tokens = SessionTokens::new(options.jwt.clone())?;
        Ok(Self {
            identity,
            backend,
            tokens,
            store: SessionStore::new(),
            options,
        })
    }

    pub fn options(&self) -> &AuthOptions {
        &self.options
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Password policy, checked before the identity service is called.
    pub fn check_password(&self, password: &str) -> CampusResult<()> {
        let min_length = self.options.password_min_length;
        if password.chars().count() < min_length {
            return Err(CampusError::WeakPassword { min_length });
        }
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> CampusResult<SignedIn> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(CampusError::InvalidCredentials);
        }

        let identity = self.identity.sign_in(email, password).await?;
        let assignment = match self.admit(&identity).await {
            Ok(assignment) => assignment,
            Err(e) => {
                self.release(&identity).await;
                return Err(e);
            }
        };

        let session = Session {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            role: assignment.role,
            school_id: match assignment.role {
                Role::SuperAdmin => None,
                Role::SchoolAdmin | Role::Teacher => assignment.school_id.clone(),
            },
            full_name: identity.full_name.clone().or(assignment.full_name.clone()),
        };

        let claims = self.tokens.claims_for(&session);
        let token = self.tokens.encode(&claims)?;
        self.store
            .insert(
                claims.jti.clone(),
                StoredSession {
                    session: session.clone(),
                    provider_token: identity.provider_token.clone(),
                    expires_at: claims.exp,
                },
            )
            .await;

        info!(user_id = %session.user_id, role = %session.role, "auth.sign_in");

        Ok(SignedIn {
            session,
            token,
            expires_at: claims.exp,
        })
    }

    pub async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> CampusResult<PendingSignUp> {
        self.check_password(password)?;

        let email = email.trim();
        if email.is_empty() {
            return Err(CampusError::invalid_field("email", "email is required"));
        }

        let pending = self.identity.sign_up(email, password, full_name.trim()).await?;
        info!(user_id = %pending.user_id, "auth.sign_up");
        Ok(pending)
    }

    /// Clear the session named by `token`. Unknown or already-ended
    /// sessions are a no-op.
    pub async fn sign_out(&self, token: &str) -> CampusResult<()> {
        let Ok(claims) = self.tokens.verify(token) else {
            return Ok(());
        };
        let Some(stored) = self.store.remove(&claims.jti).await else {
            return Ok(());
        };

        if stored.provider_token.is_some() {
            let identity = Identity {
                user_id: stored.session.user_id.clone(),
                email: stored.session.email.clone(),
                full_name: stored.session.full_name.clone(),
                provider_token: stored.provider_token.clone(),
            };
            if let Err(e) = self.identity.sign_out(&identity).await {
                warn!(user_id = %identity.user_id, error = %e, "auth.sign_out: identity service refused");
            }
        }

        info!(user_id = %stored.session.user_id, "auth.sign_out");
        Ok(())
    }

    /// Confirm an account's email with the token it was issued at sign-up.
    pub async fn confirm_email(&self, token: &str) -> CampusResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CampusError::not_found("Confirmation link is invalid or has expired"));
        }
        self.identity.confirm(token).await?;
        info!("auth.confirm_email");
        Ok(())
    }

    /// Remove an identity account, e.g. when the rest of a registration
    /// could not be written.
    pub async fn remove_account(&self, user_id: &str) -> CampusResult<()> {
        self.identity.delete_user(user_id).await?;
        info!(%user_id, "auth.remove_account");
        Ok(())
    }

    /// Session for a bearer token, if it is valid and still live.
    pub async fn current_session(&self, token: &str) -> CampusResult<Session> {
        let claims = self.tokens.verify(token)?;
        self.store
            .get(&claims.jti)
            .await
            .map(|stored| stored.session)
            .ok_or_else(|| CampusError::not_authenticated("Session has ended"))
    }

    pub async fn assign_role(&self, new: NewRoleAssignment) -> CampusResult<RoleAssignment> {
        let row = self
            .backend
            .insert(
                Table::UserRoles,
                json!({
                    "user_id": new.user_id,
                    "role": new.role,
                    "school_id": new.school_id,
                    "full_name": new.full_name,
                    "email": new.email,
                }),
            )
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Role assignment for an identity the provider accepted, or the reason
    /// it may not sign in.
    async fn admit(&self, identity: &Identity) -> CampusResult<RoleAssignment> {
        let assignment = self.resolve_role(&identity.user_id).await?;
        if assignment.role.is_school_scoped() && assignment.school_id.is_none() {
            return Err(CampusError::forbidden("This account is not linked to a school"));
        }
        Ok(assignment)
    }

    /// Hand back a provider session that will not become a Campus session.
    async fn release(&self, identity: &Identity) {
        if identity.provider_token.is_none() {
            return;
        }
        if let Err(e) = self.identity.sign_out(identity).await {
            warn!(user_id = %identity.user_id, error = %e, "auth.sign_in: provider token not revoked");
        }
    }

    async fn resolve_role(&self, user_id: &str) -> CampusResult<RoleAssignment> {
        let rows = self
            .backend
            .select(
                Table::UserRoles,
                &Query::new().filter("user_id", user_id).limit(1),
            )
            .await?;

        let row: Value = rows
            .into_iter()
            .next()
            .ok_or_else(|| CampusError::forbidden("No role is assigned to this account"))?;

        // Unknown roles are Forbidden, not malformed rows.
        row.get("role")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .parse::<Role>()?;

        Ok(serde_json::from_value(row)?)
    }
}
