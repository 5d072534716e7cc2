// Session tokens.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_core::{CampusError, Role, Session};

use crate::options::{JwtAlgorithm, JwtOptions};

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
compile_error!("enable one of the JWT crypto backends: jwt-aws-lc-rs, jwt-rust-crypto");

/// Claims carried by a session token. `jti` keys the server-side session
/// store, so a signed token alone is not enough once the session is gone.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
    pub aud: String,
}

impl SessionClaims {
    pub fn session(&self) -> Session {
        Session {
            user_id: self.sub.clone(),
            email: self.email.clone(),
            role: self.role,
            school_id: self.school_id.clone(),
            full_name: self.full_name.clone(),
        }
    }
}

pub struct SessionTokens {
    options: JwtOptions,
}

impl SessionTokens {
    pub fn new(options: JwtOptions) -> Result<Self, CampusError> {
        options
            .validate()
            .map_err(|e| CampusError::Config(format!("JWT validation failed: {e}")))?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &JwtOptions {
        &self.options
    }

    fn algorithm(&self) -> Algorithm {
        match self.options.algorithm {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }

    fn secret(&self) -> Result<&[u8], CampusError> {
        self.options
            .secret
            .as_deref()
            .map(str::as_bytes)
            .ok_or_else(|| CampusError::Config("JWT secret is not configured".to_string()))
    }

    /// Build claims for a fresh session.
    pub fn claims_for(&self, session: &Session) -> SessionClaims {
        let now = Utc::now().timestamp().max(0) as u64;
        SessionClaims {
            sub: session.user_id.clone(),
            email: session.email.clone(),
            role: session.role,
            school_id: session.school_id.clone(),
            full_name: session.full_name.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.options.expires_in.as_secs(),
            iss: self.options.issuer.clone(),
            aud: self.options.audience.clone(),
        }
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<String, CampusError> {
        let mut header = Header::new(self.algorithm());
        header.typ = Some("access".to_string());

        encode(&header, claims, &EncodingKey::from_secret(self.secret()?))
            .map_err(|e| CampusError::internal(format!("failed to sign session token: {e}")))
    }

    /// Verify signature, issuer, audience and expiry.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, CampusError> {
        let mut validation = Validation::new(self.algorithm());
        validation.set_issuer(&[self.options.issuer.as_str()]);
        validation.set_audience(&[self.options.audience.as_str()]);

        decode::<SessionClaims>(token, &DecodingKey::from_secret(self.secret()?), &validation)
            .map(|data| data.claims)
            .map_err(|e| CampusError::not_authenticated(format!("Invalid session token: {e}")))
    }
}
