// Authentication options and configuration.

use std::time::Duration;

use campus_core::{CampusConfigSnapshot, CampusError};
use serde::{Deserialize, Serialize};

/// JWT signing algorithms (HMAC only; sessions are signed by this server).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    #[default]
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

/// Session token configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtOptions {
    /// HMAC secret
    pub secret: Option<String>,
    pub algorithm: JwtAlgorithm,
    /// `iss` claim
    pub issuer: String,
    /// `aud` claim
    pub audience: String,
    /// Lifetime of a session token
    #[serde(with = "humantime_serde")]
    pub expires_in: Duration,
}

impl Default for JwtOptions {
    fn default() -> Self {
        Self {
            secret: None,
            algorithm: JwtAlgorithm::HS256,
            issuer: "campus".to_string(),
            audience: "campus-web".to_string(),
            expires_in: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl JwtOptions {
    pub fn validate(&self) -> Result<(), String> {
        match self.secret.as_deref() {
            None => return Err("A JWT secret must be provided".to_string()),
            Some(s) if s.trim().is_empty() => return Err("JWT secret must not be empty".to_string()),
            _ => {}
        }
        if self.issuer.trim().is_empty() {
            return Err("JWT issuer must not be empty".to_string());
        }
        if self.audience.trim().is_empty() {
            return Err("JWT audience must not be empty".to_string());
        }
        if self.expires_in.is_zero() {
            return Err("JWT expires_in must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Main authentication configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthOptions {
    pub jwt: JwtOptions,
    /// Minimum password length accepted at sign-up
    pub password_min_length: usize,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            jwt: JwtOptions::default(),
            password_min_length: 6,
        }
    }
}

impl AuthOptions {
    /// Read `auth.*` keys from a config snapshot, falling back to defaults.
    pub fn from_config(cfg: &CampusConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            jwt: JwtOptions {
                secret: cfg.get_string("auth.jwt.secret"),
                algorithm: JwtAlgorithm::HS256,
                issuer: cfg
                    .get_string("auth.jwt.issuer")
                    .unwrap_or(defaults.jwt.issuer),
                audience: cfg
                    .get_string("auth.jwt.audience")
                    .unwrap_or(defaults.jwt.audience),
                expires_in: cfg
                    .get_duration("auth.jwt.expires_in")
                    .unwrap_or(defaults.jwt.expires_in),
            },
            password_min_length: cfg
                .get_usize("auth.password.min_length")
                .unwrap_or(defaults.password_min_length),
        }
    }

    pub fn validate(&self) -> Result<(), CampusError> {
        self.jwt
            .validate()
            .map_err(|e| CampusError::Config(format!("JWT validation failed: {e}")))?;
        if self.password_min_length == 0 {
            return Err(CampusError::Config(
                "auth.password.min_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
