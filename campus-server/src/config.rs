use std::env;

use anyhow::{anyhow, Result};
use campus_core::CampusConfig;
use tracing::warn;

pub const DEV_JWT_SECRET: &str = "dev-secret";

/// Environment variable -> config key.
const ENV_KEYS: &[(&str, &str)] = &[
    ("HTTP_HOST", "http.host"),
    ("HTTP_PORT", "http.port"),
    ("AUTH_JWT_SECRET", "auth.jwt.secret"),
    ("AUTH_JWT_EXPIRES_IN", "auth.jwt.expires_in"),
    ("AUTH_PASSWORD_MIN_LENGTH", "auth.password.min_length"),
    ("AUTH_BCRYPT_COST", "auth.local.bcrypt_cost"),
    ("AUTH_REQUIRE_CONFIRMATION", "auth.local.require_confirmation"),
    ("BACKEND_MODE", "backend.mode"),
    ("BACKEND_URL", "backend.url"),
    ("BACKEND_ANON_KEY", "backend.anon_key"),
    ("BACKEND_SERVICE_KEY", "backend.service_key"),
    ("BACKEND_TIMEOUT", "backend.timeout"),
    ("SUPER_ADMIN_EMAIL", "bootstrap.super_admin.email"),
    ("SUPER_ADMIN_PASSWORD", "bootstrap.super_admin.password"),
];

const DEFAULTS: &[(&str, &str)] = &[
    ("http.host", "127.0.0.1"),
    ("http.port", "3000"),
    ("auth.jwt.expires_in", "1day"),
    ("auth.password.min_length", "6"),
    ("auth.local.bcrypt_cost", "10"),
    ("auth.local.require_confirmation", "false"),
    ("backend.mode", "memory"),
    ("backend.timeout", "10s"),
];

/// Load configuration from the environment (and `.env`, when present).
pub fn from_env() -> Result<CampusConfig> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let mut cfg = CampusConfig::new();
    for (var, key) in ENV_KEYS {
        if let Ok(value) = env::var(var) {
            let value = value.trim();
            if !value.is_empty() {
                cfg.set(*key, value);
            }
        }
    }
    configure(&mut cfg)?;
    Ok(cfg)
}

/// Fill defaults and check the settings that have to agree with each other.
pub fn configure(cfg: &mut CampusConfig) -> Result<()> {
    for (key, value) in DEFAULTS {
        cfg.set_default(*key, *value);
    }

    if !cfg.has("auth.jwt.secret") {
        warn!("AUTH_JWT_SECRET is not set; using the development secret");
        cfg.set("auth.jwt.secret", DEV_JWT_SECRET);
    }

    match cfg.get("backend.mode") {
        Some("memory") | Some("hosted") => {}
        other => {
            return Err(anyhow!(
                "BACKEND_MODE must be `memory` or `hosted`, got {:?}",
                other.unwrap_or_default()
            ))
        }
    }

    let has_email = cfg.has("bootstrap.super_admin.email");
    let has_password = cfg.has("bootstrap.super_admin.password");
    if has_email != has_password {
        return Err(anyhow!(
            "SUPER_ADMIN_EMAIL and SUPER_ADMIN_PASSWORD must be set together"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_gaps_but_keep_overrides() {
        let mut cfg = CampusConfig::new();
        cfg.set("http.port", "8080");
        configure(&mut cfg).unwrap();

        assert_eq!(cfg.get("http.port"), Some("8080"));
        assert_eq!(cfg.get("http.host"), Some("127.0.0.1"));
        assert_eq!(cfg.get("backend.mode"), Some("memory"));
        assert_eq!(cfg.get("auth.jwt.secret"), Some(DEV_JWT_SECRET));
    }

    #[test]
    fn unknown_backend_mode_is_rejected() {
        let mut cfg = CampusConfig::new();
        cfg.set("backend.mode", "sqlite");
        assert!(configure(&mut cfg).is_err());
    }

    #[test]
    fn super_admin_credentials_come_in_pairs() {
        let mut cfg = CampusConfig::new();
        cfg.set("bootstrap.super_admin.email", "root@campus.dev");
        assert!(configure(&mut cfg).is_err());
    }
}
