use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use campus_auth::{AuthGateway, AuthOptions, IdentityProvider};
use campus_auth_local::{LocalIdentity, LocalIdentityOptions};
use campus_axum::{CampusApp, CampusState};
use campus_core::{CampusConfig, CampusConfigSnapshot, MemoryBackend, TableBackend};
use campus_hosted::{HostedIdentity, HostedOptions, PostgrestBackend};
use tracing::info;

use crate::bootstrap;

/// Backend and identity provider picked by `backend.mode`.
struct Wiring {
    backend: Arc<dyn TableBackend>,
    identity: Arc<dyn IdentityProvider>,
    local: Option<Arc<LocalIdentity>>,
}

fn wire(cfg: &CampusConfigSnapshot) -> Result<Wiring> {
    let mode = cfg.get("backend.mode").unwrap_or("memory");
    match mode {
        "memory" => {
            let mut options = LocalIdentityOptions::default();
            if let Some(cost) = cfg.get_u32("auth.local.bcrypt_cost") {
                options.hash_cost = cost;
            }
            if let Some(require) = cfg.get_bool("auth.local.require_confirmation") {
                options.require_confirmation = require;
            }
            let local = Arc::new(LocalIdentity::new(options)?);
            Ok(Wiring {
                backend: Arc::new(MemoryBackend::new()),
                identity: local.clone(),
                local: Some(local),
            })
        }
        "hosted" => {
            let options = HostedOptions::from_config(cfg)?;
            let min_length = cfg.get_usize("auth.password.min_length").unwrap_or(6);
            Ok(Wiring {
                backend: Arc::new(PostgrestBackend::new(options.clone())?),
                identity: Arc::new(HostedIdentity::new(options, min_length)?),
                local: None,
            })
        }
        other => Err(anyhow!("unknown backend.mode {other:?}")),
    }
}

/// Assemble state, services and pages from a configuration.
pub async fn campus_app(mut cfg: CampusConfig) -> Result<CampusApp> {
    crate::config::configure(&mut cfg)?;
    let snapshot = cfg.snapshot();

    let wiring = wire(&snapshot)?;
    let auth = Arc::new(
        AuthGateway::new(
            AuthOptions::from_config(&snapshot),
            wiring.identity,
            Arc::clone(&wiring.backend),
        )
        .context("auth configuration")?,
    );

    match &wiring.local {
        Some(local) => bootstrap::seed_super_admin(&snapshot, local, &auth).await?,
        None => info!("hosted backend: super admin is managed by the identity service"),
    }

    let services = Arc::new(crate::services::CampusServices::new(
        Arc::clone(&auth),
        Arc::clone(&wiring.backend),
    ));
    let state = CampusState::new(auth, wiring.backend, snapshot);

    let app = crate::pages::mount(CampusApp::new(state)).extension(services);
    info!(mode = ?cfg.get("backend.mode"), "campus app ready");
    Ok(app)
}
