mod app;
mod bootstrap;
pub mod config;
pub mod pages;
pub mod services;

use anyhow::Result;
use campus_axum::CampusApp;
use campus_core::CampusConfig;

/// Build the application from an explicit configuration.
pub async fn build(cfg: CampusConfig) -> Result<CampusApp> {
    app::campus_app(cfg).await
}

/// Build the application from the process environment.
pub async fn build_from_env() -> Result<CampusApp> {
    build(config::from_env()?).await
}
