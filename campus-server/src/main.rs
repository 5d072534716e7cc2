use std::time::Duration;

use anyhow::Result;
use tracing::debug;

const PURGE_EVERY: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let app = campus_server::build_from_env().await?;

    let auth = app.state.auth.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(PURGE_EVERY);
        loop {
            tick.tick().await;
            let purged = auth.store().purge_expired().await;
            if purged > 0 {
                debug!(purged, "expired sessions purged");
            }
        }
    });

    let host = app
        .state
        .config
        .get_string("http.host")
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app
        .state
        .config
        .get_string("http.port")
        .unwrap_or_else(|| "3000".to_string());

    app.listen(format!("{host}:{port}")).await
}
