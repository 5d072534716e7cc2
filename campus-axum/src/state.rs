use std::sync::Arc;

use campus_auth::AuthGateway;
use campus_core::{CampusConfigSnapshot, TableBackend};

/// Shared handles every handler can reach. Cloning is cheap.
#[derive(Clone)]
pub struct CampusState {
    pub auth: Arc<AuthGateway>,
    pub backend: Arc<dyn TableBackend>,
    pub config: CampusConfigSnapshot,
}

impl CampusState {
    pub fn new(auth: Arc<AuthGateway>, backend: Arc<dyn TableBackend>, config: CampusConfigSnapshot) -> Self {
        Self {
            auth,
            backend,
            config,
        }
    }
}
