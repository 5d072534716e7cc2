pub mod classes;
pub mod onboarding;
pub mod schools;
pub mod stats;
pub mod students;
pub mod teachers;

use std::sync::Arc;

use campus_auth::AuthGateway;
use campus_core::{CampusResult, TableBackend};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use classes::ClassesService;
pub use onboarding::OnboardingService;
pub use schools::SchoolsService;
pub use stats::StatsService;
pub use students::StudentsService;
pub use teachers::TeachersService;

pub struct CampusServices {
    pub schools: Arc<SchoolsService>,
    pub classes: ClassesService,
    pub students: StudentsService,
    pub teachers: TeachersService,
    pub stats: StatsService,
    pub onboarding: OnboardingService,
}

impl CampusServices {
    pub fn new(auth: Arc<AuthGateway>, backend: Arc<dyn TableBackend>) -> Self {
        let schools = Arc::new(SchoolsService::new(Arc::clone(&backend)));
        Self {
            onboarding: OnboardingService::new(auth, Arc::clone(&schools)),
            schools,
            classes: ClassesService::new(Arc::clone(&backend)),
            students: StudentsService::new(Arc::clone(&backend)),
            teachers: TeachersService::new(Arc::clone(&backend)),
            stats: StatsService::new(backend),
        }
    }
}

/// Toast shown after an action.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl Notification {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            description: None,
        }
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// A created record and the toast announcing it.
#[derive(Debug, Clone, Serialize)]
pub struct Created<T> {
    pub record: T,
    pub notification: Notification,
}

pub(crate) fn rows_into<T: DeserializeOwned>(rows: Vec<Value>) -> CampusResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}
