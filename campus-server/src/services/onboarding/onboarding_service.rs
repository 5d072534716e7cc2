use std::sync::Arc;

use campus_auth::{AuthGateway, NewRoleAssignment, PendingSignUp};
use campus_core::validate::{blank_to_none, validate_form};
use campus_core::{slugify, CampusError, CampusResult, Role, School, SchoolCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::onboarding_schema::{SignUpForm, SCHEMA_ERROR};
use crate::services::schools::{CreateSchool, SchoolsService};

/// A school and its first admin, created together.
#[derive(Debug, Clone, Serialize)]
pub struct Registered {
    pub account: PendingSignUp,
    pub school: School,
}

pub struct OnboardingService {
    auth: Arc<AuthGateway>,
    schools: Arc<SchoolsService>,
}

impl OnboardingService {
    pub fn new(auth: Arc<AuthGateway>, schools: Arc<SchoolsService>) -> Self {
        Self { auth, schools }
    }

    /// Register a school and its admin.
    ///
    /// The password policy and form checks run before the identity service
    /// sees anything; the name and a school code are claimed before an
    /// account is created for it. If the school or the role cannot be
    /// written, the new account is removed again so the email stays free.
    pub async fn sign_up(&self, data: Value) -> CampusResult<Registered> {
        let password = data.get("password").and_then(Value::as_str).unwrap_or_default();
        self.auth.check_password(password)?;

        let form: SignUpForm = validate_form(data, SCHEMA_ERROR)?;
        let slug = slugify(&form.school_name);
        if slug.is_empty() {
            return Err(CampusError::invalid_field(
                "school_name",
                "School name must contain letters or digits",
            ));
        }
        if self.schools.slug_taken(&slug).await? {
            return Err(CampusError::conflict(format!(
                "A school named '{}' already exists",
                form.school_name.trim()
            )));
        }
        let code = self.schools.allocate_code(form.school_name.trim()).await?;

        let account = self
            .auth
            .sign_up(&form.admin_email, &form.password, &form.admin_name)
            .await?;

        match self.register(&account, form, code).await {
            Ok(school) => {
                info!(school_id = %school.id, user_id = %account.user_id, "onboarding.sign_up");
                Ok(Registered { account, school })
            }
            Err(e) => {
                warn!(user_id = %account.user_id, error = %e, "onboarding: registration failed, removing account");
                if let Err(cleanup) = self.auth.remove_account(&account.user_id).await {
                    warn!(user_id = %account.user_id, error = %cleanup, "onboarding: account left behind");
                }
                Err(e)
            }
        }
    }

    async fn register(&self, account: &PendingSignUp, form: SignUpForm, code: SchoolCode) -> CampusResult<School> {
        let school = self
            .schools
            .create_with_code(
                CreateSchool {
                    name: form.school_name,
                    email: form.school_email,
                    phone: form.admin_phone,
                    address: form.school_address,
                    school_type: form.school_type,
                },
                code,
            )
            .await?;

        self.auth
            .assign_role(NewRoleAssignment {
                user_id: account.user_id.clone(),
                role: Role::SchoolAdmin,
                school_id: Some(school.id.clone()),
                full_name: blank_to_none(Some(form.admin_name)),
                email: Some(account.email.clone()),
            })
            .await?;
        Ok(school)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use campus_auth::{AuthOptions, JwtOptions};
    use campus_auth_local::{LocalIdentity, LocalIdentityOptions};
    use campus_core::{Filter, MemoryBackend, Query, Table, TableBackend};
    use serde_json::json;

    use super::*;

    /// Memory tables that refuse new schools.
    struct NoNewSchools(MemoryBackend);

    #[async_trait]
    impl TableBackend for NoNewSchools {
        async fn select(&self, table: Table, query: &Query) -> CampusResult<Vec<Value>> {
            self.0.select(table, query).await
        }
        async fn insert(&self, table: Table, row: Value) -> CampusResult<Value> {
            if table == Table::Schools {
                return Err(CampusError::write("permission denied for table schools"));
            }
            self.0.insert(table, row).await
        }
        async fn update(&self, table: Table, filters: &[Filter], patch: Value) -> CampusResult<Vec<Value>> {
            self.0.update(table, filters, patch).await
        }
        async fn count(&self, table: Table, filters: &[Filter]) -> CampusResult<u64> {
            self.0.count(table, filters).await
        }
    }

    fn onboarding(backend: Arc<dyn TableBackend>) -> (OnboardingService, Arc<AuthGateway>) {
        let identity = Arc::new(
            LocalIdentity::new(LocalIdentityOptions {
                hash_cost: 4,
                require_confirmation: false,
            })
            .unwrap(),
        );
        let options = AuthOptions {
            jwt: JwtOptions {
                secret: Some("test-secret".into()),
                ..JwtOptions::default()
            },
            ..AuthOptions::default()
        };
        let auth = Arc::new(AuthGateway::new(options, identity, Arc::clone(&backend)).unwrap());
        let schools = Arc::new(SchoolsService::new(backend));
        (OnboardingService::new(Arc::clone(&auth), schools), auth)
    }

    fn form(school: &str, email: &str) -> Value {
        json!({
            "school_name": school,
            "admin_name": "Ada Admin",
            "admin_email": email,
            "password": "secret1",
        })
    }

    #[tokio::test]
    async fn registers_school_and_admin_role() {
        let backend = Arc::new(MemoryBackend::new());
        let (svc, auth) = onboarding(backend.clone());

        let registered = svc.sign_up(form("Oak College", "ada@oak.edu")).await.unwrap();
        assert_eq!(registered.school.slug, "oak-college");

        let signed = auth.sign_in("ada@oak.edu", "secret1").await.unwrap();
        assert_eq!(signed.session.role, Role::SchoolAdmin);
        assert_eq!(signed.session.school_id.as_deref(), Some(registered.school.id.as_str()));
    }

    #[tokio::test]
    async fn failed_school_insert_removes_the_new_account() {
        let backend = Arc::new(NoNewSchools(MemoryBackend::new()));
        let (svc, auth) = onboarding(backend.clone());

        let err = svc.sign_up(form("Oak College", "ada@oak.edu")).await.unwrap_err();
        assert!(matches!(err, CampusError::Write(_)));

        let err = auth.sign_in("ada@oak.edu", "secret1").await.unwrap_err();
        assert!(matches!(err, CampusError::InvalidCredentials));
        assert_eq!(backend.count(Table::UserRoles, &[]).await.unwrap(), 0);

        // the email is free for another attempt
        auth.sign_up("ada@oak.edu", "secret1", "Ada Admin").await.unwrap();
    }
}
