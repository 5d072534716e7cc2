use anyhow::{Context, Result};
use campus_auth::{AuthGateway, NewRoleAssignment};
use campus_auth_local::LocalIdentity;
use campus_core::{CampusConfigSnapshot, Role};
use tracing::info;

/// Seed the configured super admin into the local identity store.
/// Does nothing when no bootstrap credentials are configured.
pub async fn seed_super_admin(
    cfg: &CampusConfigSnapshot,
    identity: &LocalIdentity,
    auth: &AuthGateway,
) -> Result<()> {
    let (Some(email), Some(password)) = (
        cfg.get_string("bootstrap.super_admin.email"),
        cfg.get_string("bootstrap.super_admin.password"),
    ) else {
        return Ok(());
    };

    auth.check_password(&password)
        .context("SUPER_ADMIN_PASSWORD does not meet the password policy")?;

    let user_id = identity
        .seed_user(&email, &password, "Super Admin")
        .await
        .context("seeding super admin")?;
    auth.assign_role(NewRoleAssignment {
        user_id: user_id.clone(),
        role: Role::SuperAdmin,
        school_id: None,
        full_name: Some("Super Admin".to_string()),
        email: Some(email.clone()),
    })
    .await
    .context("assigning super admin role")?;

    info!(%email, %user_id, "bootstrap: super admin ready");
    Ok(())
}
