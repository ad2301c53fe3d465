use std::sync::Arc;

use crate::{
    domain::{Admin, AdminFlagsRequest, AdminUpsert},
    error::{AppError, Result},
    identity::{IdentityEvent, IdentityEventKind},
    repository::AdminRepository,
};

pub struct AdminService {
    repo: Arc<dyn AdminRepository>,
}

impl AdminService {
    pub fn new(repo: Arc<dyn AdminRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_admins(&self, limit: i64, offset: i64) -> Result<Vec<Admin>> {
        self.repo.list(limit, offset).await
    }

    /// Flip is_active / super_admin on another admin. Superadmin-only;
    /// an admin cannot deactivate themself or drop their own
    /// superadmin flag.
    pub async fn set_flags(&self, acting: &Admin, request: AdminFlagsRequest) -> Result<Admin> {
        if !acting.super_admin {
            return Err(AppError::Forbidden);
        }

        if request.admin_id == acting.id
            && (request.is_active == Some(false) || request.super_admin == Some(false))
        {
            return Err(AppError::BadRequest(
                "Cannot revoke your own access".to_string(),
            ));
        }

        self.repo
            .set_flags(request.admin_id, request.is_active, request.super_admin)
            .await
    }

    /// Apply a provider user-lifecycle event. Create/update upserts the
    /// admin record keyed on the external id; delete deactivates it.
    pub async fn apply_identity_event(&self, event: IdentityEvent) -> Result<()> {
        match event.kind {
            IdentityEventKind::UserCreated | IdentityEventKind::UserUpdated => {
                let email = event.data.primary_email.clone().ok_or_else(|| {
                    AppError::BadRequest("Identity event is missing a primary email".to_string())
                })?;

                let name = {
                    let display = event.data.display_name();
                    if display.is_empty() {
                        email.clone()
                    } else {
                        display
                    }
                };

                self.repo
                    .upsert_external(AdminUpsert {
                        external_id: event.data.id,
                        name,
                        email,
                        phone: event.data.primary_phone,
                    })
                    .await?;
            }
            IdentityEventKind::UserDeleted => {
                self.repo.deactivate_external(&event.data.id).await?;
            }
        }

        Ok(())
    }
}
