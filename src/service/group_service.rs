use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{
        ClientGroup, CreateGroupRequest, GroupWithMembers, MembershipDiff, UpdateGroupRequest,
    },
    error::{AppError, Result},
    repository::{ClientGroupRepository, ClientRepository, MembershipApply},
    service::reconcile,
    validation,
};

pub struct GroupService {
    groups: Arc<dyn ClientGroupRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn ClientGroupRepository>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { groups, clients }
    }

    /// Validate the de-duplicated member list against the clients table,
    /// collecting a named-ids error when any are unknown. Inactive
    /// clients are allowed.
    async fn check_members_exist(&self, ids: &[Uuid], errors: &mut Vec<String>) -> Result<()> {
        let known = self.clients.existing_ids(ids).await?;
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !known.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            errors.push(format!("Unknown client ids: {}", missing.join(", ")));
        }
        Ok(())
    }

    pub async fn create_group(&self, request: CreateGroupRequest) -> Result<GroupWithMembers> {
        let member_ids = reconcile::dedupe_ids(request.client_ids);
        let name = request.name.trim().to_string();

        let mut errors = validation::validate_group_fields(
            &name,
            request.description.as_deref(),
            member_ids.len(),
            true,
        );
        self.check_members_exist(&member_ids, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        if self.groups.find_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict("Group name already exists".to_string()));
        }

        let now = Utc::now();
        let group = ClientGroup {
            id: Uuid::new_v4(),
            name,
            description: request.description,
            created_at: now,
            updated_at: now,
        };

        let created = self.groups.create(group, &member_ids).await?;
        let members = self.groups.members(created.id).await?;

        Ok(GroupWithMembers {
            group: created,
            members,
        })
    }

    pub async fn get_group(&self, id: Uuid) -> Result<GroupWithMembers> {
        // Independent read-only lookups, issued concurrently
        let (group, members) =
            tokio::try_join!(self.groups.find_by_id(id), self.groups.members(id))?;
        let group = group.ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        Ok(GroupWithMembers { group, members })
    }

    pub async fn list_groups(&self, limit: i64, offset: i64) -> Result<Vec<ClientGroup>> {
        self.groups.list(limit, offset).await
    }

    /// Full replacement edit: scalar fields and the complete desired
    /// member list. Applies the membership diff and the field update in
    /// one transaction and reports what changed.
    pub async fn update_group(
        &self,
        id: Uuid,
        request: UpdateGroupRequest,
    ) -> Result<(GroupWithMembers, MembershipDiff)> {
        let existing = self
            .groups
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let member_ids = reconcile::dedupe_ids(request.client_ids);
        let name = request.name.trim().to_string();

        let mut errors = validation::validate_group_fields(
            &name,
            request.description.as_deref(),
            member_ids.len(),
            false,
        );
        self.check_members_exist(&member_ids, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        // Renaming to another group's name conflicts; keeping the
        // current name does not.
        if let Some(other) = self.groups.find_by_name(&name).await? {
            if other.id != id {
                return Err(AppError::Conflict("Group name already exists".to_string()));
            }
        }

        let current: Vec<Uuid> = self
            .groups
            .members(id)
            .await?
            .iter()
            .map(|m| m.client_id)
            .collect();
        let diff = reconcile::diff_ids(&current, &member_ids);

        let updated = self
            .groups
            .update_with_members(
                ClientGroup {
                    id,
                    name,
                    description: request.description,
                    created_at: existing.created_at,
                    updated_at: existing.updated_at,
                },
                MembershipApply {
                    remove: diff.removed.clone(),
                    add: diff.added.clone(),
                },
            )
            .await?;

        let members = self.groups.members(id).await?;

        Ok((
            GroupWithMembers {
                group: updated,
                members,
            },
            diff,
        ))
    }

    /// Read-only dry run of an edit's membership outcome; mutates
    /// nothing.
    pub async fn preview_changes(
        &self,
        id: Uuid,
        desired_ids: Vec<Uuid>,
    ) -> Result<MembershipDiff> {
        self.groups
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let desired = reconcile::dedupe_ids(desired_ids);

        let mut errors = Vec::new();
        self.check_members_exist(&desired, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let current: Vec<Uuid> = self
            .groups
            .members(id)
            .await?
            .iter()
            .map(|m| m.client_id)
            .collect();

        Ok(reconcile::diff_ids(&current, &desired))
    }

    pub async fn delete_group(&self, id: Uuid) -> Result<()> {
        self.groups
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        self.groups.delete(id).await
    }
}
