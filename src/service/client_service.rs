use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{Client, CreateClientRequest, UpdateClientRequest},
    error::{AppError, Result},
    repository::ClientRepository,
    validation,
};

pub struct ClientService {
    repo: Arc<dyn ClientRepository>,
}

impl ClientService {
    pub fn new(repo: Arc<dyn ClientRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_client(&self, request: CreateClientRequest) -> Result<Client> {
        let errors = validation::validate_client_fields(
            Some(&request.name),
            Some(&request.username),
            Some(&request.password),
        );
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        if self
            .repo
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        self.repo.create(request).await
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
    }

    pub async fn list_clients(&self, limit: i64, offset: i64) -> Result<Vec<Client>> {
        self.repo.list(limit, offset).await
    }

    pub async fn list_active_clients(&self) -> Result<Vec<Client>> {
        self.repo.list_active().await
    }

    pub async fn update_client(&self, id: Uuid, update: UpdateClientRequest) -> Result<Client> {
        let existing = self.get_client(id).await?;

        let errors = validation::validate_client_fields(
            update.name.as_deref(),
            update.username.as_deref(),
            update.password.as_deref(),
        );
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        // A changed username must stay unique across clients
        if let Some(username) = &update.username {
            if *username != existing.username
                && self.repo.find_by_username(username).await?.is_some()
            {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
        }

        self.repo.update(id, update).await
    }
}
