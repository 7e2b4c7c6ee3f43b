use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::contract::model::{NewUser, User, UserPatch, UserStats};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;
use crate::domain::stats;

/// Domain service for the users collection.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "users_info.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = self.repo.list_all().await?;
        debug!(count = users.len(), "listed users");
        Ok(users)
    }

    #[instrument(name = "users_info.service.get_user", skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: u64) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(
        name = "users_info.service.create_user",
        skip(self, new_user),
        fields(email = %new_user.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        if self.repo.email_exists(&new_user.email, None).await? {
            return Err(DomainError::email_already_exists(new_user.email));
        }

        let user = self.repo.create(new_user).await?;
        info!(user_id = user.id, "created user");
        Ok(user)
    }

    /// The email conflict check runs before the existence check, so a taken
    /// email wins over an unknown id.
    #[instrument(name = "users_info.service.update_user", skip(self, patch), fields(user_id = id))]
    pub async fn update_user(&self, id: u64, patch: UserPatch) -> Result<User, DomainError> {
        if let Some(email) = patch.email.as_deref() {
            if self.repo.email_exists(email, Some(id)).await? {
                return Err(DomainError::email_taken_by_other_user(email));
            }
        }

        let user = self
            .repo
            .update(id, patch)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        info!("updated user");
        Ok(user)
    }

    #[instrument(name = "users_info.service.delete_user", skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: u64) -> Result<(), DomainError> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::user_not_found(id));
        }
        info!("deleted user");
        Ok(())
    }

    #[instrument(name = "users_info.service.stats", skip(self))]
    pub async fn stats(&self) -> Result<UserStats, DomainError> {
        let users = self.repo.list_all().await?;
        Ok(stats::compute(&users))
    }
}
