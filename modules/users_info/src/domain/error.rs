use thiserror::Error;

use crate::infra::storage::StorageError;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User with ID {id} not found")]
    UserNotFound { id: u64 },

    #[error("Email '{email}' is already registered")]
    EmailAlreadyExists { email: String },

    #[error("Email '{email}' is already registered by another user")]
    EmailTakenByOtherUser { email: String },

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl DomainError {
    pub fn user_not_found(id: u64) -> Self {
        Self::UserNotFound { id }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn email_taken_by_other_user(email: impl Into<String>) -> Self {
        Self::EmailTakenByOtherUser {
            email: email.into(),
        }
    }
}
