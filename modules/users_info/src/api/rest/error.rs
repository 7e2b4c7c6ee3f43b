use api_ingress::ApiError;

use crate::domain::error::DomainError;

pub const EMAIL_TAKEN_MSG: &str = "Email is already registered";
pub const EMAIL_TAKEN_BY_OTHER_MSG: &str = "Email is already registered by another user";

/// Map a domain error to the HTTP error it surfaces as.
pub fn map_domain_error(e: DomainError, expose_internal: bool) -> ApiError {
    match e {
        DomainError::UserNotFound { .. } => ApiError::NotFound(e.to_string()),
        DomainError::EmailAlreadyExists { .. } => ApiError::Conflict(EMAIL_TAKEN_MSG.into()),
        DomainError::EmailTakenByOtherUser { .. } => {
            ApiError::Conflict(EMAIL_TAKEN_BY_OTHER_MSG.into())
        }
        DomainError::Storage(source) => ApiError::internal(source, expose_internal),
    }
}
