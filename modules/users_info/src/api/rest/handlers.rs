use std::sync::Arc;

use api_ingress::{ApiError, Envelope};
use axum::{extract::Path, http::StatusCode, response::Json, Extension};
use tracing::{debug, info};

use crate::api::rest::dto::{StatsDto, UserDto};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::JsonPayload;
use crate::api::rest::validation;
use crate::domain::service::Service;

/// Per-router settings the handlers need besides the service.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestContext {
    pub expose_internal_errors: bool,
}

type Svc = Extension<Arc<Service>>;
type Ctx = Extension<RestContext>;

/// List all users with their count
pub async fn list_users(
    Extension(svc): Svc,
    Extension(ctx): Ctx,
) -> Result<Json<Envelope<Vec<UserDto>>>, ApiError> {
    let users = svc
        .list_users()
        .await
        .map_err(|e| map_domain_error(e, ctx.expose_internal_errors))?;
    let count = users.len();
    let data = users.into_iter().map(UserDto::from).collect();
    Ok(Json(
        Envelope::ok("Users retrieved successfully", data).with_count(count),
    ))
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Svc,
    Extension(ctx): Ctx,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<UserDto>>, ApiError> {
    let id = validation::validate_user_id(&raw_id).map_err(|e| ApiError::Validation(vec![e]))?;
    debug!(user_id = id, "getting user");

    let user = svc
        .get_user(id)
        .await
        .map_err(|e| map_domain_error(e, ctx.expose_internal_errors))?;
    Ok(Json(Envelope::ok("User retrieved successfully", user.into())))
}

/// Create a new user
pub async fn create_user(
    Extension(svc): Svc,
    Extension(ctx): Ctx,
    JsonPayload(body): JsonPayload,
) -> Result<(StatusCode, Json<Envelope<UserDto>>), ApiError> {
    let new_user = validation::validate_create(&body).map_err(ApiError::Validation)?;

    let user = svc
        .create_user(new_user)
        .await
        .map_err(|e| map_domain_error(e, ctx.expose_internal_errors))?;
    info!(user_id = user.id, "user created via REST");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("User created successfully", user.into())),
    ))
}

/// Update an existing user
pub async fn update_user(
    Extension(svc): Svc,
    Extension(ctx): Ctx,
    Path(raw_id): Path<String>,
    JsonPayload(body): JsonPayload,
) -> Result<Json<Envelope<UserDto>>, ApiError> {
    let (id, patch) =
        validation::validate_update(&raw_id, &body).map_err(ApiError::Validation)?;

    let user = svc
        .update_user(id, patch)
        .await
        .map_err(|e| map_domain_error(e, ctx.expose_internal_errors))?;
    Ok(Json(Envelope::ok("User updated successfully", user.into())))
}

/// Delete a user by ID
pub async fn delete_user(
    Extension(svc): Svc,
    Extension(ctx): Ctx,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = validation::validate_user_id(&raw_id).map_err(|e| ApiError::Validation(vec![e]))?;

    svc.delete_user(id)
        .await
        .map_err(|e| map_domain_error(e, ctx.expose_internal_errors))?;
    Ok(Json(Envelope::message(true, "User deleted successfully")))
}

/// Aggregate statistics over all users
pub async fn user_stats(
    Extension(svc): Svc,
    Extension(ctx): Ctx,
) -> Result<Json<Envelope<StatsDto>>, ApiError> {
    let stats = svc
        .stats()
        .await
        .map_err(|e| map_domain_error(e, ctx.expose_internal_errors))?;
    Ok(Json(Envelope::ok(
        "Statistics retrieved successfully",
        stats.into(),
    )))
}
