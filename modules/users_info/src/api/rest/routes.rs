use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::handlers::{self, RestContext};
use crate::domain::service::Service;

pub const USERS_PATH: &str = "/api/users";

pub fn register_routes(router: Router, service: Arc<Service>, ctx: RestContext) -> Router {
    router
        // literal segment, matched ahead of `{id}`; PUT and DELETE still go
        // through id validation
        .route(
            "/api/users/stats",
            get(handlers::user_stats)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            USERS_PATH,
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(service))
        .layer(Extension(ctx))
}
