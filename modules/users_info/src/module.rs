use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use api_ingress::{ApiCatalog, EndpointDoc};
use axum::Router;
use runtime::AppConfig;
use serde_json::json;
use tracing::{info, warn};

use crate::api::rest::handlers::RestContext;
use crate::api::rest::routes::{self, USERS_PATH};
use crate::config::UsersInfoConfig;
use crate::domain::service::Service;
use crate::infra::storage::{JsonFileStore, JsonFileUsersRepository};

pub const MODULE_NAME: &str = "users_info";

/// The users collection: storage, service and REST routes.
pub struct UsersInfo {
    service: Arc<Service>,
    store: JsonFileStore,
    rest: RestContext,
}

impl UsersInfo {
    /// Resolve the data file, prepare it and build the service.
    pub async fn init(app: &AppConfig) -> Result<Self> {
        let cfg: UsersInfoConfig = app
            .module_config(MODULE_NAME)
            .context("invalid users_info config")?;
        let store = JsonFileStore::new(app.resolve_path(&cfg.data_file));

        if store.exists().await? {
            if cfg.backup_on_start {
                store.backup().await?;
            }
        } else if cfg.create_if_missing {
            store.ensure_initialized().await?;
        } else {
            bail!(
                "data file {} does not exist and create_if_missing is disabled",
                store.path().display()
            );
        }

        let doc = store
            .read()
            .await
            .with_context(|| format!("cannot load {}", store.path().display()))?;
        info!(
            path = %store.path().display(),
            users = doc.users.len(),
            next_id = doc.next_id,
            "users_info initialized"
        );

        let repo = JsonFileUsersRepository::new(store.clone());
        Ok(Self {
            service: Arc::new(Service::new(Arc::new(repo))),
            store,
            rest: RestContext {
                expose_internal_errors: app.server.mode.is_development(),
            },
        })
    }

    /// Check the data file without touching it. Returns a one-line status.
    pub async fn check(app: &AppConfig) -> Result<String> {
        let cfg: UsersInfoConfig = app
            .module_config(MODULE_NAME)
            .context("invalid users_info config")?;
        let store = JsonFileStore::new(app.resolve_path(&cfg.data_file));

        if store.exists().await? {
            let doc = store.read().await?;
            return Ok(format!(
                "data file {} holds {} users",
                store.path().display(),
                doc.users.len()
            ));
        }
        if cfg.create_if_missing {
            warn!(path = %store.path().display(), "data file is missing and will be created on start");
            return Ok(format!(
                "data file {} will be created on start",
                store.path().display()
            ));
        }
        bail!(
            "data file {} does not exist and create_if_missing is disabled",
            store.path().display()
        )
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn data_file(&self) -> &Path {
        self.store.path()
    }

    pub fn register_rest(&self, router: Router) -> Router {
        routes::register_routes(router, self.service.clone(), self.rest)
    }

    /// Endpoint documentation shown by the host.
    pub fn catalog() -> ApiCatalog {
        let id_param = json!({ "id": "number - user ID" });
        let mut resources = BTreeMap::new();
        resources.insert("users".to_string(), USERS_PATH.to_string());

        ApiCatalog {
            title: "Users API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            resources,
            endpoints: vec![
                EndpointDoc::new("GET", "/api/users", "Returns every user", "Array of users"),
                EndpointDoc::new("GET", "/api/users/:id", "Returns one user by ID", "User object")
                    .with_parameters(id_param.clone()),
                EndpointDoc::new("POST", "/api/users", "Creates a user", "Created user").with_body(
                    json!({
                        "name": "string - user name (required)",
                        "email": "string - user email (required)",
                        "age": "number - user age (required)"
                    }),
                ),
                EndpointDoc::new("PUT", "/api/users/:id", "Updates an existing user", "Updated user")
                    .with_parameters(id_param.clone())
                    .with_body(json!({
                        "name": "string - user name (optional)",
                        "email": "string - user email (optional)",
                        "age": "number - user age (optional)"
                    })),
                EndpointDoc::new("DELETE", "/api/users/:id", "Deletes a user", "Deletion confirmation")
                    .with_parameters(id_param),
                EndpointDoc::new("GET", "/api/users/stats", "Returns user statistics", "Aggregate statistics"),
            ],
            examples: json!({
                "createUser": {
                    "url": "/api/users",
                    "method": "POST",
                    "body": { "name": "Ana Martínez", "email": "ana.martinez@email.com", "age": 28 }
                },
                "updateUser": {
                    "url": "/api/users/1",
                    "method": "PUT",
                    "body": { "name": "Ana Martínez López", "age": 29 }
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_config(home: &Path, section: serde_json::Value) -> AppConfig {
        let mut app = AppConfig::default();
        app.server.home_dir = home.to_string_lossy().into_owned();
        app.modules.insert(MODULE_NAME.into(), section);
        app
    }

    #[tokio::test]
    async fn init_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_config(dir.path(), json!({}));

        let module = UsersInfo::init(&app).await.unwrap();
        assert_eq!(module.data_file(), dir.path().join("data/users.json"));
        assert!(module.data_file().exists());
        assert!(module.service().list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn init_fails_when_creation_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_config(dir.path(), json!({ "create_if_missing": false }));
        assert!(UsersInfo::init(&app).await.is_err());
        assert!(UsersInfo::check(&app).await.is_err());
    }

    #[tokio::test]
    async fn init_backs_up_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("users.json");
        std::fs::write(&file, r#"{"users":[],"nextId":4}"#).unwrap();
        let app = app_config(
            dir.path(),
            json!({ "data_file": "users.json", "backup_on_start": true }),
        );

        UsersInfo::init(&app).await.unwrap();
        let backups = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("users.json.backup."))
            .count();
        assert_eq!(backups, 1);
    }

    #[tokio::test]
    async fn init_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.json"), "not json").unwrap();
        let app = app_config(dir.path(), json!({ "data_file": "users.json" }));
        assert!(UsersInfo::init(&app).await.is_err());
    }

    #[tokio::test]
    async fn check_does_not_create_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_config(dir.path(), json!({}));
        let status = UsersInfo::check(&app).await.unwrap();
        assert!(status.contains("will be created"), "{status}");
        assert!(!dir.path().join("data/users.json").exists());
    }

    #[test]
    fn catalog_lists_stats_last() {
        let catalog = UsersInfo::catalog();
        let lines: Vec<String> = catalog.endpoints.iter().map(|e| e.route_line()).collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5], "GET /api/users/stats");
        assert_eq!(catalog.resources["users"], "/api/users");
    }
}
