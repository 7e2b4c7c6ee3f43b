use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{middleware::from_fn, routing::get, Extension, Json, Router};
use runtime::{AppConfig, RunMode};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
};

mod config;
pub mod error;
pub mod model;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use error::{ApiError, Envelope, FieldError};
pub use model::{ApiCatalog, EndpointDoc};

/// Name of the module section in the application config.
pub const MODULE_NAME: &str = "api_ingress";

/// HTTP host: wraps module routers with the host endpoints, the not-found
/// catalog and the cross-cutting middleware stack.
#[derive(Debug, Clone)]
pub struct ApiIngress {
    config: ApiIngressConfig,
    mode: RunMode,
    request_timeout: Option<Duration>,
    started_at: Instant,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default(), RunMode::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig, mode: RunMode) -> Self {
        Self {
            config,
            mode,
            request_timeout: None,
            started_at: Instant::now(),
        }
    }

    /// Read the `api_ingress` section plus the server-wide mode and timeout.
    pub fn from_app_config(app: &AppConfig) -> Result<Self> {
        let cfg = app
            .module_config::<ApiIngressConfig>(MODULE_NAME)
            .context("invalid api_ingress config")?;
        Ok(Self::new(cfg, app.server.mode).with_request_timeout(app.server.timeout_sec))
    }

    /// Per-request timeout in seconds; 0 disables it.
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Build the full application router around a module router.
    pub fn build_router(&self, api: Router, catalog: ApiCatalog) -> Router {
        let state = Arc::new(web::HostState {
            catalog,
            mode: self.mode,
            started_at: self.started_at,
        });

        let mut router = Router::new()
            .route("/", get(web::root))
            .route(web::HEALTH_PATH, get(web::health_check))
            .route(web::DOCS_PATH, get(web::docs))
            .merge(api)
            .fallback(web::not_found)
            .method_not_allowed_fallback(web::not_found)
            .layer(Extension(state));

        // Layers are added innermost first. Request order, outermost to innermost:
        // SetRequestId -> PropagateRequestId -> extensions -> Trace -> CatchPanic
        // -> Timeout -> CORS -> security headers -> BodyLimit
        let limit = self.config.body_limit_bytes;
        router = router
            .layer(DefaultBodyLimit::max(limit))
            .layer(RequestBodyLimitLayer::new(limit));

        if self.config.security_headers {
            router = router
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ));
        }

        if self.config.cors_enabled {
            router = router.layer(self.cors_layer());
        }

        if let Some(timeout) = self.request_timeout {
            router = router.layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                timeout,
            ));
        }

        let x_request_id = request_id::header();
        router
            .layer(CatchPanicLayer::custom(panic_response(self.mode.is_development())))
            .layer(request_id::create_trace_layer())
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    fn cors_layer(&self) -> CorsLayer {
        let origin = if self.config.allowed_origins.is_empty() {
            AllowOrigin::any()
        } else {
            let origins: Vec<HeaderValue> = self
                .config
                .allowed_origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(origins)
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    }
}

fn panic_response(
    expose: bool,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |payload| {
        let detail = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else {
            "unknown panic payload".to_owned()
        };
        tracing::error!(panic = %detail, "handler panicked");

        let body = Envelope {
            error: expose.then_some(detail),
            ..Envelope::message(false, error::INTERNAL_ERROR_MESSAGE)
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_disables_it() {
        let host = ApiIngress::default().with_request_timeout(0);
        assert_eq!(host.request_timeout, None);
        let host = host.with_request_timeout(5);
        assert_eq!(host.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn from_app_config_reads_module_section() {
        let mut app = AppConfig::default();
        app.server.mode = RunMode::Production;
        app.server.timeout_sec = 30;
        app.modules.insert(
            MODULE_NAME.into(),
            serde_json::json!({ "cors_enabled": false, "body_limit_bytes": 1024 }),
        );

        let host = ApiIngress::from_app_config(&app).unwrap();
        assert!(!host.config().cors_enabled);
        assert_eq!(host.config().body_limit_bytes, 1024);
        assert!(host.config().security_headers);
        assert_eq!(host.mode(), RunMode::Production);
        assert_eq!(host.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn from_app_config_rejects_bad_section() {
        let mut app = AppConfig::default();
        app.modules
            .insert(MODULE_NAME.into(), serde_json::json!({ "cors_enabled": "maybe" }));
        assert!(ApiIngress::from_app_config(&app).is_err());
    }
}
