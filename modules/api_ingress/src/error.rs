use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Uniform response wrapper used by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            count: None,
            error: None,
            errors: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl Envelope<()> {
    /// Envelope with no payload.
    pub fn message(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            data: None,
            count: None,
            error: None,
            errors: None,
        }
    }
}

/// One failed field check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    /// Offending value as submitted; omitted when the field was absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Option<&Value>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: value.cloned(),
        }
    }
}

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    MalformedRequest(String),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("internal error: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
        /// Whether the cause may be shown to the client.
        expose: bool,
    },
}

impl ApiError {
    pub fn internal(source: impl Into<anyhow::Error>, expose: bool) -> Self {
        Self::Internal {
            source: source.into(),
            expose,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Internal { source, .. } => tracing::error!(
                error = format!("{source:#}"),
                status = status.as_u16(),
                "request failed"
            ),
            ApiError::Validation(errors) => tracing::info!(
                fields = errors.len(),
                status = status.as_u16(),
                "request rejected by validation"
            ),
            other => tracing::warn!(
                error = %other,
                status = status.as_u16(),
                "request failed"
            ),
        }

        let body = match self {
            ApiError::Validation(errors) => Envelope {
                errors: Some(errors),
                ..Envelope::message(false, "Validation failed")
            },
            ApiError::NotFound(m) | ApiError::Conflict(m) | ApiError::MalformedRequest(m) => {
                Envelope::message(false, m)
            }
            ApiError::PayloadTooLarge => Envelope::message(false, "Request body too large"),
            ApiError::Internal { source, expose } => Envelope {
                error: expose.then(|| format!("{source:#}")),
                ..Envelope::message(false, INTERNAL_ERROR_MESSAGE)
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_every_field() {
        let (status, body) = render(ApiError::Validation(vec![
            FieldError::new("name", "Name is required", None),
            FieldError::new("age", "Age must be an integer between 1 and 120", Some(&json!(0))),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Validation failed",
                "errors": [
                    { "field": "name", "message": "Name is required" },
                    { "field": "age", "message": "Age must be an integer between 1 and 120", "value": 0 }
                ]
            })
        );
    }

    #[tokio::test]
    async fn internal_detail_only_when_exposed() {
        let (status, hidden) = render(ApiError::internal(anyhow::anyhow!("disk on fire"), false)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(hidden, json!({ "success": false, "message": "Internal server error" }));

        let (_, shown) = render(ApiError::internal(anyhow::anyhow!("disk on fire"), true)).await;
        assert_eq!(shown["error"], "disk on fire");
    }

    #[tokio::test]
    async fn simple_errors_carry_message_only() {
        let (status, body) = render(ApiError::Conflict("Email is already registered".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({ "success": false, "message": "Email is already registered" })
        );
        let (status, _) = render(ApiError::PayloadTooLarge).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn ok_envelope_skips_empty_fields() {
        let v = serde_json::to_value(Envelope::ok("Users retrieved successfully", vec![1, 2]).with_count(2))
            .unwrap();
        assert_eq!(
            v,
            json!({ "success": true, "message": "Users retrieved successfully", "data": [1, 2], "count": 2 })
        );
    }
}
