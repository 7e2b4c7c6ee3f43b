use api_ingress::ApiError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
};
use serde_json::{Map, Value};

use crate::api::rest::validation;

pub const CONTENT_TYPE_MSG: &str = "Content-Type must be application/json";
pub const MALFORMED_JSON_MSG: &str = "Malformed JSON in request body";

/// Sanitized JSON body of a mutating request.
///
/// Requires a JSON media type. An empty body reads as `{}`; anything other
/// than an object or array is malformed.
#[derive(Debug, Clone)]
pub struct JsonPayload(pub Value);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(ApiError::MalformedRequest(CONTENT_TYPE_MSG.into()));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rej| {
            if rej.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge
            } else {
                tracing::debug!(error = %rej.body_text(), "failed to read request body");
                ApiError::MalformedRequest(MALFORMED_JSON_MSG.into())
            }
        })?;

        let mut value = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            serde_json::from_slice::<Value>(&bytes)
                .ok()
                .filter(|v| v.is_object() || v.is_array())
                .ok_or_else(|| ApiError::MalformedRequest(MALFORMED_JSON_MSG.into()))?
        };

        validation::sanitize(&mut value);
        Ok(Self(value))
    }
}

/// `application/json` only, parameters ignored.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(ct) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json"
}
