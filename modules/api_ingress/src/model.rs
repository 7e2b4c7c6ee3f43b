use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// One documented endpoint as shown by `/api/docs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    pub response: &'static str,
}

impl EndpointDoc {
    pub fn new(
        method: &'static str,
        path: &'static str,
        description: &'static str,
        response: &'static str,
    ) -> Self {
        Self {
            method,
            path,
            description,
            parameters: None,
            body: None,
            response,
        }
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// `"METHOD path"` as listed in the not-found catalog.
    pub fn route_line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// What a module contributes to the root, docs and not-found responses.
#[derive(Debug, Clone, Default)]
pub struct ApiCatalog {
    /// Service name used in the root and docs messages.
    pub title: String,
    pub version: String,
    /// Top-level resource name -> base path, shown by `/`.
    pub resources: BTreeMap<String, String>,
    pub endpoints: Vec<EndpointDoc>,
    pub examples: Value,
}
