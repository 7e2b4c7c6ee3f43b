use serde::{Deserialize, Serialize};

/// HTTP host settings, read from the `api_ingress` module section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiIngressConfig {
    pub cors_enabled: bool,
    /// Allowed CORS origins; empty means any origin.
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
    pub security_headers: bool,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            cors_enabled: true,
            allowed_origins: Vec::new(),
            body_limit_bytes: 10 * 1024 * 1024,
            security_headers: true,
        }
    }
}
