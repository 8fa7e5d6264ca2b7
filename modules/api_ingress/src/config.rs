use serde::{Deserialize, Serialize};

/// HTTP host settings, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    /// Falls back to `server.host:server.port` when unset.
    pub bind_addr: Option<String>,
    pub cors_enabled: bool,
    /// Per-request handler deadline; 0 disables it.
    pub request_timeout_sec: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: None,
            cors_enabled: true,
            request_timeout_sec: 120,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl ApiIngressConfig {
    pub fn resolve_bind_addr(&self, host: &str, port: u16) -> String {
        match &self.bind_addr {
            Some(addr) if !addr.trim().is_empty() => addr.clone(),
            _ => format!("{host}:{port}"),
        }
    }
}
