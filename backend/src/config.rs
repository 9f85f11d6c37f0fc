//! Server settings loaded via OrthoConfig from `PORTAL_BACKEND_*`.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bind address '{value}': {message}")]
pub struct BindAddrError {
    value: String,
    message: String,
}

#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL_BACKEND")]
pub struct BackendSettings {
    /// Socket address the HTTP server listens on.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
    /// Worker threads; actix picks one per core when unset.
    pub workers: Option<usize>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            workers: None,
        }
    }
}

impl BackendSettings {
    /// Parsed listening address.
    ///
    /// # Errors
    ///
    /// Returns [`BindAddrError`] when the value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, BindAddrError> {
        self.bind_addr
            .trim()
            .parse()
            .map_err(|error: std::net::AddrParseError| BindAddrError {
                value: self.bind_addr.clone(),
                message: error.to_string(),
            })
    }

    pub fn workers(&self) -> Option<usize> {
        self.workers.filter(|count| *count > 0)
    }
}
