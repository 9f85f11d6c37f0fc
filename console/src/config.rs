//! Console configuration loaded via OrthoConfig.
//!
//! Values come from the environment (`PORTAL_*`) and config files, over
//! the defaults declared on each field.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::{DEFAULT_PAGE_SIZE, PageSize};
use serde::Deserialize;
use url::Url;

use crate::domain::ViewOptions;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_DIR: &str = ".portal-console";
const DEFAULT_DOWNLOAD_DIR: &str = ".";
const DEFAULT_STATUS_CLEAR_MS: u64 = 2500;

/// Errors raised when a configured value is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The portal base URL did not parse.
    #[error("invalid portal base url '{value}': {message}")]
    BaseUrl { value: String, message: String },
    /// The page size was zero.
    #[error("page size must be at least 1")]
    PageSize,
}

/// Settings for reaching the portal and storing local state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct ConsoleSettings {
    /// Portal base URL; requests are resolved relative to it.
    #[ortho_config(default = String::from(DEFAULT_BASE_URL))]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[ortho_config(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
    /// Directory holding the persisted session.
    #[ortho_config(default = PathBuf::from(DEFAULT_SESSION_DIR))]
    pub session_dir: PathBuf,
    /// Directory certificate downloads are written to.
    #[ortho_config(default = PathBuf::from(DEFAULT_DOWNLOAD_DIR))]
    pub download_dir: PathBuf,
    /// Rows per list page.
    #[ortho_config(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Milliseconds a transient status message stays visible.
    #[ortho_config(default = DEFAULT_STATUS_CLEAR_MS)]
    pub status_clear_ms: u64,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            page_size: DEFAULT_PAGE_SIZE,
            status_clear_ms: DEFAULT_STATUS_CLEAR_MS,
        }
    }
}

impl ConsoleSettings {
    /// Parsed portal base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BaseUrl`] when the value is not an absolute URL.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        Url::parse(self.base_url.trim()).map_err(|error| SettingsError::BaseUrl {
            value: self.base_url.clone(),
            message: error.to_string(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_dir(&self) -> PathBuf {
        self.session_dir.clone()
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone()
    }

    /// View options derived from the page size and status delay.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::PageSize`] for a zero page size.
    pub fn view_options(&self) -> Result<ViewOptions, SettingsError> {
        let page_size = PageSize::new(self.page_size).map_err(|_| SettingsError::PageSize)?;
        Ok(ViewOptions {
            page_size,
            status_clear_after: Duration::from_millis(self.status_clear_ms),
        })
    }
}
