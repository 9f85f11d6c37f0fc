//! Driven port for saving downloaded certificate payloads.

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while saving a download.
    pub enum DownloadSinkError {
        /// The file could not be written.
        Io { message: String } => "download could not be saved: {message}",
        /// The suggested file name was unusable.
        InvalidName { name: String } => "invalid download file name: {name}",
    }
}

/// Destination for whole-payload downloads.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
pub trait DownloadSink: Send + Sync {
    /// Save `contents` under `file_name`, returning where it landed.
    fn save(&self, file_name: &str, contents: &[u8]) -> Result<String, DownloadSinkError>;
}
