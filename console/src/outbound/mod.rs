//! Outbound adapters: portal HTTP client and local file storage.

pub mod download_dir;
pub mod http;
pub mod session_file;

pub use download_dir::DirectoryDownloadSink;
pub use http::HttpPortalApi;
pub use session_file::FileSessionStore;
