//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod download_sink;
mod portal_api;
mod session_store;

#[cfg(any(test, feature = "test-support"))]
pub use download_sink::MockDownloadSink;
pub use download_sink::{DownloadSink, DownloadSinkError};
#[cfg(any(test, feature = "test-support"))]
pub use portal_api::MockPortalApi;
pub use portal_api::{
    CertificateSigningRequest, ConnectKind, ConnectRequest, DownloadRequest, GenerateRequest,
    LoginIdentity, PortalApi, PortalApiError, UploadRequest, VerificationReply,
};
#[cfg(any(test, feature = "test-support"))]
pub use session_store::MockSessionStore;
pub use session_store::{InMemorySessionStore, SessionStore, SessionStoreError};
