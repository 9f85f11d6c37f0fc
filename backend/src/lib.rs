//! Local stand-in for the payer-to-payer portal HTTP API.

pub mod api;
pub mod config;
pub mod doc;
pub mod fixtures;
pub mod middleware;
pub mod state;

pub use doc::ApiDoc;
pub use middleware::Trace;
pub use state::PortalState;
