//! HTTP adapter for the payer portal.

mod dto;
mod portal_api;

pub use portal_api::HttpPortalApi;
