//! Payer-to-payer exchange console library modules.
//!
//! The crate is organised as a hexagon: [`domain`] owns session, directory
//! and certificate workflow state plus the ports it talks through,
//! [`outbound`] adapts those ports to HTTP and the filesystem, and
//! [`inbound`] drives the views from the command line.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use config::ConsoleSettings;
