//! Inbound adapters driving the console views.

pub mod cli;
