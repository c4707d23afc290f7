//! Relaynet CLI - scenario runner for the relay network core.
//!
//! This crate provides:
//! - relaynet-sim: runs a built-in or file-based scenario and reports each
//!   node's best route to a command hub

pub mod config;
pub mod sim;

pub use config::apply_env;
