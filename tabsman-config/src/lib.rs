//! Configuration system for the tabsman tab and history engine.
//!
//! This crate provides configuration loading, saving, and default values
//! for the engine. It includes:
//!
//! - History bounds (back/forward stack lengths)
//! - Recently-closed capacity and history-menu limits
//! - Placeholder tab name/icon and notification prefix
//! - Host UI hints (sidebar default, clear-data command availability)

pub mod config;
pub mod defaults;
pub mod error;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
