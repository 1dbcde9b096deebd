//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate directory.
//! - Writing changes back to disk.
//! - Providing sensible defaults when the file does not exist yet (first run).
//! - Serving the settings to the workspace through `ConfigurationProvider`.

pub mod config;
