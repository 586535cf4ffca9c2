//! Configuration module for connect-backup
//!
//! - path resolution for the configuration directory
//! - persisted defaults for provider access, backup and rename runs

pub mod paths;
pub mod settings;

pub use paths::ConfigPaths;
pub use settings::{Settings, DEFAULT_FLOW_NAMES};
