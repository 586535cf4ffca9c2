//! connect-backup - backup and restore for Amazon Connect instances
//!
//! This library provides the core functionality of the `connect-backup`
//! command-line tool. It snapshots the configuration of a contact-center
//! instance into JSON documents and restores single resources from them.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Resource kinds, records and identities
//! - `provider`: Remote API seam and its AWS SDK binding
//! - `catalog`: Per-kind list/describe operations and the fetch engine
//! - `storage`: Record layout, destinations and sources
//! - `backup`: Backup, restore and rename orchestration
//! - `cli`, `display`: Command handlers and terminal output
//!
//! # Example
//!
//! ```rust,ignore
//! use connect_backup::config::{ConfigPaths, Settings};
//!
//! let paths = ConfigPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod backup;
pub mod cancel;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod provider;
pub mod storage;

pub use error::{BackupResult, ConnectBackupError};
