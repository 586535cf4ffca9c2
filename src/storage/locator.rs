//! Source and destination locators
//!
//! A locator string is either an object-store URL (`s3://bucket/key`), a
//! filesystem path, or `-` for the console.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{BackupResult, ConnectBackupError};

use super::layout::JSON_EXTENSION;

/// URL scheme of object-store locators
pub const OBJECT_STORE_SCHEME: &str = "s3://";

/// Resolved location of a source or destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    File(PathBuf),
    ObjectStore { bucket: String, key: String },
    Console,
}

impl Locator {
    /// Sniff the scheme of a locator string
    pub fn parse(s: &str) -> BackupResult<Self> {
        let s = s.trim();
        if s.is_empty() || s == "-" {
            return Ok(Self::Console);
        }

        if let Some(rest) = s.strip_prefix(OBJECT_STORE_SCHEME) {
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            if bucket.is_empty() {
                return Err(ConnectBackupError::Config(format!(
                    "object-store URL has no bucket: {}",
                    s
                )));
            }
            return Ok(Self::ObjectStore {
                bucket: bucket.to_string(),
                key: key.trim_start_matches('/').to_string(),
            });
        }

        if s.contains("://") {
            return Err(ConnectBackupError::Config(format!(
                "unsupported locator scheme: {}",
                s
            )));
        }

        Ok(Self::File(PathBuf::from(s)))
    }

    /// Locator of a record in another namespace of the same instance.
    ///
    /// `<root>/<instance>/<namespace>/<name>.json` becomes
    /// `<root>/<instance>/<sibling_namespace>/<stem>.json`. For a routing
    /// profile's queue set the stem is the profile's name, the key backups
    /// group queue sets under, never its id.
    pub fn sibling(&self, sibling_namespace: &str, stem: &str) -> BackupResult<Self> {
        let file_name = format!("{}{}", stem, JSON_EXTENSION);
        match self {
            Self::File(path) => {
                let instance_dir = path
                    .parent()
                    .and_then(Path::parent)
                    .ok_or_else(|| no_sibling(self))?;
                Ok(Self::File(instance_dir.join(sibling_namespace).join(file_name)))
            }
            Self::ObjectStore { bucket, key } => {
                let mut segments: Vec<&str> = key.split('/').collect();
                if segments.len() < 2 {
                    return Err(no_sibling(self));
                }
                segments.truncate(segments.len() - 2);
                segments.push(sibling_namespace);
                segments.push(&file_name);
                Ok(Self::ObjectStore {
                    bucket: bucket.clone(),
                    key: segments.join("/"),
                })
            }
            Self::Console => Err(no_sibling(self)),
        }
    }
}

fn no_sibling(locator: &Locator) -> ConnectBackupError {
    ConnectBackupError::Read(format!(
        "cannot derive a sibling record location from {}",
        locator
    ))
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::ObjectStore { bucket, key } => {
                write!(f, "{}{}/{}", OBJECT_STORE_SCHEME, bucket, key)
            }
            Self::Console => f.write_str("console"),
        }
    }
}
