//! Backup destinations
//!
//! A destination owns a root (directory, bucket prefix, or stdout) and knows
//! how to put bytes at a relative path under the current instance. Mapping a
//! record to its path and serializing it lives in the provided trait methods,
//! so every destination shares one layout.

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{BackupResult, ConnectBackupError};
use crate::models::{RecordGroup, ResourceKind, ResourceRecord};
use crate::provider::ObjectStore;

use super::file_io::write_atomic;
use super::layout::{canonical_path, grouped_path, raw_flow_path, RelativePath};

/// Where a backup run writes records
pub trait Destination {
    /// Prepare the namespace of `instance`. Must run before any write for
    /// that instance; running it again is harmless.
    fn init(&mut self, instance: &str) -> BackupResult<()>;

    /// Persist `body` at `path` under the current instance
    fn put(&mut self, path: &RelativePath, body: &[u8]) -> BackupResult<()>;

    /// Human readable description for logs
    fn describe(&self) -> String;

    /// Write a named or singleton record at its canonical path
    fn write(&mut self, record: &ResourceRecord) -> BackupResult<RelativePath> {
        let path = canonical_path(record.kind(), record.natural_name());
        let json = record.to_json().map_err(|e| {
            ConnectBackupError::Write(format!("Failed to serialize {}: {}", path, e))
        })?;
        self.put(&path, json.as_bytes())?;
        Ok(path)
    }

    /// Write a collection whose members have no unique name of their own,
    /// at a path derived from the parent's name
    fn write_grouped(&mut self, group: &str, records: &RecordGroup) -> BackupResult<RelativePath> {
        let path = grouped_path(records.kind(), group);
        let json = records.to_json().map_err(|e| {
            ConnectBackupError::Write(format!("Failed to serialize {}: {}", path, e))
        })?;
        self.put(&path, json.as_bytes())?;
        Ok(path)
    }

    /// Write a flow's script content unescaped and indented
    fn write_raw(&mut self, name: &str, raw: &str) -> BackupResult<RelativePath> {
        let path = raw_flow_path(name);
        let content: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
            ConnectBackupError::Write(format!("Content of flow '{}' is not JSON: {}", name, e))
        })?;
        let pretty = serde_json::to_string_pretty(&content).map_err(|e| {
            ConnectBackupError::Write(format!("Failed to format flow '{}': {}", name, e))
        })?;
        self.put(&path, pretty.as_bytes())?;
        Ok(path)
    }
}

fn not_initialized() -> ConnectBackupError {
    ConnectBackupError::Write("destination used before init".into())
}

/// Writes records below a directory
#[derive(Debug)]
pub struct FileDestination {
    root: PathBuf,
    instance: Option<String>,
}

impl FileDestination {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            instance: None,
        }
    }
}

impl Destination for FileDestination {
    fn init(&mut self, instance: &str) -> BackupResult<()> {
        let instance_dir = self.root.join(instance);
        for namespace in ResourceKind::namespaces() {
            let dir = instance_dir.join(namespace);
            std::fs::create_dir_all(&dir).map_err(|e| {
                ConnectBackupError::Write(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        self.instance = Some(instance.to_string());
        Ok(())
    }

    fn put(&mut self, path: &RelativePath, body: &[u8]) -> BackupResult<()> {
        let instance = self.instance.as_deref().ok_or_else(not_initialized)?;
        let full_path = path.to_path(&self.root, instance);
        debug!(path = %full_path.display(), "writing file");
        write_atomic(&full_path, body)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Writes records as objects below a bucket prefix
pub struct ObjectStoreDestination<S: ObjectStore> {
    store: S,
    bucket: String,
    prefix: String,
    instance: Option<String>,
}

impl<S: ObjectStore> ObjectStoreDestination<S> {
    pub fn new(store: S, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            prefix: prefix.into(),
            instance: None,
        }
    }
}

impl<S: ObjectStore> Destination for ObjectStoreDestination<S> {
    fn init(&mut self, instance: &str) -> BackupResult<()> {
        // object stores have no directories to create
        self.instance = Some(instance.to_string());
        Ok(())
    }

    fn put(&mut self, path: &RelativePath, body: &[u8]) -> BackupResult<()> {
        let instance = self.instance.as_deref().ok_or_else(not_initialized)?;
        let key = path.to_key(&self.prefix, instance);
        debug!(bucket = %self.bucket, %key, "writing object");
        self.store
            .put_object(&self.bucket, &key, body)
            .map_err(|e| ConnectBackupError::Write(e.to_string()))
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix)
    }
}

/// Prints records to a stream, one JSON document after another
pub struct ConsoleDestination<W: Write> {
    out: W,
}

impl<W: Write> ConsoleDestination<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleDestination<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Destination for ConsoleDestination<W> {
    fn init(&mut self, _instance: &str) -> BackupResult<()> {
        Ok(())
    }

    fn put(&mut self, _path: &RelativePath, body: &[u8]) -> BackupResult<()> {
        self.out
            .write_all(body)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush())
            .map_err(|e| ConnectBackupError::Write(format!("Failed to write to console: {}", e)))
    }

    fn describe(&self) -> String {
        "console".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactFlow, PromptSummary};
    use crate::provider::mock::MemoryStore;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn flow(name: &str) -> ResourceRecord {
        ResourceRecord::Flow(
            serde_json::from_value(json!({
                "Id": format!("id-{}", name),
                "Name": name,
                "Content": "{\"Version\":\"2019-10-30\",\"Actions\":[]}"
            }))
            .unwrap(),
        )
    }

    #[test]
    fn test_file_init_creates_namespaces() {
        let temp = TempDir::new().unwrap();
        let mut dest = FileDestination::new(temp.path());
        dest.init("abc123").unwrap();
        dest.init("abc123").unwrap();

        for namespace in ResourceKind::namespaces() {
            assert!(temp.path().join("abc123").join(namespace).is_dir());
        }
    }

    #[test]
    fn test_file_write_uses_canonical_path() {
        let temp = TempDir::new().unwrap();
        let mut dest = FileDestination::new(temp.path());
        dest.init("abc123").unwrap();

        let path = dest.write(&flow("Welcome")).unwrap();
        assert_eq!(path.to_string(), "flows/Welcome.json");

        let written: Value = serde_json::from_slice(
            &std::fs::read(temp.path().join("abc123/flows/Welcome.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written["Name"], "Welcome");
    }

    #[test]
    fn test_write_before_init_fails() {
        let temp = TempDir::new().unwrap();
        let mut dest = FileDestination::new(temp.path());
        let err = dest.write(&flow("Welcome")).unwrap_err();
        assert!(matches!(err, ConnectBackupError::Write(_)));
    }

    #[test]
    fn test_name_collision_overwrites() {
        let temp = TempDir::new().unwrap();
        let mut dest = FileDestination::new(temp.path());
        dest.init("abc123").unwrap();

        let mut second: ContactFlow = match flow("Dup") {
            ResourceRecord::Flow(f) => f,
            _ => unreachable!(),
        };
        second.id = Some("other".into());

        dest.write(&flow("Dup")).unwrap();
        dest.write(&ResourceRecord::Flow(second)).unwrap();

        let written: Value = serde_json::from_slice(
            &std::fs::read(temp.path().join("abc123/flows/Dup.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written["Id"], "other");
    }

    #[test]
    fn test_raw_flow_is_unescaped() {
        let temp = TempDir::new().unwrap();
        let mut dest = FileDestination::new(temp.path());
        dest.init("abc123").unwrap();

        dest.write_raw("Welcome", "{\"Version\":\"2019-10-30\",\"Actions\":[]}")
            .unwrap();
        let text =
            std::fs::read_to_string(temp.path().join("abc123/flows-raw/Welcome.json")).unwrap();
        assert!(text.contains("\"Version\": \"2019-10-30\""));
        assert!(text.contains('\n'));

        assert!(dest.write_raw("Broken", "not json").is_err());
    }

    #[test]
    fn test_object_store_keys() {
        let store = MemoryStore::new();
        let mut dest = ObjectStoreDestination::new(&store, "bucket", "backups");
        dest.init("abc123").unwrap();

        dest.write(&flow("Welcome")).unwrap();
        dest.write_grouped(
            "prompts",
            &RecordGroup::Prompts(vec![PromptSummary {
                id: Some("p-1".into()),
                arn: None,
                name: Some("Beep".into()),
                extra: Default::default(),
            }]),
        )
        .unwrap();

        assert_eq!(
            store.keys("bucket"),
            vec![
                "backups/abc123/flows/Welcome.json".to_string(),
                "backups/abc123/prompts/prompts.json".to_string(),
            ]
        );
        let prompts = store
            .get_json("bucket", "backups/abc123/prompts/prompts.json")
            .unwrap();
        assert_eq!(prompts, json!([{"Id": "p-1", "Name": "Beep"}]));
    }

    #[test]
    fn test_console_prints_documents() {
        let mut dest = ConsoleDestination::new(Vec::new());
        dest.init("abc123").unwrap();
        dest.write(&flow("Welcome")).unwrap();

        let output = String::from_utf8(dest.into_inner()).unwrap();
        assert!(output.contains("\"Name\": \"Welcome\""));
        assert!(output.ends_with('\n'));
    }
}
