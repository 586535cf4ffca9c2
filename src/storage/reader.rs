//! Restore sources

use tracing::debug;

use crate::error::{BackupResult, ConnectBackupError};
use crate::provider::ObjectStore;

use super::file_io::read_bytes;
use super::locator::Locator;

/// Fetches the raw bytes a locator points at
pub trait SourceReader {
    fn read(&self, locator: &Locator) -> BackupResult<Vec<u8>>;
}

/// Reads files directly and objects through an object store
pub struct LocatorReader<O: ObjectStore> {
    store: O,
}

impl<O: ObjectStore> LocatorReader<O> {
    pub fn new(store: O) -> Self {
        Self { store }
    }
}

impl<O: ObjectStore> SourceReader for LocatorReader<O> {
    fn read(&self, locator: &Locator) -> BackupResult<Vec<u8>> {
        debug!(source = %locator, "reading record");
        match locator {
            Locator::File(path) => read_bytes(path),
            Locator::ObjectStore { bucket, key } => {
                self.store.get_object(bucket, key).map_err(|e| {
                    if e.is_not_found() {
                        ConnectBackupError::Read(format!("{} does not exist", locator))
                    } else {
                        ConnectBackupError::Read(e.to_string())
                    }
                })
            }
            Locator::Console => Err(ConnectBackupError::Read(
                "records cannot be read from the console".into(),
            )),
        }
    }
}
