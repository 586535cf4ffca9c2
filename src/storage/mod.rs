//! Storage layer for connect-backup
//!
//! Maps records to their canonical paths and moves bytes to and from the
//! filesystem, an object store, or the console. Files are written
//! atomically and directories are created on demand.

pub mod file_io;
pub mod layout;
pub mod locator;
pub mod reader;
pub mod writer;

pub use file_io::{read_bytes, write_atomic};
pub use layout::{canonical_path, grouped_path, raw_flow_path, RelativePath, JSON_EXTENSION};
pub use locator::{Locator, OBJECT_STORE_SCHEME};
pub use reader::{LocatorReader, SourceReader};
pub use writer::{ConsoleDestination, Destination, FileDestination, ObjectStoreDestination};
