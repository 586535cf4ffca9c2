//! Backup, restore and rename orchestration
//!
//! # Architecture
//!
//! - `BackupManager`: walks every resource kind of one or all instances and
//!   persists the records through a `Destination`
//! - `RestoreManager`: applies a single record, either as a new resource or
//!   as an in-place update of the one it was backed up from
//! - `FlowRenamer`: prefixes the names of stock sample flows
//!
//! All three talk to the remote service through a `RemoteProvider` only, so
//! they run unchanged against the scripted provider in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use connect_backup::backup::{BackupManager, BackupOptions};
//! use connect_backup::cancel::CancelFlag;
//! use connect_backup::models::{InstanceHandle, InstanceSelector};
//! use connect_backup::provider::{AwsSdk, ProviderOptions};
//! use connect_backup::storage::FileDestination;
//!
//! let provider = AwsSdk::connect(&ProviderOptions::new(None, Some("eu-west-2".into())))?;
//! let manager = BackupManager::new(&provider, BackupOptions::default(), CancelFlag::new());
//! let mut dest = FileDestination::new("./backup");
//! let report = manager.backup(&InstanceSelector::Single(InstanceHandle::new("abc123")), &mut dest)?;
//! println!("{}", report.summary());
//! ```

mod manager;
mod password;
mod rename;
mod requests;
mod restore;
mod validator;

pub use manager::{
    BackupManager, BackupOptions, BackupReport, StageReport, DEFAULT_QUEUE_TYPES, PROMPTS_GROUP,
};
pub use password::{generate_password, PASSWORD_LENGTH};
pub use rename::{FlowRenamer, RenameReport, DEFAULT_PREFIX};
pub use restore::{
    RestoreManager, RestoreMode, RestoreOutcome, RestoreRequest, QUEUE_BATCH_SIZE,
    RESTORABLE_KINDS,
};
pub use validator::{matches, CrossEnvironmentValidator, DestinationIdentity};
