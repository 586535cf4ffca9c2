//! Core data models
//!
//! Resource kinds, the typed records the provider returns for them, and the
//! identities that scope a run.

pub mod identity;
pub mod kind;
pub mod records;

pub use identity::{Arn, InstanceHandle, InstanceSelector, OriginIdentity};
pub use kind::{ResourceKind, RestoreKind, COMMON_NAMESPACE, FLOWS_RAW_NAMESPACE};
pub use records::{
    ContactFlow, HierarchyGroup, HierarchyLevels, HierarchyReference, HoursOfOperation, Instance,
    LexBot, MediaConcurrency, PromptSummary, QuickConnect, Queue, RecordDecodeError, RecordGroup,
    ResourceRecord, RoutingProfile, RoutingProfileQueueConfigSummary, Tags, User,
    UserIdentityInfo, UserPhoneConfig,
};
