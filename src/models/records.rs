//! Resource records
//!
//! Typed payloads mirroring the provider's native describe-response shapes.
//! Field names serialize in the provider's PascalCase spelling and absent
//! fields stay absent, so a persisted record is byte-for-byte the document a
//! restore has to feed back. Every struct keeps the fields it does not model
//! in `extra`, which lets records written by newer provider versions
//! round-trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::kind::ResourceKind;

/// Resource tags
pub type Tags = BTreeMap<String, String>;

/// Fields not modelled explicitly
pub type Extra = Map<String, Value>;

/// A contact flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFlow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub flow_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Flow script, itself a JSON document encoded as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Per-channel concurrency of a routing profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaConcurrency {
    pub channel: String,
    pub concurrency: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A routing profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoutingProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_profile_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_concurrencies: Option<Vec<MediaConcurrency>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_outbound_queue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One queue association of a routing profile, as listed by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoutingProfileQueueConfigSummary {
    pub queue_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    pub priority: i64,
    pub delay: i64,
    pub channel: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Contact details of a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserIdentityInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Softphone or desk phone settings of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPhoneConfig {
    pub phone_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_accept: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_contact_work_time_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desk_phone_number: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An agent or administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_info: Option<UserIdentityInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_config: Option<UserPhoneConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_profile_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Id/arn/name triple used by hierarchy paths and structures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HierarchyReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Five optional levels, shared by hierarchy paths and the hierarchy structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HierarchyLevels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_one: Option<HierarchyReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_two: Option<HierarchyReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_three: Option<HierarchyReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_four: Option<HierarchyReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_five: Option<HierarchyReference>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl HierarchyLevels {
    /// Level by 1-based depth
    pub fn level(&self, depth: usize) -> Option<&HierarchyReference> {
        match depth {
            1 => self.level_one.as_ref(),
            2 => self.level_two.as_ref(),
            3 => self.level_three.as_ref(),
            4 => self.level_four.as_ref(),
            5 => self.level_five.as_ref(),
            _ => None,
        }
    }
}

/// A user hierarchy group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HierarchyGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_path: Option<HierarchyLevels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl HierarchyGroup {
    /// Id of the group one level above this one, if any
    pub fn parent_group_id(&self) -> Option<&str> {
        let depth: usize = self.level_id.as_deref()?.parse().ok()?;
        if depth < 2 {
            return None;
        }
        self.hierarchy_path
            .as_ref()?
            .level(depth - 1)?
            .id
            .as_deref()
    }
}

/// A prompt as listed by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PromptSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Hours of operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HoursOfOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_of_operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_of_operation_arn: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A quick connect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuickConnect {
    #[serde(rename = "QuickConnectARN", default, skip_serializing_if = "Option::is_none")]
    pub quick_connect_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_connect_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_connect_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A standard queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Queue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_caller_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_of_operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_contacts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Instance metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_management_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_calls_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_calls_enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An Amazon Lex bot associated with the instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LexBot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lex_region: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One fully-populated record of a named or singleton resource kind
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceRecord {
    Instance(Instance),
    Lambdas(Vec<String>),
    LexBots(Vec<LexBot>),
    HoursOfOperation(HoursOfOperation),
    QuickConnect(QuickConnect),
    Flow(ContactFlow),
    User(User),
    RoutingProfile(RoutingProfile),
    HierarchyGroup(HierarchyGroup),
    HierarchyStructure(HierarchyLevels),
    Queue(Queue),
}

/// A collection persisted under a shared group name instead of one file per item
#[derive(Debug, Clone, PartialEq)]
pub enum RecordGroup {
    Prompts(Vec<PromptSummary>),
    RoutingProfileQueues(Vec<RoutingProfileQueueConfigSummary>),
}

impl ResourceRecord {
    /// Decode a provider document into the record for `kind`.
    ///
    /// Grouped kinds (prompts, routing profile queue sets) have no single-record
    /// form and are rejected.
    pub fn from_value(kind: ResourceKind, value: Value) -> Result<Self, RecordDecodeError> {
        let record = match kind {
            ResourceKind::Instance => Self::Instance(serde_json::from_value(value)?),
            ResourceKind::Lambda => Self::Lambdas(serde_json::from_value(value)?),
            ResourceKind::LexBot => Self::LexBots(serde_json::from_value(value)?),
            ResourceKind::HoursOfOperation => {
                Self::HoursOfOperation(serde_json::from_value(value)?)
            }
            ResourceKind::QuickConnect => Self::QuickConnect(serde_json::from_value(value)?),
            ResourceKind::Flow => Self::Flow(serde_json::from_value(value)?),
            ResourceKind::User => Self::User(serde_json::from_value(value)?),
            ResourceKind::RoutingProfile => Self::RoutingProfile(serde_json::from_value(value)?),
            ResourceKind::HierarchyGroup => Self::HierarchyGroup(serde_json::from_value(value)?),
            ResourceKind::HierarchyStructure => {
                Self::HierarchyStructure(serde_json::from_value(value)?)
            }
            ResourceKind::Queue => Self::Queue(serde_json::from_value(value)?),
            ResourceKind::Prompt | ResourceKind::RoutingProfileQueueSet => {
                return Err(RecordDecodeError::Grouped(kind))
            }
        };
        Ok(record)
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Instance(_) => ResourceKind::Instance,
            Self::Lambdas(_) => ResourceKind::Lambda,
            Self::LexBots(_) => ResourceKind::LexBot,
            Self::HoursOfOperation(_) => ResourceKind::HoursOfOperation,
            Self::QuickConnect(_) => ResourceKind::QuickConnect,
            Self::Flow(_) => ResourceKind::Flow,
            Self::User(_) => ResourceKind::User,
            Self::RoutingProfile(_) => ResourceKind::RoutingProfile,
            Self::HierarchyGroup(_) => ResourceKind::HierarchyGroup,
            Self::HierarchyStructure(_) => ResourceKind::HierarchyStructure,
            Self::Queue(_) => ResourceKind::Queue,
        }
    }

    /// Name used to build the record's path. Singletons answer with their
    /// fixed file stem.
    pub fn natural_name(&self) -> &str {
        match self {
            Self::HoursOfOperation(h) => &h.name,
            Self::QuickConnect(q) => &q.name,
            Self::Flow(f) => &f.name,
            Self::User(u) => &u.username,
            Self::RoutingProfile(r) => &r.name,
            Self::HierarchyGroup(g) => &g.name,
            Self::Queue(q) => &q.name,
            Self::Instance(_)
            | Self::Lambdas(_)
            | Self::LexBots(_)
            | Self::HierarchyStructure(_) => self.kind().singleton_name().unwrap_or_default(),
        }
    }

    /// Provider-assigned unique identifier
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            Self::Instance(i) => Some(&i.id),
            Self::HoursOfOperation(h) => h.hours_of_operation_id.as_deref(),
            Self::QuickConnect(q) => q.quick_connect_id.as_deref(),
            Self::Flow(f) => f.id.as_deref(),
            Self::User(u) => u.id.as_deref(),
            Self::RoutingProfile(r) => r.routing_profile_id.as_deref(),
            Self::HierarchyGroup(g) => g.id.as_deref(),
            Self::Queue(q) => q.queue_id.as_deref(),
            Self::Lambdas(_) | Self::LexBots(_) | Self::HierarchyStructure(_) => None,
        }
    }

    /// Serialize in the provider's native shape
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Self::Instance(v) => serde_json::to_string_pretty(v),
            Self::Lambdas(v) => serde_json::to_string_pretty(v),
            Self::LexBots(v) => serde_json::to_string_pretty(v),
            Self::HoursOfOperation(v) => serde_json::to_string_pretty(v),
            Self::QuickConnect(v) => serde_json::to_string_pretty(v),
            Self::Flow(v) => serde_json::to_string_pretty(v),
            Self::User(v) => serde_json::to_string_pretty(v),
            Self::RoutingProfile(v) => serde_json::to_string_pretty(v),
            Self::HierarchyGroup(v) => serde_json::to_string_pretty(v),
            Self::HierarchyStructure(v) => serde_json::to_string_pretty(v),
            Self::Queue(v) => serde_json::to_string_pretty(v),
        }
    }
}

impl RecordGroup {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Prompts(_) => ResourceKind::Prompt,
            Self::RoutingProfileQueues(_) => ResourceKind::RoutingProfileQueueSet,
        }
    }

    /// Number of items in the group
    pub fn item_count(&self) -> usize {
        match self {
            Self::Prompts(items) => items.len(),
            Self::RoutingProfileQueues(items) => items.len(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Self::Prompts(items) => serde_json::to_string_pretty(items),
            Self::RoutingProfileQueues(items) => serde_json::to_string_pretty(items),
        }
    }
}

/// Failure to turn a provider document into a record
#[derive(Debug, thiserror::Error)]
pub enum RecordDecodeError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} is stored as a group and has no single-record form")]
    Grouped(ResourceKind),
}
