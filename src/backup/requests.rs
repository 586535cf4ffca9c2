//! Request documents for the mutating provider operations
//!
//! Absent optional fields are omitted rather than sent as `null`. Create
//! requests own their tag map, which always starts empty.

use serde::Serialize;

use crate::models::{
    HierarchyLevels, MediaConcurrency, RoutingProfileQueueConfigSummary, Tags, UserIdentityInfo,
    UserPhoneConfig,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateContactFlow<'a> {
    pub instance_id: &'a str,
    pub name: &'a str,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub flow_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateContactFlowName<'a> {
    pub instance_id: &'a str,
    pub contact_flow_id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateContactFlowContent<'a> {
    pub instance_id: &'a str,
    pub contact_flow_id: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateRoutingProfile<'a> {
    pub instance_id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_outbound_queue_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_concurrencies: Option<&'a [MediaConcurrency]>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateRoutingProfileName<'a> {
    pub instance_id: &'a str,
    pub routing_profile_id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateRoutingProfileConcurrency<'a> {
    pub instance_id: &'a str,
    pub routing_profile_id: &'a str,
    pub media_concurrencies: &'a [MediaConcurrency],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateRoutingProfileDefaultOutboundQueue<'a> {
    pub instance_id: &'a str,
    pub routing_profile_id: &'a str,
    pub default_outbound_queue_id: &'a str,
}

/// Queue reference of an association request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueReference<'a> {
    pub queue_id: &'a str,
    pub channel: &'a str,
}

/// One association in the shape the associate and update calls expect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueConfig<'a> {
    pub queue_reference: QueueReference<'a>,
    pub priority: i64,
    pub delay: i64,
}

impl<'a> From<&'a RoutingProfileQueueConfigSummary> for QueueConfig<'a> {
    fn from(summary: &'a RoutingProfileQueueConfigSummary) -> Self {
        Self {
            queue_reference: QueueReference {
                queue_id: &summary.queue_id,
                channel: &summary.channel,
            },
            priority: summary.priority,
            delay: summary.delay,
        }
    }
}

/// Body of both associate-routing-profile-queues and update-routing-profile-queues
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoutingProfileQueues<'a> {
    pub instance_id: &'a str,
    pub routing_profile_id: &'a str,
    pub queue_configs: Vec<QueueConfig<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUser<'a> {
    pub instance_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_info: Option<&'a UserIdentityInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_config: Option<&'a UserPhoneConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_profile_ids: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_profile_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy_group_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserIdentityInfo<'a> {
    pub instance_id: &'a str,
    pub user_id: &'a str,
    pub identity_info: &'a UserIdentityInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserSecurityProfiles<'a> {
    pub instance_id: &'a str,
    pub user_id: &'a str,
    pub security_profile_ids: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserPhoneConfig<'a> {
    pub instance_id: &'a str,
    pub user_id: &'a str,
    pub phone_config: &'a UserPhoneConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserRoutingProfile<'a> {
    pub instance_id: &'a str,
    pub user_id: &'a str,
    pub routing_profile_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserHierarchy<'a> {
    pub instance_id: &'a str,
    pub user_id: &'a str,
    pub hierarchy_group_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserHierarchyGroup<'a> {
    pub instance_id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserHierarchyGroupName<'a> {
    pub instance_id: &'a str,
    pub hierarchy_group_id: &'a str,
    pub name: &'a str,
}

/// Level of a structure update; only the name is settable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LevelName<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HierarchyStructureUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_one: Option<LevelName<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_two: Option<LevelName<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_three: Option<LevelName<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_four: Option<LevelName<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_five: Option<LevelName<'a>>,
}

impl<'a> From<&'a HierarchyLevels> for HierarchyStructureUpdate<'a> {
    fn from(levels: &'a HierarchyLevels) -> Self {
        let name = move |depth: usize| {
            levels
                .level(depth)
                .and_then(|level| level.name.as_deref())
                .map(|name| LevelName { name })
        };
        Self {
            level_one: name(1),
            level_two: name(2),
            level_three: name(3),
            level_four: name(4),
            level_five: name(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserHierarchyStructure<'a> {
    pub instance_id: &'a str,
    pub hierarchy_structure: HierarchyStructureUpdate<'a>,
}
