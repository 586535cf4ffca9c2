//! Conversion between the SDK's typed shapes and the native documents
//!
//! Orchestrators, persisted records and the mock provider all speak the
//! service's PascalCase JSON documents. This module renders SDK output types
//! into that form and reads request documents back into SDK input types.
//! Absent optional members are left out of the rendered document.

use std::collections::HashMap;

use aws_sdk_connect::primitives::{DateTime, DateTimeFormat};
use aws_sdk_connect::types::{
    Channel, ContactFlow, ContactFlowState, ContactFlowSummary, ContactFlowType, DirectoryType,
    HierarchyGroup, HierarchyGroupSummary, HierarchyLevel, HierarchyLevelUpdate, HierarchyPath,
    HierarchyStructure, HierarchyStructureUpdate, HoursOfOperation, HoursOfOperationConfig,
    HoursOfOperationDays, HoursOfOperationSummary, HoursOfOperationTimeSlice, Instance,
    InstanceStatus, InstanceSummary, LexBot, MediaConcurrency, OutboundCallerConfig,
    PhoneNumberQuickConnectConfig, PhoneType, PromptSummary, Queue, QueueQuickConnectConfig,
    QueueStatus, QueueSummary, QueueType, QuickConnect, QuickConnectConfig, QuickConnectSummary,
    QuickConnectType, RoutingProfile, RoutingProfileQueueConfig,
    RoutingProfileQueueConfigSummary, RoutingProfileQueueReference, RoutingProfileSummary, User,
    UserIdentityInfo, UserPhoneConfig, UserQuickConnectConfig, UserSummary,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::Operation;
use crate::error::{ProviderError, ProviderErrorKind};
use crate::models;

/// Render a value as a native document fragment
pub trait ToJson {
    fn to_json(&self) -> Value;
}

/// Object from `(field, value)` pairs, dropping absent (`null`) members
pub fn document<const N: usize>(fields: [(&str, Value); N]) -> Value {
    let mut object = Map::new();
    for (name, value) in fields {
        if !value.is_null() {
            object.insert(name.to_string(), value);
        }
    }
    Value::Object(object)
}

impl ToJson for String {
    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToJson for bool {
    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToJson for i32 {
    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl ToJson for i64 {
    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToJson::to_json)
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl ToJson for HashMap<String, String> {
    fn to_json(&self) -> Value {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort();
        Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        )
    }
}

impl ToJson for DateTime {
    fn to_json(&self) -> Value {
        self.fmt(DateTimeFormat::DateTime)
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(self.secs()))
    }
}

macro_rules! enum_to_json {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToJson for $ty {
                fn to_json(&self) -> Value {
                    Value::String(self.as_str().to_string())
                }
            }
        )*
    };
}

enum_to_json!(
    Channel,
    ContactFlowState,
    ContactFlowType,
    DirectoryType,
    HoursOfOperationDays,
    InstanceStatus,
    PhoneType,
    QueueStatus,
    QueueType,
    QuickConnectType,
);

/// Implements `ToJson` for an SDK struct as a document of its members
macro_rules! shape_to_json {
    ($ty:ty { $($name:literal => $field:ident),* $(,)? }) => {
        impl ToJson for $ty {
            fn to_json(&self) -> Value {
                document([$(($name, self.$field.to_json())),*])
            }
        }
    };
}

shape_to_json!(InstanceSummary {
    "Id" => id,
    "Arn" => arn,
    "IdentityManagementType" => identity_management_type,
    "InstanceAlias" => instance_alias,
    "CreatedTime" => created_time,
    "ServiceRole" => service_role,
    "InstanceStatus" => instance_status,
    "InboundCallsEnabled" => inbound_calls_enabled,
    "OutboundCallsEnabled" => outbound_calls_enabled,
});

shape_to_json!(Instance {
    "Id" => id,
    "Arn" => arn,
    "IdentityManagementType" => identity_management_type,
    "InstanceAlias" => instance_alias,
    "CreatedTime" => created_time,
    "ServiceRole" => service_role,
    "InstanceStatus" => instance_status,
    "InboundCallsEnabled" => inbound_calls_enabled,
    "OutboundCallsEnabled" => outbound_calls_enabled,
});

shape_to_json!(LexBot {
    "Name" => name,
    "LexRegion" => lex_region,
});

shape_to_json!(PromptSummary {
    "Id" => id,
    "Arn" => arn,
    "Name" => name,
});

shape_to_json!(HoursOfOperationSummary {
    "Id" => id,
    "Arn" => arn,
    "Name" => name,
});

shape_to_json!(HoursOfOperationTimeSlice {
    "Hours" => hours,
    "Minutes" => minutes,
});

shape_to_json!(HoursOfOperationConfig {
    "Day" => day,
    "StartTime" => start_time,
    "EndTime" => end_time,
});

shape_to_json!(HoursOfOperation {
    "HoursOfOperationId" => hours_of_operation_id,
    "HoursOfOperationArn" => hours_of_operation_arn,
    "Name" => name,
    "Description" => description,
    "TimeZone" => time_zone,
    "Config" => config,
    "Tags" => tags,
});

shape_to_json!(QuickConnectSummary {
    "Id" => id,
    "Arn" => arn,
    "Name" => name,
    "QuickConnectType" => quick_connect_type,
});

shape_to_json!(UserQuickConnectConfig {
    "UserId" => user_id,
    "ContactFlowId" => contact_flow_id,
});

shape_to_json!(QueueQuickConnectConfig {
    "QueueId" => queue_id,
    "ContactFlowId" => contact_flow_id,
});

shape_to_json!(PhoneNumberQuickConnectConfig {
    "PhoneNumber" => phone_number,
});

shape_to_json!(QuickConnectConfig {
    "QuickConnectType" => quick_connect_type,
    "UserConfig" => user_config,
    "QueueConfig" => queue_config,
    "PhoneConfig" => phone_config,
});

shape_to_json!(QuickConnect {
    "QuickConnectARN" => quick_connect_arn,
    "QuickConnectId" => quick_connect_id,
    "Name" => name,
    "Description" => description,
    "QuickConnectConfig" => quick_connect_config,
    "Tags" => tags,
});

shape_to_json!(ContactFlowSummary {
    "Id" => id,
    "Arn" => arn,
    "Name" => name,
    "ContactFlowType" => contact_flow_type,
    "ContactFlowState" => contact_flow_state,
});

shape_to_json!(ContactFlow {
    "Arn" => arn,
    "Id" => id,
    "Name" => name,
    "Type" => r#type,
    "State" => state,
    "Description" => description,
    "Content" => content,
    "Tags" => tags,
});

shape_to_json!(UserSummary {
    "Id" => id,
    "Arn" => arn,
    "Username" => username,
});

shape_to_json!(UserIdentityInfo {
    "FirstName" => first_name,
    "LastName" => last_name,
    "Email" => email,
    "SecondaryEmail" => secondary_email,
    "Mobile" => mobile,
});

shape_to_json!(UserPhoneConfig {
    "PhoneType" => phone_type,
    "AutoAccept" => auto_accept,
    "AfterContactWorkTimeLimit" => after_contact_work_time_limit,
    "DeskPhoneNumber" => desk_phone_number,
});

shape_to_json!(User {
    "Id" => id,
    "Arn" => arn,
    "Username" => username,
    "IdentityInfo" => identity_info,
    "PhoneConfig" => phone_config,
    "DirectoryUserId" => directory_user_id,
    "SecurityProfileIds" => security_profile_ids,
    "RoutingProfileId" => routing_profile_id,
    "HierarchyGroupId" => hierarchy_group_id,
    "Tags" => tags,
});

shape_to_json!(RoutingProfileSummary {
    "Id" => id,
    "Arn" => arn,
    "Name" => name,
});

shape_to_json!(MediaConcurrency {
    "Channel" => channel,
    "Concurrency" => concurrency,
});

shape_to_json!(RoutingProfile {
    "InstanceId" => instance_id,
    "Name" => name,
    "RoutingProfileArn" => routing_profile_arn,
    "RoutingProfileId" => routing_profile_id,
    "Description" => description,
    "MediaConcurrencies" => media_concurrencies,
    "DefaultOutboundQueueId" => default_outbound_queue_id,
    "Tags" => tags,
});

shape_to_json!(RoutingProfileQueueConfigSummary {
    "QueueId" => queue_id,
    "QueueArn" => queue_arn,
    "QueueName" => queue_name,
    "Priority" => priority,
    "Delay" => delay,
    "Channel" => channel,
});

shape_to_json!(HierarchyGroupSummary {
    "Id" => id,
    "Arn" => arn,
    "Name" => name,
});

shape_to_json!(HierarchyPath {
    "LevelOne" => level_one,
    "LevelTwo" => level_two,
    "LevelThree" => level_three,
    "LevelFour" => level_four,
    "LevelFive" => level_five,
});

shape_to_json!(HierarchyGroup {
    "Id" => id,
    "Arn" => arn,
    "Name" => name,
    "LevelId" => level_id,
    "HierarchyPath" => hierarchy_path,
    "Tags" => tags,
});

shape_to_json!(HierarchyLevel {
    "Id" => id,
    "Arn" => arn,
    "Name" => name,
});

shape_to_json!(HierarchyStructure {
    "LevelOne" => level_one,
    "LevelTwo" => level_two,
    "LevelThree" => level_three,
    "LevelFour" => level_four,
    "LevelFive" => level_five,
});

shape_to_json!(QueueSummary {
    "Id" => id,
    "Arn" => arn,
    "Name" => name,
    "QueueType" => queue_type,
});

shape_to_json!(OutboundCallerConfig {
    "OutboundCallerIdName" => outbound_caller_id_name,
    "OutboundCallerIdNumberId" => outbound_caller_id_number_id,
    "OutboundFlowId" => outbound_flow_id,
});

shape_to_json!(Queue {
    "Name" => name,
    "QueueArn" => queue_arn,
    "QueueId" => queue_id,
    "Description" => description,
    "OutboundCallerConfig" => outbound_caller_config,
    "HoursOfOperationId" => hours_of_operation_id,
    "MaxContacts" => max_contacts,
    "Status" => status,
    "Tags" => tags,
});

/// Read access to a request document
pub struct Input<'a> {
    op: Operation,
    doc: &'a Value,
}

impl<'a> Input<'a> {
    pub fn new(op: Operation, doc: &'a Value) -> Self {
        Self { op, doc }
    }

    fn invalid(&self, message: String) -> ProviderError {
        ProviderError::new(self.op.name(), message).with_kind(ProviderErrorKind::InvalidRequest)
    }

    /// A member the operation cannot do without
    pub fn str(&self, key: &str) -> Result<String, ProviderError> {
        self.opt_str(key)
            .ok_or_else(|| self.invalid(format!("request has no {}", key)))
    }

    pub fn opt_str(&self, key: &str) -> Option<String> {
        self.doc.get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn strings(&self, key: &str) -> Result<Option<Vec<String>>, ProviderError> {
        self.decode(key)
    }

    /// Decode a member into a typed value; absent and `null` members are `None`
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ProviderError> {
        match self.doc.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| self.invalid(format!("malformed {}: {}", key, e))),
        }
    }

    pub fn media_concurrencies(&self) -> Result<Option<Vec<MediaConcurrency>>, ProviderError> {
        let Some(items) = self.decode::<Vec<models::MediaConcurrency>>("MediaConcurrencies")? else {
            return Ok(None);
        };
        items
            .iter()
            .map(|item| {
                MediaConcurrency::builder()
                    .channel(Channel::from(item.channel.as_str()))
                    .concurrency(self.int("Concurrency", item.concurrency)?)
                    .build()
                    .map_err(|e| self.invalid(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub fn queue_configs(&self) -> Result<Vec<RoutingProfileQueueConfig>, ProviderError> {
        let items = self
            .decode::<Vec<QueueConfigDocument>>("QueueConfigs")?
            .unwrap_or_default();
        items
            .into_iter()
            .map(|item| {
                let reference = RoutingProfileQueueReference::builder()
                    .queue_id(item.queue_reference.queue_id)
                    .channel(Channel::from(item.queue_reference.channel.as_str()))
                    .build()
                    .map_err(|e| self.invalid(e.to_string()))?;
                RoutingProfileQueueConfig::builder()
                    .queue_reference(reference)
                    .priority(self.int("Priority", item.priority)?)
                    .delay(self.int("Delay", item.delay)?)
                    .build()
                    .map_err(|e| self.invalid(e.to_string()))
            })
            .collect()
    }

    pub fn identity_info(&self) -> Result<Option<UserIdentityInfo>, ProviderError> {
        let Some(info) = self.decode::<models::UserIdentityInfo>("IdentityInfo")? else {
            return Ok(None);
        };
        let extra = |key: &str| info.extra.get(key).and_then(Value::as_str).map(str::to_string);
        Ok(Some(
            UserIdentityInfo::builder()
                .set_first_name(info.first_name.clone())
                .set_last_name(info.last_name.clone())
                .set_email(info.email.clone())
                .set_secondary_email(extra("SecondaryEmail"))
                .set_mobile(extra("Mobile"))
                .build(),
        ))
    }

    pub fn phone_config(&self) -> Result<Option<UserPhoneConfig>, ProviderError> {
        let Some(config) = self.decode::<models::UserPhoneConfig>("PhoneConfig")? else {
            return Ok(None);
        };
        let limit = config
            .after_contact_work_time_limit
            .map(|limit| self.int("AfterContactWorkTimeLimit", limit))
            .transpose()?;
        Ok(Some(
            UserPhoneConfig::builder()
                .phone_type(PhoneType::from(config.phone_type.as_str()))
                .set_auto_accept(config.auto_accept)
                .set_after_contact_work_time_limit(limit)
                .set_desk_phone_number(config.desk_phone_number.clone())
                .build(),
        ))
    }

    /// Level names of a hierarchy structure update
    pub fn hierarchy_structure(&self) -> Result<HierarchyStructureUpdate, ProviderError> {
        let levels = self
            .decode::<models::HierarchyLevels>("HierarchyStructure")?
            .ok_or_else(|| self.invalid("request has no HierarchyStructure".into()))?;
        let level = |depth: usize| -> Result<Option<HierarchyLevelUpdate>, ProviderError> {
            levels
                .level(depth)
                .and_then(|level| level.name.clone())
                .map(|name| {
                    HierarchyLevelUpdate::builder()
                        .name(name)
                        .build()
                        .map_err(|e| self.invalid(e.to_string()))
                })
                .transpose()
        };
        Ok(HierarchyStructureUpdate::builder()
            .set_level_one(level(1)?)
            .set_level_two(level(2)?)
            .set_level_three(level(3)?)
            .set_level_four(level(4)?)
            .set_level_five(level(5)?)
            .build())
    }

    fn int(&self, key: &str, value: i64) -> Result<i32, ProviderError> {
        i32::try_from(value).map_err(|_| self.invalid(format!("{} out of range: {}", key, value)))
    }
}

/// Queue association as written by the restore requests
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueueConfigDocument {
    queue_reference: QueueReferenceDocument,
    priority: i64,
    delay: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueueReferenceDocument {
    queue_id: String,
    channel: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flow_renders_native_document() {
        let flow = ContactFlow::builder()
            .id("f-1")
            .arn("arn:aws:connect:eu-west-2:111122223333:instance/abc123/contact-flow/f-1")
            .name("Welcome")
            .r#type(ContactFlowType::ContactFlow)
            .content("{\"Actions\":[]}")
            .tags("team", "support")
            .build();

        assert_eq!(
            flow.to_json(),
            json!({
                "Arn": "arn:aws:connect:eu-west-2:111122223333:instance/abc123/contact-flow/f-1",
                "Id": "f-1",
                "Name": "Welcome",
                "Type": "CONTACT_FLOW",
                "Content": "{\"Actions\":[]}",
                "Tags": {"team": "support"}
            })
        );

        // decodes as the persisted record type
        let record: models::ContactFlow = serde_json::from_value(flow.to_json()).unwrap();
        assert_eq!(record.flow_type.as_deref(), Some("CONTACT_FLOW"));
        assert_eq!(record.description, None);
    }

    #[test]
    fn test_structure_skips_missing_levels() {
        let structure = HierarchyStructure::builder()
            .level_one(HierarchyLevel::builder().id("l-1").name("Org").build())
            .level_three(HierarchyLevel::builder().id("l-3").name("Squad").build())
            .build();
        assert_eq!(
            structure.to_json(),
            json!({
                "LevelOne": {"Id": "l-1", "Name": "Org"},
                "LevelThree": {"Id": "l-3", "Name": "Squad"}
            })
        );
    }

    #[test]
    fn test_user_identity_keeps_extra_fields() {
        let doc = json!({
            "IdentityInfo": {"FirstName": "Jane", "Email": "jane@example.com", "Mobile": "+15550100"}
        });
        let info = Input::new(Operation::UpdateUserIdentityInfo, &doc)
            .identity_info()
            .unwrap()
            .unwrap();
        assert_eq!(
            info.to_json(),
            json!({"FirstName": "Jane", "Email": "jane@example.com", "Mobile": "+15550100"})
        );
    }

    #[test]
    fn test_missing_required_member() {
        let doc = json!({"ContactFlowId": "f-1"});
        let input = Input::new(Operation::DescribeContactFlow, &doc);
        let err = input.str("InstanceId").unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
        assert_eq!(err.operation, "describe-contact-flow");
        assert_eq!(input.str("ContactFlowId").unwrap(), "f-1");
    }

    #[test]
    fn test_queue_configs_decode() {
        let doc = json!({
            "QueueConfigs": [
                {"QueueReference": {"QueueId": "q-1", "Channel": "VOICE"}, "Priority": 1, "Delay": 0},
                {"QueueReference": {"QueueId": "q-2", "Channel": "CHAT"}, "Priority": 2, "Delay": 30}
            ]
        });
        let configs = Input::new(Operation::AssociateRoutingProfileQueues, &doc)
            .queue_configs()
            .unwrap();
        assert_eq!(configs.len(), 2);

        let malformed = json!({"QueueConfigs": [{"Priority": 1}]});
        let err = Input::new(Operation::AssociateRoutingProfileQueues, &malformed)
            .queue_configs()
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn test_out_of_range_priority() {
        let doc = json!({
            "QueueConfigs": [
                {"QueueReference": {"QueueId": "q-1", "Channel": "VOICE"}, "Priority": 4294967296i64, "Delay": 0}
            ]
        });
        let err = Input::new(Operation::UpdateRoutingProfileQueues, &doc)
            .queue_configs()
            .unwrap_err();
        assert!(err.message.contains("Priority out of range"));
    }

    #[test]
    fn test_document_drops_nulls() {
        let name: Option<String> = None;
        assert_eq!(
            document([("Id", "x".to_string().to_json()), ("Name", name.to_json())]),
            json!({"Id": "x"})
        );
    }
}
