//! Restore orchestrator for connect-backup
//!
//! Loads one backed-up record and applies it to an instance. A new name on
//! the request creates a copy; without one the existing resource is updated
//! in place, one narrow aspect at a time, after the record's origin has been
//! checked against the destination.
//!
//! Routing profiles are composite: once the profile itself is applied, its
//! queue associations are loaded from the sibling `routing-profile-queues`
//! record and applied with associate-then-update. The provider has no upsert
//! for associations, so the associate call establishes missing ones (an
//! "already associated" conflict counts as success) and the update call then
//! forces priority and delay on every one of them.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::cancel::CancelFlag;
use crate::error::{AspectFailure, BackupResult, ConnectBackupError, ProviderError};
use crate::models::{
    ContactFlow, HierarchyGroup, HierarchyLevels, InstanceHandle, ResourceKind, ResourceRecord,
    RoutingProfile, RoutingProfileQueueConfigSummary, Tags, User,
};
use crate::provider::{Operation, RemoteProvider};
use crate::storage::{Locator, SourceReader};

use super::password::generate_password;
use super::requests::{
    CreateContactFlow, CreateRoutingProfile, CreateUser, CreateUserHierarchyGroup, QueueConfig,
    RoutingProfileQueues, UpdateContactFlowContent, UpdateContactFlowName,
    UpdateRoutingProfileConcurrency, UpdateRoutingProfileDefaultOutboundQueue,
    UpdateRoutingProfileName, UpdateUserHierarchy, UpdateUserHierarchyGroupName,
    UpdateUserHierarchyStructure, UpdateUserIdentityInfo, UpdateUserPhoneConfig,
    UpdateUserRoutingProfile, UpdateUserSecurityProfiles,
};
use super::validator::CrossEnvironmentValidator;

/// Most queue configs the provider accepts in one association call
pub const QUEUE_BATCH_SIZE: usize = 10;

/// Kinds that can be restored
pub const RESTORABLE_KINDS: [ResourceKind; 5] = [
    ResourceKind::Flow,
    ResourceKind::RoutingProfile,
    ResourceKind::User,
    ResourceKind::HierarchyGroup,
    ResourceKind::HierarchyStructure,
];

/// A single restore to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRequest {
    pub kind: ResourceKind,
    pub source: Locator,
    pub instance: InstanceHandle,
    /// Create a copy under this name instead of updating in place
    pub new_name: Option<String>,
}

/// Which path a restore took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    Created,
    Updated,
}

/// Result of a completed restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub kind: ResourceKind,
    pub name: String,
    pub mode: RestoreMode,
    /// Id of the created or updated resource; singletons have none
    pub target_id: Option<String>,
    /// Calls applied, in order
    pub applied: Vec<String>,
}

impl RestoreOutcome {
    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        let verb = match self.mode {
            RestoreMode::Created => "Created",
            RestoreMode::Updated => "Updated",
        };
        let id = self
            .target_id
            .as_deref()
            .map(|id| format!(" ({})", id))
            .unwrap_or_default();
        format!(
            "{} {} '{}'{}: {}",
            verb,
            self.kind,
            self.name,
            id,
            self.applied.join(", ")
        )
    }
}

/// Aspect calls of one restore; failures are collected, not returned early
struct Aspects<'p, P: RemoteProvider> {
    provider: &'p P,
    applied: Vec<String>,
    failures: Vec<AspectFailure>,
}

impl<'p, P: RemoteProvider> Aspects<'p, P> {
    fn new(provider: &'p P) -> Self {
        Self {
            provider,
            applied: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn apply<T: Serialize>(&mut self, aspect: &str, op: Operation, request: &T) {
        self.call(aspect, op, request, false);
    }

    /// Like `apply`, but a conflict reported by the provider counts as applied
    fn apply_tolerating_conflict<T: Serialize>(&mut self, aspect: &str, op: Operation, request: &T) {
        self.call(aspect, op, request, true);
    }

    fn call<T: Serialize>(&mut self, aspect: &str, op: Operation, request: &T, tolerate_conflict: bool) {
        let input = match serde_json::to_value(request) {
            Ok(input) => input,
            Err(e) => return self.fail(aspect, &ConnectBackupError::from(e)),
        };
        match self.provider.call(op, &input) {
            Ok(_) => {
                debug!(aspect, %op, "applied");
                self.applied.push(aspect.to_string());
            }
            Err(e) if tolerate_conflict && e.is_conflict() => {
                debug!(aspect, %op, error = %e, "already in place");
                self.applied.push(aspect.to_string());
            }
            Err(e) => self.fail(aspect, &ConnectBackupError::from(e)),
        }
    }

    fn record(&mut self, step: &str) {
        self.applied.push(step.to_string());
    }

    fn skip(&self, aspect: &str) {
        debug!(aspect, "not present in record, skipped");
    }

    fn fail(&mut self, aspect: &str, err: &ConnectBackupError) {
        warn!(aspect, error = %err, "aspect failed");
        self.failures.push(AspectFailure {
            aspect: aspect.to_string(),
            message: err.to_string(),
        });
    }

    fn finish(self, resource: String) -> BackupResult<Vec<String>> {
        if self.failures.is_empty() {
            Ok(self.applied)
        } else {
            Err(ConnectBackupError::AspectsFailed {
                resource,
                failures: self.failures,
            })
        }
    }
}

/// Applies backed-up records to an instance
pub struct RestoreManager<'a, P: RemoteProvider, R: SourceReader> {
    provider: &'a P,
    reader: R,
    validator: CrossEnvironmentValidator<'a, P>,
}

impl<'a, P: RemoteProvider, R: SourceReader> RestoreManager<'a, P, R> {
    /// Create a new RestoreManager
    pub fn new(provider: &'a P, reader: R, cancel: CancelFlag) -> Self {
        Self {
            provider,
            reader,
            validator: CrossEnvironmentValidator::new(provider, cancel),
        }
    }

    /// Restore one record
    pub fn restore(&self, request: &RestoreRequest) -> BackupResult<RestoreOutcome> {
        // a blank new name is the same as none
        let unnamed;
        let request = match request.new_name.as_deref() {
            Some(name) if name.trim().is_empty() => {
                unnamed = RestoreRequest {
                    new_name: None,
                    ..request.clone()
                };
                &unnamed
            }
            _ => request,
        };

        let span = info_span!("restore", kind = %request.kind, source = %request.source);
        let _enter = span.enter();

        if !RESTORABLE_KINDS.contains(&request.kind) {
            return Err(ConnectBackupError::UnsupportedType(format!(
                "{} cannot be restored",
                request.kind
            )));
        }
        if request.kind == ResourceKind::HierarchyStructure && request.new_name.is_some() {
            return Err(ConnectBackupError::Validation(
                "the user hierarchy structure is a singleton and can only be updated in place"
                    .into(),
            ));
        }

        let record = self.load(request)?;
        let mode = if request.new_name.is_some() { "create" } else { "update" };
        info!(name = %record.natural_name(), mode, "loaded record");

        let outcome = match &record {
            ResourceRecord::Flow(flow) => self.restore_flow(request, flow),
            ResourceRecord::RoutingProfile(profile) => self.restore_routing_profile(request, profile),
            ResourceRecord::User(user) => self.restore_user(request, user),
            ResourceRecord::HierarchyGroup(group) => self.restore_hierarchy_group(request, group),
            ResourceRecord::HierarchyStructure(levels) => {
                self.restore_hierarchy_structure(request, levels)
            }
            other => Err(ConnectBackupError::UnsupportedType(format!(
                "{} cannot be restored",
                other.kind()
            ))),
        }?;

        info!("{}", outcome.summary());
        Ok(outcome)
    }

    fn load(&self, request: &RestoreRequest) -> BackupResult<ResourceRecord> {
        let bytes = self.reader.read(&request.source)?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| ConnectBackupError::Deserialize {
                kind: request.kind,
                message: e.to_string(),
            })?;
        ResourceRecord::from_value(request.kind, value).map_err(|e| ConnectBackupError::Deserialize {
            kind: request.kind,
            message: e.to_string(),
        })
    }

    /// Submit one creation call and return the id it assigned
    fn create<T: Serialize>(&self, op: Operation, request: &T, id_key: &str) -> BackupResult<String> {
        let input = serde_json::to_value(request)?;
        let response = self.provider.call(op, &input)?;
        response
            .get(id_key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::new(op.name(), format!("response has no {}", id_key)).into()
            })
    }

    fn restore_flow(&self, request: &RestoreRequest, flow: &ContactFlow) -> BackupResult<RestoreOutcome> {
        let instance_id = request.instance.id();
        let mut aspects = Aspects::new(self.provider);

        let (mode, name, target_id) = match &request.new_name {
            Some(new_name) => {
                let create = CreateContactFlow {
                    instance_id,
                    name: new_name,
                    flow_type: flow.flow_type.as_deref(),
                    description: flow.description.as_deref(),
                    content: flow.content.as_deref(),
                    tags: Tags::new(),
                };
                let id = self.create(Operation::CreateContactFlow, &create, "ContactFlowId")?;
                aspects.record("create");
                (RestoreMode::Created, new_name.clone(), id)
            }
            None => {
                self.validator.validate(flow.arn.as_deref(), &request.instance)?;
                let id = required_id(flow.id.as_deref(), ResourceKind::Flow, &flow.name)?;

                aspects.apply(
                    "name",
                    Operation::UpdateContactFlowName,
                    &UpdateContactFlowName {
                        instance_id,
                        contact_flow_id: id,
                        name: &flow.name,
                        description: flow.description.as_deref(),
                    },
                );
                match flow.content.as_deref() {
                    Some(content) => aspects.apply(
                        "content",
                        Operation::UpdateContactFlowContent,
                        &UpdateContactFlowContent {
                            instance_id,
                            contact_flow_id: id,
                            content,
                        },
                    ),
                    None => aspects.skip("content"),
                }
                (RestoreMode::Updated, flow.name.clone(), id.to_string())
            }
        };

        let applied = aspects.finish(format!("flow '{}'", name))?;
        Ok(RestoreOutcome {
            kind: ResourceKind::Flow,
            name,
            mode,
            target_id: Some(target_id),
            applied,
        })
    }

    fn restore_routing_profile(
        &self,
        request: &RestoreRequest,
        profile: &RoutingProfile,
    ) -> BackupResult<RestoreOutcome> {
        let instance_id = request.instance.id();
        let mut aspects = Aspects::new(self.provider);

        let (mode, name, target_id) = match &request.new_name {
            Some(new_name) => {
                let create = CreateRoutingProfile {
                    instance_id,
                    name: new_name,
                    description: profile.description.as_deref(),
                    default_outbound_queue_id: profile.default_outbound_queue_id.as_deref(),
                    media_concurrencies: profile.media_concurrencies.as_deref(),
                    tags: Tags::new(),
                };
                let id = self.create(Operation::CreateRoutingProfile, &create, "RoutingProfileId")?;
                aspects.record("create");
                (RestoreMode::Created, new_name.clone(), id)
            }
            None => {
                self.validator
                    .validate(profile.routing_profile_arn.as_deref(), &request.instance)?;
                let id = required_id(
                    profile.routing_profile_id.as_deref(),
                    ResourceKind::RoutingProfile,
                    &profile.name,
                )?;

                aspects.apply(
                    "name",
                    Operation::UpdateRoutingProfileName,
                    &UpdateRoutingProfileName {
                        instance_id,
                        routing_profile_id: id,
                        name: &profile.name,
                        description: profile.description.as_deref(),
                    },
                );
                match profile.media_concurrencies.as_deref() {
                    Some(media_concurrencies) => aspects.apply(
                        "concurrency",
                        Operation::UpdateRoutingProfileConcurrency,
                        &UpdateRoutingProfileConcurrency {
                            instance_id,
                            routing_profile_id: id,
                            media_concurrencies,
                        },
                    ),
                    None => aspects.skip("concurrency"),
                }
                match profile.default_outbound_queue_id.as_deref() {
                    Some(default_outbound_queue_id) => aspects.apply(
                        "default-outbound-queue",
                        Operation::UpdateRoutingProfileDefaultOutboundQueue,
                        &UpdateRoutingProfileDefaultOutboundQueue {
                            instance_id,
                            routing_profile_id: id,
                            default_outbound_queue_id,
                        },
                    ),
                    None => aspects.skip("default-outbound-queue"),
                }
                (RestoreMode::Updated, profile.name.clone(), id.to_string())
            }
        };

        // children follow the resolved target id, not the id in the record
        self.restore_queue_set(request, profile, &target_id, &mut aspects);

        let applied = aspects.finish(format!("routing profile '{}' ({})", name, target_id))?;
        Ok(RestoreOutcome {
            kind: ResourceKind::RoutingProfile,
            name,
            mode,
            target_id: Some(target_id),
            applied,
        })
    }

    fn restore_queue_set(
        &self,
        request: &RestoreRequest,
        profile: &RoutingProfile,
        target_id: &str,
        aspects: &mut Aspects<'_, P>,
    ) {
        let configs = match self.load_queue_set(request, profile) {
            Ok(configs) => configs,
            Err(e) => return aspects.fail("queues", &e),
        };
        if configs.is_empty() {
            debug!("routing profile has no queue associations");
            return;
        }

        for batch in configs.chunks(QUEUE_BATCH_SIZE) {
            let body = RoutingProfileQueues {
                instance_id: request.instance.id(),
                routing_profile_id: target_id,
                queue_configs: batch.iter().map(QueueConfig::from).collect(),
            };
            aspects.apply_tolerating_conflict(
                "associate-queues",
                Operation::AssociateRoutingProfileQueues,
                &body,
            );
            aspects.apply("update-queues", Operation::UpdateRoutingProfileQueues, &body);
        }
    }

    /// Queue associations are stored next to the profile, keyed by its name
    fn load_queue_set(
        &self,
        request: &RestoreRequest,
        profile: &RoutingProfile,
    ) -> BackupResult<Vec<RoutingProfileQueueConfigSummary>> {
        let locator = request
            .source
            .sibling(ResourceKind::RoutingProfileQueueSet.namespace(), &profile.name)?;
        debug!(source = %locator, "loading queue associations");
        let bytes = self.reader.read(&locator)?;
        serde_json::from_slice(&bytes).map_err(|e| ConnectBackupError::Deserialize {
            kind: ResourceKind::RoutingProfileQueueSet,
            message: e.to_string(),
        })
    }

    fn restore_user(&self, request: &RestoreRequest, user: &User) -> BackupResult<RestoreOutcome> {
        let instance_id = request.instance.id();
        let mut aspects = Aspects::new(self.provider);

        let (mode, name, target_id) = match &request.new_name {
            Some(new_name) => {
                let password = generate_password();
                let create = CreateUser {
                    instance_id,
                    username: new_name,
                    password: &password,
                    identity_info: user.identity_info.as_ref(),
                    phone_config: user.phone_config.as_ref(),
                    security_profile_ids: user.security_profile_ids.as_deref(),
                    routing_profile_id: user.routing_profile_id.as_deref(),
                    hierarchy_group_id: user.hierarchy_group_id.as_deref(),
                    tags: Tags::new(),
                };
                let id = self.create(Operation::CreateUser, &create, "UserId")?;
                info!(user = %new_name, "created user with a generated temporary password");
                aspects.record("create");
                (RestoreMode::Created, new_name.clone(), id)
            }
            None => {
                self.validator.validate(user.arn.as_deref(), &request.instance)?;
                let id = required_id(user.id.as_deref(), ResourceKind::User, &user.username)?;

                match &user.identity_info {
                    Some(identity_info) => aspects.apply(
                        "identity-info",
                        Operation::UpdateUserIdentityInfo,
                        &UpdateUserIdentityInfo {
                            instance_id,
                            user_id: id,
                            identity_info,
                        },
                    ),
                    None => aspects.skip("identity-info"),
                }
                match user.security_profile_ids.as_deref() {
                    Some(security_profile_ids) => aspects.apply(
                        "security-profiles",
                        Operation::UpdateUserSecurityProfiles,
                        &UpdateUserSecurityProfiles {
                            instance_id,
                            user_id: id,
                            security_profile_ids,
                        },
                    ),
                    None => aspects.skip("security-profiles"),
                }
                match &user.phone_config {
                    Some(phone_config) => aspects.apply(
                        "phone-config",
                        Operation::UpdateUserPhoneConfig,
                        &UpdateUserPhoneConfig {
                            instance_id,
                            user_id: id,
                            phone_config,
                        },
                    ),
                    None => aspects.skip("phone-config"),
                }
                match user.routing_profile_id.as_deref() {
                    Some(routing_profile_id) => aspects.apply(
                        "routing-profile",
                        Operation::UpdateUserRoutingProfile,
                        &UpdateUserRoutingProfile {
                            instance_id,
                            user_id: id,
                            routing_profile_id,
                        },
                    ),
                    None => aspects.skip("routing-profile"),
                }
                match user.hierarchy_group_id.as_deref() {
                    Some(hierarchy_group_id) => aspects.apply(
                        "hierarchy",
                        Operation::UpdateUserHierarchy,
                        &UpdateUserHierarchy {
                            instance_id,
                            user_id: id,
                            hierarchy_group_id,
                        },
                    ),
                    None => aspects.skip("hierarchy"),
                }
                (RestoreMode::Updated, user.username.clone(), id.to_string())
            }
        };

        let applied = aspects.finish(format!("user '{}'", name))?;
        Ok(RestoreOutcome {
            kind: ResourceKind::User,
            name,
            mode,
            target_id: Some(target_id),
            applied,
        })
    }

    fn restore_hierarchy_group(
        &self,
        request: &RestoreRequest,
        group: &HierarchyGroup,
    ) -> BackupResult<RestoreOutcome> {
        let instance_id = request.instance.id();
        let mut aspects = Aspects::new(self.provider);

        let (mode, name, target_id) = match &request.new_name {
            Some(new_name) => {
                let create = CreateUserHierarchyGroup {
                    instance_id,
                    name: new_name,
                    parent_group_id: group.parent_group_id(),
                    tags: Tags::new(),
                };
                let id = self.create(
                    Operation::CreateUserHierarchyGroup,
                    &create,
                    "HierarchyGroupId",
                )?;
                aspects.record("create");
                (RestoreMode::Created, new_name.clone(), id)
            }
            None => {
                self.validator.validate(group.arn.as_deref(), &request.instance)?;
                let id = required_id(group.id.as_deref(), ResourceKind::HierarchyGroup, &group.name)?;
                aspects.apply(
                    "name",
                    Operation::UpdateUserHierarchyGroupName,
                    &UpdateUserHierarchyGroupName {
                        instance_id,
                        hierarchy_group_id: id,
                        name: &group.name,
                    },
                );
                (RestoreMode::Updated, group.name.clone(), id.to_string())
            }
        };

        let applied = aspects.finish(format!("user hierarchy group '{}'", name))?;
        Ok(RestoreOutcome {
            kind: ResourceKind::HierarchyGroup,
            name,
            mode,
            target_id: Some(target_id),
            applied,
        })
    }

    fn restore_hierarchy_structure(
        &self,
        request: &RestoreRequest,
        levels: &HierarchyLevels,
    ) -> BackupResult<RestoreOutcome> {
        let mut aspects = Aspects::new(self.provider);
        aspects.apply(
            "structure",
            Operation::UpdateUserHierarchyStructure,
            &UpdateUserHierarchyStructure {
                instance_id: request.instance.id(),
                hierarchy_structure: levels.into(),
            },
        );

        let applied = aspects.finish("user hierarchy structure".to_string())?;
        Ok(RestoreOutcome {
            kind: ResourceKind::HierarchyStructure,
            name: ResourceKind::HierarchyStructure
                .singleton_name()
                .unwrap_or_default()
                .to_string(),
            mode: RestoreMode::Updated,
            target_id: None,
            applied,
        })
    }
}

fn required_id<'r>(id: Option<&'r str>, kind: ResourceKind, name: &str) -> BackupResult<&'r str> {
    id.ok_or_else(|| {
        ConnectBackupError::Validation(format!(
            "{} '{}' has no id to update in place; restore it under a new name instead",
            kind, name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;
    use crate::provider::mock::{page, MemoryStore, MockProvider};
    use crate::storage::LocatorReader;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    const ACCOUNT: &str = "111122223333";

    fn arn(resource: &str) -> String {
        format!("arn:aws:connect:us-east-1:{}:instance/abc123/{}", ACCOUNT, resource)
    }

    fn write_record(root: &Path, namespace: &str, name: &str, body: &Value) -> Locator {
        let dir = root.join("abc123").join(namespace);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.json", name));
        std::fs::write(&path, serde_json::to_vec_pretty(body).unwrap()).unwrap();
        Locator::File(path)
    }

    fn request(kind: ResourceKind, source: Locator, new_name: Option<&str>) -> RestoreRequest {
        RestoreRequest {
            kind,
            source,
            instance: InstanceHandle::new("abc123"),
            new_name: new_name.map(str::to_string),
        }
    }

    /// Provider for the instance the records were backed up from
    fn same_environment() -> MockProvider {
        MockProvider::new(ACCOUNT).respond(
            Operation::ListInstances,
            page("InstanceSummaryList", vec![json!({"Id": "abc123"})]),
        )
    }

    fn manager(provider: &MockProvider) -> RestoreManager<'_, MockProvider, LocatorReader<MemoryStore>> {
        RestoreManager::new(provider, LocatorReader::new(MemoryStore::new()), CancelFlag::new())
    }

    fn flow() -> Value {
        json!({
            "Arn": arn("contact-flow/f-1"),
            "Id": "f-1",
            "Name": "Welcome",
            "Type": "CONTACT_FLOW",
            "Description": "Greets callers",
            "Content": "{\"Version\":\"2019-10-30\",\"Actions\":[]}",
            "Tags": {"team": "support"}
        })
    }

    fn sales_profile() -> Value {
        json!({
            "InstanceId": "abc123",
            "Name": "Sales",
            "RoutingProfileArn": arn("routing-profile/rp-1"),
            "RoutingProfileId": "rp-1",
            "Description": "Sales agents",
            "MediaConcurrencies": [{"Channel": "VOICE", "Concurrency": 1}],
            "DefaultOutboundQueueId": "q-out",
            "Tags": {"team": "sales"}
        })
    }

    fn queue_configs(count: usize) -> Value {
        Value::Array(
            (1..=count)
                .map(|i| {
                    json!({
                        "QueueId": format!("q-{}", i),
                        "QueueArn": arn(&format!("queue/q-{}", i)),
                        "QueueName": format!("Queue {}", i),
                        "Priority": 1,
                        "Delay": 0,
                        "Channel": "VOICE"
                    })
                })
                .collect(),
        )
    }

    fn user() -> Value {
        json!({
            "Id": "user-0001",
            "Arn": arn("agent/user-0001"),
            "Username": "jdoe",
            "IdentityInfo": {"FirstName": "Jane", "LastName": "Doe"},
            "PhoneConfig": {"PhoneType": "SOFT_PHONE", "AutoAccept": false, "AfterContactWorkTimeLimit": 0},
            "DirectoryUserId": "d-123",
            "SecurityProfileIds": ["sp-1"],
            "RoutingProfileId": "rp-1",
            "Tags": {"team": "support"}
        })
    }

    #[test]
    fn test_routing_profile_create_uses_new_id_for_queues() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "routing-profiles", "Sales", &sales_profile());
        write_record(temp.path(), "routing-profile-queues", "Sales", &queue_configs(2));
        let provider = MockProvider::new(ACCOUNT).respond(
            Operation::CreateRoutingProfile,
            json!({"RoutingProfileId": "rp-new", "RoutingProfileArn": arn("routing-profile/rp-new")}),
        );

        let outcome = manager(&provider)
            .restore(&request(ResourceKind::RoutingProfile, source, Some("NewProfile")))
            .unwrap();

        assert_eq!(outcome.mode, RestoreMode::Created);
        assert_eq!(outcome.target_id.as_deref(), Some("rp-new"));
        assert_eq!(
            provider.mutations(),
            vec![
                Operation::CreateRoutingProfile,
                Operation::AssociateRoutingProfileQueues,
                Operation::UpdateRoutingProfileQueues,
            ]
        );

        let create = &provider.calls_to(Operation::CreateRoutingProfile)[0];
        assert_eq!(create["Name"], "NewProfile");
        assert!(create.get("RoutingProfileId").is_none());
        assert!(create.get("Tags").is_none());
        assert!(!create.to_string().contains("rp-1"));

        for op in [
            Operation::AssociateRoutingProfileQueues,
            Operation::UpdateRoutingProfileQueues,
        ] {
            let call = &provider.calls_to(op)[0];
            assert_eq!(call["RoutingProfileId"], "rp-new");
            assert_eq!(call["QueueConfigs"].as_array().unwrap().len(), 2);
            assert_eq!(call["QueueConfigs"][0]["QueueReference"]["QueueId"], "q-1");
        }
    }

    #[test]
    fn test_routing_profile_update_in_place() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "routing-profiles", "Sales", &sales_profile());
        write_record(temp.path(), "routing-profile-queues", "Sales", &queue_configs(1));
        let provider = same_environment();

        let outcome = manager(&provider)
            .restore(&request(ResourceKind::RoutingProfile, source, None))
            .unwrap();

        assert_eq!(outcome.mode, RestoreMode::Updated);
        assert_eq!(
            outcome.applied,
            vec!["name", "concurrency", "default-outbound-queue", "associate-queues", "update-queues"]
        );
        let update = &provider.calls_to(Operation::UpdateRoutingProfileQueues)[0];
        assert_eq!(update["RoutingProfileId"], "rp-1");
    }

    #[test]
    fn test_queue_associations_are_batched() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "routing-profiles", "Sales", &sales_profile());
        write_record(temp.path(), "routing-profile-queues", "Sales", &queue_configs(23));
        let provider = same_environment().enqueue(
            Operation::AssociateRoutingProfileQueues,
            Err(ProviderError::new("associate-routing-profile-queues", "Queue is already associated")
                .with_kind(ProviderErrorKind::Conflict)
                .with_code("InvalidRequestException")),
        );

        manager(&provider)
            .restore(&request(ResourceKind::RoutingProfile, source, None))
            .unwrap();

        let sizes: Vec<usize> = provider
            .calls_to(Operation::UpdateRoutingProfileQueues)
            .iter()
            .map(|call| call["QueueConfigs"].as_array().unwrap().len())
            .collect();
        assert_eq!(sizes, vec![10, 10, 3]);
        assert_eq!(provider.calls_to(Operation::AssociateRoutingProfileQueues).len(), 3);

        // each batch is associated before it is updated
        let queue_ops: Vec<Operation> = provider
            .mutations()
            .into_iter()
            .filter(|op| {
                matches!(
                    op,
                    Operation::AssociateRoutingProfileQueues | Operation::UpdateRoutingProfileQueues
                )
            })
            .collect();
        assert_eq!(
            queue_ops,
            [
                Operation::AssociateRoutingProfileQueues,
                Operation::UpdateRoutingProfileQueues,
            ]
            .repeat(3)
        );
    }

    #[test]
    fn test_rejected_association_is_an_aspect_failure() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "routing-profiles", "Sales", &sales_profile());
        write_record(temp.path(), "routing-profile-queues", "Sales", &queue_configs(3));
        let provider = same_environment().enqueue(
            Operation::AssociateRoutingProfileQueues,
            Err(ProviderError::new("associate-routing-profile-queues", "not authorized")
                .with_kind(ProviderErrorKind::AccessDenied)
                .with_code("AccessDeniedException")),
        );

        let err = manager(&provider)
            .restore(&request(ResourceKind::RoutingProfile, source, None))
            .unwrap_err();
        match err {
            ConnectBackupError::AspectsFailed { failures, .. } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].aspect, "associate-queues");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(provider.calls_to(Operation::UpdateRoutingProfileQueues).len(), 1);
    }

    #[test]
    fn test_empty_queue_set_issues_no_queue_calls() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "routing-profiles", "Sales", &sales_profile());
        write_record(temp.path(), "routing-profile-queues", "Sales", &json!([]));
        let provider = same_environment();

        manager(&provider)
            .restore(&request(ResourceKind::RoutingProfile, source, None))
            .unwrap();

        assert!(provider.calls_to(Operation::AssociateRoutingProfileQueues).is_empty());
        assert!(provider.calls_to(Operation::UpdateRoutingProfileQueues).is_empty());
    }

    #[test]
    fn test_missing_queue_set_is_an_aspect_failure() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "routing-profiles", "Sales", &sales_profile());
        let provider = same_environment();

        let err = manager(&provider)
            .restore(&request(ResourceKind::RoutingProfile, source, None))
            .unwrap_err();

        match err {
            ConnectBackupError::AspectsFailed { failures, .. } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].aspect, "queues");
            }
            other => panic!("unexpected error: {}", other),
        }
        // the profile aspects were still applied
        assert_eq!(provider.mutations().len(), 3);
    }

    #[test]
    fn test_flow_from_other_account_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut foreign = flow();
        foreign["Arn"] = json!("arn:aws:connect:us-east-1:999999999999:instance/abc123/contact-flow/f-1");
        let source = write_record(temp.path(), "flows", "Welcome", &foreign);
        let provider = same_environment();

        let err = manager(&provider)
            .restore(&request(ResourceKind::Flow, source, None))
            .unwrap_err();

        assert!(err.is_validation());
        assert!(provider.mutations().is_empty());
    }

    #[test]
    fn test_flow_from_other_account_can_be_copied() {
        let temp = TempDir::new().unwrap();
        let mut foreign = flow();
        foreign["Arn"] = json!("arn:aws:connect:us-east-1:999999999999:instance/abc123/contact-flow/f-1");
        let source = write_record(temp.path(), "flows", "Welcome", &foreign);
        let provider = MockProvider::new(ACCOUNT)
            .respond(Operation::CreateContactFlow, json!({"ContactFlowId": "f-9"}));

        let outcome = manager(&provider)
            .restore(&request(ResourceKind::Flow, source, Some("Welcome copy")))
            .unwrap();

        assert_eq!(outcome.target_id.as_deref(), Some("f-9"));
        let create = &provider.calls_to(Operation::CreateContactFlow)[0];
        assert_eq!(
            create,
            &json!({
                "InstanceId": "abc123",
                "Name": "Welcome copy",
                "Type": "CONTACT_FLOW",
                "Description": "Greets callers",
                "Content": "{\"Version\":\"2019-10-30\",\"Actions\":[]}"
            })
        );
    }

    #[test]
    fn test_flow_update_in_place() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "flows", "Welcome", &flow());
        let provider = same_environment();

        let outcome = manager(&provider)
            .restore(&request(ResourceKind::Flow, source, None))
            .unwrap();

        assert_eq!(outcome.applied, vec!["name", "content"]);
        assert_eq!(
            provider.calls_to(Operation::UpdateContactFlowContent)[0],
            json!({
                "InstanceId": "abc123",
                "ContactFlowId": "f-1",
                "Content": "{\"Version\":\"2019-10-30\",\"Actions\":[]}"
            })
        );
        assert_eq!(outcome.summary(), "Updated flow 'Welcome' (f-1): name, content");
    }

    #[test]
    fn test_blank_new_name_updates_in_place() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "flows", "Welcome", &flow());
        let provider = same_environment();

        let outcome = manager(&provider)
            .restore(&request(ResourceKind::Flow, source, Some("")))
            .unwrap();

        assert_eq!(outcome.mode, RestoreMode::Updated);
        assert!(provider.calls_to(Operation::CreateContactFlow).is_empty());
        assert_eq!(
            provider.mutations(),
            vec![Operation::UpdateContactFlowName, Operation::UpdateContactFlowContent]
        );
    }

    #[test]
    fn test_update_in_place_is_repeatable() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "users", "jdoe", &user());
        let provider = same_environment();
        let manager = manager(&provider);
        let request = request(ResourceKind::User, source, None);

        manager.restore(&request).unwrap();
        let first = provider.calls();
        provider.clear_calls();
        manager.restore(&request).unwrap();

        assert_eq!(provider.calls(), first);
    }

    #[test]
    fn test_user_update_aspects_and_failures() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "users", "jdoe", &user());
        let provider = same_environment().on(Operation::UpdateUserPhoneConfig, |_| {
            Err(ProviderError::new("update-user-phone-config", "denied").with_code("AccessDeniedException"))
        });

        let err = manager(&provider)
            .restore(&request(ResourceKind::User, source, None))
            .unwrap_err();

        // no hierarchy group in the record, so no hierarchy call
        assert_eq!(
            provider.mutations(),
            vec![
                Operation::UpdateUserIdentityInfo,
                Operation::UpdateUserSecurityProfiles,
                Operation::UpdateUserPhoneConfig,
                Operation::UpdateUserRoutingProfile,
            ]
        );
        match err {
            ConnectBackupError::AspectsFailed { resource, failures } => {
                assert_eq!(resource, "user 'jdoe'");
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].aspect, "phone-config");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_user_hierarchy_applied_when_set() {
        let temp = TempDir::new().unwrap();
        let mut record = user();
        record["HierarchyGroupId"] = json!("g-1");
        let source = write_record(temp.path(), "users", "jdoe", &record);
        let provider = same_environment();

        let outcome = manager(&provider)
            .restore(&request(ResourceKind::User, source, None))
            .unwrap();

        assert_eq!(outcome.applied.last().map(String::as_str), Some("hierarchy"));
        assert_eq!(provider.calls_to(Operation::UpdateUserHierarchy)[0]["HierarchyGroupId"], "g-1");
    }

    #[test]
    fn test_user_create_generates_password() {
        let temp = TempDir::new().unwrap();
        let source = write_record(temp.path(), "users", "jdoe", &user());
        let provider = MockProvider::new(ACCOUNT)
            .respond(Operation::CreateUser, json!({"UserId": "u-9", "UserArn": arn("agent/u-9")}));

        manager(&provider)
            .restore(&request(ResourceKind::User, source, Some("jdoe2")))
            .unwrap();

        let create = &provider.calls_to(Operation::CreateUser)[0];
        assert_eq!(create["Username"], "jdoe2");
        assert_eq!(create["Password"].as_str().unwrap().chars().count(), 64);
        assert!(create.get("DirectoryUserId").is_none());
        assert!(create.get("Tags").is_none());
        assert!(create.get("Id").is_none());
        assert_eq!(create["SecurityProfileIds"], json!(["sp-1"]));
    }

    #[test]
    fn test_hierarchy_group_create_keeps_parent() {
        let temp = TempDir::new().unwrap();
        let group = json!({
            "Id": "g-2",
            "Arn": arn("agent-group/g-2"),
            "Name": "Team A",
            "LevelId": "2",
            "HierarchyPath": {
                "LevelOne": {"Id": "g-1", "Name": "Org"},
                "LevelTwo": {"Id": "g-2", "Name": "Team A"}
            }
        });
        let source = write_record(temp.path(), "user-hierarchy-groups", "Team A", &group);
        let provider = MockProvider::new(ACCOUNT)
            .respond(Operation::CreateUserHierarchyGroup, json!({"HierarchyGroupId": "g-9"}));

        manager(&provider)
            .restore(&request(ResourceKind::HierarchyGroup, source, Some("Team B")))
            .unwrap();

        assert_eq!(
            provider.calls_to(Operation::CreateUserHierarchyGroup)[0],
            json!({"InstanceId": "abc123", "Name": "Team B", "ParentGroupId": "g-1"})
        );
    }

    #[test]
    fn test_hierarchy_structure() {
        let temp = TempDir::new().unwrap();
        let structure = json!({
            "LevelOne": {"Id": "l-1", "Arn": arn("agent-group-level/1"), "Name": "Org"},
            "LevelTwo": {"Id": "l-2", "Name": "Team"}
        });
        let source = write_record(temp.path(), "common", "user-hierarchy-structure", &structure);
        let provider = MockProvider::new(ACCOUNT);

        let err = manager(&provider)
            .restore(&request(ResourceKind::HierarchyStructure, source.clone(), Some("x")))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(provider.calls().is_empty());

        let outcome = manager(&provider)
            .restore(&request(ResourceKind::HierarchyStructure, source, None))
            .unwrap();
        assert_eq!(outcome.target_id, None);
        assert_eq!(
            provider.calls_to(Operation::UpdateUserHierarchyStructure)[0],
            json!({
                "InstanceId": "abc123",
                "HierarchyStructure": {"LevelOne": {"Name": "Org"}, "LevelTwo": {"Name": "Team"}}
            })
        );
    }

    #[test]
    fn test_create_never_carries_original_id() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "routing-profile-queues", "Sales", &json!([]));
        let cases = [
            (ResourceKind::Flow, "flows", "Welcome", flow(), "f-1", Operation::CreateContactFlow, "ContactFlowId"),
            (ResourceKind::User, "users", "jdoe", user(), "user-0001", Operation::CreateUser, "UserId"),
            (
                ResourceKind::RoutingProfile,
                "routing-profiles",
                "Sales",
                sales_profile(),
                "rp-1",
                Operation::CreateRoutingProfile,
                "RoutingProfileId",
            ),
        ];

        for (kind, namespace, name, record, original_id, op, id_key) in cases {
            let source = write_record(temp.path(), namespace, name, &record);
            let provider = MockProvider::new(ACCOUNT).respond(op, json!({ id_key: "new-id" }));

            let outcome = manager(&provider)
                .restore(&request(kind, source, Some("Copy")))
                .unwrap();
            assert_eq!(outcome.target_id.as_deref(), Some("new-id"));

            let create = provider.calls_to(op)[0].to_string();
            assert!(!create.contains(original_id), "{} create carried {}", kind, original_id);
        }
    }

    #[test]
    fn test_read_and_decode_failures() {
        let temp = TempDir::new().unwrap();
        let provider = MockProvider::new(ACCOUNT);

        let missing = Locator::File(temp.path().join("abc123/flows/Missing.json"));
        let err = manager(&provider)
            .restore(&request(ResourceKind::Flow, missing, None))
            .unwrap_err();
        assert!(matches!(err, ConnectBackupError::Read(_)));

        let broken = write_record(temp.path(), "flows", "Broken", &json!({"Id": "f-1"}));
        let err = manager(&provider)
            .restore(&request(ResourceKind::Flow, broken, None))
            .unwrap_err();
        assert!(matches!(err, ConnectBackupError::Deserialize { kind: ResourceKind::Flow, .. }));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_unsupported_kind() {
        let provider = MockProvider::new(ACCOUNT);
        let err = manager(&provider)
            .restore(&request(ResourceKind::Queue, Locator::Console, None))
            .unwrap_err();
        assert!(matches!(err, ConnectBackupError::UnsupportedType(_)));
    }

    #[test]
    fn test_restore_from_object_store() {
        let store = MemoryStore::new();
        store.insert(
            "backups",
            "connect/abc123/flows/Welcome.json",
            &serde_json::to_vec(&flow()).unwrap(),
        );
        let provider = same_environment();
        let manager = RestoreManager::new(&provider, LocatorReader::new(&store), CancelFlag::new());

        let source = Locator::parse("s3://backups/connect/abc123/flows/Welcome.json").unwrap();
        let outcome = manager.restore(&request(ResourceKind::Flow, source, None)).unwrap();
        assert_eq!(outcome.target_id.as_deref(), Some("f-1"));
    }
}
