//! Provider backed by the AWS SDK
//!
//! The SDK clients are async; the orchestrators are not. `AwsSdk` owns a
//! tokio runtime and blocks on each request, so a call returns only once the
//! SDK has finished its own signing, retry and backoff. Service failures are
//! classified from the SDK's typed error variants.

use std::error::Error as StdError;
use std::fmt::Debug;

use aws_config::BehaviorVersion;
use aws_sdk_connect::config::Region;
use aws_sdk_connect::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_connect::types::{ContactFlowType, QueueType};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use tracing::{debug, trace};

use super::shapes::{document, Input, ToJson};
use super::{CallerIdentity, ObjectStore, Operation, RemoteProvider, NEXT_TOKEN};
use crate::error::{BackupResult, ConnectBackupError, ProviderError, ProviderErrorKind};

/// Request fields never written to logs
const SECRET_FIELDS: [&str; 1] = ["Password"];

/// Connection settings; unset fields fall back to the SDK's default chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderOptions {
    pub profile: Option<String>,
    pub region: Option<String>,
    /// Endpoint override for every service, e.g. a local emulator
    pub endpoint_url: Option<String>,
}

impl ProviderOptions {
    pub fn new(profile: Option<String>, region: Option<String>) -> Self {
        Self {
            profile: profile.filter(|p| !p.is_empty()),
            region: region.filter(|r| !r.is_empty()),
            endpoint_url: None,
        }
    }

    pub fn with_endpoint_url(mut self, url: Option<String>) -> Self {
        self.endpoint_url = url.filter(|u| !u.is_empty());
        self
    }
}

/// Contact-center, identity and object-store clients sharing one runtime
pub struct AwsSdk {
    runtime: Runtime,
    connect: aws_sdk_connect::Client,
    sts: aws_sdk_sts::Client,
    s3: aws_sdk_s3::Client,
    region: Option<String>,
}

/// Send a contact-center request and map its failure to a `ProviderError`
macro_rules! send {
    ($op:expr, $request:expr) => {
        $request
            .send()
            .await
            .map_err(|e| connect_error($op, e))?
    };
}

impl AwsSdk {
    /// Resolve credentials and region and build the clients.
    ///
    /// No request is made here; missing credentials surface on the first call.
    pub fn connect(options: &ProviderOptions) -> BackupResult<Self> {
        let runtime = Runtime::new().map_err(|e| {
            ConnectBackupError::Config(format!("Failed to start async runtime: {}", e))
        })?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &options.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &options.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(url) = &options.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let config = runtime.block_on(loader.load());
        let region = config.region().map(ToString::to_string);
        debug!(region = region.as_deref().unwrap_or("unset"), "loaded provider configuration");

        Ok(Self {
            connect: aws_sdk_connect::Client::new(&config),
            sts: aws_sdk_sts::Client::new(&config),
            s3: aws_sdk_s3::Client::new(&config),
            region,
            runtime,
        })
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    async fn dispatch(&self, op: Operation, input: &Input<'_>) -> Result<Value, ProviderError> {
        let c = &self.connect;
        let token = input.opt_str(NEXT_TOKEN);

        let response = match op {
            Operation::ListInstances => {
                let out = send!(op, c.list_instances().set_next_token(token));
                document([
                    ("InstanceSummaryList", out.instance_summary_list.to_json()),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListLambdaFunctions => {
                let out = send!(
                    op,
                    c.list_lambda_functions()
                        .instance_id(input.str("InstanceId")?)
                        .set_next_token(token)
                );
                document([
                    ("LambdaFunctions", out.lambda_functions.to_json()),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListLexBots => {
                let out = send!(
                    op,
                    c.list_lex_bots()
                        .instance_id(input.str("InstanceId")?)
                        .set_next_token(token)
                );
                document([
                    ("LexBots", out.lex_bots.to_json()),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListPrompts => {
                let out = send!(
                    op,
                    c.list_prompts()
                        .instance_id(input.str("InstanceId")?)
                        .set_next_token(token)
                );
                document([
                    ("PromptSummaryList", out.prompt_summary_list.to_json()),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListHoursOfOperations => {
                let out = send!(
                    op,
                    c.list_hours_of_operations()
                        .instance_id(input.str("InstanceId")?)
                        .set_next_token(token)
                );
                document([
                    (
                        "HoursOfOperationSummaryList",
                        out.hours_of_operation_summary_list.to_json(),
                    ),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListQuickConnects => {
                let out = send!(
                    op,
                    c.list_quick_connects()
                        .instance_id(input.str("InstanceId")?)
                        .set_next_token(token)
                );
                document([
                    ("QuickConnectSummaryList", out.quick_connect_summary_list.to_json()),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListContactFlows => {
                let out = send!(
                    op,
                    c.list_contact_flows()
                        .instance_id(input.str("InstanceId")?)
                        .set_next_token(token)
                );
                document([
                    ("ContactFlowSummaryList", out.contact_flow_summary_list.to_json()),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListUsers => {
                let out = send!(
                    op,
                    c.list_users()
                        .instance_id(input.str("InstanceId")?)
                        .set_next_token(token)
                );
                document([
                    ("UserSummaryList", out.user_summary_list.to_json()),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListRoutingProfiles => {
                let out = send!(
                    op,
                    c.list_routing_profiles()
                        .instance_id(input.str("InstanceId")?)
                        .set_next_token(token)
                );
                document([
                    ("RoutingProfileSummaryList", out.routing_profile_summary_list.to_json()),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListRoutingProfileQueues => {
                let out = send!(
                    op,
                    c.list_routing_profile_queues()
                        .instance_id(input.str("InstanceId")?)
                        .routing_profile_id(input.str("RoutingProfileId")?)
                        .set_next_token(token)
                );
                document([
                    (
                        "RoutingProfileQueueConfigSummaryList",
                        out.routing_profile_queue_config_summary_list.to_json(),
                    ),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListUserHierarchyGroups => {
                let out = send!(
                    op,
                    c.list_user_hierarchy_groups()
                        .instance_id(input.str("InstanceId")?)
                        .set_next_token(token)
                );
                document([
                    (
                        "UserHierarchyGroupSummaryList",
                        out.user_hierarchy_group_summary_list.to_json(),
                    ),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }
            Operation::ListQueues => {
                let queue_types = input.strings("QueueTypes")?.map(|types| {
                    types
                        .iter()
                        .map(|t| QueueType::from(t.as_str()))
                        .collect::<Vec<_>>()
                });
                let out = send!(
                    op,
                    c.list_queues()
                        .instance_id(input.str("InstanceId")?)
                        .set_queue_types(queue_types)
                        .set_next_token(token)
                );
                document([
                    ("QueueSummaryList", out.queue_summary_list.to_json()),
                    (NEXT_TOKEN, out.next_token.to_json()),
                ])
            }

            Operation::DescribeInstance => {
                let out = send!(op, c.describe_instance().instance_id(input.str("InstanceId")?));
                document([("Instance", out.instance.to_json())])
            }
            Operation::DescribeHoursOfOperation => {
                let out = send!(
                    op,
                    c.describe_hours_of_operation()
                        .instance_id(input.str("InstanceId")?)
                        .hours_of_operation_id(input.str("HoursOfOperationId")?)
                );
                document([("HoursOfOperation", out.hours_of_operation.to_json())])
            }
            Operation::DescribeQuickConnect => {
                let out = send!(
                    op,
                    c.describe_quick_connect()
                        .instance_id(input.str("InstanceId")?)
                        .quick_connect_id(input.str("QuickConnectId")?)
                );
                document([("QuickConnect", out.quick_connect.to_json())])
            }
            Operation::DescribeContactFlow => {
                let out = send!(
                    op,
                    c.describe_contact_flow()
                        .instance_id(input.str("InstanceId")?)
                        .contact_flow_id(input.str("ContactFlowId")?)
                );
                document([("ContactFlow", out.contact_flow.to_json())])
            }
            Operation::DescribeUser => {
                let out = send!(
                    op,
                    c.describe_user()
                        .instance_id(input.str("InstanceId")?)
                        .user_id(input.str("UserId")?)
                );
                document([("User", out.user.to_json())])
            }
            Operation::DescribeRoutingProfile => {
                let out = send!(
                    op,
                    c.describe_routing_profile()
                        .instance_id(input.str("InstanceId")?)
                        .routing_profile_id(input.str("RoutingProfileId")?)
                );
                document([("RoutingProfile", out.routing_profile.to_json())])
            }
            Operation::DescribeUserHierarchyGroup => {
                let out = send!(
                    op,
                    c.describe_user_hierarchy_group()
                        .instance_id(input.str("InstanceId")?)
                        .hierarchy_group_id(input.str("HierarchyGroupId")?)
                );
                document([("HierarchyGroup", out.hierarchy_group.to_json())])
            }
            Operation::DescribeUserHierarchyStructure => {
                let out = send!(
                    op,
                    c.describe_user_hierarchy_structure()
                        .instance_id(input.str("InstanceId")?)
                );
                document([("HierarchyStructure", out.hierarchy_structure.to_json())])
            }
            Operation::DescribeQueue => {
                let out = send!(
                    op,
                    c.describe_queue()
                        .instance_id(input.str("InstanceId")?)
                        .queue_id(input.str("QueueId")?)
                );
                document([("Queue", out.queue.to_json())])
            }

            Operation::CreateContactFlow => {
                let out = send!(
                    op,
                    c.create_contact_flow()
                        .instance_id(input.str("InstanceId")?)
                        .name(input.str("Name")?)
                        .set_type(input.opt_str("Type").map(|t| ContactFlowType::from(t.as_str())))
                        .set_description(input.opt_str("Description"))
                        .set_content(input.opt_str("Content"))
                );
                document([
                    ("ContactFlowId", out.contact_flow_id.to_json()),
                    ("ContactFlowArn", out.contact_flow_arn.to_json()),
                ])
            }
            Operation::CreateRoutingProfile => {
                let out = send!(
                    op,
                    c.create_routing_profile()
                        .instance_id(input.str("InstanceId")?)
                        .name(input.str("Name")?)
                        .set_description(input.opt_str("Description"))
                        .set_default_outbound_queue_id(input.opt_str("DefaultOutboundQueueId"))
                        .set_media_concurrencies(input.media_concurrencies()?)
                );
                document([
                    ("RoutingProfileId", out.routing_profile_id.to_json()),
                    ("RoutingProfileArn", out.routing_profile_arn.to_json()),
                ])
            }
            Operation::CreateUser => {
                let out = send!(
                    op,
                    c.create_user()
                        .instance_id(input.str("InstanceId")?)
                        .username(input.str("Username")?)
                        .set_password(input.opt_str("Password"))
                        .set_identity_info(input.identity_info()?)
                        .set_phone_config(input.phone_config()?)
                        .set_security_profile_ids(input.strings("SecurityProfileIds")?)
                        .set_routing_profile_id(input.opt_str("RoutingProfileId"))
                        .set_hierarchy_group_id(input.opt_str("HierarchyGroupId"))
                );
                document([
                    ("UserId", out.user_id.to_json()),
                    ("UserArn", out.user_arn.to_json()),
                ])
            }
            Operation::CreateUserHierarchyGroup => {
                let out = send!(
                    op,
                    c.create_user_hierarchy_group()
                        .instance_id(input.str("InstanceId")?)
                        .name(input.str("Name")?)
                        .set_parent_group_id(input.opt_str("ParentGroupId"))
                );
                document([
                    ("HierarchyGroupId", out.hierarchy_group_id.to_json()),
                    ("HierarchyGroupArn", out.hierarchy_group_arn.to_json()),
                ])
            }

            Operation::UpdateContactFlowName => {
                send!(
                    op,
                    c.update_contact_flow_name()
                        .instance_id(input.str("InstanceId")?)
                        .contact_flow_id(input.str("ContactFlowId")?)
                        .set_name(input.opt_str("Name"))
                        .set_description(input.opt_str("Description"))
                );
                Value::Null
            }
            Operation::UpdateContactFlowContent => {
                send!(
                    op,
                    c.update_contact_flow_content()
                        .instance_id(input.str("InstanceId")?)
                        .contact_flow_id(input.str("ContactFlowId")?)
                        .content(input.str("Content")?)
                );
                Value::Null
            }
            Operation::UpdateRoutingProfileName => {
                send!(
                    op,
                    c.update_routing_profile_name()
                        .instance_id(input.str("InstanceId")?)
                        .routing_profile_id(input.str("RoutingProfileId")?)
                        .set_name(input.opt_str("Name"))
                        .set_description(input.opt_str("Description"))
                );
                Value::Null
            }
            Operation::UpdateRoutingProfileConcurrency => {
                send!(
                    op,
                    c.update_routing_profile_concurrency()
                        .instance_id(input.str("InstanceId")?)
                        .routing_profile_id(input.str("RoutingProfileId")?)
                        .set_media_concurrencies(input.media_concurrencies()?)
                );
                Value::Null
            }
            Operation::UpdateRoutingProfileDefaultOutboundQueue => {
                send!(
                    op,
                    c.update_routing_profile_default_outbound_queue()
                        .instance_id(input.str("InstanceId")?)
                        .routing_profile_id(input.str("RoutingProfileId")?)
                        .default_outbound_queue_id(input.str("DefaultOutboundQueueId")?)
                );
                Value::Null
            }
            Operation::AssociateRoutingProfileQueues => {
                send!(
                    op,
                    c.associate_routing_profile_queues()
                        .instance_id(input.str("InstanceId")?)
                        .routing_profile_id(input.str("RoutingProfileId")?)
                        .set_queue_configs(Some(input.queue_configs()?))
                );
                Value::Null
            }
            Operation::UpdateRoutingProfileQueues => {
                send!(
                    op,
                    c.update_routing_profile_queues()
                        .instance_id(input.str("InstanceId")?)
                        .routing_profile_id(input.str("RoutingProfileId")?)
                        .set_queue_configs(Some(input.queue_configs()?))
                );
                Value::Null
            }
            Operation::UpdateUserIdentityInfo => {
                send!(
                    op,
                    c.update_user_identity_info()
                        .instance_id(input.str("InstanceId")?)
                        .user_id(input.str("UserId")?)
                        .set_identity_info(input.identity_info()?)
                );
                Value::Null
            }
            Operation::UpdateUserSecurityProfiles => {
                send!(
                    op,
                    c.update_user_security_profiles()
                        .instance_id(input.str("InstanceId")?)
                        .user_id(input.str("UserId")?)
                        .set_security_profile_ids(input.strings("SecurityProfileIds")?)
                );
                Value::Null
            }
            Operation::UpdateUserPhoneConfig => {
                send!(
                    op,
                    c.update_user_phone_config()
                        .instance_id(input.str("InstanceId")?)
                        .user_id(input.str("UserId")?)
                        .set_phone_config(input.phone_config()?)
                );
                Value::Null
            }
            Operation::UpdateUserRoutingProfile => {
                send!(
                    op,
                    c.update_user_routing_profile()
                        .instance_id(input.str("InstanceId")?)
                        .user_id(input.str("UserId")?)
                        .routing_profile_id(input.str("RoutingProfileId")?)
                );
                Value::Null
            }
            Operation::UpdateUserHierarchy => {
                send!(
                    op,
                    c.update_user_hierarchy()
                        .instance_id(input.str("InstanceId")?)
                        .user_id(input.str("UserId")?)
                        .set_hierarchy_group_id(input.opt_str("HierarchyGroupId"))
                );
                Value::Null
            }
            Operation::UpdateUserHierarchyGroupName => {
                send!(
                    op,
                    c.update_user_hierarchy_group_name()
                        .instance_id(input.str("InstanceId")?)
                        .hierarchy_group_id(input.str("HierarchyGroupId")?)
                        .name(input.str("Name")?)
                );
                Value::Null
            }
            Operation::UpdateUserHierarchyStructure => {
                send!(
                    op,
                    c.update_user_hierarchy_structure()
                        .instance_id(input.str("InstanceId")?)
                        .hierarchy_structure(input.hierarchy_structure()?)
                );
                Value::Null
            }
        };
        Ok(response)
    }
}

impl RemoteProvider for AwsSdk {
    fn call(&self, op: Operation, input: &Value) -> Result<Value, ProviderError> {
        debug!(operation = %op, "calling provider");
        trace!(operation = %op, input = %redacted(input), "request document");
        self.runtime.block_on(self.dispatch(op, &Input::new(op, input)))
    }

    fn caller_identity(&self) -> Result<CallerIdentity, ProviderError> {
        let out = self
            .runtime
            .block_on(self.sts.get_caller_identity().send())
            .map_err(|e| describe_failure("get-caller-identity", &e))?;
        let account = out.account.ok_or_else(|| {
            ProviderError::new("get-caller-identity", "response has no Account")
                .with_kind(ProviderErrorKind::Response)
        })?;
        Ok(CallerIdentity {
            account,
            arn: out.arn.unwrap_or_default(),
            user_id: out.user_id,
        })
    }
}

impl ObjectStore for AwsSdk {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), ProviderError> {
        debug!(bucket, key, bytes = body.len(), "uploading object");
        self.runtime
            .block_on(
                self.s3
                    .put_object()
                    .bucket(bucket)
                    .key(key)
                    .content_type("application/json")
                    .acl(ObjectCannedAcl::BucketOwnerFullControl)
                    .body(ByteStream::from(body.to_vec()))
                    .send(),
            )
            .map_err(|e| describe_failure("put-object", &e))?;
        Ok(())
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ProviderError> {
        debug!(bucket, key, "downloading object");
        self.runtime.block_on(async {
            let out = self
                .s3
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    let missing = e
                        .as_service_error()
                        .map(GetObjectError::is_no_such_key)
                        .unwrap_or(false);
                    let error = describe_failure("get-object", &e);
                    if missing {
                        error.with_kind(ProviderErrorKind::NotFound)
                    } else {
                        error
                    }
                })?;
            let data = out.body.collect().await.map_err(|e| {
                ProviderError::new("get-object", format!("failed to read object body: {}", e))
                    .with_kind(ProviderErrorKind::Response)
            })?;
            Ok(data.into_bytes().to_vec())
        })
    }
}

/// Message, code and transport class of any SDK failure
fn describe_failure<E, R>(operation: &str, err: &SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
{
    let kind = match err {
        SdkError::ServiceError(_) => ProviderErrorKind::Service,
        SdkError::ResponseError(_) => ProviderErrorKind::Response,
        _ => ProviderErrorKind::Transport,
    };
    let service = err.as_service_error();
    let message = service
        .and_then(|e| e.message())
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());

    let mut error = ProviderError::new(operation, message).with_kind(kind);
    if let Some(code) = service.and_then(|e| e.code()) {
        error = error.with_code(code);
    }
    error
}

/// Contact-center failure, classified by the service's typed error variant
fn connect_error<E, R>(op: Operation, err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
    aws_sdk_connect::Error: From<SdkError<E, R>>,
{
    let error = describe_failure(op.name(), &err);
    if error.kind != ProviderErrorKind::Service {
        return error;
    }
    let kind = service_kind(op, &aws_sdk_connect::Error::from(err));
    error.with_kind(kind)
}

fn service_kind(op: Operation, err: &aws_sdk_connect::Error) -> ProviderErrorKind {
    use aws_sdk_connect::Error;

    match err {
        Error::ResourceNotFoundException(_) => ProviderErrorKind::NotFound,
        Error::DuplicateResourceException(_) | Error::ResourceConflictException(_) => {
            ProviderErrorKind::Conflict
        }
        // the association call has no upsert; a repeated association is rejected as invalid
        Error::InvalidRequestException(_) if op == Operation::AssociateRoutingProfileQueues => {
            ProviderErrorKind::Conflict
        }
        Error::InvalidRequestException(_) | Error::InvalidParameterException(_) => {
            ProviderErrorKind::InvalidRequest
        }
        Error::ThrottlingException(_) | Error::LimitExceededException(_) => {
            ProviderErrorKind::Throttled
        }
        Error::AccessDeniedException(_) => ProviderErrorKind::AccessDenied,
        _ => ProviderErrorKind::Service,
    }
}

/// Copy of a request document with secret fields masked
fn redacted(input: &Value) -> Value {
    let mut copy = input.clone();
    if let Some(fields) = copy.as_object_mut() {
        for name in SECRET_FIELDS {
            if let Some(value) = fields.get_mut(name) {
                *value = json!("********");
            }
        }
    }
    copy
}
