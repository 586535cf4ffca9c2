//! Cross-environment check for in-place restores
//!
//! Records embed ids of queues, prompts and other flows that only mean
//! something in the instance they were backed up from. Before a record may
//! overwrite a resource in place, its origin (parsed from the record's ARN)
//! must name the same account and instance as the destination.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::cancel::CancelFlag;
use crate::catalog::{self, list_all, Pages};
use crate::error::{BackupResult, ConnectBackupError};
use crate::models::{InstanceHandle, OriginIdentity, ResourceKind};
use crate::provider::RemoteProvider;

/// Account and instance a restore writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationIdentity {
    pub account_id: String,
    pub instance_id: String,
}

/// Origin and destination agree when both the account and the instance match
pub fn matches(origin: &OriginIdentity, destination: &DestinationIdentity) -> bool {
    origin.account_id == destination.account_id && origin.instance_id == destination.instance_id
}

/// Compares record origins against the live destination
pub struct CrossEnvironmentValidator<'a, P: RemoteProvider> {
    provider: &'a P,
    cancel: CancelFlag,
}

impl<'a, P: RemoteProvider> CrossEnvironmentValidator<'a, P> {
    pub fn new(provider: &'a P, cancel: CancelFlag) -> Self {
        Self { provider, cancel }
    }

    /// Permit an in-place update only when the record's origin matches the
    /// destination account and instance, and the instance is visible
    pub fn validate(&self, origin_arn: Option<&str>, instance: &InstanceHandle) -> BackupResult<()> {
        let arn = origin_arn.ok_or_else(|| {
            ConnectBackupError::Validation(
                "record has no ARN to establish where it was backed up from".into(),
            )
        })?;
        let origin = OriginIdentity::from_arn(arn).map_err(ConnectBackupError::Validation)?;

        let caller = self.provider.caller_identity()?;
        debug!(account = %caller.account, arn = %caller.arn, "resolved caller identity");
        let destination = DestinationIdentity {
            account_id: caller.account,
            instance_id: instance.id().to_string(),
        };

        if !matches(&origin, &destination) {
            return Err(ConnectBackupError::Validation(format!(
                "record was backed up from {} but the destination is account {} instance {}; \
                 restore it under a new name instead",
                origin, destination.account_id, destination.instance_id
            )));
        }

        self.ensure_visible(instance, &destination.account_id)?;
        info!(origin = %origin, "origin matches destination");
        Ok(())
    }

    fn ensure_visible(&self, instance: &InstanceHandle, account: &str) -> BackupResult<()> {
        let pages = Pages::new(
            self.provider,
            ResourceKind::Instance,
            catalog::INSTANCES,
            Map::new(),
            &self.cancel,
        );
        let visible = list_all(pages)?
            .iter()
            .any(|summary| summary.get("Id").and_then(Value::as_str) == Some(instance.id()));
        if visible {
            Ok(())
        } else {
            Err(ConnectBackupError::Validation(format!(
                "instance {} is not visible to account {}",
                instance, account
            )))
        }
    }
}
