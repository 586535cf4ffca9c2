//! Bulk flow renaming
//!
//! Prefixes the names of the stock sample flows an instance is created with,
//! so they sort out of the way of real flows. Flows already carrying the
//! prefix are left alone, which makes a second run a no-op.

use std::collections::BTreeSet;

use serde_json::{json, Value};
use tracing::{debug, info, info_span, warn};

use crate::cancel::CancelFlag;
use crate::catalog::{self, fetch::instance_input, list_all, Pages};
use crate::error::{AspectFailure, BackupResult, ConnectBackupError};
use crate::models::{ContactFlow, InstanceHandle, ResourceKind};
use crate::provider::{Operation, RemoteProvider};

use super::requests::UpdateContactFlowName;

/// Prefix used when none is given
pub const DEFAULT_PREFIX: &str = "~";

/// Outcome of a rename run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
    /// `(old, new)` pairs, in listing order
    pub renamed: Vec<(String, String)>,
    /// Selected flows that already carried the prefix
    pub already_prefixed: Vec<String>,
}

impl RenameReport {
    pub fn summary(&self) -> String {
        format!(
            "Renamed {} flow(s), {} already prefixed",
            self.renamed.len(),
            self.already_prefixed.len()
        )
    }
}

/// Renames flows of one instance
pub struct FlowRenamer<'a, P: RemoteProvider> {
    provider: &'a P,
    default_flow_names: BTreeSet<String>,
    cancel: CancelFlag,
}

impl<'a, P: RemoteProvider> FlowRenamer<'a, P> {
    /// Create a renamer selecting `default_flow_names` unless asked for all flows
    pub fn new<I, S>(provider: &'a P, default_flow_names: I, cancel: CancelFlag) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            provider,
            default_flow_names: default_flow_names.into_iter().map(Into::into).collect(),
            cancel,
        }
    }

    fn is_selected(&self, name: &str, all_flows: bool) -> bool {
        all_flows || self.default_flow_names.contains(name)
    }

    /// Prefix every selected flow name that does not already start with `prefix`
    pub fn rename(
        &self,
        instance: &InstanceHandle,
        prefix: &str,
        all_flows: bool,
    ) -> BackupResult<RenameReport> {
        let span = info_span!("rename-flows", instance = %instance, prefix, all_flows);
        let _enter = span.enter();

        if prefix.is_empty() {
            return Err(ConnectBackupError::Validation(
                "the rename prefix cannot be empty".into(),
            ));
        }

        let listing = catalog::entry(ResourceKind::Flow)
            .list
            .ok_or_else(|| ConnectBackupError::UnsupportedType("flow listing".into()))?;
        let summaries = list_all(Pages::new(
            self.provider,
            ResourceKind::Flow,
            listing,
            instance_input(instance),
            &self.cancel,
        ))?;

        let mut report = RenameReport::default();
        let mut failures = Vec::new();

        for summary in &summaries {
            self.cancel.check()?;

            let (Some(id), Some(name)) = (
                summary.get("Id").and_then(Value::as_str),
                summary.get("Name").and_then(Value::as_str),
            ) else {
                warn!(summary = %summary, "flow summary without id or name, skipped");
                continue;
            };
            if !self.is_selected(name, all_flows) {
                continue;
            }
            if name.starts_with(prefix) {
                debug!(flow = name, "already prefixed");
                report.already_prefixed.push(name.to_string());
                continue;
            }

            let new_name = format!("{}{}", prefix, name);
            match self.rename_one(instance, id, &new_name) {
                Ok(()) => {
                    info!(from = name, to = %new_name, "renamed flow");
                    report.renamed.push((name.to_string(), new_name));
                }
                Err(e) => {
                    warn!(flow = name, error = %e, "rename failed");
                    failures.push(AspectFailure {
                        aspect: name.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if failures.is_empty() {
            info!("{}", report.summary());
            Ok(report)
        } else {
            Err(ConnectBackupError::AspectsFailed {
                resource: format!("flows of instance {}", instance),
                failures,
            })
        }
    }

    /// The listing carries no description, so fetch it to send it back unchanged
    fn rename_one(&self, instance: &InstanceHandle, id: &str, new_name: &str) -> BackupResult<()> {
        let response = self.provider.call(
            Operation::DescribeContactFlow,
            &json!({"InstanceId": instance.id(), "ContactFlowId": id}),
        )?;
        let flow: ContactFlow = serde_json::from_value(
            response.get("ContactFlow").cloned().unwrap_or(Value::Null),
        )
        .map_err(|e| ConnectBackupError::Describe {
            kind: ResourceKind::Flow,
            identifier: id.to_string(),
            message: e.to_string(),
        })?;

        let request = UpdateContactFlowName {
            instance_id: instance.id(),
            contact_flow_id: id,
            name: new_name,
            description: flow.description.as_deref(),
        };
        self.provider
            .call(Operation::UpdateContactFlowName, &serde_json::to_value(&request)?)?;
        Ok(())
    }
}
