//! Backup orchestrator for connect-backup
//!
//! Walks the resource catalog for one or every visible instance and writes
//! each record through a destination. Stages are independent: a failing
//! stage is recorded in the report and the run moves on to the next one.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::cancel::CancelFlag;
use crate::catalog::{self, describe_singleton, fetch::instance_input, list_all, FetchIter, Listing, Pages};
use crate::error::{BackupResult, ConnectBackupError};
use crate::models::{
    InstanceHandle, InstanceSelector, PromptSummary, RecordGroup, ResourceKind, ResourceRecord,
    RoutingProfile, RoutingProfileQueueConfigSummary,
};
use crate::provider::RemoteProvider;
use crate::storage::Destination;

/// Group name of the flat prompt list
pub const PROMPTS_GROUP: &str = "prompts";

/// Queue types included when no other types are configured
pub const DEFAULT_QUEUE_TYPES: [&str; 1] = ["STANDARD"];

/// Knobs of a backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOptions {
    /// Also write each flow's unescaped content under `flows-raw/`
    pub flows_raw: bool,
    /// Restrict the flow stage to the flow with this name
    pub flow_name: Option<String>,
    /// Queue types passed to the queue listing
    pub queue_types: Vec<String>,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            flows_raw: false,
            flow_name: None,
            queue_types: DEFAULT_QUEUE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Outcome of one stage for one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub instance: String,
    pub kind: ResourceKind,
    /// Files or objects written
    pub written: usize,
    /// Items skipped after a failed describe call
    pub skipped: usize,
    pub failures: Vec<String>,
    /// Informational outcome, e.g. a filtered flow that does not exist
    pub note: Option<String>,
}

impl StageReport {
    fn new(instance: &InstanceHandle, kind: ResourceKind) -> Self {
        Self {
            instance: instance.id().to_string(),
            kind,
            written: 0,
            skipped: 0,
            failures: Vec::new(),
            note: None,
        }
    }

    fn fail(&mut self, err: &ConnectBackupError) {
        error!(instance = %self.instance, stage = %self.kind, error = %err, "stage failure");
        self.failures.push(err.to_string());
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of a whole backup run
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub stages: Vec<StageReport>,
    /// The run stopped early because cancellation was requested
    pub cancelled: bool,
}

impl BackupReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            stages: Vec::new(),
            cancelled: false,
        }
    }

    /// Instances visited, in order
    pub fn instances(&self) -> Vec<&str> {
        let mut instances: Vec<&str> = Vec::new();
        for stage in &self.stages {
            if !instances.contains(&stage.instance.as_str()) {
                instances.push(&stage.instance);
            }
        }
        instances
    }

    pub fn total_written(&self) -> usize {
        self.stages.iter().map(|s| s.written).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.stages.iter().map(|s| s.skipped).sum()
    }

    /// One line per failure, prefixed with instance and stage
    pub fn failures(&self) -> Vec<String> {
        self.stages
            .iter()
            .flat_map(|stage| {
                stage
                    .failures
                    .iter()
                    .map(move |f| format!("{}/{}: {}", stage.instance, stage.kind, f))
            })
            .collect()
    }

    pub fn stage(&self, instance: &str, kind: ResourceKind) -> Option<&StageReport> {
        self.stages
            .iter()
            .find(|s| s.instance == instance && s.kind == kind)
    }

    /// Get a summary of the run
    pub fn summary(&self) -> String {
        let failed = self.stages.iter().filter(|s| !s.is_success()).count();
        let elapsed = self
            .finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
            .unwrap_or_default();
        let mut summary = format!(
            "Backed up {} record(s) from {} instance(s) in {:.1}s",
            self.total_written(),
            self.instances().len(),
            elapsed
        );
        if self.total_skipped() > 0 {
            summary.push_str(&format!(", {} skipped", self.total_skipped()));
        }
        if failed > 0 {
            summary.push_str(&format!(", {} failed stage(s)", failed));
        }
        if self.cancelled {
            summary.push_str(" (cancelled)");
        }
        summary
    }

    /// Turn a report with failed stages into the aggregate error
    pub fn into_result(self) -> BackupResult<Self> {
        if self.cancelled {
            return Err(ConnectBackupError::Cancelled);
        }
        let failures = self.failures();
        if failures.is_empty() {
            Ok(self)
        } else {
            Err(ConnectBackupError::StagesFailed { failures })
        }
    }
}

/// Runs the backup catalog against a provider
pub struct BackupManager<'a, P: RemoteProvider> {
    provider: &'a P,
    options: BackupOptions,
    cancel: CancelFlag,
}

impl<'a, P: RemoteProvider> BackupManager<'a, P> {
    /// Create a new BackupManager
    pub fn new(provider: &'a P, options: BackupOptions, cancel: CancelFlag) -> Self {
        Self {
            provider,
            options,
            cancel,
        }
    }

    /// Back up the selected instances and fail if any stage failed
    pub fn backup(
        &self,
        selector: &InstanceSelector,
        destination: &mut dyn Destination,
    ) -> BackupResult<BackupReport> {
        self.run(selector, destination)?.into_result()
    }

    /// Back up the selected instances and report every stage.
    ///
    /// Only a failure to enumerate the instances themselves is returned as
    /// an error; stage failures and cancellation are recorded in the report.
    pub fn run(
        &self,
        selector: &InstanceSelector,
        destination: &mut dyn Destination,
    ) -> BackupResult<BackupReport> {
        let mut report = BackupReport::new();
        let span = info_span!("backup", run_id = %report.run_id);
        let _enter = span.enter();

        info!(destination = %destination.describe(), "starting backup");

        let instances = match selector {
            InstanceSelector::Single(instance) => vec![instance.clone()],
            InstanceSelector::All => self.visible_instances()?,
        };

        for instance in &instances {
            if let Err(e) = self.backup_instance(instance, destination, &mut report.stages) {
                if e.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                return Err(e);
            }
        }

        report.finished_at = Some(Utc::now());
        info!("{}", report.summary());
        Ok(report)
    }

    fn visible_instances(&self) -> BackupResult<Vec<InstanceHandle>> {
        let pages = Pages::new(
            self.provider,
            ResourceKind::Instance,
            catalog::INSTANCES,
            serde_json::Map::new(),
            &self.cancel,
        );
        let instances: Vec<InstanceHandle> = list_all(pages)?
            .iter()
            .filter_map(|summary| summary.get("Id").and_then(Value::as_str))
            .map(InstanceHandle::new)
            .collect();
        info!(count = instances.len(), "found instances");
        Ok(instances)
    }

    /// Run every stage for one instance. Returns an error only when the run
    /// has to stop (cancellation or an unusable catalog entry).
    fn backup_instance(
        &self,
        instance: &InstanceHandle,
        destination: &mut dyn Destination,
        reports: &mut Vec<StageReport>,
    ) -> BackupResult<()> {
        let span = info_span!("instance", id = %instance);
        let _enter = span.enter();

        if let Err(e) = destination.init(instance.id()) {
            let mut stage = StageReport::new(instance, ResourceKind::Instance);
            stage.fail(&e);
            reports.push(stage);
            return Ok(());
        }

        for kind in ResourceKind::ALL {
            self.cancel.check()?;
            let span = info_span!("stage", kind = %kind);
            let _enter = span.enter();

            match kind {
                ResourceKind::Instance | ResourceKind::HierarchyStructure => {
                    reports.push(self.singleton_stage(instance, kind, destination));
                }
                ResourceKind::Lambda | ResourceKind::LexBot => {
                    reports.push(self.collection_stage(instance, kind, destination)?);
                }
                ResourceKind::Prompt => {
                    reports.push(self.prompt_stage(instance, destination)?);
                }
                // written together with each routing profile
                ResourceKind::RoutingProfileQueueSet => {}
                _ => self.named_stage(instance, kind, destination, reports)?,
            }
        }
        Ok(())
    }

    fn singleton_stage(
        &self,
        instance: &InstanceHandle,
        kind: ResourceKind,
        destination: &mut dyn Destination,
    ) -> StageReport {
        let mut stage = StageReport::new(instance, kind);
        match describe_singleton(self.provider, instance, catalog::entry(kind)) {
            Ok(record) => self.persist(&record, destination, &mut stage),
            Err(e) => stage.fail(&e),
        }
        stage
    }

    fn collection_stage(
        &self,
        instance: &InstanceHandle,
        kind: ResourceKind,
        destination: &mut dyn Destination,
    ) -> BackupResult<StageReport> {
        let mut stage = StageReport::new(instance, kind);
        let items = match self.list(instance, kind, None) {
            Ok(items) => items,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                stage.fail(&e);
                return Ok(stage);
            }
        };

        match ResourceRecord::from_value(kind, Value::Array(items)) {
            Ok(record) => self.persist(&record, destination, &mut stage),
            Err(e) => stage.fail(&ConnectBackupError::Deserialize {
                kind,
                message: e.to_string(),
            }),
        }
        Ok(stage)
    }

    fn prompt_stage(
        &self,
        instance: &InstanceHandle,
        destination: &mut dyn Destination,
    ) -> BackupResult<StageReport> {
        let kind = ResourceKind::Prompt;
        let mut stage = StageReport::new(instance, kind);
        let items = match self.list(instance, kind, None) {
            Ok(items) => items,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                stage.fail(&e);
                return Ok(stage);
            }
        };

        match serde_json::from_value::<Vec<PromptSummary>>(Value::Array(items)) {
            Ok(prompts) => {
                self.persist_group(PROMPTS_GROUP, &RecordGroup::Prompts(prompts), destination, &mut stage)
            }
            Err(e) => stage.fail(&ConnectBackupError::Deserialize {
                kind,
                message: e.to_string(),
            }),
        }
        Ok(stage)
    }

    fn named_stage(
        &self,
        instance: &InstanceHandle,
        kind: ResourceKind,
        destination: &mut dyn Destination,
        reports: &mut Vec<StageReport>,
    ) -> BackupResult<()> {
        let mut stage = StageReport::new(instance, kind);
        let mut queue_sets = (kind == ResourceKind::RoutingProfile)
            .then(|| StageReport::new(instance, ResourceKind::RoutingProfileQueueSet));

        let mut fetch = FetchIter::new(self.provider, instance, catalog::entry(kind), &self.cancel)?;
        if kind == ResourceKind::Queue {
            fetch = fetch.with_input("QueueTypes", json!(self.options.queue_types));
        }
        let flow_filter = match kind {
            ResourceKind::Flow => self.options.flow_name.clone(),
            _ => None,
        };
        if let Some(name) = &flow_filter {
            fetch = fetch.with_name_filter(name.clone());
        }

        let mut outcome = Ok(());
        for item in fetch.by_ref() {
            match item {
                Ok(record) => {
                    self.persist(&record, destination, &mut stage);
                    if let (ResourceRecord::RoutingProfile(profile), Some(queue_stage)) =
                        (&record, queue_sets.as_mut())
                    {
                        if let Err(e) = self.queue_set(instance, profile, destination, queue_stage) {
                            outcome = Err(e);
                            break;
                        }
                    }
                }
                Err(e) if e.is_cancelled() => {
                    outcome = Err(e);
                    break;
                }
                Err(e) => stage.fail(&e),
            }
        }
        stage.skipped = fetch.skipped();

        if let Some(name) = flow_filter {
            if fetch.matched() == 0 {
                info!(flow = %name, "flow not found");
                stage.note = Some(ConnectBackupError::flow_not_found(name).to_string());
            }
        }

        info!(written = stage.written, skipped = stage.skipped, failed = stage.failures.len(), "stage finished");
        reports.push(stage);
        reports.extend(queue_sets);
        outcome
    }

    /// Back up the queue associations of one routing profile, keyed by the
    /// profile's name
    fn queue_set(
        &self,
        instance: &InstanceHandle,
        profile: &RoutingProfile,
        destination: &mut dyn Destination,
        stage: &mut StageReport,
    ) -> BackupResult<()> {
        let Some(profile_id) = profile.routing_profile_id.as_deref() else {
            warn!(profile = %profile.name, "routing profile has no id, skipping its queues");
            stage.skipped += 1;
            return Ok(());
        };

        let items = match self.list(
            instance,
            ResourceKind::RoutingProfileQueueSet,
            Some(("RoutingProfileId", json!(profile_id))),
        ) {
            Ok(items) => items,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                stage.fail(&e);
                return Ok(());
            }
        };

        match serde_json::from_value::<Vec<RoutingProfileQueueConfigSummary>>(Value::Array(items)) {
            Ok(configs) => self.persist_group(
                &profile.name,
                &RecordGroup::RoutingProfileQueues(configs),
                destination,
                stage,
            ),
            Err(e) => stage.fail(&ConnectBackupError::Deserialize {
                kind: ResourceKind::RoutingProfileQueueSet,
                message: e.to_string(),
            }),
        }
        Ok(())
    }

    fn list(
        &self,
        instance: &InstanceHandle,
        kind: ResourceKind,
        extra: Option<(&str, Value)>,
    ) -> BackupResult<Vec<Value>> {
        let listing = listing_of(kind)?;
        let mut pages = Pages::new(self.provider, kind, listing, instance_input(instance), &self.cancel);
        if let Some((key, value)) = extra {
            pages = pages.with_input(key, value);
        }
        list_all(pages)
    }

    fn persist(&self, record: &ResourceRecord, destination: &mut dyn Destination, stage: &mut StageReport) {
        match destination.write(record) {
            Ok(path) => {
                debug!(%path, "wrote record");
                stage.written += 1;
            }
            Err(e) => stage.fail(&e),
        }

        if !self.options.flows_raw {
            return;
        }
        if let ResourceRecord::Flow(flow) = record {
            if let Some(content) = &flow.content {
                match destination.write_raw(&flow.name, content) {
                    Ok(path) => debug!(%path, "wrote raw flow"),
                    Err(e) => stage.fail(&e),
                }
            }
        }
    }

    fn persist_group(
        &self,
        group: &str,
        records: &RecordGroup,
        destination: &mut dyn Destination,
        stage: &mut StageReport,
    ) {
        match destination.write_grouped(group, records) {
            Ok(path) => {
                debug!(%path, items = records.item_count(), "wrote group");
                stage.written += 1;
            }
            Err(e) => stage.fail(&e),
        }
    }
}

fn listing_of(kind: ResourceKind) -> BackupResult<Listing> {
    catalog::entry(kind)
        .list
        .ok_or_else(|| ConnectBackupError::UnsupportedType(format!("{} has no listing", kind)))
}
