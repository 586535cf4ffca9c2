//! Fetch engine
//!
//! Drives paginated listing and per-item describe calls for one resource
//! kind. Both iterators are lazy and single pass: iterating again means
//! calling the provider again.
//!
//! Failure policy:
//! - a failed listing call yields one `List` error and ends the sequence
//! - a failed describe call is logged and the item skipped
//! - cancellation is honoured before each page, never mid-item

use std::collections::VecDeque;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{CatalogEntry, Describe, Listing};
use crate::cancel::CancelFlag;
use crate::error::{BackupResult, ConnectBackupError};
use crate::models::{InstanceHandle, ResourceKind, ResourceRecord};
use crate::provider::{next_token, RemoteProvider, NEXT_TOKEN};

/// Request field scoping calls to an instance
pub const INSTANCE_ID: &str = "InstanceId";

/// Base request document for an instance-scoped call
pub fn instance_input(instance: &InstanceHandle) -> Map<String, Value> {
    let mut input = Map::new();
    input.insert(INSTANCE_ID.to_string(), Value::String(instance.id().to_string()));
    input
}

/// Iterator over the pages of a listing operation
pub struct Pages<'a, P: RemoteProvider> {
    provider: &'a P,
    kind: ResourceKind,
    listing: Listing,
    input: Map<String, Value>,
    cancel: &'a CancelFlag,
    next_token: Option<String>,
    started: bool,
    done: bool,
}

impl<'a, P: RemoteProvider> Pages<'a, P> {
    pub fn new(
        provider: &'a P,
        kind: ResourceKind,
        listing: Listing,
        input: Map<String, Value>,
        cancel: &'a CancelFlag,
    ) -> Self {
        Self {
            provider,
            kind,
            listing,
            input,
            cancel,
            next_token: None,
            started: false,
            done: false,
        }
    }

    /// Add a field to every page request
    pub fn with_input(mut self, key: &str, value: Value) -> Self {
        self.input.insert(key.to_string(), value);
        self
    }
}

impl<'a, P: RemoteProvider> Iterator for Pages<'a, P> {
    type Item = BackupResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || (self.started && self.next_token.is_none()) {
            self.done = true;
            return None;
        }

        if let Err(e) = self.cancel.check() {
            self.done = true;
            return Some(Err(e));
        }

        let mut request = self.input.clone();
        if let Some(token) = self.next_token.take() {
            request.insert(NEXT_TOKEN.to_string(), Value::String(token));
        }
        self.started = true;

        match self.provider.call(self.listing.op, &Value::Object(request)) {
            Ok(response) => {
                self.next_token = next_token(&response);
                let items = match response.get(self.listing.items_key) {
                    Some(Value::Array(items)) => items.clone(),
                    _ => Vec::new(),
                };
                debug!(kind = %self.kind, items = items.len(), more = self.next_token.is_some(), "listed page");
                Some(Ok(items))
            }
            Err(e) => {
                self.done = true;
                Some(Err(ConnectBackupError::List {
                    kind: self.kind,
                    message: e.to_string(),
                }))
            }
        }
    }
}

/// Drain every page of a listing into one collection
pub fn list_all<P: RemoteProvider>(pages: Pages<'_, P>) -> BackupResult<Vec<Value>> {
    let mut items = Vec::new();
    for page in pages {
        items.extend(page?);
    }
    Ok(items)
}

/// Lazy sequence of fully described records of one kind
pub struct FetchIter<'a, P: RemoteProvider> {
    provider: &'a P,
    pages: Pages<'a, P>,
    describe: Describe,
    id_field: &'static str,
    instance: InstanceHandle,
    pending: VecDeque<Value>,
    name_filter: Option<String>,
    matched: usize,
    skipped: usize,
}

impl<'a, P: RemoteProvider> FetchIter<'a, P> {
    /// Start enumerating `entry` for one instance. Kinds without both a
    /// listing and a per-item describe operation are rejected.
    pub fn new(
        provider: &'a P,
        instance: &InstanceHandle,
        entry: CatalogEntry,
        cancel: &'a CancelFlag,
    ) -> BackupResult<Self> {
        let (listing, describe, id_field) = match (entry.list, entry.describe) {
            (Some(listing), Some(describe)) => match describe.id_field {
                Some(id_field) => (listing, describe, id_field),
                None => return Err(not_enumerable(entry.kind)),
            },
            _ => return Err(not_enumerable(entry.kind)),
        };

        Ok(Self {
            provider,
            pages: Pages::new(provider, entry.kind, listing, instance_input(instance), cancel),
            describe,
            id_field,
            instance: instance.clone(),
            pending: VecDeque::new(),
            name_filter: None,
            matched: 0,
            skipped: 0,
        })
    }

    /// Add a field to every listing request
    pub fn with_input(mut self, key: &str, value: Value) -> Self {
        self.pages = self.pages.with_input(key, value);
        self
    }

    /// Only describe items whose summary name equals `name`
    pub fn with_name_filter(mut self, name: impl Into<String>) -> Self {
        self.name_filter = Some(name.into());
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.pages.kind
    }

    /// Items that passed the name filter so far
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// Items whose describe call failed so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn accepts(&self, summary: &Value) -> bool {
        match &self.name_filter {
            Some(name) => summary.get("Name").and_then(Value::as_str) == Some(name.as_str()),
            None => true,
        }
    }

    fn fetch(&self, summary: &Value) -> BackupResult<ResourceRecord> {
        let kind = self.kind();
        let id = summary
            .get("Id")
            .and_then(Value::as_str)
            .ok_or_else(|| ConnectBackupError::Describe {
                kind,
                identifier: summary_label(summary),
                message: "summary has no Id".into(),
            })?;

        let mut request = instance_input(&self.instance);
        request.insert(self.id_field.to_string(), Value::String(id.to_string()));

        let response = self
            .provider
            .call(self.describe.op, &Value::Object(request))
            .map_err(|e| ConnectBackupError::Describe {
                kind,
                identifier: id.to_string(),
                message: e.to_string(),
            })?;

        decode(kind, &self.describe, response, id)
    }
}

impl<'a, P: RemoteProvider> Iterator for FetchIter<'a, P> {
    type Item = BackupResult<ResourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(summary) = self.pending.pop_front() {
                if !self.accepts(&summary) {
                    continue;
                }
                self.matched += 1;
                match self.fetch(&summary) {
                    Ok(record) => return Some(Ok(record)),
                    Err(e) => {
                        warn!(kind = %self.kind(), error = %e, "skipping item");
                        self.skipped += 1;
                    }
                }
            }

            match self.pages.next()? {
                Ok(items) => self.pending.extend(items),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Describe a singleton kind of one instance
pub fn describe_singleton<P: RemoteProvider>(
    provider: &P,
    instance: &InstanceHandle,
    entry: CatalogEntry,
) -> BackupResult<ResourceRecord> {
    let describe = entry.describe.ok_or_else(|| not_enumerable(entry.kind))?;
    let request = Value::Object(instance_input(instance));
    let response = provider
        .call(describe.op, &request)
        .map_err(|e| ConnectBackupError::Describe {
            kind: entry.kind,
            identifier: instance.id().to_string(),
            message: e.to_string(),
        })?;
    decode(entry.kind, &describe, response, instance.id())
}

fn decode(
    kind: ResourceKind,
    describe: &Describe,
    mut response: Value,
    identifier: &str,
) -> BackupResult<ResourceRecord> {
    let body = response
        .get_mut(describe.response_key)
        .map(Value::take)
        .ok_or_else(|| ConnectBackupError::Describe {
            kind,
            identifier: identifier.to_string(),
            message: format!("response has no {}", describe.response_key),
        })?;

    ResourceRecord::from_value(kind, body).map_err(|e| ConnectBackupError::Describe {
        kind,
        identifier: identifier.to_string(),
        message: e.to_string(),
    })
}

fn summary_label(summary: &Value) -> String {
    summary
        .get("Name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string()
}

fn not_enumerable(kind: ResourceKind) -> ConnectBackupError {
    ConnectBackupError::UnsupportedType(format!("{} cannot be enumerated item by item", kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry;
    use crate::error::ProviderError;
    use crate::provider::mock::{page, summaries, MockProvider};
    use crate::provider::Operation;
    use serde_json::json;

    fn describe_flow(input: &Value) -> Result<Value, ProviderError> {
        let id = input["ContactFlowId"].as_str().unwrap_or_default().to_string();
        Ok(json!({"ContactFlow": {"Id": id, "Name": format!("name-{}", id)}}))
    }

    /// Three pages of ten flows, `flow-1` to `flow-30`
    fn paged_flows(input: &Value) -> Result<Value, ProviderError> {
        let page_index = match input.get("NextToken").and_then(Value::as_str) {
            None => 0,
            Some("p2") => 1,
            Some(_) => 2,
        };
        let items: Vec<Value> = (1..=10)
            .map(|i| {
                let n = page_index * 10 + i;
                json!({"Id": format!("flow-{}", n), "Name": format!("Flow {}", n)})
            })
            .collect();
        let mut response = page("ContactFlowSummaryList", items);
        let token = match page_index {
            0 => Some("p2"),
            1 => Some("p3"),
            _ => None,
        };
        if let Some(token) = token {
            response["NextToken"] = json!(token);
        }
        Ok(response)
    }

    #[test]
    fn test_describe_failure_skips_one_item() {
        let provider = MockProvider::new("111122223333")
            .on(Operation::ListContactFlows, paged_flows)
            .on(Operation::DescribeContactFlow, |input| {
                if input["ContactFlowId"] == "flow-17" {
                    Err(ProviderError::new("describe-contact-flow", "access denied"))
                } else {
                    describe_flow(input)
                }
            });
        let cancel = CancelFlag::new();
        let instance = InstanceHandle::new("abc123");

        let mut fetch = FetchIter::new(&provider, &instance, entry(ResourceKind::Flow), &cancel).unwrap();
        let records: Vec<_> = fetch.by_ref().collect::<Result<_, _>>().unwrap();

        assert_eq!(records.len(), 29);
        assert_eq!(fetch.skipped(), 1);
        assert_eq!(fetch.matched(), 30);
        assert_eq!(provider.calls_to(Operation::ListContactFlows).len(), 3);
        assert!(records.iter().all(|r| r.remote_id() != Some("flow-17")));
    }

    #[test]
    fn test_requests_are_instance_scoped() {
        let provider = MockProvider::new("111122223333")
            .respond(
                Operation::ListContactFlows,
                page("ContactFlowSummaryList", summaries("flow", &["Welcome"])),
            )
            .on(Operation::DescribeContactFlow, describe_flow);
        let cancel = CancelFlag::new();
        let instance = InstanceHandle::new("abc123");

        let fetch = FetchIter::new(&provider, &instance, entry(ResourceKind::Flow), &cancel).unwrap();
        assert_eq!(fetch.count(), 1);

        let describe = provider.calls_to(Operation::DescribeContactFlow);
        assert_eq!(describe, vec![json!({"InstanceId": "abc123", "ContactFlowId": "flow-1"})]);
        let list = provider.calls_to(Operation::ListContactFlows);
        assert_eq!(list, vec![json!({"InstanceId": "abc123"})]);
    }

    #[test]
    fn test_list_failure_ends_sequence() {
        let provider = MockProvider::new("111122223333").enqueue(
            Operation::ListUsers,
            Err(ProviderError::new("list-users", "denied").with_code("AccessDeniedException")),
        );
        let cancel = CancelFlag::new();
        let instance = InstanceHandle::new("abc123");

        let mut fetch = FetchIter::new(&provider, &instance, entry(ResourceKind::User), &cancel).unwrap();
        let first = fetch.next().unwrap().unwrap_err();
        assert!(matches!(first, ConnectBackupError::List { kind: ResourceKind::User, .. }));
        assert!(fetch.next().is_none());
    }

    #[test]
    fn test_name_filter() {
        let provider = MockProvider::new("111122223333")
            .respond(
                Operation::ListContactFlows,
                page("ContactFlowSummaryList", summaries("flow", &["Welcome", "Hold"])),
            )
            .on(Operation::DescribeContactFlow, describe_flow);
        let cancel = CancelFlag::new();
        let instance = InstanceHandle::new("abc123");

        let mut fetch = FetchIter::new(&provider, &instance, entry(ResourceKind::Flow), &cancel)
            .unwrap()
            .with_name_filter("Hold");
        let records: Vec<_> = fetch.by_ref().collect::<Result<_, _>>().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].remote_id(), Some("flow-2"));
        assert_eq!(fetch.matched(), 1);

        let mut missing = FetchIter::new(&provider, &instance, entry(ResourceKind::Flow), &cancel)
            .unwrap()
            .with_name_filter("Nope");
        assert!(missing.next().is_none());
        assert_eq!(missing.matched(), 0);
    }

    #[test]
    fn test_cancel_between_pages() {
        let cancel = CancelFlag::new();
        let trigger = cancel.clone();
        let provider = MockProvider::new("111122223333")
            .on(Operation::ListContactFlows, move |input| {
                // cancel while the first page is being served
                trigger.cancel();
                paged_flows(input)
            })
            .on(Operation::DescribeContactFlow, describe_flow);
        let instance = InstanceHandle::new("abc123");

        let results: Vec<_> =
            FetchIter::new(&provider, &instance, entry(ResourceKind::Flow), &cancel)
                .unwrap()
                .collect();

        // the first page finishes, the second is never requested
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 10);
        assert!(results.last().unwrap().as_ref().unwrap_err().is_cancelled());
        assert_eq!(provider.calls_to(Operation::ListContactFlows).len(), 1);
    }

    #[test]
    fn test_list_all_drains_pages() {
        let provider = MockProvider::new("111122223333")
            .enqueue(
                Operation::ListLambdaFunctions,
                Ok(json!({"LambdaFunctions": ["arn:one"], "NextToken": "t"})),
            )
            .enqueue(
                Operation::ListLambdaFunctions,
                Ok(json!({"LambdaFunctions": ["arn:two"]})),
            );
        let cancel = CancelFlag::new();
        let instance = InstanceHandle::new("abc123");
        let listing = entry(ResourceKind::Lambda).list.unwrap();

        let items = list_all(Pages::new(
            &provider,
            ResourceKind::Lambda,
            listing,
            instance_input(&instance),
            &cancel,
        ))
        .unwrap();
        assert_eq!(items, vec![json!("arn:one"), json!("arn:two")]);

        let second = &provider.calls_to(Operation::ListLambdaFunctions)[1];
        assert_eq!(second["NextToken"], "t");
    }

    #[test]
    fn test_singleton_describe() {
        let provider = MockProvider::new("111122223333").respond(
            Operation::DescribeUserHierarchyStructure,
            json!({"HierarchyStructure": {"LevelOne": {"Id": "l-1", "Name": "Org"}}}),
        );
        let instance = InstanceHandle::new("abc123");

        let record =
            describe_singleton(&provider, &instance, entry(ResourceKind::HierarchyStructure))
                .unwrap();
        assert_eq!(record.kind(), ResourceKind::HierarchyStructure);

        let err = describe_singleton(&provider, &instance, entry(ResourceKind::Instance)).unwrap_err();
        assert!(matches!(err, ConnectBackupError::Describe { .. }));
    }

    #[test]
    fn test_grouped_kinds_are_not_enumerable() {
        let provider = MockProvider::new("111122223333");
        let cancel = CancelFlag::new();
        let instance = InstanceHandle::new("abc123");
        let result = FetchIter::new(&provider, &instance, entry(ResourceKind::Prompt), &cancel);
        assert!(matches!(result, Err(ConnectBackupError::UnsupportedType(_))));
    }
}
