//! Resource catalog
//!
//! Registry binding each resource kind to the provider operations that list
//! and describe it, and to the fields those operations use. Adding a kind is
//! a new registry entry here plus a record type in `models`.

pub mod fetch;

pub use fetch::{describe_singleton, list_all, FetchIter, Pages};

use crate::models::ResourceKind;
use crate::provider::Operation;

/// How a kind is enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub op: Operation,
    /// Response field holding the page of items
    pub items_key: &'static str,
}

/// How a single item of a kind is fetched in full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Describe {
    pub op: Operation,
    /// Request field carrying the item's id; `None` for singletons
    pub id_field: Option<&'static str>,
    /// Response field wrapping the record
    pub response_key: &'static str,
}

/// Catalog entry for one resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub kind: ResourceKind,
    pub list: Option<Listing>,
    pub describe: Option<Describe>,
}

/// Listing of instances visible to the caller
pub const INSTANCES: Listing = Listing {
    op: Operation::ListInstances,
    items_key: "InstanceSummaryList",
};

const fn listing(op: Operation, items_key: &'static str) -> Option<Listing> {
    Some(Listing { op, items_key })
}

const fn describe(
    op: Operation,
    id_field: Option<&'static str>,
    response_key: &'static str,
) -> Option<Describe> {
    Some(Describe {
        op,
        id_field,
        response_key,
    })
}

/// Look up the catalog entry of a kind
pub fn entry(kind: ResourceKind) -> CatalogEntry {
    let (list, describe) = match kind {
        ResourceKind::Instance => (
            None,
            describe(Operation::DescribeInstance, None, "Instance"),
        ),
        ResourceKind::Lambda => (
            listing(Operation::ListLambdaFunctions, "LambdaFunctions"),
            None,
        ),
        ResourceKind::LexBot => (listing(Operation::ListLexBots, "LexBots"), None),
        ResourceKind::Prompt => (listing(Operation::ListPrompts, "PromptSummaryList"), None),
        ResourceKind::HoursOfOperation => (
            listing(
                Operation::ListHoursOfOperations,
                "HoursOfOperationSummaryList",
            ),
            describe(
                Operation::DescribeHoursOfOperation,
                Some("HoursOfOperationId"),
                "HoursOfOperation",
            ),
        ),
        ResourceKind::QuickConnect => (
            listing(Operation::ListQuickConnects, "QuickConnectSummaryList"),
            describe(
                Operation::DescribeQuickConnect,
                Some("QuickConnectId"),
                "QuickConnect",
            ),
        ),
        ResourceKind::Flow => (
            listing(Operation::ListContactFlows, "ContactFlowSummaryList"),
            describe(
                Operation::DescribeContactFlow,
                Some("ContactFlowId"),
                "ContactFlow",
            ),
        ),
        ResourceKind::User => (
            listing(Operation::ListUsers, "UserSummaryList"),
            describe(Operation::DescribeUser, Some("UserId"), "User"),
        ),
        ResourceKind::RoutingProfile => (
            listing(Operation::ListRoutingProfiles, "RoutingProfileSummaryList"),
            describe(
                Operation::DescribeRoutingProfile,
                Some("RoutingProfileId"),
                "RoutingProfile",
            ),
        ),
        ResourceKind::RoutingProfileQueueSet => (
            listing(
                Operation::ListRoutingProfileQueues,
                "RoutingProfileQueueConfigSummaryList",
            ),
            None,
        ),
        ResourceKind::HierarchyGroup => (
            listing(
                Operation::ListUserHierarchyGroups,
                "UserHierarchyGroupSummaryList",
            ),
            describe(
                Operation::DescribeUserHierarchyGroup,
                Some("HierarchyGroupId"),
                "HierarchyGroup",
            ),
        ),
        ResourceKind::HierarchyStructure => (
            None,
            describe(
                Operation::DescribeUserHierarchyStructure,
                None,
                "HierarchyStructure",
            ),
        ),
        ResourceKind::Queue => (
            listing(Operation::ListQueues, "QueueSummaryList"),
            describe(Operation::DescribeQueue, Some("QueueId"), "Queue"),
        ),
    };
    CatalogEntry {
        kind,
        list,
        describe,
    }
}
