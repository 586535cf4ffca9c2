//! Remote operations
//!
//! The closed set of provider calls the tool issues. Request and response
//! bodies are the provider's native JSON documents.

use std::fmt;

/// A provider API operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Listing
    ListInstances,
    ListLambdaFunctions,
    ListLexBots,
    ListPrompts,
    ListHoursOfOperations,
    ListQuickConnects,
    ListContactFlows,
    ListUsers,
    ListRoutingProfiles,
    ListRoutingProfileQueues,
    ListUserHierarchyGroups,
    ListQueues,

    // Detail fetch
    DescribeInstance,
    DescribeHoursOfOperation,
    DescribeQuickConnect,
    DescribeContactFlow,
    DescribeUser,
    DescribeRoutingProfile,
    DescribeUserHierarchyGroup,
    DescribeUserHierarchyStructure,
    DescribeQueue,

    // Creation
    CreateContactFlow,
    CreateRoutingProfile,
    CreateUser,
    CreateUserHierarchyGroup,

    // Aspect updates
    UpdateContactFlowName,
    UpdateContactFlowContent,
    UpdateRoutingProfileName,
    UpdateRoutingProfileConcurrency,
    UpdateRoutingProfileDefaultOutboundQueue,
    AssociateRoutingProfileQueues,
    UpdateRoutingProfileQueues,
    UpdateUserIdentityInfo,
    UpdateUserSecurityProfiles,
    UpdateUserPhoneConfig,
    UpdateUserRoutingProfile,
    UpdateUserHierarchy,
    UpdateUserHierarchyGroupName,
    UpdateUserHierarchyStructure,
}

impl Operation {
    /// Kebab-case operation name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListInstances => "list-instances",
            Self::ListLambdaFunctions => "list-lambda-functions",
            Self::ListLexBots => "list-lex-bots",
            Self::ListPrompts => "list-prompts",
            Self::ListHoursOfOperations => "list-hours-of-operations",
            Self::ListQuickConnects => "list-quick-connects",
            Self::ListContactFlows => "list-contact-flows",
            Self::ListUsers => "list-users",
            Self::ListRoutingProfiles => "list-routing-profiles",
            Self::ListRoutingProfileQueues => "list-routing-profile-queues",
            Self::ListUserHierarchyGroups => "list-user-hierarchy-groups",
            Self::ListQueues => "list-queues",
            Self::DescribeInstance => "describe-instance",
            Self::DescribeHoursOfOperation => "describe-hours-of-operation",
            Self::DescribeQuickConnect => "describe-quick-connect",
            Self::DescribeContactFlow => "describe-contact-flow",
            Self::DescribeUser => "describe-user",
            Self::DescribeRoutingProfile => "describe-routing-profile",
            Self::DescribeUserHierarchyGroup => "describe-user-hierarchy-group",
            Self::DescribeUserHierarchyStructure => "describe-user-hierarchy-structure",
            Self::DescribeQueue => "describe-queue",
            Self::CreateContactFlow => "create-contact-flow",
            Self::CreateRoutingProfile => "create-routing-profile",
            Self::CreateUser => "create-user",
            Self::CreateUserHierarchyGroup => "create-user-hierarchy-group",
            Self::UpdateContactFlowName => "update-contact-flow-name",
            Self::UpdateContactFlowContent => "update-contact-flow-content",
            Self::UpdateRoutingProfileName => "update-routing-profile-name",
            Self::UpdateRoutingProfileConcurrency => "update-routing-profile-concurrency",
            Self::UpdateRoutingProfileDefaultOutboundQueue => {
                "update-routing-profile-default-outbound-queue"
            }
            Self::AssociateRoutingProfileQueues => "associate-routing-profile-queues",
            Self::UpdateRoutingProfileQueues => "update-routing-profile-queues",
            Self::UpdateUserIdentityInfo => "update-user-identity-info",
            Self::UpdateUserSecurityProfiles => "update-user-security-profiles",
            Self::UpdateUserPhoneConfig => "update-user-phone-config",
            Self::UpdateUserRoutingProfile => "update-user-routing-profile",
            Self::UpdateUserHierarchy => "update-user-hierarchy",
            Self::UpdateUserHierarchyGroupName => "update-user-hierarchy-group-name",
            Self::UpdateUserHierarchyStructure => "update-user-hierarchy-structure",
        }
    }

    /// Whether the operation only reads state
    pub fn is_read_only(&self) -> bool {
        let name = self.name();
        name.starts_with("list-") || name.starts_with("describe-")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_classification() {
        assert!(Operation::ListContactFlows.is_read_only());
        assert!(Operation::DescribeUserHierarchyStructure.is_read_only());
        assert!(!Operation::CreateUser.is_read_only());
        assert!(!Operation::AssociateRoutingProfileQueues.is_read_only());
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(
            Operation::UpdateRoutingProfileDefaultOutboundQueue.to_string(),
            "update-routing-profile-default-outbound-queue"
        );
    }
}
