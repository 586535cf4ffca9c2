//! Resource kinds
//!
//! The closed set of configuration object categories the tool knows how to
//! back up. Each kind owns its namespace in the persisted layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shared namespace for singleton structures
pub const COMMON_NAMESPACE: &str = "common";

/// Namespace for unescaped flow content written next to the structured records
pub const FLOWS_RAW_NAMESPACE: &str = "flows-raw";

/// Category of configuration object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Instance,
    Lambda,
    LexBot,
    Prompt,
    HoursOfOperation,
    QuickConnect,
    Flow,
    User,
    RoutingProfile,
    RoutingProfileQueueSet,
    HierarchyGroup,
    HierarchyStructure,
    Queue,
}

impl ResourceKind {
    /// All kinds, in backup order
    pub const ALL: [ResourceKind; 13] = [
        ResourceKind::Instance,
        ResourceKind::Lambda,
        ResourceKind::LexBot,
        ResourceKind::Prompt,
        ResourceKind::HoursOfOperation,
        ResourceKind::QuickConnect,
        ResourceKind::Flow,
        ResourceKind::User,
        ResourceKind::RoutingProfile,
        ResourceKind::RoutingProfileQueueSet,
        ResourceKind::HierarchyGroup,
        ResourceKind::HierarchyStructure,
        ResourceKind::Queue,
    ];

    /// Stable tag used in logs and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::Lambda => "lambda",
            Self::LexBot => "lex-bot",
            Self::Prompt => "prompt",
            Self::HoursOfOperation => "hours-of-operation",
            Self::QuickConnect => "quick-connect",
            Self::Flow => "flow",
            Self::User => "user",
            Self::RoutingProfile => "routing-profile",
            Self::RoutingProfileQueueSet => "routing-profile-queue-set",
            Self::HierarchyGroup => "user-hierarchy-group",
            Self::HierarchyStructure => "user-hierarchy-structure",
            Self::Queue => "queue",
        }
    }

    /// Directory (or key segment) holding records of this kind
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Instance | Self::Lambda | Self::LexBot | Self::HierarchyStructure => {
                COMMON_NAMESPACE
            }
            Self::Prompt => "prompts",
            Self::HoursOfOperation => "hours-of-operation",
            Self::QuickConnect => "quick-connects",
            Self::Flow => "flows",
            Self::User => "users",
            Self::RoutingProfile => "routing-profiles",
            Self::RoutingProfileQueueSet => "routing-profile-queues",
            Self::HierarchyGroup => "user-hierarchy-groups",
            Self::Queue => "queues",
        }
    }

    /// Singleton kinds are stored once per instance under `common/`,
    /// keyed by their file stem rather than an item name
    pub fn singleton_name(&self) -> Option<&'static str> {
        match self {
            Self::Instance => Some("instance"),
            Self::Lambda => Some("lambdas"),
            Self::LexBot => Some("lex-bots"),
            Self::HierarchyStructure => Some("user-hierarchy-structure"),
            _ => None,
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton_name().is_some()
    }

    /// Namespaces pre-created when a destination is initialized
    pub fn namespaces() -> Vec<&'static str> {
        let mut namespaces: Vec<&'static str> = Vec::new();
        for kind in Self::ALL {
            if !namespaces.contains(&kind.namespace()) {
                namespaces.push(kind.namespace());
            }
        }
        namespaces.push(FLOWS_RAW_NAMESPACE);
        namespaces
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown resource kind: {}", s))
    }
}

/// Kinds accepted by the restore command
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RestoreKind {
    #[value(name = "flow")]
    Flow,
    #[value(name = "routing-profile")]
    RoutingProfile,
    #[value(name = "user")]
    User,
    #[value(name = "user-hierarchy-group")]
    UserHierarchyGroup,
    #[value(name = "user-hierarchy-structure")]
    UserHierarchyStructure,
}

impl From<RestoreKind> for ResourceKind {
    fn from(kind: RestoreKind) -> Self {
        match kind {
            RestoreKind::Flow => ResourceKind::Flow,
            RestoreKind::RoutingProfile => ResourceKind::RoutingProfile,
            RestoreKind::User => ResourceKind::User,
            RestoreKind::UserHierarchyGroup => ResourceKind::HierarchyGroup,
            RestoreKind::UserHierarchyStructure => ResourceKind::HierarchyStructure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_tags() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!("widget".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_singletons_live_in_common() {
        for kind in ResourceKind::ALL {
            if kind.is_singleton() {
                assert_eq!(kind.namespace(), COMMON_NAMESPACE);
            } else {
                assert_ne!(kind.namespace(), COMMON_NAMESPACE);
            }
        }
    }

    #[test]
    fn test_namespaces_are_unique() {
        let namespaces = ResourceKind::namespaces();
        let mut deduped = namespaces.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(namespaces.len(), deduped.len());
        assert!(namespaces.contains(&"flows"));
        assert!(namespaces.contains(&"flows-raw"));
        assert!(namespaces.contains(&"common"));
    }

    #[test]
    fn test_restore_kind_mapping() {
        assert_eq!(ResourceKind::from(RestoreKind::Flow), ResourceKind::Flow);
        assert_eq!(
            ResourceKind::from(RestoreKind::UserHierarchyStructure),
            ResourceKind::HierarchyStructure
        );
    }
}
