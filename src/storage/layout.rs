//! Canonical path mapping
//!
//! Pure functions from (resource kind, name) to the relative location of a
//! record inside an instance's namespace. Filesystem and object-store
//! destinations join the same relative path onto their own roots, so both
//! share one layout:
//!
//! ```text
//! <root>/<instance>/<kind-namespace>/<name>.json
//! <root>/<instance>/common/<struct-name>.json
//! <root>/<instance>/flows-raw/<name>.json
//! ```
//!
//! Names are used verbatim. Two items of one kind sharing a name map to the
//! same path and the later write replaces the earlier one.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::{ResourceKind, FLOWS_RAW_NAMESPACE};

/// Extension of every persisted record
pub const JSON_EXTENSION: &str = ".json";

/// Location of a record relative to an instance root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath {
    namespace: &'static str,
    file_name: String,
}

impl RelativePath {
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Join onto `<root>/<instance>` as a filesystem path
    pub fn to_path(&self, root: &Path, instance: &str) -> PathBuf {
        root.join(instance).join(self.namespace).join(&self.file_name)
    }

    /// Join onto `<prefix>/<instance>` as an object key
    pub fn to_key(&self, prefix: &str, instance: &str) -> String {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", instance, self)
        } else {
            format!("{}/{}/{}", prefix, instance, self)
        }
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.file_name)
    }
}

/// Path of a named record, or of a singleton under `common/`.
/// For singleton kinds `name` is ignored.
pub fn canonical_path(kind: ResourceKind, name: &str) -> RelativePath {
    let stem = kind.singleton_name().unwrap_or(name);
    RelativePath {
        namespace: kind.namespace(),
        file_name: format!("{}{}", stem, JSON_EXTENSION),
    }
}

/// Path of a grouped collection, keyed by its parent's name
pub fn grouped_path(kind: ResourceKind, group: &str) -> RelativePath {
    RelativePath {
        namespace: kind.namespace(),
        file_name: format!("{}{}", group, JSON_EXTENSION),
    }
}

/// Path of a flow's unescaped content
pub fn raw_flow_path(name: &str) -> RelativePath {
    RelativePath {
        namespace: FLOWS_RAW_NAMESPACE,
        file_name: format!("{}{}", name, JSON_EXTENSION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_kinds() {
        for kind in ResourceKind::ALL.into_iter().filter(|k| !k.is_singleton()) {
            let path = canonical_path(kind, "Welcome");
            assert_eq!(path.to_string(), format!("{}/Welcome.json", kind.namespace()));
            assert_eq!(
                path.to_path(Path::new("/backups"), "abc123"),
                PathBuf::from(format!("/backups/abc123/{}/Welcome.json", kind.namespace()))
            );
            // deterministic
            assert_eq!(path, canonical_path(kind, "Welcome"));
        }
    }

    #[test]
    fn test_flow_layout() {
        let path = canonical_path(ResourceKind::Flow, "Hold");
        assert_eq!(
            path.to_path(Path::new("/backups"), "abc123"),
            PathBuf::from("/backups/abc123/flows/Hold.json")
        );
        assert_eq!(raw_flow_path("Hold").to_string(), "flows-raw/Hold.json");
    }

    #[test]
    fn test_singletons_use_common() {
        assert_eq!(
            canonical_path(ResourceKind::HierarchyStructure, "ignored").to_string(),
            "common/user-hierarchy-structure.json"
        );
        assert_eq!(
            canonical_path(ResourceKind::Instance, "").to_string(),
            "common/instance.json"
        );
        assert_eq!(
            canonical_path(ResourceKind::Lambda, "").to_string(),
            "common/lambdas.json"
        );
    }

    #[test]
    fn test_grouped_paths() {
        assert_eq!(
            grouped_path(ResourceKind::RoutingProfileQueueSet, "Sales").to_string(),
            "routing-profile-queues/Sales.json"
        );
        assert_eq!(
            grouped_path(ResourceKind::Prompt, "prompts").to_string(),
            "prompts/prompts.json"
        );
    }

    #[test]
    fn test_object_keys() {
        let path = canonical_path(ResourceKind::Flow, "Welcome");
        assert_eq!(path.to_key("backups/connect/", "abc123"), "backups/connect/abc123/flows/Welcome.json");
        assert_eq!(path.to_key("/", "abc123"), "abc123/flows/Welcome.json");
        assert_eq!(path.to_key("", "abc123"), "abc123/flows/Welcome.json");
    }
}
