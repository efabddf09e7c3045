//! Workflow validation
//!
//! Validation never rejects a graph. It reports configuration smells so an
//! administrator can fix coverage; the resolver tolerates all of them.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::graph::WorkflowGraph;

/// How much an issue matters to an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueSeverity {
    /// The graph works but probably not as intended.
    Warning,
    /// Part of the definition was dropped or is ambiguous.
    Error,
}

impl IssueSeverity {
    /// Get the string representation of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
        }
    }
}

/// A problem found while loading or validating a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A node entry was not an object and was dropped.
    MalformedNode {
        /// Position in the raw node list
        index: usize,
        /// What was wrong
        reason: String,
    },

    /// A node had no module type and was dropped.
    MissingModuleType {
        /// Position in the raw node list
        index: usize,
        /// The node's id, if it had one
        node_id: Option<String>,
    },

    /// A permission record could not be read and was ignored.
    MalformedPermissions {
        /// Node id
        node_id: String,
        /// What was wrong
        reason: String,
    },

    /// Two or more nodes share an id.
    DuplicateNodeId {
        /// The shared id
        node_id: String,
    },

    /// Two or more nodes govern the same `(module, stage)` pair; the first wins.
    DuplicateStage {
        /// Module tag
        module_type: String,
        /// Stage tag
        stage: String,
        /// Id of the node lookups will use
        first: String,
        /// Id of the shadowed node
        shadowed: String,
    },

    /// An edge points at a node id that does not exist.
    DanglingEdge {
        /// Source node id
        node_id: String,
        /// Unknown target id
        target: String,
    },

    /// A node lists no roles, so only master roles can pass it.
    NoAllowedRoles {
        /// Node id
        node_id: String,
    },

    /// A permission record grants actions but not `view`.
    PermissionsWithoutView {
        /// Node id
        node_id: String,
    },
}

impl ValidationIssue {
    /// Severity of this issue.
    pub fn severity(&self) -> IssueSeverity {
        match self {
            ValidationIssue::MalformedNode { .. }
            | ValidationIssue::MissingModuleType { .. }
            | ValidationIssue::DuplicateNodeId { .. } => IssueSeverity::Error,

            ValidationIssue::MalformedPermissions { .. }
            | ValidationIssue::DuplicateStage { .. }
            | ValidationIssue::DanglingEdge { .. }
            | ValidationIssue::NoAllowedRoles { .. }
            | ValidationIssue::PermissionsWithoutView { .. } => IssueSeverity::Warning,
        }
    }

    /// Check if this issue has error severity.
    pub fn is_error(&self) -> bool {
        self.severity() == IssueSeverity::Error
    }

    /// Get issue code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationIssue::MalformedNode { .. } => "MALFORMED_NODE",
            ValidationIssue::MissingModuleType { .. } => "MISSING_MODULE_TYPE",
            ValidationIssue::MalformedPermissions { .. } => "MALFORMED_PERMISSIONS",
            ValidationIssue::DuplicateNodeId { .. } => "DUPLICATE_NODE_ID",
            ValidationIssue::DuplicateStage { .. } => "DUPLICATE_STAGE",
            ValidationIssue::DanglingEdge { .. } => "DANGLING_EDGE",
            ValidationIssue::NoAllowedRoles { .. } => "NO_ALLOWED_ROLES",
            ValidationIssue::PermissionsWithoutView { .. } => "PERMISSIONS_WITHOUT_VIEW",
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MalformedNode { index, reason } => {
                write!(f, "node #{} dropped: {}", index, reason)
            }
            ValidationIssue::MissingModuleType { index, node_id } => match node_id {
                Some(id) => write!(f, "node #{} ({}) dropped: missing module type", index, id),
                None => write!(f, "node #{} dropped: missing module type", index),
            },
            ValidationIssue::MalformedPermissions { node_id, reason } => {
                write!(f, "node {} permissions ignored: {}", node_id, reason)
            }
            ValidationIssue::DuplicateNodeId { node_id } => {
                write!(f, "node id {} is used more than once", node_id)
            }
            ValidationIssue::DuplicateStage {
                module_type,
                stage,
                first,
                shadowed,
            } => write!(
                f,
                "{}/{} is governed by {} and shadowed node {}",
                module_type, stage, first, shadowed
            ),
            ValidationIssue::DanglingEdge { node_id, target } => {
                write!(f, "node {} points at unknown node {}", node_id, target)
            }
            ValidationIssue::NoAllowedRoles { node_id } => {
                write!(f, "node {} allows no roles", node_id)
            }
            ValidationIssue::PermissionsWithoutView { node_id } => {
                write!(f, "node {} grants actions without view", node_id)
            }
        }
    }
}

/// Check a typed graph for configuration smells.
///
/// # Examples
///
/// ```
/// use stagegate_graph::{validate, StageNode, ValidationIssue, WorkflowGraph};
///
/// let graph = WorkflowGraph::new("projects")
///     .with_node(StageNode::new("billing").with_id("a").with_stage("Draft").with_roles(["Finance"]))
///     .with_node(StageNode::new("billing").with_id("b").with_stage("Draft").with_roles(["Intern"]));
///
/// let issues = validate(&graph);
/// assert!(matches!(&issues[0], ValidationIssue::DuplicateStage { first, .. } if first == "a"));
/// ```
pub fn validate(graph: &WorkflowGraph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut reported_ids: HashSet<&str> = HashSet::new();
    let mut stage_owners: HashMap<(&str, &str), &str> = HashMap::new();

    for node in graph.nodes() {
        if !seen_ids.insert(node.id.as_str()) && reported_ids.insert(node.id.as_str()) {
            issues.push(ValidationIssue::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }

        if let Some(stage) = node.stage.as_deref() {
            let key = (node.module_type.as_str(), stage);
            match stage_owners.get(&key) {
                Some(first) => issues.push(ValidationIssue::DuplicateStage {
                    module_type: node.module_type.clone(),
                    stage: stage.to_string(),
                    first: (*first).to_string(),
                    shadowed: node.id.clone(),
                }),
                None => {
                    stage_owners.insert(key, node.id.as_str());
                }
            }
        }

        if node.allowed_roles.is_empty() {
            issues.push(ValidationIssue::NoAllowedRoles {
                node_id: node.id.clone(),
            });
        }

        if let Some(permissions) = node.permissions {
            if !permissions.view && !permissions.is_empty() {
                issues.push(ValidationIssue::PermissionsWithoutView {
                    node_id: node.id.clone(),
                });
            }
        }
    }

    for node in graph.nodes() {
        for target in &node.next {
            if !seen_ids.contains(target.as_str()) {
                issues.push(ValidationIssue::DanglingEdge {
                    node_id: node.id.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StageNode;
    use stagegate_rbac::{StageAction, StagePermissions};

    #[test]
    fn test_clean_graph() {
        let graph = WorkflowGraph::new("projects")
            .with_node(
                StageNode::new("billing")
                    .with_id("draft")
                    .with_stage("Draft")
                    .with_roles(["Finance"])
                    .with_permissions(StagePermissions::view_only())
                    .with_next("review"),
            )
            .with_node(
                StageNode::new("billing")
                    .with_id("review")
                    .with_stage("InReview")
                    .with_roles(["Manager"]),
            );
        assert!(validate(&graph).is_empty());
    }

    #[test]
    fn test_empty_graph_is_valid() {
        assert!(validate(&WorkflowGraph::new("empty")).is_empty());
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let graph = WorkflowGraph::new("projects")
            .with_node(StageNode::new("talent").with_id("x").with_roles(["Recruiter"]))
            .with_node(StageNode::new("talent").with_id("x").with_roles(["Recruiter"]))
            .with_node(StageNode::new("talent").with_id("x").with_roles(["Recruiter"]));

        let issues = validate(&graph);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code(), "DUPLICATE_NODE_ID");
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_module_global_duplicates_are_fine() {
        let graph = WorkflowGraph::new("projects")
            .with_node(StageNode::new("talent").with_roles(["Recruiter"]))
            .with_node(StageNode::new("talent").with_roles(["Manager"]));
        assert!(validate(&graph).is_empty());
    }

    #[test]
    fn test_dangling_edge() {
        let graph = WorkflowGraph::new("projects").with_node(
            StageNode::new("billing")
                .with_id("draft")
                .with_stage("Draft")
                .with_roles(["Finance"])
                .with_next("nowhere"),
        );

        let issues = validate(&graph);
        assert_eq!(
            issues,
            vec![ValidationIssue::DanglingEdge {
                node_id: "draft".to_string(),
                target: "nowhere".to_string(),
            }]
        );
        assert_eq!(issues[0].severity(), IssueSeverity::Warning);
    }

    #[test]
    fn test_no_roles_and_permissions_without_view() {
        let graph = WorkflowGraph::new("projects").with_node(
            StageNode::new("billing")
                .with_id("locked")
                .with_stage("Archived")
                .with_permissions(StagePermissions::none().with(StageAction::Delete)),
        );

        let codes: Vec<&str> = validate(&graph).iter().map(ValidationIssue::code).collect();
        assert_eq!(codes, vec!["NO_ALLOWED_ROLES", "PERMISSIONS_WITHOUT_VIEW"]);
    }

    #[test]
    fn test_display() {
        let issue = ValidationIssue::MissingModuleType {
            index: 3,
            node_id: Some("n3".to_string()),
        };
        assert_eq!(issue.to_string(), "node #3 (n3) dropped: missing module type");
    }
}
