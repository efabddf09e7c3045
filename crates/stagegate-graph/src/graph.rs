//! Workflow graph domain models
//!
//! A workflow graph is a named, versioned, ordered list of stage nodes that an
//! administrator edits at runtime. Each node binds a `(module, stage)` pair to a
//! set of allowed roles and an optional permission record. Nodes point at their
//! successors, which makes the whole collection a directed graph of lifecycle
//! stages per module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagegate_rbac::StagePermissions;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::load::RawWorkflow;

/// Name given to graphs loaded without one.
pub const DEFAULT_WORKFLOW_NAME: &str = "default";

/// A single policy rule in a workflow graph.
///
/// A node with no stage is a module-global node: it only takes part in
/// "can this role see the module at all" checks.
///
/// # Examples
///
/// ```
/// use stagegate_graph::StageNode;
/// use stagegate_rbac::{StageAction, StagePermissions};
///
/// let node = StageNode::new("billing")
///     .with_stage("Draft")
///     .with_roles(["Finance"])
///     .with_permissions(StagePermissions::view_only().with(StageAction::Edit));
///
/// assert!(node.matches("billing", Some("Draft")));
/// assert!(node.allows_role("Finance"));
/// assert!(!node.allows_role("Intern"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageNode {
    /// Node identifier, unique within a well-formed graph
    pub id: String,

    /// Label shown in the workflow builder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Functional area this node governs (e.g. "billing", "talent")
    pub module_type: String,

    /// Lifecycle stage this node governs; `None` for module-global nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// Role identifiers permitted when this node is the match
    pub allowed_roles: BTreeSet<String>,

    /// Fine-grained grants; `None` means presence in `allowed_roles` only implies viewing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<StagePermissions>,

    /// Identifiers of the nodes this stage can move to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<String>,
}

impl StageNode {
    /// Creates a module-global node with a generated id and no allowed roles.
    ///
    /// # Arguments
    ///
    /// * `module_type` - The functional area this node governs
    pub fn new(module_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            label: None,
            module_type: module_type.into(),
            stage: None,
            allowed_roles: BTreeSet::new(),
            permissions: None,
            next: Vec::new(),
        }
    }

    /// Set the node id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the builder label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Scope the node to a lifecycle stage.
    ///
    /// An empty stage keeps the node module-global.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        let stage = stage.into();
        self.stage = if stage.is_empty() { None } else { Some(stage) };
        self
    }

    /// Add allowed roles.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Attach a permission record.
    pub fn with_permissions(mut self, permissions: StagePermissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Add an outgoing edge to another node.
    pub fn with_next(mut self, node_id: impl Into<String>) -> Self {
        self.next.push(node_id.into());
        self
    }

    /// Check whether a role identifier is listed in `allowed_roles`.
    pub fn allows_role(&self, role_id: &str) -> bool {
        self.allowed_roles.contains(role_id)
    }

    /// Check if this node has no stage.
    pub fn is_module_global(&self) -> bool {
        self.stage.is_none()
    }

    /// Check whether this node governs a `(module, stage)` pair.
    ///
    /// Comparison is exact. `None` matches module-global nodes only.
    pub fn matches(&self, module_type: &str, stage: Option<&str>) -> bool {
        self.module_type == module_type && self.stage.as_deref() == stage
    }
}

/// A named, versioned workflow definition.
///
/// Node order is significant: when several nodes share a `(module, stage)`
/// pair, lookups return the first one. Empty and partially specified graphs
/// are valid.
///
/// # Examples
///
/// ```
/// use stagegate_graph::{StageNode, WorkflowGraph};
///
/// let graph = WorkflowGraph::new("projects")
///     .with_node(StageNode::new("talent").with_roles(["Recruiter"]))
///     .with_node(StageNode::new("billing").with_stage("Draft").with_roles(["Finance"]));
///
/// assert_eq!(graph.len(), 2);
/// assert_eq!(graph.nodes_for_module("talent").count(), 1);
/// assert!(graph.find_stage_node("billing", "Draft").is_some());
/// assert!(graph.find_stage_node("billing", "Approved").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawWorkflow")]
pub struct WorkflowGraph {
    /// Workflow document identifier
    pub id: String,

    /// Workflow name used to fetch it from the store
    pub name: String,

    /// Monotonic version, bumped whenever the topology is replaced
    pub version: u32,

    /// When the topology was last changed
    pub updated_at: DateTime<Utc>,

    /// Stage nodes in definition order
    pub(crate) nodes: Vec<StageNode>,
}

impl WorkflowGraph {
    /// Creates an empty graph at version 1.
    ///
    /// # Arguments
    ///
    /// * `name` - Workflow name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            version: 1,
            updated_at: Utc::now(),
            nodes: Vec::new(),
        }
    }

    /// Set the workflow document id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Append a node, consuming the graph.
    pub fn with_node(mut self, node: StageNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Append a node.
    pub fn push_node(&mut self, node: StageNode) {
        self.nodes.push(node);
    }

    /// Replace the whole topology.
    ///
    /// This is how an administrator redefines the workflow at runtime.
    /// The version is bumped and the timestamp refreshed.
    pub fn replace_nodes<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = StageNode>,
    {
        self.nodes = nodes.into_iter().collect();
        self.version = self.version.saturating_add(1);
        self.updated_at = Utc::now();
    }

    /// All nodes in definition order.
    pub fn nodes(&self) -> &[StageNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node, stage-scoped or not, governing a module.
    pub fn nodes_for_module<'a>(
        &'a self,
        module_type: &'a str,
    ) -> impl Iterator<Item = &'a StageNode> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.module_type == module_type)
    }

    /// Module-global nodes for a module.
    pub fn module_global_nodes<'a>(
        &'a self,
        module_type: &'a str,
    ) -> impl Iterator<Item = &'a StageNode> + 'a {
        self.nodes_for_module(module_type)
            .filter(|node| node.is_module_global())
    }

    /// First node governing `(module_type, stage)`.
    pub fn find_stage_node(&self, module_type: &str, stage: &str) -> Option<&StageNode> {
        self.nodes
            .iter()
            .find(|node| node.matches(module_type, Some(stage)))
    }

    /// First node with the given id.
    pub fn node(&self, id: &str) -> Option<&StageNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Nodes reachable in one step from a node.
    ///
    /// Edges pointing at unknown ids are skipped.
    pub fn successors(&self, node_id: &str) -> Vec<&StageNode> {
        self.node(node_id)
            .map(|node| node.next.iter().filter_map(|id| self.node(id)).collect())
            .unwrap_or_default()
    }

    /// Stages declared for a module, in definition order, without repeats.
    pub fn stages_for_module(&self, module_type: &str) -> Vec<&str> {
        let mut stages: Vec<&str> = Vec::new();
        for stage in self
            .nodes
            .iter()
            .filter(|node| node.module_type == module_type)
            .filter_map(|node| node.stage.as_deref())
        {
            if !stages.contains(&stage) {
                stages.push(stage);
            }
        }
        stages
    }

    /// Distinct module tags, in order of first appearance.
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = Vec::new();
        for node in &self.nodes {
            if !modules.contains(&node.module_type.as_str()) {
                modules.push(&node.module_type);
            }
        }
        modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billing_graph() -> WorkflowGraph {
        WorkflowGraph::new("projects")
            .with_node(
                StageNode::new("billing")
                    .with_id("draft")
                    .with_stage("Draft")
                    .with_roles(["Finance"])
                    .with_next("review"),
            )
            .with_node(
                StageNode::new("billing")
                    .with_id("review")
                    .with_stage("InReview")
                    .with_roles(["Finance", "Manager"])
                    .with_next("approved")
                    .with_next("missing"),
            )
            .with_node(
                StageNode::new("billing")
                    .with_id("approved")
                    .with_stage("Approved")
                    .with_roles(["Manager"]),
            )
            .with_node(StageNode::new("talent").with_id("talent").with_roles(["Recruiter"]))
    }

    #[test]
    fn test_new_graph_is_empty() {
        let graph = WorkflowGraph::new("projects");
        assert!(graph.is_empty());
        assert_eq!(graph.version, 1);
        assert_eq!(graph.name, "projects");
    }

    #[test]
    fn test_empty_stage_is_module_global() {
        let node = StageNode::new("talent").with_stage("");
        assert!(node.is_module_global());
        assert!(node.matches("talent", None));
    }

    #[test]
    fn test_find_stage_node_first_match_wins() {
        let graph = WorkflowGraph::new("projects")
            .with_node(StageNode::new("billing").with_id("first").with_stage("Draft"))
            .with_node(StageNode::new("billing").with_id("second").with_stage("Draft"));

        assert_eq!(graph.find_stage_node("billing", "Draft").unwrap().id, "first");
    }

    #[test]
    fn test_find_stage_node_is_exact() {
        let graph = billing_graph();
        assert!(graph.find_stage_node("billing", "draft").is_none());
        assert!(graph.find_stage_node("Billing", "Draft").is_none());
        assert!(graph.find_stage_node("talent", "Draft").is_none());
    }

    #[test]
    fn test_module_global_nodes() {
        let graph = billing_graph();
        assert_eq!(graph.module_global_nodes("talent").count(), 1);
        assert_eq!(graph.module_global_nodes("billing").count(), 0);
        assert_eq!(graph.nodes_for_module("billing").count(), 3);
    }

    #[test]
    fn test_successors_skip_dangling_edges() {
        let graph = billing_graph();
        let next: Vec<&str> = graph
            .successors("review")
            .iter()
            .map(|node| node.id.as_str())
            .collect();
        assert_eq!(next, vec!["approved"]);
        assert!(graph.successors("approved").is_empty());
        assert!(graph.successors("unknown").is_empty());
    }

    #[test]
    fn test_stages_and_modules() {
        let graph = billing_graph();
        assert_eq!(graph.stages_for_module("billing"), vec!["Draft", "InReview", "Approved"]);
        assert!(graph.stages_for_module("talent").is_empty());
        assert_eq!(graph.modules(), vec!["billing", "talent"]);
    }

    #[test]
    fn test_stages_outlive_module_argument() {
        let graph = billing_graph();
        let stages = {
            let module = String::from("billing");
            graph.stages_for_module(&module)
        };
        assert_eq!(stages.first(), Some(&"Draft"));
    }

    #[test]
    fn test_replace_nodes_bumps_version() {
        let mut graph = billing_graph();
        let before = graph.updated_at;

        graph.replace_nodes(vec![StageNode::new("talent").with_roles(["Recruiter"])]);

        assert_eq!(graph.version, 2);
        assert_eq!(graph.len(), 1);
        assert!(graph.updated_at >= before);
    }

    #[test]
    fn test_roles_are_a_set() {
        let node = StageNode::new("billing").with_roles(["Finance", "Finance", "Manager"]);
        assert_eq!(node.allowed_roles.len(), 2);
    }
}
