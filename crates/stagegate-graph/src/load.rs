//! Lenient workflow loading
//!
//! Workflow documents are produced by a visual builder and stored as loosely
//! shaped JSON. Loading accepts that shape, converts it into the typed
//! [`WorkflowGraph`], and reports every node-level problem as a
//! [`ValidationIssue`] instead of failing. Only a document that is not JSON at
//! all, or not a workflow, is an error.
//!
//! Accepted document shapes:
//!
//! ```text
//! { "id": "...", "name": "...", "version": 3, "updatedAt": "...", "nodes": [ ... ] }
//! [ ...nodes ]
//! ```

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use stagegate_rbac::StagePermissions;
use std::collections::BTreeSet;
use tracing::warn;
use uuid::Uuid;

use crate::error::{GraphError, GraphResult};
use crate::graph::{StageNode, WorkflowGraph, DEFAULT_WORKFLOW_NAME};
use crate::validate::{validate, ValidationIssue};

/// Untyped workflow document as stored by the builder.
///
/// Fields are read one at a time by name, trying each accepted spelling in
/// order, so a bad value or a key present under two spellings never rejects
/// the whole document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawWorkflow {
    fields: Map<String, Value>,
}

impl RawWorkflow {
    /// Wrap a document object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a bare node list.
    pub fn from_nodes(nodes: Vec<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert("nodes".to_string(), Value::Array(nodes));
        Self { fields }
    }

    /// Document identifier.
    pub fn id(&self) -> Option<&Value> {
        field(&self.fields, &["id"])
    }

    /// Workflow name.
    pub fn name(&self) -> Option<&Value> {
        field(&self.fields, &["name"])
    }

    /// Version number (number or numeric string).
    pub fn version(&self) -> Option<&Value> {
        field(&self.fields, &["version"])
    }

    /// RFC 3339 timestamp of the last change.
    pub fn updated_at(&self) -> Option<&Value> {
        field(&self.fields, &["updatedAt", "updated_at"])
    }

    /// Node list.
    pub fn nodes(&self) -> Option<&Value> {
        field(&self.fields, &["nodes"])
    }
}

/// Untyped node as stored by the builder.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawNode {
    fields: Map<String, Value>,
}

impl RawNode {
    /// Wrap a node object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Node identifier.
    pub fn id(&self) -> Option<&Value> {
        field(&self.fields, &["id"])
    }

    /// Builder label.
    pub fn label(&self) -> Option<&Value> {
        field(&self.fields, &["label"])
    }

    /// Module tag.
    pub fn module_type(&self) -> Option<&Value> {
        field(&self.fields, &["moduleType", "module_type", "module"])
    }

    /// Stage tag.
    pub fn stage(&self) -> Option<&Value> {
        field(&self.fields, &["stage", "status"])
    }

    /// Allowed role identifiers.
    pub fn allowed_roles(&self) -> Option<&Value> {
        field(&self.fields, &["allowedRoles", "allowed_roles", "roles"])
    }

    /// Permission record.
    pub fn permissions(&self) -> Option<&Value> {
        field(&self.fields, &["permissions"])
    }

    /// Successor node ids.
    pub fn next(&self) -> Option<&Value> {
        field(&self.fields, &["next", "nextNodes", "next_nodes"])
    }
}

/// First non-null value among the accepted spellings of a key.
fn field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

/// A loaded graph together with everything worth telling an administrator.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// The typed graph. Always usable, even when issues were found.
    pub graph: WorkflowGraph,

    /// Load-time and validation issues, in discovery order.
    pub issues: Vec<ValidationIssue>,
}

impl LoadReport {
    /// Check whether any issue has error severity.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    /// Check whether the document loaded without any issue.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl WorkflowGraph {
    /// Parse a workflow document, absorbing node-level problems.
    ///
    /// Issues are logged at warn level; use [`WorkflowGraph::load_json`] to
    /// inspect them.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if the text is not JSON or not a workflow document.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagegate_graph::WorkflowGraph;
    ///
    /// let graph = WorkflowGraph::from_json(r#"{
    ///     "name": "projects",
    ///     "nodes": [
    ///         { "moduleType": "talent", "allowedRoles": ["Recruiter"] },
    ///         { "moduleType": "billing", "stage": "Draft" }
    ///     ]
    /// }"#).unwrap();
    ///
    /// assert_eq!(graph.len(), 2);
    /// assert!(graph.nodes()[1].allowed_roles.is_empty());
    /// ```
    pub fn from_json(text: &str) -> GraphResult<Self> {
        Ok(Self::load_json(text)?.graph)
    }

    /// Parse a workflow document and return the graph with its issues.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if the text is not JSON or not a workflow document.
    pub fn load_json(text: &str) -> GraphResult<LoadReport> {
        let value: Value = serde_json::from_str(text)?;
        load_value(value)
    }
}

/// Load a workflow from an already parsed JSON value.
///
/// # Errors
///
/// Returns [`GraphError::InvalidDocument`] unless the value is an object or an array.
pub fn load_value(value: Value) -> GraphResult<LoadReport> {
    let raw = match value {
        Value::Array(nodes) => RawWorkflow::from_nodes(nodes),
        Value::Object(fields) => RawWorkflow::new(fields),
        other => {
            return Err(GraphError::InvalidDocument(format!(
                "expected an object or a node list, found {}",
                json_kind(&other)
            )))
        }
    };
    Ok(load_raw(raw))
}

/// Convert a raw document into a typed graph.
///
/// Never fails: every problem becomes an issue in the report.
pub fn load_raw(raw: RawWorkflow) -> LoadReport {
    let mut issues = Vec::new();

    let mut graph = WorkflowGraph::new(
        string_field(raw.name()).unwrap_or_else(|| DEFAULT_WORKFLOW_NAME.to_string()),
    );
    if let Some(id) = string_field(raw.id()) {
        graph.id = id;
    }
    if let Some(version) = raw.version().and_then(version_field) {
        graph.version = version;
    }
    if let Some(updated_at) = string_field(raw.updated_at())
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
    {
        graph.updated_at = updated_at.with_timezone(&Utc);
    }

    let raw_nodes = match raw.nodes() {
        Some(Value::Array(nodes)) => nodes.clone(),
        None => Vec::new(),
        Some(other) => {
            issues.push(ValidationIssue::MalformedNode {
                index: 0,
                reason: format!("node list is {}, not an array", json_kind(other)),
            });
            Vec::new()
        }
    };

    for (index, value) in raw_nodes.into_iter().enumerate() {
        if let Some(node) = load_node(index, value, &mut issues) {
            graph.nodes.push(node);
        }
    }

    issues.extend(validate(&graph));

    for issue in &issues {
        warn!(
            workflow = %graph.name,
            version = graph.version,
            severity = issue.severity().as_str(),
            "Workflow issue: {}",
            issue
        );
    }

    LoadReport { graph, issues }
}

fn load_node(index: usize, value: Value, issues: &mut Vec<ValidationIssue>) -> Option<StageNode> {
    let raw = match value {
        Value::Object(fields) => RawNode::new(fields),
        other => {
            issues.push(ValidationIssue::MalformedNode {
                index,
                reason: format!("node is {}, not an object", json_kind(&other)),
            });
            return None;
        }
    };

    let id = string_field(raw.id());

    let module_type = match string_field(raw.module_type()) {
        Some(module_type) => module_type,
        None => {
            issues.push(ValidationIssue::MissingModuleType { index, node_id: id });
            return None;
        }
    };

    let id = id.unwrap_or_else(|| Uuid::now_v7().to_string());

    let permissions = match raw.permissions() {
        None => None,
        Some(value) => match StagePermissions::deserialize(value) {
            Ok(permissions) => Some(permissions),
            Err(e) => {
                issues.push(ValidationIssue::MalformedPermissions {
                    node_id: id.clone(),
                    reason: e.to_string(),
                });
                None
            }
        },
    };

    Some(StageNode {
        id,
        label: string_field(raw.label()),
        module_type,
        stage: string_field(raw.stage()),
        allowed_roles: string_list(raw.allowed_roles()).into_iter().collect::<BTreeSet<_>>(),
        permissions,
        next: string_list(raw.next()),
    })
}

/// Non-blank trimmed string, or `None` for anything else.
fn string_field(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Strings of an array, trimmed, blanks and non-strings dropped.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| string_field(Some(item)))
            .collect(),
        Some(single @ Value::String(_)) => string_field(Some(single)).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn version_field(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<RawWorkflow> for WorkflowGraph {
    fn from(raw: RawWorkflow) -> Self {
        load_raw(raw).graph
    }
}
