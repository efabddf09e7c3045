//! # Stagegate Workflow Graphs
//!
//! This crate models the editable workflow definition that drives stage-gated
//! access control.
//!
//! ## Overview
//!
//! The stagegate-graph crate handles:
//! - **Workflow Graphs**: Named, versioned, ordered collections of stage nodes
//! - **Stage Nodes**: `(module, stage)` rules with allowed roles and permissions
//! - **Loading**: Lenient parsing of builder documents into typed records
//! - **Validation**: Configuration smells reported for administrators
//!
//! ## Architecture
//!
//! ```text
//! WorkflowGraph { name, version, updated_at }
//!   └─ StageNode { module_type, stage?, allowed_roles, permissions?, next }
//!          │                                                        │
//!          └──────────────── directed edges (next) ─────────────────┘
//! ```
//!
//! A node without a stage is module-global. Several nodes may share a
//! `(module, stage)` pair; the first one in definition order is the one that
//! lookups return.
//!
//! ## Usage
//!
//! ```rust
//! use stagegate_graph::WorkflowGraph;
//!
//! let report = WorkflowGraph::load_json(r#"{
//!     "name": "projects",
//!     "version": 2,
//!     "nodes": [
//!         { "id": "d", "moduleType": "billing", "stage": "Draft",
//!           "allowedRoles": ["Finance"], "permissions": { "view": true, "edit": true } },
//!         { "moduleType": "talent", "allowedRoles": ["Recruiter"] },
//!         { "stage": "Lost" }
//!     ]
//! }"#).unwrap();
//!
//! // The node without a module type is dropped and reported
//! assert_eq!(report.graph.len(), 2);
//! assert!(report.has_errors());
//! ```

pub mod error;
pub mod graph;
pub mod load;
pub mod validate;

// Re-export main types for convenience
pub use error::{GraphError, GraphResult};
pub use graph::{StageNode, WorkflowGraph, DEFAULT_WORKFLOW_NAME};
pub use load::{load_raw, load_value, LoadReport, RawNode, RawWorkflow};
pub use validate::{validate, IssueSeverity, ValidationIssue};
