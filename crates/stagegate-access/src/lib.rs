//! # Stagegate Access
//!
//! The stage-gated workflow access resolver: decides, for a member, a module
//! and optionally an entity, whether the member may act, using an editable
//! workflow graph instead of a fixed role table.
//!
//! ## Overview
//!
//! The stagegate-access crate handles:
//! - **Resolution**: Pure mapping of (role, workflow, module, stage?) to a decision
//! - **Decisions**: `can_view`, an optional permission record, and a status
//!   separating "denied" from "not loaded yet"
//! - **Configuration**: Sentinel roles, gap policy and workflow name from the environment
//! - **Stores**: Traits for the role registry, workflow store and entity store
//! - **Checking**: Concurrent fetching of inputs followed by resolution
//!
//! ## Architecture
//!
//! ```text
//! RoleRegistry ─┐
//! WorkflowStore ┼─► AccessChecker ─► PolicyResolver::resolve ─► AccessDecision
//! EntityStore  ─┘     (tokio::join!)     (pure, sync)            { can_view, permissions, status }
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use stagegate_access::{resolve, DecisionStatus, Member};
//! use stagegate_graph::{StageNode, WorkflowGraph};
//!
//! let graph = WorkflowGraph::new("projects")
//!     .with_node(StageNode::new("talent").with_roles(["Recruiter"]));
//!
//! // Module-global check
//! let recruiter = Member::new("u-1", "Recruiter");
//! let decision = resolve(Some(&recruiter), Some(&graph), "talent", None).unwrap();
//! assert!(decision.can_view);
//! assert!(decision.permissions.is_none());
//!
//! // Workflow still loading
//! let decision = resolve(Some(&recruiter), None, "talent", None).unwrap();
//! assert_eq!(decision.status, DecisionStatus::Unavailable);
//!
//! // Missing module type is a caller bug, not a denial
//! assert!(resolve(Some(&recruiter), Some(&graph), "", None).is_err());
//! ```
//!
//! ## Stage Transitions
//!
//! The resolver never changes entity state and does not check whether a
//! transition is legal. Callers gate transitions on
//! [`StageAction::MoveStage`](stagegate_rbac::StageAction::MoveStage) via
//! [`AccessDecision::allows`].

pub mod checker;
pub mod config;
pub mod decision;
pub mod error;
pub mod resolver;
pub mod store;

// Re-export main types
pub use checker::{AccessChecker, AccessQuery};
pub use config::{ConfigError, GapPolicy, ResolverConfig};
pub use decision::{AccessDecision, AccessRequest, AccessResponse, DecisionBasis, DecisionStatus};
pub use error::{ResolveError, ResolveResult};
pub use resolver::{resolve, PolicyResolver};
pub use store::{
    Entity, EntityStore, Member, MemoryEntityStore, MemoryRoleRegistry, MemoryWorkflowStore,
    RoleRegistry, StoreError, StoreResult, WorkflowStore,
};
