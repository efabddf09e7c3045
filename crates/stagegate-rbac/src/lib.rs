//! # Stagegate RBAC
//!
//! Role and permission vocabulary for stage-gated workflows.
//!
//! ## Overview
//!
//! The stagegate-rbac crate handles:
//! - **Roles**: Closed classification of registry role identifiers
//! - **Sentinels**: The two reserved identifiers granting master override
//! - **Actions**: What a member can do to an entity at a stage
//! - **Stage Permissions**: The fixed-shape boolean record stored on a stage node
//!
//! ## Architecture
//!
//! ```text
//! role id (string) ──classify──► Role { Ordinary(id) | SuperAdmin(id) | RootAdministrator(id) }
//!
//! StagePermissions = { view, edit, approve, delete, moveStage }
//!                         ▲
//!                    StageAction
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use stagegate_rbac::{Role, StageAction, StagePermissions};
//!
//! let role = Role::parse("Finance");
//! assert!(!role.is_master());
//!
//! let perms = StagePermissions::view_only().with(StageAction::Edit);
//! assert!(perms.allows(StageAction::Edit));
//! assert!(!perms.allows(StageAction::MoveStage));
//! ```
//!
//! ## Integration with stagegate-graph
//!
//! Workflow stage nodes carry a set of allowed role identifiers and an
//! optional [`StagePermissions`] record. Which one applies for a member is
//! decided by the resolver in `stagegate-access`.

pub mod actions;
pub mod permissions;
pub mod roles;

// Re-export main types for convenience
pub use actions::StageAction;
pub use permissions::StagePermissions;
pub use roles::{Role, RoleSentinels, DEFAULT_ROOT_ADMIN, DEFAULT_SUPER_ADMIN};
