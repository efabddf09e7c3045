//! Member roles
//!
//! Role identifiers come from an external role registry as bare strings.
//! This module classifies them into a closed set so the administrative
//! override path is an exhaustive match rather than string comparison
//! scattered through the resolver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default identifier of the super-admin sentinel role.
pub const DEFAULT_SUPER_ADMIN: &str = "super-admin";

/// Default identifier of the root administrator sentinel role.
pub const DEFAULT_ROOT_ADMIN: &str = "root-admin";

/// The two reserved role identifiers that bypass workflow lookup.
///
/// # Examples
///
/// ```
/// use stagegate_rbac::RoleSentinels;
///
/// let sentinels = RoleSentinels::default();
/// assert!(sentinels.is_sentinel("super-admin"));
/// assert!(!sentinels.is_sentinel("Finance"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleSentinels {
    /// Identifier classified as [`Role::SuperAdmin`].
    pub super_admin: String,

    /// Identifier classified as [`Role::RootAdministrator`].
    pub root_admin: String,
}

impl RoleSentinels {
    /// Creates a sentinel pair.
    pub fn new(super_admin: impl Into<String>, root_admin: impl Into<String>) -> Self {
        Self {
            super_admin: super_admin.into(),
            root_admin: root_admin.into(),
        }
    }

    /// Check whether an identifier is one of the sentinels.
    pub fn is_sentinel(&self, id: &str) -> bool {
        id == self.super_admin || id == self.root_admin
    }
}

impl Default for RoleSentinels {
    fn default() -> Self {
        Self::new(DEFAULT_SUPER_ADMIN, DEFAULT_ROOT_ADMIN)
    }
}

/// A member's role at check time.
///
/// Ordinary roles are opaque: their meaning lives entirely in the workflow
/// graph. Matching is exact and case-sensitive, and an empty identifier is an
/// ordinary role like any other.
///
/// Every variant keeps the identifier it was classified from, so a role
/// serializes and displays as the registry wrote it. There is no
/// `Deserialize`: classification needs the sentinels in effect, so go
/// through [`Role::classify`].
///
/// # Examples
///
/// ```
/// use stagegate_rbac::Role;
///
/// assert_eq!(Role::parse("super-admin"), Role::SuperAdmin("super-admin".to_string()));
/// assert_eq!(Role::parse("Finance"), Role::Ordinary("Finance".to_string()));
/// assert!(Role::parse("root-admin").is_master());
/// assert!(!Role::parse("Super-Admin").is_master());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Role {
    /// Any role that is not a sentinel.
    Ordinary(String),

    /// Unconditional administrative override.
    SuperAdmin(String),

    /// Unconditional administrative override.
    RootAdministrator(String),
}

impl Role {
    /// Classify a raw role identifier against a sentinel pair.
    ///
    /// # Arguments
    ///
    /// * `id` - Raw identifier from the role registry
    /// * `sentinels` - The reserved identifiers in effect
    pub fn classify(id: &str, sentinels: &RoleSentinels) -> Self {
        if id == sentinels.super_admin {
            Self::SuperAdmin(id.to_string())
        } else if id == sentinels.root_admin {
            Self::RootAdministrator(id.to_string())
        } else {
            Self::Ordinary(id.to_string())
        }
    }

    /// Classify a raw role identifier against the default sentinels.
    pub fn parse(id: &str) -> Self {
        Self::classify(id, &RoleSentinels::default())
    }

    /// Check whether this role bypasses the workflow graph.
    pub fn is_master(&self) -> bool {
        match self {
            Self::SuperAdmin(_) | Self::RootAdministrator(_) => true,
            Self::Ordinary(_) => false,
        }
    }

    /// The raw identifier this role was classified from.
    pub fn id(&self) -> &str {
        match self {
            Self::Ordinary(id) | Self::SuperAdmin(id) | Self::RootAdministrator(id) => id,
        }
    }

    /// Get a human-readable display name for the role.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagegate_rbac::Role;
    ///
    /// assert_eq!(Role::parse("root-admin").display_name(), "Root Administrator");
    /// assert_eq!(Role::parse("Recruiter").display_name(), "Recruiter");
    /// ```
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ordinary(id) => id,
            Self::SuperAdmin(_) => "Super Admin",
            Self::RootAdministrator(_) => "Root Administrator",
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Ordinary(id) | Role::SuperAdmin(id) | Role::RootAdministrator(id) => id,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
