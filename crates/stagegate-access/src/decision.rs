//! Access decisions
//!
//! An [`AccessDecision`] is the ephemeral result of one resolution call. It is
//! never persisted; callers re-resolve before every sensitive action.
//!
//! Two outcomes look alike on the `can_view` flag but mean different things:
//! a resolved denial and an unavailable decision. UI copy must only present
//! the first as a denial; the second means "try again once loaded".

use serde::{Deserialize, Serialize};
use stagegate_rbac::{StageAction, StagePermissions};

/// Whether the resolver had everything it needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    /// The decision is definitive for the supplied snapshot.
    Resolved,
    /// The member or workflow was not loaded yet.
    Unavailable,
}

impl DecisionStatus {
    /// Get the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Resolved => "resolved",
            DecisionStatus::Unavailable => "unavailable",
        }
    }
}

/// Which resolution rule produced a decision.
///
/// Carried for logging and diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBasis {
    /// A sentinel role bypassed the graph.
    MasterOverride,
    /// A module-global check found a node listing the role.
    ModuleGrant,
    /// A module-global check found no node listing the role.
    ModuleDenied,
    /// The entity's stage node lists the role.
    StageGrant,
    /// The entity's stage node does not list the role.
    StageDenied,
    /// No node covers the entity's stage; the gap policy decided.
    ConfigurationGap,
    /// An input was not loaded.
    Unavailable,
}

impl DecisionBasis {
    /// Get the string representation of the basis.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionBasis::MasterOverride => "master_override",
            DecisionBasis::ModuleGrant => "module_grant",
            DecisionBasis::ModuleDenied => "module_denied",
            DecisionBasis::StageGrant => "stage_grant",
            DecisionBasis::StageDenied => "stage_denied",
            DecisionBasis::ConfigurationGap => "configuration_gap",
            DecisionBasis::Unavailable => "unavailable",
        }
    }
}

/// Result of resolving access for one member, module and optional stage.
///
/// # Examples
///
/// ```
/// use stagegate_access::{AccessDecision, DecisionBasis};
/// use stagegate_rbac::{StageAction, StagePermissions};
///
/// let decision = AccessDecision::granted(
///     Some(StagePermissions::view_only().with(StageAction::Edit)),
///     DecisionBasis::StageGrant,
/// );
/// assert!(decision.allows(StageAction::Edit));
/// assert!(!decision.allows(StageAction::MoveStage));
///
/// let loading = AccessDecision::unavailable();
/// assert!(loading.is_unavailable());
/// assert!(!loading.is_denied());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    /// Whether the member may see the module or entity
    pub can_view: bool,

    /// Fine-grained grants; only ever present for entity-scoped checks
    pub permissions: Option<StagePermissions>,

    /// Whether all inputs were available
    pub status: DecisionStatus,

    /// Which rule decided
    pub basis: DecisionBasis,
}

impl AccessDecision {
    /// A resolved decision granting viewing.
    pub fn granted(permissions: Option<StagePermissions>, basis: DecisionBasis) -> Self {
        Self {
            can_view: true,
            permissions,
            status: DecisionStatus::Resolved,
            basis,
        }
    }

    /// A resolved decision denying access.
    pub fn denied(basis: DecisionBasis) -> Self {
        Self {
            can_view: false,
            permissions: None,
            status: DecisionStatus::Resolved,
            basis,
        }
    }

    /// The "not loaded yet" decision.
    pub fn unavailable() -> Self {
        Self {
            can_view: false,
            permissions: None,
            status: DecisionStatus::Unavailable,
            basis: DecisionBasis::Unavailable,
        }
    }

    /// Check whether the decision permits an action.
    ///
    /// `View` follows `can_view`. Every other action requires a permission
    /// record granting it, so module-global decisions and configuration gaps
    /// permit nothing beyond viewing.
    pub fn allows(&self, action: StageAction) -> bool {
        if !self.can_view {
            return false;
        }
        match action {
            StageAction::View => true,
            other => self
                .permissions
                .map(|permissions| permissions.allows(other))
                .unwrap_or(false),
        }
    }

    /// Check if an input was missing.
    pub fn is_unavailable(&self) -> bool {
        self.status == DecisionStatus::Unavailable
    }

    /// Check if this is a definitive denial.
    pub fn is_denied(&self) -> bool {
        self.status == DecisionStatus::Resolved && !self.can_view
    }

    /// Check if the decision came from the master override.
    pub fn is_master_override(&self) -> bool {
        self.basis == DecisionBasis::MasterOverride
    }
}

/// Access check request at the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    /// Role identifier from the role registry; absent while loading
    #[serde(default)]
    pub role_id: Option<String>,

    /// Module being accessed
    #[serde(default)]
    pub module_type: String,

    /// Entity's current stage for entity-scoped checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_stage: Option<String>,
}

impl AccessRequest {
    /// Creates a module-global request.
    pub fn new(role_id: impl Into<String>, module_type: impl Into<String>) -> Self {
        Self {
            role_id: Some(role_id.into()),
            module_type: module_type.into(),
            entity_stage: None,
        }
    }

    /// Scope the request to an entity stage.
    pub fn at_stage(mut self, stage: impl Into<String>) -> Self {
        self.entity_stage = Some(stage.into());
        self
    }
}

/// Access check response at the service boundary.
///
/// # Examples
///
/// ```
/// use stagegate_access::{AccessDecision, AccessResponse};
///
/// let response = AccessResponse::from(AccessDecision::unavailable());
/// let json = serde_json::to_value(&response).unwrap();
/// assert_eq!(json["status"], "unavailable");
/// assert_eq!(json["canView"], false);
/// assert!(json["permissions"].is_null());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    /// Whether the member may see the module or entity
    pub can_view: bool,

    /// Fine-grained grants, `null` when none apply
    pub permissions: Option<StagePermissions>,

    /// `resolved` or `unavailable`
    pub status: DecisionStatus,
}

impl From<AccessDecision> for AccessResponse {
    fn from(decision: AccessDecision) -> Self {
        Self {
            can_view: decision.can_view,
            permissions: decision.permissions,
            status: decision.status,
        }
    }
}
