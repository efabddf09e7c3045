//! Policy resolution
//!
//! The resolver is a pure function of its inputs: a member's role, the
//! workflow graph snapshot, a module type, and optionally the stage an entity
//! currently sits at. It owns no mutable state and can be shared freely
//! between threads.
//!
//! ## Rules
//!
//! Evaluated in order, first applicable rule wins:
//!
//! 1. Blank module type: input contract error.
//! 2. Member not loaded: unavailable.
//! 3. Sentinel role: master override. Full permissions for entity-scoped
//!    checks, no permission record for module-global checks.
//! 4. Workflow not loaded: unavailable.
//! 5. No entity stage: module-global check. Viewable iff any node of the
//!    module lists the role. Never carries permissions.
//! 6. Entity stage: the first node governing `(module, stage)` decides. With
//!    no such node the configured [`GapPolicy`] decides.

use stagegate_graph::WorkflowGraph;
use stagegate_rbac::{Role, StagePermissions};
use tracing::{debug, warn};

use crate::config::{GapPolicy, ResolverConfig};
use crate::decision::{AccessDecision, AccessRequest, AccessResponse, DecisionBasis};
use crate::error::{ResolveError, ResolveResult};
use crate::store::Member;

/// Stage-gated workflow access resolver.
///
/// # Examples
///
/// ```
/// use stagegate_access::{Member, PolicyResolver};
/// use stagegate_graph::{StageNode, WorkflowGraph};
/// use stagegate_rbac::{StageAction, StagePermissions};
///
/// let graph = WorkflowGraph::new("projects").with_node(
///     StageNode::new("billing")
///         .with_stage("Draft")
///         .with_roles(["Finance"])
///         .with_permissions(StagePermissions::view_only().with(StageAction::Edit)),
/// );
/// let resolver = PolicyResolver::default();
/// let finance = Member::new("u-1", "Finance");
///
/// let decision = resolver.resolve(Some(&finance), Some(&graph), "billing", Some("Draft")).unwrap();
/// assert!(decision.can_view);
/// assert!(decision.allows(StageAction::Edit));
///
/// // No node for this stage: viewable, but nothing more
/// let gap = resolver.resolve(Some(&finance), Some(&graph), "billing", Some("Approved")).unwrap();
/// assert!(gap.can_view);
/// assert!(gap.permissions.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyResolver {
    config: ResolverConfig,
}

impl PolicyResolver {
    /// Creates a resolver with the given configuration.
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve access for a member.
    ///
    /// # Arguments
    ///
    /// * `member` - The member, or `None` while the role is still loading
    /// * `workflow` - The current workflow snapshot, or `None` while loading
    /// * `module_type` - The module being accessed (required)
    /// * `entity_stage` - The entity's current stage; `None` or blank for a
    ///   module-global check
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InputContract`] when `module_type` is blank.
    pub fn resolve(
        &self,
        member: Option<&Member>,
        workflow: Option<&WorkflowGraph>,
        module_type: &str,
        entity_stage: Option<&str>,
    ) -> ResolveResult<AccessDecision> {
        self.resolve_role_id(
            member.map(|m| m.role_id.as_str()),
            workflow,
            module_type,
            entity_stage,
        )
    }

    /// Resolve access for a raw role identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InputContract`] when `module_type` is blank.
    pub fn resolve_role_id(
        &self,
        role_id: Option<&str>,
        workflow: Option<&WorkflowGraph>,
        module_type: &str,
        entity_stage: Option<&str>,
    ) -> ResolveResult<AccessDecision> {
        if module_type.trim().is_empty() {
            return Err(ResolveError::missing_module_type());
        }
        let role = role_id.map(|id| Role::classify(id, &self.config.sentinels));
        Ok(self.decide(role.as_ref(), workflow, module_type, entity_stage))
    }

    /// Serve a service-boundary request.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InputContract`] when the request has no module type.
    pub fn resolve_request(
        &self,
        workflow: Option<&WorkflowGraph>,
        request: &AccessRequest,
    ) -> ResolveResult<AccessResponse> {
        self.resolve_role_id(
            request.role_id.as_deref(),
            workflow,
            &request.module_type,
            request.entity_stage.as_deref(),
        )
        .map(AccessResponse::from)
    }

    fn decide(
        &self,
        role: Option<&Role>,
        workflow: Option<&WorkflowGraph>,
        module_type: &str,
        entity_stage: Option<&str>,
    ) -> AccessDecision {
        let stage = entity_stage.filter(|stage| !stage.trim().is_empty());

        let Some(role) = role else {
            debug!(module = module_type, "Member not loaded, access unavailable");
            return AccessDecision::unavailable();
        };

        let ordinary_id = match role {
            Role::SuperAdmin(_) | Role::RootAdministrator(_) => {
                debug!(module = module_type, role = %role, "Master override");
                let permissions = stage.map(|_| StagePermissions::full());
                return AccessDecision::granted(permissions, DecisionBasis::MasterOverride);
            }
            Role::Ordinary(id) => id.as_str(),
        };

        let Some(workflow) = workflow else {
            debug!(module = module_type, "Workflow not loaded, access unavailable");
            return AccessDecision::unavailable();
        };

        let decision = match stage {
            None => module_global(workflow, module_type, ordinary_id),
            Some(stage) => self.entity_scoped(workflow, module_type, stage, ordinary_id),
        };

        debug!(
            module = module_type,
            stage = stage.unwrap_or(""),
            role = ordinary_id,
            workflow = %workflow.name,
            version = workflow.version,
            can_view = decision.can_view,
            basis = decision.basis.as_str(),
            "Access resolved"
        );

        decision
    }

    fn entity_scoped(
        &self,
        workflow: &WorkflowGraph,
        module_type: &str,
        stage: &str,
        role_id: &str,
    ) -> AccessDecision {
        match workflow.find_stage_node(module_type, stage) {
            Some(node) if node.allows_role(role_id) => {
                AccessDecision::granted(node.permissions, DecisionBasis::StageGrant)
            }
            Some(_) => AccessDecision::denied(DecisionBasis::StageDenied),
            None => {
                warn!(
                    module = module_type,
                    stage,
                    workflow = %workflow.name,
                    version = workflow.version,
                    policy = self.config.gap_policy.as_str(),
                    "No workflow node covers this stage"
                );
                match self.config.gap_policy {
                    GapPolicy::Permissive => {
                        AccessDecision::granted(None, DecisionBasis::ConfigurationGap)
                    }
                    GapPolicy::Deny => AccessDecision::denied(DecisionBasis::ConfigurationGap),
                }
            }
        }
    }
}

fn module_global(workflow: &WorkflowGraph, module_type: &str, role_id: &str) -> AccessDecision {
    if workflow
        .nodes_for_module(module_type)
        .any(|node| node.allows_role(role_id))
    {
        AccessDecision::granted(None, DecisionBasis::ModuleGrant)
    } else {
        AccessDecision::denied(DecisionBasis::ModuleDenied)
    }
}

/// Resolve access with the default configuration.
///
/// # Errors
///
/// Returns [`ResolveError::InputContract`] when `module_type` is blank.
pub fn resolve(
    member: Option<&Member>,
    workflow: Option<&WorkflowGraph>,
    module_type: &str,
    entity_stage: Option<&str>,
) -> ResolveResult<AccessDecision> {
    PolicyResolver::default().resolve(member, workflow, module_type, entity_stage)
}
