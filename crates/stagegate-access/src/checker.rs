//! Access checking against live stores
//!
//! [`AccessChecker`] fetches a member's role, the configured workflow and,
//! for entity-scoped checks, the entity itself, all concurrently. It then
//! hands the snapshot to the [`PolicyResolver`]. Any input that cannot be
//! fetched yields the unavailable decision rather than an error.

use serde::{Deserialize, Serialize};
use stagegate_graph::WorkflowGraph;
use tracing::{debug, instrument, warn};

use crate::config::ResolverConfig;
use crate::decision::AccessDecision;
use crate::error::{ResolveError, ResolveResult};
use crate::resolver::PolicyResolver;
use crate::store::{Entity, EntityStore, Member, RoleRegistry, StoreResult, WorkflowStore};

/// An access check keyed by identifiers rather than loaded values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessQuery {
    /// User performing the action
    pub user_id: String,

    /// Module being accessed
    pub module_type: String,

    /// Entity being accessed, for entity-scoped checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl AccessQuery {
    /// Creates a module-global query.
    pub fn module(user_id: impl Into<String>, module_type: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            module_type: module_type.into(),
            entity_id: None,
        }
    }

    /// Creates an entity-scoped query.
    pub fn entity(
        user_id: impl Into<String>,
        module_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            module_type: module_type.into(),
            entity_id: Some(entity_id.into()),
        }
    }
}

/// Resolves access queries against a role registry, workflow store and entity store.
///
/// # Examples
///
/// ```
/// use stagegate_access::{
///     AccessChecker, AccessQuery, Entity, MemoryEntityStore, MemoryRoleRegistry,
///     MemoryWorkflowStore,
/// };
/// use stagegate_graph::{StageNode, WorkflowGraph};
///
/// # async fn example() {
/// let roles = MemoryRoleRegistry::new();
/// roles.assign("u-1", "Recruiter").await;
///
/// let workflows = MemoryWorkflowStore::new();
/// workflows
///     .put(WorkflowGraph::new("default").with_node(StageNode::new("talent").with_roles(["Recruiter"])))
///     .await;
///
/// let checker = AccessChecker::new(roles, workflows, MemoryEntityStore::new());
/// let decision = checker.check(&AccessQuery::module("u-1", "talent")).await.unwrap();
/// assert!(decision.can_view);
/// # }
/// ```
pub struct AccessChecker<R, W, E> {
    roles: R,
    workflows: W,
    entities: E,
    resolver: PolicyResolver,
}

impl<R, W, E> AccessChecker<R, W, E>
where
    R: RoleRegistry,
    W: WorkflowStore,
    E: EntityStore,
{
    /// Creates a checker with the default configuration.
    pub fn new(roles: R, workflows: W, entities: E) -> Self {
        Self::with_config(roles, workflows, entities, ResolverConfig::default())
    }

    /// Creates a checker with an explicit configuration.
    pub fn with_config(roles: R, workflows: W, entities: E, config: ResolverConfig) -> Self {
        Self {
            roles,
            workflows,
            entities,
            resolver: PolicyResolver::new(config),
        }
    }

    /// The resolver used for decisions.
    pub fn resolver(&self) -> &PolicyResolver {
        &self.resolver
    }

    /// Fetch inputs and resolve an access query.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InputContract`] when the query has no module
    /// type. No store is contacted in that case.
    #[instrument(skip(self), fields(user = %query.user_id, module = %query.module_type))]
    pub async fn check(&self, query: &AccessQuery) -> ResolveResult<AccessDecision> {
        if query.module_type.trim().is_empty() {
            return Err(ResolveError::missing_module_type());
        }

        let workflow_name = self.resolver.config().workflow_name.as_str();
        let (role, workflow, entity) = tokio::join!(
            self.roles.role_for(&query.user_id),
            self.workflows.load(workflow_name),
            self.fetch_entity(query.entity_id.as_deref()),
        );

        let member = loaded("role", &query.user_id, role)
            .map(|role_id| Member::new(query.user_id.clone(), role_id));
        let workflow: Option<WorkflowGraph> = loaded("workflow", workflow_name, workflow);

        let stage = match (query.entity_id.as_deref(), entity) {
            (None, _) => None,
            (Some(id), entity) => match loaded("entity", id, entity) {
                Some(entity) => entity.current_stage().map(str::to_string),
                None => return Ok(AccessDecision::unavailable()),
            },
        };

        self.resolver.resolve(
            member.as_ref(),
            workflow.as_ref(),
            &query.module_type,
            stage.as_deref(),
        )
    }

    async fn fetch_entity(&self, id: Option<&str>) -> StoreResult<Option<Entity>> {
        match id {
            Some(id) => self.entities.entity(id).await,
            None => Ok(None),
        }
    }
}

/// Collapse a store result into "loaded or not", logging why it was not.
fn loaded<T>(what: &'static str, key: &str, result: StoreResult<Option<T>>) -> Option<T> {
    match result {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            debug!(input = what, key, "Input not found");
            None
        }
        Err(e) => {
            warn!(input = what, key, error = %e, "Input fetch failed");
            None
        }
    }
}
