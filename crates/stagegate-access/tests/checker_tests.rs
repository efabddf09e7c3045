//! Tests for the access checker against in-memory and failing stores.
//!
//! The checker fetches role, workflow and entity concurrently and must turn
//! every missing or failed input into the unavailable decision, never an error.
//!
//! Test flows:
//! 1. Entity-scoped checks read the entity's current stage
//! 2. Stage changes are picked up on the next check
//! 3. Store failures and missing records yield unavailable
//! 4. Configuration (workflow name, sentinels, gap policy) is honored

use async_trait::async_trait;
use stagegate_access::{
    AccessChecker, AccessQuery, DecisionBasis, DecisionStatus, Entity, EntityStore, GapPolicy,
    MemoryEntityStore, MemoryRoleRegistry, MemoryWorkflowStore, ResolveError, ResolverConfig,
    RoleRegistry, StoreError, StoreResult, WorkflowStore,
};
use stagegate_graph::{StageNode, WorkflowGraph};
use stagegate_rbac::{RoleSentinels, StageAction, StagePermissions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Role registry whose backend is down.
struct UnreachableRegistry;

#[async_trait]
impl RoleRegistry for UnreachableRegistry {
    async fn role_for(&self, _user_id: &str) -> StoreResult<Option<String>> {
        Err(StoreError::NotReachable("role registry".to_string()))
    }
}

/// Workflow store whose backend returns errors.
struct FailingWorkflowStore;

#[async_trait]
impl WorkflowStore for FailingWorkflowStore {
    async fn load(&self, _name: &str) -> StoreResult<Option<WorkflowGraph>> {
        Err(StoreError::Backend("document read failed".to_string()))
    }
}

/// Entity store counting lookups.
#[derive(Default)]
struct CountingEntityStore {
    inner: MemoryEntityStore,
    lookups: AtomicUsize,
}

#[async_trait]
impl EntityStore for CountingEntityStore {
    async fn entity(&self, id: &str) -> StoreResult<Option<Entity>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.entity(id).await
    }
}

/// Test fixture with shared in-memory stores.
struct TestFixture {
    roles: Arc<MemoryRoleRegistry>,
    workflows: Arc<MemoryWorkflowStore>,
    entities: Arc<MemoryEntityStore>,
}

impl TestFixture {
    /// Create stores seeded with a billing workflow, members and one project.
    async fn new() -> Self {
        let roles = Arc::new(MemoryRoleRegistry::new());
        roles.assign("finance-1", "Finance").await;
        roles.assign("manager-1", "Manager").await;
        roles.assign("recruiter-1", "Recruiter").await;
        roles.assign("admin-1", "super-admin").await;

        let workflows = Arc::new(MemoryWorkflowStore::new());
        workflows.put(billing_workflow("default")).await;

        let entities = Arc::new(MemoryEntityStore::new());
        entities.put(Entity::new("invoice-1", "Draft")).await;
        entities.put(Entity::without_stage("invoice-2")).await;

        Self {
            roles,
            workflows,
            entities,
        }
    }

    /// Checker over the shared stores.
    fn checker(
        &self,
        config: ResolverConfig,
    ) -> AccessChecker<Arc<MemoryRoleRegistry>, Arc<MemoryWorkflowStore>, Arc<MemoryEntityStore>> {
        AccessChecker::with_config(
            self.roles.clone(),
            self.workflows.clone(),
            self.entities.clone(),
            config,
        )
    }
}

fn billing_workflow(name: &str) -> WorkflowGraph {
    WorkflowGraph::new(name)
        .with_node(
            StageNode::new("billing")
                .with_id("draft")
                .with_stage("Draft")
                .with_roles(["Finance"])
                .with_permissions(
                    StagePermissions::view_only()
                        .with(StageAction::Edit)
                        .with(StageAction::MoveStage),
                )
                .with_next("review"),
        )
        .with_node(
            StageNode::new("billing")
                .with_id("review")
                .with_stage("InReview")
                .with_roles(["Manager"])
                .with_permissions(StagePermissions::view_only().with(StageAction::Approve)),
        )
        .with_node(StageNode::new("talent").with_roles(["Recruiter"]))
}

#[tokio::test]
async fn entity_scoped_check_uses_entity_stage() {
    let fixture = TestFixture::new().await;
    let checker = fixture.checker(ResolverConfig::default());

    let decision = checker
        .check(&AccessQuery::entity("finance-1", "billing", "invoice-1"))
        .await
        .unwrap();
    assert!(decision.can_view);
    assert!(decision.allows(StageAction::MoveStage));

    let decision = checker
        .check(&AccessQuery::entity("manager-1", "billing", "invoice-1"))
        .await
        .unwrap();
    assert!(decision.is_denied());
}

#[tokio::test]
async fn stage_change_is_seen_on_next_check() {
    let fixture = TestFixture::new().await;
    let checker = fixture.checker(ResolverConfig::default());
    let query = AccessQuery::entity("manager-1", "billing", "invoice-1");

    assert!(!checker.check(&query).await.unwrap().can_view);

    // Caller performs the transition after checking moveStage
    assert!(fixture.entities.set_stage("invoice-1", "InReview").await);

    let decision = checker.check(&query).await.unwrap();
    assert!(decision.can_view);
    assert!(decision.allows(StageAction::Approve));
}

#[tokio::test]
async fn workflow_redefinition_is_seen_on_next_check() {
    let fixture = TestFixture::new().await;
    let checker = fixture.checker(ResolverConfig::default());
    let query = AccessQuery::module("recruiter-1", "billing");

    assert!(checker.check(&query).await.unwrap().is_denied());

    let mut workflow = billing_workflow("default");
    workflow.replace_nodes(vec![StageNode::new("billing").with_roles(["Recruiter"])]);
    fixture.workflows.put(workflow).await;

    assert!(checker.check(&query).await.unwrap().can_view);
}

#[tokio::test]
async fn entity_without_stage_is_module_global() {
    let fixture = TestFixture::new().await;
    let checker = fixture.checker(ResolverConfig::default());

    let decision = checker
        .check(&AccessQuery::entity("finance-1", "billing", "invoice-2"))
        .await
        .unwrap();
    assert_eq!(decision.basis, DecisionBasis::ModuleGrant);
    assert!(decision.permissions.is_none());
}

#[tokio::test]
async fn missing_records_are_unavailable() {
    let fixture = TestFixture::new().await;
    let checker = fixture.checker(ResolverConfig::default());

    let unknown_user = checker
        .check(&AccessQuery::module("nobody", "billing"))
        .await
        .unwrap();
    assert_eq!(unknown_user.status, DecisionStatus::Unavailable);

    let unknown_entity = checker
        .check(&AccessQuery::entity("admin-1", "billing", "invoice-404"))
        .await
        .unwrap();
    assert!(unknown_entity.is_unavailable());

    let unknown_workflow = fixture
        .checker(ResolverConfig::default().with_workflow_name("archived"))
        .check(&AccessQuery::module("finance-1", "billing"))
        .await
        .unwrap();
    assert!(unknown_workflow.is_unavailable());
}

#[tokio::test]
async fn store_failures_are_unavailable_not_errors() {
    let fixture = TestFixture::new().await;

    let checker = AccessChecker::new(
        UnreachableRegistry,
        fixture.workflows.clone(),
        fixture.entities.clone(),
    );
    let decision = checker
        .check(&AccessQuery::entity("finance-1", "billing", "invoice-1"))
        .await
        .unwrap();
    assert!(decision.is_unavailable());

    let checker = AccessChecker::new(
        fixture.roles.clone(),
        FailingWorkflowStore,
        fixture.entities.clone(),
    );
    let decision = checker
        .check(&AccessQuery::module("finance-1", "billing"))
        .await
        .unwrap();
    assert!(decision.is_unavailable());
}

#[tokio::test]
async fn master_override_survives_workflow_outage() {
    let fixture = TestFixture::new().await;
    let checker = AccessChecker::new(
        fixture.roles.clone(),
        FailingWorkflowStore,
        fixture.entities.clone(),
    );

    let decision = checker
        .check(&AccessQuery::entity("admin-1", "billing", "invoice-1"))
        .await
        .unwrap();
    assert!(decision.can_view);
    assert_eq!(decision.permissions, Some(StagePermissions::full()));
}

#[tokio::test]
async fn module_global_check_skips_entity_store() {
    let fixture = TestFixture::new().await;
    let entities = Arc::new(CountingEntityStore::default());
    let checker = AccessChecker::new(fixture.roles.clone(), fixture.workflows.clone(), entities.clone());

    let decision = checker
        .check(&AccessQuery::module("recruiter-1", "talent"))
        .await
        .unwrap();
    assert!(decision.can_view);
    assert_eq!(entities.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_module_is_rejected_before_fetching() {
    let fixture = TestFixture::new().await;
    let entities = Arc::new(CountingEntityStore::default());
    let checker = AccessChecker::new(fixture.roles.clone(), fixture.workflows.clone(), entities.clone());

    let result = checker
        .check(&AccessQuery::entity("finance-1", "", "invoice-1"))
        .await;
    assert!(matches!(result, Err(ResolveError::InputContract(_))));
    assert_eq!(entities.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn configuration_is_honored() {
    let fixture = TestFixture::new().await;
    fixture.roles.assign("owner-1", "owner").await;
    fixture.workflows.put(billing_workflow("projects")).await;
    fixture.entities.put(Entity::new("invoice-3", "Paid")).await;

    let config = ResolverConfig::default()
        .with_workflow_name("projects")
        .with_sentinels(RoleSentinels::new("owner", "root"))
        .with_gap_policy(GapPolicy::Deny);
    let checker = fixture.checker(config);

    let owner = checker
        .check(&AccessQuery::entity("owner-1", "billing", "invoice-3"))
        .await
        .unwrap();
    assert!(owner.is_master_override());

    let finance = checker
        .check(&AccessQuery::entity("finance-1", "billing", "invoice-3"))
        .await
        .unwrap();
    assert!(finance.is_denied());
    assert_eq!(finance.basis, DecisionBasis::ConfigurationGap);

    // "super-admin" is an ordinary role under this configuration
    let former_admin = checker
        .check(&AccessQuery::entity("admin-1", "billing", "invoice-1"))
        .await
        .unwrap();
    assert!(former_admin.is_denied());
}

#[tokio::test]
async fn concurrent_checks_share_one_checker() {
    let fixture = TestFixture::new().await;
    let checker = Arc::new(fixture.checker(ResolverConfig::default()));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let checker = checker.clone();
        handles.push(tokio::spawn(async move {
            checker
                .check(&AccessQuery::entity("finance-1", "billing", "invoice-1"))
                .await
        }));
    }

    for handle in handles {
        let decision = handle.await.unwrap().unwrap();
        assert!(decision.can_view);
        assert!(decision.allows(StageAction::Edit));
    }
}
