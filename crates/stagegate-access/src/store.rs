//! External collaborators
//!
//! The resolver consumes three independently fetched inputs: a member's role,
//! the current workflow, and an entity's stage. This module defines the traits
//! those sources implement and in-memory implementations for tests and
//! single-process embedding.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stagegate_graph::WorkflowGraph;
use stagegate_rbac::{Role, RoleSentinels};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Store error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing service could not be reached
    #[error("Store not reachable: {0}")]
    NotReachable(String),

    /// The backing service returned an error
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A user together with the role identifier resolved for this check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// User identifier
    pub user_id: String,

    /// Raw role identifier from the role registry
    pub role_id: String,
}

impl Member {
    /// Creates a member.
    pub fn new(user_id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role_id: role_id.into(),
        }
    }

    /// Classify the member's role against a sentinel pair.
    pub fn role(&self, sentinels: &RoleSentinels) -> Role {
        Role::classify(&self.role_id, sentinels)
    }
}

/// The part of an entity the resolver reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Entity identifier
    pub id: String,

    /// Current lifecycle stage, if the entity has one
    #[serde(default, alias = "status")]
    pub stage: Option<String>,
}

impl Entity {
    /// Creates an entity at a stage.
    pub fn new(id: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stage: Some(stage.into()),
        }
    }

    /// Creates an entity without a stage.
    pub fn without_stage(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stage: None,
        }
    }

    /// The stage, if present and non-blank.
    pub fn current_stage(&self) -> Option<&str> {
        self.stage.as_deref().filter(|stage| !stage.trim().is_empty())
    }
}

/// Source of member role identifiers.
#[async_trait]
pub trait RoleRegistry: Send + Sync {
    /// Look up a user's role identifier. `Ok(None)` means not found.
    async fn role_for(&self, user_id: &str) -> StoreResult<Option<String>>;
}

/// Source of workflow definitions.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Load the current workflow by name. `Ok(None)` means not found.
    async fn load(&self, name: &str) -> StoreResult<Option<WorkflowGraph>>;
}

/// Source of entity stages.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Load an entity by id. `Ok(None)` means not found.
    async fn entity(&self, id: &str) -> StoreResult<Option<Entity>>;
}

#[async_trait]
impl<T: RoleRegistry + ?Sized> RoleRegistry for Arc<T> {
    async fn role_for(&self, user_id: &str) -> StoreResult<Option<String>> {
        (**self).role_for(user_id).await
    }
}

#[async_trait]
impl<T: WorkflowStore + ?Sized> WorkflowStore for Arc<T> {
    async fn load(&self, name: &str) -> StoreResult<Option<WorkflowGraph>> {
        (**self).load(name).await
    }
}

#[async_trait]
impl<T: EntityStore + ?Sized> EntityStore for Arc<T> {
    async fn entity(&self, id: &str) -> StoreResult<Option<Entity>> {
        (**self).entity(id).await
    }
}

/// In-memory role registry.
#[derive(Debug, Default)]
pub struct MemoryRoleRegistry {
    roles: RwLock<HashMap<String, String>>,
}

impl MemoryRoleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a role to a user, replacing any previous one.
    pub async fn assign(&self, user_id: impl Into<String>, role_id: impl Into<String>) {
        self.roles.write().await.insert(user_id.into(), role_id.into());
    }

    /// Remove a user's role.
    pub async fn revoke(&self, user_id: &str) -> Option<String> {
        self.roles.write().await.remove(user_id)
    }
}

#[async_trait]
impl RoleRegistry for MemoryRoleRegistry {
    async fn role_for(&self, user_id: &str) -> StoreResult<Option<String>> {
        Ok(self.roles.read().await.get(user_id).cloned())
    }
}

/// In-memory workflow store keyed by workflow name.
#[derive(Debug, Default)]
pub struct MemoryWorkflowStore {
    workflows: RwLock<HashMap<String, WorkflowGraph>>,
}

impl MemoryWorkflowStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a workflow under its own name, replacing the previous definition.
    pub async fn put(&self, workflow: WorkflowGraph) {
        self.workflows
            .write()
            .await
            .insert(workflow.name.clone(), workflow);
    }

    /// Remove a workflow.
    pub async fn remove(&self, name: &str) -> Option<WorkflowGraph> {
        self.workflows.write().await.remove(name)
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn load(&self, name: &str) -> StoreResult<Option<WorkflowGraph>> {
        Ok(self.workflows.read().await.get(name).cloned())
    }
}

/// In-memory entity store.
#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    entities: RwLock<HashMap<String, Entity>>,
}

impl MemoryEntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity.
    pub async fn put(&self, entity: Entity) {
        self.entities.write().await.insert(entity.id.clone(), entity);
    }

    /// Move an entity to another stage.
    ///
    /// Returns `false` if the entity does not exist.
    pub async fn set_stage(&self, id: &str, stage: impl Into<String>) -> bool {
        match self.entities.write().await.get_mut(id) {
            Some(entity) => {
                entity.stage = Some(stage.into());
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn entity(&self, id: &str) -> StoreResult<Option<Entity>> {
        Ok(self.entities.read().await.get(id).cloned())
    }
}
