//! # Stage Actions
//!
//! Defines the actions a member can take on an entity sitting at a workflow stage.
//! Every action maps onto one boolean of a [`StagePermissions`](crate::StagePermissions)
//! record.

use serde::{Deserialize, Serialize};

/// Actions that can be performed on an entity at a given stage.
///
/// - **View**: See the entity and its current stage
/// - **Edit**: Modify entity data while it sits at the stage
/// - **Approve**: Sign off on the entity at the stage
/// - **Delete**: Remove the entity
/// - **MoveStage**: Transition the entity to another stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StageAction {
    /// View the entity.
    View,

    /// Edit the entity.
    Edit,

    /// Approve the entity at its current stage.
    Approve,

    /// Delete the entity.
    ///
    /// This is the only destructive action.
    Delete,

    /// Move the entity to another stage.
    ///
    /// The resolver only reports this grant; performing the transition
    /// is the caller's job.
    MoveStage,
}

impl StageAction {
    /// Get the string representation of the action.
    ///
    /// Matches the field names used in serialized permission records.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageAction::View => "view",
            StageAction::Edit => "edit",
            StageAction::Approve => "approve",
            StageAction::Delete => "delete",
            StageAction::MoveStage => "moveStage",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Returns
    ///
    /// `Some(StageAction)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use stagegate_rbac::actions::StageAction;
    ///
    /// assert_eq!(StageAction::parse("view"), Some(StageAction::View));
    /// assert_eq!(StageAction::parse("write"), Some(StageAction::Edit)); // Alias
    /// assert_eq!(StageAction::parse("moveStage"), Some(StageAction::MoveStage));
    /// assert_eq!(StageAction::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "view" | "read" | "get" => Some(StageAction::View),
            "edit" | "update" | "write" | "modify" => Some(StageAction::Edit),
            "approve" | "accept" | "sign_off" | "signoff" => Some(StageAction::Approve),
            "delete" | "remove" | "destroy" => Some(StageAction::Delete),
            "movestage" | "move_stage" | "move" | "transition" => Some(StageAction::MoveStage),
            _ => None,
        }
    }

    /// Get all actions, in permission-record field order.
    pub fn all() -> [Self; 5] {
        [
            StageAction::View,
            StageAction::Edit,
            StageAction::Approve,
            StageAction::Delete,
            StageAction::MoveStage,
        ]
    }

    /// Check if this is a read-only action.
    pub fn is_read_only(&self) -> bool {
        matches!(self, StageAction::View)
    }

    /// Check if this action changes the entity or its position in the workflow.
    pub fn is_write(&self) -> bool {
        !self.is_read_only()
    }

    /// Check if this is a destructive action.
    pub fn is_destructive(&self) -> bool {
        matches!(self, StageAction::Delete)
    }
}

impl std::fmt::Display for StageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
