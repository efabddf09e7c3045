//! # Permissions
//!
//! The fixed-shape permission record attached to a workflow stage node.
//! A record answers "what exactly may an allowed role do at this stage".

use serde::{Deserialize, Serialize};

use crate::actions::StageAction;

/// Fine-grained grants for one workflow stage.
///
/// Every field defaults to `false` when missing from serialized input, so a
/// partially specified record such as `{"edit": true}` grants only `edit`.
///
/// # Example
///
/// ```
/// use stagegate_rbac::permissions::StagePermissions;
/// use stagegate_rbac::actions::StageAction;
///
/// let perms = StagePermissions::view_only().with(StageAction::Edit);
/// assert!(perms.allows(StageAction::Edit));
/// assert!(!perms.allows(StageAction::Approve));
///
/// let parsed: StagePermissions = serde_json::from_str(r#"{"moveStage": true}"#).unwrap();
/// assert!(parsed.move_stage);
/// assert!(!parsed.view);
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", default)]
pub struct StagePermissions {
    /// May view the entity.
    pub view: bool,
    /// May edit the entity.
    pub edit: bool,
    /// May approve the entity at this stage.
    pub approve: bool,
    /// May delete the entity.
    pub delete: bool,
    /// May move the entity to another stage.
    pub move_stage: bool,
}

impl StagePermissions {
    /// A record granting nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// A record granting every action.
    pub fn full() -> Self {
        Self {
            view: true,
            edit: true,
            approve: true,
            delete: true,
            move_stage: true,
        }
    }

    /// A record granting only `view`.
    pub fn view_only() -> Self {
        Self {
            view: true,
            ..Self::default()
        }
    }

    /// Check whether the record grants an action.
    pub fn allows(&self, action: StageAction) -> bool {
        match action {
            StageAction::View => self.view,
            StageAction::Edit => self.edit,
            StageAction::Approve => self.approve,
            StageAction::Delete => self.delete,
            StageAction::MoveStage => self.move_stage,
        }
    }

    /// Return a copy of the record with one more action granted.
    pub fn with(mut self, action: StageAction) -> Self {
        self.set(action, true);
        self
    }

    /// Grant or revoke a single action.
    pub fn set(&mut self, action: StageAction, granted: bool) {
        let slot = match action {
            StageAction::View => &mut self.view,
            StageAction::Edit => &mut self.edit,
            StageAction::Approve => &mut self.approve,
            StageAction::Delete => &mut self.delete,
            StageAction::MoveStage => &mut self.move_stage,
        };
        *slot = granted;
    }

    /// All granted actions, in field order.
    pub fn granted(&self) -> Vec<StageAction> {
        StageAction::all()
            .into_iter()
            .filter(|action| self.allows(*action))
            .collect()
    }

    /// Check if the record grants nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }

    /// Check if the record grants every action.
    pub fn is_full(&self) -> bool {
        *self == Self::full()
    }
}

impl FromIterator<StageAction> for StagePermissions {
    fn from_iter<T: IntoIterator<Item = StageAction>>(iter: T) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_and_none() {
        assert!(StagePermissions::full().is_full());
        assert!(StagePermissions::none().is_empty());
        assert_eq!(StagePermissions::full().granted().len(), 5);
        assert!(StagePermissions::none().granted().is_empty());
    }

    #[test]
    fn test_allows_matches_fields() {
        let perms = StagePermissions {
            edit: true,
            move_stage: true,
            ..StagePermissions::default()
        };
        assert!(perms.allows(StageAction::Edit));
        assert!(perms.allows(StageAction::MoveStage));
        assert!(!perms.allows(StageAction::View));
        assert!(!perms.allows(StageAction::Delete));
    }

    #[test]
    fn test_set_revokes() {
        let mut perms = StagePermissions::full();
        perms.set(StageAction::Delete, false);
        assert!(!perms.allows(StageAction::Delete));
        assert!(!perms.is_full());
    }

    #[test]
    fn test_from_iterator() {
        let perms: StagePermissions = [StageAction::View, StageAction::Approve].into_iter().collect();
        assert_eq!(perms.granted(), vec![StageAction::View, StageAction::Approve]);
    }

    #[test]
    fn test_partial_record_defaults_missing_fields() {
        let perms: StagePermissions = serde_json::from_str(r#"{"view": true, "edit": true}"#).unwrap();
        assert!(perms.view);
        assert!(perms.edit);
        assert!(!perms.approve);
        assert!(!perms.delete);
        assert!(!perms.move_stage);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(StagePermissions::full()).unwrap();
        assert_eq!(json["moveStage"], serde_json::json!(true));
        assert!(json.get("move_stage").is_none());
    }
}
