//! Resolver configuration.
//!
//! Holds the reserved administrative role identifiers, the policy applied
//! when no stage node covers an entity, and the workflow the access checker
//! loads. Configuration is loaded from environment variables with defaults
//! matching the behavior of the existing product.

use serde::{Deserialize, Serialize};
use stagegate_graph::DEFAULT_WORKFLOW_NAME;
use stagegate_rbac::RoleSentinels;
use thiserror::Error;
use tracing::warn;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },

    /// A sentinel role identifier is blank.
    #[error("Sentinel role {0} must not be blank")]
    EmptySentinel(&'static str),

    /// Both sentinels use the same identifier.
    #[error("Super-admin and root administrator sentinels are both {0:?}")]
    DuplicateSentinel(String),
}

/// What an entity-scoped check returns when no node covers the entity's stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Grant viewing without fine-grained permissions.
    #[default]
    Permissive,

    /// Deny viewing.
    Deny,
}

impl GapPolicy {
    /// Get the string representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            GapPolicy::Permissive => "permissive",
            GapPolicy::Deny => "deny",
        }
    }

    /// Parse policy from string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagegate_access::GapPolicy;
    ///
    /// assert_eq!(GapPolicy::parse("permissive"), Some(GapPolicy::Permissive));
    /// assert_eq!(GapPolicy::parse("DENY"), Some(GapPolicy::Deny));
    /// assert_eq!(GapPolicy::parse("maybe"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "permissive" | "allow" | "open" => Some(GapPolicy::Permissive),
            "deny" | "closed" | "strict" => Some(GapPolicy::Deny),
            _ => None,
        }
    }
}

/// Configuration for the policy resolver and access checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Role identifiers that receive the master override.
    pub sentinels: RoleSentinels,

    /// Outcome for entity-scoped checks with no matching node.
    pub gap_policy: GapPolicy,

    /// Workflow fetched by the access checker.
    pub workflow_name: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            sentinels: RoleSentinels::default(),
            gap_policy: GapPolicy::default(),
            workflow_name: DEFAULT_WORKFLOW_NAME.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STAGEGATE_SUPER_ADMIN_ROLE`: super-admin sentinel (default: super-admin)
    /// - `STAGEGATE_ROOT_ADMIN_ROLE`: root administrator sentinel (default: root-admin)
    /// - `STAGEGATE_GAP_POLICY`: `permissive` or `deny` (default: permissive)
    /// - `STAGEGATE_WORKFLOW_NAME`: workflow loaded by the checker (default: default)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Blank values fall back to defaults; an unparsable gap policy is
    /// logged and falls back to the default policy. Sentinels that fail
    /// [`ResolverConfig::validate`] are logged and replaced by the defaults,
    /// so the result always validates.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let gap_policy = match non_blank("STAGEGATE_GAP_POLICY") {
            Some(raw) => GapPolicy::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Unrecognized STAGEGATE_GAP_POLICY, using default");
                default.gap_policy
            }),
            None => default.gap_policy,
        };

        let mut config = Self {
            sentinels: RoleSentinels::new(
                non_blank("STAGEGATE_SUPER_ADMIN_ROLE")
                    .unwrap_or_else(|| default.sentinels.super_admin.clone()),
                non_blank("STAGEGATE_ROOT_ADMIN_ROLE")
                    .unwrap_or_else(|| default.sentinels.root_admin.clone()),
            ),
            gap_policy,
            workflow_name: non_blank("STAGEGATE_WORKFLOW_NAME")
                .unwrap_or_else(|| default.workflow_name.clone()),
        };

        // Blank values never get this far, so only a sentinel clash can fail
        if let Err(e) = config.validate() {
            warn!(error = %e, "Invalid sentinel configuration, using default sentinels");
            config.sentinels = default.sentinels;
        }

        config
    }

    /// Set the gap policy.
    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    /// Set the sentinel roles.
    pub fn with_sentinels(mut self, sentinels: RoleSentinels) -> Self {
        self.sentinels = sentinels;
        self
    }

    /// Set the workflow name.
    pub fn with_workflow_name(mut self, name: impl Into<String>) -> Self {
        self.workflow_name = name.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sentinels.super_admin.trim().is_empty() {
            return Err(ConfigError::EmptySentinel("super_admin"));
        }
        if self.sentinels.root_admin.trim().is_empty() {
            return Err(ConfigError::EmptySentinel("root_admin"));
        }
        if self.sentinels.super_admin == self.sentinels.root_admin {
            return Err(ConfigError::DuplicateSentinel(self.sentinels.super_admin.clone()));
        }
        if self.workflow_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "workflow_name".to_string(),
                message: "must not be blank".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.sentinels.super_admin, "super-admin");
        assert_eq!(config.sentinels.root_admin, "root-admin");
        assert_eq!(config.gap_policy, GapPolicy::Permissive);
        assert_eq!(config.workflow_name, "default");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ResolverConfig::from_lookup(lookup(&[
            ("STAGEGATE_SUPER_ADMIN_ROLE", "owner"),
            ("STAGEGATE_GAP_POLICY", "deny"),
            ("STAGEGATE_WORKFLOW_NAME", "projects"),
        ]));
        assert_eq!(config.sentinels.super_admin, "owner");
        assert_eq!(config.sentinels.root_admin, "root-admin");
        assert_eq!(config.gap_policy, GapPolicy::Deny);
        assert_eq!(config.workflow_name, "projects");
    }

    #[test]
    fn test_from_lookup_falls_back() {
        let config = ResolverConfig::from_lookup(lookup(&[
            ("STAGEGATE_GAP_POLICY", "sometimes"),
            ("STAGEGATE_WORKFLOW_NAME", "   "),
        ]));
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_from_lookup_rejects_sentinel_clash() {
        let config = ResolverConfig::from_lookup(lookup(&[
            ("STAGEGATE_SUPER_ADMIN_ROLE", "admin"),
            ("STAGEGATE_ROOT_ADMIN_ROLE", "admin"),
            ("STAGEGATE_GAP_POLICY", "deny"),
        ]));
        assert_eq!(config.sentinels, RoleSentinels::default());
        assert_eq!(config.gap_policy, GapPolicy::Deny);
        assert!(config.validate().is_ok());

        // Clashing with the other default is a clash too
        let config = ResolverConfig::from_lookup(lookup(&[("STAGEGATE_SUPER_ADMIN_ROLE", "root-admin")]));
        assert_eq!(config.sentinels, RoleSentinels::default());
    }

    #[test]
    fn test_validate_sentinels() {
        let config = ResolverConfig::default().with_sentinels(RoleSentinels::new("admin", "admin"));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateSentinel("admin".to_string()))
        );

        let config = ResolverConfig::default().with_sentinels(RoleSentinels::new("", "root"));
        assert_eq!(config.validate(), Err(ConfigError::EmptySentinel("super_admin")));
    }

    #[test]
    fn test_validate_workflow_name() {
        let config = ResolverConfig::default().with_workflow_name("");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_gap_policy_serde() {
        let json = serde_json::to_string(&GapPolicy::Deny).unwrap();
        assert_eq!(json, "\"deny\"");
    }
}
