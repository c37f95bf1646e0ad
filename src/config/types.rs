//! Configuration types for estate-authz
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::access_control::{RuleDraft, RuleGrants};
use crate::model::{AccountLabel, UserStatus};
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Permission evaluator settings
    pub evaluator: EvaluatorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Declarative policy seeded into the in-memory store
    pub policy: PolicyConfig,
}

/// Permission evaluator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Fail-closed deadline for a single check, in milliseconds
    pub timeout_ms: u64,

    /// Number of recent decisions kept for auditing
    pub recent_decisions: usize,

    /// Role → rules cache
    pub cache: CacheConfig,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            recent_decisions: 100,
            cache: CacheConfig::default(),
        }
    }
}

impl EvaluatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Rule cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache resolved role rules (disabled by default)
    pub enabled: bool,

    /// Maximum number of cached roles
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: 1_024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

/// Declarative policy: classes, roles, users and their assignments.
///
/// Entries reference each other by name.
///
/// ```toml
/// [[policy.classes]]
/// name = "Marketing"
///
/// [[policy.classes.rules]]
/// module = "leads"
/// read = true
/// create = true
///
/// [[policy.roles]]
/// name = "Marketing Manager"
/// class = "Marketing"
///
/// [[policy.users]]
/// name = "Salma"
///
/// [[policy.assignments]]
/// user = "Salma"
/// role = "Marketing Manager"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub classes: Vec<ClassConfig>,
    pub roles: Vec<RoleConfig>,
    pub users: Vec<UserConfig>,
    pub assignments: Vec<AssignmentConfig>,
}

impl PolicyConfig {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.roles.is_empty()
            && self.users.is_empty()
            && self.assignments.is_empty()
    }
}

/// Permission class with its rules
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassConfig {
    pub name: String,
    pub description: Option<String>,
    pub rules: Vec<RuleConfig>,
}

/// A single rule; omitted grants are false
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub module: String,
    pub resource: Option<String>,
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl RuleConfig {
    pub fn to_draft(&self) -> RuleDraft {
        RuleDraft {
            module: self.module.clone(),
            resource: self.resource.clone(),
            grants: RuleGrants {
                read: self.read,
                create: self.create,
                update: self.update,
                delete: self.delete,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    pub name: String,
    pub description: Option<String>,
    /// Name of the permission class
    pub class: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Display name, also used as the key in assignments
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub label: AccountLabel,
    pub status: UserStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    pub user: String,
    pub role: String,
}
