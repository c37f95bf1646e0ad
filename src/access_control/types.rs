//! Access control types
//!
//! Core types used by the permission evaluator.

use crate::error::AuthzError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Functional area of the CRM that rules are keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Dashboard,
    Properties,
    Leads,
    Opportunities,
    Primary,
    Contacts,
    Documents,
    Reports,
    Management,
    Organization,
    Administration,
}

impl ModuleKind {
    /// Get the module name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Dashboard => "dashboard",
            ModuleKind::Properties => "properties",
            ModuleKind::Leads => "leads",
            ModuleKind::Opportunities => "opportunities",
            ModuleKind::Primary => "primary",
            ModuleKind::Contacts => "contacts",
            ModuleKind::Documents => "documents",
            ModuleKind::Reports => "reports",
            ModuleKind::Management => "management",
            ModuleKind::Organization => "organization",
            ModuleKind::Administration => "administration",
        }
    }

    /// Try to parse a module from a string (trimmed, case-insensitive)
    pub fn try_parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|module| module.as_str() == normalized)
    }

    /// Get all modules in the catalog
    pub fn all() -> &'static [ModuleKind] {
        &[
            ModuleKind::Dashboard,
            ModuleKind::Properties,
            ModuleKind::Leads,
            ModuleKind::Opportunities,
            ModuleKind::Primary,
            ModuleKind::Contacts,
            ModuleKind::Documents,
            ModuleKind::Reports,
            ModuleKind::Management,
            ModuleKind::Organization,
            ModuleKind::Administration,
        ]
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action requested against a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Check if this action is read-only
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Action::Read)
    }

    /// Get the action name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    pub fn all() -> &'static [Action] {
        &[Action::Read, Action::Create, Action::Update, Action::Delete]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Action::Read),
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            _ => Err(AuthzError::invalid(format!(
                "unknown action '{}', expected one of read, create, update, delete",
                s
            ))),
        }
    }
}

/// A single permission request: module, optional resource and action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub action: Action,
}

impl PermissionCheck {
    pub fn new(module: impl Into<String>, action: Action) -> Self {
        Self {
            module: module.into(),
            resource: None,
            action,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Build a check from raw request strings, rejecting a malformed action
    pub fn parse(module: &str, resource: Option<&str>, action: &str) -> Result<Self, AuthzError> {
        Ok(Self {
            module: module.to_string(),
            resource: resource.map(str::to_string),
            action: action.parse()?,
        })
    }
}

impl fmt::Display for PermissionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}:{}.{}", self.action, self.module, resource),
            None => write!(f, "{}:{}", self.action, self.module),
        }
    }
}
