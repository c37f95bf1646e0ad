//! Permission rules and their matching primitives
//!
//! A rule grants some subset of read/create/update/delete on a module,
//! optionally narrowed to one resource inside that module.

use crate::access_control::types::Action;
use crate::model::{PermissionClassId, RuleId};
use serde::{Deserialize, Serialize};

/// Normalize a module or resource name for comparison
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalize an optional resource; blank resources count as absent
pub fn normalize_resource(resource: Option<&str>) -> Option<String> {
    resource.map(normalize).filter(|r| !r.is_empty())
}

/// The four independent grants carried by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleGrants {
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl RuleGrants {
    pub const READ_ONLY: RuleGrants = RuleGrants {
        read: true,
        create: false,
        update: false,
        delete: false,
    };

    pub const FULL: RuleGrants = RuleGrants {
        read: true,
        create: true,
        update: true,
        delete: true,
    };

    /// Apply the write-time policy for stored grants.
    ///
    /// Create always carries update, and a rule with no create, update or
    /// delete grant is at least read-only.
    pub fn normalized(self) -> Self {
        let mut grants = self;
        if grants.create {
            grants.update = true;
        }
        if !grants.create && !grants.update && !grants.delete {
            grants.read = true;
        }
        grants
    }

    /// Check whether these grants satisfy an action.
    ///
    /// `create` is also satisfied by `update`, so rows written outside the
    /// admin console with the two flags out of sync still behave.
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Read => self.read,
            Action::Create => self.create || self.update,
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.read && !self.create && !self.update && !self.delete
    }
}

/// A single stored grant belonging to a permission class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    pub id: RuleId,
    pub permission_class_id: PermissionClassId,
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub grants: RuleGrants,
}

impl PermissionRule {
    /// Check whether this rule applies to an already-normalized module/resource.
    ///
    /// A rule without a resource covers the whole module. A request without
    /// a resource matches every rule of the module.
    pub fn matches_scope(&self, module: &str, resource: Option<&str>) -> bool {
        if normalize(&self.module) != module {
            return false;
        }

        match (resource, normalize_resource(self.resource.as_deref())) {
            (Some(requested), Some(scoped)) => requested == scoped,
            _ => true,
        }
    }

    /// Check whether this rule grants an action
    pub fn allows(&self, action: Action) -> bool {
        self.grants.allows(action)
    }
}

/// Input for creating or editing a rule through the admin console
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleDraft {
    pub module: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub grants: RuleGrants,
}

impl RuleDraft {
    pub fn new(module: impl Into<String>, grants: RuleGrants) -> Self {
        Self {
            module: module.into(),
            resource: None,
            grants,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}
