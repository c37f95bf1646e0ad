//! Admin console write boundary
//!
//! All edits to users, roles, permission classes and rules go through here.
//! Rule drafts are checked against the module catalog and their grants are
//! normalized before they reach the store, and every write drops the cache
//! entries it could have made stale.

use crate::access_control::{ModuleKind, PermissionRule, RuleCache, RuleDraft};
use crate::error::{AdminError, AdminResult};
use crate::model::{NewUser, PermissionClass, Role, User, UserStatus};
use crate::store::AdminStore;
use std::sync::Arc;
use tracing::info;

pub struct AdminConsole<S: AdminStore + ?Sized> {
    store: Arc<S>,
    cache: Option<Arc<RuleCache>>,
}

impl<S: AdminStore + ?Sized> AdminConsole<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, cache: None }
    }

    /// Attach the evaluator's cache so edits invalidate it
    pub fn with_cache(mut self, cache: Option<Arc<RuleCache>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn create_user(&self, user: NewUser) -> AdminResult<User> {
        let display_name = required("display name", &user.display_name)?;
        let user = self
            .store
            .insert_user(NewUser {
                display_name,
                ..user
            })
            .await?;
        info!(user = %user.id, name = %user.display_name, "Created user");
        Ok(user)
    }

    pub async fn set_user_status(&self, user_id: &str, status: UserStatus) -> AdminResult<User> {
        let user = self.store.set_user_status(user_id, status).await?;
        info!(user = user_id, status = %status, "Updated user status");
        Ok(user)
    }

    pub async fn create_permission_class(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> AdminResult<PermissionClass> {
        let name = required("permission class name", name)?;
        let class = self
            .store
            .insert_class(name, optional(description))
            .await?;
        info!(class = %class.id, name = %class.name, "Created permission class");
        Ok(class)
    }

    /// Delete a class and its rules
    pub async fn delete_permission_class(&self, class_id: &str) -> AdminResult<()> {
        self.store.delete_class(class_id).await?;
        self.invalidate_class(class_id);
        info!(class = class_id, "Deleted permission class");
        Ok(())
    }

    pub async fn add_rule(&self, class_id: &str, draft: RuleDraft) -> AdminResult<PermissionRule> {
        let draft = prepare_draft(draft)?;
        let rule = self.store.insert_rule(class_id, draft).await?;
        self.invalidate_class(class_id);
        info!(
            class = class_id,
            rule = %rule.id,
            module = %rule.module,
            resource = ?rule.resource,
            grants = ?rule.grants,
            "Added permission rule"
        );
        Ok(rule)
    }

    pub async fn update_rule(&self, rule_id: &str, draft: RuleDraft) -> AdminResult<PermissionRule> {
        let draft = prepare_draft(draft)?;
        let rule = self.store.replace_rule(rule_id, draft).await?;
        self.invalidate_class(&rule.permission_class_id);
        info!(
            class = %rule.permission_class_id,
            rule = rule_id,
            grants = ?rule.grants,
            "Updated permission rule"
        );
        Ok(rule)
    }

    pub async fn remove_rule(&self, rule_id: &str) -> AdminResult<PermissionRule> {
        let rule = self.store.delete_rule(rule_id).await?;
        self.invalidate_class(&rule.permission_class_id);
        info!(class = %rule.permission_class_id, rule = rule_id, "Removed permission rule");
        Ok(rule)
    }

    pub async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        class_id: &str,
    ) -> AdminResult<Role> {
        let name = required("role name", name)?;
        if self.store.get_class(class_id).await?.is_none() {
            return Err(AdminError::not_found("permission class", class_id));
        }
        let role = self
            .store
            .insert_role(name, optional(description), class_id)
            .await?;
        info!(role = %role.id, name = %role.name, class = class_id, "Created role");
        Ok(role)
    }

    /// Delete a role and all of its assignments
    pub async fn delete_role(&self, role_id: &str) -> AdminResult<()> {
        self.store.delete_role(role_id).await?;
        if let Some(cache) = &self.cache {
            cache.invalidate_role(role_id);
        }
        info!(role = role_id, "Deleted role");
        Ok(())
    }

    /// Assign a role to a user. Assigning twice is not an error.
    ///
    /// Returns `false` when the user already held the role.
    pub async fn assign_role(&self, user_id: &str, role_id: &str) -> AdminResult<bool> {
        let added = self.store.assign(user_id, role_id).await?;
        info!(user = user_id, role = role_id, added, "Assigned role");
        Ok(added)
    }

    pub async fn revoke_role(&self, user_id: &str, role_id: &str) -> AdminResult<bool> {
        let removed = self.store.revoke(user_id, role_id).await?;
        info!(user = user_id, role = role_id, removed, "Revoked role");
        Ok(removed)
    }

    fn invalidate_class(&self, class_id: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate_class(class_id);
        }
    }
}

/// Validate a rule draft and normalize it for storage.
///
/// The module must be in the catalog and is stored in canonical form. A
/// blank resource becomes a module-wide rule.
pub fn prepare_draft(draft: RuleDraft) -> AdminResult<RuleDraft> {
    let module = ModuleKind::try_parse(&draft.module).ok_or_else(|| {
        if draft.module.trim().is_empty() {
            AdminError::invalid("rule module is required")
        } else {
            AdminError::invalid(format!("unknown module '{}'", draft.module.trim()))
        }
    })?;

    let resource = draft
        .resource
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    Ok(RuleDraft {
        module: module.as_str().to_string(),
        resource,
        grants: draft.grants.normalized(),
    })
}

fn required(field: &str, value: &str) -> AdminResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AdminError::invalid(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
