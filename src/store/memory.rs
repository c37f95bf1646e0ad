//! In-memory implementation of the role and rule stores.
//!
//! State lives in a single `tokio::sync::RwLock` so reads proceed
//! concurrently and writes are serialized. Each trait call takes the lock
//! on its own, so an evaluation spanning several calls can observe admin
//! edits that land in between.
//!
//! Used for tests, for the CLI (seeded from configuration), and as the
//! reference semantics for durable backends:
//! - deleting a class cascades to its rules
//! - deleting a role cascades to its assignments
//! - assigning the same role twice is a no-op

use super::{AdminStore, AssignmentStore, PermissionRuleStore, RoleStore};
use crate::access_control::{PermissionRule, RuleDraft};
use crate::error::{StoreError, StoreResult};
use crate::model::{
    NewUser, PermissionClass, PermissionClassId, Role, RoleAssignment, RoleId, User, UserId,
    UserStatus,
};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Debug)]
struct ClassEntry {
    class: PermissionClass,
    rules: Vec<PermissionRule>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    classes: HashMap<PermissionClassId, ClassEntry>,
    roles: HashMap<RoleId, Role>,
    /// Ordered so role lookups are deterministic
    assignments: BTreeSet<(UserId, RoleId)>,
}

impl State {
    fn class_of_rule(&self, rule_id: &str) -> Option<PermissionClassId> {
        self.classes
            .iter()
            .find(|(_, entry)| entry.rules.iter().any(|r| r.id == rule_id))
            .map(|(id, _)| id.clone())
    }
}

/// In-memory store for users, roles, permission classes and rules.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    next_id: AtomicU64,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`] (outage simulation)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is marked unavailable".into(),
            ));
        }
        Ok(())
    }

    fn allocate(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n}")
    }
}

#[async_trait]
impl AssignmentStore for InMemoryStore {
    async fn roles_for_user(&self, user_id: &str) -> StoreResult<Vec<RoleId>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .assignments
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, role)| role.clone())
            .collect())
    }
}

#[async_trait]
impl RoleStore for InMemoryStore {
    async fn permission_class_of(&self, role_id: &str) -> StoreResult<Option<PermissionClassId>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .roles
            .get(role_id)
            .map(|role| role.permission_class_id.clone()))
    }
}

#[async_trait]
impl PermissionRuleStore for InMemoryStore {
    async fn rules_for_class(&self, class_id: &str) -> StoreResult<Option<Vec<PermissionRule>>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.classes.get(class_id).map(|entry| entry.rules.clone()))
    }
}

#[async_trait]
impl AdminStore for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        self.ensure_available()?;
        let user = User {
            id: self.allocate("user"),
            display_name: user.display_name,
            email: user.email,
            phone: user.phone,
            status: UserStatus::Active,
            label: user.label,
        };
        self.state
            .write()
            .await
            .users
            .insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.ensure_available()?;
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.ensure_available()?;
        let mut users: Vec<User> = self.state.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(users)
    }

    async fn set_user_status(&self, user_id: &str, status: UserStatus) -> StoreResult<User> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::not_found("user", user_id))?;
        user.status = status;
        Ok(user.clone())
    }

    async fn insert_class(
        &self,
        name: String,
        description: Option<String>,
    ) -> StoreResult<PermissionClass> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        if state.classes.values().any(|entry| entry.class.name == name) {
            return Err(StoreError::Conflict(format!(
                "permission class '{}' already exists",
                name
            )));
        }
        let class = PermissionClass {
            id: self.allocate("class"),
            name,
            description,
        };
        state.classes.insert(
            class.id.clone(),
            ClassEntry {
                class: class.clone(),
                rules: Vec::new(),
            },
        );
        Ok(class)
    }

    async fn get_class(&self, class_id: &str) -> StoreResult<Option<PermissionClass>> {
        self.ensure_available()?;
        Ok(self
            .state
            .read()
            .await
            .classes
            .get(class_id)
            .map(|entry| entry.class.clone()))
    }

    async fn list_classes(&self) -> StoreResult<Vec<PermissionClass>> {
        self.ensure_available()?;
        let mut classes: Vec<PermissionClass> = self
            .state
            .read()
            .await
            .classes
            .values()
            .map(|entry| entry.class.clone())
            .collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(classes)
    }

    async fn delete_class(&self, class_id: &str) -> StoreResult<()> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        if !state.classes.contains_key(class_id) {
            return Err(StoreError::not_found("permission class", class_id));
        }
        if let Some(role) = state
            .roles
            .values()
            .find(|role| role.permission_class_id == class_id)
        {
            return Err(StoreError::Conflict(format!(
                "permission class '{}' is still used by role '{}'",
                class_id, role.name
            )));
        }
        // Rules live inside the class entry, so they go with it
        state.classes.remove(class_id);
        Ok(())
    }

    async fn insert_rule(&self, class_id: &str, draft: RuleDraft) -> StoreResult<PermissionRule> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let entry = state
            .classes
            .get_mut(class_id)
            .ok_or_else(|| StoreError::not_found("permission class", class_id))?;
        let rule = PermissionRule {
            id: self.allocate("rule"),
            permission_class_id: class_id.to_string(),
            module: draft.module,
            resource: draft.resource,
            grants: draft.grants,
        };
        entry.rules.push(rule.clone());
        Ok(rule)
    }

    async fn replace_rule(&self, rule_id: &str, draft: RuleDraft) -> StoreResult<PermissionRule> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let class_id = state
            .class_of_rule(rule_id)
            .ok_or_else(|| StoreError::not_found("permission rule", rule_id))?;
        let rule = state
            .classes
            .get_mut(&class_id)
            .and_then(|entry| entry.rules.iter_mut().find(|r| r.id == rule_id))
            .ok_or_else(|| StoreError::not_found("permission rule", rule_id))?;
        rule.module = draft.module;
        rule.resource = draft.resource;
        rule.grants = draft.grants;
        Ok(rule.clone())
    }

    async fn delete_rule(&self, rule_id: &str) -> StoreResult<PermissionRule> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let class_id = state
            .class_of_rule(rule_id)
            .ok_or_else(|| StoreError::not_found("permission rule", rule_id))?;
        let entry = state
            .classes
            .get_mut(&class_id)
            .ok_or_else(|| StoreError::not_found("permission class", class_id.as_str()))?;
        let index = entry
            .rules
            .iter()
            .position(|r| r.id == rule_id)
            .ok_or_else(|| StoreError::not_found("permission rule", rule_id))?;
        Ok(entry.rules.remove(index))
    }

    async fn insert_role(
        &self,
        name: String,
        description: Option<String>,
        class_id: &str,
    ) -> StoreResult<Role> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        if !state.classes.contains_key(class_id) {
            return Err(StoreError::not_found("permission class", class_id));
        }
        if state.roles.values().any(|role| role.name == name) {
            return Err(StoreError::Conflict(format!("role '{}' already exists", name)));
        }
        let role = Role {
            id: self.allocate("role"),
            name,
            description,
            permission_class_id: class_id.to_string(),
        };
        state.roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    async fn get_role(&self, role_id: &str) -> StoreResult<Option<Role>> {
        self.ensure_available()?;
        Ok(self.state.read().await.roles.get(role_id).cloned())
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        self.ensure_available()?;
        let mut roles: Vec<Role> = self.state.read().await.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn delete_role(&self, role_id: &str) -> StoreResult<()> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        if state.roles.remove(role_id).is_none() {
            return Err(StoreError::not_found("role", role_id));
        }
        state.assignments.retain(|(_, role)| role != role_id);
        Ok(())
    }

    async fn assign(&self, user_id: &str, role_id: &str) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        if !state.users.contains_key(user_id) {
            return Err(StoreError::not_found("user", user_id));
        }
        if !state.roles.contains_key(role_id) {
            return Err(StoreError::not_found("role", role_id));
        }
        Ok(state
            .assignments
            .insert((user_id.to_string(), role_id.to_string())))
    }

    async fn revoke(&self, user_id: &str, role_id: &str) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        Ok(state
            .assignments
            .remove(&(user_id.to_string(), role_id.to_string())))
    }

    async fn list_assignments(&self, user_id: &str) -> StoreResult<Vec<RoleAssignment>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .assignments
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(user, role)| RoleAssignment::new(user.clone(), role.clone()))
            .collect())
    }
}
