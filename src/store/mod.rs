//! Storage collaborators for the permission evaluator
//!
//! The evaluator consumes three read-only lookups: role assignments per
//! user, the permission class of a role, and the rules of a class. The
//! admin console writes through [`AdminStore`].

pub mod memory;

pub use memory::InMemoryStore;

use crate::access_control::{PermissionRule, RuleDraft};
use crate::error::StoreResult;
use crate::model::{
    NewUser, PermissionClass, PermissionClassId, Role, RoleAssignment, RoleId, User, UserStatus,
};
// async_trait required for dyn-compatibility with Arc<dyn AuthzStore>
use async_trait::async_trait;

/// Lookup of the roles held by a user
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Role ids assigned to the user. Unknown users have no roles.
    async fn roles_for_user(&self, user_id: &str) -> StoreResult<Vec<RoleId>>;
}

/// Lookup of the permission class behind a role
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// `None` when the role does not exist
    async fn permission_class_of(&self, role_id: &str) -> StoreResult<Option<PermissionClassId>>;
}

/// Lookup of the rules owned by a permission class
#[async_trait]
pub trait PermissionRuleStore: Send + Sync {
    /// `None` when the class does not exist
    async fn rules_for_class(&self, class_id: &str) -> StoreResult<Option<Vec<PermissionRule>>>;
}

/// Everything the evaluator reads
pub trait AuthzStore: AssignmentStore + RoleStore + PermissionRuleStore {}

impl<T> AuthzStore for T where T: AssignmentStore + RoleStore + PermissionRuleStore + ?Sized {}

/// Write side used by the admin console.
///
/// Implementations store drafts as given; grant normalization and catalog
/// checks happen in [`crate::admin::AdminConsole`].
#[async_trait]
pub trait AdminStore: AuthzStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn get_user(&self, user_id: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn set_user_status(&self, user_id: &str, status: UserStatus) -> StoreResult<User>;

    async fn insert_class(
        &self,
        name: String,
        description: Option<String>,
    ) -> StoreResult<PermissionClass>;
    async fn get_class(&self, class_id: &str) -> StoreResult<Option<PermissionClass>>;
    async fn list_classes(&self) -> StoreResult<Vec<PermissionClass>>;
    /// Removes the class together with its rules.
    /// Fails with a conflict while any role still points at the class.
    async fn delete_class(&self, class_id: &str) -> StoreResult<()>;

    async fn insert_rule(&self, class_id: &str, draft: RuleDraft) -> StoreResult<PermissionRule>;
    async fn replace_rule(&self, rule_id: &str, draft: RuleDraft) -> StoreResult<PermissionRule>;
    /// Returns the removed rule
    async fn delete_rule(&self, rule_id: &str) -> StoreResult<PermissionRule>;

    async fn insert_role(
        &self,
        name: String,
        description: Option<String>,
        class_id: &str,
    ) -> StoreResult<Role>;
    async fn get_role(&self, role_id: &str) -> StoreResult<Option<Role>>;
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;
    /// Removes the role together with its assignments
    async fn delete_role(&self, role_id: &str) -> StoreResult<()>;

    /// Returns `false` when the assignment already existed
    async fn assign(&self, user_id: &str, role_id: &str) -> StoreResult<bool>;
    /// Returns `false` when there was nothing to remove
    async fn revoke(&self, user_id: &str, role_id: &str) -> StoreResult<bool>;
    async fn list_assignments(&self, user_id: &str) -> StoreResult<Vec<RoleAssignment>>;
}
