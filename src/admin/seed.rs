//! Seeding a declarative policy through the admin console
//!
//! Configured classes, roles, users and assignments are applied in
//! dependency order, so seeded data obeys the same rule invariants as
//! console edits.

use crate::admin::console::AdminConsole;
use crate::config::PolicyConfig;
use crate::error::AdminResult;
use crate::model::{NewUser, PermissionClassId, RoleId, UserId, UserStatus};
use crate::store::AdminStore;
use std::collections::HashMap;
use tracing::info;

/// Name → id maps for everything a policy created
#[derive(Debug, Clone, Default)]
pub struct SeededPolicy {
    pub classes: HashMap<String, PermissionClassId>,
    pub roles: HashMap<String, RoleId>,
    pub users: HashMap<String, UserId>,
    pub rules: usize,
    pub assignments: usize,
}

impl SeededPolicy {
    /// Resolve a user given either its configured name or its id
    pub fn resolve_user<'a>(&'a self, key: &'a str) -> &'a str {
        self.users.get(key).map(String::as_str).unwrap_or(key)
    }
}

pub async fn apply_policy<S: AdminStore + ?Sized>(
    console: &AdminConsole<S>,
    policy: &PolicyConfig,
) -> AdminResult<SeededPolicy> {
    let mut seeded = SeededPolicy::default();

    for class_config in &policy.classes {
        let class = console
            .create_permission_class(&class_config.name, class_config.description.as_deref())
            .await?;
        for rule in &class_config.rules {
            console.add_rule(&class.id, rule.to_draft()).await?;
            seeded.rules += 1;
        }
        seeded.classes.insert(class_config.name.trim().to_string(), class.id);
    }

    for role_config in &policy.roles {
        let class_id = seeded
            .classes
            .get(role_config.class.trim())
            .map(String::as_str)
            .unwrap_or(role_config.class.as_str());
        let role = console
            .create_role(&role_config.name, role_config.description.as_deref(), class_id)
            .await?;
        seeded.roles.insert(role_config.name.trim().to_string(), role.id);
    }

    for user_config in &policy.users {
        let user = console
            .create_user(NewUser {
                display_name: user_config.name.clone(),
                email: user_config.email.clone(),
                phone: user_config.phone.clone(),
                label: user_config.label,
            })
            .await?;
        if user_config.status != UserStatus::Active {
            console.set_user_status(&user.id, user_config.status).await?;
        }
        seeded.users.insert(user_config.name.trim().to_string(), user.id);
    }

    for assignment in &policy.assignments {
        let user_id = seeded.resolve_user(assignment.user.trim()).to_string();
        let role_id = seeded
            .roles
            .get(assignment.role.trim())
            .cloned()
            .unwrap_or_else(|| assignment.role.clone());
        if console.assign_role(&user_id, &role_id).await? {
            seeded.assignments += 1;
        }
    }

    info!(
        classes = seeded.classes.len(),
        rules = seeded.rules,
        roles = seeded.roles.len(),
        users = seeded.users.len(),
        assignments = seeded.assignments,
        "Seeded policy"
    );

    Ok(seeded)
}
