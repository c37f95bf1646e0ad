//! Permission evaluator integration tests
//!
//! Covers:
//! - Deny by default (unknown users, users without roles)
//! - Union of grants across roles
//! - Module/resource matching, case and whitespace insensitivity
//! - The create/update coupling for malformed stored rules
//! - Argument validation, storage failures and fail-closed timeouts
//! - Cache behaviour under admin edits, including edits during a check

use async_trait::async_trait;
use estate_authz::access_control::{
    Action, OTHER_MODULE, PermissionCheck, PermissionEvaluator, PermissionRule, RuleCache,
    RuleDraft, RuleGrants,
};
use estate_authz::admin::AdminConsole;
use estate_authz::error::{AuthzError, StoreError, StoreResult};
use estate_authz::model::{NewUser, PermissionClassId, RoleId, User};
use estate_authz::store::{
    AssignmentStore, InMemoryStore, PermissionRuleStore, RoleStore,
};
use rstest::rstest;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

// =============================================================================
// Test Helpers
// =============================================================================

struct Fixture {
    store: Arc<InMemoryStore>,
    console: AdminConsole<InMemoryStore>,
    evaluator: PermissionEvaluator<InMemoryStore>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            console: AdminConsole::new(store.clone()),
            evaluator: PermissionEvaluator::new(store.clone()),
            store,
        }
    }

    fn with_cache() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(RuleCache::new(64));
        Self {
            console: AdminConsole::new(store.clone()).with_cache(Some(cache.clone())),
            evaluator: PermissionEvaluator::new(store.clone()).with_cache(cache),
            store,
        }
    }

    async fn user(&self, name: &str) -> User {
        self.console.create_user(NewUser::named(name)).await.unwrap()
    }

    /// Create a class with the given rules and a role pointing at it
    async fn role(&self, name: &str, rules: Vec<RuleDraft>) -> RoleId {
        let class = self
            .console
            .create_permission_class(&format!("{name} class"), None)
            .await
            .unwrap();
        for rule in rules {
            self.console.add_rule(&class.id, rule).await.unwrap();
        }
        self.console
            .create_role(name, None, &class.id)
            .await
            .unwrap()
            .id
    }

    async fn allowed(&self, user: &User, module: &str, resource: Option<&str>, action: &str) -> bool {
        self.evaluator
            .has_permission(&user.id, module, resource, action)
            .await
            .unwrap()
    }
}

fn grants(read: bool, create: bool, update: bool, delete: bool) -> RuleGrants {
    RuleGrants {
        read,
        create,
        update,
        delete,
    }
}

// =============================================================================
// 1. Deny by default
// =============================================================================

mod deny_by_default {
    use super::*;

    #[rstest]
    #[case("properties", "read")]
    #[case("properties", "create")]
    #[case("leads", "update")]
    #[case("leads", "delete")]
    #[case("documents", "read")]
    #[tokio::test]
    async fn test_user_without_roles_is_denied(#[case] module: &str, #[case] action: &str) {
        let fx = Fixture::new();
        let user = fx.user("Nour").await;
        fx.role(
            "Everything",
            vec![RuleDraft::new(module, RuleGrants::FULL)],
        )
        .await;

        assert!(!fx.allowed(&user, module, None, action).await);
    }

    #[tokio::test]
    async fn test_unknown_user_is_denied_not_an_error() {
        let fx = Fixture::new();
        let result = fx
            .evaluator
            .has_permission("user-does-not-exist", "leads", None, "read")
            .await;
        assert_eq!(result, Ok(false));
    }

    #[tokio::test]
    async fn test_module_without_rules_is_denied() {
        let fx = Fixture::new();
        let user = fx.user("Karim").await;
        let role = fx
            .role("Leads", vec![RuleDraft::new("leads", RuleGrants::FULL)])
            .await;
        fx.console.assign_role(&user.id, &role).await.unwrap();

        assert!(!fx.allowed(&user, "reports", None, "read").await);
    }
}

// =============================================================================
// 2. Marketing scenario and union across roles
// =============================================================================

mod union_of_roles {
    use super::*;

    #[tokio::test]
    async fn test_marketing_manager_scenario() {
        let fx = Fixture::new();
        let class = fx
            .console
            .create_permission_class("Marketing", None)
            .await
            .unwrap();
        fx.console
            .add_rule(
                &class.id,
                RuleDraft::new("leads", grants(true, true, true, false)),
            )
            .await
            .unwrap();
        let role = fx
            .console
            .create_role("Marketing Manager", None, &class.id)
            .await
            .unwrap();
        let user = fx.user("Salma").await;
        fx.console.assign_role(&user.id, &role.id).await.unwrap();

        assert!(fx.allowed(&user, "leads", None, "read").await);
        assert!(fx.allowed(&user, "leads", None, "create").await);
        assert!(fx.allowed(&user, "leads", None, "update").await);
        assert!(!fx.allowed(&user, "leads", None, "delete").await);
        assert!(!fx.allowed(&user, "properties", None, "read").await);
    }

    #[tokio::test]
    async fn test_grants_are_additive_across_roles() {
        let fx = Fixture::new();
        let reader = fx
            .role("Reader", vec![RuleDraft::new("leads", RuleGrants::READ_ONLY)])
            .await;
        let deleter = fx
            .role(
                "Deleter",
                vec![RuleDraft::new("leads", grants(false, false, false, true))],
            )
            .await;
        let user = fx.user("Omar").await;
        fx.console.assign_role(&user.id, &reader).await.unwrap();
        fx.console.assign_role(&user.id, &deleter).await.unwrap();

        assert!(fx.allowed(&user, "leads", None, "read").await);
        assert!(fx.allowed(&user, "leads", None, "delete").await);
        assert!(!fx.allowed(&user, "leads", None, "update").await);
        assert!(!fx.allowed(&user, "leads", None, "create").await);
    }

    #[tokio::test]
    async fn test_a_narrower_role_never_revokes_a_broader_one() {
        let fx = Fixture::new();
        let full = fx
            .role("Full", vec![RuleDraft::new("properties", RuleGrants::FULL)])
            .await;
        let narrow = fx
            .role(
                "Narrow",
                vec![RuleDraft::new("properties", RuleGrants::READ_ONLY).with_resource("unit")],
            )
            .await;
        let user = fx.user("Hana").await;
        fx.console.assign_role(&user.id, &narrow).await.unwrap();
        fx.console.assign_role(&user.id, &full).await.unwrap();

        assert!(fx.allowed(&user, "properties", Some("unit"), "delete").await);
    }

    #[tokio::test]
    async fn test_assigning_twice_does_not_change_output() {
        let fx = Fixture::new();
        let role = fx
            .role("Reader", vec![RuleDraft::new("contacts", RuleGrants::READ_ONLY)])
            .await;
        let user = fx.user("Tarek").await;

        assert!(fx.console.assign_role(&user.id, &role).await.unwrap());
        assert!(!fx.console.assign_role(&user.id, &role).await.unwrap());
        assert_eq!(fx.store.roles_for_user(&user.id).await.unwrap().len(), 1);

        assert!(fx.allowed(&user, "contacts", None, "read").await);

        // A single revoke removes the grant entirely
        assert!(fx.console.revoke_role(&user.id, &role).await.unwrap());
        assert!(!fx.allowed(&user, "contacts", None, "read").await);
    }
}

// =============================================================================
// 3. Module and resource matching
// =============================================================================

mod scope_matching {
    use super::*;

    async fn user_with(fx: &Fixture, rule: RuleDraft) -> User {
        let role = fx.role("Scoped", vec![rule]).await;
        let user = fx.user("Rana").await;
        fx.console.assign_role(&user.id, &role).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_resource_rule_grants_only_its_resource() {
        let fx = Fixture::new();
        let user = user_with(
            &fx,
            RuleDraft::new("properties", RuleGrants::FULL).with_resource("unit"),
        )
        .await;

        for action in ["read", "create", "update", "delete"] {
            assert!(fx.allowed(&user, "properties", Some("unit"), action).await);
            assert!(!fx.allowed(&user, "properties", Some("project"), action).await);
        }
    }

    #[tokio::test]
    async fn test_module_wide_rule_grants_every_resource() {
        let fx = Fixture::new();
        let user = user_with(&fx, RuleDraft::new("properties", RuleGrants::FULL)).await;

        assert!(fx.allowed(&user, "properties", Some("unit"), "delete").await);
        assert!(fx.allowed(&user, "properties", Some("project"), "delete").await);
        assert!(fx.allowed(&user, "properties", None, "delete").await);
    }

    #[tokio::test]
    async fn test_module_only_request_matches_resource_scoped_rule() {
        let fx = Fixture::new();
        let user = user_with(
            &fx,
            RuleDraft::new("primary", RuleGrants::READ_ONLY).with_resource("project"),
        )
        .await;

        assert!(fx.allowed(&user, "primary", None, "read").await);
        assert!(!fx.allowed(&user, "primary", None, "update").await);
    }

    #[rstest]
    #[case(" Properties ", None)]
    #[case("PROPERTIES", Some("Unit"))]
    #[case("properties", Some("  unit  "))]
    #[tokio::test]
    async fn test_case_and_whitespace_insensitive(
        #[case] module: &str,
        #[case] resource: Option<&str>,
    ) {
        let fx = Fixture::new();
        let user = user_with(
            &fx,
            RuleDraft::new("properties", RuleGrants::READ_ONLY).with_resource("unit"),
        )
        .await;

        assert!(fx.allowed(&user, module, resource, "read").await);
    }

    #[tokio::test]
    async fn test_blank_request_resource_is_module_level() {
        let fx = Fixture::new();
        let user = user_with(
            &fx,
            RuleDraft::new("documents", RuleGrants::READ_ONLY).with_resource("share"),
        )
        .await;

        assert!(fx.allowed(&user, "documents", Some("   "), "read").await);
    }
}

// =============================================================================
// 4. Malformed stored rules
// =============================================================================

mod malformed_rules {
    use super::*;

    /// Store returning raw rules exactly as given, bypassing the console
    struct RawStore {
        roles: HashMap<String, Vec<RoleId>>,
        classes: HashMap<RoleId, PermissionClassId>,
        rules: HashMap<PermissionClassId, Vec<PermissionRule>>,
    }

    impl RawStore {
        fn single(grants: RuleGrants) -> Self {
            let rule = PermissionRule {
                id: "rule-1".to_string(),
                permission_class_id: "class-1".to_string(),
                module: "leads".to_string(),
                resource: None,
                grants,
            };
            Self {
                roles: HashMap::from([("u1".to_string(), vec!["role-1".to_string()])]),
                classes: HashMap::from([("role-1".to_string(), "class-1".to_string())]),
                rules: HashMap::from([("class-1".to_string(), vec![rule])]),
            }
        }
    }

    #[async_trait]
    impl AssignmentStore for RawStore {
        async fn roles_for_user(&self, user_id: &str) -> StoreResult<Vec<RoleId>> {
            Ok(self.roles.get(user_id).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl RoleStore for RawStore {
        async fn permission_class_of(
            &self,
            role_id: &str,
        ) -> StoreResult<Option<PermissionClassId>> {
            Ok(self.classes.get(role_id).cloned())
        }
    }

    #[async_trait]
    impl PermissionRuleStore for RawStore {
        async fn rules_for_class(
            &self,
            class_id: &str,
        ) -> StoreResult<Option<Vec<PermissionRule>>> {
            Ok(self.rules.get(class_id).cloned())
        }
    }

    #[rstest]
    #[case(Action::Read)]
    #[case(Action::Create)]
    #[case(Action::Update)]
    #[case(Action::Delete)]
    #[tokio::test]
    async fn test_rule_granting_nothing_allows_nothing(#[case] action: Action) {
        let evaluator = PermissionEvaluator::new(Arc::new(RawStore::single(RuleGrants::default())));
        let check = PermissionCheck::new("leads", action);
        assert!(!evaluator.check("u1", &check).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_without_update_still_grants_create() {
        let evaluator = PermissionEvaluator::new(Arc::new(RawStore::single(grants(
            false, true, false, false,
        ))));

        assert!(
            evaluator
                .has_permission("u1", "leads", None, "create")
                .await
                .unwrap()
        );
        assert!(
            !evaluator
                .has_permission("u1", "leads", None, "update")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_alone_satisfies_create() {
        let evaluator = PermissionEvaluator::new(Arc::new(RawStore::single(grants(
            false, false, true, false,
        ))));

        assert!(
            evaluator
                .has_permission("u1", "leads", None, "create")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_role_with_missing_class_is_skipped() {
        let mut store = RawStore::single(RuleGrants::FULL);
        store
            .roles
            .insert("u1".to_string(), vec!["role-orphan".to_string(), "role-1".to_string()]);
        store
            .classes
            .insert("role-orphan".to_string(), "class-gone".to_string());
        let evaluator = PermissionEvaluator::new(Arc::new(store));

        assert!(
            evaluator
                .has_permission("u1", "leads", None, "delete")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_dangling_role_reference_is_skipped() {
        let mut store = RawStore::single(RuleGrants::FULL);
        store
            .roles
            .insert("u2".to_string(), vec!["role-deleted".to_string()]);
        let evaluator = PermissionEvaluator::new(Arc::new(store));

        assert!(
            !evaluator
                .has_permission("u2", "leads", None, "read")
                .await
                .unwrap()
        );
    }
}

// =============================================================================
// 5. Errors and timeouts
// =============================================================================

mod errors {
    use super::*;

    #[rstest]
    #[case("publish")]
    #[case("")]
    #[case("readwrite")]
    #[tokio::test]
    async fn test_invalid_action_is_rejected(#[case] action: &str) {
        let fx = Fixture::new();
        // Even an unavailable store is never consulted
        fx.store.set_unavailable(true);

        let err = fx
            .evaluator
            .has_permission("user-1", "leads", None, action)
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn test_empty_module_is_rejected(#[case] module: &str) {
        let fx = Fixture::new();
        fx.store.set_unavailable(true);

        let err = fx
            .evaluator
            .has_permission("user-1", module, None, "read")
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let fx = Fixture::new();
        let user = fx.user("Laila").await;
        fx.store.set_unavailable(true);

        let err = fx
            .evaluator
            .has_permission(&user.id, "leads", None, "read")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthzError::StorageUnavailable(StoreError::Unavailable(_))
        ));

        let snapshot = fx.evaluator.metrics().snapshot();
        assert_eq!(snapshot.storage_errors, 1);
    }

    /// Store whose assignment lookup never completes in time
    struct StallingStore;

    #[async_trait]
    impl AssignmentStore for StallingStore {
        async fn roles_for_user(&self, _user_id: &str) -> StoreResult<Vec<RoleId>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec!["role-1".to_string()])
        }
    }

    #[async_trait]
    impl RoleStore for StallingStore {
        async fn permission_class_of(&self, _: &str) -> StoreResult<Option<PermissionClassId>> {
            Ok(Some("class-1".to_string()))
        }
    }

    #[async_trait]
    impl PermissionRuleStore for StallingStore {
        async fn rules_for_class(&self, _: &str) -> StoreResult<Option<Vec<PermissionRule>>> {
            Ok(Some(vec![PermissionRule {
                id: "rule-1".to_string(),
                permission_class_id: "class-1".to_string(),
                module: "leads".to_string(),
                resource: None,
                grants: RuleGrants::FULL,
            }]))
        }
    }

    #[tokio::test]
    async fn test_timeout_fails_closed() {
        let evaluator = PermissionEvaluator::new(Arc::new(StallingStore))
            .with_timeout(Duration::from_millis(50));
        let check = PermissionCheck::new("leads", Action::Read);

        let allowed = evaluator.check_with_deadline("u1", &check).await.unwrap();
        assert!(!allowed);

        let snapshot = evaluator.metrics().snapshot();
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.granted, 0);
    }
}

// =============================================================================
// 6. Cache and admin edits
// =============================================================================

mod cache_invalidation {
    use super::*;

    #[tokio::test]
    async fn test_rule_edit_is_visible_immediately() {
        let fx = Fixture::with_cache();
        let class = fx
            .console
            .create_permission_class("Agents", None)
            .await
            .unwrap();
        let rule = fx
            .console
            .add_rule(&class.id, RuleDraft::new("leads", RuleGrants::READ_ONLY))
            .await
            .unwrap();
        let role = fx
            .console
            .create_role("Agent", None, &class.id)
            .await
            .unwrap();
        let user = fx.user("Youssef").await;
        fx.console.assign_role(&user.id, &role.id).await.unwrap();

        assert!(fx.allowed(&user, "leads", None, "read").await);
        assert!(!fx.allowed(&user, "leads", None, "delete").await);
        assert_eq!(fx.evaluator.cache().unwrap().len(), 1);

        fx.console
            .update_rule(&rule.id, RuleDraft::new("leads", RuleGrants::FULL))
            .await
            .unwrap();
        assert!(fx.allowed(&user, "leads", None, "delete").await);

        fx.console.remove_rule(&rule.id).await.unwrap();
        assert!(!fx.allowed(&user, "leads", None, "read").await);
    }

    #[tokio::test]
    async fn test_cache_hits_are_counted() {
        let fx = Fixture::with_cache();
        let role = fx
            .role("Reader", vec![RuleDraft::new("reports", RuleGrants::READ_ONLY)])
            .await;
        let user = fx.user("Dina").await;
        fx.console.assign_role(&user.id, &role).await.unwrap();

        assert!(fx.allowed(&user, "reports", None, "read").await);
        assert!(fx.allowed(&user, "reports", None, "read").await);

        let snapshot = fx.evaluator.metrics().snapshot();
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.cache_hits, 1);
    }

    #[tokio::test]
    async fn test_deleted_role_stops_granting() {
        let fx = Fixture::with_cache();
        let role = fx
            .role("Temp", vec![RuleDraft::new("leads", RuleGrants::FULL)])
            .await;
        let user = fx.user("Aya").await;
        fx.console.assign_role(&user.id, &role).await.unwrap();
        assert!(fx.allowed(&user, "leads", None, "read").await);

        fx.console.delete_role(&role).await.unwrap();
        assert!(!fx.allowed(&user, "leads", None, "read").await);
    }

    /// Wraps the in-memory store and can hold one rule read open after the
    /// rules have been loaded
    struct PausingStore {
        inner: Arc<InMemoryStore>,
        armed: AtomicBool,
        loaded: Notify,
        resume: Notify,
    }

    impl PausingStore {
        fn new(inner: Arc<InMemoryStore>) -> Self {
            Self {
                inner,
                armed: AtomicBool::new(false),
                loaded: Notify::new(),
                resume: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl AssignmentStore for PausingStore {
        async fn roles_for_user(&self, user_id: &str) -> StoreResult<Vec<RoleId>> {
            self.inner.roles_for_user(user_id).await
        }
    }

    #[async_trait]
    impl RoleStore for PausingStore {
        async fn permission_class_of(
            &self,
            role_id: &str,
        ) -> StoreResult<Option<PermissionClassId>> {
            self.inner.permission_class_of(role_id).await
        }
    }

    #[async_trait]
    impl PermissionRuleStore for PausingStore {
        async fn rules_for_class(
            &self,
            class_id: &str,
        ) -> StoreResult<Option<Vec<PermissionRule>>> {
            let rules = self.inner.rules_for_class(class_id).await;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.loaded.notify_one();
                self.resume.notified().await;
            }
            rules
        }
    }

    #[tokio::test]
    async fn test_rule_removed_during_check_is_not_cached() {
        let inner = Arc::new(InMemoryStore::new());
        let cache = Arc::new(RuleCache::new(64));
        let console = AdminConsole::new(inner.clone()).with_cache(Some(cache.clone()));
        let store = Arc::new(PausingStore::new(inner));
        let evaluator = PermissionEvaluator::new(store.clone()).with_cache(cache.clone());

        let class = console
            .create_permission_class("Agents", None)
            .await
            .unwrap();
        let rule = console
            .add_rule(&class.id, RuleDraft::new("leads", RuleGrants::FULL))
            .await
            .unwrap();
        let role = console.create_role("Agent", None, &class.id).await.unwrap();
        let user = console.create_user(NewUser::named("Ziad")).await.unwrap();
        console.assign_role(&user.id, &role.id).await.unwrap();

        store.armed.store(true, Ordering::SeqCst);
        let in_flight = tokio::spawn({
            let evaluator = evaluator.clone();
            let user_id = user.id.clone();
            async move {
                evaluator
                    .has_permission(&user_id, "leads", None, "read")
                    .await
                    .unwrap()
            }
        });

        // The check holds the old rules; remove the rule before it resumes
        store.loaded.notified().await;
        console.remove_rule(&rule.id).await.unwrap();
        store.resume.notify_one();

        // The in-flight answer may use the rules it already read
        in_flight.await.unwrap();

        assert!(cache.is_empty());
        for _ in 0..3 {
            assert!(
                !evaluator
                    .has_permission(&user.id, "leads", None, "read")
                    .await
                    .unwrap()
            );
        }
    }
}

// =============================================================================
// 7. Explain and concurrency
// =============================================================================

mod explain {
    use super::*;

    #[tokio::test]
    async fn test_explain_names_the_granting_rule() {
        let fx = Fixture::new();
        let reader = fx
            .role("Reader", vec![RuleDraft::new("leads", RuleGrants::READ_ONLY)])
            .await;
        let user = fx.user("Mariam").await;
        fx.console.assign_role(&user.id, &reader).await.unwrap();

        let check = PermissionCheck::new("leads", Action::Read);
        let source = fx.evaluator.explain(&user.id, &check).await.unwrap().unwrap();
        assert_eq!(source.role_id, reader);
        assert_eq!(source.module, "leads");

        let check = PermissionCheck::new("leads", Action::Delete);
        assert!(fx.evaluator.explain(&user.id, &check).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_checks_agree() {
        let fx = Fixture::new();
        let role = fx
            .role(
                "Managers",
                vec![RuleDraft::new("management", grants(true, false, true, false))],
            )
            .await;
        let user = fx.user("Sherif").await;
        fx.console.assign_role(&user.id, &role).await.unwrap();

        let checks = (0..32).map(|i| {
            let action = if i % 2 == 0 { "read" } else { "delete" };
            let evaluator = fx.evaluator.clone();
            let user_id = user.id.clone();
            async move {
                (
                    action,
                    evaluator
                        .has_permission(&user_id, "management", None, action)
                        .await
                        .unwrap(),
                )
            }
        });

        for (action, allowed) in futures::future::join_all(checks).await {
            assert_eq!(allowed, action == "read");
        }
        assert_eq!(fx.evaluator.metrics().snapshot().checks, 32);
    }

    #[tokio::test]
    async fn test_module_stats_stay_bounded_for_arbitrary_input() {
        let fx = Fixture::new();

        for i in 0..1_000 {
            let module = format!("mod-{i}");
            assert!(
                !fx.evaluator
                    .has_permission("nobody", &module, None, "read")
                    .await
                    .unwrap()
            );
        }
        fx.evaluator
            .has_permission("nobody", "  ", None, "read")
            .await
            .unwrap_err();
        fx.evaluator
            .has_permission("nobody", "Leads", None, "read")
            .await
            .unwrap();

        let snapshot = fx.evaluator.metrics().snapshot();
        assert_eq!(snapshot.checks, 1_002);
        assert_eq!(snapshot.invalid_arguments, 1);

        let modules: Vec<&str> = snapshot.modules.iter().map(|m| m.module.as_str()).collect();
        assert_eq!(modules, vec![OTHER_MODULE, "leads"]);
        assert_eq!(snapshot.modules[0].checks, 1_000);
    }
}
