//! Permission evaluator
//!
//! Resolves whether a user may perform an action on a module (and optional
//! resource):
//! 1. Load the user's role assignments (none → deny)
//! 2. Resolve each role to its permission class and the class's rules
//!    (missing roles or classes are skipped)
//! 3. Keep rules whose module matches; when both the request and the rule
//!    name a resource, they must match too
//! 4. Grant as soon as any kept rule allows the action
//!
//! Grants are a union across roles. There are no deny rules.

use crate::access_control::cache::{CachedRole, RuleCache};
use crate::access_control::metrics::{EvaluatorMetrics, Outcome};
use crate::access_control::rule::{normalize, normalize_resource};
use crate::access_control::types::{Action, PermissionCheck};
use crate::config::EvaluatorConfig;
use crate::error::{AuthzError, AuthzResult};
use crate::model::{PermissionClassId, RoleId, RuleId};
use crate::store::AuthzStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Default fail-closed deadline for [`PermissionEvaluator::check_with_deadline`]
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// The role, class and rule that satisfied a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantSource {
    pub role_id: RoleId,
    pub permission_class_id: PermissionClassId,
    pub rule_id: RuleId,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

/// Permission evaluator over the role/rule stores
///
/// Stateless apart from the optional rule cache and metrics, and safe to
/// share across concurrent request handlers.
pub struct PermissionEvaluator<S: AuthzStore + ?Sized> {
    store: Arc<S>,
    cache: Option<Arc<RuleCache>>,
    metrics: Arc<EvaluatorMetrics>,
    timeout: Duration,
}

impl<S: AuthzStore + ?Sized> Clone for PermissionEvaluator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
            metrics: Arc::clone(&self.metrics),
            timeout: self.timeout,
        }
    }
}

impl<S: AuthzStore + ?Sized> PermissionEvaluator<S> {
    /// Create an evaluator without a cache
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cache: None,
            metrics: Arc::new(EvaluatorMetrics::new()),
            timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    /// Create an evaluator from configuration
    pub fn from_config(store: Arc<S>, config: &EvaluatorConfig) -> Self {
        let evaluator = Self::new(store)
            .with_metrics(Arc::new(EvaluatorMetrics::with_capacity(
                config.recent_decisions,
            )))
            .with_timeout(config.timeout());

        if config.cache.enabled {
            evaluator.with_cache(Arc::new(RuleCache::new(config.cache.max_entries)))
        } else {
            evaluator
        }
    }

    pub fn with_cache(mut self, cache: Arc<RuleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<EvaluatorMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> Option<&Arc<RuleCache>> {
        self.cache.as_ref()
    }

    pub fn metrics(&self) -> &Arc<EvaluatorMetrics> {
        &self.metrics
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check a permission from raw request strings.
    ///
    /// Fails with [`AuthzError::InvalidArgument`] for an unknown action or
    /// an empty module, before any store lookup.
    pub async fn has_permission(
        &self,
        user_id: &str,
        module: &str,
        resource: Option<&str>,
        action: &str,
    ) -> AuthzResult<bool> {
        let check = PermissionCheck::parse(module, resource, action)
            .inspect_err(|_| self.metrics.record_invalid_argument())?;
        self.check(user_id, &check).await
    }

    /// Check a typed permission request
    pub async fn check(&self, user_id: &str, check: &PermissionCheck) -> AuthzResult<bool> {
        Ok(self.explain(user_id, check).await?.is_some())
    }

    /// Check a permission, returning which grant satisfied it
    pub async fn explain(
        &self,
        user_id: &str,
        check: &PermissionCheck,
    ) -> AuthzResult<Option<GrantSource>> {
        let started = Instant::now();
        let result = self.evaluate(user_id, check).await;

        let outcome = match &result {
            Ok(Some(_)) => Outcome::Granted,
            Ok(None) => Outcome::Denied,
            Err(AuthzError::InvalidArgument(_)) => Outcome::InvalidArgument,
            Err(AuthzError::StorageUnavailable(_)) => Outcome::StorageError,
        };
        self.metrics.record(
            user_id,
            &normalize(&check.module),
            check.resource.as_deref(),
            check.action,
            outcome,
            started.elapsed(),
        );

        result
    }

    /// Check a permission under a deadline.
    ///
    /// An elapsed deadline is a deny (`Ok(false)`), never a grant.
    pub async fn check_within(
        &self,
        user_id: &str,
        check: &PermissionCheck,
        timeout: Duration,
    ) -> AuthzResult<bool> {
        Ok(self.explain_within(user_id, check, timeout).await?.is_some())
    }

    /// [`explain`](Self::explain) under a deadline, denying when it elapses
    pub async fn explain_within(
        &self,
        user_id: &str,
        check: &PermissionCheck,
        timeout: Duration,
    ) -> AuthzResult<Option<GrantSource>> {
        let started = Instant::now();
        match tokio::time::timeout(timeout, self.explain(user_id, check)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    user = user_id,
                    check = %check,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "Permission check timed out, denying"
                );
                self.metrics.record(
                    user_id,
                    &normalize(&check.module),
                    check.resource.as_deref(),
                    check.action,
                    Outcome::TimedOut,
                    started.elapsed(),
                );
                Ok(None)
            }
        }
    }

    /// [`check_within`](Self::check_within) using the configured timeout
    pub async fn check_with_deadline(
        &self,
        user_id: &str,
        check: &PermissionCheck,
    ) -> AuthzResult<bool> {
        self.check_within(user_id, check, self.timeout).await
    }

    async fn evaluate(
        &self,
        user_id: &str,
        check: &PermissionCheck,
    ) -> AuthzResult<Option<GrantSource>> {
        let module = normalize(&check.module);
        if module.is_empty() {
            return Err(AuthzError::invalid("module must not be empty"));
        }
        let resource = normalize_resource(check.resource.as_deref());

        debug!(
            user = user_id,
            module = %module,
            resource = ?resource,
            action = %check.action,
            "Checking permission"
        );

        let roles = self.store.roles_for_user(user_id).await?;
        if roles.is_empty() {
            debug!(user = user_id, "No role assignments");
            return Ok(None);
        }

        for role_id in &roles {
            let Some(resolved) = self.resolve_role(role_id).await? else {
                continue;
            };

            if let Some(source) =
                find_grant(role_id, &resolved, &module, resource.as_deref(), check.action)
            {
                trace!(
                    role = %source.role_id,
                    rule = %source.rule_id,
                    "Matched granting rule"
                );
                return Ok(Some(source));
            }
        }

        Ok(None)
    }

    /// Resolve role → class → rules, going through the cache when present
    async fn resolve_role(&self, role_id: &str) -> AuthzResult<Option<CachedRole>> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(role_id) {
                self.metrics.record_cache_hit();
                return Ok(Some(hit));
            }
            self.metrics.record_cache_miss();
        }
        // Read before the store so an edit during the load voids the insert
        let generation = self.cache.as_ref().map(|cache| cache.generation());

        let Some(class_id) = self.store.permission_class_of(role_id).await? else {
            debug!(role = role_id, "Role not found, skipping");
            return Ok(None);
        };

        let Some(rules) = self.store.rules_for_class(&class_id).await? else {
            debug!(
                role = role_id,
                class = %class_id,
                "Permission class not found, skipping"
            );
            return Ok(None);
        };

        let resolved = CachedRole {
            class_id,
            rules: Arc::new(rules),
        };
        if let (Some(cache), Some(generation)) = (&self.cache, generation) {
            if !cache.insert(role_id, resolved.clone(), generation) {
                debug!(role = role_id, "Rules changed during load, not cached");
            }
        }
        Ok(Some(resolved))
    }
}

fn find_grant(
    role_id: &str,
    resolved: &CachedRole,
    module: &str,
    resource: Option<&str>,
    action: Action,
) -> Option<GrantSource> {
    resolved
        .rules
        .iter()
        .filter(|rule| rule.matches_scope(module, resource))
        .find(|rule| rule.allows(action))
        .map(|rule| GrantSource {
            role_id: role_id.to_string(),
            permission_class_id: resolved.class_id.clone(),
            rule_id: rule.id.clone(),
            module: rule.module.clone(),
            resource: rule.resource.clone(),
        })
}
