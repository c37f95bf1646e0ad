//! Role → rules cache
//!
//! Caches the result of resolving a role through its permission class.
//! Role assignments are never cached. Entries are dropped explicitly by the
//! admin console on every write that could change a role's rules.
//!
//! Every invalidation advances a generation counter. A resolver reads the
//! generation before its store lookup and passes it to [`RuleCache::insert`],
//! which discards the entry if any invalidation happened in between, so rules
//! read before an admin edit never outlive it.

use crate::access_control::rule::PermissionRule;
use crate::model::{PermissionClassId, RoleId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{trace, warn};

/// Rules resolved for one role
#[derive(Debug, Clone)]
pub struct CachedRole {
    pub class_id: PermissionClassId,
    pub rules: Arc<Vec<PermissionRule>>,
}

/// Bounded, explicitly invalidated role cache
#[derive(Debug)]
pub struct RuleCache {
    max_entries: usize,
    entries: RwLock<HashMap<RoleId, CachedRole>>,
    /// Bumped under the write lock on every invalidation
    generation: AtomicU64,
}

impl RuleCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<RoleId, CachedRole>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("rule cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<RoleId, CachedRole>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("rule cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn get(&self, role_id: &str) -> Option<CachedRole> {
        self.read_entries().get(role_id).cloned()
    }

    /// Current invalidation generation; read it before loading from the store
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store a resolved role loaded at `generation`.
    ///
    /// Returns `false` and stores nothing when an invalidation happened since
    /// that generation was read. A full cache is emptied first.
    pub fn insert(&self, role_id: impl Into<RoleId>, entry: CachedRole, generation: u64) -> bool {
        let mut entries = self.write_entries();
        let role_id = role_id.into();
        if self.generation.load(Ordering::Acquire) != generation {
            trace!(role = %role_id, "rule cache invalidated during load, not caching");
            return false;
        }
        if entries.len() >= self.max_entries && !entries.contains_key(&role_id) {
            trace!(max_entries = self.max_entries, "rule cache full, clearing");
            entries.clear();
        }
        entries.insert(role_id, entry);
        true
    }

    pub fn invalidate_role(&self, role_id: &str) {
        let mut entries = self.write_entries();
        self.bump();
        if entries.remove(role_id).is_some() {
            trace!(role = role_id, "invalidated cached role");
        }
    }

    /// Drop every role that resolved through the given class
    pub fn invalidate_class(&self, class_id: &str) {
        let mut entries = self.write_entries();
        self.bump();
        let before = entries.len();
        entries.retain(|_, cached| cached.class_id != class_id);
        trace!(
            class = class_id,
            dropped = before - entries.len(),
            "invalidated cached class"
        );
    }

    pub fn clear(&self) {
        let mut entries = self.write_entries();
        self.bump();
        entries.clear();
    }

    /// Callers hold the write lock, so an insert sees either the old map
    /// and old generation or the new ones
    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached(class_id: &str) -> CachedRole {
        CachedRole {
            class_id: class_id.to_string(),
            rules: Arc::new(Vec::new()),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = RuleCache::new(8);
        cache.insert("role-1", cached("class-1"), 0);

        assert_eq!(cache.get("role-1").unwrap().class_id, "class-1");
        assert!(cache.get("role-2").is_none());
    }

    #[test]
    fn test_invalidate_class_drops_all_roles_of_class() {
        let cache = RuleCache::new(8);
        cache.insert("role-1", cached("class-1"), 0);
        cache.insert("role-2", cached("class-1"), 0);
        cache.insert("role-3", cached("class-2"), 0);

        cache.invalidate_class("class-1");

        assert!(cache.get("role-1").is_none());
        assert!(cache.get("role-2").is_none());
        assert!(cache.get("role-3").is_some());
    }

    #[test]
    fn test_invalidate_role() {
        let cache = RuleCache::new(8);
        cache.insert("role-1", cached("class-1"), 0);
        cache.invalidate_role("role-1");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_full_cache_is_cleared_before_insert() {
        let cache = RuleCache::new(2);
        cache.insert("role-1", cached("class-1"), 0);
        cache.insert("role-2", cached("class-1"), 0);
        cache.insert("role-3", cached("class-1"), 0);

        assert_eq!(cache.len(), 1);
        assert!(cache.get("role-3").is_some());
    }

    #[test]
    fn test_reinserting_existing_key_does_not_clear() {
        let cache = RuleCache::new(2);
        cache.insert("role-1", cached("class-1"), 0);
        cache.insert("role-2", cached("class-1"), 0);
        cache.insert("role-2", cached("class-2"), 0);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("role-2").unwrap().class_id, "class-2");
    }

    #[test]
    fn test_insert_after_invalidation_is_discarded() {
        let cache = RuleCache::new(8);
        let generation = cache.generation();

        // An admin edit lands while rules are being loaded
        cache.invalidate_class("class-1");

        assert!(!cache.insert("role-1", cached("class-1"), generation));
        assert!(cache.is_empty());

        assert!(cache.insert("role-1", cached("class-1"), cache.generation()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_every_invalidation_advances_generation() {
        let cache = RuleCache::new(8);
        let start = cache.generation();

        cache.invalidate_role("role-404");
        cache.invalidate_class("class-404");
        cache.clear();

        assert_eq!(cache.generation(), start + 3);
    }
}
