//! Decision metrics for the permission evaluator
//!
//! Thread-safe counters for checks, outcomes and cache usage, plus a
//! bounded log of recent decisions for auditing.

use crate::access_control::types::{Action, ModuleKind};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime};

/// How a single check ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Granted,
    Denied,
    InvalidArgument,
    StorageError,
    TimedOut,
}

/// Per-module stats for names outside the catalog
pub const OTHER_MODULE: &str = "other";

/// Evaluator metrics collector
pub struct EvaluatorMetrics {
    checks: AtomicU64,
    granted: AtomicU64,
    denied: AtomicU64,
    invalid_arguments: AtomicU64,
    storage_errors: AtomicU64,
    timeouts: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    data: RwLock<MetricsData>,
    max_recent_decisions: usize,
}

#[derive(Default)]
struct ModuleStatsInner {
    checks: u64,
    granted: u64,
}

#[derive(Default)]
struct MetricsData {
    modules: HashMap<&'static str, ModuleStatsInner>,
    recent: VecDeque<DecisionRecord>,
}

/// Audit record of a recent decision
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub user_id: String,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub action: Action,
    pub outcome: Outcome,
    pub duration_us: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleStats {
    pub module: String,
    pub checks: u64,
    pub granted: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub checks: u64,
    pub granted: u64,
    pub denied: u64,
    pub invalid_arguments: u64,
    pub storage_errors: u64,
    pub timeouts: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub modules: Vec<ModuleStats>,
    pub recent_decisions: Vec<DecisionRecord>,
}

impl EvaluatorMetrics {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Create a collector keeping at most `max_recent_decisions` audit records
    pub fn with_capacity(max_recent_decisions: usize) -> Self {
        Self {
            checks: AtomicU64::new(0),
            granted: AtomicU64::new(0),
            denied: AtomicU64::new(0),
            invalid_arguments: AtomicU64::new(0),
            storage_errors: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            data: RwLock::new(MetricsData {
                modules: HashMap::new(),
                recent: VecDeque::with_capacity(max_recent_decisions),
            }),
            max_recent_decisions,
        }
    }

    fn write_data(&self) -> RwLockWriteGuard<'_, MetricsData> {
        self.data.write().unwrap_or_else(|poisoned| {
            tracing::warn!("metrics data lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn read_data(&self) -> RwLockReadGuard<'_, MetricsData> {
        self.data.read().unwrap_or_else(|poisoned| {
            tracing::warn!("metrics data lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Count a check rejected before its action could be parsed
    pub fn record_invalid_argument(&self) {
        self.checks.fetch_add(1, Ordering::Relaxed);
        self.invalid_arguments.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one check
    pub fn record(
        &self,
        user_id: &str,
        module: &str,
        resource: Option<&str>,
        action: Action,
        outcome: Outcome,
        duration: Duration,
    ) {
        self.checks.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            Outcome::Granted => &self.granted,
            Outcome::Denied => &self.denied,
            Outcome::InvalidArgument => &self.invalid_arguments,
            Outcome::StorageError => &self.storage_errors,
            Outcome::TimedOut => &self.timeouts,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let mut data = self.write_data();

        // Catalog modules only; anything else shares one bucket
        if let Some(key) = module_key(module) {
            let stats = data.modules.entry(key).or_default();
            stats.checks += 1;
            if outcome == Outcome::Granted {
                stats.granted += 1;
            }
        }

        if self.max_recent_decisions == 0 {
            return;
        }
        if data.recent.len() >= self.max_recent_decisions {
            data.recent.pop_front();
        }
        data.recent.push_back(DecisionRecord {
            user_id: user_id.to_string(),
            module: module.to_string(),
            resource: resource.map(String::from),
            action,
            outcome,
            duration_us: u64::try_from(duration.as_micros()).unwrap_or(u64::MAX),
            timestamp,
        });
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.read_data();

        let mut modules: Vec<ModuleStats> = data
            .modules
            .iter()
            .map(|(module, s)| ModuleStats {
                module: module.to_string(),
                checks: s.checks,
                granted: s.granted,
            })
            .collect();
        modules.sort_unstable_by(|a, b| b.checks.cmp(&a.checks).then(a.module.cmp(&b.module)));

        // Most recent first
        let recent_decisions = data.recent.iter().rev().cloned().collect();

        MetricsSnapshot {
            checks: self.checks.load(Ordering::Relaxed),
            granted: self.granted.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            invalid_arguments: self.invalid_arguments.load(Ordering::Relaxed),
            storage_errors: self.storage_errors.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            modules,
            recent_decisions,
        }
    }
}

fn module_key(module: &str) -> Option<&'static str> {
    if module.trim().is_empty() {
        return None;
    }
    Some(ModuleKind::try_parse(module).map_or(OTHER_MODULE, |kind| kind.as_str()))
}

impl Default for EvaluatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}
