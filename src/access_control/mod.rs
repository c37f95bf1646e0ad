//! Access control module
//!
//! Role-based permission evaluation for the CRM.
//!
//! ## Access Control Model
//!
//! ```text
//! user → role assignments → role → permission class → rules
//! ```
//!
//! A rule is keyed by `module` and an optional `resource` and carries four
//! grants: read, create, update, delete. A check is granted when any rule
//! reachable from any of the user's roles matches and grants the action:
//!
//! - module and resource compare trimmed and case-insensitive
//! - a rule without a resource covers the whole module
//! - a check without a resource matches every rule of the module
//! - `create` is satisfied by either the create or the update grant
//!
//! Users without roles, unknown users and unmatched modules are all a plain
//! `false`. Only malformed input and storage failures are errors.
//!
//! ## Example
//!
//! ```ignore
//! let evaluator = PermissionEvaluator::new(store);
//! let allowed = evaluator
//!     .has_permission(&user_id, "properties", Some("unit"), "delete")
//!     .await?;
//! ```

pub mod cache;
pub mod evaluator;
pub mod metrics;
pub mod rule;
pub mod types;

pub use cache::{CachedRole, RuleCache};
pub use evaluator::{DEFAULT_CHECK_TIMEOUT, GrantSource, PermissionEvaluator};
pub use metrics::{EvaluatorMetrics, MetricsSnapshot, OTHER_MODULE, Outcome};
pub use rule::{PermissionRule, RuleDraft, RuleGrants};
pub use types::{Action, ModuleKind, PermissionCheck};
