//! Real-estate CRM permission evaluation
//!
//! Role-based access control for CRM modules such as properties, leads and
//! opportunities.
//!
//! ## Features
//!
//! - **Additive RBAC**: users hold roles, roles inherit one permission class,
//!   classes hold module/resource rules with read/create/update/delete grants
//! - **Async store collaborators** with an in-memory reference implementation
//! - **Admin console** enforcing rule invariants on every write
//! - **Optional role cache** with explicit invalidation
//! - **Declarative policy** seeding via TOML files and environment variables
//!
//! ## Access Control Model
//!
//! ```text
//! user → roles → permission class → rules (module, resource?, grants)
//! ```
//!
//! ## Example Configuration
//!
//! ```toml
//! [evaluator]
//! timeout_ms = 1000
//!
//! [[policy.classes]]
//! name = "Marketing"
//!
//! [[policy.classes.rules]]
//! module = "leads"
//! read = true
//! create = true
//!
//! [[policy.roles]]
//! name = "Marketing Manager"
//! class = "Marketing"
//!
//! [[policy.users]]
//! name = "Salma"
//!
//! [[policy.assignments]]
//! user = "Salma"
//! role = "Marketing Manager"
//! ```

pub mod access_control;
pub mod admin;
pub mod config;
pub mod error;
pub mod model;
pub mod store;

// Re-export main types
pub use access_control::{Action, PermissionCheck, PermissionEvaluator};
pub use admin::AdminConsole;
pub use config::{AppConfig, load_config};
pub use error::{AppError, AuthzError, Result};
pub use store::InMemoryStore;
