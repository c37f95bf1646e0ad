//! Administration module
//!
//! The owner-level console surface: users, roles, permission classes and
//! rules, plus seeding them from configuration.

pub mod console;
pub mod seed;

pub use console::{AdminConsole, prepare_draft};
pub use seed::{SeededPolicy, apply_policy};
