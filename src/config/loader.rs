//! Configuration loader with layered sources
//!
//! Environment variables (`ESTATE_AUTHZ__*`) override the TOML file, which
//! overrides the serde defaults on [`AppConfig`]. Policy cross-references are
//! checked after loading.

use crate::access_control::ModuleKind;
use crate::config::types::{AppConfig, PolicyConfig};
use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::collections::HashSet;
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "estate-authz.toml",
    ".estate-authz.toml",
    "~/.config/estate-authz/config.toml",
    "/etc/estate-authz/config.toml",
];

/// Load configuration from a TOML string, without file or environment layers
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    build(Config::builder().add_source(File::from_str(toml_str, FileFormat::Toml)))
}

/// Load configuration from a file and `ESTATE_AUTHZ__*` environment variables.
///
/// An explicit path must exist. Without one, the first existing default
/// path is used, if any.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    match config_path {
        Some(path) if !Path::new(path).exists() => {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        Some(path) => builder = builder.add_source(File::new(path, FileFormat::Toml)),
        None => {
            let found = DEFAULT_CONFIG_PATHS
                .iter()
                .map(|path| shellexpand::tilde(path))
                .find(|path| Path::new(path.as_ref()).exists());
            if let Some(path) = found {
                builder = builder.add_source(File::new(&path, FileFormat::Toml));
            }
        }
    }

    // ESTATE_AUTHZ__EVALUATOR__TIMEOUT_MS -> evaluator.timeout_ms
    build(
        builder.add_source(
            Environment::with_prefix("ESTATE_AUTHZ")
                .separator("__")
                .try_parsing(true),
        ),
    )
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let app_config: AppConfig = builder
        .build()
        .and_then(Config::try_deserialize)
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;
    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.evaluator.timeout_ms == 0 {
        return Err(ConfigError::Invalid {
            message: "evaluator.timeout_ms must be greater than 0".to_string(),
        });
    }

    if config.evaluator.cache.enabled && config.evaluator.cache.max_entries == 0 {
        return Err(ConfigError::Invalid {
            message: "evaluator.cache.max_entries must be greater than 0 when the cache is enabled"
                .to_string(),
        });
    }

    validate_policy(&config.policy)
}

/// Validate cross-references and rule modules in the seeded policy
fn validate_policy(policy: &PolicyConfig) -> Result<(), ConfigError> {
    let mut class_names = HashSet::new();
    for (index, class) in policy.classes.iter().enumerate() {
        let name = required(&class.name, &format!("policy.classes[{}].name", index))?;
        if !class_names.insert(name) {
            return Err(invalid(format!("duplicate permission class '{}'", name)));
        }

        for (rule_index, rule) in class.rules.iter().enumerate() {
            let field = format!("policy.classes[{}].rules[{}].module", index, rule_index);
            let module = required(&rule.module, &field)?;
            if ModuleKind::try_parse(module).is_none() {
                return Err(invalid(format!(
                    "unknown module '{}' in {} (class '{}')",
                    module, field, name
                )));
            }
        }
    }

    let mut role_names = HashSet::new();
    for (index, role) in policy.roles.iter().enumerate() {
        let name = required(&role.name, &format!("policy.roles[{}].name", index))?;
        if !role_names.insert(name) {
            return Err(invalid(format!("duplicate role '{}'", name)));
        }
        let class = required(&role.class, &format!("policy.roles[{}].class", index))?;
        if !class_names.contains(class) {
            return Err(invalid(format!(
                "role '{}' references unknown permission class '{}'",
                name, class
            )));
        }
    }

    let mut user_names = HashSet::new();
    for (index, user) in policy.users.iter().enumerate() {
        let name = required(&user.name, &format!("policy.users[{}].name", index))?;
        if !user_names.insert(name) {
            return Err(invalid(format!("duplicate user '{}'", name)));
        }
    }

    for (index, assignment) in policy.assignments.iter().enumerate() {
        let user = required(&assignment.user, &format!("policy.assignments[{}].user", index))?;
        let role = required(&assignment.role, &format!("policy.assignments[{}].role", index))?;
        if !user_names.contains(user) {
            return Err(invalid(format!("assignment references unknown user '{}'", user)));
        }
        if !role_names.contains(role) {
            return Err(invalid(format!("assignment references unknown role '{}'", role)));
        }
    }

    Ok(())
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Missing {
            field: field.to_string(),
        });
    }
    Ok(trimmed)
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid { message }
}
