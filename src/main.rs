//! estate-authz CLI
//!
//! Evaluates CRM permission checks against a policy seeded from configuration.

use clap::{Parser, Subcommand};
use estate_authz::{
    access_control::{ModuleKind, PermissionCheck, PermissionEvaluator},
    admin::{AdminConsole, SeededPolicy, apply_policy},
    config::{AppConfig, LogFormat, load_config},
    store::InMemoryStore,
};
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Role-based permission checks for the real-estate CRM
#[derive(Parser, Debug)]
#[command(name = "estate-authz")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ESTATE_AUTHZ_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "ESTATE_AUTHZ_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a user may perform an action (exit 0 granted, 1 denied)
    Check {
        /// User name from the policy, or user id
        #[arg(long)]
        user: String,

        /// Module, e.g. properties or leads
        #[arg(long)]
        module: String,

        /// Optional resource within the module, e.g. unit
        #[arg(long)]
        resource: Option<String>,

        /// One of read, create, update, delete
        #[arg(long)]
        action: String,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the configuration and seed the policy
    Validate,

    /// List the module catalog
    Modules,
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

async fn seed(
    config: &AppConfig,
) -> anyhow::Result<(PermissionEvaluator<InMemoryStore>, SeededPolicy)> {
    let store = Arc::new(InMemoryStore::new());
    let evaluator = PermissionEvaluator::from_config(store.clone(), &config.evaluator);
    let console = AdminConsole::new(store).with_cache(evaluator.cache().cloned());

    let seeded = apply_policy(&console, &config.policy)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to seed policy"))?;

    Ok((evaluator, seeded))
}

async fn run(args: Args, config: AppConfig) -> anyhow::Result<ExitCode> {
    match args.command {
        Command::Modules => {
            for module in ModuleKind::all() {
                println!("{}", module);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate => {
            let (_, seeded) = seed(&config).await?;
            println!(
                "ok: {} classes, {} rules, {} roles, {} users, {} assignments",
                seeded.classes.len(),
                seeded.rules,
                seeded.roles.len(),
                seeded.users.len(),
                seeded.assignments
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            user,
            module,
            resource,
            action,
            json,
        } => {
            let check = PermissionCheck::parse(&module, resource.as_deref(), &action)?;
            let (evaluator, seeded) = seed(&config).await?;
            let user_id = seeded.resolve_user(&user);

            let source = evaluator
                .explain_within(user_id, &check, evaluator.timeout())
                .await?;
            let granted = source.is_some();

            info!(user = user_id, check = %check, granted, "Permission checked");

            if json {
                let output = json!({
                    "user": user_id,
                    "module": check.module,
                    "resource": check.resource,
                    "action": check.action,
                    "granted": granted,
                    "source": source,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", if granted { "granted" } else { "denied" });
            }

            Ok(if granted {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(args.log_level.as_deref().unwrap_or("info"), LogFormat::Pretty);
            error!(error = %e, "Failed to load configuration");
            return ExitCode::from(2);
        }
    };

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level, config.logging.format);

    match run(args, config).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::from(2)
        }
    }
}
