//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use ecodeli_core::error::AppError;
use ecodeli_core::types::pagination::PageRequest;
use ecodeli_database::repositories::UserRepository;
use ecodeli_entity::user::{User, UserRole, ValidationStatus};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users, newest first
    List {
        /// Filter by role (client, deliverer, provider, merchant, admin)
        #[arg(short, long, value_parser = parse_role)]
        role: Option<UserRole>,
        /// Only accounts awaiting admin validation
        #[arg(long)]
        pending: bool,
        /// Maximum rows to show
        #[arg(long, default_value_t = 50)]
        limit: u64,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    role: String,
    validation: String,
    plan: String,
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            email: u.email.clone(),
            name: u.name.clone(),
            role: u.role.to_string(),
            validation: u.validation_status.to_string(),
            plan: u.subscription_plan.to_string(),
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|_| format!("unknown role '{s}'"))
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let pool = super::create_db_pool(&config).await?;
    let user_repo = UserRepository::new(pool);

    match &args.command {
        UserCommand::List {
            role,
            pending,
            limit,
        } => {
            let validation = pending.then_some(ValidationStatus::Pending);
            let page = PageRequest::new(1, *limit);
            let users = user_repo.list(*role, validation, &page).await?;

            let rows: Vec<UserRow> = users.items.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table && users.total_items > rows.len() as u64 {
                println!("Showing {} of {} users.", rows.len(), users.total_items);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roles_case_insensitively() {
        assert_eq!(parse_role("Deliverer"), Ok(UserRole::Deliverer));
        assert_eq!(parse_role("admin"), Ok(UserRole::Admin));
        assert!(parse_role("courier").is_err());
    }
}
