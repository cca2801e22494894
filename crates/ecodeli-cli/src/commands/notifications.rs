//! Scheduled notification commands, meant for an external cron when the
//! in-process worker is disabled.

use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use ecodeli_api::state::AppState;
use ecodeli_core::error::AppError;

/// Arguments for notification commands
#[derive(Debug, Args)]
pub struct NotificationArgs {
    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotificationCommand,
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// Send every pending notification whose time has come
    ProcessDue,
}

/// Execute notification commands
pub async fn execute(
    args: &NotificationArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let pool = super::create_db_pool(&config).await?;
    let state = AppState::new(Arc::new(config), pool)?;

    match &args.command {
        NotificationCommand::ProcessDue => {
            let runner = state.notification_runner.fork("cli");
            let report = runner.process_due(Utc::now()).await?;

            output::print_summary(
                &report,
                &[
                    ("Claimed", report.claimed.to_string()),
                    ("Sent", report.sent.to_string()),
                    ("Retried", report.retried.to_string()),
                    ("Failed", report.failed.to_string()),
                    ("Released", report.released.to_string()),
                    ("Lost", report.lost.to_string()),
                    ("Errored", report.errored.to_string()),
                ],
                format,
            );
            if report.failed > 0 {
                output::print_warning(&format!(
                    "{} notification(s) exhausted their retries",
                    report.failed
                ));
            }
        }
    }

    Ok(())
}
