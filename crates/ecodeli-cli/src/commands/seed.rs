//! Demo data seeding.

use clap::Args;

use crate::output::{self, OutputFormat};
use ecodeli_core::error::AppError;
use ecodeli_service::DemoSeeder;

/// Arguments for the seed command
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Wipe existing data and reseed
    #[arg(long)]
    pub force: bool,
}

/// Execute the seed command
pub async fn execute(
    args: &SeedArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let pool = super::create_db_pool(&config).await?;

    let report = DemoSeeder::new(pool, config.seed.clone())
        .run(args.force)
        .await?;

    if report.skipped {
        output::print_warning("Database already holds users; rerun with --force to reseed.");
        return Ok(());
    }

    output::print_summary(
        &report,
        &[
            ("Truncated", report.truncated.to_string()),
            ("Users", report.users.to_string()),
            ("Announcements", report.announcements.to_string()),
        ],
        format,
    );
    output::print_success(&format!(
        "Demo data loaded; every account uses the password '{}'",
        config.seed.password
    ));
    Ok(())
}
