//! EcoDeli Server: crowdshipping marketplace API
//!
//! Main entry point: loads configuration, prepares the database and hands
//! over to the API crate, which runs the HTTP server next to the
//! notification worker.

use tracing_subscriber::{EnvFilter, fmt};

use ecodeli_core::config::{AppConfig, LogFormat};
use ecodeli_core::error::AppError;
use ecodeli_database::DatabasePool;
use ecodeli_database::migration::run_migrations;
use ecodeli_service::DemoSeeder;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `ECODELI_ENV` overlay and
/// `ECODELI_*` environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("ECODELI_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EcoDeli v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let db_pool = DatabasePool::connect(&config.database).await?.into_pool();

    if config.database.auto_migrate {
        run_migrations(&db_pool).await?;
    }

    if config.seed.force_reseed {
        tracing::warn!("seed.force_reseed is set, wiping and reseeding demo data");
        let report = DemoSeeder::new(db_pool.clone(), config.seed.clone())
            .run(true)
            .await?;
        tracing::info!(users = report.users, "Demo data reseeded");
    }

    ecodeli_api::app::run_server(config, db_pool).await
}
