//! Start the EcoDeli server.

use clap::Args;

use ecodeli_core::error::AppError;
use ecodeli_database::migration::run_migrations;
use ecodeli_service::DemoSeeder;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Run database migrations on startup
    #[arg(long, default_value = "true")]
    pub auto_migrate: bool,

    /// Disable the notification worker and cron jobs
    #[arg(long)]
    pub no_worker: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.no_worker {
        config.worker.enabled = false;
    }

    println!("Starting EcoDeli server...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);
    println!("  Worker: {}", config.worker.enabled);

    let pool = super::create_db_pool(&config).await?;

    if args.auto_migrate {
        println!("Running database migrations...");
        run_migrations(&pool).await?;
        println!("  Migrations applied successfully.");
    }

    if config.seed.force_reseed {
        println!("Reseeding demo data (seed.force_reseed is set)...");
        DemoSeeder::new(pool.clone(), config.seed.clone())
            .run(true)
            .await?;
    }

    ecodeli_api::app::run_server(config, pool).await
}
