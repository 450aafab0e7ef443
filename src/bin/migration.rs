use anyhow::Result;
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use warehouse_inventory::{config, db, migrator::Migrator};

#[derive(Parser)]
#[command(
    name = "migration",
    about = "Apply or roll back the warehouse inventory schema",
    version
)]
struct Cli {
    #[arg(
        long,
        help = "Database URL; defaults to the configured database_url"
    )]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations (default)
    Up {
        #[arg(long, help = "Apply at most this many migrations")]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1, help = "Number of migrations to roll back")]
        steps: u32,
    },
    /// Show applied and pending migrations
    Status,
    /// Drop all tables and reapply every migration
    Fresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }

    let pool = db::establish_connection_from_app_config(&cfg).await?;

    match cli.command.unwrap_or(Commands::Up { steps: None }) {
        Commands::Up { steps } => {
            info!("Applying migrations");
            Migrator::up(&pool, steps).await?;
        }
        Commands::Down { steps } => {
            info!(steps, "Rolling back migrations");
            Migrator::down(&pool, Some(steps)).await?;
        }
        Commands::Status => {
            Migrator::status(&pool).await?;
        }
        Commands::Fresh => {
            info!("Dropping all tables and reapplying migrations");
            Migrator::fresh(&pool).await?;
        }
    }

    info!("Migration command completed");
    Ok(())
}
