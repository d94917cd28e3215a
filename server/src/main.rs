use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{self, DatabaseSettings, DbPool};
use platform_obs::{ObsConfig, init_tracing};
use entity::bills;
use platform_store::{BillStore, DbStore, mock};
use sea_orm::{ActiveModelTrait, Set};
use tracing::info;

use server::{
    config::AppConfig,
    http::{self, AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "frais-server", version, about = "Employee expense-report server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Seed a demo employee and the fixture bills.
    Seed,
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
        },
        Command::Seed => run_seed().await,
    }
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env();
    platform_db::connect(&settings).await.map_err(Into::into)
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?);
    let pool = setup_pool().await?;
    ensure_migrations(&pool, cmd.allow_dirty).await?;
    let store: Arc<dyn BillStore> = Arc::new(DbStore::new(
        pool,
        config.upload_dir.clone(),
        config.public_base_url.clone(),
    ));
    let cookie_key = config.cookie_key.clone();
    let state = AppState {
        store,
        config: config.clone(),
        cookie_key,
    };
    http::serve((&cmd).into(), state).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `cargo run -p server -- migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn migrate_up() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}

async fn run_seed() -> Result<()> {
    let pool = setup_pool().await?;
    if platform_db::user_count(&pool).await? > 0 {
        info!("seed skipped; users already present");
        return Ok(());
    }
    let user = platform_db::upsert_user(&pool, "employee@test.tld", "Employee").await?;
    for bill in mock::fixture_bills() {
        let model = bills::ActiveModel {
            id: Set(bill.id),
            expense_type: Set(bill.expense_type),
            name: Set(bill.name),
            date: Set(bill.date),
            amount: Set(bill.amount),
            vat: Set(bill.vat),
            pct: Set(bill.pct),
            commentary: Set(bill.commentary),
            file_url: Set(bill.file_url),
            file_name: Set(bill.file_name),
            status: Set(bill.status),
            email: Set(user.email.clone()),
            created_at: Set(bill.created_at),
        };
        model.insert(&pool).await?;
    }
    info!(email = %user.email, "seeded demo employee and fixture bills");
    Ok(())
}
