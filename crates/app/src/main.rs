use clap::Parser;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[derive(Debug, Parser)]
#[command(version, about = "Materials and material methods REST service")]
struct Args {
    /// Settings file, without extension.
    #[arg(long, env = "MATCHLESS_CONFIG", default_value = "settings")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let settings = settings::Settings::new(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "matchless={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let server = settings.server;
    let db = parse_database(&server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, &settings.app.name, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };
    tracing::info!("connecting to {url}");

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
