use clap::{Parser, Subcommand};
use migration::MigratorTrait;
use sea_orm::Database;

#[derive(Parser, Debug)]
#[command(name = "matchless_migrate")]
#[command(about = "Apply or roll back the matchless schema")]
struct Cli {
    /// Database connection string (also read from `MATCHLESS_DATABASE_URL`).
    #[arg(
        long,
        env = "MATCHLESS_DATABASE_URL",
        default_value = "sqlite:./matchless.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
enum Command {
    /// Apply pending migrations.
    #[default]
    Up,
    /// Roll back the last applied migration.
    Down,
    /// Drop every table and apply all migrations again.
    Fresh,
    /// Print applied and pending migrations.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.command.unwrap_or_default() {
        Command::Up => migration::Migrator::up(&db, None).await?,
        Command::Down => migration::Migrator::down(&db, Some(1)).await?,
        Command::Fresh => migration::Migrator::fresh(&db).await?,
        Command::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_up_on_the_local_database() {
        let cli = Cli::try_parse_from(["matchless_migrate"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.database_url.starts_with("sqlite:"));

        let cli = Cli::try_parse_from([
            "matchless_migrate",
            "--database-url",
            "sqlite::memory:",
            "fresh",
        ])
        .unwrap();
        assert_eq!(cli.database_url, "sqlite::memory:");
        assert!(matches!(cli.command, Some(Command::Fresh)));
    }
}
