use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reconciler::{
    ResultPolicy, SyncContext, TournamentSelector,
    archive::FsFeedArchive,
    config::Config,
    sources::sportcontent::SportContentClient,
    update_tournament_field, update_tournament_results,
};
use storage::{Database, store::PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "golf-sync")]
#[command(about = "Golf tournament field and results synchronizer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Sync the field of the next upcoming tournament
    Field {
        #[arg(long)]
        tournament_id: Option<i32>,

        #[arg(long)]
        year: Option<i32>,
    },
    /// Reconcile results of the most recently completed tournament
    Results {
        #[arg(long)]
        tournament_id: Option<i32>,

        #[arg(long)]
        year: Option<i32>,

        /// Delete results already recorded for the tournament-year first
        #[arg(long)]
        replace: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "golf_sync={},reconciler={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Connecting to database at: {}",
        cli.database_url.split('@').next_back().unwrap_or("unknown")
    );
    let db = Database::new(&cli.database_url)
        .await
        .context("Failed to initialize database")?;

    match cli.command {
        Commands::Migrate => {
            db.run_migrations()
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations completed successfully");
        }
        Commands::Field {
            tournament_id,
            year,
        } => {
            let ctx = build_context(&db)?;
            let selector = TournamentSelector::NextUpcoming.or_id(tournament_id);
            let summary = update_tournament_field(&ctx, selector, year, today())
                .await
                .context("Field update failed")?;

            for issue in &summary.field.issues {
                tracing::debug!("  {}", issue);
            }
            tracing::info!("Archived raw feed as {}", summary.archive_key);
            println!("{summary}");
        }
        Commands::Results {
            tournament_id,
            year,
            replace,
        } => {
            let ctx = build_context(&db)?;
            let selector = TournamentSelector::MostRecentCompleted.or_id(tournament_id);
            let policy = if replace {
                ResultPolicy::ReplaceExisting
            } else {
                ResultPolicy::Accumulate
            };
            let summary = update_tournament_results(&ctx, selector, year, policy, today())
                .await
                .context("Results update failed")?;

            for issue in &summary.report.issues {
                tracing::debug!("  {}", issue);
            }
            tracing::info!("Archived raw feed as {}", summary.archive_key);
            println!("{summary}");
        }
    }

    Ok(())
}

fn build_context(db: &Database) -> anyhow::Result<SyncContext> {
    let config = Config::from_env().context("Failed to load feed configuration")?;
    tracing::info!("Archiving raw feeds under {}", config.archive_dir.display());

    let client = SportContentClient::new(&config.feed).context("Failed to build feed client")?;

    Ok(SyncContext {
        store: Arc::new(PgStore::new(db.pool().clone())),
        feed: Arc::new(client),
        archive: Arc::new(FsFeedArchive::new(config.archive_dir)),
    })
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
