use clap::{Parser, Subcommand};
use comfy_table::Table;
use core_types::Direction;
use database::connection::{connect, run_migrations};
use database::repository::ForecastRepository;
use forecaster::Forecaster;
use market_data::{MarketDataClient, YahooChartClient};
use std::str::FromStr;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// The main entry point for the Foresight dashboard backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if present.
    dotenvy::dotenv().ok();

    // Keep the guard alive so buffered log lines are flushed on exit.
    let _log_guard = init_tracing();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Serve => handle_serve().await,
        Commands::Predict => handle_predict().await,
        Commands::History(args) => handle_history(args).await,
        Commands::Amend(args) => handle_amend(args).await,
    }
}

/// Logs go to stdout and to a daily-rolling file under `logs/`.
fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "foresight.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(file_writer.and(std::io::stdout))
        .init();

    guard
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A market dashboard backend: S&P 500 quotes, a daily forecast engine, and a
/// ledger of past forecasts versus their realized outcomes.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server.
    Serve,
    /// Fetch the latest quote, run the engine once, and record the forecast.
    Predict,
    /// Print the most recent forecasts.
    History(HistoryArgs),
    /// Record the realized outcome for a forecast.
    Amend(AmendArgs),
}

#[derive(Parser)]
struct HistoryArgs {
    /// How many records to show (newest first).
    #[arg(long)]
    limit: Option<i64>,
}

#[derive(Parser)]
struct AmendArgs {
    /// The id of the forecast to amend.
    #[arg(long)]
    id: Uuid,

    /// The realized direction: "up" or "down".
    #[arg(long)]
    actual: String,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve() -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    web_server::run_server(config).await
}

/// Opens the ledger the same way every command does: connect, migrate, wrap.
async fn open_ledger() -> anyhow::Result<ForecastRepository> {
    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;
    Ok(ForecastRepository::new(db_pool))
}

async fn handle_predict() -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let ledger = open_ledger().await?;

    let market = YahooChartClient::new(&config.market_data)?;
    let snapshot = market.latest_snapshot().await?;
    tracing::info!(close = %snapshot.close, change = %snapshot.price_change, "fetched latest session");

    let quote = snapshot.quote();
    let forecast = Forecaster::new().predict(&quote);

    let record = ledger
        .create_forecast(forecast.direction, forecast.confidence, &quote)
        .await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn handle_history(args: HistoryArgs) -> anyhow::Result<()> {
    let ledger = open_ledger().await?;
    let records = ledger.list_forecasts(args.limit).await?;

    let mut table = Table::new();
    table.set_header(vec!["Id", "Date", "Direction", "Confidence", "Actual", "Created"]);
    for record in &records {
        table.add_row(vec![
            record.id.to_string(),
            record.forecast_date.clone(),
            record.direction.clone(),
            format!("{}%", record.confidence),
            record.actual.clone().unwrap_or_else(|| "-".to_string()),
            record.created_at.to_rfc3339(),
        ]);
    }
    println!("{table}");

    let stats = ledger.accuracy_stats().await?;
    match stats.accuracy_pct {
        Some(pct) => println!(
            "Accuracy: {pct}% ({} of {} evaluated, {} total)",
            stats.hits, stats.evaluated, stats.total
        ),
        None => println!("Accuracy: no evaluated forecasts yet ({} total)", stats.total),
    }
    Ok(())
}

async fn handle_amend(args: AmendArgs) -> anyhow::Result<()> {
    let actual = Direction::from_str(&args.actual)?;
    let ledger = open_ledger().await?;

    let record = ledger.amend_forecast(args.id, actual).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
