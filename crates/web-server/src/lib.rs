use axum::{
    routing::{get, patch, post},
    Router,
};
use configuration::Config;
use database::ForecastRepository;
use forecaster::Forecaster;
use market_data::{MarketDataClient, YahooChartClient};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};
use tracing;

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub ledger: ForecastRepository,
    pub market: Arc<dyn MarketDataClient>,
    pub forecaster: Arc<Forecaster>,
}

/// The main function to configure and run the web server.
///
/// Opens the database pool, applies migrations, builds the shared state, and
/// serves until the process is stopped. The pool closes when the state is
/// dropped on the way out.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let addr = config.server.addr()?;

    let db_pool = database::connect().await?;
    database::run_migrations(&db_pool).await?;
    let ledger = ForecastRepository::new(db_pool);

    let market = YahooChartClient::new(&config.market_data)?;

    let app_state = Arc::new(AppState {
        ledger,
        market: Arc::new(market),
        forecaster: Arc::new(Forecaster::new()),
    });

    let app = router(app_state);

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router with all routes and middleware attached.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/market-data", get(handlers::get_market_data))
        .route("/api/historical-data", get(handlers::get_historical_data))
        .route("/api/predict", post(handlers::submit_prediction))
        .route("/api/predictions", get(handlers::get_predictions))
        .route("/api/predictions/:id", patch(handlers::amend_prediction))
        .route("/api/model-stats", get(handlers::get_model_stats))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}
