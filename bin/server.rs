// Portfolio Sunburst - Chart Server
// Serves the sunburst page and the report behind it as JSON

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use portfolio_sunburst::{
    load_tables, ChartDocument, DisplayNode, Holding, PortfolioReport, Settings,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state, computed once before the server starts
#[derive(Clone)]
struct AppState {
    report: Arc<PortfolioReport>,
    chart: Arc<ChartDocument>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/chart - Plotly data, layout and config
async fn get_chart(State(state): State<AppState>) -> Json<ApiResponse<ChartDocument>> {
    Json(ApiResponse::ok(state.chart.as_ref().clone()))
}

/// GET /api/holdings - Classified holdings
async fn get_holdings(State(state): State<AppState>) -> Json<ApiResponse<Vec<Holding>>> {
    Json(ApiResponse::ok(state.report.holdings.clone()))
}

/// GET /api/nodes - Flattened category tree
async fn get_nodes(State(state): State<AppState>) -> Json<ApiResponse<Vec<DisplayNode>>> {
    Json(ApiResponse::ok(state.report.nodes.clone()))
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("🌐 Portfolio Sunburst - Chart Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let settings = Settings::load().context("Failed to load settings")?;
    let input = settings
        .input
        .clone()
        .context("No input file: set PORTFOLIO_INPUT or `input` in portfolio.toml")?;

    let tables = load_tables(&input)
        .with_context(|| format!("Failed to load tables from {}", input.display()))?;
    let report = PortfolioReport::build(&tables).context("Failed to build portfolio report")?;
    println!("✓ {}", report.summary());

    let chart = report.chart(settings.layout());
    let state = AppState {
        report: Arc::new(report),
        chart: Arc::new(chart),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/chart", get(get_chart))
        .route("/holdings", get(get_holdings))
        .route("/nodes", get(get_nodes))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind_addr))?;

    info!(addr = %settings.bind_addr, "chart server listening");
    println!("\n🚀 Server running on http://{}", settings.bind_addr);
    println!("   API: http://{}/api/chart", settings.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
