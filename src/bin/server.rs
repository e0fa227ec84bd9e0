use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamefit_engine::catalog::CatalogReader;
use gamefit_engine::core::{Genre, Manufacturer, Platform, Tag};
use gamefit_engine::search::{TitleHit, DEFAULT_SEARCH_LIMIT};
use gamefit_engine::{
    CatalogSeed, Component, ComponentKind, Config, Game, GameFitError, HardwareProfile, MatchEngine, MatchFilters,
    MatchRequest, MatchResponse, SelectionPolicy, SqliteCatalog,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<MatchEngine>,
    catalog: Arc<SqliteCatalog>,
}

#[derive(Debug, Deserialize)]
struct ComponentsQuery {
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default = "default_search_limit")]
    limit: usize,
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardwareRequest {
    #[serde(alias = "cpu_id")]
    cpu_id: i64,
    #[serde(alias = "gpu_id")]
    gpu_id: i64,
    ram: f64,
    vram: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    policy: SelectionPolicy,
    games: u64,
    components: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamefit_server=debug,gamefit_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("🚀 Starting GameFit matching server");
    tracing::info!("📦 Database: {}", config.db_path);
    tracing::info!("🔌 Port: {}", config.port);
    tracing::info!("⚖️ Selection policy: {}", config.policy);

    let catalog = Arc::new(SqliteCatalog::new(&config.db_path).await?);

    if let Some(seed_path) = &config.seed_path {
        let seed = CatalogSeed::from_file(seed_path)?;
        let report = catalog.apply_seed(&seed).await?;
        tracing::info!(
            "🌱 Seeded from {}: {} games added, {} already present",
            seed_path,
            report.games_added,
            report.games_reused
        );
    }

    let reader: Arc<dyn CatalogReader> = catalog.clone();
    let state = AppState {
        engine: Arc::new(MatchEngine::with_options(reader, config.match_options())),
        catalog,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/match", post(match_handler))
        .route("/v1/components", get(components_handler))
        .route("/v1/genres", get(genres_handler))
        .route("/v1/platforms", get(platforms_handler))
        .route("/v1/manufacturers", get(manufacturers_handler))
        .route("/v1/tags", get(tags_handler))
        .route("/v1/games/search", get(search_handler))
        .route("/v1/games/:id", get(game_handler))
        .route("/v1/users/:user_id/hardware", get(get_hardware_handler).put(put_hardware_handler))
        .route("/v1/users/:user_id/matches", get(user_matches_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("🎮 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let stats = state.catalog.stats().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: gamefit_engine::VERSION.to_string(),
        policy: state.engine.options().policy,
        games: stats.games,
        components: stats.components,
    }))
}

async fn match_handler(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchResponse>, AppError> {
    let req = json_body(payload)?;
    tracing::debug!("Match request: {:?}", req);

    let response = state.engine.find_matches(req).await?;

    tracing::info!(
        "✅ {} matches ({:.2}ms, {} sets evaluated)",
        response.games.len(),
        response.latency_ms,
        response.stats.requirement_sets_evaluated
    );

    Ok(Json(response))
}

async fn components_handler(
    State(state): State<AppState>,
    Query(query): Query<ComponentsQuery>,
) -> Result<Json<Vec<Component>>, AppError> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<ComponentKind>)
        .transpose()?;

    Ok(Json(state.catalog.components(kind).await?))
}

async fn genres_handler(State(state): State<AppState>) -> Result<Json<Vec<Genre>>, AppError> {
    Ok(Json(state.catalog.genres().await?))
}

async fn platforms_handler(State(state): State<AppState>) -> Result<Json<Vec<Platform>>, AppError> {
    Ok(Json(state.catalog.platforms().await?))
}

async fn manufacturers_handler(State(state): State<AppState>) -> Result<Json<Vec<Manufacturer>>, AppError> {
    Ok(Json(state.catalog.manufacturers().await?))
}

async fn tags_handler(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, AppError> {
    Ok(Json(state.catalog.tags().await?))
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TitleHit>>, AppError> {
    Ok(Json(state.catalog.search_games(&params.q, params.limit).await?))
}

async fn game_handler(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Game>, AppError> {
    let game = state
        .catalog
        .game(id)
        .await?
        .ok_or_else(|| GameFitError::NotFound(format!("game {}", id)))?;

    Ok(Json(game))
}

async fn get_hardware_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<HardwareProfile>, AppError> {
    let profile = state
        .catalog
        .hardware_profile(user_id)
        .await?
        .ok_or_else(|| GameFitError::NotFound(format!("hardware profile for user {}", user_id)))?;

    Ok(Json(profile))
}

async fn put_hardware_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    payload: Result<Json<HardwareRequest>, JsonRejection>,
) -> Result<Json<HardwareProfile>, AppError> {
    let req = json_body(payload)?;
    let profile = HardwareProfile::new(user_id, req.cpu_id, req.gpu_id, req.ram, req.vram);
    let stored = state.catalog.upsert_hardware_profile(&profile).await?;

    tracing::info!("💾 Hardware profile saved for user {}", user_id);

    Ok(Json(stored))
}

async fn user_matches_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(filters): Query<MatchFilters>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(state.engine.matches_for_user(user_id, filters).await?))
}

// Error handling
struct AppError(GameFitError);

/// Malformed or mistyped bodies are invalid input, reported like any other
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError(GameFitError::invalid_input(rejection.body_text())))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GameFitError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GameFitError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.0.to_string();

        if self.0.is_client_error() {
            tracing::warn!("⚠️ Rejected: {} - {}", status, message);
        } else {
            tracing::error!("❌ Error: {} - {}", status, message);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<GameFitError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
