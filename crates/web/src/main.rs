use anyhow::Context;
use axum::{Json, Router, middleware::from_fn_with_state, routing::get};
use storage::Database;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;

use config::Config;
use middleware::auth::AuthConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: AuthConfig,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        features::rulesets::handlers::list_rulesets,
        features::rulesets::handlers::get_ruleset,
        features::rulesets::handlers::create_ruleset,
        features::rulesets::handlers::update_ruleset,
        features::rulesets::handlers::delete_ruleset,
        features::rulesets::handlers::calculate_points,
        features::rulesets::handlers::get_templates,
        features::rulesets::handlers::get_uma_patterns,
        features::matches::handlers::register_match,
        features::matches::handlers::list_matches,
        features::matches::handlers::get_match,
        features::matches::handlers::update_match,
        features::matches::handlers::delete_match,
        features::matches::handlers::validate_fields,
        features::stats::handlers::get_stats_summary,
        features::venues::handlers::list_venues,
        features::venues::handlers::create_venue,
    ),
    components(
        schemas(
            storage::models::GameMode,
            storage::models::EntryMethod,
            storage::models::MatchType,
            storage::dto::ruleset::RulesetPayload,
            storage::dto::ruleset::RulesetResponse,
            storage::dto::ruleset::RulesetListResponse,
            storage::dto::ruleset::PointCalculationRequest,
            storage::dto::ruleset::PointCalculationResponse,
            storage::dto::ruleset::RuleTemplateDto,
            storage::dto::ruleset::RuleTemplateResponse,
            storage::dto::ruleset::UmaPatternDto,
            storage::dto::ruleset::UmaPatternsResponse,
            storage::dto::common::PaginationMeta,
            storage::dto::matches::SaveMatchRequest,
            storage::dto::matches::MatchResponse,
            storage::dto::matches::FieldCheckRequest,
            storage::dto::matches::FieldCheckResponse,
            storage::dto::stats::StatsQuery,
            storage::dto::stats::StatsSummary,
            storage::dto::stats::RankDistribution,
            storage::dto::venue::CreateVenueRequest,
            storage::dto::venue::VenueResponse,
            storage::dto::venue::VenueListResponse,
            storage::scoring::fields::FieldVerdict,
            storage::scoring::match_validator::ValidationError,
            storage::scoring::match_validator::ValidationSeverity,
            storage::scoring::points::PointBreakdown,
        )
    ),
    tags(
        (name = "rulesets", description = "Scoring ruleset management"),
        (name = "matches", description = "Match registration and history"),
        (name = "stats", description = "Performance statistics"),
        (name = "venues", description = "Venue registry"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting tonlog API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection established");

    let state = AppState {
        db,
        auth: AuthConfig::new(config.jwt_secret.as_str()),
    };

    let api = Router::new()
        .nest("/rulesets", features::rulesets::routes::routes())
        .nest("/matches", features::matches::routes::routes())
        .nest("/stats", features::stats::routes::routes())
        .nest("/venues", features::venues::routes::routes())
        .layer(from_fn_with_state(state.clone(), middleware::auth::require_auth));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
