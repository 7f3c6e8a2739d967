use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::ruleset::{
    PointCalculationRequest, PointCalculationResponse, RuleTemplateDto, RuleTemplateResponse,
    RulesetListResponse, RulesetPayload, RulesetResponse, UmaPatternsResponse,
};
use storage::models::GameMode;
use storage::scoring::templates;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::WebError;
use crate::middleware::auth::AuthUser;

use super::services;

#[utoipa::path(
    get,
    path = "/api/rulesets",
    responses(
        (status = 200, description = "Personal and global rulesets", body = RulesetListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "rulesets"
)]
pub async fn list_rulesets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RulesetListResponse>, WebError> {
    let rulesets = services::list_rulesets(state.db.pool(), &user).await?;

    let rulesets: Vec<RulesetResponse> = rulesets.into_iter().map(RulesetResponse::from).collect();
    let total = rulesets.len();

    Ok(Json(RulesetListResponse { rulesets, total }))
}

#[utoipa::path(
    get,
    path = "/api/rulesets/{ruleset_id}",
    params(("ruleset_id" = Uuid, Path, description = "Ruleset id")),
    responses(
        (status = 200, description = "Ruleset found", body = RulesetResponse),
        (status = 404, description = "Ruleset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rulesets"
)]
pub async fn get_ruleset(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(ruleset_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let ruleset = services::get_ruleset(state.db.pool(), &user, ruleset_id).await?;

    Ok(Json(RulesetResponse::from(ruleset)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/rulesets",
    request_body = RulesetPayload,
    responses(
        (status = 201, description = "Ruleset created", body = RulesetResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Global rulesets require admin rights"),
        (status = 409, description = "Ruleset name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "rulesets"
)]
pub async fn create_ruleset(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<RulesetPayload>,
) -> Result<Response, WebError> {
    req.validate()?;

    let ruleset = services::create_ruleset(state.db.pool(), &user, &req).await?;

    Ok((StatusCode::CREATED, Json(RulesetResponse::from(ruleset))).into_response())
}

#[utoipa::path(
    put,
    path = "/api/rulesets/{ruleset_id}",
    params(("ruleset_id" = Uuid, Path, description = "Ruleset id")),
    request_body = RulesetPayload,
    responses(
        (status = 200, description = "Ruleset updated", body = RulesetResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Ruleset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rulesets"
)]
pub async fn update_ruleset(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(ruleset_id): Path<Uuid>,
    Json(req): Json<RulesetPayload>,
) -> Result<Response, WebError> {
    req.validate()?;

    let ruleset = services::update_ruleset(state.db.pool(), &user, ruleset_id, &req).await?;

    Ok(Json(RulesetResponse::from(ruleset)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/rulesets/{ruleset_id}",
    params(("ruleset_id" = Uuid, Path, description = "Ruleset id")),
    responses(
        (status = 204, description = "Ruleset deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Ruleset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rulesets"
)]
pub async fn delete_ruleset(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(ruleset_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_ruleset(state.db.pool(), &user, ruleset_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/rulesets/calculate",
    request_body = PointCalculationRequest,
    responses(
        (status = 200, description = "Computed final points", body = PointCalculationResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Ruleset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rulesets"
)]
pub async fn calculate_points(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<PointCalculationRequest>,
) -> Result<Json<PointCalculationResponse>, WebError> {
    req.validate()?;

    let response = services::calculate_points(state.db.pool(), &user, &req).await?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/rulesets/templates",
    responses(
        (status = 200, description = "Built-in rule templates", body = RuleTemplateResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "rulesets"
)]
pub async fn get_templates() -> Json<RuleTemplateResponse> {
    let templates = templates::RULE_TEMPLATES
        .iter()
        .map(RuleTemplateDto::from)
        .collect();

    Json(RuleTemplateResponse { templates })
}

#[utoipa::path(
    get,
    path = "/api/rulesets/uma-patterns",
    responses(
        (status = 200, description = "Common uma patterns by game mode", body = UmaPatternsResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "rulesets"
)]
pub async fn get_uma_patterns() -> Json<UmaPatternsResponse> {
    Json(UmaPatternsResponse {
        three: templates::common_uma_patterns(GameMode::Three)
            .iter()
            .map(Into::into)
            .collect(),
        four: templates::common_uma_patterns(GameMode::Four)
            .iter()
            .map(Into::into)
            .collect(),
    })
}
