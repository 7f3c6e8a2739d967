use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::{
    common::PaginatedResponse,
    matches::{
        FieldCheckRequest, FieldCheckResponse, MatchListFilter, MatchResponse, SaveMatchRequest,
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::WebError;
use crate::middleware::auth::AuthUser;

use super::services;

#[utoipa::path(
    post,
    path = "/api/matches",
    request_body = SaveMatchRequest,
    responses(
        (status = 201, description = "Match registered", body = MatchResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Ruleset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "matches"
)]
pub async fn register_match(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SaveMatchRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let record = services::register_match(state.db.pool(), &user, &req).await?;

    Ok((StatusCode::CREATED, Json(MatchResponse::from(record))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/matches",
    params(MatchListFilter),
    responses(
        (status = 200, description = "Match history page", body = PaginatedResponse<MatchResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    security(("bearer_auth" = [])),
    tag = "matches"
)]
pub async fn list_matches(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<MatchListFilter>,
) -> Result<Response, WebError> {
    filter.validate().map_err(WebError::BadRequest)?;

    let (matches, total_items) = services::list_matches(state.db.pool(), &user, &filter).await?;

    let data: Vec<MatchResponse> = matches.into_iter().map(MatchResponse::from).collect();
    let response = PaginatedResponse::new(data, filter.page, filter.page_size, total_items);

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/matches/{match_id}",
    params(("match_id" = Uuid, Path, description = "Match id")),
    responses(
        (status = 200, description = "Match found", body = MatchResponse),
        (status = 404, description = "Match not found")
    ),
    security(("bearer_auth" = [])),
    tag = "matches"
)]
pub async fn get_match(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(match_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let record = services::get_match(state.db.pool(), &user, match_id).await?;

    Ok(Json(MatchResponse::from(record)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/matches/{match_id}",
    params(("match_id" = Uuid, Path, description = "Match id")),
    request_body = SaveMatchRequest,
    responses(
        (status = 200, description = "Match updated", body = MatchResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Match not found")
    ),
    security(("bearer_auth" = [])),
    tag = "matches"
)]
pub async fn update_match(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(match_id): Path<Uuid>,
    Json(req): Json<SaveMatchRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let record = services::update_match(state.db.pool(), &user, match_id, &req).await?;

    Ok(Json(MatchResponse::from(record)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/matches/{match_id}",
    params(("match_id" = Uuid, Path, description = "Match id")),
    responses(
        (status = 204, description = "Match deleted"),
        (status = 404, description = "Match not found")
    ),
    security(("bearer_auth" = [])),
    tag = "matches"
)]
pub async fn delete_match(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(match_id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_match(state.db.pool(), &user, match_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/matches/validate",
    request_body = FieldCheckRequest,
    responses(
        (status = 200, description = "Per-field verdicts", body = FieldCheckResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "matches"
)]
pub async fn validate_fields(
    Json(req): Json<FieldCheckRequest>,
) -> Json<FieldCheckResponse> {
    Json(services::check_fields(&req))
}
