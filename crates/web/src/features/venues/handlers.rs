use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::venue::{CreateVenueRequest, VenueListResponse, VenueResponse};
use validator::Validate;

use crate::AppState;
use crate::error::WebError;
use crate::middleware::auth::AuthUser;

use super::services;

#[utoipa::path(
    get,
    path = "/api/venues",
    responses(
        (status = 200, description = "The caller's venues", body = VenueListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "venues"
)]
pub async fn list_venues(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<VenueListResponse>, WebError> {
    let venues = services::list_venues(state.db.pool(), &user).await?;

    let venues: Vec<VenueResponse> = venues.into_iter().map(VenueResponse::from).collect();
    let total = venues.len();

    Ok(Json(VenueListResponse { venues, total }))
}

#[utoipa::path(
    post,
    path = "/api/venues",
    request_body = CreateVenueRequest,
    responses(
        (status = 201, description = "Venue created", body = VenueResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Venue already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "venues"
)]
pub async fn create_venue(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateVenueRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let venue = services::create_venue(state.db.pool(), &user, &req.name).await?;

    Ok((StatusCode::CREATED, Json(VenueResponse::from(venue))).into_response())
}
