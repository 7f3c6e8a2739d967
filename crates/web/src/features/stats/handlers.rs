use axum::{
    Extension, Json,
    extract::{Query, State},
};
use storage::dto::stats::{StatsQuery, StatsSummary};

use crate::AppState;
use crate::error::WebError;
use crate::middleware::auth::AuthUser;

use super::services;

#[utoipa::path(
    get,
    path = "/api/stats/summary",
    params(StatsQuery),
    responses(
        (status = 200, description = "Performance summary", body = StatsSummary),
        (status = 400, description = "Invalid query parameters")
    ),
    security(("bearer_auth" = [])),
    tag = "stats"
)]
pub async fn get_stats_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsSummary>, WebError> {
    let summary = services::stats_summary(state.db.pool(), &user, &query).await?;

    Ok(Json(summary))
}
