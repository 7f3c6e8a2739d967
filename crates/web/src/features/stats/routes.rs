use axum::{Router, routing::get};

use crate::AppState;

use super::handlers::get_stats_summary;

pub fn routes() -> Router<AppState> {
    Router::new().route("/summary", get(get_stats_summary))
}
