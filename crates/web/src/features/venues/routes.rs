use axum::{Router, routing::get};

use crate::AppState;

use super::handlers::{create_venue, list_venues};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_venues).post(create_venue))
}
