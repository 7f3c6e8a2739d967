use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

use super::handlers::{
    delete_match, get_match, list_matches, register_match, update_match, validate_fields,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_matches).post(register_match))
        .route("/validate", post(validate_fields))
        .route(
            "/:match_id",
            get(get_match).put(update_match).delete(delete_match),
        )
}
